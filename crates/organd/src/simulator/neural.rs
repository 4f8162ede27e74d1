//! Central nervous system model
//!
//! Unlike the other organs, two neural conditions reach into the parameters:
//! `stress` forces the mental state to stressed and `normal` resets it to
//! alert.

use super::{round_to, uniform, vary, OrganModel, SampleStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use vitals_common::{now_rfc3339, MentalState, NeuralCondition, Organ, ParameterUpdate, Sex, DEFAULT_AGE};

/// µg/dL
const BASE_DOPAMINE: f64 = 0.04;
/// ng/mL
const BASE_SEROTONIN: f64 = 150.0;
/// pg/mL
const BASE_NOREPINEPHRINE: f64 = 200.0;
/// ms
const BASE_REACTION_TIME: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuralParameters {
    pub age: u8,
    pub sex: Sex,
    pub mental_state: MentalState,
}

impl Default for NeuralParameters {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            sex: Sex::M,
            mental_state: MentalState::Alert,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralSample {
    pub timestamp: String,
    /// 8-13 Hz share, %
    pub eeg_alpha: f64,
    /// 13-30 Hz share, %
    pub eeg_beta: f64,
    /// 4-8 Hz share, %
    pub eeg_theta: f64,
    /// 0.5-4 Hz share, %
    pub eeg_delta: f64,
    /// 0-100 %
    pub brain_activity_level: f64,
    pub dopamine: f64,
    pub serotonin: f64,
    pub norepinephrine: f64,
    /// ms
    pub reaction_time: u32,
    pub cortical_activity: String,
    pub status: SampleStatus,
}

#[derive(Debug, Default)]
pub struct NeuralModel {
    condition: NeuralCondition,
    params: NeuralParameters,
}

struct EegBands {
    alpha: f64,
    beta: f64,
    theta: f64,
    delta: f64,
}

impl NeuralModel {
    /// Band ranges per mental state, normalised to percentages
    fn eeg_bands<R: Rng + ?Sized>(&self, rng: &mut R) -> EegBands {
        let ((a0, a1), (b0, b1), (t0, t1), (d0, d1)) = match self.params.mental_state {
            MentalState::Alert => ((20.0, 40.0), (50.0, 70.0), (10.0, 20.0), (5.0, 10.0)),
            MentalState::Relaxed => ((50.0, 70.0), (20.0, 35.0), (15.0, 25.0), (5.0, 15.0)),
            MentalState::Drowsy => ((15.0, 30.0), (10.0, 20.0), (45.0, 65.0), (15.0, 25.0)),
            MentalState::Sleeping => ((5.0, 15.0), (5.0, 10.0), (25.0, 35.0), (55.0, 75.0)),
            MentalState::Stressed => ((15.0, 25.0), (60.0, 85.0), (10.0, 15.0), (5.0, 10.0)),
        };

        let alpha = rng.gen_range(a0..=a1);
        let beta = rng.gen_range(b0..=b1);
        let theta = rng.gen_range(t0..=t1);
        let delta = rng.gen_range(d0..=d1);
        let total = alpha + beta + theta + delta;

        EegBands {
            alpha: round_to(alpha / total * 100.0, 1),
            beta: round_to(beta / total * 100.0, 1),
            theta: round_to(theta / total * 100.0, 1),
            delta: round_to(delta / total * 100.0, 1),
        }
    }

    fn brain_activity<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (low, high) = match self.params.mental_state {
            MentalState::Alert => (75.0, 95.0),
            MentalState::Relaxed => (55.0, 75.0),
            MentalState::Drowsy => (35.0, 55.0),
            MentalState::Sleeping => (15.0, 35.0),
            MentalState::Stressed => (80.0, 100.0),
        };
        uniform(rng, low, high, 1)
    }

    fn cortical_activity(&self) -> &'static str {
        match self.params.mental_state {
            MentalState::Alert => "high",
            MentalState::Relaxed => "moderate",
            MentalState::Drowsy => "low",
            MentalState::Sleeping => "minimal",
            MentalState::Stressed => "very_high",
        }
    }

    fn baseline<R: Rng + ?Sized>(&self, rng: &mut R) -> NeuralSample {
        let bands = self.eeg_bands(rng);
        let activity = self.brain_activity(rng);

        NeuralSample {
            timestamp: now_rfc3339(),
            eeg_alpha: bands.alpha,
            eeg_beta: bands.beta,
            eeg_theta: bands.theta,
            eeg_delta: bands.delta,
            brain_activity_level: activity,
            dopamine: round_to(vary(rng, BASE_DOPAMINE, 0.15).clamp(0.02, 0.08), 3),
            serotonin: round_to(vary(rng, BASE_SEROTONIN, 0.12).clamp(100.0, 250.0), 1),
            norepinephrine: round_to(
                vary(rng, BASE_NOREPINEPHRINE, 0.15).clamp(150.0, 300.0),
                1,
            ),
            reaction_time: vary(rng, BASE_REACTION_TIME, 0.15).clamp(150.0, 400.0) as u32,
            cortical_activity: self.cortical_activity().to_string(),
            status: SampleStatus::Healthy,
        }
    }
}

impl OrganModel for NeuralModel {
    type Condition = NeuralCondition;
    type Parameters = NeuralParameters;
    type Sample = NeuralSample;

    const ORGAN: Organ = Organ::Neural;

    fn condition(&self) -> NeuralCondition {
        self.condition
    }

    fn set_condition(&mut self, condition: NeuralCondition) {
        self.condition = condition;
        match condition {
            NeuralCondition::Stress => self.params.mental_state = MentalState::Stressed,
            NeuralCondition::Normal => self.params.mental_state = MentalState::Alert,
            NeuralCondition::Epilepsy
            | NeuralCondition::Migraine
            | NeuralCondition::SleepDisorder => {}
        }
    }

    fn parameters(&self) -> NeuralParameters {
        self.params
    }

    fn apply_update(&mut self, update: &ParameterUpdate) {
        if let Some(age) = update.age {
            self.params.age = age;
        }
        if let Some(sex) = update.sex {
            self.params.sex = sex;
        }
        if let Some(state) = update.mental_state {
            self.params.mental_state = state;
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NeuralSample {
        let mut data = self.baseline(rng);

        match self.condition {
            NeuralCondition::Normal => {}
            NeuralCondition::Epilepsy => {
                data.eeg_beta = uniform(rng, 70.0, 90.0, 1);
                data.eeg_alpha = uniform(rng, 5.0, 15.0, 1);
                data.eeg_theta = uniform(rng, 5.0, 10.0, 1);
                data.eeg_delta = uniform(rng, 5.0, 10.0, 1);
                data.brain_activity_level = uniform(rng, 95.0, 100.0, 1);
                data.cortical_activity = "seizure".to_string();
                data.reaction_time = rng.gen_range(500..=1000);
                data.status = SampleStatus::Critical;
            }
            NeuralCondition::Migraine => {
                data.brain_activity_level = uniform(rng, 85.0, 98.0, 1);
                data.serotonin = uniform(rng, 80.0, 110.0, 1);
                data.norepinephrine = uniform(rng, 250.0, 350.0, 1);
                data.cortical_activity = "hyperactive".to_string();
                data.reaction_time = rng.gen_range(350..=500);
                data.status = SampleStatus::Abnormal;
            }
            NeuralCondition::SleepDisorder => {
                data.eeg_alpha = uniform(rng, 30.0, 45.0, 1);
                data.eeg_beta = uniform(rng, 25.0, 40.0, 1);
                data.eeg_theta = uniform(rng, 15.0, 25.0, 1);
                data.eeg_delta = uniform(rng, 10.0, 20.0, 1);
                data.brain_activity_level = uniform(rng, 50.0, 70.0, 1);
                data.cortical_activity = "irregular".to_string();
                data.serotonin = uniform(rng, 100.0, 130.0, 1);
                data.status = SampleStatus::Abnormal;
            }
            NeuralCondition::Stress => {
                data.brain_activity_level = uniform(rng, 85.0, 100.0, 1);
                data.norepinephrine = uniform(rng, 300.0, 450.0, 1);
                data.dopamine = uniform(rng, 0.05, 0.09, 3);
                data.cortical_activity = "very_high".to_string();
                data.reaction_time = rng.gen_range(180..=250);
                data.status = SampleStatus::Abnormal;
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_eeg_bands_sum_to_about_100() {
        let model = NeuralModel::default();
        let mut rng = StdRng::seed_from_u64(21);
        for sample in model.samples(&mut rng, 100) {
            let total = sample.eeg_alpha + sample.eeg_beta + sample.eeg_theta + sample.eeg_delta;
            assert!((99.7..=100.3).contains(&total), "total was {}", total);
        }
    }

    #[test]
    fn test_sleeping_is_delta_dominant() {
        let mut model = NeuralModel::default();
        model.apply_update(&ParameterUpdate {
            mental_state: Some(MentalState::Sleeping),
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(22);
        for sample in model.samples(&mut rng, 50) {
            assert!(sample.eeg_delta > sample.eeg_beta);
            assert_eq!(sample.cortical_activity, "minimal");
        }
    }

    #[test]
    fn test_stress_sets_mental_state() {
        let mut model = NeuralModel::default();
        model.set_condition(NeuralCondition::Stress);
        assert_eq!(model.parameters().mental_state, MentalState::Stressed);

        model.set_condition(NeuralCondition::Normal);
        assert_eq!(model.parameters().mental_state, MentalState::Alert);
    }

    #[test]
    fn test_migraine_keeps_mental_state() {
        let mut model = NeuralModel::default();
        model.apply_update(&ParameterUpdate {
            mental_state: Some(MentalState::Relaxed),
            ..Default::default()
        });
        model.set_condition(NeuralCondition::Migraine);
        assert_eq!(model.parameters().mental_state, MentalState::Relaxed);
    }

    #[test]
    fn test_epilepsy_is_critical_seizure() {
        let mut model = NeuralModel::default();
        model.set_condition(NeuralCondition::Epilepsy);
        let mut rng = StdRng::seed_from_u64(23);
        for sample in model.samples(&mut rng, 50) {
            assert_eq!(sample.cortical_activity, "seizure");
            assert_eq!(sample.status, SampleStatus::Critical);
            assert!((500..=1000).contains(&sample.reaction_time));
        }
    }

    #[test]
    fn test_stress_raises_norepinephrine() {
        let mut model = NeuralModel::default();
        model.set_condition(NeuralCondition::Stress);
        let mut rng = StdRng::seed_from_u64(24);
        for sample in model.samples(&mut rng, 50) {
            assert!(sample.norepinephrine >= 300.0);
            assert!((0.05..=0.09).contains(&sample.dopamine));
        }
    }
}
