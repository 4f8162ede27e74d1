//! Cardiovascular model

use super::{round_to, vary, BodyParameters, OrganModel, SampleStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use vitals_common::{now_rfc3339, ActivityLevel, CardiacCondition, Organ, ParameterUpdate};

const BASE_HEART_RATE: f64 = 70.0;
const BASE_SYSTOLIC: f64 = 120.0;
const BASE_DIASTOLIC: f64 = 80.0;
const BASE_SPO2: f64 = 98.0;
/// mL per beat
const STROKE_VOLUME: f64 = 70.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardiacSample {
    pub timestamp: String,
    /// bpm
    pub heart_rate: u32,
    /// mmHg
    pub systolic_pressure: u32,
    /// mmHg
    pub diastolic_pressure: u32,
    /// %
    pub oxygen_saturation: f64,
    /// L/min
    pub cardiac_output: f64,
    pub rhythm: String,
    pub status: SampleStatus,
}

#[derive(Debug, Default)]
pub struct CardiacModel {
    condition: CardiacCondition,
    params: BodyParameters,
}

impl CardiacModel {
    fn activity_factor(&self) -> f64 {
        match self.params.activity_level {
            ActivityLevel::Resting => 0.8,
            ActivityLevel::Normal => 1.0,
            ActivityLevel::LightExercise => 1.3,
            ActivityLevel::IntenseExercise => 1.8,
        }
    }

    /// Resting heart rate drifts down with age
    fn rate_age_factor(&self) -> f64 {
        1.0 - self.params.age_offset() * 0.002
    }

    /// Blood pressure climbs with age
    fn pressure_age_factor(&self) -> f64 {
        1.0 + self.params.age_offset() * 0.005
    }

    fn baseline<R: Rng + ?Sized>(&self, rng: &mut R) -> CardiacSample {
        let activity = self.activity_factor();
        let pressure_activity = 1.0 + (activity - 1.0) * 0.3;

        let hr = BASE_HEART_RATE * self.rate_age_factor() * activity;
        let hr = vary(rng, hr, 0.08).clamp(50.0, 100.0) as u32;

        let systolic = BASE_SYSTOLIC * self.pressure_age_factor() * pressure_activity;
        let systolic = vary(rng, systolic, 0.05).clamp(90.0, 140.0) as u32;

        let diastolic = BASE_DIASTOLIC * self.pressure_age_factor() * pressure_activity;
        let diastolic = vary(rng, diastolic, 0.05).clamp(60.0, 90.0) as u32;

        let spo2 = round_to(vary(rng, BASE_SPO2, 0.02).clamp(95.0, 100.0), 1);

        CardiacSample {
            timestamp: now_rfc3339(),
            heart_rate: hr,
            systolic_pressure: systolic,
            diastolic_pressure: diastolic,
            oxygen_saturation: spo2,
            cardiac_output: cardiac_output(hr),
            rhythm: "normal".to_string(),
            status: SampleStatus::Healthy,
        }
    }
}

fn cardiac_output(heart_rate: u32) -> f64 {
    round_to(STROKE_VOLUME * f64::from(heart_rate) / 1000.0, 2)
}

impl OrganModel for CardiacModel {
    type Condition = CardiacCondition;
    type Parameters = BodyParameters;
    type Sample = CardiacSample;

    const ORGAN: Organ = Organ::Cardiac;

    fn condition(&self) -> CardiacCondition {
        self.condition
    }

    fn set_condition(&mut self, condition: CardiacCondition) {
        self.condition = condition;
    }

    fn parameters(&self) -> BodyParameters {
        self.params
    }

    fn apply_update(&mut self, update: &ParameterUpdate) {
        self.params.merge(update);
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> CardiacSample {
        let mut data = self.baseline(rng);

        match self.condition {
            CardiacCondition::Normal => {}
            CardiacCondition::Tachycardia => {
                data.heart_rate = rng.gen_range(110..=150);
                data.cardiac_output = cardiac_output(data.heart_rate);
                data.rhythm = "tachycardia".to_string();
                data.status = SampleStatus::Abnormal;
            }
            CardiacCondition::Bradycardia => {
                data.heart_rate = rng.gen_range(40..=55);
                data.cardiac_output = cardiac_output(data.heart_rate);
                data.rhythm = "bradycardia".to_string();
                data.status = SampleStatus::Abnormal;
            }
            CardiacCondition::Arrhythmia => {
                data.heart_rate = rng.gen_range(60..=120);
                data.cardiac_output = cardiac_output(data.heart_rate);
                data.rhythm = "irregular".to_string();
                data.status = SampleStatus::Abnormal;
            }
            CardiacCondition::Hypertension => {
                data.systolic_pressure = rng.gen_range(145..=180);
                data.diastolic_pressure = rng.gen_range(95..=110);
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
    use vitals_common::ConditionSet;

    fn model_with(condition: CardiacCondition) -> CardiacModel {
        let mut model = CardiacModel::default();
        model.set_condition(condition);
        model
    }

    #[test]
    fn test_normal_sample_within_bands() {
        let model = CardiacModel::default();
        let mut rng = StdRng::seed_from_u64(42);
        for sample in model.samples(&mut rng, 200) {
            assert!((50..=100).contains(&sample.heart_rate));
            assert!((90..=140).contains(&sample.systolic_pressure));
            assert!((60..=90).contains(&sample.diastolic_pressure));
            assert!((95.0..=100.0).contains(&sample.oxygen_saturation));
            assert_eq!(sample.status, SampleStatus::Healthy);
            assert_eq!(sample.rhythm, "normal");
        }
    }

    #[test]
    fn test_tachycardia_raises_heart_rate() {
        let model = model_with(CardiacCondition::Tachycardia);
        let mut rng = StdRng::seed_from_u64(3);
        for sample in model.samples(&mut rng, 100) {
            assert!((110..=150).contains(&sample.heart_rate));
            assert_eq!(sample.cardiac_output, cardiac_output(sample.heart_rate));
            assert_eq!(sample.status, SampleStatus::Abnormal);
        }
    }

    #[test]
    fn test_bradycardia_lowers_heart_rate() {
        let model = model_with(CardiacCondition::Bradycardia);
        let mut rng = StdRng::seed_from_u64(4);
        for sample in model.samples(&mut rng, 100) {
            assert!((40..=55).contains(&sample.heart_rate));
            assert_eq!(sample.rhythm, "bradycardia");
        }
    }

    #[test]
    fn test_arrhythmia_is_irregular() {
        let model = model_with(CardiacCondition::Arrhythmia);
        let mut rng = StdRng::seed_from_u64(5);
        let sample = model.sample(&mut rng);
        assert_eq!(sample.rhythm, "irregular");
    }

    #[test]
    fn test_hypertension_raises_pressure() {
        let model = model_with(CardiacCondition::Hypertension);
        let mut rng = StdRng::seed_from_u64(6);
        for sample in model.samples(&mut rng, 100) {
            assert!((145..=180).contains(&sample.systolic_pressure));
            assert!((95..=110).contains(&sample.diastolic_pressure));
        }
    }

    #[test]
    fn test_sampling_does_not_change_condition() {
        let model = model_with(CardiacCondition::Hypertension);
        let mut rng = StdRng::seed_from_u64(8);
        let _ = model.samples(&mut rng, 10);
        assert_eq!(model.condition(), CardiacCondition::Hypertension);
        assert!(!model.condition().is_normal());
    }

    #[test]
    fn test_cardiac_output_formula() {
        assert_eq!(cardiac_output(70), 4.9);
        assert_eq!(cardiac_output(123), 8.61);
    }
}
