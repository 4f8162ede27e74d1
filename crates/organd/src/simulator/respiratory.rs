//! Pulmonary model

use super::{round_to, uniform, vary, BodyParameters, OrganModel, SampleStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use vitals_common::{now_rfc3339, ActivityLevel, Organ, ParameterUpdate, RespiratoryCondition, Sex};

const BASE_RESPIRATORY_RATE: f64 = 16.0;
const BASE_TIDAL_VOLUME: f64 = 500.0;
const BASE_VITAL_CAPACITY: f64 = 4800.0;
const BASE_PAO2: f64 = 95.0;
const BASE_PACO2: f64 = 40.0;
const BASE_PH: f64 = 7.40;
const BASE_SPO2: f64 = 98.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespiratorySample {
    pub timestamp: String,
    /// breaths/min
    pub respiratory_rate: u32,
    /// mL
    pub tidal_volume: u32,
    /// mL
    pub vital_capacity: u32,
    /// mmHg, arterial oxygen
    pub pao2: f64,
    /// mmHg, arterial CO2
    pub paco2: f64,
    pub ph: f64,
    /// %
    pub oxygen_saturation: f64,
    pub status: SampleStatus,
}

#[derive(Debug, Default)]
pub struct RespiratoryModel {
    condition: RespiratoryCondition,
    params: BodyParameters,
}

impl RespiratoryModel {
    fn activity_factor(&self) -> f64 {
        match self.params.activity_level {
            ActivityLevel::Resting => 0.7,
            ActivityLevel::Normal => 1.0,
            ActivityLevel::LightExercise => 1.5,
            ActivityLevel::IntenseExercise => 2.2,
        }
    }

    /// Lung capacity shrinks with age and is lower on average for women
    fn capacity_factor(&self) -> f64 {
        let age = 1.0 - self.params.age_offset() * 0.008;
        let sex = match self.params.sex {
            Sex::F => 0.85,
            Sex::M => 1.0,
        };
        age * sex
    }

    fn baseline<R: Rng + ?Sized>(&self, rng: &mut R) -> RespiratorySample {
        let activity = self.activity_factor();

        let rr = vary(rng, BASE_RESPIRATORY_RATE * activity, 0.1).clamp(12.0, 25.0) as u32;

        let tv = BASE_TIDAL_VOLUME * (1.0 + (activity - 1.0) * 0.5);
        let tv = vary(rng, tv, 0.08).clamp(350.0, 750.0) as u32;

        let vc = BASE_VITAL_CAPACITY * self.capacity_factor();
        let vc = vary(rng, vc, 0.05).clamp(3000.0, 6000.0) as u32;

        RespiratorySample {
            timestamp: now_rfc3339(),
            respiratory_rate: rr,
            tidal_volume: tv,
            vital_capacity: vc,
            pao2: round_to(vary(rng, BASE_PAO2, 0.03).clamp(80.0, 100.0), 1),
            paco2: round_to(vary(rng, BASE_PACO2, 0.05).clamp(35.0, 45.0), 1),
            ph: round_to(vary(rng, BASE_PH, 0.01).clamp(7.35, 7.45), 2),
            oxygen_saturation: round_to(vary(rng, BASE_SPO2, 0.02).clamp(95.0, 100.0), 1),
            status: SampleStatus::Healthy,
        }
    }
}

impl OrganModel for RespiratoryModel {
    type Condition = RespiratoryCondition;
    type Parameters = BodyParameters;
    type Sample = RespiratorySample;

    const ORGAN: Organ = Organ::Respiratory;

    fn condition(&self) -> RespiratoryCondition {
        self.condition
    }

    fn set_condition(&mut self, condition: RespiratoryCondition) {
        self.condition = condition;
    }

    fn parameters(&self) -> BodyParameters {
        self.params
    }

    fn apply_update(&mut self, update: &ParameterUpdate) {
        self.params.merge(update);
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RespiratorySample {
        let mut data = self.baseline(rng);

        match self.condition {
            RespiratoryCondition::Normal => {}
            RespiratoryCondition::Asthma => {
                data.respiratory_rate = rng.gen_range(25..=35);
                data.tidal_volume = rng.gen_range(300..=400);
                data.vital_capacity = (f64::from(data.vital_capacity) * 0.7) as u32;
                data.oxygen_saturation = uniform(rng, 88.0, 94.0, 1);
                data.pao2 = uniform(rng, 70.0, 85.0, 1);
                data.status = SampleStatus::Abnormal;
            }
            RespiratoryCondition::Copd => {
                data.respiratory_rate = rng.gen_range(22..=30);
                data.vital_capacity = (f64::from(data.vital_capacity) * 0.6) as u32;
                data.tidal_volume = rng.gen_range(350..=450);
                data.oxygen_saturation = uniform(rng, 85.0, 92.0, 1);
                data.pao2 = uniform(rng, 60.0, 75.0, 1);
                data.paco2 = uniform(rng, 45.0, 55.0, 1);
                data.ph = uniform(rng, 7.32, 7.38, 2);
                data.status = SampleStatus::Abnormal;
            }
            RespiratoryCondition::Hyperventilation => {
                data.respiratory_rate = rng.gen_range(30..=45);
                data.tidal_volume = rng.gen_range(600..=800);
                data.paco2 = uniform(rng, 25.0, 33.0, 1);
                // respiratory alkalosis
                data.ph = uniform(rng, 7.45, 7.55, 2);
                data.status = SampleStatus::Abnormal;
            }
            RespiratoryCondition::Apnea => {
                data.respiratory_rate = rng.gen_range(0..=8);
                data.tidal_volume = rng.gen_range(100..=300);
                data.oxygen_saturation = uniform(rng, 75.0, 88.0, 1);
                data.pao2 = uniform(rng, 50.0, 70.0, 1);
                data.paco2 = uniform(rng, 48.0, 60.0, 1);
                // respiratory acidosis
                data.ph = uniform(rng, 7.28, 7.35, 2);
                data.status = SampleStatus::Critical;
            }
        }

        data
    }
}
