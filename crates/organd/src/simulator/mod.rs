//! Organ signal simulators
//!
//! Each organ is a model holding its condition and demographic parameters.
//! Sampling is pure with respect to the model: generating data never changes
//! the condition or the parameters.

mod cardiac;
mod neural;
mod respiratory;

pub use cardiac::{CardiacModel, CardiacSample};
pub use neural::{NeuralModel, NeuralParameters, NeuralSample};
pub use respiratory::{RespiratoryModel, RespiratorySample};

use rand::Rng;
use serde::{Deserialize, Serialize};
use vitals_common::{ActivityLevel, ConditionSet, Organ, ParameterUpdate, Sex, DEFAULT_AGE};

/// Behaviour every organ simulator provides to the HTTP layer
pub trait OrganModel: Default + Send + Sync + 'static {
    type Condition: ConditionSet;
    type Parameters: Serialize + Clone + Send + Sync + 'static;
    type Sample: Serialize + Send + 'static;

    const ORGAN: Organ;

    fn condition(&self) -> Self::Condition;

    /// Switch condition, applying any side effect the condition has on the
    /// parameters
    fn set_condition(&mut self, condition: Self::Condition);

    fn parameters(&self) -> Self::Parameters;

    /// Merge a validated update; fields left as `None` are untouched
    fn apply_update(&mut self, update: &ParameterUpdate);

    /// One data point for the current condition and parameters
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Sample;

    fn samples<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Self::Sample> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}

/// Overall reading of a single sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    Healthy,
    Abnormal,
    Critical,
}

/// Parameters of the cardiac and respiratory models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyParameters {
    pub age: u8,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
}

impl Default for BodyParameters {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            sex: Sex::M,
            activity_level: ActivityLevel::Normal,
        }
    }
}

impl BodyParameters {
    fn merge(&mut self, update: &ParameterUpdate) {
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(sex) = update.sex {
            self.sex = sex;
        }
        if let Some(level) = update.activity_level {
            self.activity_level = level;
        }
    }

    /// Years away from the reference age, negative when younger
    fn age_offset(&self) -> f64 {
        f64::from(self.age) - f64::from(DEFAULT_AGE)
    }
}

/// Add uniform noise of up to `fraction` of `value` in either direction
pub(crate) fn vary<R: Rng + ?Sized>(rng: &mut R, value: f64, fraction: f64) -> f64 {
    let spread = (value * fraction).abs();
    if spread == 0.0 {
        return value;
    }
    value + rng.gen_range(-spread..=spread)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Uniform float in `low..=high` rounded to `decimals`
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64, decimals: i32) -> f64 {
    round_to(rng.gen_range(low..=high), decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_vary_stays_within_fraction() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = vary(&mut rng, 100.0, 0.05);
            assert!((95.0..=105.0).contains(&v));
        }
    }

    #[test]
    fn test_vary_zero_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(vary(&mut rng, 0.0, 0.5), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(7.456, 2), 7.46);
        assert_eq!(round_to(98.04, 1), 98.0);
    }

    #[test]
    fn test_body_parameters_merge_keeps_unsupplied_fields() {
        let mut params = BodyParameters {
            age: 20,
            sex: Sex::F,
            activity_level: ActivityLevel::Resting,
        };
        params.merge(&ParameterUpdate {
            age: Some(50),
            ..Default::default()
        });
        assert_eq!(params.age, 50);
        assert_eq!(params.sex, Sex::F);
        assert_eq!(params.activity_level, ActivityLevel::Resting);
    }
}
