//! Demographic simulation parameters and partial updates.
//!
//! Updates are validated in full before anything is applied: an unknown key
//! or an out-of-range value rejects the whole body.

use crate::error::ApiError;
use crate::organ::Organ;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Inclusive upper bound for `age`
pub const MAX_AGE: u64 = 120;

pub const DEFAULT_AGE: u8 = 35;

/// Closed string-valued parameter
pub trait NamedValue: Copy + Sized + 'static {
    const NAMES: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    M,
    F,
}

impl NamedValue for Sex {
    const NAMES: &'static [&'static str] = &["M", "F"];

    fn as_str(&self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "M" => Some(Self::M),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

/// Physical activity, scales cardiac and respiratory baselines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Resting,
    #[default]
    Normal,
    LightExercise,
    IntenseExercise,
}

impl NamedValue for ActivityLevel {
    const NAMES: &'static [&'static str] =
        &["resting", "normal", "light_exercise", "intense_exercise"];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Resting => "resting",
            Self::Normal => "normal",
            Self::LightExercise => "light_exercise",
            Self::IntenseExercise => "intense_exercise",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "resting" => Some(Self::Resting),
            "normal" => Some(Self::Normal),
            "light_exercise" => Some(Self::LightExercise),
            "intense_exercise" => Some(Self::IntenseExercise),
            _ => None,
        }
    }
}

/// Mental state, drives the EEG band distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentalState {
    #[default]
    Alert,
    Relaxed,
    Drowsy,
    Sleeping,
    Stressed,
}

impl NamedValue for MentalState {
    const NAMES: &'static [&'static str] = &["alert", "relaxed", "drowsy", "sleeping", "stressed"];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Relaxed => "relaxed",
            Self::Drowsy => "drowsy",
            Self::Sleeping => "sleeping",
            Self::Stressed => "stressed",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "alert" => Some(Self::Alert),
            "relaxed" => Some(Self::Relaxed),
            "drowsy" => Some(Self::Drowsy),
            "sleeping" => Some(Self::Sleeping),
            "stressed" => Some(Self::Stressed),
            _ => None,
        }
    }
}

macro_rules! display_named {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_named!(Sex, ActivityLevel, MentalState);

/// A validated partial parameter update
///
/// Only fields the target organ recognises can be `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterUpdate {
    pub age: Option<u8>,
    pub sex: Option<Sex>,
    pub activity_level: Option<ActivityLevel>,
    pub mental_state: Option<MentalState>,
}

impl ParameterUpdate {
    /// Validate a JSON body against the keys `organ` accepts
    pub fn from_json(organ: Organ, body: &Value) -> Result<Self, ApiError> {
        let map = body
            .as_object()
            .ok_or_else(|| ApiError::invalid("Parameters body must be a JSON object"))?;

        let accepted = organ.parameter_keys();
        let mut unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !accepted.contains(k))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(ApiError::invalid_with_values(
                format!(
                    "Unknown parameter(s) for {}: {}",
                    organ,
                    unknown.join(", ")
                ),
                accepted,
            ));
        }

        let mut update = ParameterUpdate::default();
        for (key, value) in map {
            match key.as_str() {
                "age" => update.age = Some(parse_age(value)?),
                "sex" => update.sex = Some(parse_named("sex", value)?),
                "activity_level" => {
                    update.activity_level = Some(parse_named("activity_level", value)?)
                }
                "mental_state" => update.mental_state = Some(parse_named("mental_state", value)?),
                // checked against the accepted set above
                _ => {}
            }
        }

        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self == &ParameterUpdate::default()
    }
}

fn parse_age(value: &Value) -> Result<u8, ApiError> {
    match value.as_u64() {
        Some(age) if age <= MAX_AGE => Ok(age as u8),
        _ => Err(ApiError::invalid(format!(
            "age must be an integer between 0 and {}, got {}",
            MAX_AGE, value
        ))),
    }
}

fn parse_named<T: NamedValue>(key: &str, value: &Value) -> Result<T, ApiError> {
    value
        .as_str()
        .and_then(T::from_name)
        .ok_or_else(|| {
            ApiError::invalid_with_values(format!("Invalid value for {}: {}", key, value), T::NAMES)
        })
}

/// Keys recognised by at least one organ
pub fn all_parameter_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Organ::ALL
        .iter()
        .flat_map(|o| o.parameter_keys().iter().copied())
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Subset of `body` that `organ` recognises
pub fn keys_for_organ(organ: Organ, body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(k, _)| organ.parameter_keys().contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Catalogue returned by `GET /api/<organ>/parameters`
pub fn available_parameters(organ: Organ) -> Value {
    let mut catalogue = Map::new();
    catalogue.insert("age".into(), json!(format!("integer (0-{})", MAX_AGE)));
    catalogue.insert("sex".into(), json!(Sex::NAMES));
    match organ {
        Organ::Cardiac | Organ::Respiratory => {
            catalogue.insert("activity_level".into(), json!(ActivityLevel::NAMES));
        }
        Organ::Neural => {
            catalogue.insert("mental_state".into(), json!(MentalState::NAMES));
        }
    }
    catalogue.insert("condition".into(), json!(organ.condition_names()));
    Value::Object(catalogue)
}
