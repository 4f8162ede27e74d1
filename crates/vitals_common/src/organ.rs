//! The fixed organ registry.
//!
//! Every service and the orchestrator agree on this closed set. Parsing an
//! organ name happens once, at the HTTP boundary.

use crate::conditions::ConditionSet;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A simulated physiological subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Organ {
    Cardiac,
    Respiratory,
    Neural,
}

impl Organ {
    /// All organs in registry order
    pub const ALL: [Organ; 3] = [Organ::Cardiac, Organ::Respiratory, Organ::Neural];

    /// Path segment and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiac => "cardiac",
            Self::Respiratory => "respiratory",
            Self::Neural => "neural",
        }
    }

    /// Body part reported in status and data payloads
    pub fn body_label(&self) -> &'static str {
        match self {
            Self::Cardiac => "heart",
            Self::Respiratory => "lungs",
            Self::Neural => "brain",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cardiac => "Cardiovascular System",
            Self::Respiratory => "Respiratory System",
            Self::Neural => "Central Nervous System",
        }
    }

    /// Port the service listens on when nothing else is configured
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Cardiac => 5001,
            Self::Respiratory => 5002,
            Self::Neural => 5003,
        }
    }

    /// Keys accepted by `POST /api/<organ>/parameters`
    pub fn parameter_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Cardiac | Self::Respiratory => &["age", "sex", "activity_level"],
            Self::Neural => &["age", "sex", "mental_state"],
        }
    }

    /// Valid condition names for this organ, `normal` first
    pub fn condition_names(&self) -> &'static [&'static str] {
        match self {
            Self::Cardiac => crate::conditions::CardiacCondition::NAMES,
            Self::Respiratory => crate::conditions::RespiratoryCondition::NAMES,
            Self::Neural => crate::conditions::NeuralCondition::NAMES,
        }
    }

    /// Check `name` against this organ's conditions without parsing it into
    /// the organ-specific enum
    pub fn check_condition(&self, name: &str) -> Result<(), ApiError> {
        if self.condition_names().iter().any(|c| *c == name) {
            return Ok(());
        }
        Err(ApiError::not_found_with_values(
            format!("Unknown condition '{}' for {}", name, self),
            self.condition_names().to_vec(),
        ))
    }

    /// Prefix of every organ-specific route
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.as_str())
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|o| o.as_str()).collect()
    }
}

impl fmt::Display for Organ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Organ {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardiac" => Ok(Self::Cardiac),
            "respiratory" => Ok(Self::Respiratory),
            "neural" => Ok(Self::Neural),
            other => Err(ApiError::not_found_with_values(
                format!("Unknown organ '{}'", other),
                Self::names(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_organs() {
        for organ in Organ::ALL {
            assert_eq!(organ.as_str().parse::<Organ>().unwrap(), organ);
        }
    }

    #[test]
    fn test_parse_unknown_organ_is_not_found() {
        let err = "liver".parse::<Organ>().unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert!(err.to_string().contains("liver"));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Cardiac".parse::<Organ>().is_err());
    }

    #[test]
    fn test_condition_names_per_organ() {
        assert!(Organ::Cardiac.condition_names().contains(&"tachycardia"));
        assert!(Organ::Respiratory.condition_names().contains(&"copd"));
        assert_eq!(Organ::Neural.condition_names()[0], "normal");
        assert!(!Organ::Neural.condition_names().contains(&"asthma"));
    }

    #[test]
    fn test_check_condition() {
        assert!(Organ::Cardiac.check_condition("arrhythmia").is_ok());
        assert!(Organ::Neural.check_condition("normal").is_ok());

        for bad in ["asthma", "arrhythmia?x=1", "hypertension#x", "Tachycardia", ""] {
            let err = Organ::Cardiac.check_condition(bad).unwrap_err();
            assert!(matches!(err, ApiError::NotFound { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_default_ports_are_distinct() {
        let mut ports: Vec<u16> = Organ::ALL.iter().map(|o| o.default_port()).collect();
        ports.dedup();
        assert_eq!(ports.len(), 3);
    }

    #[test]
    fn test_neural_parameter_keys() {
        assert!(Organ::Neural.parameter_keys().contains(&"mental_state"));
        assert!(!Organ::Neural.parameter_keys().contains(&"activity_level"));
        assert!(Organ::Cardiac.parameter_keys().contains(&"activity_level"));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Organ::Respiratory).unwrap();
        assert_eq!(json, "\"respiratory\"");
    }
}
