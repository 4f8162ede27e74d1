//! Condition presets per organ.
//!
//! Each organ has a closed set of conditions. `normal` is always a member
//! and is the state every service starts in.

use crate::error::ApiError;
use crate::organ::Organ;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Behaviour shared by the per-organ condition enums
pub trait ConditionSet:
    Copy + Eq + fmt::Debug + Default + Serialize + Send + Sync + 'static
{
    /// Valid wire names, `normal` first
    const NAMES: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self>;

    fn is_normal(&self) -> bool;

    /// Parse a path segment, rejecting anything outside the set
    fn parse_for(organ: Organ, name: &str) -> Result<Self, ApiError> {
        Self::from_name(name).ok_or_else(|| {
            ApiError::not_found_with_values(
                format!("Unknown condition '{}' for {}", name, organ),
                Self::NAMES.to_vec(),
            )
        })
    }
}

macro_rules! condition_set {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            #[default]
            Normal,
            $($variant),+
        }

        impl ConditionSet for $name {
            const NAMES: &'static [&'static str] = &["normal", $($wire),+];

            fn as_str(&self) -> &'static str {
                match self {
                    Self::Normal => "normal",
                    $(Self::$variant => $wire),+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    "normal" => Some(Self::Normal),
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn is_normal(&self) -> bool {
                matches!(self, Self::Normal)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

condition_set! {
    /// Cardiovascular presets
    CardiacCondition {
        Tachycardia => "tachycardia",
        Bradycardia => "bradycardia",
        Arrhythmia => "arrhythmia",
        Hypertension => "hypertension",
    }
}

condition_set! {
    /// Pulmonary presets
    RespiratoryCondition {
        Asthma => "asthma",
        Copd => "copd",
        Hyperventilation => "hyperventilation",
        Apnea => "apnea",
    }
}

condition_set! {
    /// Central nervous system presets
    NeuralCondition {
        Epilepsy => "epilepsy",
        Migraine => "migraine",
        SleepDisorder => "sleep_disorder",
        Stress => "stress",
    }
}
