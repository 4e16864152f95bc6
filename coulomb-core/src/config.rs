//! Run configuration.
//!
//! [`RunConfig`] is plain data: loaders deserialize it from any serde format
//! and missing fields take their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of sub-patches along strike and down dip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub strike: usize,
    pub dip: usize,
}

impl Split {
    pub fn new(strike: usize, dip: usize) -> Self {
        Self { strike, dip }
    }

    /// Total number of patches.
    pub fn count(&self) -> usize {
        self.strike * self.dip
    }
}

impl Default for Split {
    fn default() -> Self {
        Self { strike: 1, dip: 1 }
    }
}

/// Direction in which shear stress is resolved on a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShearDirection {
    /// Along the receiver's rake.
    #[default]
    ReceiverRake,
    /// Magnitude of the full in-plane shear traction.
    Maximum,
}

/// Parameters of a stress-change run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Subdivision applied to every source fault.
    pub source_split: Split,
    /// Subdivision applied to every receiver fault.
    pub receiver_split: Split,
    /// Effective coefficient of friction.
    pub friction: f64,
    /// Skempton's coefficient B, in [0, 1].
    pub skempton: f64,
    pub shear_direction: ShearDirection,
    /// Number of worker threads (0 = Rayon's global pool).
    pub n_threads: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_split: Split::default(),
            receiver_split: Split::default(),
            friction: 0.4,
            skempton: 0.0,
            shear_direction: ShearDirection::default(),
            n_threads: 0,
        }
    }
}

impl RunConfig {
    /// Check split counts and frictional parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a zero split count, a negative or
    /// non-finite friction coefficient, or B outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, split) in [("source", self.source_split), ("receiver", self.receiver_split)] {
            if split.strike == 0 || split.dip == 0 {
                return Err(Error::Configuration(format!(
                    "{name} split must be at least 1 x 1, got {} x {}",
                    split.strike, split.dip
                )));
            }
        }
        if !(self.friction.is_finite() && self.friction >= 0.0) {
            return Err(Error::Configuration(format!(
                "friction must be a non-negative number, got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.skempton) {
            return Err(Error::Configuration(format!(
                "Skempton's coefficient must be in [0, 1], got {}",
                self.skempton
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.source_split, Split::new(1, 1));
        assert_eq!(config.friction, 0.4);
        assert_eq!(config.skempton, 0.0);
        assert_eq!(config.shear_direction, ShearDirection::ReceiverRake);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: RunConfig =
            serde_json::from_str(r#"{"friction": 0.6, "receiver_split": {"strike": 4, "dip": 2}}"#)
                .unwrap();
        assert_eq!(config.friction, 0.6);
        assert_eq!(config.receiver_split.count(), 8);
        assert_eq!(config.source_split, Split::default());

        let config: RunConfig = serde_json::from_str(r#"{"shear_direction": "maximum"}"#).unwrap();
        assert_eq!(config.shear_direction, ShearDirection::Maximum);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            RunConfig {
                source_split: Split::new(0, 1),
                ..RunConfig::default()
            },
            RunConfig {
                receiver_split: Split::new(2, 0),
                ..RunConfig::default()
            },
            RunConfig {
                friction: -0.1,
                ..RunConfig::default()
            },
            RunConfig {
                friction: f64::NAN,
                ..RunConfig::default()
            },
            RunConfig {
                skempton: 1.5,
                ..RunConfig::default()
            },
            RunConfig {
                skempton: f64::NAN,
                ..RunConfig::default()
            },
        ];
        for config in &cases {
            assert!(matches!(config.validate(), Err(Error::Configuration(_))));
        }
    }
}
