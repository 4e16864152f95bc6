//! Source specifications and moment/magnitude scaling.
//!
//! A [`SourceSpec`] is the serializable, user-facing description of a source.
//! Every variant resolves to a canonical [`FaultPlane`] before a run.

use crate::error::{Error, Result};
use crate::fault::{Dislocation, FaultPlane, Potency, Role};
use crate::geo::{GeoFrame, Location};
use crate::material::ElasticModel;
use crate::types::Point3;
use serde::{Deserialize, Serialize};

/// Seismic moment (N·m) of a moment magnitude, `M0 = 10^(1.5 Mw + 9.1)`.
pub fn moment_from_magnitude(magnitude: f64) -> f64 {
    10f64.powf(1.5 * magnitude + 9.1)
}

/// Moment magnitude of a seismic moment (N·m).
pub fn magnitude_from_moment(moment: f64) -> f64 {
    (moment.log10() - 9.1) / 1.5
}

/// Faulting style used to choose a Wells & Coppersmith (1994) regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultingStyle {
    StrikeSlip,
    Reverse,
    Normal,
    /// Regression over all styles.
    All,
}

impl FaultingStyle {
    /// Style implied by a rake angle (degrees).
    pub fn from_rake(rake: f64) -> Self {
        // Wrap into (-180, 180]
        let rake = -((-rake + 180.0).rem_euclid(360.0) - 180.0);
        if rake > 45.0 && rake < 135.0 {
            Self::Reverse
        } else if rake > -135.0 && rake < -45.0 {
            Self::Normal
        } else {
            Self::StrikeSlip
        }
    }

    /// `(a, b)` of `log10(L) = a + b·Mw` for subsurface rupture length (km).
    fn length_coefficients(self) -> (f64, f64) {
        match self {
            Self::StrikeSlip => (-2.57, 0.62),
            Self::Reverse => (-2.42, 0.58),
            Self::Normal => (-1.88, 0.50),
            Self::All => (-2.44, 0.59),
        }
    }

    /// `(a, b)` of `log10(W) = a + b·Mw` for down-dip rupture width (km).
    fn width_coefficients(self) -> (f64, f64) {
        match self {
            Self::StrikeSlip => (-0.76, 0.27),
            Self::Reverse => (-1.61, 0.41),
            Self::Normal => (-1.14, 0.35),
            Self::All => (-1.01, 0.32),
        }
    }

    /// Subsurface rupture length (km) for a magnitude.
    pub fn rupture_length(self, magnitude: f64) -> f64 {
        let (a, b) = self.length_coefficients();
        10f64.powf(a + b * magnitude)
    }

    /// Down-dip rupture width (km) for a magnitude.
    pub fn rupture_width(self, magnitude: f64) -> f64 {
        let (a, b) = self.width_coefficients();
        10f64.powf(a + b * magnitude)
    }
}

fn default_tensile() -> f64 {
    0.0
}

/// A source as supplied by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// Rectangle with uniform slip; `corner` is the back updip corner.
    FiniteSlip {
        strike: f64,
        dip: f64,
        rake: f64,
        length: f64,
        width: f64,
        corner: Location,
        slip: f64,
        #[serde(default = "default_tensile")]
        tensile: f64,
    },
    /// Rectangle sized from magnitude by scaling law, centred on `hypocenter`.
    Magnitude {
        strike: f64,
        dip: f64,
        rake: f64,
        hypocenter: Location,
        magnitude: f64,
        /// Regression to use; inferred from rake when absent.
        #[serde(default)]
        style: Option<FaultingStyle>,
    },
    /// Double-couple point source at `hypocenter`.
    FocalMechanism {
        strike: f64,
        dip: f64,
        rake: f64,
        hypocenter: Location,
        magnitude: f64,
    },
}

impl SourceSpec {
    /// Resolve to a validated source fault.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`] for out-of-range angles or dimensions, or a
    /// scaled rupture that would extend above the free surface.
    pub fn to_fault(&self, elastic: &ElasticModel) -> Result<FaultPlane> {
        match *self {
            Self::FiniteSlip {
                strike,
                dip,
                rake,
                length,
                width,
                corner,
                slip,
                tensile,
            } => FaultPlane::finite_source(strike, dip, rake, length, width, corner, slip)?
                .with_tensile(tensile),
            Self::Magnitude {
                strike,
                dip,
                rake,
                hypocenter,
                magnitude,
                style,
            } => {
                check_magnitude(magnitude)?;
                let style = style.unwrap_or_else(|| FaultingStyle::from_rake(rake));
                let length = style.rupture_length(magnitude);
                let width = style.rupture_width(magnitude);
                let moment = moment_from_magnitude(magnitude);
                let slip = moment / (elastic.shear_modulus * length * width * 1.0e6);

                // Orientation only; the corner is moved off the hypocenter below
                let mut fault = FaultPlane {
                    strike,
                    dip,
                    rake,
                    length,
                    width,
                    corner: hypocenter,
                    role: Role::Source(Dislocation::Finite { slip, tensile: 0.0 }),
                };
                let local = Point3::new(0.0, 0.0, hypocenter.depth)
                    - fault.strike_offset(length / 2.0)
                    - fault.downdip_offset(width / 2.0);
                if local.z < 0.0 {
                    return Err(Error::InvalidGeometry(format!(
                        "M{magnitude} rupture ({length:.2} x {width:.2} km) centred at {} km \
                         depth breaks through the free surface",
                        hypocenter.depth
                    )));
                }
                fault.corner = GeoFrame::at(&hypocenter).to_geographic(&local);
                fault.validate()?;
                Ok(fault)
            }
            Self::FocalMechanism {
                strike,
                dip,
                rake,
                hypocenter,
                magnitude,
            } => {
                check_magnitude(magnitude)?;
                let potency = moment_from_magnitude(magnitude) / elastic.shear_modulus;
                FaultPlane::point_source(
                    strike,
                    dip,
                    rake,
                    hypocenter,
                    Potency::from_rake(potency, rake),
                )
            }
        }
    }
}

fn check_magnitude(magnitude: f64) -> Result<()> {
    if magnitude.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidGeometry("magnitude must be finite".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moment_magnitude_round_trip() {
        assert_relative_eq!(moment_from_magnitude(6.0), 10f64.powf(18.1), max_relative = 1e-12);
        for &mw in &[4.5, 6.0, 7.3] {
            assert_relative_eq!(magnitude_from_moment(moment_from_magnitude(mw)), mw, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_style_from_rake() {
        assert_eq!(FaultingStyle::from_rake(0.0), FaultingStyle::StrikeSlip);
        assert_eq!(FaultingStyle::from_rake(180.0), FaultingStyle::StrikeSlip);
        assert_eq!(FaultingStyle::from_rake(90.0), FaultingStyle::Reverse);
        assert_eq!(FaultingStyle::from_rake(-90.0), FaultingStyle::Normal);
        assert_eq!(FaultingStyle::from_rake(270.0), FaultingStyle::Normal);
        assert_eq!(FaultingStyle::from_rake(45.0), FaultingStyle::StrikeSlip);
    }

    #[test]
    fn test_wells_coppersmith_strike_slip() {
        let style = FaultingStyle::StrikeSlip;
        assert_relative_eq!(style.rupture_length(7.0), 10f64.powf(1.77), max_relative = 1e-12);
        assert_relative_eq!(style.rupture_width(7.0), 10f64.powf(1.13), max_relative = 1e-12);
    }

    #[test]
    fn test_finite_slip_spec() {
        let spec = SourceSpec::FiniteSlip {
            strike: 10.0,
            dip: 70.0,
            rake: 90.0,
            length: 12.0,
            width: 6.0,
            corner: Location::new(0.0, 0.0, 1.0),
            slip: 1.5,
            tensile: 0.2,
        };
        let fault = spec.to_fault(&ElasticModel::default()).unwrap();
        assert_eq!(
            fault.dislocation(),
            Some(&Dislocation::Finite {
                slip: 1.5,
                tensile: 0.2
            })
        );
    }

    #[test]
    fn test_magnitude_spec_preserves_moment_and_centre() {
        let elastic = ElasticModel::default();
        let hypocenter = Location::new(-117.0, 34.0, 10.0);
        let spec = SourceSpec::Magnitude {
            strike: 45.0,
            dip: 60.0,
            rake: 90.0,
            hypocenter,
            magnitude: 6.5,
            style: None,
        };
        let fault = spec.to_fault(&elastic).unwrap();

        assert_relative_eq!(fault.length, FaultingStyle::Reverse.rupture_length(6.5), max_relative = 1e-12);
        assert_relative_eq!(
            fault.seismic_moment(&elastic),
            moment_from_magnitude(6.5),
            max_relative = 1e-10
        );

        // Frames anchored at the hypocenter and at the corner differ slightly
        // on the sphere, so the centre is recovered to within tens of metres
        let centroid = fault.centroid();
        let offset = GeoFrame::at(&hypocenter).to_local(&centroid);
        assert_relative_eq!(offset.x, 0.0, epsilon = 0.05);
        assert_relative_eq!(offset.y, 0.0, epsilon = 0.05);
        assert_relative_eq!(centroid.depth, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_magnitude_spec_breaking_surface_rejected() {
        let spec = SourceSpec::Magnitude {
            strike: 0.0,
            dip: 90.0,
            rake: 0.0,
            hypocenter: Location::new(0.0, 0.0, 1.0),
            magnitude: 7.0,
            style: None,
        };
        assert!(matches!(
            spec.to_fault(&ElasticModel::default()),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_focal_mechanism_spec() {
        let elastic = ElasticModel::default();
        let spec = SourceSpec::FocalMechanism {
            strike: 0.0,
            dip: 90.0,
            rake: 180.0,
            hypocenter: Location::new(0.0, 0.0, 8.0),
            magnitude: 5.0,
        };
        let fault = spec.to_fault(&elastic).unwrap();
        assert!(fault.is_point_source());
        assert_relative_eq!(
            magnitude_from_moment(fault.seismic_moment(&elastic)),
            5.0,
            epsilon = 1e-12
        );
        let potency = fault.potency();
        assert!(potency.strike_slip < 0.0);
    }

    #[test]
    fn test_spec_deserialization() {
        let json = r#"{
            "kind": "magnitude",
            "strike": 30.0, "dip": 80.0, "rake": 0.0,
            "hypocenter": {"lon": 1.0, "lat": 2.0, "depth": 12.0},
            "magnitude": 6.0
        }"#;
        let spec: SourceSpec = serde_json::from_str(json).unwrap();
        assert!(matches!(spec, SourceSpec::Magnitude { style: None, .. }));

        let json = r#"{
            "kind": "finite_slip",
            "strike": 30.0, "dip": 80.0, "rake": 0.0, "length": 5.0, "width": 3.0,
            "corner": {"lon": 1.0, "lat": 2.0, "depth": 0.0},
            "slip": 0.5
        }"#;
        let spec: SourceSpec = serde_json::from_str(json).unwrap();
        assert!(matches!(spec, SourceSpec::FiniteSlip { tensile, .. } if tensile == 0.0));
    }
}
