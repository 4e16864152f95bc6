//! Rectangular fault planes and point sources.
//!
//! A [`FaultPlane`] is the single geometric type for both roles a fault can
//! play: a *source* carries a dislocation and drives deformation, a *receiver*
//! carries none and is only used as a frame to resolve stress on.
//!
//! # Conventions
//!
//! - `strike` ∈ [0°, 360°) clockwise from north, `dip` ∈ [0°, 90°], the plane
//!   dips to the right when looking along strike.
//! - `rake` follows Aki & Richards: 0° left-lateral, 90° reverse,
//!   180° right-lateral, -90° normal.
//! - `corner` is the back updip corner: the shallow corner from which the
//!   plane extends `length` km along strike and `width` km down dip.
//! - Lengths, widths and depths are in km, slip and opening in m.

use crate::error::{Error, Result};
use crate::geo::{GeoFrame, Location};
use crate::material::ElasticModel;
use crate::types::{Point3, Vec3};
use serde::{Deserialize, Serialize};

/// Potency (m³) of a point source, moment divided by the relevant modulus.
///
/// Strike-slip potency is left-lateral positive and dip-slip potency is
/// reverse positive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Potency {
    pub strike_slip: f64,
    pub dip_slip: f64,
    pub tensile: f64,
    pub inflation: f64,
}

impl Potency {
    /// Double-couple potency of magnitude `potency` in the rake direction.
    pub fn from_rake(potency: f64, rake: f64) -> Self {
        let (sin_r, cos_r) = rake.to_radians().sin_cos();
        Self {
            strike_slip: potency * cos_r,
            dip_slip: potency * sin_r,
            tensile: 0.0,
            inflation: 0.0,
        }
    }

    /// Shear (double-couple) potency magnitude.
    pub fn shear(&self) -> f64 {
        self.strike_slip.hypot(self.dip_slip)
    }

    fn is_finite(&self) -> bool {
        self.strike_slip.is_finite()
            && self.dip_slip.is_finite()
            && self.tensile.is_finite()
            && self.inflation.is_finite()
    }
}

/// Displacement discontinuity carried by a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dislocation {
    /// Uniform slip (m) in the rake direction plus tensile opening (m).
    Finite { slip: f64, tensile: f64 },
    /// Point source of zero area.
    Point(Potency),
}

/// Role of a fault plane in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Source(Dislocation),
    Receiver,
}

/// A planar rectangular fault (or a point source when `length = width = 0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultPlane {
    /// Strike (degrees clockwise from north).
    pub strike: f64,
    /// Dip (degrees from horizontal).
    pub dip: f64,
    /// Rake (degrees). For receivers, the direction shear is resolved in.
    pub rake: f64,
    /// Along-strike length (km).
    pub length: f64,
    /// Down-dip width (km).
    pub width: f64,
    /// Back updip corner; for point sources, the source location.
    pub corner: Location,
    /// Source or receiver.
    pub role: Role,
}

impl FaultPlane {
    /// Create a receiver fault.
    pub fn receiver(
        strike: f64,
        dip: f64,
        rake: f64,
        length: f64,
        width: f64,
        corner: Location,
    ) -> Result<Self> {
        let fault = Self {
            strike,
            dip,
            rake,
            length,
            width,
            corner,
            role: Role::Receiver,
        };
        fault.validate()?;
        Ok(fault)
    }

    /// Create a finite source with uniform slip (m) and no opening.
    pub fn finite_source(
        strike: f64,
        dip: f64,
        rake: f64,
        length: f64,
        width: f64,
        corner: Location,
        slip: f64,
    ) -> Result<Self> {
        let fault = Self {
            strike,
            dip,
            rake,
            length,
            width,
            corner,
            role: Role::Source(Dislocation::Finite { slip, tensile: 0.0 }),
        };
        fault.validate()?;
        Ok(fault)
    }

    /// Create a point source at `location`.
    pub fn point_source(
        strike: f64,
        dip: f64,
        rake: f64,
        location: Location,
        potency: Potency,
    ) -> Result<Self> {
        let fault = Self {
            strike,
            dip,
            rake,
            length: 0.0,
            width: 0.0,
            corner: location,
            role: Role::Source(Dislocation::Point(potency)),
        };
        fault.validate()?;
        Ok(fault)
    }

    /// Copy of a finite source with a tensile opening (m).
    pub fn with_tensile(self, opening: f64) -> Result<Self> {
        match self.role {
            Role::Source(Dislocation::Finite { slip, .. }) => {
                let fault = Self {
                    role: Role::Source(Dislocation::Finite {
                        slip,
                        tensile: opening,
                    }),
                    ..self
                };
                fault.validate()?;
                Ok(fault)
            }
            _ => Err(Error::InvalidGeometry(
                "tensile opening requires a finite source".into(),
            )),
        }
    }

    /// Copy of this fault as a finite source with a different slip, keeping
    /// any opening. Receivers become sources.
    pub fn with_slip(&self, slip: f64) -> Result<Self> {
        let tensile = match self.role {
            Role::Source(Dislocation::Finite { tensile, .. }) => tensile,
            Role::Source(Dislocation::Point(_)) => {
                return Err(Error::InvalidGeometry(
                    "a point source has no slip to change".into(),
                ))
            }
            Role::Receiver => 0.0,
        };
        let fault = Self {
            role: Role::Source(Dislocation::Finite { slip, tensile }),
            ..*self
        };
        fault.validate()?;
        Ok(fault)
    }

    /// Copy of this plane stripped of its dislocation.
    pub fn as_receiver(&self) -> Self {
        Self {
            role: Role::Receiver,
            ..*self
        }
    }

    /// Check angle ranges, dimensions and dislocation values.
    pub fn validate(&self) -> Result<()> {
        if !(self.strike.is_finite() && (0.0..360.0).contains(&self.strike)) {
            return Err(Error::InvalidGeometry(format!(
                "strike must be in [0, 360), got {}",
                self.strike
            )));
        }
        if !(self.dip.is_finite() && (0.0..=90.0).contains(&self.dip)) {
            return Err(Error::InvalidGeometry(format!(
                "dip must be in [0, 90], got {}",
                self.dip
            )));
        }
        if !self.rake.is_finite() {
            return Err(Error::InvalidGeometry("rake must be finite".into()));
        }
        let c = &self.corner;
        if !(c.lon.is_finite() && c.lat.is_finite() && c.depth.is_finite()) {
            return Err(Error::InvalidGeometry(
                "corner location must be finite".into(),
            ));
        }
        if c.depth < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "fault lies above the free surface (depth {})",
                c.depth
            )));
        }

        match self.role {
            Role::Source(Dislocation::Point(potency)) => {
                if self.length != 0.0 || self.width != 0.0 {
                    return Err(Error::InvalidGeometry(
                        "a point source must have zero length and width".into(),
                    ));
                }
                if !potency.is_finite() {
                    return Err(Error::InvalidGeometry("potency must be finite".into()));
                }
            }
            Role::Source(Dislocation::Finite { slip, tensile }) => {
                self.validate_dimensions()?;
                if !(slip.is_finite() && slip >= 0.0) {
                    return Err(Error::InvalidGeometry(format!(
                        "slip must be non-negative, got {slip}"
                    )));
                }
                if !tensile.is_finite() {
                    return Err(Error::InvalidGeometry("opening must be finite".into()));
                }
            }
            Role::Receiver => self.validate_dimensions()?,
        }
        Ok(())
    }

    fn validate_dimensions(&self) -> Result<()> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "length must be positive, got {}",
                self.length
            )));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "width must be positive, got {}",
                self.width
            )));
        }
        Ok(())
    }

    pub fn is_source(&self) -> bool {
        matches!(self.role, Role::Source(_))
    }

    pub fn is_receiver(&self) -> bool {
        matches!(self.role, Role::Receiver)
    }

    pub fn is_point_source(&self) -> bool {
        matches!(self.role, Role::Source(Dislocation::Point(_)))
    }

    /// The dislocation carried by a source.
    pub fn dislocation(&self) -> Option<&Dislocation> {
        match &self.role {
            Role::Source(d) => Some(d),
            Role::Receiver => None,
        }
    }

    /// Plane area (km²).
    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    /// Depth of the updip edge (km).
    pub fn top_depth(&self) -> f64 {
        self.corner.depth
    }

    /// Depth of the downdip edge (km).
    pub fn bottom_depth(&self) -> f64 {
        self.corner.depth + self.width * self.dip.to_radians().sin()
    }

    /// Unit vector along strike (east, north, up).
    pub fn strike_vector(&self) -> Vec3 {
        let (sin_s, cos_s) = self.strike.to_radians().sin_cos();
        Vec3::new(sin_s, cos_s, 0.0)
    }

    /// Unit vector pointing down dip (east, north, up).
    pub fn dip_vector(&self) -> Vec3 {
        let (sin_s, cos_s) = self.strike.to_radians().sin_cos();
        let (sin_d, cos_d) = self.dip.to_radians().sin_cos();
        Vec3::new(cos_d * cos_s, -cos_d * sin_s, -sin_d)
    }

    /// Unit normal `dip × strike`, pointing into the hanging wall (east, north, up).
    pub fn normal_vector(&self) -> Vec3 {
        self.dip_vector().cross(&self.strike_vector())
    }

    /// Offset of `distance` km along strike in the local (east, north, depth) frame.
    pub fn strike_offset(&self, distance: f64) -> Point3 {
        let (sin_s, cos_s) = self.strike.to_radians().sin_cos();
        Point3::new(distance * sin_s, distance * cos_s, 0.0)
    }

    /// Offset of `distance` km down dip in the local (east, north, depth) frame.
    pub fn downdip_offset(&self, distance: f64) -> Point3 {
        let (sin_s, cos_s) = self.strike.to_radians().sin_cos();
        let (sin_d, cos_d) = self.dip.to_radians().sin_cos();
        let horizontal = distance * cos_d;
        Point3::new(horizontal * cos_s, -horizontal * sin_s, distance * sin_d)
    }

    /// Location reached from the corner by moving `along` km along strike and
    /// `down` km down dip.
    pub fn point_on_plane(&self, along: f64, down: f64) -> Location {
        let frame = GeoFrame::at(&self.corner);
        let local = Point3::new(0.0, 0.0, self.corner.depth)
            + self.strike_offset(along)
            + self.downdip_offset(down);
        frame.to_geographic(&local)
    }

    /// Centre of the plane. Point sources return their location.
    pub fn centroid(&self) -> Location {
        self.point_on_plane(self.length / 2.0, self.width / 2.0)
    }

    /// Corners in order: updip start, updip end, downdip end, downdip start.
    pub fn corners(&self) -> [Location; 4] {
        [
            self.corner,
            self.point_on_plane(self.length, 0.0),
            self.point_on_plane(self.length, self.width),
            self.point_on_plane(0.0, self.width),
        ]
    }

    /// Right-lateral and reverse slip components (m) of a finite source.
    pub fn slip_components(&self) -> Option<(f64, f64)> {
        match self.role {
            Role::Source(Dislocation::Finite { slip, .. }) => {
                let (sin_r, cos_r) = self.rake.to_radians().sin_cos();
                Some((-slip * cos_r, slip * sin_r))
            }
            _ => None,
        }
    }

    /// Potency (m³) of the source; a finite source counts slip × area.
    pub fn potency(&self) -> Potency {
        match self.role {
            Role::Source(Dislocation::Point(p)) => p,
            Role::Source(Dislocation::Finite { slip, tensile }) => {
                let area_m2 = self.area() * 1.0e6;
                Potency {
                    tensile: tensile * area_m2,
                    ..Potency::from_rake(slip * area_m2, self.rake)
                }
            }
            Role::Receiver => Potency::default(),
        }
    }

    /// Scalar seismic moment (N·m) of the shear dislocation.
    pub fn seismic_moment(&self, elastic: &ElasticModel) -> f64 {
        elastic.shear_modulus * self.potency().shear()
    }
}

/// Rake (degrees, in (-180, 180]) from right-lateral and reverse components.
pub fn rake_from_components(rtlat: f64, reverse: f64) -> f64 {
    reverse.atan2(-rtlat).to_degrees()
}

/// Sum of seismic moments (N·m) of a set of sources.
pub fn total_moment(faults: &[FaultPlane], elastic: &ElasticModel) -> f64 {
    faults.iter().map(|f| f.seismic_moment(elastic)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corner() -> Location {
        Location::new(-117.0, 34.0, 2.0)
    }

    #[test]
    fn test_receiver_creation() {
        let fault = FaultPlane::receiver(30.0, 60.0, 90.0, 10.0, 5.0, corner()).unwrap();
        assert!(fault.is_receiver());
        assert!(!fault.is_source());
        assert!(fault.dislocation().is_none());
        assert_relative_eq!(fault.area(), 50.0);
    }

    #[test]
    fn test_invalid_angles() {
        assert!(matches!(
            FaultPlane::receiver(360.0, 60.0, 0.0, 10.0, 5.0, corner()),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(FaultPlane::receiver(-5.0, 60.0, 0.0, 10.0, 5.0, corner()).is_err());
        assert!(FaultPlane::receiver(0.0, 90.5, 0.0, 10.0, 5.0, corner()).is_err());
        assert!(FaultPlane::receiver(0.0, -1.0, 0.0, 10.0, 5.0, corner()).is_err());
        assert!(FaultPlane::receiver(0.0, 45.0, f64::NAN, 10.0, 5.0, corner()).is_err());
        assert!(FaultPlane::receiver(0.0, 90.0, 0.0, 10.0, 5.0, corner()).is_ok());
        assert!(FaultPlane::receiver(0.0, 0.0, 0.0, 10.0, 5.0, corner()).is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(FaultPlane::receiver(0.0, 45.0, 0.0, 0.0, 5.0, corner()).is_err());
        assert!(FaultPlane::receiver(0.0, 45.0, 0.0, 10.0, -5.0, corner()).is_err());
        assert!(FaultPlane::finite_source(0.0, 45.0, 0.0, 0.0, 0.0, corner(), 1.0).is_err());
        assert!(FaultPlane::finite_source(0.0, 45.0, 0.0, 10.0, 5.0, corner(), -1.0).is_err());
    }

    #[test]
    fn test_above_surface_rejected() {
        let shallow = Location::new(0.0, 0.0, -0.1);
        assert!(FaultPlane::finite_source(0.0, 45.0, 0.0, 10.0, 5.0, shallow, 1.0).is_err());
    }

    #[test]
    fn test_point_and_zero_slip_sources_are_valid() {
        let point = FaultPlane::point_source(10.0, 80.0, 0.0, corner(), Potency::from_rake(1e6, 0.0));
        assert!(point.unwrap().is_point_source());

        let silent = FaultPlane::finite_source(10.0, 80.0, 0.0, 10.0, 5.0, corner(), 0.0).unwrap();
        assert_eq!(silent.seismic_moment(&ElasticModel::default()), 0.0);
    }

    #[test]
    fn test_point_source_requires_zero_area() {
        let mut fault =
            FaultPlane::point_source(10.0, 80.0, 0.0, corner(), Potency::from_rake(1e6, 0.0)).unwrap();
        fault.length = 1.0;
        assert!(fault.validate().is_err());
    }

    #[test]
    fn test_unit_vectors_orthonormal() {
        for &(strike, dip) in &[(0.0, 90.0), (37.0, 45.0), (200.0, 10.0), (315.0, 0.0)] {
            let fault = FaultPlane::receiver(strike, dip, 0.0, 1.0, 1.0, corner()).unwrap();
            let s = fault.strike_vector();
            let d = fault.dip_vector();
            let n = fault.normal_vector();
            assert_relative_eq!(s.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(s.dot(&d), 0.0, epsilon = 1e-12);
            assert_relative_eq!(s.dot(&n), 0.0, epsilon = 1e-12);
            assert_relative_eq!(d.dot(&n), 0.0, epsilon = 1e-12);
            // Normal points up into the hanging wall
            assert!(n.z >= -1e-12);
        }
    }

    #[test]
    fn test_vertical_north_striking_normal_points_east() {
        let fault = FaultPlane::receiver(0.0, 90.0, 0.0, 1.0, 1.0, corner()).unwrap();
        let n = fault.normal_vector();
        assert_relative_eq!(n.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_downdip_offset_for_east_dipping_plane() {
        let fault = FaultPlane::receiver(0.0, 30.0, 90.0, 1.0, 1.0, corner()).unwrap();
        let offset = fault.downdip_offset(2.0);
        assert_relative_eq!(offset.x, 2.0 * 30f64.to_radians().cos(), epsilon = 1e-12);
        assert_relative_eq!(offset.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(offset.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centroid_and_bottom_depth() {
        let fault = FaultPlane::receiver(90.0, 30.0, 0.0, 10.0, 8.0, corner()).unwrap();
        assert_relative_eq!(fault.bottom_depth(), 2.0 + 4.0, epsilon = 1e-12);

        let centroid = fault.centroid();
        assert_relative_eq!(centroid.depth, 4.0, epsilon = 1e-12);
        let local = GeoFrame::at(&fault.corner).to_local(&centroid);
        // Strike east: half length east, down dip toward the south
        assert_relative_eq!(local.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(local.y, -4.0 * 30f64.to_radians().cos(), epsilon = 1e-9);
    }

    #[test]
    fn test_corners_order() {
        let fault = FaultPlane::receiver(0.0, 90.0, 0.0, 10.0, 5.0, corner()).unwrap();
        let [c0, c1, c2, c3] = fault.corners();
        assert_eq!(c0, fault.corner);
        assert!(c1.lat > c0.lat);
        assert_relative_eq!(c1.depth, 2.0, epsilon = 1e-12);
        assert_relative_eq!(c2.depth, 7.0, epsilon = 1e-12);
        assert_relative_eq!(c3.depth, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slip_components_and_rake() {
        let src = FaultPlane::finite_source(0.0, 90.0, 180.0, 10.0, 5.0, corner(), 2.0).unwrap();
        let (rtlat, reverse) = src.slip_components().unwrap();
        assert_relative_eq!(rtlat, 2.0, epsilon = 1e-12);
        assert_relative_eq!(reverse, 0.0, epsilon = 1e-12);

        assert_relative_eq!(rake_from_components(-1.0, 0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(rake_from_components(0.0, 1.0), 90.0, epsilon = 1e-12);
        assert_relative_eq!(rake_from_components(0.0, -1.0), -90.0, epsilon = 1e-12);
        assert_relative_eq!(rake_from_components(1.0, 0.0), 180.0, epsilon = 1e-12);

        let oblique = FaultPlane::finite_source(0.0, 60.0, 135.0, 10.0, 5.0, corner(), 1.0).unwrap();
        let (rtlat, reverse) = oblique.slip_components().unwrap();
        assert_relative_eq!(rake_from_components(rtlat, reverse), 135.0, epsilon = 1e-10);
    }

    #[test]
    fn test_seismic_moment() {
        let elastic = ElasticModel::default();
        let src = FaultPlane::finite_source(0.0, 90.0, 0.0, 10.0, 5.0, corner(), 1.0).unwrap();
        // μ A D = 30e9 * 50e6 * 1
        assert_relative_eq!(src.seismic_moment(&elastic), 1.5e18, max_relative = 1e-12);

        let both = [src, src.with_slip(2.0).unwrap()];
        assert_relative_eq!(total_moment(&both, &elastic), 4.5e18, max_relative = 1e-12);
    }

    #[test]
    fn test_with_tensile() {
        let src = FaultPlane::finite_source(0.0, 90.0, 0.0, 10.0, 5.0, corner(), 1.0)
            .unwrap()
            .with_tensile(0.5)
            .unwrap();
        assert_eq!(
            src.dislocation(),
            Some(&Dislocation::Finite {
                slip: 1.0,
                tensile: 0.5
            })
        );
        let receiver = FaultPlane::receiver(0.0, 90.0, 0.0, 10.0, 5.0, corner()).unwrap();
        assert!(receiver.with_tensile(0.5).is_err());
        assert!(src.as_receiver().is_receiver());
    }
}
