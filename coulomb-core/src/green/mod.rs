//! Green's function interface.
//!
//! The [`GreenFunction`] trait is the seam between geometry and the closed-form
//! elastic solution, so the aggregator works with any kernel uniformly and
//! tests can substitute their own.
//!
//! # Submodules
//!
//! - [`dc3d`] - Okada (1992) rectangular and point-source kernels
//! - [`okada`] - Adapter from fault planes to the Okada kernels

use crate::error::Result;
use crate::fault::FaultPlane;
use crate::geo::Location;
use crate::material::ElasticModel;
use crate::types::{DisplacementGradient, Vec3};
use serde::{Deserialize, Serialize};

pub mod dc3d;
pub mod okada;

pub use okada::OkadaHalfSpace;

/// A location at which displacement and its gradient are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub location: Location,
}

impl ObservationPoint {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

impl From<Location> for ObservationPoint {
    fn from(location: Location) -> Self {
        Self { location }
    }
}

/// Response of one source at one observation point.
///
/// Displacement is in metres and the gradient is dimensionless, both in the
/// east-north-up frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreenResponse {
    pub displacement: Vec3,
    pub gradient: DisplacementGradient,
    /// The point lies on a displacement discontinuity of the source; the
    /// response has been replaced by zero.
    pub singular: bool,
}

impl GreenResponse {
    /// Zero response flagged as singular.
    pub fn singular() -> Self {
        Self {
            displacement: Vec3::zeros(),
            gradient: DisplacementGradient::zero(),
            singular: true,
        }
    }
}

/// Elastic half-space solution for a single source.
///
/// Implementations must be thread-safe (Send + Sync) so observation points can
/// be evaluated in parallel, and must be pure: the same inputs always give
/// the same response.
pub trait GreenFunction: Send + Sync {
    /// Displacement and displacement gradient due to `source` at `point`.
    ///
    /// # Arguments
    ///
    /// * `source` - Source fault (finite or point) carrying a dislocation
    /// * `elastic` - Half-space moduli
    /// * `point` - Observation location
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GreenFunction`] when the solution cannot be
    /// evaluated for this pair (for example a point above the free surface).
    fn evaluate(
        &self,
        source: &FaultPlane,
        elastic: &ElasticModel,
        point: &ObservationPoint,
    ) -> Result<GreenResponse>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}
