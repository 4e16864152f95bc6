//! Error types for deformation and stress computations.
//!
//! Geometry and configuration problems are fatal and surface as [`Error`].
//! Per-point numerical problems are isolated: a failed Green's function
//! evaluation becomes an [`AggregationError`] attached to that point only, and
//! an observation point sitting on a source discontinuity is flagged with a
//! [`SingularSourceWarning`] while the computation carries on.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a model.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed fault geometry (non-positive dimensions, out-of-range angles).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid elastic moduli, run parameters, or empty input sets.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The elastic solution could not be evaluated for a source/point pair.
    #[error("green's function evaluation failed: {0}")]
    GreenFunction(String),

    /// A source contribution to a specific observation point failed.
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// Failure of one source patch's contribution at one observation point.
///
/// Only the point named by `point_index` is affected; every other point's
/// sum is computed normally.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("source patch {source_index} failed at observation point {point_index}: {reason}")]
pub struct AggregationError {
    /// Index of the observation point whose sum failed.
    pub point_index: usize,
    /// Index of the failing source patch in the aggregated source list.
    pub source_index: usize,
    /// Human-readable cause.
    pub reason: String,
}

/// An observation point coincided with a source discontinuity.
///
/// The contribution of that source was replaced by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SingularSourceWarning {
    /// Index of the offending source patch in the aggregated source list.
    pub source_index: usize,
}

impl fmt::Display for SingularSourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "observation point lies on source patch {}; contribution set to zero",
            self.source_index
        )
    }
}
