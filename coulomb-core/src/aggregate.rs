//! Parallel superposition of source responses.
//!
//! Sums the displacement and displacement gradient of every source patch at
//! every observation point, using Rayon for shared-memory parallelism over
//! points. A failure evaluating one source/point pair is confined to that
//! point; every other point is computed normally.

use crate::error::{AggregationError, Error, Result, SingularSourceWarning};
use crate::fault::FaultPlane;
use crate::green::{GreenFunction, ObservationPoint};
use crate::material::ElasticModel;
use crate::types::{DisplacementGradient, Vec3};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Aggregation options.
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    /// Number of parallel threads (0 = Rayon's global pool).
    pub n_threads: usize,
}

/// Superposed response at one observation point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointResponse {
    /// Total displacement (m), east-north-up.
    pub displacement: Vec3,
    /// Total displacement gradient, east-north-up.
    pub gradient: DisplacementGradient,
    /// Sources whose contribution was zeroed because the point lies on them.
    pub warnings: Vec<SingularSourceWarning>,
}

/// Responses at every observation point, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseField {
    pub responses: Vec<std::result::Result<PointResponse, AggregationError>>,
}

impl ResponseField {
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Points whose sum could not be completed.
    pub fn failures(&self) -> impl Iterator<Item = &AggregationError> {
        self.responses.iter().filter_map(|r| r.as_ref().err())
    }
}

/// Sum all source contributions at every observation point.
///
/// Points are evaluated in parallel; each point accumulates its sources
/// sequentially in input order, so results do not depend on the number of
/// threads.
///
/// # Arguments
///
/// * `green` - Elastic solution used for each source/point pair
/// * `sources` - Source patches (already discretized)
/// * `elastic` - Half-space moduli
/// * `points` - Observation points
/// * `options` - Aggregation configuration
///
/// # Errors
///
/// Only a failure to build the requested thread pool is fatal
/// ([`Error::Configuration`]). Per-pair failures are stored in the returned
/// field as [`AggregationError`]s.
pub fn aggregate<G: GreenFunction + ?Sized>(
    green: &G,
    sources: &[FaultPlane],
    elastic: &ElasticModel,
    points: &[ObservationPoint],
    options: &AggregationOptions,
) -> Result<ResponseField> {
    let compute = || {
        points
            .par_iter()
            .enumerate()
            .map(|(point_index, point)| sum_at_point(green, sources, elastic, point_index, point))
            .collect::<Vec<_>>()
    };

    let responses = if options.n_threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.n_threads)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build thread pool: {e}")))?;
        pool.install(compute)
    } else {
        compute()
    };

    Ok(ResponseField { responses })
}

fn sum_at_point<G: GreenFunction + ?Sized>(
    green: &G,
    sources: &[FaultPlane],
    elastic: &ElasticModel,
    point_index: usize,
    point: &ObservationPoint,
) -> std::result::Result<PointResponse, AggregationError> {
    let mut displacement = Vec3::zeros();
    let mut gradient = DisplacementGradient::zero();
    let mut warnings = Vec::new();

    for (source_index, source) in sources.iter().enumerate() {
        let response = green.evaluate(source, elastic, point).map_err(|e| {
            warn!(
                point_index,
                source_index,
                green_function = green.name(),
                error = %e,
                "source contribution failed"
            );
            AggregationError {
                point_index,
                source_index,
                reason: e.to_string(),
            }
        })?;
        if response.singular {
            debug!(point_index, source_index, "observation point lies on source");
            warnings.push(SingularSourceWarning { source_index });
            continue;
        }
        displacement += response.displacement;
        gradient += response.gradient;
    }

    Ok(PointResponse {
        displacement,
        gradient,
        warnings,
    })
}
