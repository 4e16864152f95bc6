//! End-to-end stress-change run.
//!
//! A [`Pipeline`] validates a [`ModelInputs`] set eagerly, then on
//! [`Pipeline::run`]:
//! 1. Splits every source and receiver into sub-patches
//! 2. Aggregates the source response at receiver centroids, surface grid
//!    nodes and the explicit displacement and strain points in one pass
//! 3. Resolves Coulomb stress on every receiver patch
//!
//! Per-point failures are annotated on the affected record; only invalid
//! inputs abort a run.

use crate::aggregate::{aggregate, AggregationOptions, PointResponse, ResponseField};
use crate::config::{RunConfig, Split};
use crate::discretize::discretize;
use crate::error::{AggregationError, Error, Result, SingularSourceWarning};
use crate::fault::FaultPlane;
use crate::geo::Location;
use crate::green::{GreenFunction, ObservationPoint, OkadaHalfSpace};
use crate::material::ElasticModel;
use crate::stress::{CoulombStress, StressResolver};
use crate::types::{StrainTensor, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Largest number of nodes a [`SurfaceGrid`] may hold.
pub const MAX_GRID_NODES: usize = 10_000_000;

/// Regular lon/lat grid on the free surface, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lon_inc: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lat_inc: f64,
}

impl SurfaceGrid {
    pub fn new(lon: (f64, f64, f64), lat: (f64, f64, f64)) -> Result<Self> {
        let grid = Self {
            lon_min: lon.0,
            lon_max: lon.1,
            lon_inc: lon.2,
            lat_min: lat.0,
            lat_max: lat.1,
            lat_inc: lat.2,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check bounds and increments, and that the grid holds at most
    /// [`MAX_GRID_NODES`] nodes.
    pub fn validate(&self) -> Result<()> {
        let mut n_nodes = 1.0;
        for (axis, min, max, inc) in [
            ("longitude", self.lon_min, self.lon_max, self.lon_inc),
            ("latitude", self.lat_min, self.lat_max, self.lat_inc),
        ] {
            if !(min.is_finite() && max.is_finite() && inc.is_finite()) {
                return Err(Error::Configuration(format!(
                    "{axis} grid bounds must be finite"
                )));
            }
            if inc <= 0.0 {
                return Err(Error::Configuration(format!(
                    "{axis} grid increment must be positive, got {inc}"
                )));
            }
            if max < min {
                return Err(Error::Configuration(format!(
                    "{axis} grid is empty: max {max} < min {min}"
                )));
            }
            n_nodes *= axis_steps(min, max, inc).floor() + 1.0;
        }
        if !(n_nodes <= MAX_GRID_NODES as f64) {
            return Err(Error::Configuration(format!(
                "grid would hold {n_nodes:e} nodes, more than {MAX_GRID_NODES}"
            )));
        }
        Ok(())
    }

    /// Number of nodes along longitude and latitude. Counts saturate for a grid
    /// that fails [`SurfaceGrid::validate`].
    pub fn shape(&self) -> (usize, usize) {
        (
            axis_count(self.lon_min, self.lon_max, self.lon_inc),
            axis_count(self.lat_min, self.lat_max, self.lat_inc),
        )
    }

    /// Grid nodes at zero depth, longitude varying fastest.
    pub fn locations(&self) -> Vec<Location> {
        let (n_lon, n_lat) = self.shape();
        let mut locations = Vec::with_capacity(n_lon.saturating_mul(n_lat).min(MAX_GRID_NODES));
        for j in 0..n_lat {
            let lat = self.lat_min + j as f64 * self.lat_inc;
            for i in 0..n_lon {
                locations.push(Location::surface(self.lon_min + i as f64 * self.lon_inc, lat));
            }
        }
        locations
    }
}

fn axis_steps(min: f64, max: f64, inc: f64) -> f64 {
    // Tolerance keeps an end that falls on the increment despite rounding
    (max - min) / inc + 1e-9
}

fn axis_count(min: f64, max: f64, inc: f64) -> usize {
    (axis_steps(min, max, inc).floor() as usize).saturating_add(1)
}

/// Everything a run consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInputs {
    pub sources: Vec<FaultPlane>,
    pub receivers: Vec<FaultPlane>,
    pub elastic: ElasticModel,
    pub grid: Option<SurfaceGrid>,
    /// Points at which only displacement is reported.
    pub displacement_points: Vec<Location>,
    /// Points at which the strain tensor is reported.
    pub strain_points: Vec<Location>,
}

/// A sub-patch and the index of the input fault it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Patch {
    pub parent: usize,
    pub plane: FaultPlane,
}

/// Coulomb stress on one receiver patch.
///
/// Warning source indices refer to [`PipelineOutput::source_patches`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiverStress {
    pub parent: usize,
    pub plane: FaultPlane,
    pub centroid: Location,
    pub result: std::result::Result<CoulombStress, AggregationError>,
    pub warnings: Vec<SingularSourceWarning>,
}

/// Displacement (m, east-north-up) at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplacementRecord {
    pub location: Location,
    pub displacement: std::result::Result<Vec3, AggregationError>,
    pub warnings: Vec<SingularSourceWarning>,
}

/// Strain tensor at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrainRecord {
    pub location: Location,
    pub strain: std::result::Result<StrainTensor, AggregationError>,
    pub warnings: Vec<SingularSourceWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridDisplacement {
    pub grid: SurfaceGrid,
    /// Nodes in [`SurfaceGrid::locations`] order.
    pub nodes: Vec<DisplacementRecord>,
}

/// A receiver fault left out of a run because its geometry is malformed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedReceiver {
    /// Index into [`ModelInputs::receivers`].
    pub index: usize,
    pub reason: String,
}

/// Results of a run. Point indices in annotated failures are relative to the
/// collection that holds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub source_patches: Vec<Patch>,
    pub receivers: Vec<ReceiverStress>,
    pub grid: Option<GridDisplacement>,
    pub displacements: Vec<DisplacementRecord>,
    pub strains: Vec<StrainRecord>,
    pub rejected_receivers: Vec<RejectedReceiver>,
}

impl PipelineOutput {
    /// Every per-point failure across all observation sets.
    pub fn failures(&self) -> impl Iterator<Item = &AggregationError> {
        let receivers = self.receivers.iter().filter_map(|r| r.result.as_ref().err());
        let grid = self
            .grid
            .iter()
            .flat_map(|g| g.nodes.iter())
            .filter_map(|d| d.displacement.as_ref().err());
        let displacements = self
            .displacements
            .iter()
            .filter_map(|d| d.displacement.as_ref().err());
        let strains = self.strains.iter().filter_map(|s| s.strain.as_ref().err());
        receivers.chain(grid).chain(displacements).chain(strains)
    }
}

/// A validated model ready to run.
#[derive(Debug, Clone)]
pub struct Pipeline<G = OkadaHalfSpace> {
    inputs: ModelInputs,
    config: RunConfig,
    green: G,
    rejected_receivers: Vec<RejectedReceiver>,
}

impl Pipeline<OkadaHalfSpace> {
    /// Validate inputs for a run in an Okada half-space.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::with_green_function`].
    pub fn new(inputs: ModelInputs, config: RunConfig) -> Result<Self> {
        Self::with_green_function(inputs, config, OkadaHalfSpace)
    }
}

impl<G: GreenFunction> Pipeline<G> {
    /// Validate inputs for a run with a custom elastic solution.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] for invalid moduli or run parameters, an
    ///   empty source list, a fault in the wrong role, or nothing to observe
    /// - [`Error::InvalidGeometry`] for a malformed source
    ///
    /// A malformed receiver is not an error. It is left out of the run and
    /// listed in [`PipelineOutput::rejected_receivers`].
    pub fn with_green_function(inputs: ModelInputs, config: RunConfig, green: G) -> Result<Self> {
        inputs.elastic.validate()?;
        config.validate()?;

        if inputs.sources.is_empty() {
            return Err(Error::Configuration("no source faults".into()));
        }
        for (i, source) in inputs.sources.iter().enumerate() {
            source.validate()?;
            if !source.is_source() {
                return Err(Error::Configuration(format!(
                    "source {i} carries no dislocation"
                )));
            }
        }
        let mut rejected_receivers = Vec::new();
        for (i, receiver) in inputs.receivers.iter().enumerate() {
            if !receiver.is_receiver() {
                return Err(Error::Configuration(format!(
                    "receiver {i} carries a dislocation"
                )));
            }
            if let Err(e) = receiver.validate() {
                warn!(receiver = i, error = %e, "skipping malformed receiver");
                rejected_receivers.push(RejectedReceiver {
                    index: i,
                    reason: e.to_string(),
                });
            }
        }
        if let Some(grid) = &inputs.grid {
            grid.validate()?;
        }
        if inputs.receivers.len() == rejected_receivers.len()
            && inputs.grid.is_none()
            && inputs.displacement_points.is_empty()
            && inputs.strain_points.is_empty()
        {
            return Err(Error::Configuration(
                "no receivers or observation points".into(),
            ));
        }

        Ok(Self {
            inputs,
            config,
            green,
            rejected_receivers,
        })
    }

    pub fn inputs(&self) -> &ModelInputs {
        &self.inputs
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn rejected_receivers(&self) -> &[RejectedReceiver] {
        &self.rejected_receivers
    }

    /// Compute every requested output.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned: a failure to split a fault or to build
    /// the thread pool. Per-point failures are stored on their records.
    pub fn run(&self) -> Result<PipelineOutput> {
        let source_patches =
            split_all(self.inputs.sources.iter().enumerate(), self.config.source_split)?;
        let receivers = self
            .inputs
            .receivers
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.rejected_receivers.iter().any(|r| r.index == *i));
        let receiver_patches = split_all(receivers, self.config.receiver_split)?;
        let grid_locations = self
            .inputs
            .grid
            .as_ref()
            .map(SurfaceGrid::locations)
            .unwrap_or_default();

        let centroids: Vec<Location> = receiver_patches.iter().map(|p| p.plane.centroid()).collect();
        let sets = [
            centroids.as_slice(),
            grid_locations.as_slice(),
            self.inputs.displacement_points.as_slice(),
            self.inputs.strain_points.as_slice(),
        ];
        let points: Vec<ObservationPoint> = sets
            .iter()
            .flat_map(|set| set.iter().copied().map(ObservationPoint::from))
            .collect();

        info!(
            green_function = self.green.name(),
            n_sources = self.inputs.sources.len(),
            n_source_patches = source_patches.len(),
            n_receiver_patches = receiver_patches.len(),
            n_points = points.len(),
            "starting stress-change run"
        );

        let planes: Vec<FaultPlane> = source_patches.iter().map(|p| p.plane).collect();
        let field = aggregate(
            &self.green,
            &planes,
            &self.inputs.elastic,
            &points,
            &AggregationOptions {
                n_threads: self.config.n_threads,
            },
        )?;

        let mut responses = field.responses.into_iter();
        let mut offset = 0;
        let mut take = |n: usize| {
            let start = offset;
            offset += n;
            responses
                .by_ref()
                .take(n)
                .map(|r| {
                    r.map_err(|mut e| {
                        e.point_index -= start;
                        e
                    })
                })
                .collect::<Vec<_>>()
        };
        let receiver_field = ResponseField {
            responses: take(centroids.len()),
        };
        let grid_responses = take(grid_locations.len());
        let displacement_responses = take(self.inputs.displacement_points.len());
        let strain_responses = take(self.inputs.strain_points.len());

        let resolver = StressResolver::from_config(self.inputs.elastic, &self.config);
        let receiver_planes: Vec<FaultPlane> = receiver_patches.iter().map(|p| p.plane).collect();
        let stresses = resolver.resolve_field(&receiver_planes, &receiver_field)?;
        let receivers: Vec<ReceiverStress> = receiver_patches
            .into_iter()
            .zip(centroids)
            .zip(stresses)
            .zip(receiver_field.responses)
            .map(|(((patch, centroid), result), response)| ReceiverStress {
                parent: patch.parent,
                plane: patch.plane,
                centroid,
                result,
                warnings: response.map(|r| r.warnings).unwrap_or_default(),
            })
            .collect();

        let grid = self.inputs.grid.map(|grid| GridDisplacement {
            grid,
            nodes: displacement_records(&grid_locations, grid_responses),
        });
        let displacements =
            displacement_records(&self.inputs.displacement_points, displacement_responses);
        let strains = self
            .inputs
            .strain_points
            .iter()
            .zip(strain_responses)
            .map(|(location, response)| {
                let (strain, warnings) = split_response(response, |r| r.gradient.strain());
                StrainRecord {
                    location: *location,
                    strain,
                    warnings,
                }
            })
            .collect();

        let output = PipelineOutput {
            source_patches,
            receivers,
            grid,
            displacements,
            strains,
            rejected_receivers: self.rejected_receivers.clone(),
        };
        let n_failures = output.failures().count();
        if n_failures > 0 {
            warn!(n_failures, "run finished with failed observation points");
        }
        info!(n_receivers = output.receivers.len(), "stress-change run complete");
        Ok(output)
    }
}

fn split_all<'a>(
    faults: impl Iterator<Item = (usize, &'a FaultPlane)>,
    split: Split,
) -> Result<Vec<Patch>> {
    let mut patches = Vec::with_capacity(faults.size_hint().0 * split.count());
    for (parent, fault) in faults {
        let planes = discretize(fault, split.strike, split.dip)?;
        debug!(parent, n_patches = planes.len(), "split fault");
        patches.extend(planes.into_iter().map(|plane| Patch { parent, plane }));
    }
    Ok(patches)
}

fn split_response<T>(
    response: std::result::Result<PointResponse, AggregationError>,
    f: impl FnOnce(&PointResponse) -> T,
) -> (std::result::Result<T, AggregationError>, Vec<SingularSourceWarning>) {
    match response {
        Ok(r) => (Ok(f(&r)), r.warnings),
        Err(e) => (Err(e), Vec::new()),
    }
}

fn displacement_records(
    locations: &[Location],
    responses: Vec<std::result::Result<PointResponse, AggregationError>>,
) -> Vec<DisplacementRecord> {
    locations
        .iter()
        .zip(responses)
        .map(|(location, response)| {
            let (displacement, warnings) = split_response(response, |r| r.displacement);
            DisplacementRecord {
                location: *location,
                displacement,
                warnings,
            }
        })
        .collect()
}
