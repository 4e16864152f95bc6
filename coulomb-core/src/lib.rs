//! Coulomb Core - elastic half-space stress modeling
//!
//! Static deformation and Coulomb failure stress change on receiver faults
//! caused by slip on source faults:
//! - Rectangular and point dislocation sources, with magnitude and
//!   focal-mechanism constructors
//! - Regular subdivision of faults into sub-patches
//! - Okada (1992) half-space Green's functions
//! - Parallel superposition of source responses using Rayon
//! - Projection of stress onto receiver planes
//!
//! # Architecture
//!
//! The library is designed around these core abstractions:
//!
//! - [`FaultPlane`]: Geometry and kinematics of a source or receiver
//! - [`GreenFunction`] trait: Response of one source at one point
//! - [`aggregate()`]: Superposition over all sources at every point
//! - [`StressResolver`]: Shear, normal and Coulomb stress on a receiver
//! - [`Pipeline`]: Validated end-to-end run
//!
//! # Example
//!
//! ```
//! use coulomb_core::{FaultPlane, Location, ModelInputs, Pipeline, RunConfig};
//!
//! let source = FaultPlane::finite_source(
//!     0.0, 90.0, 180.0, 10.0, 10.0, Location::new(0.0, 0.0, 0.0), 1.0,
//! )?;
//! let receiver = FaultPlane::receiver(
//!     0.0, 90.0, 180.0, 5.0, 10.0, Location::new(0.0, 0.15, 0.0),
//! )?;
//! let inputs = ModelInputs {
//!     sources: vec![source],
//!     receivers: vec![receiver],
//!     ..ModelInputs::default()
//! };
//! let output = Pipeline::new(inputs, RunConfig::default())?.run()?;
//! for r in &output.receivers {
//!     if let Ok(stress) = &r.result {
//!         println!("{:.3} kPa", stress.coulomb);
//!     }
//! }
//! # Ok::<(), coulomb_core::Error>(())
//! ```

pub mod types;
pub mod material;
pub mod geo;
pub mod fault;
pub mod source;
pub mod discretize;
pub mod green;
pub mod aggregate;
pub mod stress;
pub mod config;
pub mod pipeline;
pub mod error;

pub use types::{DisplacementGradient, Point3, StrainTensor, StressTensor, Vec3};
pub use material::ElasticModel;
pub use geo::{GeoFrame, Location};
pub use fault::{Dislocation, FaultPlane, Potency, Role};
pub use source::{FaultingStyle, SourceSpec};
pub use discretize::discretize;
pub use green::{GreenFunction, GreenResponse, ObservationPoint, OkadaHalfSpace};
pub use aggregate::{aggregate, AggregationOptions, PointResponse, ResponseField};
pub use stress::{CoulombStress, StressResolver};
pub use config::{RunConfig, ShearDirection, Split};
pub use pipeline::{ModelInputs, Pipeline, PipelineOutput, RejectedReceiver, SurfaceGrid};
pub use error::{AggregationError, Error, Result, SingularSourceWarning};
