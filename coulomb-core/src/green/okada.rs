//! Okada (1992) half-space adapter.
//!
//! The observation point is projected in a frame anchored at the source's
//! back updip corner, rotated into the fault frame (`x` along strike, `y`
//! to the left of strike, `z` up), evaluated in metres, and rotated back to
//! east-north-up.

use super::dc3d::{Kernel, Output};
use super::{GreenFunction, GreenResponse, ObservationPoint};
use crate::error::{Error, Result};
use crate::fault::{Dislocation, FaultPlane, Role};
use crate::geo::GeoFrame;
use crate::material::ElasticModel;
use crate::types::{DisplacementGradient, Vec3};
use nalgebra::Matrix3;

const M_PER_KM: f64 = 1000.0;

/// Homogeneous elastic half-space with a traction-free surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkadaHalfSpace;

impl OkadaHalfSpace {
    pub fn new() -> Self {
        Self
    }
}

/// Rotation taking east-north-up components into the fault frame.
fn fault_rotation(strike: f64) -> Matrix3<f64> {
    let (sin_s, cos_s) = strike.to_radians().sin_cos();
    Matrix3::new(
        sin_s, cos_s, 0.0,
        -cos_s, sin_s, 0.0,
        0.0, 0.0, 1.0,
    )
}

impl GreenFunction for OkadaHalfSpace {
    fn evaluate(
        &self,
        source: &FaultPlane,
        elastic: &ElasticModel,
        point: &ObservationPoint,
    ) -> Result<GreenResponse> {
        let location = &point.location;
        if !(location.depth.is_finite() && location.lon.is_finite() && location.lat.is_finite()) {
            return Err(Error::GreenFunction(
                "observation location must be finite".into(),
            ));
        }
        if location.depth < 0.0 {
            return Err(Error::GreenFunction(format!(
                "observation point above the free surface (depth {} km)",
                location.depth
            )));
        }
        if source.corner.depth < 0.0 {
            return Err(Error::GreenFunction(format!(
                "source above the free surface (depth {} km)",
                source.corner.depth
            )));
        }
        let dislocation = match source.role {
            Role::Source(d) => d,
            Role::Receiver => {
                return Err(Error::GreenFunction(
                    "receiver planes carry no dislocation".into(),
                ))
            }
        };

        let rotation = fault_rotation(source.strike);
        let local = GeoFrame::at(&source.corner).to_local(location);
        let horizontal = rotation * Vec3::new(local.x, local.y, 0.0) * M_PER_KM;
        let station = [horizontal.x, horizontal.y, -location.depth * M_PER_KM];
        let depth = source.corner.depth * M_PER_KM;

        let kernel = Kernel::new(elastic.alpha(), source.dip);
        let output = match dislocation {
            Dislocation::Finite { slip, tensile } => {
                let (sin_r, cos_r) = source.rake.to_radians().sin_cos();
                kernel.dc3d(
                    station,
                    depth,
                    [0.0, source.length * M_PER_KM],
                    [-source.width * M_PER_KM, 0.0],
                    [slip * cos_r, slip * sin_r, tensile],
                )
            }
            Dislocation::Point(potency) => kernel.dc3d0(
                station,
                depth,
                [
                    potency.strike_slip,
                    potency.dip_slip,
                    potency.tensile,
                    potency.inflation,
                ],
            ),
        };

        Ok(match output {
            Some(u) => to_geographic_frame(&u, &rotation),
            None => GreenResponse::singular(),
        })
    }

    fn name(&self) -> &str {
        "okada92"
    }
}

fn to_geographic_frame(u: &Output, rotation: &Matrix3<f64>) -> GreenResponse {
    let displacement = rotation.transpose() * Vec3::new(u[0], u[1], u[2]);
    // Columns of the kernel's derivative block are ∂u/∂x, ∂u/∂y, ∂u/∂z
    let gradient = Matrix3::from_column_slice(&u[3..12]);
    GreenResponse {
        displacement,
        gradient: DisplacementGradient(rotation.transpose() * gradient * rotation),
        singular: false,
    }
}
