//! Stress resolution on receiver faults.
//!
//! A superposed displacement gradient becomes a stress tensor through
//! isotropic linear elasticity:
//! 1. Strain ε = ½ (G + Gᵀ)
//! 2. Stress σ = λ·tr(ε)·I + 2μ·ε
//!
//! The stress is then projected onto the receiver's strike, dip and normal
//! unit vectors. Traction components are reported in kPa with right-lateral,
//! reverse and unclamping senses positive, and the Coulomb failure stress
//! change is `shear + friction × normal`.

use crate::aggregate::{PointResponse, ResponseField};
use crate::config::{RunConfig, ShearDirection};
use crate::error::{AggregationError, Result};
use crate::fault::FaultPlane;
use crate::material::ElasticModel;
use crate::types::{DisplacementGradient, StressTensor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const KPA_PER_PA: f64 = 1.0e-3;

/// Stress change resolved on one receiver (kPa).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoulombStress {
    /// Shear traction along strike, right-lateral positive.
    pub shear_strike: f64,
    /// Shear traction along dip, reverse positive.
    pub shear_dip: f64,
    /// Shear traction in the resolved direction.
    pub shear: f64,
    /// Effective normal traction, unclamping positive.
    pub normal: f64,
    /// Coulomb failure stress change.
    pub coulomb: f64,
}

/// Converts displacement gradients into Coulomb stress changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressResolver {
    elastic: ElasticModel,
    friction: f64,
    skempton: f64,
    shear_direction: ShearDirection,
}

impl StressResolver {
    /// Create a resolver.
    ///
    /// # Arguments
    ///
    /// * `elastic` - Half-space moduli
    /// * `friction` - Effective coefficient of friction
    /// * `skempton` - Skempton's coefficient B; the pore-pressure change
    ///   `B·tr(σ)/3` is removed from the normal traction
    /// * `shear_direction` - Direction in which shear is resolved
    pub fn new(
        elastic: ElasticModel,
        friction: f64,
        skempton: f64,
        shear_direction: ShearDirection,
    ) -> Self {
        Self {
            elastic,
            friction,
            skempton,
            shear_direction,
        }
    }

    pub fn from_config(elastic: ElasticModel, config: &RunConfig) -> Self {
        Self::new(
            elastic,
            config.friction,
            config.skempton,
            config.shear_direction,
        )
    }

    pub fn elastic(&self) -> &ElasticModel {
        &self.elastic
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Stress tensor (Pa, tension positive) from a displacement gradient.
    pub fn stress_tensor(&self, gradient: &DisplacementGradient) -> StressTensor {
        self.elastic.stress(&gradient.strain())
    }

    /// Project a stress tensor onto a receiver plane.
    ///
    /// Only the receiver's orientation and rake are used.
    pub fn resolve(&self, stress: &StressTensor, receiver: &FaultPlane) -> CoulombStress {
        let normal_vector = receiver.normal_vector();
        let traction = stress.traction(&normal_vector);

        let raw_normal = normal_vector.dot(&traction);
        let normal = raw_normal - self.skempton * stress.hydrostatic();
        // `traction` acts on the footwall, so slip of the hanging wall is
        // driven by its negation
        let shear_strike = -receiver.strike_vector().dot(&traction);
        let shear_dip = -receiver.dip_vector().dot(&traction);

        let shear = match self.shear_direction {
            ShearDirection::ReceiverRake => {
                let (sin_r, cos_r) = receiver.rake.to_radians().sin_cos();
                -cos_r * shear_strike + sin_r * shear_dip
            }
            ShearDirection::Maximum => (traction - normal_vector * raw_normal).norm(),
        };

        let shear = shear * KPA_PER_PA;
        let normal = normal * KPA_PER_PA;
        CoulombStress {
            shear_strike: shear_strike * KPA_PER_PA,
            shear_dip: shear_dip * KPA_PER_PA,
            shear,
            normal,
            coulomb: shear + self.friction * normal,
        }
    }

    /// Coulomb stress change on `receiver` from a displacement gradient.
    pub fn coulomb(&self, gradient: &DisplacementGradient, receiver: &FaultPlane) -> CoulombStress {
        self.resolve(&self.stress_tensor(gradient), receiver)
    }

    /// Resolve every receiver against its aggregated response.
    ///
    /// `field` must hold one response per receiver, in receiver order. Failed
    /// responses pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] if the lengths differ.
    pub fn resolve_field(
        &self,
        receivers: &[FaultPlane],
        field: &ResponseField,
    ) -> Result<Vec<std::result::Result<CoulombStress, AggregationError>>> {
        if receivers.len() != field.len() {
            return Err(crate::Error::Configuration(format!(
                "{} receivers but {} responses",
                receivers.len(),
                field.len()
            )));
        }
        Ok(receivers
            .par_iter()
            .zip(field.responses.par_iter())
            .map(|(receiver, response)| {
                response
                    .as_ref()
                    .map(|r: &PointResponse| self.coulomb(&r.gradient, receiver))
                    .map_err(Clone::clone)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Location;
    use nalgebra::Matrix3;
    use approx::assert_relative_eq;

    fn resolver() -> StressResolver {
        StressResolver::new(ElasticModel::default(), 0.4, 0.0, ShearDirection::ReceiverRake)
    }

    fn receiver(strike: f64, dip: f64, rake: f64) -> FaultPlane {
        FaultPlane::receiver(strike, dip, rake, 10.0, 5.0, Location::new(0.0, 0.0, 2.0)).unwrap()
    }

    #[test]
    fn test_stress_tensor_is_symmetric() {
        let g = DisplacementGradient(Matrix3::new(
            1.0e-6, -3.0e-6, 2.5e-6,
            4.0e-6, -2.0e-6, 0.5e-6,
            -1.0e-6, 7.0e-6, 3.0e-6,
        ));
        let sigma = resolver().stress_tensor(&g).to_matrix();
        assert_eq!(sigma, sigma.transpose());
    }

    #[test]
    fn test_uniaxial_strain_stress() {
        let elastic = ElasticModel::default();
        let g = DisplacementGradient(Matrix3::from_diagonal(&nalgebra::Vector3::new(1.0e-6, 0.0, 0.0)));
        let sigma = resolver().stress_tensor(&g);

        let c11 = elastic.lame_lambda + 2.0 * elastic.shear_modulus;
        assert_relative_eq!(sigma.0[0], c11 * 1.0e-6, epsilon = 1e-6);
        assert_relative_eq!(sigma.0[1], elastic.lame_lambda * 1.0e-6, epsilon = 1e-6);
        assert_relative_eq!(sigma.0[2], elastic.lame_lambda * 1.0e-6, epsilon = 1e-6);
        for i in 3..6 {
            assert_eq!(sigma.0[i], 0.0);
        }
    }

    #[test]
    fn test_rigid_rotation_gives_no_stress() {
        let g = DisplacementGradient(Matrix3::new(
            0.0, 2.0e-5, -1.0e-5,
            -2.0e-5, 0.0, 3.0e-5,
            1.0e-5, -3.0e-5, 0.0,
        ));
        let result = resolver().coulomb(&g, &receiver(30.0, 60.0, 90.0));
        assert_relative_eq!(result.coulomb, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.normal, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_xy_shear_loads_left_lateral_slip_on_north_striking_plane() {
        // σ_xy > 0 is the strain left by dragging the east side north
        let stress = StressTensor::new([0.0, 0.0, 0.0, 2000.0, 0.0, 0.0]);
        let left_lateral = resolver().resolve(&stress, &receiver(0.0, 90.0, 0.0));
        assert_relative_eq!(left_lateral.shear_strike, -2.0, epsilon = 1e-12);
        assert_relative_eq!(left_lateral.shear, 2.0, epsilon = 1e-12);
        assert_relative_eq!(left_lateral.normal, 0.0, epsilon = 1e-12);
        assert_relative_eq!(left_lateral.coulomb, 2.0, epsilon = 1e-12);

        let right_lateral = resolver().resolve(&stress, &receiver(0.0, 90.0, 180.0));
        assert_relative_eq!(right_lateral.shear, -2.0, epsilon = 1e-12);
        assert_relative_eq!(right_lateral.shear, right_lateral.shear_strike, epsilon = 1e-12);
    }

    #[test]
    fn test_tension_unclamps() {
        let stress = StressTensor::new([2000.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let result = resolver().resolve(&stress, &receiver(0.0, 90.0, 0.0));
        assert_relative_eq!(result.normal, 2.0, epsilon = 1e-12);
        assert_relative_eq!(result.shear, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.coulomb, 0.8, epsilon = 1e-12);

        // Horizontal plane: the normal points up
        let stress = StressTensor::new([0.0, 0.0, -5000.0, 0.0, 0.0, 0.0]);
        let result = resolver().resolve(&stress, &receiver(0.0, 0.0, 0.0));
        assert_relative_eq!(result.normal, -5.0, epsilon = 1e-12);
        assert_relative_eq!(result.coulomb, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reverse_shear_on_dipping_receiver() {
        // Horizontal compression across a north-striking, east-dipping thrust
        let stress = StressTensor::new([-1000.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let result = resolver().resolve(&stress, &receiver(0.0, 45.0, 90.0));
        assert!(result.shear_dip > 0.0);
        assert_relative_eq!(result.shear, result.shear_dip, epsilon = 1e-12);
        assert_relative_eq!(result.shear, 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.normal, -0.5, epsilon = 1e-12);
        assert_relative_eq!(result.shear_strike, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_skempton_reduces_normal_stress_by_pore_pressure() {
        let stress = StressTensor::new([3000.0, 3000.0, 3000.0, 0.0, 0.0, 0.0]);
        let plane = receiver(40.0, 70.0, 0.0);

        let dry = resolver().resolve(&stress, &plane);
        assert_relative_eq!(dry.normal, 3.0, epsilon = 1e-12);

        let wet = StressResolver::new(ElasticModel::default(), 0.4, 0.5, ShearDirection::ReceiverRake)
            .resolve(&stress, &plane);
        assert_relative_eq!(wet.normal, 1.5, epsilon = 1e-12);
        assert_relative_eq!(wet.coulomb, 0.6, epsilon = 1e-12);
        assert_relative_eq!(wet.shear, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_maximum_shear_is_in_plane_magnitude() {
        let stress = StressTensor::new([0.0, 0.0, 0.0, 3000.0, 0.0, 4000.0]);
        let plane = receiver(0.0, 90.0, 0.0);
        let max = StressResolver::new(ElasticModel::default(), 0.4, 0.0, ShearDirection::Maximum)
            .resolve(&stress, &plane);
        assert_relative_eq!(max.shear, 5.0, epsilon = 1e-12);
        assert_relative_eq!(max.shear_strike, -3.0, epsilon = 1e-12);
        assert_relative_eq!(max.shear_dip, 4.0, epsilon = 1e-12);

        // Any orientation: the components span the in-plane traction
        let stress = StressTensor::new([1200.0, -800.0, 300.0, 450.0, -900.0, 600.0]);
        let plane = receiver(123.0, 37.0, -45.0);
        let max = StressResolver::new(ElasticModel::default(), 0.4, 0.0, ShearDirection::Maximum)
            .resolve(&stress, &plane);
        let along_rake = resolver().resolve(&stress, &plane);
        assert_relative_eq!(
            max.shear,
            max.shear_strike.hypot(max.shear_dip),
            epsilon = 1e-12
        );
        assert!(along_rake.shear.abs() <= max.shear + 1e-12);
    }

    #[test]
    fn test_resolve_field_passes_failures_through() {
        let plane = receiver(0.0, 90.0, 0.0);
        let gradient = DisplacementGradient(Matrix3::new(
            0.0, 1.0e-7, 0.0,
            1.0e-7, 0.0, 0.0,
            0.0, 0.0, 0.0,
        ));
        let failure = AggregationError {
            point_index: 1,
            source_index: 0,
            reason: "boom".into(),
        };
        let field = ResponseField {
            responses: vec![
                Ok(PointResponse {
                    displacement: crate::types::Vec3::zeros(),
                    gradient,
                    warnings: Vec::new(),
                }),
                Err(failure.clone()),
            ],
        };

        let results = resolver().resolve_field(&[plane, plane], &field).unwrap();
        // σ_xy = 2μ·1e-7 = 6 kPa
        assert_relative_eq!(results[0].as_ref().unwrap().shear, 6.0, epsilon = 1e-9);
        assert_eq!(results[1], Err(failure));

        assert!(resolver().resolve_field(&[plane], &field).is_err());
    }
}
