//! Core data types for deformation and stress computations.
//!
//! This module defines fundamental types used throughout the crate:
//! - Geometric primitives (points, vectors)
//! - The displacement-gradient tensor returned by Green's functions
//! - Symmetric strain and stress tensors
//!
//! Tensors are expressed in a right-handed east-north-up frame with `x` east,
//! `y` north and `z` up, so a point at depth `d` has `z = -d`.

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};
use serde::{Deserialize, Serialize};

/// A local Cartesian point: east (km), north (km), depth (km, positive down).
pub type Point3 = Vector3<f64>;

/// A 3D vector (displacement, traction, unit direction).
pub type Vec3 = Vector3<f64>;

/// Displacement-gradient tensor `G[(i, j)] = ∂u_i/∂x_j` (dimensionless).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplacementGradient(pub Matrix3<f64>);

impl DisplacementGradient {
    /// Zero gradient.
    pub fn zero() -> Self {
        Self(Matrix3::zeros())
    }

    /// Infinitesimal strain `ε = ½ (G + Gᵀ)`.
    pub fn strain(&self) -> StrainTensor {
        let g = &self.0;
        StrainTensor::new([
            g[(0, 0)],
            g[(1, 1)],
            g[(2, 2)],
            g[(0, 1)] + g[(1, 0)],
            g[(1, 2)] + g[(2, 1)],
            g[(0, 2)] + g[(2, 0)],
        ])
    }
}

impl Default for DisplacementGradient {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for DisplacementGradient {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for DisplacementGradient {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Symmetric stress tensor in Voigt notation (Pa, tension positive).
///
/// Components are ordered as: [σ_xx, σ_yy, σ_zz, τ_xy, τ_yz, τ_xz]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressTensor(pub Vector6<f64>);

impl StressTensor {
    /// Create a new stress tensor from Voigt components.
    pub fn new(components: [f64; 6]) -> Self {
        Self(Vector6::from_row_slice(&components))
    }

    /// Zero stress state.
    pub fn zero() -> Self {
        Self(Vector6::zeros())
    }

    /// Hydrostatic (mean) stress, `tr(σ) / 3`.
    pub fn hydrostatic(&self) -> f64 {
        (self.0[0] + self.0[1] + self.0[2]) / 3.0
    }

    /// Extract the full 3x3 symmetric stress matrix.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let s = &self.0;
        Matrix3::new(
            s[0], s[3], s[5],
            s[3], s[1], s[4],
            s[5], s[4], s[2],
        )
    }

    /// Traction `t = σ·n` on a plane with unit normal `n`.
    pub fn traction(&self, normal: &Vec3) -> Vec3 {
        self.to_matrix() * normal
    }
}

/// Symmetric strain tensor in Voigt notation.
///
/// Components are ordered as: [ε_xx, ε_yy, ε_zz, γ_xy, γ_yz, γ_xz]
/// where γ = 2ε for engineering shear strain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainTensor(pub Vector6<f64>);

impl StrainTensor {
    /// Create a new strain tensor from Voigt components.
    pub fn new(components: [f64; 6]) -> Self {
        Self(Vector6::from_row_slice(&components))
    }

    /// Zero strain state.
    pub fn zero() -> Self {
        Self(Vector6::zeros())
    }

    /// Compute volumetric strain (dilatation).
    pub fn volumetric(&self) -> f64 {
        self.0[0] + self.0[1] + self.0[2]
    }

    /// Extract the full 3x3 symmetric strain matrix.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let e = &self.0;
        // Note: off-diagonal terms are γ/2 = ε
        Matrix3::new(
            e[0],       e[3] / 2.0, e[5] / 2.0,
            e[3] / 2.0, e[1],       e[4] / 2.0,
            e[5] / 2.0, e[4] / 2.0, e[2],
        )
    }
}

/// Constitutive matrix (material stiffness) in Voigt notation.
///
/// Maps strain tensor to stress tensor: σ = D * ε
pub type ConstitutiveMatrix = Matrix6<f64>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_strain_from_gradient_is_symmetric_part() {
        let g = DisplacementGradient(Matrix3::new(
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        ));
        let eps = g.strain().to_matrix();
        let expected = (g.0 + g.0.transpose()) * 0.5;
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(eps[(i, j)], expected[(i, j)], epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_rigid_rotation_has_no_strain() {
        // Antisymmetric gradient is a pure rotation
        let g = DisplacementGradient(Matrix3::new(
            0.0, -1e-3, 2e-4,
            1e-3, 0.0, -5e-4,
            -2e-4, 5e-4, 0.0,
        ));
        let strain = g.strain();
        for i in 0..6 {
            assert_relative_eq!(strain.0[i], 0.0, epsilon = 1e-18);
        }
    }

    #[test]
    fn test_hydrostatic_stress() {
        let stress = StressTensor::new([100.0, 200.0, 300.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(stress.hydrostatic(), 200.0, epsilon = 1e-10);
    }

    #[test]
    fn test_stress_matrix_symmetric() {
        let stress = StressTensor::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let m = stress.to_matrix();
        assert_eq!(m, m.transpose());
    }

    #[test]
    fn test_traction_on_east_facing_plane() {
        let stress = StressTensor::new([10.0, 20.0, 30.0, 4.0, 5.0, 6.0]);
        let t = stress.traction(&Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(t, Vec3::new(10.0, 4.0, 6.0));
    }

    #[test]
    fn test_volumetric_strain() {
        let strain = StrainTensor::new([0.001, 0.002, 0.003, 0.0, 0.0, 0.0]);
        assert_relative_eq!(strain.volumetric(), 0.006, epsilon = 1e-15);
    }

    #[test]
    fn test_gradient_superposition() {
        let mut total = DisplacementGradient::zero();
        total += DisplacementGradient(Matrix3::identity());
        total += DisplacementGradient(Matrix3::identity() * 2.0);
        assert_eq!(total, DisplacementGradient(Matrix3::identity() * 3.0));
    }
}
