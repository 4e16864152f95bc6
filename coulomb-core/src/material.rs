//! Elastic constants of the half-space.
//!
//! A single homogeneous, isotropic, linear elastic medium is used for a whole
//! run. The model is an explicit immutable value passed through the pipeline;
//! there is no process-wide state.

use crate::error::{Error, Result};
use crate::types::{ConstitutiveMatrix, StrainTensor, StressTensor};
use nalgebra::Matrix6;
use serde::{Deserialize, Serialize};

/// Isotropic elastic moduli (Pa).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticModel {
    /// Shear modulus μ (Pa).
    pub shear_modulus: f64,
    /// Lamé's first parameter λ (Pa).
    pub lame_lambda: f64,
}

impl ElasticModel {
    /// Create an elastic model from the two Lamé parameters.
    ///
    /// # Arguments
    ///
    /// * `shear_modulus` - μ (Pa), must be positive
    /// * `lame_lambda` - λ (Pa), must satisfy λ > -2μ/3 (positive bulk modulus)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the moduli are physically invalid.
    pub fn new(shear_modulus: f64, lame_lambda: f64) -> Result<Self> {
        let model = Self {
            shear_modulus,
            lame_lambda,
        };
        model.validate()?;
        Ok(model)
    }

    /// Create an elastic model from μ and Poisson's ratio ν ∈ (-1, 0.5).
    pub fn from_poisson(shear_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if !(poissons_ratio > -1.0 && poissons_ratio < 0.5) {
            return Err(Error::Configuration(format!(
                "Poisson's ratio must be in range (-1, 0.5), got {poissons_ratio}"
            )));
        }
        let lame_lambda = 2.0 * shear_modulus * poissons_ratio / (1.0 - 2.0 * poissons_ratio);
        Self::new(shear_modulus, lame_lambda)
    }

    /// Create an elastic model from Young's modulus E and Poisson's ratio ν.
    pub fn from_youngs(youngs_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0) {
            return Err(Error::Configuration(
                "Young's modulus must be positive".into(),
            ));
        }
        Self::from_poisson(youngs_modulus / (2.0 * (1.0 + poissons_ratio)), poissons_ratio)
    }

    /// Check the moduli. Deserialized models skip [`ElasticModel::new`], so the
    /// pipeline calls this again before any computation.
    pub fn validate(&self) -> Result<()> {
        let mu = self.shear_modulus;
        let lambda = self.lame_lambda;
        if !mu.is_finite() || mu <= 0.0 {
            return Err(Error::Configuration(format!(
                "shear modulus must be positive, got {mu}"
            )));
        }
        if !lambda.is_finite() || lambda <= -2.0 * mu / 3.0 {
            return Err(Error::Configuration(format!(
                "Lamé parameter λ = {lambda} is inconsistent with μ = {mu} (requires λ > -2μ/3)"
            )));
        }
        Ok(())
    }

    /// Poisson's ratio ν = λ / (2(λ + μ)).
    pub fn poissons_ratio(&self) -> f64 {
        self.lame_lambda / (2.0 * (self.lame_lambda + self.shear_modulus))
    }

    /// Young's modulus E = μ(3λ + 2μ) / (λ + μ).
    pub fn youngs_modulus(&self) -> f64 {
        let mu = self.shear_modulus;
        let lambda = self.lame_lambda;
        mu * (3.0 * lambda + 2.0 * mu) / (lambda + mu)
    }

    /// Bulk modulus K = λ + 2μ/3.
    pub fn bulk_modulus(&self) -> f64 {
        self.lame_lambda + 2.0 * self.shear_modulus / 3.0
    }

    /// Half-space medium constant α = (λ + μ) / (λ + 2μ).
    pub fn alpha(&self) -> f64 {
        let mu = self.shear_modulus;
        let lambda = self.lame_lambda;
        (lambda + mu) / (lambda + 2.0 * mu)
    }

    /// 3D constitutive matrix for isotropic linear elasticity.
    ///
    /// Returns the 6x6 matrix D such that σ = D * ε in Voigt notation with
    /// engineering shear strains.
    pub fn constitutive_3d(&self) -> ConstitutiveMatrix {
        let c11 = self.lame_lambda + 2.0 * self.shear_modulus;
        let c12 = self.lame_lambda;
        let c44 = self.shear_modulus;

        Matrix6::new(
            c11, c12, c12, 0.0, 0.0, 0.0,
            c12, c11, c12, 0.0, 0.0, 0.0,
            c12, c12, c11, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, c44, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, c44, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, c44,
        )
    }

    /// Stress from strain, σ = λ·tr(ε)·I + 2μ·ε.
    pub fn stress(&self, strain: &StrainTensor) -> StressTensor {
        StressTensor(self.constitutive_3d() * strain.0)
    }
}

/// Crustal defaults: μ = λ = 30 GPa (ν = 0.25).
impl Default for ElasticModel {
    fn default() -> Self {
        Self {
            shear_modulus: 30e9,
            lame_lambda: 30e9,
        }
    }
}
