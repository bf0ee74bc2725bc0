// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{GeodesicError, GeodesicResult};

/// Full tracing configuration shared by the integrator, the image-plane
/// inversion layer and the sensitivity module.
///
/// The inversion constants (`residual_check_factor`, `negative_offset_penalty`)
/// are empirical tuning values, not physically derived; they may need
/// recalibration per metric, which is why they live here instead of being
/// hard-coded at the call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracerConfig {
    /// Absolute ODE error tolerance.
    #[serde(default = "default_abs_tol")]
    pub abs_tol: f64,
    /// Relative ODE error tolerance.
    #[serde(default = "default_rel_tol")]
    pub rel_tol: f64,
    /// Radius treated as escape to infinity.
    #[serde(default = "default_effective_infinity")]
    pub effective_infinity: f64,
    /// Trace terminates once r drops below this multiple of the horizon.
    #[serde(default = "default_inner_radius_factor")]
    pub inner_radius_factor: f64,
    /// Affine-parameter span per trace.
    #[serde(default = "default_max_affine")]
    pub max_affine: f64,
    /// Hard cap on accepted integration steps.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Absolute tolerance of the scalar zero finder.
    #[serde(default = "default_zero_atol")]
    pub zero_atol: f64,
    /// Upper bound of the image-plane offset search.
    #[serde(default = "default_offset_max")]
    pub offset_max: f64,
    /// Post-convergence residual must be below `residual_check_factor * zero_atol`.
    #[serde(default = "default_residual_check_factor")]
    pub residual_check_factor: f64,
    /// Penalty slope for negative offsets in the root search.
    #[serde(default = "default_negative_offset_penalty")]
    pub negative_offset_penalty: f64,
    /// Closest-approach distance at which the target-point optimizer stops.
    #[serde(default = "default_target_distance_tol")]
    pub d_tol: f64,
    /// Maximum Nelder–Mead iterations for the target-point optimizer.
    #[serde(default = "default_optimizer_max_iterations")]
    pub optimizer_max_iterations: usize,
    /// Image-plane center offset α₀.
    #[serde(default)]
    pub alpha_offset: f64,
    /// Image-plane center offset β₀.
    #[serde(default)]
    pub beta_offset: f64,
}

fn default_abs_tol() -> f64 {
    DEFAULT_ABS_TOL
}
fn default_rel_tol() -> f64 {
    DEFAULT_REL_TOL
}
fn default_effective_infinity() -> f64 {
    DEFAULT_EFFECTIVE_INFINITY
}
fn default_inner_radius_factor() -> f64 {
    DEFAULT_INNER_RADIUS_FACTOR
}
fn default_max_affine() -> f64 {
    DEFAULT_MAX_AFFINE
}
fn default_max_steps() -> usize {
    200_000
}
fn default_zero_atol() -> f64 {
    DEFAULT_ZERO_ATOL
}
fn default_offset_max() -> f64 {
    DEFAULT_OFFSET_MAX
}
fn default_residual_check_factor() -> f64 {
    DEFAULT_RESIDUAL_CHECK_FACTOR
}
fn default_negative_offset_penalty() -> f64 {
    DEFAULT_NEGATIVE_OFFSET_PENALTY
}
fn default_target_distance_tol() -> f64 {
    DEFAULT_TARGET_DISTANCE_TOL
}
fn default_optimizer_max_iterations() -> usize {
    200
}

impl Default for TracerConfig {
    fn default() -> Self {
        TracerConfig {
            abs_tol: default_abs_tol(),
            rel_tol: default_rel_tol(),
            effective_infinity: default_effective_infinity(),
            inner_radius_factor: default_inner_radius_factor(),
            max_affine: default_max_affine(),
            max_steps: default_max_steps(),
            zero_atol: default_zero_atol(),
            offset_max: default_offset_max(),
            residual_check_factor: default_residual_check_factor(),
            negative_offset_penalty: default_negative_offset_penalty(),
            d_tol: default_target_distance_tol(),
            optimizer_max_iterations: default_optimizer_max_iterations(),
            alpha_offset: 0.0,
            beta_offset: 0.0,
        }
    }
}

impl TracerConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> GeodesicResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would stall or silently corrupt a trace.
    pub fn validate(&self) -> GeodesicResult<()> {
        if !self.abs_tol.is_finite() || self.abs_tol <= 0.0 {
            return Err(GeodesicError::ConfigError(
                "abs_tol must be finite and > 0".to_string(),
            ));
        }
        if !self.rel_tol.is_finite() || self.rel_tol <= 0.0 {
            return Err(GeodesicError::ConfigError(
                "rel_tol must be finite and > 0".to_string(),
            ));
        }
        if self.effective_infinity <= 0.0 {
            return Err(GeodesicError::ConfigError(
                "effective_infinity must be > 0".to_string(),
            ));
        }
        if self.inner_radius_factor < 1.0 {
            return Err(GeodesicError::ConfigError(
                "inner_radius_factor must be >= 1".to_string(),
            ));
        }
        if self.max_affine <= 0.0 {
            return Err(GeodesicError::ConfigError(
                "max_affine must be > 0".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(GeodesicError::ConfigError(
                "max_steps must be >= 1".to_string(),
            ));
        }
        if !self.zero_atol.is_finite() || self.zero_atol <= 0.0 {
            return Err(GeodesicError::ConfigError(
                "zero_atol must be finite and > 0".to_string(),
            ));
        }
        if self.offset_max <= 0.0 {
            return Err(GeodesicError::ConfigError(
                "offset_max must be > 0".to_string(),
            ));
        }
        if self.d_tol <= 0.0 {
            return Err(GeodesicError::ConfigError("d_tol must be > 0".to_string()));
        }
        Ok(())
    }
}
