// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Target-Point Optimizer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Find the image-plane coordinates whose ray passes closest to a given
//! spatial point.
//!
//! The objective is the running closest approach recorded by the session;
//! a trace that comes within `d_tol` of the target terminates early with
//! `TargetReached`, so converged probes stay cheap. The minimizer is
//! pluggable through [`ImagePlaneMinimizer`]; the default is a
//! derivative-free simplex search, because the objective is only piecewise
//! smooth (rays can fall into the hole).

use geodesic_math::simplex::{nelder_mead_2d, SimplexOptions, SimplexResult};
use geodesic_metrics::Spacetime;
use geodesic_types::config::TracerConfig;
use geodesic_types::state::{GeodesicPoint, RayState};

use crate::geometry::AccretionGeometry;
use crate::tracer::{impact_parameter_velocity, TracerSession};

/// Outcome of a target-point search.
#[derive(Debug, Clone)]
pub struct TargetResult {
    pub alpha: f64,
    pub beta: f64,
    /// Trace of the best ray found.
    pub point: GeodesicPoint<f64>,
    /// Closest approach of the best ray to the target.
    pub distance: f64,
}

/// A 2D minimizer over image-plane coordinates: objective, start point and
/// initial length scale in.
pub trait ImagePlaneMinimizer {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64; 2]) -> f64,
        start: [f64; 2],
        scale: f64,
    ) -> SimplexResult;
}

/// Default minimizer: Nelder–Mead simplex.
#[derive(Debug, Clone, Copy)]
pub struct SimplexMinimizer {
    pub options: SimplexOptions,
}

impl ImagePlaneMinimizer for SimplexMinimizer {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64; 2]) -> f64,
        start: [f64; 2],
        scale: f64,
    ) -> SimplexResult {
        nelder_mead_2d(objective, start, scale, &self.options)
    }
}

/// Minimize the closest approach to `target` = (r, θ, φ) over the image
/// plane with the default simplex minimizer, starting from the configured
/// image center.
pub fn optimize_for_target<M: Spacetime<f64>>(
    metric: &M,
    observer: [f64; 4],
    target: [f64; 3],
    geometry: Option<&AccretionGeometry>,
    cfg: &TracerConfig,
) -> TargetResult {
    let minimizer = SimplexMinimizer {
        options: SimplexOptions {
            max_iterations: cfg.optimizer_max_iterations,
            f_tol: cfg.d_tol * 1e-2,
            ..SimplexOptions::default()
        },
    };
    optimize_for_target_with(metric, observer, target, geometry, cfg, &minimizer)
}

/// As [`optimize_for_target`], with a caller-supplied minimizer.
pub fn optimize_for_target_with<M: Spacetime<f64>>(
    metric: &M,
    observer: [f64; 4],
    target: [f64; 3],
    geometry: Option<&AccretionGeometry>,
    cfg: &TracerConfig,
    minimizer: &dyn ImagePlaneMinimizer,
) -> TargetResult {
    let mut session = TracerSession::new(metric, geometry, cfg);
    session.set_target(Some(target));

    let mut objective = |ab: &[f64; 2]| -> f64 {
        let v = impact_parameter_velocity(metric, &observer, ab[0], ab[1]);
        session.reinit_and_solve(RayState::new(observer, v));
        session.closest_approach()
    };

    let result = minimizer.minimize(
        &mut objective,
        [cfg.alpha_offset, cfg.beta_offset],
        cfg.offset_max / 4.0,
    );

    let v = impact_parameter_velocity(metric, &observer, result.x[0], result.x[1]);
    let point = session.reinit_and_solve(RayState::new(observer, v));
    TargetResult {
        alpha: result.x[0],
        beta: result.x[1],
        point,
        distance: session.closest_approach(),
    }
}
