// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Image-Plane Inversion
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Inverse mapping from disc radii to image-plane coordinates.
//!
//! Along a fixed image-plane angle θ_o, the offset r_o from the image
//! center is root-solved so that the traced ray terminates on the disc at
//! the requested radius. Negative roots off the penalty boundary are
//! clamped to zero and re-validated; failures (no bracket, failed residual
//! re-check) yield NaN rather than an error so batched sampling can skip
//! unreachable angles and keep going.

use std::f64::consts::PI;

use rayon::prelude::*;

use geodesic_math::brent::{bracket_root, brent};
use geodesic_metrics::Spacetime;
use geodesic_types::config::TracerConfig;
use geodesic_types::error::{GeodesicError, GeodesicResult};
use geodesic_types::state::{GeodesicPoint, RayState, Status};

use crate::geometry::AccretionGeometry;
use crate::tracer::{impact_parameter_velocity, TracerSession};

const BRENT_MAX_ITER: usize = 100;

fn projected_radius(point: &GeodesicPoint<f64>) -> f64 {
    point.x[1] * point.x[2].sin()
}

/// Solve for the image-plane offset r_o along angle `theta_o` whose ray
/// terminates on the disc at cylindrical radius `target_radius`.
///
/// Non-planar surfaces are replaced by their datum plane at the target
/// radius, so the solved radius refers to a horizontal annulus at the
/// local surface height. Returns NaN (with the last traced point, when
/// one exists) if no converged, re-validated root is found.
pub fn find_offset_for_radius<M: Spacetime<f64>>(
    metric: &M,
    observer: [f64; 4],
    geometry: &AccretionGeometry,
    target_radius: f64,
    theta_o: f64,
    cfg: &TracerConfig,
) -> (f64, Option<GeodesicPoint<f64>>) {
    if let AccretionGeometry::Thick(_) = geometry {
        // unwrap is fine: thick discs always have a datum plane
        let plane = geometry.datum_plane(target_radius).unwrap();
        let datum = AccretionGeometry::Thin(plane);
        return solve_against(metric, observer, &datum, target_radius, theta_o, cfg);
    }
    solve_against(metric, observer, geometry, target_radius, theta_o, cfg)
}

fn solve_against<M: Spacetime<f64>>(
    metric: &M,
    observer: [f64; 4],
    geometry: &AccretionGeometry,
    target_radius: f64,
    theta_o: f64,
    cfg: &TracerConfig,
) -> (f64, Option<GeodesicPoint<f64>>) {
    let mut session = TracerSession::new(metric, Some(geometry), cfg);
    let (dir_a, dir_b) = (theta_o.cos(), theta_o.sin());

    let mut measure = |r_off: f64| -> f64 {
        if r_off < 0.0 {
            // Steep penalty keeps the root search on the physical side.
            return cfg.negative_offset_penalty * (-r_off);
        }
        let alpha = r_off * dir_a + cfg.alpha_offset;
        let beta = r_off * dir_b + cfg.beta_offset;
        let v = impact_parameter_velocity(metric, &observer, alpha, beta);
        let p = session.reinit_and_solve(RayState::new(observer, v));
        if p.status == Status::IntersectedWithGeometry {
            target_radius - projected_radius(&p)
        } else {
            target_radius
        }
    };

    let bracket = bracket_root(
        &mut measure,
        cfg.offset_max / 2.0,
        cfg.offset_max / 16.0,
        -1.0,
        cfg.offset_max,
    );
    let root = bracket.and_then(|b| brent(&mut measure, b, cfg.zero_atol, BRENT_MAX_ITER));
    let root = match root {
        Some(r) => r,
        None => {
            log::warn!(
                "no offset bracket for target radius {target_radius} at image angle {theta_o}"
            );
            return (f64::NAN, None);
        }
    };
    // A slightly negative root can come off the penalty boundary; clamp it
    // to the physical domain and let the residual re-check judge it.
    if root < 0.0 {
        log::warn!(
            "offset root {root} is negative for target radius {target_radius}, clamping to 0"
        );
    }
    let root = root.max(0.0);

    // Re-validate the converged root with a fresh trace; the root finder can
    // settle on the hit/miss discontinuity instead of a true zero.
    let alpha = root * dir_a + cfg.alpha_offset;
    let beta = root * dir_b + cfg.beta_offset;
    let v = impact_parameter_velocity(metric, &observer, alpha, beta);
    let p = session.reinit_and_solve(RayState::new(observer, v));
    let residual = if p.status == Status::IntersectedWithGeometry {
        target_radius - projected_radius(&p)
    } else {
        target_radius
    };
    if residual.abs() > cfg.residual_check_factor * cfg.zero_atol {
        log::warn!(
            "offset root {root:.6} for target radius {target_radius} failed the residual \
             re-check: |{residual:.3e}|"
        );
        return (f64::NAN, Some(p));
    }
    (root, Some(p))
}

/// Sample image-plane coordinates of the disc ring at `target_radius` over
/// uniformly spaced image angles, writing (α, β) into the caller's buffers.
/// Unreachable angles are written as NaN. Angles are solved in parallel.
pub fn impact_parameters_for_radius_into<M>(
    metric: &M,
    observer: [f64; 4],
    geometry: &AccretionGeometry,
    target_radius: f64,
    alpha_out: &mut [f64],
    beta_out: &mut [f64],
    cfg: &TracerConfig,
) -> GeodesicResult<()>
where
    M: Spacetime<f64> + Sync,
{
    let n = alpha_out.len();
    if beta_out.len() != n {
        return Err(GeodesicError::BufferSizeMismatch {
            alpha_len: n,
            beta_len: beta_out.len(),
            expected: n,
        });
    }

    alpha_out
        .par_iter_mut()
        .zip(beta_out.par_iter_mut())
        .enumerate()
        .for_each(|(k, (a_out, b_out))| {
            let theta_o = 2.0 * PI * (k as f64) / (n as f64);
            let (r_off, _) =
                find_offset_for_radius(metric, observer, geometry, target_radius, theta_o, cfg);
            if r_off.is_finite() {
                *a_out = r_off * theta_o.cos() + cfg.alpha_offset;
                *b_out = r_off * theta_o.sin() + cfg.beta_offset;
            } else {
                *a_out = f64::NAN;
                *b_out = f64::NAN;
            }
        });
    Ok(())
}

/// Allocating form of [`impact_parameters_for_radius_into`] that drops the
/// unreachable angles.
pub fn impact_parameters_for_radius<M>(
    metric: &M,
    observer: [f64; 4],
    geometry: &AccretionGeometry,
    target_radius: f64,
    n: usize,
    cfg: &TracerConfig,
) -> GeodesicResult<Vec<(f64, f64)>>
where
    M: Spacetime<f64> + Sync,
{
    let mut alpha = vec![0.0; n];
    let mut beta = vec![0.0; n];
    impact_parameters_for_radius_into(
        metric,
        observer,
        geometry,
        target_radius,
        &mut alpha,
        &mut beta,
        cfg,
    )?;
    Ok(alpha
        .into_iter()
        .zip(beta)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect())
}
