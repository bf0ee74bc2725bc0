// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Image-Plane Jacobian
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Area scaling of the image-plane map (α, β) ↦ (disc radius, redshift),
//! obtained by pushing two-slot dual numbers through the tracer.
//!
//! The integrator stops where the value part of the surface function
//! crosses zero, so the raw duals measure sensitivities at a frozen
//! termination parameter. A first-order projection onto the surface adds
//! the missing dλ* term for both observables before the determinant is
//! taken.

use geodesic_math::jet::{Jet, Real};
use geodesic_math::rk45::{OdeSystem, Rk45Stepper, StepControl};
use geodesic_metrics::Spacetime;
use geodesic_types::config::TracerConfig;
use geodesic_types::error::{GeodesicError, GeodesicResult};
use geodesic_types::state::{RayState, Status};

use crate::flux::photon_energy;
use crate::geometry::AccretionGeometry;
use crate::tracer::{impact_parameter_velocity, TracerSession};
use crate::transfer;

/// Affine half-step of the along-trajectory finite difference for dg/dλ.
const LAMBDA_EPS: f64 = 1e-4;

struct PlainRhs<'a, M> {
    metric: &'a M,
}

impl<'a, M: Spacetime<f64>> OdeSystem<f64> for PlainRhs<'a, M> {
    fn dim(&self) -> usize {
        8
    }
    fn rhs(&self, _lambda: f64, y: &[f64], dydt: &mut [f64]) {
        let x = [y[0], y[1], y[2], y[3]];
        let v = [y[4], y[5], y[6], y[7]];
        dydt[..4].copy_from_slice(&v);
        let accel = self.metric.geodesic_acceleration(&x, &v);
        dydt[4..8].copy_from_slice(&accel);
    }
}

/// Photon energy seen by a static observer at `x`.
pub fn static_observer_energy<M: Spacetime<f64>>(metric: &M, x: &[f64; 4], k: &[f64; 4]) -> f64 {
    let g = metric.metric(x);
    let u = [1.0 / (-g.tt).sqrt(), 0.0, 0.0, 0.0];
    photon_energy(metric, x, k, &u)
}

/// Area factor |1/det J| of (α, β) ↦ (ρ, g) at the given image-plane
/// point, where ρ is the cylindrical disc radius of the hit and g the
/// disc-to-observer energy ratio.
///
/// Supported for planar disc geometries; the surface projection needs a
/// closed-form surface function. Rays that miss the geometry yield NaN
/// with a diagnostic.
pub fn jacobian_area_factor<M>(
    metric: &M,
    observer: [f64; 4],
    geometry: &AccretionGeometry,
    alpha: f64,
    beta: f64,
    cfg: &TracerConfig,
) -> GeodesicResult<f64>
where
    M: Spacetime<Jet> + Spacetime<f64>,
{
    let plane_height = match geometry {
        AccretionGeometry::Thin(d) => d.plane_height,
        AccretionGeometry::Thick(_) => {
            return Err(GeodesicError::NotImplemented {
                metric: metric.name().to_string(),
                model: "ImagePlaneJacobian".to_string(),
                geometry: "Thick".to_string(),
            })
        }
        AccretionGeometry::Composite(_) => {
            return Err(GeodesicError::NotImplemented {
                metric: metric.name().to_string(),
                model: "ImagePlaneJacobian".to_string(),
                geometry: "Composite".to_string(),
            })
        }
    };

    let a = Jet::variable(alpha, 0);
    let b = Jet::variable(beta, 1);
    let x_obs = [
        Jet::constant(observer[0]),
        Jet::constant(observer[1]),
        Jet::constant(observer[2]),
        Jet::constant(observer[3]),
    ];
    let v_obs = impact_parameter_velocity(metric, &x_obs, a, b);

    let mut session: TracerSession<M, Jet> = TracerSession::new(metric, Some(geometry), cfg);
    let p = session.reinit_and_solve(RayState::new(x_obs, v_obs));
    if p.status != Status::IntersectedWithGeometry {
        log::warn!("jacobian ray (α = {alpha}, β = {beta}) did not intersect the geometry");
        return Ok(f64::NAN);
    }

    let (r, theta) = (p.x[1], p.x[2]);
    let (vr, vth) = (p.v[1], p.v[2]);
    let (sin, cos) = (theta.val().sin(), theta.val().cos());

    // Surface function s = r cosθ − z₀ and the flow derivatives at the hit.
    let surface = r * theta.cos() - Jet::constant(plane_height);
    let ds_dl = vr.val() * cos - r.val() * sin * vth.val();
    let rho = r * theta.sin();
    let drho_dl = vr.val() * sin + r.val() * cos * vth.val();

    let u_disc = transfer::disc_four_velocity(metric, p.x[1]);
    let e_disc = photon_energy(metric, &p.x, &p.v, &u_disc);
    let g_obs = Spacetime::<Jet>::metric(metric, &p.x_init);
    let u_obs = [
        Jet::constant(1.0) / (-g_obs.tt).sqrt(),
        Jet::constant(0.0),
        Jet::constant(0.0),
        Jet::constant(0.0),
    ];
    let e_obs = photon_energy(metric, &p.x_init, &p.v_init, &u_obs);
    let g_sd = e_disc / e_obs;

    // dg/dλ from a short fixed-step advance of the value-part state.
    let mut y = [0.0; 8];
    for i in 0..4 {
        y[i] = p.x[i].val();
        y[4 + i] = p.v[i].val();
    }
    let rhs = PlainRhs { metric };
    let mut stepper = Rk45Stepper::new(8, StepControl::default());
    let mut fwd = [0.0; 8];
    let mut bwd = [0.0; 8];
    stepper.rk4_step(&rhs, 0.0, &y, LAMBDA_EPS, &mut fwd);
    stepper.rk4_step(&rhs, 0.0, &y, -LAMBDA_EPS, &mut bwd);
    let e_obs_val = e_obs.val();
    let g_at = |s: &[f64; 8]| -> f64 {
        let x = [s[0], s[1], s[2], s[3]];
        let k = [s[4], s[5], s[6], s[7]];
        let u: [f64; 4] = transfer::disc_four_velocity(metric, x[1]);
        photon_energy(metric, &x, &k, &u) / e_obs_val
    };
    let dg_dl = (g_at(&fwd) - g_at(&bwd)) / (2.0 * LAMBDA_EPS);

    // Project both observables onto the surface: each dual slot carries a
    // termination shift dλ_k = −∂s/∂p_k / (ds/dλ).
    let mut row_rho = [0.0; 2];
    let mut row_g = [0.0; 2];
    for k in 0..2 {
        let dl = -surface.eps[k] / ds_dl;
        row_rho[k] = rho.eps[k] + drho_dl * dl;
        row_g[k] = g_sd.eps[k] + dg_dl * dl;
    }
    let det = row_rho[0] * row_g[1] - row_rho[1] * row_g[0];
    Ok((1.0 / det).abs())
}
