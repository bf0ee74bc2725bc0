// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Radiative Transfer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Covariant radiative transfer along a ray.
//!
//! The transfer equation advances the Lorentz-invariant intensity I/ν³ in
//! the affine parameter. Component membership comes from the per-trace
//! inside flags for volumes tracked by crossing parity, and from the
//! pointwise predicate for components cheap enough to test directly.

use geodesic_math::jet::Real;
use geodesic_metrics::Spacetime;

use crate::geometry::{AccretionGeometry, CrossingEffect};

/// Four-velocity of disc matter at Boyer–Lindquist radius r: circular
/// Keplerian outside the ISCO, plunging with conserved ISCO energy and
/// angular momentum inside it. The branch is continuous at the ISCO.
pub fn disc_four_velocity<T: Real, M: Spacetime<T>>(metric: &M, r: T) -> [T; 4] {
    if r.val() >= metric.isco_radius() {
        metric.circular_four_velocity(r)
    } else {
        metric.plunging_four_velocity(r)
    }
}

/// Right-hand side of the transfer equation,
/// dI/dλ = e · (j_ν/ν³ − a_ν I), where e = −g(v, u) is the photon energy
/// measured in the local matter frame.
///
/// Membership decisions branch on value parts only, so the derivative of
/// a jet intensity is piecewise constant across component boundaries.
#[allow(clippy::too_many_arguments)]
pub fn intensity_derivative<T: Real, M: Spacetime<T>>(
    metric: &M,
    leaves: &[&AccretionGeometry],
    inside: &[bool],
    x: &[T; 4],
    v: &[T; 4],
    intensity: T,
    frequency: f64,
) -> T {
    let xv = [x[0].val(), x[1].val(), x[2].val(), x[3].val()];

    let mut absorb = 0.0;
    let mut emit = 0.0;
    let mut active = false;
    for (i, leaf) in leaves.iter().enumerate() {
        let member = match leaf.crossing_effect() {
            CrossingEffect::ToggleInside => inside[i],
            CrossingEffect::PassThrough => leaf.is_optically_thin() && leaf.contains(&xv),
            CrossingEffect::Terminate => false,
        };
        if member {
            absorb += leaf.absorption_coefficient(&xv, frequency);
            emit += leaf.emissivity_coefficient(&xv, frequency);
            active = true;
        }
    }
    if !active {
        return T::zero();
    }

    let u = disc_four_velocity(metric, x[1]);
    let g = metric.metric(x);
    let e = -g.dot(v, &u);
    let nu3 = frequency * frequency * frequency;
    e * (intensity.scale(-absorb) + T::from_f64(emit / nu3))
}
