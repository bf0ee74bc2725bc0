// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Metric Adapter
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Stationary axisymmetric spacetimes in Boyer–Lindquist-type coordinates
//! (t, r, θ, φ), geometrized units G = c = 1.
//!
//! A metric supplies its nonzero components and their analytic r/θ
//! derivatives; the geodesic acceleration, local non-rotating frame and
//! four-velocity constructions are derived here once. Everything is
//! generic over [`Real`] so the sensitivity module can differentiate
//! straight through the adapter.

pub mod kerr;
pub mod schwarzschild;

pub use kerr::Kerr;
pub use schwarzschild::Schwarzschild;

use geodesic_math::jet::Real;

/// Nonzero metric components of a stationary axisymmetric spacetime.
/// Also used for the inverse metric (same sparsity pattern).
#[derive(Debug, Clone, Copy)]
pub struct MetricComponents<T> {
    pub tt: T,
    pub rr: T,
    pub thth: T,
    pub phph: T,
    pub tph: T,
}

impl<T: Real> MetricComponents<T> {
    /// Covariant contraction g_μν u^μ v^ν.
    pub fn dot(&self, u: &[T; 4], v: &[T; 4]) -> T {
        self.tt * u[0] * v[0]
            + self.rr * u[1] * v[1]
            + self.thth * u[2] * v[2]
            + self.phph * u[3] * v[3]
            + self.tph * (u[0] * v[3] + u[3] * v[0])
    }

    /// Lower an index: v_μ = g_μν v^ν.
    pub fn lower(&self, v: &[T; 4]) -> [T; 4] {
        [
            self.tt * v[0] + self.tph * v[3],
            self.rr * v[1],
            self.thth * v[2],
            self.phph * v[3] + self.tph * v[0],
        ]
    }

    /// Inverse components; the t–φ block inverts as a 2×2, r and θ are
    /// diagonal.
    pub fn inverse(&self) -> MetricComponents<T> {
        let det = self.tt * self.phph - self.tph * self.tph;
        MetricComponents {
            tt: self.phph / det,
            rr: T::one() / self.rr,
            thth: T::one() / self.thth,
            phph: self.tt / det,
            tph: -self.tph / det,
        }
    }

    /// Dense 4×4 form for the Christoffel contraction.
    fn as_matrix(&self) -> [[T; 4]; 4] {
        let z = T::zero();
        [
            [self.tt, z, z, self.tph],
            [z, self.rr, z, z],
            [z, z, self.thth, z],
            [self.tph, z, z, self.phph],
        ]
    }
}

/// Scalar-independent spacetime queries, split off so callers holding a
/// metric that supports both `f64` and jet arithmetic can use them without
/// pinning the scalar type.
pub trait SpacetimeBase {
    /// Human-readable metric name, used in dispatch errors.
    fn name(&self) -> &'static str;

    /// Event-horizon radius.
    fn inner_radius(&self) -> f64;

    /// Innermost stable circular orbit radius.
    fn isco_radius(&self) -> f64;
}

/// A stationary axisymmetric spacetime. Components depend on (r, θ) only,
/// so the geodesic right-hand side has no explicit affine-parameter
/// dependence.
pub trait Spacetime<T: Real>: SpacetimeBase {
    fn components(&self, r: T, theta: T) -> MetricComponents<T>;
    fn components_dr(&self, r: T, theta: T) -> MetricComponents<T>;
    fn components_dtheta(&self, r: T, theta: T) -> MetricComponents<T>;

    /// Angular velocity Ω of a prograde circular equatorial orbit.
    fn keplerian_angular_velocity(&self, r: T) -> T;

    /// Metric at a position.
    fn metric(&self, x: &[T; 4]) -> MetricComponents<T> {
        self.components(x[1], x[2])
    }

    /// Geodesic-equation acceleration dv^μ/dλ = -Γ^μ_ab v^a v^b.
    fn geodesic_acceleration(&self, x: &[T; 4], v: &[T; 4]) -> [T; 4] {
        let ginv = self.components(x[1], x[2]).inverse().as_matrix();
        let dg_r = self.components_dr(x[1], x[2]).as_matrix();
        let dg_th = self.components_dtheta(x[1], x[2]).as_matrix();

        // ∂_c g_ab is nonzero only for c = 1 (r) and c = 2 (θ).
        let dg = |c: usize, a: usize, b: usize| -> T {
            match c {
                1 => dg_r[a][b],
                2 => dg_th[a][b],
                _ => T::zero(),
            }
        };

        let half = T::from_f64(0.5);
        let mut accel = [T::zero(); 4];
        for mu in 0..4 {
            let mut total = T::zero();
            for a in 0..4 {
                for b in 0..4 {
                    let mut gamma = T::zero();
                    for nu in 0..4 {
                        let sym = dg(a, nu, b) + dg(b, nu, a) - dg(nu, a, b);
                        gamma = gamma + ginv[mu][nu] * sym;
                    }
                    total = total + half * gamma * v[a] * v[b];
                }
            }
            accel[mu] = -total;
        }
        accel
    }

    /// Local non-rotating frame: four orthonormal basis vectors
    /// (time, radial, polar, azimuthal) at the given position.
    fn local_frame(&self, x: &[T; 4]) -> [[T; 4]; 4] {
        let g = self.components(x[1], x[2]);
        let z = T::zero();
        let omega = -g.tph / g.phph;
        let alpha = (omega * omega * g.phph - g.tt).sqrt();
        let inv_alpha = T::one() / alpha;
        [
            [inv_alpha, z, z, omega * inv_alpha],
            [z, T::one() / g.rr.sqrt(), z, z],
            [z, z, T::one() / g.thth.sqrt(), z],
            [z, z, z, T::one() / g.phph.sqrt()],
        ]
    }

    /// Four-velocity of a prograde circular equatorial orbit at radius r.
    fn circular_four_velocity(&self, r: T) -> [T; 4] {
        let half_pi = T::from_f64(std::f64::consts::FRAC_PI_2);
        let g = self.components(r, half_pi);
        let omega = self.keplerian_angular_velocity(r);
        let norm = -(g.tt + (g.tph + g.tph) * omega + g.phph * omega * omega);
        let ut = T::one() / norm.sqrt();
        [ut, T::zero(), T::zero(), omega * ut]
    }

    /// Four-velocity of matter plunging from the ISCO, parameterized by
    /// the conserved energy and angular momentum of the ISCO orbit.
    fn plunging_four_velocity(&self, r: T) -> [T; 4] {
        let half_pi = T::from_f64(std::f64::consts::FRAC_PI_2);
        let r_isco = T::from_f64(self.isco_radius());
        let g_isco = self.components(r_isco, half_pi);
        let u_isco = self.circular_four_velocity(r_isco);
        let energy = -(g_isco.tt * u_isco[0] + g_isco.tph * u_isco[3]);
        let ang_mom = g_isco.tph * u_isco[0] + g_isco.phph * u_isco[3];

        let g = self.components(r, half_pi);
        let ginv = g.inverse();
        let u_cov_t = -energy;
        let u_cov_ph = ang_mom;
        let ut = ginv.tt * u_cov_t + ginv.tph * u_cov_ph;
        let uph = ginv.tph * u_cov_t + ginv.phph * u_cov_ph;

        // Normalization fixes u_r: g^rr u_r² = -1 - (g^tt u_t² + 2 g^tφ u_t u_φ + g^φφ u_φ²).
        let tangential = ginv.tt * u_cov_t * u_cov_t
            + (ginv.tph + ginv.tph) * u_cov_t * u_cov_ph
            + ginv.phph * u_cov_ph * u_cov_ph;
        let radicand = (-T::one() - tangential) / ginv.rr;
        // Exactly at the ISCO the radicand vanishes; clamp tiny negatives.
        let u_cov_r = if radicand.val() > 0.0 {
            -radicand.sqrt()
        } else {
            T::zero()
        };
        let ur = ginv.rr * u_cov_r;

        [ut, ur, T::zero(), uph]
    }

    /// Constrain a raw velocity to the four-velocity normalization
    /// g_μν v^μ v^ν = -μ² by solving for the future-pointing v^t; the
    /// spatial components are kept as supplied.
    fn constrain_velocity(&self, x: &[T; 4], v: &[T; 4], mu: f64) -> [T; 4] {
        let g = self.components(x[1], x[2]);
        let spatial = g.rr * v[1] * v[1] + g.thth * v[2] * v[2] + g.phph * v[3] * v[3];
        let a = g.tt;
        let b = (g.tph + g.tph) * v[3];
        let c = spatial + T::from_f64(mu * mu);
        let disc = b * b - T::from_f64(4.0) * a * c;
        let vt = (-b - disc.sqrt()) / (a + a);
        [vt, v[1], v[2], v[3]]
    }
}
