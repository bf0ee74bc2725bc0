// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Kerr Metric
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Rotating black hole in Boyer–Lindquist coordinates.
//!
//! Σ = r² + a²cos²θ, Δ = r² − 2mr + a². The ISCO radius uses the
//! Bardeen–Press–Teukolsky closed form for prograde orbits.

use geodesic_math::jet::Real;

use crate::{MetricComponents, Spacetime, SpacetimeBase};

/// Kerr spacetime of mass `m` and spin `a` (|a| < m).
#[derive(Debug, Clone, Copy)]
pub struct Kerr {
    pub mass: f64,
    pub spin: f64,
}

impl Kerr {
    pub fn new(mass: f64, spin: f64) -> Self {
        Kerr { mass, spin }
    }

    fn sigma<T: Real>(&self, r: T, cos: T) -> T {
        let a = T::from_f64(self.spin);
        r * r + a * a * cos * cos
    }

    fn delta<T: Real>(&self, r: T) -> T {
        let a = T::from_f64(self.spin);
        let m = T::from_f64(self.mass);
        r * r - (m + m) * r + a * a
    }
}

impl SpacetimeBase for Kerr {
    fn name(&self) -> &'static str {
        "Kerr"
    }

    fn inner_radius(&self) -> f64 {
        let m = self.mass;
        m + (m * m - self.spin * self.spin).sqrt()
    }

    fn isco_radius(&self) -> f64 {
        let m = self.mass;
        let a = self.spin / m;
        let z1 = 1.0 + (1.0 - a * a).cbrt() * ((1.0 + a).cbrt() + (1.0 - a).cbrt());
        let z2 = (3.0 * a * a + z1 * z1).sqrt();
        m * (3.0 + z2 - ((3.0 - z1) * (3.0 + z1 + 2.0 * z2)).sqrt())
    }
}

impl<T: Real> Spacetime<T> for Kerr {
    fn components(&self, r: T, theta: T) -> MetricComponents<T> {
        let a = T::from_f64(self.spin);
        let m = T::from_f64(self.mass);
        let sin = theta.sin();
        let cos = theta.cos();
        let s2 = sin * sin;
        let sigma = self.sigma(r, cos);
        let delta = self.delta(r);
        let two_mr = (m + m) * r;

        MetricComponents {
            tt: -(T::one() - two_mr / sigma),
            rr: sigma / delta,
            thth: sigma,
            phph: (r * r + a * a + two_mr * a * a * s2 / sigma) * s2,
            tph: -two_mr * a * s2 / sigma,
        }
    }

    fn components_dr(&self, r: T, theta: T) -> MetricComponents<T> {
        let a = T::from_f64(self.spin);
        let m = T::from_f64(self.mass);
        let two_m = m + m;
        let sin = theta.sin();
        let cos = theta.cos();
        let s2 = sin * sin;
        let sigma = self.sigma(r, cos);
        let sigma2 = sigma * sigma;
        let delta = self.delta(r);
        let d_delta = r + r - two_m;
        // d/dr (r/Σ) = (Σ − 2r²)/Σ².
        let d_r_over_sigma = (sigma - (r * r).scale(2.0)) / sigma2;

        MetricComponents {
            tt: two_m * d_r_over_sigma,
            rr: ((r + r) * delta - sigma * d_delta) / (delta * delta),
            thth: r + r,
            phph: (r + r + two_m * a * a * s2 * d_r_over_sigma) * s2,
            tph: -two_m * a * s2 * d_r_over_sigma,
        }
    }

    fn components_dtheta(&self, r: T, theta: T) -> MetricComponents<T> {
        let a = T::from_f64(self.spin);
        let m = T::from_f64(self.mass);
        let two_mr = (m + m) * r;
        let sin = theta.sin();
        let cos = theta.cos();
        let s2 = sin * sin;
        let sc = sin * cos;
        let sigma = self.sigma(r, cos);
        let sigma2 = sigma * sigma;
        let r2_a2 = r * r + a * a;
        // d/dθ (sin²θ/Σ) = 2 sinθ cosθ (r² + a²)/Σ².
        let d_s2_over_sigma = (sc + sc) * r2_a2 / sigma2;
        let d_sigma = -(a * a * sc).scale(2.0);

        let d_big = two_mr * a * a * d_s2_over_sigma;
        let big = r2_a2 + two_mr * a * a * s2 / sigma;

        MetricComponents {
            tt: -two_mr * d_sigma / sigma2,
            rr: d_sigma / self.delta(r),
            thth: d_sigma,
            phph: d_big * s2 + big * (sc + sc),
            tph: -two_mr * a * d_s2_over_sigma,
        }
    }

    fn keplerian_angular_velocity(&self, r: T) -> T {
        // Ω = √M / (r^{3/2} + a√M)
        let sqrt_m = T::from_f64(self.mass.sqrt());
        let a = T::from_f64(self.spin);
        sqrt_m / (r.sqrt().powi(3) + a * sqrt_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64, what: &str) {
        assert!((a - b).abs() < tol, "{what}: {a} vs {b}");
    }

    #[test]
    fn test_reduces_to_schwarzschild_at_zero_spin() {
        let kerr = Kerr::new(1.0, 0.0);
        let schw = crate::Schwarzschild::new(1.0);
        let (r, th) = (7.7, 0.9);
        let gk: MetricComponents<f64> = kerr.components(r, th);
        let gs: MetricComponents<f64> = schw.components(r, th);
        assert_close(gk.tt, gs.tt, 1e-14, "tt");
        assert_close(gk.rr, gs.rr, 1e-14, "rr");
        assert_close(gk.thth, gs.thth, 1e-14, "thth");
        assert_close(gk.phph, gs.phph, 1e-13, "phph");
        assert_close(gk.tph, 0.0, 1e-14, "tph");
    }

    #[test]
    fn test_component_derivatives_match_finite_difference() {
        let metric = Kerr::new(1.0, 0.9);
        let (r, th) = (4.6, 1.25);
        let h = 1e-6;

        let dr = metric.components_dr(r, th);
        let up: MetricComponents<f64> = metric.components(r + h, th);
        let dn = metric.components(r - h, th);
        assert_close(dr.tt, (up.tt - dn.tt) / (2.0 * h), 1e-6, "d tt/dr");
        assert_close(dr.rr, (up.rr - dn.rr) / (2.0 * h), 1e-6, "d rr/dr");
        assert_close(dr.thth, (up.thth - dn.thth) / (2.0 * h), 1e-6, "d thth/dr");
        assert_close(dr.phph, (up.phph - dn.phph) / (2.0 * h), 1e-5, "d phph/dr");
        assert_close(dr.tph, (up.tph - dn.tph) / (2.0 * h), 1e-6, "d tph/dr");

        let dth = metric.components_dtheta(r, th);
        let up = metric.components(r, th + h);
        let dn = metric.components(r, th - h);
        assert_close(dth.tt, (up.tt - dn.tt) / (2.0 * h), 1e-6, "d tt/dθ");
        assert_close(dth.rr, (up.rr - dn.rr) / (2.0 * h), 1e-6, "d rr/dθ");
        assert_close(dth.thth, (up.thth - dn.thth) / (2.0 * h), 1e-6, "d thth/dθ");
        assert_close(dth.phph, (up.phph - dn.phph) / (2.0 * h), 1e-5, "d phph/dθ");
        assert_close(dth.tph, (up.tph - dn.tph) / (2.0 * h), 1e-6, "d tph/dθ");
    }

    #[test]
    fn test_isco_known_values() {
        assert_close(Kerr::new(1.0, 0.0).isco_radius(), 6.0, 1e-12, "a=0");
        // Bardeen et al. 1972: prograde ISCO at a = 0.998 is ≈ 1.237 M.
        assert_close(Kerr::new(1.0, 0.998).isco_radius(), 1.237, 2e-3, "a=0.998");
    }

    #[test]
    fn test_horizon_known_values() {
        assert_close(Kerr::new(1.0, 0.0).inner_radius(), 2.0, 1e-14, "a=0");
        assert_close(Kerr::new(1.0, 1.0).inner_radius(), 1.0, 1e-14, "extremal");
    }
}
