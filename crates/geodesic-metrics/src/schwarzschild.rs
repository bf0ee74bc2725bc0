// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Schwarzschild Metric
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Non-rotating point mass in standard Schwarzschild coordinates.

use geodesic_math::jet::Real;

use crate::{MetricComponents, Spacetime, SpacetimeBase};

/// Schwarzschild spacetime of mass `m`; horizon at r = 2m, ISCO at r = 6m.
#[derive(Debug, Clone, Copy)]
pub struct Schwarzschild {
    pub mass: f64,
}

impl Schwarzschild {
    pub fn new(mass: f64) -> Self {
        Schwarzschild { mass }
    }
}

impl SpacetimeBase for Schwarzschild {
    fn name(&self) -> &'static str {
        "Schwarzschild"
    }

    fn inner_radius(&self) -> f64 {
        2.0 * self.mass
    }

    fn isco_radius(&self) -> f64 {
        6.0 * self.mass
    }
}

impl<T: Real> Spacetime<T> for Schwarzschild {
    fn components(&self, r: T, theta: T) -> MetricComponents<T> {
        let m = T::from_f64(self.mass);
        let f = T::one() - (m + m) / r;
        let sin = theta.sin();
        MetricComponents {
            tt: -f,
            rr: T::one() / f,
            thth: r * r,
            phph: r * r * sin * sin,
            tph: T::zero(),
        }
    }

    fn components_dr(&self, r: T, theta: T) -> MetricComponents<T> {
        let m = T::from_f64(self.mass);
        let two_m = m + m;
        let f = T::one() - two_m / r;
        let df = two_m / (r * r);
        let sin = theta.sin();
        MetricComponents {
            tt: -df,
            rr: -df / (f * f),
            thth: r + r,
            phph: (r + r) * sin * sin,
            tph: T::zero(),
        }
    }

    fn components_dtheta(&self, r: T, theta: T) -> MetricComponents<T> {
        let z = T::zero();
        let sin = theta.sin();
        let cos = theta.cos();
        MetricComponents {
            tt: z,
            rr: z,
            thth: z,
            phph: r * r * (sin * cos).scale(2.0),
            tph: z,
        }
    }

    fn keplerian_angular_velocity(&self, r: T) -> T {
        // Ω = √M / r^{3/2}
        T::from_f64(self.mass.sqrt()) / r.sqrt().powi(3)
    }
}
