// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Corona Source Models
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Compact X-ray source models illuminating the disc.

use geodesic_metrics::Spacetime;
use geodesic_types::state::RayState;

/// A localized photon source with a definite position and rest frame.
pub trait CoronaModel<M> {
    /// Model name, used in dispatch errors.
    fn name(&self) -> &'static str;

    /// Source position (t, r, θ, φ).
    fn position(&self) -> [f64; 4];

    /// Four-velocity of the source rest frame.
    fn four_velocity(&self, metric: &M) -> [f64; 4];
}

/// Polar offset standing in for the coordinate axis, where the azimuthal
/// metric terms degenerate.
const AXIS_THETA: f64 = 1e-3;

/// Static point source on the rotation axis at the given height.
#[derive(Debug, Clone, Copy)]
pub struct LampPost {
    pub height: f64,
}

impl LampPost {
    pub fn new(height: f64) -> Self {
        LampPost { height }
    }

    /// Fan of `n` source rays spread in the polar direction between the
    /// axis and the equatorial plane, as raw states for the tracer to
    /// constrain.
    pub fn source_rays(&self, n: usize) -> Vec<RayState<f64>> {
        let x = self.position_impl();
        (0..n)
            .map(|k| {
                // Launch angles stay clear of the axis and the plane.
                let psi = 0.1 + (std::f64::consts::FRAC_PI_2 - 0.2) * (k as f64 + 0.5) / n as f64;
                let v = [0.0, -psi.cos(), psi.sin() / self.height, 0.0];
                RayState::new(x, v)
            })
            .collect()
    }

    fn position_impl(&self) -> [f64; 4] {
        [0.0, self.height, AXIS_THETA, 0.0]
    }
}

impl<M: Spacetime<f64>> CoronaModel<M> for LampPost {
    fn name(&self) -> &'static str {
        "LampPost"
    }

    fn position(&self) -> [f64; 4] {
        self.position_impl()
    }

    fn four_velocity(&self, metric: &M) -> [f64; 4] {
        let x = self.position_impl();
        let g = metric.metric(&x);
        [1.0 / (-g.tt).sqrt(), 0.0, 0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodesic_metrics::Schwarzschild;

    #[test]
    fn test_lamp_post_velocity_is_normalized() {
        let metric = Schwarzschild::new(1.0);
        let corona = LampPost::new(10.0);
        let u = CoronaModel::<Schwarzschild>::four_velocity(&corona, &metric);
        let g = metric.metric(&CoronaModel::<Schwarzschild>::position(&corona));
        assert!((g.dot(&u, &u) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_source_rays_point_inward_and_downward() {
        let corona = LampPost::new(10.0);
        let rays = corona.source_rays(8);
        assert_eq!(rays.len(), 8);
        for ray in &rays {
            assert!(ray.v[1] < 0.0);
            assert!(ray.v[2] > 0.0, "rays head toward the equatorial plane");
        }
    }
}
