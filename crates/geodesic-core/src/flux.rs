// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Flux Post-Processing
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Redshift and reflected-flux post-processing of terminated traces.
//!
//! The reflected flux of a disc cell illuminated by a corona follows the
//! standard power-law weighting
//! g_sd^{1+Γ} · E_disc^{−Γ} · dA / γ · (1/w), where g_sd is the
//! source-to-disc energy ratio, Γ the spectral index, dA the proper area
//! element, γ the disc Lorentz factor in the local non-rotating frame and
//! w the tessellation cell weight.

use ndarray::Array1;

use geodesic_math::jet::Real;
use geodesic_metrics::Spacetime;
use geodesic_types::error::{GeodesicError, GeodesicResult};
use geodesic_types::state::{GeodesicPoint, Status};

use crate::corona::CoronaModel;
use crate::geometry::AccretionGeometry;
use crate::transfer;

/// Photon energy −g(k, u) measured by an observer with four-velocity `u`.
pub fn photon_energy<T: Real, M: Spacetime<T>>(
    metric: &M,
    x: &[T; 4],
    k: &[T; 4],
    u: &[T; 4],
) -> T {
    -metric.metric(x).dot(k, u)
}

/// Lorentz factor of disc matter in the local non-rotating frame. The
/// azimuthal drift is always present; inside the ISCO the plunge adds a
/// radial component.
pub fn lorentz_factor<M: Spacetime<f64>>(metric: &M, x: &[f64; 4]) -> f64 {
    let u = transfer::disc_four_velocity(metric, x[1]);
    let g = metric.metric(x);
    let frame = metric.local_frame(x);
    let gamma_t = -g.dot(&u, &frame[0]);
    let v_phi = g.dot(&u, &frame[3]) / gamma_t;
    let mut v2 = v_phi * v_phi;
    if x[1] < metric.isco_radius() {
        let v_r = g.dot(&u, &frame[1]) / gamma_t;
        v2 += v_r * v_r;
    }
    1.0 / (1.0 - v2).sqrt()
}

/// Proper area element factor 1/√(g_θθ g_φφ) at a disc point.
pub fn area_element<M: Spacetime<f64>>(metric: &M, x: &[f64; 4]) -> f64 {
    let g = metric.metric(x);
    1.0 / (g.thth * g.phph).sqrt()
}

/// Disc tessellation: cell seed points with relative cell-area weights.
///
/// Raw cell areas (e.g. from a Voronoi partition of the disc surface)
/// normalize to cell_area / total_area, so the per-cell flux is invariant
/// under a rescaling of the input areas.
#[derive(Debug, Clone)]
pub struct DiscTessellation {
    /// Cell seed points (r, θ, φ) on the disc surface.
    pub points: Vec<[f64; 3]>,
    /// Relative cell-area weights, summing to one for area-built
    /// tessellations.
    pub weights: Vec<f64>,
}

impl DiscTessellation {
    /// Cell seed points with their raw, unnormalized cell areas.
    pub fn from_areas(points: Vec<[f64; 3]>, areas: &[f64]) -> Self {
        debug_assert_eq!(points.len(), areas.len());
        let total: f64 = areas.iter().sum();
        DiscTessellation {
            points,
            weights: areas.iter().map(|a| a / total).collect(),
        }
    }

    /// Equal-weight cells without point data.
    pub fn uniform(n: usize) -> Self {
        DiscTessellation {
            points: Vec::new(),
            weights: vec![1.0 / n as f64; n],
        }
    }

    /// Pre-normalized weights without point data.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        DiscTessellation {
            points: Vec::new(),
            weights,
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Reflected flux of one corona-to-disc ray. Rays that did not terminate
/// on the geometry contribute nothing.
pub fn reflected_flux_for_point<M, C>(
    metric: &M,
    corona: &C,
    point: &GeodesicPoint<f64>,
    spectral_index: f64,
    cell_weight: f64,
) -> f64
where
    M: Spacetime<f64>,
    C: CoronaModel<M>,
{
    if point.status != Status::IntersectedWithGeometry {
        return 0.0;
    }
    let u_disc = transfer::disc_four_velocity(metric, point.x[1]);
    let e_disc = photon_energy(metric, &point.x, &point.v, &u_disc);
    let u_src = corona.four_velocity(metric);
    let e_src = photon_energy(metric, &point.x_init, &point.v_init, &u_src);
    let g_sd = e_disc / e_src;
    let gamma = lorentz_factor(metric, &point.x);
    let area = area_element(metric, &point.x);
    g_sd.powf(1.0 + spectral_index) * e_disc.powf(-spectral_index) * area / gamma / cell_weight
}

/// Per-cell reflected flux of a batch of corona-to-disc traces.
///
/// Composite geometries mix emission regimes per component and have no
/// single disc rest frame, so they are rejected as an unsupported
/// combination.
pub fn reflected_flux_map<M, C>(
    metric: &M,
    corona: &C,
    geometry: &AccretionGeometry,
    points: &[GeodesicPoint<f64>],
    tessellation: &DiscTessellation,
    spectral_index: f64,
) -> GeodesicResult<Array1<f64>>
where
    M: Spacetime<f64>,
    C: CoronaModel<M>,
{
    if let AccretionGeometry::Composite(_) = geometry {
        return Err(GeodesicError::NotImplemented {
            metric: metric.name().to_string(),
            model: corona.name().to_string(),
            geometry: "Composite".to_string(),
        });
    }
    if points.len() != tessellation.len() {
        return Err(GeodesicError::BufferSizeMismatch {
            alpha_len: points.len(),
            beta_len: tessellation.len(),
            expected: points.len(),
        });
    }
    Ok(points
        .iter()
        .zip(&tessellation.weights)
        .map(|(p, &w)| reflected_flux_for_point(metric, corona, p, spectral_index, w))
        .collect::<Array1<f64>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corona::LampPost;
    use crate::geometry::{ThickDisc, ThinDisc};
    use crate::tracer::TracerSession;
    use geodesic_metrics::{Kerr, Schwarzschild, SpacetimeBase};
    use geodesic_types::config::TracerConfig;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_lorentz_factor_exceeds_unity_on_orbit() {
        let metric = Schwarzschild::new(1.0);
        let x = [0.0, 10.0, FRAC_PI_2, 0.0];
        let gamma = lorentz_factor(&metric, &x);
        assert!(gamma > 1.0, "orbital motion must dilate: γ = {gamma}");
        assert!(gamma < 2.0);
    }

    #[test]
    fn test_lorentz_factor_continuous_at_isco() {
        let metric = Kerr::new(1.0, 0.5);
        let r_isco = metric.isco_radius();
        let above = lorentz_factor(&metric, &[0.0, r_isco + 1e-5, FRAC_PI_2, 0.0]);
        let below = lorentz_factor(&metric, &[0.0, r_isco - 1e-5, FRAC_PI_2, 0.0]);
        assert!(
            (above - below).abs() < 1e-3,
            "γ jump at the ISCO: {above} vs {below}"
        );
    }

    #[test]
    fn test_reflected_flux_positive_for_disc_hit() {
        let metric = Schwarzschild::new(1.0);
        let corona = LampPost::new(10.0);
        let geom = AccretionGeometry::Thin(ThinDisc::new(4.0, 30.0));
        let cfg = TracerConfig::default();
        let mut session = TracerSession::new(&metric, Some(&geom), &cfg);
        let mut hits = 0;
        for ray in corona.source_rays(16) {
            let p = session.reinit_and_solve(ray);
            if p.status == Status::IntersectedWithGeometry {
                hits += 1;
                let f = reflected_flux_for_point(&metric, &corona, &p, 2.0, 1.0);
                assert!(f.is_finite() && f > 0.0, "flux {f}");
            }
        }
        assert!(hits > 0, "the lamp post must illuminate the disc");
    }

    #[test]
    fn test_missed_rays_contribute_zero() {
        let metric = Schwarzschild::new(1.0);
        let corona = LampPost::new(10.0);
        let geom = AccretionGeometry::Thin(ThinDisc::new(4.0, 30.0));
        let cfg = TracerConfig::default();
        let mut session = TracerSession::new(&metric, Some(&geom), &cfg);
        // Radially ingoing from the lamp post: straight into the hole.
        let p = session.trace(
            [0.0, 10.0, 1e-3, 0.0],
            [0.0, -1.0, 0.0, 0.0],
        );
        assert_eq!(p.status, Status::WithinInnerBoundary);
        let f = reflected_flux_for_point(&metric, &corona, &p, 2.0, 1.0);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_tessellation_from_areas_normalizes() {
        let points = vec![[10.0, FRAC_PI_2, 0.0], [14.0, FRAC_PI_2, 2.0]];
        let tess = DiscTessellation::from_areas(points.clone(), &[1.0, 3.0]);
        assert_eq!(tess.len(), 2);
        assert!((tess.weights[0] - 0.25).abs() < 1e-15);
        assert!((tess.weights[1] - 0.75).abs() < 1e-15);
        assert!((tess.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // Rescaled raw areas give the same relative weights.
        let scaled = DiscTessellation::from_areas(points, &[100.0, 300.0]);
        assert_eq!(tess.weights, scaled.weights);
    }

    #[test]
    fn test_flux_map_invariant_under_area_rescaling() {
        let metric = Schwarzschild::new(1.0);
        let corona = LampPost::new(10.0);
        let geom = AccretionGeometry::Thin(ThinDisc::new(4.0, 30.0));
        let cfg = TracerConfig::default();
        let mut session = TracerSession::new(&metric, Some(&geom), &cfg);
        let points: Vec<_> = corona
            .source_rays(8)
            .into_iter()
            .map(|ray| session.reinit_and_solve(ray))
            .collect();

        let seeds = vec![[10.0, FRAC_PI_2, 0.0]; 8];
        let areas = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let rescaled: Vec<f64> = areas.iter().map(|a| a * 250.0).collect();
        let t1 = DiscTessellation::from_areas(seeds.clone(), &areas);
        let t2 = DiscTessellation::from_areas(seeds, &rescaled);

        let f1 = reflected_flux_map(&metric, &corona, &geom, &points, &t1, 2.0).unwrap();
        let f2 = reflected_flux_map(&metric, &corona, &geom, &points, &t2, 2.0).unwrap();
        assert!(f1.iter().any(|&f| f > 0.0), "at least one cell must be lit");
        for (a, b) in f1.iter().zip(f2.iter()) {
            assert!((a - b).abs() <= 1e-12 * a.abs().max(1.0), "{a} vs {b}");
        }
    }

    #[test]
    fn test_flux_map_rejects_composite_geometry() {
        let metric = Schwarzschild::new(1.0);
        let corona = LampPost::new(10.0);
        let geom = AccretionGeometry::Composite(vec![
            AccretionGeometry::Thin(ThinDisc::new(4.0, 12.0)),
            AccretionGeometry::Thick(ThickDisc::new(15.0, 30.0, 0.2)),
        ]);
        let err = reflected_flux_map(
            &metric,
            &corona,
            &geom,
            &[],
            &DiscTessellation::uniform(0),
            2.0,
        )
        .unwrap_err();
        match err {
            GeodesicError::NotImplemented { geometry, .. } => {
                assert_eq!(geometry, "Composite");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_flux_map_rejects_length_mismatch() {
        let metric = Schwarzschild::new(1.0);
        let corona = LampPost::new(10.0);
        let geom = AccretionGeometry::Thin(ThinDisc::new(4.0, 30.0));
        let err = reflected_flux_map(
            &metric,
            &corona,
            &geom,
            &[],
            &DiscTessellation::uniform(3),
            2.0,
        )
        .unwrap_err();
        assert!(matches!(err, GeodesicError::BufferSizeMismatch { .. }));
    }
}
