// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Accretion Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Accretion geometry variants and their signed-distance functions.
//!
//! The integrator watches each component's signed distance for sign
//! changes; what a verified crossing does (terminate the ray, or flip the
//! component's "currently inside" flag for radiative transfer) is the
//! component's [`CrossingEffect`]. Positions are Boyer–Lindquist
//! (t, r, θ, φ); the cylindrical projection is ρ = r sinθ, z = r cosθ.

/// What the integrator does when a ray crosses a component surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingEffect {
    /// Opaque surface: stop and record the intersection.
    Terminate,
    /// Optically thin volume boundary: flip the inside flag and keep going.
    ToggleInside,
    /// No crossing bookkeeping; membership is re-evaluated pointwise.
    PassThrough,
}

/// Razor-thin equatorial (or offset-plane) annulus.
///
/// Opaque by default. The optically thin form is a slab of small
/// half-thickness whose membership is cheap to test directly, so it uses
/// the pointwise predicate instead of crossing bookkeeping.
#[derive(Debug, Clone)]
pub struct ThinDisc {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Height z₀ of the disc plane above the equatorial plane.
    pub plane_height: f64,
    pub optically_thin: bool,
    /// Half-thickness of the slab when optically thin.
    pub half_thickness: f64,
    /// Gray emissivity normalization j₀.
    pub emissivity: f64,
    /// Gray absorption normalization a₀.
    pub absorption: f64,
    /// Radial power-law index q in j(ρ) = j₀ ρ^{-q}.
    pub emissivity_index: f64,
}

impl ThinDisc {
    pub fn new(inner_radius: f64, outer_radius: f64) -> Self {
        ThinDisc {
            inner_radius,
            outer_radius,
            plane_height: 0.0,
            optically_thin: false,
            half_thickness: 0.0,
            emissivity: 0.0,
            absorption: 0.0,
            emissivity_index: 3.0,
        }
    }

    pub fn with_plane_height(mut self, plane_height: f64) -> Self {
        self.plane_height = plane_height;
        self
    }

    /// Optically thin slab of the given half-thickness.
    pub fn optically_thin(inner_radius: f64, outer_radius: f64, half_thickness: f64) -> Self {
        ThinDisc {
            inner_radius,
            outer_radius,
            plane_height: 0.0,
            optically_thin: true,
            half_thickness,
            emissivity: 1.0,
            absorption: 0.0,
            emissivity_index: 3.0,
        }
    }
}

/// Wedge torus of opening angle atan(aspect): the surface sits at
/// |z| = aspect · ρ over the radial range of the disc.
#[derive(Debug, Clone)]
pub struct ThickDisc {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Height-to-cylindrical-radius ratio h(ρ)/ρ.
    pub aspect: f64,
    pub optically_thin: bool,
    pub emissivity: f64,
    pub absorption: f64,
    pub emissivity_index: f64,
}

impl ThickDisc {
    pub fn new(inner_radius: f64, outer_radius: f64, aspect: f64) -> Self {
        ThickDisc {
            inner_radius,
            outer_radius,
            aspect,
            optically_thin: false,
            emissivity: 0.0,
            absorption: 0.0,
            emissivity_index: 3.0,
        }
    }

    pub fn optically_thin(inner_radius: f64, outer_radius: f64, aspect: f64) -> Self {
        ThickDisc {
            inner_radius,
            outer_radius,
            aspect,
            optically_thin: true,
            emissivity: 1.0,
            absorption: 0.0,
            emissivity_index: 3.0,
        }
    }

    /// Surface height above the equatorial plane at cylindrical radius ρ.
    pub fn height_at(&self, rho: f64) -> f64 {
        self.aspect * rho
    }
}

/// Accretion geometry: a single disc or a composite of several components,
/// each with its own crossing behavior and transfer coefficients.
#[derive(Debug, Clone)]
pub enum AccretionGeometry {
    Thin(ThinDisc),
    Thick(ThickDisc),
    Composite(Vec<AccretionGeometry>),
}

fn cylindrical(x: &[f64; 4]) -> (f64, f64) {
    (x[1] * x[2].sin(), x[1] * x[2].cos())
}

impl AccretionGeometry {
    /// Flattened list of leaf components, in flag-index order.
    pub fn leaves(&self) -> Vec<&AccretionGeometry> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a AccretionGeometry>) {
        match self {
            AccretionGeometry::Composite(parts) => {
                for p in parts {
                    p.collect_leaves(out);
                }
            }
            leaf => out.push(leaf),
        }
    }

    pub fn component_count(&self) -> usize {
        match self {
            AccretionGeometry::Composite(parts) => {
                parts.iter().map(|p| p.component_count()).sum()
            }
            _ => 1,
        }
    }

    /// Signed distance to the component surface; negative on the disc side.
    /// Sign changes are candidate crossings, verified by [`Self::in_radial_range`]
    /// at the refined crossing point.
    pub fn signed_distance(&self, x: &[f64; 4]) -> f64 {
        let (rho, z) = cylindrical(x);
        match self {
            AccretionGeometry::Thin(d) => z - d.plane_height,
            AccretionGeometry::Thick(d) => z.abs() - d.height_at(rho),
            AccretionGeometry::Composite(parts) => parts
                .iter()
                .map(|p| p.signed_distance(x))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Whether the cylindrical radius at `x` falls within the component's
    /// radial annulus.
    pub fn in_radial_range(&self, x: &[f64; 4]) -> bool {
        let (rho, _) = cylindrical(x);
        match self {
            AccretionGeometry::Thin(d) => rho >= d.inner_radius && rho <= d.outer_radius,
            AccretionGeometry::Thick(d) => rho >= d.inner_radius && rho <= d.outer_radius,
            AccretionGeometry::Composite(parts) => parts.iter().any(|p| p.in_radial_range(x)),
        }
    }

    /// Pointwise membership test.
    pub fn contains(&self, x: &[f64; 4]) -> bool {
        let (rho, z) = cylindrical(x);
        match self {
            AccretionGeometry::Thin(d) => {
                rho >= d.inner_radius
                    && rho <= d.outer_radius
                    && (z - d.plane_height).abs() <= d.half_thickness
            }
            AccretionGeometry::Thick(d) => {
                rho >= d.inner_radius && rho <= d.outer_radius && z.abs() <= d.height_at(rho)
            }
            AccretionGeometry::Composite(parts) => parts.iter().any(|p| p.contains(x)),
        }
    }

    pub fn is_optically_thin(&self) -> bool {
        match self {
            AccretionGeometry::Thin(d) => d.optically_thin,
            AccretionGeometry::Thick(d) => d.optically_thin,
            AccretionGeometry::Composite(parts) => parts.iter().all(|p| p.is_optically_thin()),
        }
    }

    pub fn crossing_effect(&self) -> CrossingEffect {
        match self {
            AccretionGeometry::Thin(d) if d.optically_thin => CrossingEffect::PassThrough,
            AccretionGeometry::Thin(_) => CrossingEffect::Terminate,
            AccretionGeometry::Thick(d) if d.optically_thin => CrossingEffect::ToggleInside,
            AccretionGeometry::Thick(_) => CrossingEffect::Terminate,
            AccretionGeometry::Composite(_) => CrossingEffect::PassThrough,
        }
    }

    /// Gray absorption coefficient a_ν at a point assumed inside the
    /// component.
    pub fn absorption_coefficient(&self, x: &[f64; 4], _frequency: f64) -> f64 {
        let (rho, _) = cylindrical(x);
        match self {
            AccretionGeometry::Thin(d) => d.absorption * rho.powf(-d.emissivity_index),
            AccretionGeometry::Thick(d) => d.absorption * rho.powf(-d.emissivity_index),
            AccretionGeometry::Composite(_) => 0.0,
        }
    }

    /// Gray emissivity coefficient j_ν at a point assumed inside the
    /// component; radial power law j₀ ρ^{-q}.
    pub fn emissivity_coefficient(&self, x: &[f64; 4], _frequency: f64) -> f64 {
        let (rho, _) = cylindrical(x);
        match self {
            AccretionGeometry::Thin(d) => d.emissivity * rho.powf(-d.emissivity_index),
            AccretionGeometry::Thick(d) => d.emissivity * rho.powf(-d.emissivity_index),
            AccretionGeometry::Composite(_) => 0.0,
        }
    }

    /// Datum plane for radius solving against non-planar surfaces: the
    /// horizontal annulus at the surface height above the target radius.
    /// `None` for composites, which have no single datum.
    pub fn datum_plane(&self, target_radius: f64) -> Option<ThinDisc> {
        match self {
            AccretionGeometry::Thin(d) => Some(d.clone()),
            AccretionGeometry::Thick(d) => Some(
                ThinDisc::new(d.inner_radius, d.outer_radius)
                    .with_plane_height(d.height_at(target_radius)),
            ),
            AccretionGeometry::Composite(_) => None,
        }
    }
}
