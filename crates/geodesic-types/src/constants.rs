// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Geometrized units throughout: G = c = 1, radii in units of the central
// mass M. A Schwarzschild horizon therefore sits at r = 2.

/// Default absolute integration tolerance for general tracing.
pub const DEFAULT_ABS_TOL: f64 = 1e-9;

/// Default relative integration tolerance for general tracing.
pub const DEFAULT_REL_TOL: f64 = 1e-9;

/// Default "effective infinity": a ray beyond this radius has escaped.
pub const DEFAULT_EFFECTIVE_INFINITY: f64 = 1000.0;

/// Multiple of the inner (horizon) radius below which a trace terminates.
pub const DEFAULT_INNER_RADIUS_FACTOR: f64 = 1.01;

/// Default affine-parameter span for a single trace.
pub const DEFAULT_MAX_AFFINE: f64 = 2000.0;

/// Default absolute tolerance for the image-plane root search.
pub const DEFAULT_ZERO_ATOL: f64 = 1e-7;

/// Default maximum image-plane offset searched by the root solver.
pub const DEFAULT_OFFSET_MAX: f64 = 20.0;

/// Residual re-check factor applied to `zero_atol` after root convergence.
/// Empirical; see TracerConfig docs.
pub const DEFAULT_RESIDUAL_CHECK_FACTOR: f64 = 1e4;

/// Slope of the penalty applied to negative image-plane offsets.
/// Empirical; keeps the root search in the physical domain r >= 0.
pub const DEFAULT_NEGATIVE_OFFSET_PENALTY: f64 = 1000.0;

/// Default closest-approach tolerance for the target-point optimizer.
pub const DEFAULT_TARGET_DISTANCE_TOL: f64 = 1e-2;
