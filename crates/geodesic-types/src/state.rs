// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

/// Terminal classification of a finished trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Trace still in flight, or ended without hitting any terminal condition.
    NoStatus,
    /// Ray terminated on an accretion-geometry surface.
    IntersectedWithGeometry,
    /// Radial coordinate dropped below the inner-boundary multiple of the horizon.
    WithinInnerBoundary,
    /// Radial coordinate exceeded the effective-infinity radius (escape).
    OutsideCoordinateRange,
    /// Affine-parameter domain exhausted.
    MaxAffineParameter,
    /// Target-point optimizer event: ray passed within `d_tol` of the target.
    TargetReached,
}

/// Set-once terminal status cell. The first non-`NoStatus` write wins;
/// later writes are ignored, so a recorded status never reverts.
#[derive(Debug, Clone, Copy)]
pub struct StatusCell(Status);

impl StatusCell {
    pub fn new() -> Self {
        StatusCell(Status::NoStatus)
    }

    pub fn get(&self) -> Status {
        self.0
    }

    pub fn set(&mut self, status: Status) {
        if self.0 == Status::NoStatus {
            self.0 = status;
        }
    }

    pub fn is_set(&self) -> bool {
        self.0 != Status::NoStatus
    }

    pub fn reset(&mut self) {
        self.0 = Status::NoStatus;
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Position and velocity of a ray, generic over the scalar type so the
/// sensitivity module can push dual numbers through the same pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RayState<T> {
    /// Position (t, r, θ, φ).
    pub x: [T; 4],
    /// Four-velocity (momentum for null rays).
    pub v: [T; 4],
}

impl<T> RayState<T> {
    pub fn new(x: [T; 4], v: [T; 4]) -> Self {
        RayState { x, v }
    }
}

/// Result record of a completed trace. Immutable once produced.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicPoint<T> {
    /// Final position.
    pub x: [T; 4],
    /// Final velocity.
    pub v: [T; 4],
    /// Initial position.
    pub x_init: [T; 4],
    /// Initial velocity (after the normalization constraint).
    pub v_init: [T; 4],
    /// Affine parameter at termination.
    pub lambda: f64,
    pub status: Status,
    /// Accumulated intensity when radiative transfer was active.
    pub intensity: Option<T>,
}

/// Per-trace mutable bundle: terminal status, per-geometry-component
/// "currently inside" flags and the optimizer's running closest approach.
/// Owned by exactly one integrator session; reset on reinitialization.
#[derive(Debug, Clone)]
pub struct TraceParams {
    pub status: StatusCell,
    pub inside: Vec<bool>,
    pub closest_approach: f64,
}

impl TraceParams {
    pub fn new() -> Self {
        TraceParams {
            status: StatusCell::new(),
            inside: Vec::new(),
            closest_approach: f64::INFINITY,
        }
    }

    /// Reset for the next trace, sizing the inside-flag vector to the
    /// number of geometry components.
    pub fn reset(&mut self, component_count: usize) {
        self.status.reset();
        self.inside.clear();
        self.inside.resize(component_count, false);
        self.closest_approach = f64::INFINITY;
    }
}

impl Default for TraceParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_cell_set_once() {
        let mut cell = StatusCell::new();
        assert_eq!(cell.get(), Status::NoStatus);
        cell.set(Status::IntersectedWithGeometry);
        assert_eq!(cell.get(), Status::IntersectedWithGeometry);
        // A later terminal condition must not overwrite the first.
        cell.set(Status::OutsideCoordinateRange);
        assert_eq!(cell.get(), Status::IntersectedWithGeometry);
    }

    #[test]
    fn test_status_cell_reset_allows_reuse() {
        let mut cell = StatusCell::new();
        cell.set(Status::WithinInnerBoundary);
        cell.reset();
        assert!(!cell.is_set());
        cell.set(Status::OutsideCoordinateRange);
        assert_eq!(cell.get(), Status::OutsideCoordinateRange);
    }

    #[test]
    fn test_trace_params_reset_sizes_flags() {
        let mut params = TraceParams::new();
        params.reset(3);
        assert_eq!(params.inside.len(), 3);
        assert!(params.inside.iter().all(|&f| !f));
        params.inside[1] = true;
        params.closest_approach = 0.5;
        params.reset(2);
        assert_eq!(params.inside.len(), 2);
        assert!(params.inside.iter().all(|&f| !f));
        assert!(params.closest_approach.is_infinite());
    }
}
