// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Nelder–Mead Simplex
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Two-dimensional Nelder–Mead simplex minimization for the target-point
//! optimizer. Derivative-free; no convergence guarantee is implied, the
//! caller judges adequacy from the returned objective value.

/// Reflection/expansion/contraction/shrink coefficients and stop criteria.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    pub max_iterations: usize,
    /// Stop when the objective spread across the simplex drops below this.
    pub f_tol: f64,
    /// Stop when the simplex diameter drops below this.
    pub x_tol: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        SimplexOptions {
            max_iterations: 200,
            f_tol: 1e-10,
            x_tol: 1e-10,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimplexResult {
    pub x: [f64; 2],
    pub fx: f64,
    pub iterations: usize,
    pub converged: bool,
}

fn centroid(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

fn lerp(from: [f64; 2], to: [f64; 2], t: f64) -> [f64; 2] {
    [from[0] + t * (to[0] - from[0]), from[1] + t * (to[1] - from[1])]
}

fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Minimize `f` over 2D starting from `x0` with an initial simplex of the
/// given edge scale.
pub fn nelder_mead_2d<F: FnMut(&[f64; 2]) -> f64>(
    mut f: F,
    x0: [f64; 2],
    scale: f64,
    opts: &SimplexOptions,
) -> SimplexResult {
    let mut verts = [
        x0,
        [x0[0] + scale, x0[1]],
        [x0[0], x0[1] + scale],
    ];
    let mut fvals = [f(&verts[0]), f(&verts[1]), f(&verts[2])];

    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iterations {
        iterations += 1;

        // Order: verts[0] best, verts[2] worst.
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| fvals[i].partial_cmp(&fvals[j]).unwrap_or(std::cmp::Ordering::Equal));
        verts = [verts[order[0]], verts[order[1]], verts[order[2]]];
        fvals = [fvals[order[0]], fvals[order[1]], fvals[order[2]]];

        let f_spread = (fvals[2] - fvals[0]).abs();
        let diameter = dist(verts[0], verts[1])
            .max(dist(verts[0], verts[2]))
            .max(dist(verts[1], verts[2]));
        if f_spread < opts.f_tol || diameter < opts.x_tol {
            converged = true;
            break;
        }

        let cen = centroid(verts[0], verts[1]);
        let reflected = lerp(verts[2], cen, 1.0 + opts.reflection);
        let f_reflected = f(&reflected);

        if f_reflected < fvals[0] {
            let expanded = lerp(verts[2], cen, 1.0 + opts.reflection * opts.expansion);
            let f_expanded = f(&expanded);
            if f_expanded < f_reflected {
                verts[2] = expanded;
                fvals[2] = f_expanded;
            } else {
                verts[2] = reflected;
                fvals[2] = f_reflected;
            }
            continue;
        }

        if f_reflected < fvals[1] {
            verts[2] = reflected;
            fvals[2] = f_reflected;
            continue;
        }

        let contracted = lerp(verts[2], cen, opts.contraction);
        let f_contracted = f(&contracted);
        if f_contracted < fvals[2] {
            verts[2] = contracted;
            fvals[2] = f_contracted;
            continue;
        }

        // Shrink toward the best vertex.
        for i in 1..3 {
            verts[i] = lerp(verts[0], verts[i], opts.shrink);
            fvals[i] = f(&verts[i]);
        }
    }

    let mut best = 0;
    for i in 1..3 {
        if fvals[i] < fvals[best] {
            best = i;
        }
    }

    SimplexResult {
        x: verts[best],
        fx: fvals[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl_minimum() {
        let result = nelder_mead_2d(
            |x| (x[0] - 3.0).powi(2) + (x[1] + 1.5).powi(2),
            [0.0, 0.0],
            1.0,
            &SimplexOptions::default(),
        );
        assert!(result.converged);
        assert!((result.x[0] - 3.0).abs() < 1e-4, "x0 = {}", result.x[0]);
        assert!((result.x[1] + 1.5).abs() < 1e-4, "x1 = {}", result.x[1]);
    }

    #[test]
    fn test_rosenbrock_improves_substantially() {
        let rosenbrock =
            |x: &[f64; 2]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let f0 = rosenbrock(&[-1.0, 1.0]);
        let opts = SimplexOptions {
            max_iterations: 500,
            ..Default::default()
        };
        let result = nelder_mead_2d(rosenbrock, [-1.0, 1.0], 0.5, &opts);
        assert!(
            result.fx < f0 * 1e-3,
            "expected large objective reduction, got {} from {}",
            result.fx,
            f0
        );
    }

    #[test]
    fn test_iteration_cap_reported() {
        let opts = SimplexOptions {
            max_iterations: 3,
            f_tol: 0.0,
            x_tol: 0.0,
            ..Default::default()
        };
        let result = nelder_mead_2d(|x| x[0] * x[0] + x[1] * x[1], [5.0, 5.0], 1.0, &opts);
        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }
}
