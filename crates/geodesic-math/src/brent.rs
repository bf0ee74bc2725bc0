// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Scalar Root Finding
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Derivative-free scalar zero finding: outward bracket expansion plus
//! Brent's method (inverse quadratic interpolation with bisection
//! safeguard).

/// A sign-changing interval [a, b] with the function values at both ends.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    pub a: f64,
    pub b: f64,
    pub fa: f64,
    pub fb: f64,
}

/// Expand outward from `x0` in doubling steps until a sign change is found
/// inside [lo, hi]. Returns `None` when the domain holds no sign change on
/// the probed grid.
pub fn bracket_root<F: FnMut(f64) -> f64>(
    mut f: F,
    x0: f64,
    initial_step: f64,
    lo: f64,
    hi: f64,
) -> Option<Bracket> {
    let x0 = x0.clamp(lo, hi);
    let f0 = f(x0);
    if f0 == 0.0 {
        return Some(Bracket {
            a: x0,
            b: x0,
            fa: f0,
            fb: f0,
        });
    }

    let mut step = initial_step.abs().max(1e-12);
    let mut left = x0;
    let mut f_left = f0;
    let mut right = x0;
    let mut f_right = f0;

    for _ in 0..64 {
        let mut moved = false;

        if right < hi {
            let x = (right + step).min(hi);
            let fx = f(x);
            if fx * f_right <= 0.0 {
                return Some(Bracket {
                    a: right,
                    b: x,
                    fa: f_right,
                    fb: fx,
                });
            }
            right = x;
            f_right = fx;
            moved = true;
        }

        if left > lo {
            let x = (left - step).max(lo);
            let fx = f(x);
            if fx * f_left <= 0.0 {
                return Some(Bracket {
                    a: x,
                    b: left,
                    fa: fx,
                    fb: f_left,
                });
            }
            left = x;
            f_left = fx;
            moved = true;
        }

        if !moved {
            return None;
        }
        step *= 2.0;
    }

    None
}

/// Brent's method on a bracketing interval. Returns `None` only for an
/// invalid bracket; hitting the iteration cap returns the best estimate,
/// which the caller is expected to re-validate.
pub fn brent<F: FnMut(f64) -> f64>(
    mut f: F,
    bracket: Bracket,
    atol: f64,
    max_iter: usize,
) -> Option<f64> {
    let (mut a, mut b, mut fa, mut fb) = (bracket.a, bracket.b, bracket.fa, bracket.fb);
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa * fb > 0.0 {
        return None;
    }

    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut mflag = true;

    for _ in 0..max_iter {
        if fb == 0.0 || (b - a).abs() < atol {
            return Some(b);
        }

        let mut s = if fa != fc && fb != fc {
            // Inverse quadratic interpolation.
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            // Secant step.
            b - fb * (b - a) / (fb - fa)
        };

        let lo = (3.0 * a + b) / 4.0;
        let cond_range = !((lo.min(b) < s) && (s < lo.max(b)));
        let cond_mflag = mflag && (s - b).abs() >= (b - c).abs() / 2.0;
        let cond_dflag = !mflag && (s - b).abs() >= (c - d).abs() / 2.0;
        let cond_small_m = mflag && (b - c).abs() < atol;
        let cond_small_d = !mflag && (c - d).abs() < atol;

        if cond_range || cond_mflag || cond_dflag || cond_small_m || cond_small_d {
            s = (a + b) / 2.0;
            mflag = true;
        } else {
            mflag = false;
        }

        let fs = f(s);
        d = c;
        c = b;
        fc = fb;

        if fa * fs < 0.0 {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }

        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
    }

    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brent_cubic_root() {
        let f = |x: f64| x * x * x - 2.0 * x - 5.0;
        let bracket = bracket_root(f, 2.0, 0.5, -10.0, 10.0).unwrap();
        let root = brent(f, bracket, 1e-12, 100).unwrap();
        assert!(f(root).abs() < 1e-10, "residual {}", f(root));
        assert!((root - 2.0945514815423265).abs() < 1e-9);
    }

    #[test]
    fn test_bracket_expands_both_directions() {
        let f = |x: f64| x + 3.0;
        let bracket = bracket_root(f, 1.0, 0.25, -10.0, 10.0).unwrap();
        assert!(bracket.fa * bracket.fb <= 0.0);
        assert!(bracket.a <= -3.0 && -3.0 <= bracket.b);
    }

    #[test]
    fn test_no_bracket_when_no_sign_change() {
        let f = |x: f64| x * x + 1.0;
        assert!(bracket_root(f, 0.0, 0.5, -5.0, 5.0).is_none());
    }

    #[test]
    fn test_brent_rejects_non_bracketing_interval() {
        let f = |x: f64| x * x + 1.0;
        let fake = Bracket {
            a: 0.0,
            b: 1.0,
            fa: 1.0,
            fb: 2.0,
        };
        assert!(brent(f, fake, 1e-10, 50).is_none());
    }
}
