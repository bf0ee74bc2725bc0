// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Forward-Mode Jets
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Two-slot forward-mode dual numbers ("jets") and the scalar abstraction
//! that lets the full tracing pipeline run on either `f64` or `Jet`.
//!
//! A `Jet` carries a value and two partial derivatives, enough for the
//! 2×2 Jacobian of the (α, β) ↦ (radius, redshift) map. Branch decisions
//! (event detection, step acceptance) compare value parts only, so the
//! derivative is piecewise-constant across a branch.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Scalar contract for the tracing pipeline: `f64` for ordinary traces,
/// [`Jet`] for the sensitivity module.
pub trait Real:
    Copy
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn from_f64(x: f64) -> Self;
    /// Value part; all comparisons and diagnostics go through this.
    fn val(self) -> f64;
    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn abs(self) -> Self;

    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    fn one() -> Self {
        Self::from_f64(1.0)
    }

    /// Multiply by a plain constant.
    fn scale(self, s: f64) -> Self {
        self * Self::from_f64(s)
    }
}

impl Real for f64 {
    fn from_f64(x: f64) -> Self {
        x
    }

    fn val(self) -> f64 {
        self
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn sin(self) -> Self {
        f64::sin(self)
    }

    fn cos(self) -> Self {
        f64::cos(self)
    }

    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }
}

/// Dual number with two independent derivative slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jet {
    pub re: f64,
    pub eps: [f64; 2],
}

impl Jet {
    /// A constant: zero derivative in both slots.
    pub fn constant(x: f64) -> Self {
        Jet {
            re: x,
            eps: [0.0, 0.0],
        }
    }

    /// An independent variable seeded in the given slot (0 or 1).
    pub fn variable(x: f64, slot: usize) -> Self {
        let mut eps = [0.0, 0.0];
        eps[slot] = 1.0;
        Jet { re: x, eps }
    }
}

impl Add for Jet {
    type Output = Jet;
    fn add(self, rhs: Jet) -> Jet {
        Jet {
            re: self.re + rhs.re,
            eps: [self.eps[0] + rhs.eps[0], self.eps[1] + rhs.eps[1]],
        }
    }
}

impl Sub for Jet {
    type Output = Jet;
    fn sub(self, rhs: Jet) -> Jet {
        Jet {
            re: self.re - rhs.re,
            eps: [self.eps[0] - rhs.eps[0], self.eps[1] - rhs.eps[1]],
        }
    }
}

impl Mul for Jet {
    type Output = Jet;
    fn mul(self, rhs: Jet) -> Jet {
        Jet {
            re: self.re * rhs.re,
            eps: [
                self.re * rhs.eps[0] + self.eps[0] * rhs.re,
                self.re * rhs.eps[1] + self.eps[1] * rhs.re,
            ],
        }
    }
}

impl Div for Jet {
    type Output = Jet;
    fn div(self, rhs: Jet) -> Jet {
        let inv = 1.0 / rhs.re;
        let inv2 = inv * inv;
        Jet {
            re: self.re * inv,
            eps: [
                (self.eps[0] * rhs.re - self.re * rhs.eps[0]) * inv2,
                (self.eps[1] * rhs.re - self.re * rhs.eps[1]) * inv2,
            ],
        }
    }
}

impl Neg for Jet {
    type Output = Jet;
    fn neg(self) -> Jet {
        Jet {
            re: -self.re,
            eps: [-self.eps[0], -self.eps[1]],
        }
    }
}

impl Real for Jet {
    fn from_f64(x: f64) -> Self {
        Jet::constant(x)
    }

    fn val(self) -> f64 {
        self.re
    }

    fn sqrt(self) -> Self {
        let s = self.re.sqrt();
        let d = 0.5 / s;
        Jet {
            re: s,
            eps: [self.eps[0] * d, self.eps[1] * d],
        }
    }

    fn sin(self) -> Self {
        let c = self.re.cos();
        Jet {
            re: self.re.sin(),
            eps: [self.eps[0] * c, self.eps[1] * c],
        }
    }

    fn cos(self) -> Self {
        let s = -self.re.sin();
        Jet {
            re: self.re.cos(),
            eps: [self.eps[0] * s, self.eps[1] * s],
        }
    }

    fn powi(self, n: i32) -> Self {
        let d = f64::from(n) * self.re.powi(n - 1);
        Jet {
            re: self.re.powi(n),
            eps: [self.eps[0] * d, self.eps[1] * d],
        }
    }

    fn abs(self) -> Self {
        if self.re < 0.0 {
            -self
        } else {
            self
        }
    }
}
