// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Adaptive RK45 Stepper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cash–Karp embedded Runge–Kutta 4(5) stepper with a reusable workspace.
//!
//! The stepper owns its stage buffers so repeated solves (root finding,
//! optimization, batched sampling) never reallocate. It is generic over
//! [`Real`] so the sensitivity module can integrate jets through the same
//! code path; step acceptance compares value parts only.

use crate::jet::Real;

/// Right-hand side of a first-order ODE system dy/dλ = f(λ, y).
pub trait OdeSystem<T: Real> {
    fn dim(&self) -> usize;
    fn rhs(&self, lambda: f64, y: &[T], dydt: &mut [T]);
}

/// Step-size controller parameters.
#[derive(Debug, Clone, Copy)]
pub struct StepControl {
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub h_min: f64,
    pub h_max: f64,
    pub safety: f64,
}

impl Default for StepControl {
    fn default() -> Self {
        StepControl {
            abs_tol: 1e-9,
            rel_tol: 1e-9,
            h_min: 1e-12,
            h_max: 10.0,
            safety: 0.9,
        }
    }
}

// Cash–Karp tableau.
const A: [[f64; 5]; 5] = [
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0, 0.0, 0.0],
    [-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0, 0.0],
    [
        1631.0 / 55296.0,
        175.0 / 512.0,
        575.0 / 13824.0,
        44275.0 / 110592.0,
        253.0 / 4096.0,
    ],
];
const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 3.0 / 5.0, 1.0, 7.0 / 8.0];
const B5: [f64; 6] = [
    37.0 / 378.0,
    0.0,
    250.0 / 621.0,
    125.0 / 594.0,
    0.0,
    512.0 / 1771.0,
];
const B4: [f64; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    1.0 / 4.0,
];

/// Outcome of one accepted adaptive step.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    /// Step size actually taken.
    pub h_used: f64,
    /// Suggested size for the next step.
    pub h_next: f64,
}

/// Reusable RK45 workspace for a fixed state dimension.
pub struct Rk45Stepper<T> {
    n: usize,
    k: Vec<Vec<T>>,
    y_stage: Vec<T>,
    y_next: Vec<T>,
    y_err: Vec<T>,
    pub control: StepControl,
}

impl<T: Real> Rk45Stepper<T> {
    pub fn new(n: usize, control: StepControl) -> Self {
        Rk45Stepper {
            n,
            k: (0..6).map(|_| vec![T::zero(); n]).collect(),
            y_stage: vec![T::zero(); n],
            y_next: vec![T::zero(); n],
            y_err: vec![T::zero(); n],
            control,
        }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    /// Attempt a single Cash–Karp step of size `h`; fills `y_next`/`y_err`
    /// and returns the scaled error norm (accept when <= 1).
    fn try_step<S: OdeSystem<T>>(&mut self, sys: &S, lambda: f64, y: &[T], h: f64) -> f64 {
        sys.rhs(lambda, y, &mut self.k[0]);

        for s in 1..6 {
            for i in 0..self.n {
                let mut acc = T::zero();
                for (j, kj) in self.k.iter().enumerate().take(s) {
                    let a = A[s - 1][j];
                    if a != 0.0 {
                        acc = acc + kj[i].scale(a);
                    }
                }
                self.y_stage[i] = y[i] + acc.scale(h);
            }
            let (head, tail) = self.k.split_at_mut(s);
            let _ = head;
            sys.rhs(lambda + C[s] * h, &self.y_stage, &mut tail[0]);
        }

        for i in 0..self.n {
            let mut sum5 = T::zero();
            let mut err = T::zero();
            for (j, kj) in self.k.iter().enumerate() {
                if B5[j] != 0.0 {
                    sum5 = sum5 + kj[i].scale(B5[j]);
                }
                let db = B5[j] - B4[j];
                if db != 0.0 {
                    err = err + kj[i].scale(db);
                }
            }
            self.y_next[i] = y[i] + sum5.scale(h);
            self.y_err[i] = err.scale(h);
        }

        // Scaled RMS error norm over value parts.
        let mut sum = 0.0;
        for i in 0..self.n {
            let scale =
                self.control.abs_tol + self.control.rel_tol * y[i].val().abs().max(self.y_next[i].val().abs());
            let e = self.y_err[i].val() / scale;
            sum += e * e;
        }
        (sum / self.n as f64).sqrt()
    }

    /// Advance `y` in place by one accepted adaptive step, retrying with a
    /// smaller `h` on rejection. The `h_min` floor guards against a stalled
    /// controller: at the floor the step is accepted as-is.
    pub fn advance<S: OdeSystem<T>>(
        &mut self,
        sys: &S,
        lambda: f64,
        y: &mut [T],
        h_try: f64,
    ) -> StepOutcome {
        debug_assert_eq!(y.len(), self.n);
        let mut h = h_try.clamp(self.control.h_min, self.control.h_max);

        loop {
            let err = self.try_step(sys, lambda, y, h);

            if err <= 1.0 || h <= self.control.h_min {
                y.copy_from_slice(&self.y_next);
                let grow = if err > 0.0 {
                    (self.control.safety * err.powf(-0.2)).clamp(0.2, 5.0)
                } else {
                    5.0
                };
                let h_next = (h * grow).clamp(self.control.h_min, self.control.h_max);
                return StepOutcome { h_used: h, h_next };
            }

            let shrink = (self.control.safety * err.powf(-0.25)).clamp(0.1, 0.9);
            h = (h * shrink).max(self.control.h_min);
        }
    }

    /// One classic fixed RK4 step from `y` into `out`; used to re-integrate
    /// short sub-intervals when bisecting an event crossing.
    pub fn rk4_step<S: OdeSystem<T>>(
        &mut self,
        sys: &S,
        lambda: f64,
        y: &[T],
        h: f64,
        out: &mut [T],
    ) {
        sys.rhs(lambda, y, &mut self.k[0]);

        for i in 0..self.n {
            self.y_stage[i] = y[i] + self.k[0][i].scale(0.5 * h);
        }
        {
            let (head, tail) = self.k.split_at_mut(1);
            let _ = head;
            sys.rhs(lambda + 0.5 * h, &self.y_stage, &mut tail[0]);
        }

        for i in 0..self.n {
            self.y_stage[i] = y[i] + self.k[1][i].scale(0.5 * h);
        }
        {
            let (head, tail) = self.k.split_at_mut(2);
            let _ = head;
            sys.rhs(lambda + 0.5 * h, &self.y_stage, &mut tail[0]);
        }

        for i in 0..self.n {
            self.y_stage[i] = y[i] + self.k[2][i].scale(h);
        }
        {
            let (head, tail) = self.k.split_at_mut(3);
            let _ = head;
            sys.rhs(lambda + h, &self.y_stage, &mut tail[0]);
        }

        for i in 0..self.n {
            let sum = self.k[0][i]
                + self.k[1][i].scale(2.0)
                + self.k[2][i].scale(2.0)
                + self.k[3][i];
            out[i] = y[i] + sum.scale(h / 6.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay;

    impl OdeSystem<f64> for Decay {
        fn dim(&self) -> usize {
            1
        }
        fn rhs(&self, _lambda: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = -y[0];
        }
    }

    struct Oscillator;

    impl OdeSystem<f64> for Oscillator {
        fn dim(&self) -> usize {
            2
        }
        fn rhs(&self, _lambda: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = y[1];
            dydt[1] = -y[0];
        }
    }

    fn integrate_to<S: OdeSystem<f64>>(
        stepper: &mut Rk45Stepper<f64>,
        sys: &S,
        y: &mut [f64],
        lambda_end: f64,
    ) {
        let mut lambda = 0.0;
        let mut h: f64 = 0.1;
        while lambda < lambda_end {
            let h_try = h.min(lambda_end - lambda);
            let out = stepper.advance(sys, lambda, y, h_try);
            lambda += out.h_used;
            h = out.h_next;
        }
    }

    #[test]
    fn test_exponential_decay_matches_analytic() {
        let mut stepper = Rk45Stepper::new(1, StepControl::default());
        let mut y = [1.0];
        integrate_to(&mut stepper, &Decay, &mut y, 5.0);
        assert!(
            (y[0] - (-5.0_f64).exp()).abs() < 1e-8,
            "got {}, expected {}",
            y[0],
            (-5.0_f64).exp()
        );
    }

    #[test]
    fn test_oscillator_energy_preserved_at_tolerance() {
        let mut stepper = Rk45Stepper::new(2, StepControl::default());
        let mut y = [1.0, 0.0];
        integrate_to(&mut stepper, &Oscillator, &mut y, 20.0 * std::f64::consts::PI);
        let energy = y[0] * y[0] + y[1] * y[1];
        assert!(
            (energy - 1.0).abs() < 1e-6,
            "energy drifted to {energy} after 10 periods"
        );
    }

    #[test]
    fn test_workspace_reuse_is_deterministic() {
        let mut stepper = Rk45Stepper::new(1, StepControl::default());
        let mut y1 = [1.0];
        integrate_to(&mut stepper, &Decay, &mut y1, 3.0);
        let mut y2 = [1.0];
        integrate_to(&mut stepper, &Decay, &mut y2, 3.0);
        assert_eq!(y1[0], y2[0]);
    }

    #[test]
    fn test_rk4_substep_close_to_analytic() {
        let mut stepper = Rk45Stepper::new(1, StepControl::default());
        let y = [1.0];
        let mut out = [0.0];
        stepper.rk4_step(&Decay, 0.0, &y, 0.01, &mut out);
        assert!((out[0] - (-0.01_f64).exp()).abs() < 1e-10);
    }
}
