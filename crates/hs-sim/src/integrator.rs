//! Runge-Kutta-Fehlberg 4(5) integrator.
//!
//! Each sub-step evaluates six stages and forms both a 4th- and a 5th-order
//! solution. Their difference estimates the local error, which is compared
//! per component against `abstol[i] + reltol * |x_i|`. The 5th-order solution
//! is propagated.

use nalgebra::DVector;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;

const C: [f64; 6] = [0.0, 0.25, 3.0 / 8.0, 12.0 / 13.0, 1.0, 0.5];

const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [0.25, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 32.0, 9.0 / 32.0, 0.0, 0.0, 0.0],
    [1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0, 0.0, 0.0],
    [439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0, 0.0],
    [-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
];

const B4: [f64; 6] = [
    25.0 / 216.0,
    0.0,
    1408.0 / 2565.0,
    2197.0 / 4104.0,
    -0.2,
    0.0,
];

const B5: [f64; 6] = [
    16.0 / 135.0,
    0.0,
    6656.0 / 12825.0,
    28561.0 / 56430.0,
    -9.0 / 50.0,
    2.0 / 55.0,
];

// PI step-size controller.
const SAFETY: f64 = 0.9;
const ALPHA: f64 = 0.7 / 5.0;
const BETA: f64 = 0.4 / 5.0;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
/// Floor on the error ratio so a perfect step does not yield an infinite factor.
const ERR_FLOOR: f64 = 1e-10;

/// Counters accumulated over the integrator's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntegratorStats {
    pub accepted: u64,
    pub rejected: u64,
    /// Sub-steps accepted at `step_min` despite exceeding tolerance.
    pub forced_accepts: u64,
    pub rhs_evals: u64,
}

/// Result of an adaptive advance.
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveStep {
    pub x: DVector<f64>,
    /// Step size to start the next call with.
    pub step: f64,
}

#[derive(Clone, Debug)]
pub struct Rkf45 {
    abstol: DVector<f64>,
    reltol: f64,
    prev_err: f64,
    stats: IntegratorStats,
}

impl Rkf45 {
    pub fn new(abstol: DVector<f64>, reltol: f64) -> SimResult<Self> {
        if abstol.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(SimError::InvalidArg {
                what: "absolute tolerances must be positive",
            });
        }
        if !reltol.is_finite() || reltol < 0.0 {
            return Err(SimError::InvalidArg {
                what: "relative tolerance must be non-negative",
            });
        }
        Ok(Self {
            abstol,
            reltol,
            prev_err: 1.0,
            stats: IntegratorStats::default(),
        })
    }

    /// Same absolute tolerance for each of `n` states.
    pub fn uniform(n: usize, abstol: f64, reltol: f64) -> SimResult<Self> {
        Self::new(DVector::from_element(n, abstol), reltol)
    }

    pub fn stats(&self) -> IntegratorStats {
        self.stats
    }

    /// Advance by exactly `total_dt` in `ceil(total_dt / step)` equal
    /// sub-steps, without error control.
    pub fn step_fixed<M: TransientModel>(
        &mut self,
        model: &mut M,
        t0: f64,
        x0: &DVector<f64>,
        total_dt: f64,
        step: f64,
    ) -> SimResult<DVector<f64>> {
        self.check_call(model, x0, total_dt)?;
        if !step.is_finite() || step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "step size must be positive",
            });
        }
        if total_dt == 0.0 {
            return Ok(x0.clone());
        }
        let n = (total_dt / step).ceil().max(1.0) as usize;
        let h = total_dt / n as f64;
        let mut x = x0.clone();
        for k in 0..n {
            let (x5, _) = self.trial(model, t0 + k as f64 * h, &x, h)?;
            if x5.iter().any(|v| !v.is_finite()) {
                return Err(SimError::NonPhysical {
                    what: "state became non-finite",
                });
            }
            x = x5;
            self.stats.accepted += 1;
        }
        Ok(x)
    }

    /// Advance by exactly `total_dt` with local error control.
    ///
    /// Starts from `step` (the value returned by the previous call) and
    /// shrinks on rejection. A sub-step that still fails at `step_min` is
    /// accepted anyway and counted in [`IntegratorStats::forced_accepts`].
    pub fn step_adaptive<M: TransientModel>(
        &mut self,
        model: &mut M,
        t0: f64,
        x0: &DVector<f64>,
        total_dt: f64,
        step: f64,
        step_min: f64,
    ) -> SimResult<AdaptiveStep> {
        self.check_call(model, x0, total_dt)?;
        if !step_min.is_finite() || step_min <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "minimum step must be positive",
            });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "step size must be positive",
            });
        }
        let mut h = step.max(step_min);
        if total_dt == 0.0 {
            return Ok(AdaptiveStep {
                x: x0.clone(),
                step: h,
            });
        }

        let t_end = t0 + total_dt;
        let mut t = t0;
        let mut x = x0.clone();
        loop {
            let remaining = t_end - t;
            if remaining <= 1e-12 * t_end.abs().max(1.0) {
                break;
            }
            let truncated = h >= remaining;
            let h_try = if truncated { remaining } else { h };

            let (x5, err) = self.trial(model, t, &x, h_try)?;
            let finite = err.is_finite() && x5.iter().all(|v| v.is_finite());

            if finite && err <= 1.0 {
                let factor = (SAFETY
                    * err.max(ERR_FLOOR).powf(-ALPHA)
                    * self.prev_err.powf(BETA))
                .clamp(MIN_FACTOR, MAX_FACTOR);
                self.prev_err = err.max(ERR_FLOOR);
                let proposed = (h_try * factor).max(step_min);
                // A shortened final sub-step says little about the step the
                // dynamics allow; only let it grow the nominal size.
                h = if truncated { h.max(proposed) } else { proposed };
                t += h_try;
                x = x5;
                self.stats.accepted += 1;
            } else if h_try <= step_min {
                if !finite {
                    return Err(SimError::NonPhysical {
                        what: "state became non-finite at minimum step",
                    });
                }
                self.stats.forced_accepts += 1;
                warn!(
                    t_s = t,
                    step = h_try,
                    err_ratio = err,
                    "tolerance not met at minimum step; accepting"
                );
                t += h_try;
                x = x5;
            } else {
                self.stats.rejected += 1;
                let factor = if finite {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                h = (h_try * factor).max(step_min);
                debug!(t_s = t, step = h, err_ratio = err, "step rejected");
            }
        }
        Ok(AdaptiveStep { x, step: h })
    }

    fn check_call<M: TransientModel>(
        &self,
        model: &M,
        x0: &DVector<f64>,
        total_dt: f64,
    ) -> SimResult<()> {
        if x0.len() != model.dim() || x0.len() != self.abstol.len() {
            return Err(SimError::InvalidArg {
                what: "state, model and tolerance sizes differ",
            });
        }
        if !total_dt.is_finite() || total_dt < 0.0 {
            return Err(SimError::InvalidArg {
                what: "integration interval must be non-negative",
            });
        }
        Ok(())
    }

    /// One embedded step of size `h`: returns the 5th-order solution and the
    /// max-norm error ratio (<= 1 means within tolerance).
    fn trial<M: TransientModel>(
        &mut self,
        model: &mut M,
        t: f64,
        x: &DVector<f64>,
        h: f64,
    ) -> SimResult<(DVector<f64>, f64)> {
        let mut k: Vec<DVector<f64>> = Vec::with_capacity(6);
        for stage in 0..6 {
            let mut xs = x.clone();
            for (j, kj) in k.iter().enumerate() {
                let a = A[stage][j];
                if a != 0.0 {
                    xs.axpy(h * a, kj, 1.0);
                }
            }
            k.push(model.rhs(t + C[stage] * h, &xs)?);
        }
        self.stats.rhs_evals += 6;

        let mut x5 = x.clone();
        let mut diff = DVector::zeros(x.len());
        for (s, ks) in k.iter().enumerate() {
            if B5[s] != 0.0 {
                x5.axpy(h * B5[s], ks, 1.0);
            }
            let db = B5[s] - B4[s];
            if db != 0.0 {
                diff.axpy(h * db, ks, 1.0);
            }
        }

        let mut err: f64 = 0.0;
        for i in 0..x.len() {
            let scale = self.abstol[i] + self.reltol * x[i].abs();
            err = err.max(diff[i].abs() / scale);
        }
        Ok((x5, err))
    }
}
