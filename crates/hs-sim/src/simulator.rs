//! Thermal network advanced in step with the scheduler clock.

use hs_thermal::ThermalNetwork;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::integrator::{IntegratorStats, Rkf45};

/// Integration settings for the thermal network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Error-controlled sub-stepping; otherwise fixed sub-steps of `step`.
    pub adaptive: bool,
    /// Initial nominal sub-step (s).
    pub step: f64,
    pub step_min: f64,
    pub abstol: f64,
    pub reltol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            adaptive: true,
            step: 1e-2,
            step_min: 1e-6,
            abstol: 1e-4,
            reltol: 1e-4,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> SimResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.step) || !positive(self.step_min) {
            return Err(SimError::InvalidArg {
                what: "solver steps must be positive",
            });
        }
        if self.step_min > self.step {
            return Err(SimError::InvalidArg {
                what: "solver step_min exceeds step",
            });
        }
        if !positive(self.abstol) || !self.reltol.is_finite() || self.reltol < 0.0 {
            return Err(SimError::InvalidArg {
                what: "solver tolerances out of range",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ThermalSimulator {
    network: ThermalNetwork,
    integrator: Rkf45,
    options: SolverOptions,
    nominal_step: f64,
    t_last: f64,
}

impl ThermalSimulator {
    pub fn new(network: ThermalNetwork, options: SolverOptions, t0: f64) -> SimResult<Self> {
        options.validate()?;
        let integrator = Rkf45::uniform(network.len(), options.abstol, options.reltol)?;
        Ok(Self {
            network,
            integrator,
            nominal_step: options.step,
            options,
            t_last: hs_core::ensure_finite(t0, "start time")?,
        })
    }

    pub fn network(&self) -> &ThermalNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut ThermalNetwork {
        &mut self.network
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn stats(&self) -> IntegratorStats {
        self.integrator.stats()
    }

    pub fn t_last(&self) -> f64 {
        self.t_last
    }

    /// Sub-step size the next integration starts from.
    pub fn nominal_step(&self) -> f64 {
        self.nominal_step
    }

    /// Integrate from the last synchronised time to `now`, then refresh the
    /// network's probes at the new state. Calling with the same time again
    /// does nothing.
    pub fn advance_to(&mut self, now: f64) -> SimResult<()> {
        if !now.is_finite() {
            return Err(SimError::InvalidArg {
                what: "simulation time must be finite",
            });
        }
        if now < self.t_last {
            return Err(SimError::TimeReversed {
                from_s: self.t_last,
                to_s: now,
            });
        }
        if now == self.t_last {
            return Ok(());
        }

        let dt = now - self.t_last;
        let x0 = self.network.state().clone();
        let x = if self.options.adaptive {
            let out = self.integrator.step_adaptive(
                &mut self.network,
                self.t_last,
                &x0,
                dt,
                self.nominal_step,
                self.options.step_min,
            )?;
            if out.step != self.nominal_step {
                debug!(from = self.nominal_step, to = out.step, "nominal step adapted");
            }
            self.nominal_step = out.step;
            out.x
        } else {
            self.integrator
                .step_fixed(&mut self.network, self.t_last, &x0, dt, self.options.step)?
        };
        self.network.set_state(x)?;
        self.t_last = now;
        Ok(())
    }
}
