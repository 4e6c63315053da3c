//! TransientModel trait for systems advanced by the integrator.

use nalgebra::DVector;

use crate::error::SimResult;

/// A system of first-order ODEs `dx/dt = f(t, x)` over a flat state vector.
pub trait TransientModel {
    /// Number of states.
    fn dim(&self) -> usize;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Takes `&mut self` so models can cache intermediate results.
    fn rhs(&mut self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>>;
}

impl TransientModel for hs_thermal::ThermalNetwork {
    fn dim(&self) -> usize {
        self.len()
    }

    fn rhs(&mut self, _t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok(self.derivatives(x)?)
    }
}
