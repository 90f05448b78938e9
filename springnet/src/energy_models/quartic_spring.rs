//! Spring with an explicit rest length.

use super::{displacement, write_pair_hessian, NUM_SPRING_UNKNOWNS};
use crate::energy::{check_hessian_shape, ParametricEnergy};
use crate::{check_size, Error};
use na::{DMatrix, Matrix2};

/// A spring penalizing the deviation of its squared length from the squared rest length:
///
/// `f(x) = 0.5 * k * (d^2 - l^2)^2`
///
/// where `d^2 = (x0 - x1)^2 + (y0 - y1)^2`. Coefficients are `[k, l]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct QuarticLengthSpring;

impl QuarticLengthSpring {
    /// Returns the endpoint difference along with the squared length deviation `d^2 - l^2`.
    #[inline]
    fn strain(x: &[f64], rest_length: f64) -> (f64, f64, f64) {
        let (dx, dy) = displacement(x);
        (dx, dy, dx * dx + dy * dy - rest_length * rest_length)
    }
}

impl ParametricEnergy for QuarticLengthSpring {
    fn num_unknowns(&self) -> usize {
        NUM_SPRING_UNKNOWNS
    }

    fn num_coefficients(&self) -> usize {
        2
    }

    fn energy(&self, x: &[f64], coeffs: &[f64]) -> Result<f64, Error> {
        self.check_args(x, coeffs)?;
        let (_, _, diff) = Self::strain(x, coeffs[1]);
        Ok(0.5 * coeffs[0] * diff * diff)
    }

    fn energy_gradient(&self, x: &[f64], coeffs: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        self.check_args(x, coeffs)?;
        check_size("local gradient", NUM_SPRING_UNKNOWNS, grad.len())?;
        let (dx, dy, diff) = Self::strain(x, coeffs[1]);
        let factor = 2.0 * coeffs[0] * diff;
        grad[0] = factor * dx;
        grad[1] = factor * dy;
        grad[2] = -factor * dx;
        grad[3] = -factor * dy;
        Ok(())
    }

    fn energy_hessian(
        &self,
        x: &[f64],
        coeffs: &[f64],
        hess: &mut DMatrix<f64>,
    ) -> Result<(), Error> {
        self.check_args(x, coeffs)?;
        check_hessian_shape(NUM_SPRING_UNKNOWNS, hess)?;
        let (dx, dy, diff) = Self::strain(x, coeffs[1]);
        let two_k = 2.0 * coeffs[0];
        // Includes the mixed x-y terms coming from differentiating diff * dx by y.
        let block = Matrix2::new(
            2.0 * dx * dx + diff,
            2.0 * dx * dy,
            2.0 * dx * dy,
            2.0 * dy * dy + diff,
        ) * two_k;
        write_pair_hessian(&block, hess);
        Ok(())
    }
}
