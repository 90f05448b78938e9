//! Linear spring with zero rest length.

use super::{displacement, write_pair_hessian, NUM_SPRING_UNKNOWNS};
use crate::energy::{check_hessian_shape, ParametricEnergy};
use crate::{check_size, Error};
use na::{DMatrix, Matrix2};

/// A spring whose energy is quadratic in the distance between its endpoints:
///
/// `f(x) = 0.5 * k * ((x0 - x1)^2 + (y0 - y1)^2)`
///
/// Coefficients are `[k]`. Since the energy is quadratic, the Hessian is constant.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LinearSpring;

impl ParametricEnergy for LinearSpring {
    fn num_unknowns(&self) -> usize {
        NUM_SPRING_UNKNOWNS
    }

    fn num_coefficients(&self) -> usize {
        1
    }

    fn energy(&self, x: &[f64], coeffs: &[f64]) -> Result<f64, Error> {
        self.check_args(x, coeffs)?;
        let k = coeffs[0];
        let (dx, dy) = displacement(x);
        Ok(0.5 * k * (dx * dx + dy * dy))
    }

    fn energy_gradient(&self, x: &[f64], coeffs: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        self.check_args(x, coeffs)?;
        check_size("local gradient", NUM_SPRING_UNKNOWNS, grad.len())?;
        let k = coeffs[0];
        let (dx, dy) = displacement(x);
        grad[0] = k * dx;
        grad[1] = k * dy;
        grad[2] = -k * dx;
        grad[3] = -k * dy;
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
        let block = Matrix2::identity() * coeffs[0];
        write_pair_hessian(&block, hess);
        Ok(())
    }
}
