//! Spring energy models evaluated on the local coordinates `[x0, y0, x1, y1]` of the two
//! endpoints of a single spring.

mod linear_spring;
mod quartic_spring;

pub use linear_spring::*;
pub use quartic_spring::*;

use crate::energy::ParametricEnergy;
use crate::Error;
use na::{DMatrix, Matrix2};
use serde::{Deserialize, Serialize};

/// Number of local unknowns of a pairwise spring element in 2D.
pub const NUM_SPRING_UNKNOWNS: usize = 4;

/// Endpoint difference `(x0 - x1, y0 - y1)` of a spring.
#[inline]
pub(crate) fn displacement(x: &[f64]) -> (f64, f64) {
    (x[0] - x[2], x[1] - x[3])
}

/// Write the Hessian of a pairwise energy depending only on the endpoint difference.
///
/// Given the symmetric 2x2 second derivative `block` with respect to the difference, the local
/// Hessian is `[[block, -block], [-block, block]]`.
#[inline]
pub(crate) fn write_pair_hessian(block: &Matrix2<f64>, hess: &mut DMatrix<f64>) {
    for row in 0..2 {
        for col in 0..2 {
            let h = block[(row, col)];
            hess[(row, col)] = h;
            hess[(row + 2, col + 2)] = h;
            hess[(row, col + 2)] = -h;
            hess[(row + 2, col)] = -h;
        }
    }
}

/// Spring model selected at runtime, for instance from a configuration file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpringModel {
    /// Zero rest length spring with coefficients `[k]`.
    Linear,
    /// Quartic spring penalizing deviation from a rest length, with coefficients `[k, l]`.
    QuarticLength,
}

impl Default for SpringModel {
    fn default() -> Self {
        SpringModel::Linear
    }
}

impl ParametricEnergy for SpringModel {
    fn num_unknowns(&self) -> usize {
        NUM_SPRING_UNKNOWNS
    }
    fn num_coefficients(&self) -> usize {
        match self {
            SpringModel::Linear => LinearSpring.num_coefficients(),
            SpringModel::QuarticLength => QuarticLengthSpring.num_coefficients(),
        }
    }
    fn energy(&self, x: &[f64], coeffs: &[f64]) -> Result<f64, Error> {
        match self {
            SpringModel::Linear => LinearSpring.energy(x, coeffs),
            SpringModel::QuarticLength => QuarticLengthSpring.energy(x, coeffs),
        }
    }
    fn energy_gradient(&self, x: &[f64], coeffs: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        match self {
            SpringModel::Linear => LinearSpring.energy_gradient(x, coeffs, grad),
            SpringModel::QuarticLength => QuarticLengthSpring.energy_gradient(x, coeffs, grad),
        }
    }
    fn energy_hessian(
        &self,
        x: &[f64],
        coeffs: &[f64],
        hess: &mut DMatrix<f64>,
    ) -> Result<(), Error> {
        match self {
            SpringModel::Linear => LinearSpring.energy_hessian(x, coeffs, hess),
            SpringModel::QuarticLength => QuarticLengthSpring.energy_hessian(x, coeffs, hess),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::{ElementEnergy, EnergyFunction};
    use crate::test_utils::*;
    use approx::*;

    #[test]
    fn dispatch_matches_concrete_models() {
        let x = [0.3, -0.2, 1.1, 0.7];
        let linear = ElementEnergy::new(&LinearSpring, [2.5]).unwrap();
        let linear_dyn = ElementEnergy::new(&SpringModel::Linear, [2.5]).unwrap();
        assert_relative_eq!(linear.energy(&x).unwrap(), linear_dyn.energy(&x).unwrap());
        assert_eq!(linear.hessian(&x).unwrap(), linear_dyn.hessian(&x).unwrap());

        let quartic = ElementEnergy::new(&QuarticLengthSpring, [2.5, 0.8]).unwrap();
        let quartic_dyn = ElementEnergy::new(&SpringModel::QuarticLength, [2.5, 0.8]).unwrap();
        assert_relative_eq!(quartic.energy(&x).unwrap(), quartic_dyn.energy(&x).unwrap());
        assert_eq!(
            quartic.gradient(&x).unwrap(),
            quartic_dyn.gradient(&x).unwrap()
        );
    }

    #[test]
    fn dispatch_derivatives() {
        let configs = random_configurations(NUM_SPRING_UNKNOWNS, 5);
        for model in [SpringModel::Linear, SpringModel::QuarticLength] {
            let coeffs = &[3.0, 1.5][..model.num_coefficients()];
            let element = ElementEnergy::new(&model, coeffs).unwrap();
            gradient_tester(&element, &configs);
            hessian_tester(&element, &configs);
        }
    }

    #[test]
    fn pair_hessian_blocks() {
        let block = Matrix2::new(1.0, 2.0, 2.0, 3.0);
        let mut hess = DMatrix::zeros(4, 4);
        write_pair_hessian(&block, &mut hess);
        let expected = DMatrix::from_row_slice(
            4,
            4,
            &[
                1.0, 2.0, -1.0, -2.0, //
                2.0, 3.0, -2.0, -3.0, //
                -1.0, -2.0, 1.0, 2.0, //
                -2.0, -3.0, 2.0, 3.0,
            ],
        );
        assert_eq!(hess, expected);
    }
}
