/*!
 * Energy interfaces for quantities with first and second order derivatives. Implementing
 * `EnergyFunction` allows the quantity to be handed to an external optimization solver, which
 * repeatedly evaluates the energy, its gradient and its Hessian at trial configurations.
 *
 * Element models implement `ParametricEnergy` instead: they are evaluated on a small local
 * coordinate vector together with per-element coefficients (e.g. stiffness and rest length).
 * `ElementEnergy` binds a model to a fixed set of coefficients, which turns a single element
 * into an `EnergyFunction` just like an entire assembled network.
 */

use crate::{check_size, Error};
use na::{DMatrix, DVector};

/// An energy over a fixed number of unknowns.
///
/// All evaluation functions fail with `Error::DimensionMismatch` if the given buffers are not
/// sized according to `num_unknowns`. Inputs are never padded or truncated.
pub trait EnergyFunction {
    /// Number of degrees of freedom this energy depends on.
    fn num_unknowns(&self) -> usize;

    /// Compute the energy of the configuration `x`.
    fn energy(&self, x: &[f64]) -> Result<f64, Error>;

    /// Compute the energy gradient at `x` and write it to `grad`.
    ///
    /// The previous contents of `grad` are overwritten.
    fn energy_gradient(&self, x: &[f64], grad: &mut [f64]) -> Result<(), Error>;

    /// Compute the dense energy Hessian at `x` and write it to `hess`, which must be a square
    /// matrix with `num_unknowns` rows.
    ///
    /// The previous contents of `hess` are overwritten.
    fn energy_hessian(&self, x: &[f64], hess: &mut DMatrix<f64>) -> Result<(), Error>;

    /*
     * Below are convenience functions that allocate their output.
     */

    /// Compute the energy gradient at `x` into a newly allocated vector.
    fn gradient(&self, x: &[f64]) -> Result<DVector<f64>, Error> {
        let mut grad = DVector::zeros(self.num_unknowns());
        self.energy_gradient(x, grad.as_mut_slice())?;
        Ok(grad)
    }

    /// Compute the energy Hessian at `x` into a newly allocated matrix.
    fn hessian(&self, x: &[f64]) -> Result<DMatrix<f64>, Error> {
        let n = self.num_unknowns();
        let mut hess = DMatrix::zeros(n, n);
        self.energy_hessian(x, &mut hess)?;
        Ok(hess)
    }
}

/// Energy of a single element parameterized by a coefficient vector.
///
/// Models are stateless: the same instance is shared by all elements of a network, and each
/// element supplies its own coefficients at evaluation time. The order of coefficients is
/// defined by the model.
pub trait ParametricEnergy {
    /// Size of the local coordinate vector.
    fn num_unknowns(&self) -> usize;

    /// Number of coefficients expected by this model.
    fn num_coefficients(&self) -> usize;

    /// Compute the element energy at local coordinates `x`.
    fn energy(&self, x: &[f64], coeffs: &[f64]) -> Result<f64, Error>;

    /// Compute the element energy gradient at `x` and write it to `grad`.
    fn energy_gradient(&self, x: &[f64], coeffs: &[f64], grad: &mut [f64]) -> Result<(), Error>;

    /// Compute the element energy Hessian at `x` and write it to the square matrix `hess`.
    fn energy_hessian(
        &self,
        x: &[f64],
        coeffs: &[f64],
        hess: &mut DMatrix<f64>,
    ) -> Result<(), Error>;

    /// Validate the local coordinates and coefficients passed to this model.
    fn check_args(&self, x: &[f64], coeffs: &[f64]) -> Result<(), Error> {
        if coeffs.len() != self.num_coefficients() {
            return Err(Error::InvalidArgument {
                description: format!(
                    "expected {} coefficients, got {}",
                    self.num_coefficients(),
                    coeffs.len()
                ),
            });
        }
        check_size("local coordinates", self.num_unknowns(), x.len())
    }
}

/// Check that `hess` is a square matrix of size `n`.
pub(crate) fn check_hessian_shape(n: usize, hess: &DMatrix<f64>) -> Result<(), Error> {
    check_size("hessian rows", n, hess.nrows())?;
    check_size("hessian columns", n, hess.ncols())
}

/// A single element model bound to its coefficients.
#[derive(Clone, Debug)]
pub struct ElementEnergy<'a, M: ?Sized> {
    model: &'a M,
    coeffs: Vec<f64>,
}

impl<'a, M: ParametricEnergy + ?Sized> ElementEnergy<'a, M> {
    /// Bind `coeffs` to the given model.
    ///
    /// Fails with `Error::InvalidArgument` if the number of coefficients doesn't match what the
    /// model expects.
    pub fn new(model: &'a M, coeffs: impl Into<Vec<f64>>) -> Result<Self, Error> {
        let coeffs = coeffs.into();
        if coeffs.len() != model.num_coefficients() {
            return Err(Error::InvalidArgument {
                description: format!(
                    "expected {} coefficients, got {}",
                    model.num_coefficients(),
                    coeffs.len()
                ),
            });
        }
        Ok(ElementEnergy { model, coeffs })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }
}

impl<M: ParametricEnergy + ?Sized> EnergyFunction for ElementEnergy<'_, M> {
    fn num_unknowns(&self) -> usize {
        self.model.num_unknowns()
    }
    fn energy(&self, x: &[f64]) -> Result<f64, Error> {
        self.model.energy(x, &self.coeffs)
    }
    fn energy_gradient(&self, x: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        self.model.energy_gradient(x, &self.coeffs, grad)
    }
    fn energy_hessian(&self, x: &[f64], hess: &mut DMatrix<f64>) -> Result<(), Error> {
        self.model.energy_hessian(x, &self.coeffs, hess)
    }
}
