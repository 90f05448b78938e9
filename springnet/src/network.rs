//! Dense assembly of spring energies over an entire network of 2D nodes.
//!
//! Node `i` occupies the global unknowns `2i` (x coordinate) and `2i + 1` (y coordinate).

use crate::energy::{check_hessian_shape, EnergyFunction, ParametricEnergy};
use crate::energy_models::NUM_SPRING_UNKNOWNS;
use crate::io::NetworkParams;
use crate::{check_size, Error};
use na::DMatrix;
use rayon::prelude::*;

/// A spring connecting two nodes of a network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spring {
    pub nodes: [usize; 2],
    pub stiffness: f64,
    pub rest_length: f64,
}

impl Spring {
    /// Global indices of the local unknowns `[x0, y0, x1, y1]`.
    #[inline]
    pub fn dofs(&self) -> [usize; NUM_SPRING_UNKNOWNS] {
        let [a, b] = self.nodes;
        [2 * a, 2 * a + 1, 2 * b, 2 * b + 1]
    }

    /// Gather the local coordinates of this spring from the global configuration.
    #[inline]
    pub fn gather(&self, x: &[f64]) -> [f64; NUM_SPRING_UNKNOWNS] {
        self.dofs().map(|i| x[i])
    }

    /// All coefficients of this spring. Models use a prefix of this array.
    #[inline]
    pub fn coefficients(&self) -> [f64; 2] {
        [self.stiffness, self.rest_length]
    }

    /// Number of coefficients stored per spring.
    #[inline]
    pub const fn coefficients_len() -> usize {
        2
    }
}

/// A mass-spring network whose energy is the sum of the energies of all its springs.
///
/// All springs are evaluated with the same element model, which is borrowed for the lifetime of
/// the network. The gradient and Hessian are assembled by adding the local derivatives of each
/// spring into the global unknowns of its two nodes, so contributions of springs sharing a node
/// accumulate.
#[derive(Clone, Debug)]
pub struct SpringNetwork<'m, M: ?Sized> {
    model: &'m M,
    num_nodes: usize,
    springs: Vec<Spring>,
    default_stiffness: f64,
    default_rest_length: f64,
    parallel: bool,
}

impl<'m, M: ParametricEnergy + ?Sized> SpringNetwork<'m, M> {
    /// Create an empty network of `num_nodes` nodes with default parameters.
    pub fn new(model: &'m M, num_nodes: usize) -> Result<Self, Error> {
        Self::from_params(model, num_nodes, &NetworkParams::default())
    }

    /// Create an empty network of `num_nodes` nodes.
    ///
    /// The element model in `params` is not used here; the given `model` is used for all
    /// springs instead.
    pub fn from_params(
        model: &'m M,
        num_nodes: usize,
        params: &NetworkParams,
    ) -> Result<Self, Error> {
        if model.num_unknowns() != NUM_SPRING_UNKNOWNS {
            return Err(Error::InvalidArgument {
                description: format!(
                    "spring models must have {} local unknowns, got {}",
                    NUM_SPRING_UNKNOWNS,
                    model.num_unknowns()
                ),
            });
        }
        if model.num_coefficients() > Spring::coefficients_len() {
            return Err(Error::InvalidArgument {
                description: format!(
                    "spring models may use at most {} coefficients, got {}",
                    Spring::coefficients_len(),
                    model.num_coefficients()
                ),
            });
        }

        log::debug!("Created a spring network with {} nodes", num_nodes);

        Ok(SpringNetwork {
            model,
            num_nodes,
            springs: Vec::new(),
            default_stiffness: params.default_stiffness,
            default_rest_length: params.default_rest_length,
            parallel: params.parallel,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_springs(&self) -> usize {
        self.springs.len()
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Whether the `EnergyFunction` implementation assembles springs in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Add a spring between nodes `a` and `b`, returning its index.
    ///
    /// Fails with `Error::OutOfRangeIndex` if either node lies outside the network, in which case
    /// the network is left unchanged.
    pub fn try_add_spring(
        &mut self,
        a: usize,
        b: usize,
        stiffness: f64,
        rest_length: f64,
    ) -> Result<usize, Error> {
        // Strict bound on both endpoints: 2 * node < num_unknowns.
        for node in [a, b] {
            if node >= self.num_nodes {
                return Err(Error::OutOfRangeIndex {
                    node,
                    num_nodes: self.num_nodes,
                });
            }
        }

        log::debug!(
            "Adding spring ({}, {}) with k = {} and l = {}",
            a,
            b,
            stiffness,
            rest_length
        );

        self.springs.push(Spring {
            nodes: [a, b],
            stiffness,
            rest_length,
        });
        Ok(self.springs.len() - 1)
    }

    /// Add a spring between nodes `a` and `b`.
    ///
    /// Invalid springs are reported and skipped, so the network remains usable. Returns the index
    /// of the new spring if it was added.
    pub fn add_spring(
        &mut self,
        a: usize,
        b: usize,
        stiffness: f64,
        rest_length: f64,
    ) -> Option<usize> {
        match self.try_add_spring(a, b, stiffness, rest_length) {
            Ok(idx) => Some(idx),
            Err(err) => {
                log::warn!("Skipping invalid spring ({}, {}): {}", a, b, err);
                None
            }
        }
    }

    /// Add a spring between nodes `a` and `b` with the default stiffness and rest length of this
    /// network.
    pub fn add_default_spring(&mut self, a: usize, b: usize) -> Option<usize> {
        self.add_spring(a, b, self.default_stiffness, self.default_rest_length)
    }

    #[inline]
    fn spring_energy(&self, spring: &Spring, x: &[f64]) -> Result<f64, Error> {
        let coeffs = spring.coefficients();
        self.model.energy(
            &spring.gather(x),
            &coeffs[..self.model.num_coefficients()],
        )
    }

    /// Add the gradient of a single spring to the global gradient `grad`.
    #[inline]
    fn add_spring_gradient(
        &self,
        spring: &Spring,
        x: &[f64],
        local_grad: &mut [f64; NUM_SPRING_UNKNOWNS],
        grad: &mut [f64],
    ) -> Result<(), Error> {
        let coeffs = spring.coefficients();
        self.model.energy_gradient(
            &spring.gather(x),
            &coeffs[..self.model.num_coefficients()],
            local_grad,
        )?;
        for (&dof, &g) in spring.dofs().iter().zip(local_grad.iter()) {
            grad[dof] += g;
        }
        Ok(())
    }

    /// Add the Hessian of a single spring to the global Hessian `hess`.
    #[inline]
    fn add_spring_hessian(
        &self,
        spring: &Spring,
        x: &[f64],
        local_hess: &mut DMatrix<f64>,
        hess: &mut DMatrix<f64>,
    ) -> Result<(), Error> {
        let coeffs = spring.coefficients();
        self.model.energy_hessian(
            &spring.gather(x),
            &coeffs[..self.model.num_coefficients()],
            local_hess,
        )?;
        let dofs = spring.dofs();
        for (c, &col) in dofs.iter().enumerate() {
            for (r, &row) in dofs.iter().enumerate() {
                hess[(row, col)] += local_hess[(r, c)];
            }
        }
        Ok(())
    }

    fn serial_energy(&self, x: &[f64]) -> Result<f64, Error> {
        self.springs
            .iter()
            .try_fold(0.0, |acc, spring| Ok(acc + self.spring_energy(spring, x)?))
    }

    fn serial_energy_gradient(&self, x: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        grad.iter_mut().for_each(|g| *g = 0.0);
        let mut local_grad = [0.0; NUM_SPRING_UNKNOWNS];
        for spring in self.springs.iter() {
            self.add_spring_gradient(spring, x, &mut local_grad, grad)?;
        }
        Ok(())
    }

    fn serial_energy_hessian(&self, x: &[f64], hess: &mut DMatrix<f64>) -> Result<(), Error> {
        hess.fill(0.0);
        let mut local_hess = DMatrix::zeros(NUM_SPRING_UNKNOWNS, NUM_SPRING_UNKNOWNS);
        for spring in self.springs.iter() {
            self.add_spring_hessian(spring, x, &mut local_hess, hess)?;
        }
        Ok(())
    }

    fn check_input(&self, x: &[f64]) -> Result<(), Error> {
        check_size("configuration", 2 * self.num_nodes, x.len())
    }
}

impl<'m, M: ParametricEnergy + Sync + ?Sized> SpringNetwork<'m, M> {
    /// Compute the network energy, evaluating springs in parallel.
    pub fn par_energy(&self, x: &[f64]) -> Result<f64, Error> {
        self.check_input(x)?;
        self.parallel_energy(x)
    }

    /// Compute the network energy gradient, evaluating springs in parallel.
    ///
    /// Each worker accumulates into its own partial gradient and the partial gradients are summed
    /// at the end, so no two threads write to the same global entry.
    pub fn par_energy_gradient(&self, x: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        self.check_input(x)?;
        check_size("gradient", self.num_unknowns(), grad.len())?;
        self.parallel_energy_gradient(x, grad)
    }

    /// Compute the dense network energy Hessian, evaluating springs in parallel.
    ///
    /// Each worker accumulates into its own partial Hessian, which can be memory intensive for
    /// large networks.
    pub fn par_energy_hessian(&self, x: &[f64], hess: &mut DMatrix<f64>) -> Result<(), Error> {
        self.check_input(x)?;
        check_hessian_shape(self.num_unknowns(), hess)?;
        self.parallel_energy_hessian(x, hess)
    }

    fn parallel_energy(&self, x: &[f64]) -> Result<f64, Error> {
        self.springs
            .par_iter()
            .map(|spring| self.spring_energy(spring, x))
            .try_reduce(|| 0.0, |a, b| Ok(a + b))
    }

    fn parallel_energy_gradient(&self, x: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        let n = self.num_unknowns();
        let (total, _) = self
            .springs
            .par_iter()
            .try_fold(
                || (vec![0.0; n], [0.0; NUM_SPRING_UNKNOWNS]),
                |(mut partial, mut local_grad), spring| -> Result<_, Error> {
                    self.add_spring_gradient(spring, x, &mut local_grad, &mut partial)?;
                    Ok((partial, local_grad))
                },
            )
            .try_reduce(
                || (vec![0.0; n], [0.0; NUM_SPRING_UNKNOWNS]),
                |(mut a, local_grad), (b, _)| {
                    a.iter_mut().zip(b.iter()).for_each(|(a, &b)| *a += b);
                    Ok((a, local_grad))
                },
            )?;
        grad.copy_from_slice(&total);
        Ok(())
    }

    fn parallel_energy_hessian(&self, x: &[f64], hess: &mut DMatrix<f64>) -> Result<(), Error> {
        let n = self.num_unknowns();
        let zeros = || {
            (
                DMatrix::<f64>::zeros(n, n),
                DMatrix::<f64>::zeros(NUM_SPRING_UNKNOWNS, NUM_SPRING_UNKNOWNS),
            )
        };
        let (total, _) = self
            .springs
            .par_iter()
            .try_fold(
                zeros,
                |(mut partial, mut local_hess), spring| -> Result<_, Error> {
                    self.add_spring_hessian(spring, x, &mut local_hess, &mut partial)?;
                    Ok((partial, local_hess))
                },
            )
            .try_reduce(zeros, |(mut a, local_hess), (b, _)| {
                a += b;
                Ok((a, local_hess))
            })?;
        hess.copy_from(&total);
        Ok(())
    }
}

impl<M: ParametricEnergy + Sync + ?Sized> EnergyFunction for SpringNetwork<'_, M> {
    fn num_unknowns(&self) -> usize {
        2 * self.num_nodes
    }

    fn energy(&self, x: &[f64]) -> Result<f64, Error> {
        self.check_input(x)?;
        let energy = if self.parallel {
            self.parallel_energy(x)?
        } else {
            self.serial_energy(x)?
        };
        log::trace!("Spring network energy = {}", energy);
        Ok(energy)
    }

    fn energy_gradient(&self, x: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        self.check_input(x)?;
        check_size("gradient", self.num_unknowns(), grad.len())?;
        if self.parallel {
            self.parallel_energy_gradient(x, grad)
        } else {
            self.serial_energy_gradient(x, grad)
        }
    }

    fn energy_hessian(&self, x: &[f64], hess: &mut DMatrix<f64>) -> Result<(), Error> {
        self.check_input(x)?;
        check_hessian_shape(self.num_unknowns(), hess)?;
        if self.parallel {
            self.parallel_energy_hessian(x, hess)
        } else {
            self.serial_energy_hessian(x, hess)
        }
    }
}
