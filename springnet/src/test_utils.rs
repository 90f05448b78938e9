use crate::energy::EnergyFunction;
use approx::*;
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};

/// Step used for central differences.
const STEP: f64 = 1e-5;

/// Generate `count` random configurations of `n` unknowns with coordinates in `[-1, 1)`.
///
/// The generator is seeded so tests are reproducible.
pub fn random_configurations(n: usize, count: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(3);
    let range = Uniform::new(-1.0, 1.0);
    (0..count)
        .map(|_| (0..n).map(|_| rng.sample(range)).collect())
        .collect()
}

/// Perturb `x[i]` by `+h` and `-h`, calling `f` with each perturbed configuration.
fn central_difference<F, R>(x: &[f64], i: usize, mut f: F) -> (R, R)
where
    F: FnMut(&[f64]) -> R,
{
    let mut x = x.to_vec();
    let xi = x[i];
    x[i] = xi + STEP;
    let forward = f(&x);
    x[i] = xi - STEP;
    let backward = f(&x);
    (forward, backward)
}

/// Check the energy gradient against central differences of the energy.
pub fn gradient_tester<E>(energy: &E, configurations: &[Vec<f64>])
where
    E: EnergyFunction + ?Sized,
{
    for x in configurations.iter() {
        let grad = energy.gradient(x).unwrap();
        for i in 0..x.len() {
            let (f1, f0) = central_difference(x, i, |x| energy.energy(x).unwrap());
            assert_relative_eq!(
                grad[i],
                (f1 - f0) / (2.0 * STEP),
                max_relative = 1e-6,
                epsilon = 1e-5
            );
        }
    }
}

/// Check the energy Hessian against central differences of the energy gradient.
pub fn hessian_tester<E>(energy: &E, configurations: &[Vec<f64>])
where
    E: EnergyFunction + ?Sized,
{
    for x in configurations.iter() {
        let hess = energy.hessian(x).unwrap();
        assert_relative_eq!(hess, hess.transpose());
        for j in 0..x.len() {
            let (g1, g0) = central_difference(x, j, |x| energy.gradient(x).unwrap());
            for i in 0..x.len() {
                assert_relative_eq!(
                    hess[(i, j)],
                    (g1[i] - g0[i]) / (2.0 * STEP),
                    max_relative = 1e-6,
                    epsilon = 1e-5
                );
            }
        }
    }
}

/// Node pairs of a structured grid of `rows x cols` nodes, where node `(r, c)` has index
/// `r * cols + c`. Each cell is connected along its edges and one diagonal.
pub fn grid_springs(rows: usize, cols: usize) -> Vec<[usize; 2]> {
    let idx = |r: usize, c: usize| r * cols + c;
    let mut springs = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                springs.push([idx(r, c), idx(r, c + 1)]);
            }
            if r + 1 < rows {
                springs.push([idx(r, c), idx(r + 1, c)]);
                if c + 1 < cols {
                    springs.push([idx(r, c), idx(r + 1, c + 1)]);
                }
            }
        }
    }
    springs
}

/// Positions of a `rows x cols` grid of nodes with the given spacing, flattened into a
/// configuration vector.
pub fn grid_positions(rows: usize, cols: usize, spacing: f64) -> Vec<f64> {
    (0..rows)
        .flat_map(|r| (0..cols).flat_map(move |c| [c as f64 * spacing, r as f64 * spacing]))
        .collect()
}
