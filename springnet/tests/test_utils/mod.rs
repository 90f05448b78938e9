pub use springnet::test_utils::*;
use springnet::{ParametricEnergy, SpringNetwork};

pub fn init_logger() {
    let _ = env_logger::Builder::from_env("SPRINGNET_LOG")
        .is_test(true)
        .try_init();
}

/// Build a grid network where every spring uses the network's default coefficients.
#[allow(dead_code)]
pub fn add_grid_springs<M: ParametricEnergy + ?Sized>(
    network: &mut SpringNetwork<M>,
    rows: usize,
    cols: usize,
) {
    for [a, b] in grid_springs(rows, cols) {
        network.add_default_spring(a, b);
    }
}
