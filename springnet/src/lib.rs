mod energy;
pub mod energy_models;
pub mod io;
pub mod network;

// Finite difference testers shared by the unit tests and the integration tests in `tests/`.
pub mod test_utils;

pub use self::energy::*;
pub use self::energy_models::{LinearSpring, QuarticLengthSpring, SpringModel};
pub use self::io::{load_network_params, LoadConfigError, NetworkParams};
pub use self::network::{Spring, SpringNetwork};

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("Invalid argument: {description}")]
    InvalidArgument { description: String },
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Node index {node} is out of range for a network of {num_nodes} nodes")]
    OutOfRangeIndex { node: usize, num_nodes: usize },
}

/// Check that a buffer has the size expected by an energy.
#[inline]
pub(crate) fn check_size(what: &'static str, expected: usize, actual: usize) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
