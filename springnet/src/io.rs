use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::energy_models::SpringModel;

#[derive(Error, Debug)]
pub enum LoadConfigError {
    #[error("IO")]
    IO(#[from] std::io::Error),
    #[error("Parse")]
    Parse(#[from] ron::error::SpannedError),
}

/// Parameters used to build a spring network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Energy model shared by all springs of the network.
    pub model: SpringModel,
    /// Stiffness given to springs added without an explicit stiffness.
    pub default_stiffness: f64,
    /// Rest length given to springs added without an explicit rest length.
    pub default_rest_length: f64,
    /// Assemble springs on multiple threads.
    pub parallel: bool,
}

impl Default for NetworkParams {
    fn default() -> Self {
        NetworkParams {
            model: SpringModel::Linear,
            default_stiffness: 1.0,
            default_rest_length: 1.0,
            parallel: false,
        }
    }
}

pub fn load_network_params(
    path: impl AsRef<Path>,
) -> std::result::Result<NetworkParams, LoadConfigError> {
    let f = File::open(path.as_ref())?;
    Ok(ron::de::from_reader(f)?)
}
