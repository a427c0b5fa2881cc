// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use thiserror::Error;

/// Error type for carbon estimation. Every variant except
/// [`CarbonError::EmptyAssembly`] stems from input data (coefficient tables,
/// architecture files, configuration) rather than from the model itself.
#[derive(Debug, Error)]
pub enum CarbonError {
    /// A tabulated coefficient (process node, actuation type, DRAM type, or
    /// scaling factor) is absent from its table.
    #[error("no entry '{key}' in coefficient table {table}")]
    MissingCoefficient { table: &'static str, key: String },

    /// Only 95% and 99% GHG abatement tables exist.
    #[error("unsupported GHG abatement percentage {0}; expected 95 or 99")]
    UnsupportedAbatement(u32),

    /// Packaging carbon was requested for an assembly with no chiplets that
    /// sit on the shared substrate.
    #[error("packaging technology {0} requires at least one non-DRAM chiplet")]
    EmptyAssembly(String),

    /// The architecture description is well-formed JSON but describes an
    /// impossible chip.
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CarbonError>;

pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CarbonError::Io {
        path: path.to_path_buf(),
        source,
    })
}
