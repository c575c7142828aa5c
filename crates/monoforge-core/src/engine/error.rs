use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use super::job::JobError;
use crate::core::builders::error::BuildError;
use crate::core::forcefield::parameterization::ParameterizationError;
use crate::core::forcefield::params::ParamLoadError;
use crate::core::io::gro::GroError;
use crate::core::io::lammps::LammpsError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown backbone '{0}'")]
    UnknownBackbone(String),

    #[error("Unknown terminal group '{0}'")]
    UnknownTerminalGroup(String),

    #[error("Unknown pattern type '{0}'")]
    UnknownPattern(String),

    #[error("Structure assembly failed: {source}")]
    Build {
        #[from]
        source: BuildError,
    },

    #[error("Failed to load force field: {source}")]
    ParamLoad {
        #[from]
        source: ParamLoadError,
    },

    #[error("Force field application failed: {source}")]
    Parameterization {
        #[from]
        source: ParameterizationError,
    },

    #[error("Failed to write coordinates: {source}")]
    Gro {
        #[from]
        source: GroError,
    },

    #[error("Failed to write LAMMPS data: {source}")]
    Lammps {
        #[from]
        source: LammpsError,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job error: {source}")]
    Job {
        #[from]
        source: JobError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
