use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("Surface thickness must be positive, got {0} nm")]
    InvalidThickness(f64),

    #[error("Surface tiling must be at least 1x1, got {tile_x}x{tile_y}")]
    InvalidTiling { tile_x: usize, tile_y: usize },

    #[error("Chain length must be at least 1")]
    EmptyChain,

    #[error("Unknown terminal group: '{0}'")]
    UnknownTerminalGroup(String),

    #[error("Unknown pattern type: '{0}'")]
    UnknownPattern(String),

    #[error("Requested {requested} chains but the surface only has {available} binding sites")]
    TooManyChains { requested: usize, available: usize },

    #[error("Cannot assemble '{0}': the structure contains no atoms")]
    EmptyStructure(String),

    #[error("Separation must be non-negative, got {0} nm")]
    InvalidSeparation(f64),

    #[error("Internal builder error: {0}")]
    Internal(String),
}
