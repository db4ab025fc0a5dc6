use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter specification: {0}")]
    InvalidSpec(String),

    #[error("Unsupported filter kind: {0}")]
    Unsupported(String),

    #[error("State length mismatch: filter order is {expected}, state has {actual} elements")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Filter has a pole at DC, no steady state exists for constant input")]
    NoSteadyState,

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
