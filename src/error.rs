use thiserror::Error;

/// Everything that can go wrong while building, training or evaluating a network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DnnError {
    /// A feature or target vector does not fit the network's topography.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid topography: {0}")]
    InvalidTopography(String),

    /// No output activation is defined for the requested mode.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// A caller-supplied argument is out of range, e.g. a sample fraction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Opaque failure raised by the parallel execution backend. Never retried.
    #[error("distributed execution failed: {0}")]
    DistributedExecutionFailure(String),

    #[error("dataset is empty")]
    EmptyDataset,
}

pub type Result<T> = std::result::Result<T, DnnError>;

/// Fails with `DimensionMismatch` unless `actual == expected`.
pub(crate) fn check_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DnnError::DimensionMismatch { context, expected, actual })
    }
}
