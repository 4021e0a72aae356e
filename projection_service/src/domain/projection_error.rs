use common::helper::error_chain_fmt;

/// Failures of the projection and scoring engine.
///
/// The engine never returns partial results: the first invalid input stops the computation.
#[derive(thiserror::Error)]
pub enum ProjectionError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),
    #[error("Empty input: {0}")]
    EmptyInput(String),
    #[error("Encoder failure: {0}")]
    EncoderFailure(String),
}

impl ProjectionError {
    /// True when the error comes from the data sent by the caller,
    /// false when a dependency of the engine failed.
    pub fn is_caller_error(&self) -> bool {
        match self {
            ProjectionError::ShapeMismatch(_)
            | ProjectionError::DegenerateVector(_)
            | ProjectionError::EmptyInput(_) => true,
            ProjectionError::EncoderFailure(_) => false,
        }
    }
}

impl std::fmt::Debug for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
