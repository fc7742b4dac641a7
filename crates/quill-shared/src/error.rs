use thiserror::Error;

/// Errors produced by the pure domain layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuillError {
    /// A caller handed in a numeric input no normalization can repair,
    /// e.g. a negative total count.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
