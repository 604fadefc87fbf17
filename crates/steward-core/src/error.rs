//! Error types shared across Steward crates.

use thiserror::Error;

/// Errors produced when constructing or parsing a [`Principal`](crate::Principal).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// The input was not valid hex.
    #[error("invalid principal hex: {0}")]
    InvalidHex(String),

    /// The input decoded to the wrong number of bytes.
    #[error("invalid principal length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Byte length that was supplied.
        actual: usize,
    },
}

/// Result type for principal parsing.
pub type PrincipalResult<T> = Result<T, PrincipalError>;
