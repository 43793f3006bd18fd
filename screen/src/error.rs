//! Error type shared by the decoding core.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenError {
    /// Decoder variant or signal description that cannot be decoded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two operands that must agree in length do not.
    #[error("Dimension mismatch: {left} elements vs {right} elements")]
    Dimension { left: usize, right: usize },

    /// Computation that would produce non-finite values.
    #[error("Numeric error: {0}")]
    Numeric(String),
}

pub type Result<T> = std::result::Result<T, ScreenError>;
