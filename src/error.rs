//! Errors raised at the edges of the engine.
//!
//! Transform, merge, conflict and resolve functions are total over valid
//! operations and never fail. Errors only come from building an operation,
//! decoding one from its wire record, loading configuration, or splicing
//! an operation into a buffer that is too short for it.

use thiserror::Error;

/// Errors produced by the engine.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OtError {
    /// The operation violates the operation model and was rejected when built.
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// The operation reaches past the end of the buffer it was applied to.
    #[error("operation range {position}..{end} is out of bounds for buffer of length {len}")]
    OutOfBounds { position: u64, end: u64, len: u64 },

    /// An operation record was not well-formed JSON.
    #[error("malformed operation record: {0}")]
    Decode(#[source] serde_json::Error),

    /// Engine configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(#[source] serde_json::Error),
}

impl OtError {
    pub(crate) fn invalid(reason: impl Into<String>) -> OtError {
        return OtError::InvalidOperation { reason: reason.into() };
    }

    /// Check if this error was raised while building or decoding an operation.
    pub fn is_invalid_operation(&self) -> bool {
        return matches!(self, OtError::InvalidOperation { .. });
    }

    /// Check if this error was raised while applying an operation to a buffer.
    pub fn is_out_of_bounds(&self) -> bool {
        return matches!(self, OtError::OutOfBounds { .. });
    }
}

pub type Result<T> = std::result::Result<T, OtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operation_message() {
        let err = OtError::invalid("insert content is empty");
        assert!(err.is_invalid_operation());
        assert!(!err.is_out_of_bounds());
        assert_eq!(err.to_string(), "invalid operation: insert content is empty");
    }

    #[test]
    fn out_of_bounds_message() {
        let err = OtError::OutOfBounds { position: 4, end: 9, len: 6 };
        assert!(err.is_out_of_bounds());
        assert_eq!(
            err.to_string(),
            "operation range 4..9 is out of bounds for buffer of length 6"
        );
    }
}
