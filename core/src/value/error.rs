//! Error payload carried by `Value::Error`.
//!
//! Errors are plain data: a code and a message, immutable once built. They
//! travel through `trigger()` like any other value instead of through a
//! separate fault channel.

use std::fmt;

use serde::{Deserialize, Serialize};


/// Error classes understood by the tree itself. Nodes may return their own
/// codes through `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Argument rejected by the node (wrong type, malformed input).
    BadRequest,
    /// Path or key absent.
    NotFound,
    /// Node exists but does not accept this kind of call.
    MethodNotAllowed,
    /// Invariant violation, e.g. a meta-type mismatch.
    Internal,
    /// Node-defined code.
    Custom(i32),
}

impl ErrorCode {
    /// Numeric code, HTTP-like for the built-in classes.
    pub fn as_i32(&self) -> i32 {
        match self {
            ErrorCode::BadRequest => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotAllowed => 405,
            ErrorCode::Internal => 500,
            ErrorCode::Custom(code) => *code,
        }
    }

    /// Inverse of `as_i32`; unknown numbers become `Custom`.
    pub fn from_i32(code: i32) -> Self {
        match code {
            400 => ErrorCode::BadRequest,
            404 => ErrorCode::NotFound,
            405 => ErrorCode::MethodNotAllowed,
            500 => ErrorCode::Internal,
            other => ErrorCode::Custom(other),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}


/// An immutable (code, message) pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} {message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Internal, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for Error {
    fn default() -> Self {
        Error::new(ErrorCode::Internal, "")
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_puts_code_first() {
        let e = Error::not_found("/synth/freq");
        assert_eq!(e.to_string(), "404 /synth/freq");
    }

    #[test]
    fn code_numbers_round_trip() {
        for code in [
            ErrorCode::BadRequest,
            ErrorCode::NotFound,
            ErrorCode::MethodNotAllowed,
            ErrorCode::Internal,
            ErrorCode::Custom(42),
        ] {
            assert_eq!(ErrorCode::from_i32(code.as_i32()), code);
        }
    }

    #[test]
    fn custom_code_display() {
        let e = Error::new(ErrorCode::Custom(7), "busy");
        assert_eq!(e.code(), ErrorCode::Custom(7));
        assert_eq!(e.message(), "busy");
        assert_eq!(e.to_string(), "7 busy");
    }

    #[test]
    fn code_serde_is_snake_case() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
