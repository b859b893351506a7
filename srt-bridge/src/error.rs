//! Translator failures

use std::os::raw::c_int;
use thiserror::Error;

/// Status returned to the managed caller when an input cannot be translated
///
/// Distinct from libsrt's own `SRT_ERROR` (-1). SRT's last-error state is
/// left untouched.
pub const INVALID_ARGUMENT: c_int = -libc::EINVAL;

/// A managed value that has no native counterpart
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Unknown {kind} constant '{name}'")]
    UnknownConstant { kind: &'static str, name: String },

    #[error("Unsupported option value type: {0}")]
    UnsupportedValue(String),

    #[error("Cannot resolve {host}:{port}")]
    Unresolvable { host: String, port: u16 },

    #[error("Port {0} out of range")]
    InvalidPort(i32),

    #[error("Local and remote address families differ")]
    FamilyMismatch,

    #[error("Path contains an interior NUL byte")]
    InteriorNul,

    #[error("Negative buffer length {0}")]
    NegativeLength(i32),
}

impl TranslateError {
    /// Negative status handed back in place of an SRT result
    pub fn status(&self) -> c_int {
        INVALID_ARGUMENT
    }
}
