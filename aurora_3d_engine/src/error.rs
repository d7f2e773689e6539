//! Error types for the Aurora3D engine
//!
//! This module defines the error types used throughout the engine. The
//! taxonomy is deliberately small: configuration mistakes and bad indices
//! are caller defects that surface immediately, backend errors carry the
//! backend's message, and capacity adaptation (clamping a requested target
//! count to the device limit) is not an error at all.

use std::fmt;

/// Result type for Aurora3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid construction parameters (bad attachment-kind combination,
    /// zero dimensions, ...). Fail-fast — never retried.
    InvalidConfiguration(String),

    /// Color attachment index outside `[0, max_target_index]`
    IndexOutOfRange {
        /// The index that was requested
        index: u32,
        /// The highest valid index
        max: u32,
    },

    /// Invalid resource (missing attachment, use after dispose, ...)
    InvalidResource(String),

    /// Backend-specific error
    BackendError(String),

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::IndexOutOfRange { index, max } => {
                write!(f, "Attachment index {} is out of range (max {})", index, max)
            }
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR and return `Err(Error::BackendError(..))` from the enclosing
/// function.
///
/// # Example
///
/// ```ignore
/// engine_bail!("aurora3d::RenderTarget", "framebuffer {:?} not found", id);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        return Err($crate::aurora3d::Error::BackendError(message));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
