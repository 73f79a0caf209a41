//! Error types for the coordination client crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for client construction and cluster configuration
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A client could not be constructed for a target
    ///
    /// Raised when the target cannot be resolved to an endpoint or the
    /// channel to it cannot be established. Never cached: a later request
    /// for the same target attempts construction again.
    #[error("Failed to connect to {target}: {message}")]
    #[diagnostic(
        code(coordination::connection),
        help("Check that the task is running and that the cluster file lists its endpoint")
    )]
    Connection {
        /// Target address the connection was requested for
        target: String,
        /// Transport-level reason for the failure
        message: String,
    },

    /// A target address was empty or otherwise unusable as a key
    #[error("Invalid target address '{target}': {reason}")]
    #[diagnostic(code(coordination::invalid_target))]
    InvalidTarget {
        /// The rejected address
        target: String,
        /// Why it was rejected
        reason: String,
    },

    /// Cluster configuration could not be parsed or failed validation
    #[error("Cluster configuration error: {message}")]
    #[diagnostic(code(coordination::configuration))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// I/O error while reading configuration
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(coordination::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read")
        operation: String,
    },
}

impl Error {
    /// Create a connection error for a target
    #[must_use]
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create an invalid target error
    #[must_use]
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Whether this error came from client construction
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result type for coordination client operations
pub type Result<T> = std::result::Result<T, Error>;
