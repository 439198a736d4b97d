//! Error types for lbtopo.
//!
//! This module defines the error types used throughout lbtopo. The split
//! that matters is between an expected absence ([`Error::NotFound`], the
//! normal outcome of probing for a resource that was never created) and
//! everything else, which represents a real failure of the workflow or of
//! the remote management service.

use thiserror::Error;

/// Result type alias for lbtopo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for lbtopo.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required environment variable is missing or empty.
    #[error("Missing environment variable '{0}'")]
    MissingEnv(String),

    // ========================================================================
    // Credential Errors
    // ========================================================================
    /// Token acquisition against the identity endpoint failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    // ========================================================================
    // Remote Service Errors
    // ========================================================================
    /// The requested resource does not exist. Expected during cleanup of a
    /// run that never created anything.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Resource collection, e.g. "loadBalancers"
        kind: String,
        /// Resource name
        name: String,
    },

    /// A create referenced a parent or sibling resource that does not exist.
    #[error("Dependency not found: {kind} create references '{id}' which does not exist")]
    DependencyNotFound {
        /// Resource collection of the resource being created
        kind: String,
        /// The dangling reference
        id: String,
    },

    /// The management API rejected a request.
    #[error("Management API error ({status} {code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Service error code from the error envelope
        code: String,
        /// Service error message
        message: String,
    },

    /// An accepted operation finished in a failed provisioning state.
    #[error("Provisioning of {kind} '{name}' ended in state '{state}'")]
    OperationFailed {
        /// Resource collection
        kind: String,
        /// Resource name
        name: String,
        /// Terminal provisioning state reported by the service
        state: String,
    },

    /// Polling for a terminal provisioning state gave up.
    #[error("Timed out waiting for {kind} '{name}' after {secs} seconds")]
    OperationTimeout {
        /// Resource collection
        kind: String,
        /// Resource name
        name: String,
        /// How long we waited
        secs: u64,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding/decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL construction.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new not-found error.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates a new dependency-not-found error.
    pub fn dependency_not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DependencyNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error means "the resource simply is not there".
    ///
    /// Cleanup treats this as success: there was nothing to delete.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) => 3,
            Error::Config(_) | Error::MissingEnv(_) => 4,
            Error::NotFound { .. } | Error::DependencyNotFound { .. } => 5,
            Error::Api { .. } | Error::OperationFailed { .. } | Error::OperationTimeout { .. } => 2,
            _ => 1,
        }
    }
}
