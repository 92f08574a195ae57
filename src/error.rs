//! Error types for Signflow
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Signflow operations
///
/// This enum encompasses every failure kind that can surface from a
/// sign-in attempt: host lifecycle problems, single-flight violations,
/// credential retrieval failures, authorization failures, and errors
/// reported back through the external approval presentation.
///
/// Failures originating in an external collaborator are wrapped with a
/// kind and the original cause text preserved for diagnostics. Nothing
/// is retried automatically; retry is the caller's responsibility.
#[derive(Error, Debug)]
pub enum SignFlowError {
    /// The host has no UI surface to present an approval request on
    #[error("No host surface available for presentation")]
    NoHostSurface,

    /// The presentation result channel was never registered (or has been
    /// torn down), so an approval request cannot be launched
    #[error("Presentation channel not registered")]
    NoPresentationChannel,

    /// A sign-in session is already live; the new request is rejected
    /// without touching the in-flight session
    #[error("A sign-in session is already in flight")]
    SessionAlreadyInFlight,

    /// The identity platform reported that no credential is available
    #[error("No credential available: {0}")]
    NoCredentialAvailable(String),

    /// The credential payload could not be parsed into an identity token
    #[error("Invalid identity token: {0}")]
    InvalidToken(String),

    /// The identity platform returned a credential of a type this crate
    /// does not understand
    #[error("Unsupported credential type: {0}")]
    UnsupportedCredentialType(String),

    /// The delegated authorization request failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Handing the approval request to the presentation host threw
    #[error("Failed to launch approval presentation: {0}")]
    PresentationLaunchFailed(String),

    /// The presentation reported success but carried no result payload
    #[error("No data returned from approval presentation")]
    NoDataReturned,

    /// The user or platform cancelled the sign-in attempt
    #[error("Sign-in was cancelled: {0}")]
    Cancelled(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other failure from an external collaborator
    #[error("Unknown sign-in error: {0}")]
    Unknown(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Signflow operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
