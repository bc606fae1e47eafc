//! Error types for the TD Ameritrade request builder.
//!
//! # Design
//! Validation failures (`InvalidArgument`, `InvalidState`) are raised before a
//! request value exists, so a caller never sees a half-built request.
//! `Transport` is produced only by `Transport` implementations; the builder
//! never inspects status codes or response bodies.

use thiserror::Error;

/// Errors returned by `RequestBuilder` and `TdaClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An argument was rejected, e.g. both `status` and `statuses` were set
    /// on an order query, or a CUSIP was supplied as a number.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The client is missing state the operation needs, such as an account id.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An order payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A required configuration value was not provided.
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    /// A configuration value was present but unusable, such as a base URL
    /// that does not parse.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The transport failed to execute the request.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
