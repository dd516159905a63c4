//! Error types for the record client and its sync controller.
//!
//! # Design
//! `ApiError` covers everything that can go wrong talking to the remote
//! source. `NotFound` keeps its own variant because "the record is gone" is
//! the one status callers branch on; every other non-success status lands in
//! `HttpError` with the raw code and body. `SyncError` wraps `ApiError` and
//! adds the failures that are caught locally before any request is sent.

use std::time::Duration;

use thiserror::Error;

/// A failed round trip against the remote record API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one(s) or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, DNS, TLS...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// No response arrived within the configured bound.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// HTTP status code behind this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 5xx answers and for failures where no answer arrived.
    pub fn is_server_or_network(&self) -> bool {
        match self.status() {
            Some(status) => status >= 500,
            None => matches!(self, ApiError::Transport(_) | ApiError::Timeout(_)),
        }
    }
}

/// Errors returned by [`SyncController`](crate::sync::SyncController)
/// operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] ApiError),

    /// Pages are numbered from 1.
    #[error("invalid page {0}: pages start at 1")]
    InvalidPage(i64),

    /// An edit was requested for a record that is not on the current page.
    #[error("no record with id {0} is selected")]
    NoSelection(i64),

    #[error("unknown field {0:?}")]
    UnknownField(String),
}

/// Errors raised while reading [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
