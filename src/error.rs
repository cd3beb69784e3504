// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types.
//!
//! Tracking fetches never surface these to the UI directly (they degrade to
//! mock data or an error record); auth and form failures do, verbatim.

/// Error type shared by the API client, session store and view-models.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Non-2xx response carrying the server-supplied message.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Payload(String),

    #[error("{0}")]
    Validation(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Secure storage error: {0}")]
    Storage(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// True for transport-level failures (timeout, connection, non-2xx).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Timeout | ClientError::Api { .. }
        )
    }

    /// HTTP status for server-reported errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Payload(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
