//! Error types for the VoteNow client.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type returned by every client operation.
///
/// `Ok` carries the decoded payload, `Err` the failure; no operation panics
/// or throws past this boundary.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced to callers of the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// A non-reqwest transport could not obtain a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("request failed with HTTP {status}: {}", server_message(.body))]
    Api { status: StatusCode, body: String },

    /// Rejected locally before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A request body could not be encoded, or a 2xx response body did not
    /// match the expected shape.
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// The credential store could not be read or written.
    #[error("session storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network { source } => source.status(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[inline]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    /// Human-readable message suitable for showing to a user.
    ///
    /// For backend failures this is the server-provided message, unprocessed
    /// beyond picking the conventional `error` / `detail` / `message` field.
    pub fn server_message(&self) -> String {
        match self {
            Self::Api { body, .. } => server_message(body),
            other => other.to_string(),
        }
    }
}

/// Pull the conventional message field out of a backend error payload.
///
/// Falls back to the raw body (or `"no response body"`) when the payload is
/// not a JSON object with a known message field.
pub(crate) fn server_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.to_string();
    };

    ["error", "detail", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string())
}

/// Why a token refresh did not produce a new access token.
///
/// These never reach callers directly: the dispatcher logs them and hands
/// back the original 401.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("session was cleared by a concurrent refresh")]
    SessionCleared,

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh rejected with HTTP {status}")]
    Rejected { status: StatusCode },

    #[error("malformed refresh response: {0}")]
    Malformed(String),

    #[error("failed to store refreshed token: {0}")]
    Storage(String),
}

impl RefreshError {
    /// Whether the backend explicitly refused the refresh token.
    #[inline]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
