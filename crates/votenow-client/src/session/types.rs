//! Core session types.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Identity snapshot cached next to the tokens.
///
/// Used only to decide what to show (e.g. admin navigation). It is not an
/// authorization decision: the backend re-verifies the role on every call.
pub type CachedUser = User;

/// An access/refresh token pair. Both are opaque strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
