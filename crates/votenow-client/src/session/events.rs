//! Session lifecycle events.

/// Notifications emitted by the session as credentials change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login stored a new credential.
    LoggedIn { username: String },

    /// The access token was replaced through the refresh endpoint.
    TokenRefreshed,

    /// The session could not be refreshed and has been cleared.
    ///
    /// Front ends route the user to `login_path`.
    LoginRequired { login_path: String },

    /// The user logged out locally.
    LoggedOut,
}
