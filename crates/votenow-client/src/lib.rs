//! Authenticated HTTP client for the VoteNow polling API.
//!
//! ## Components
//!
//! - [`Session`] - credential store: access/refresh tokens and the cached user
//! - [`Dispatcher`] - attaches the access token and sends requests through a [`Transport`]
//! - [`RefreshCoordinator`] - exchanges the refresh token after a 401, at most once per request
//! - Domain clients in [`api`] - users, polls, banners, admin and dashboard operations
//!
//! [`VoteNowClient`] wires these together. A failed refresh clears the
//! session and broadcasts [`SessionEvent::LoginRequired`]; front ends
//! subscribe through [`Session::subscribe`] to send the user back to login.

pub mod api;
mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod refresh;
pub mod request;
pub mod session;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use client::VoteNowClient;
pub use config::ClientConfig;
pub use dispatcher::Dispatcher;
pub use error::{ClientError, RefreshError, Result};
pub use refresh::{RefreshCoordinator, RefreshPhase};
pub use request::{ApiRequest, ApiResponse, MultipartBody, Payload};
pub use session::{
    Credential, FileStorage, MemoryStorage, Session, SessionEvent, SessionStorage,
};
pub use transport::{ReqwestTransport, Transport};
