//! Token refresh coordination.
//!
//! When an authenticated request comes back 401 the dispatcher asks the
//! [`RefreshCoordinator`] for a replacement access token. The coordinator
//! moves through `Idle -> InFlight -> {Resolved, Failed}`:
//!
//! - **InFlight**: `POST {refresh_path}` with `{"refresh": ...}`, no bearer.
//! - **Resolved**: the new access token is stored (refresh token kept unless
//!   the backend rotated it) and returned for the single retry.
//! - **Failed**: no refresh token, transport failure, non-2xx, or an
//!   unreadable body. The session is cleared and
//!   [`SessionEvent::LoginRequired`] is broadcast.
//!
//! With `single_flight_refresh` enabled, concurrent 401s queue on one gate.
//! Whoever gets the gate after a successful refresh finds a different access
//! token already stored and reuses it; after a failed refresh it finds the
//! session cleared and fails without another network call.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::RefreshError;
use crate::request::ApiRequest;
use crate::session::{Session, SessionEvent};
use crate::transport::Transport;

/// Where the most recent refresh attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    InFlight,
    Resolved,
    Failed,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

pub struct RefreshCoordinator {
    config: Arc<ClientConfig>,
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    gate: tokio::sync::Mutex<()>,
    phase: Mutex<RefreshPhase>,
    #[cfg(test)]
    transitions: Mutex<Vec<RefreshPhase>>,
}

impl RefreshCoordinator {
    pub fn new(
        config: Arc<ClientConfig>,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            session,
            transport,
            gate: tokio::sync::Mutex::new(()),
            phase: Mutex::new(RefreshPhase::Idle),
            #[cfg(test)]
            transitions: Mutex::new(Vec::new()),
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        *self.phase.lock()
    }

    /// Obtain an access token to replace `rejected`.
    pub async fn refresh(&self, rejected: &str) -> Result<String, RefreshError> {
        if !self.config.single_flight_refresh {
            return self.run().await;
        }

        let _guard = self.gate.lock().await;

        // Another request may have settled the refresh while we waited.
        match self.session.access_token() {
            Some(current) if current != rejected => {
                debug!("Reusing access token from a concurrent refresh");
                return Ok(current);
            }
            None => return Err(RefreshError::SessionCleared),
            Some(_) => {}
        }

        self.run().await
    }

    async fn run(&self) -> Result<String, RefreshError> {
        let outcome = match self.session.refresh_token() {
            Some(refresh) => {
                self.set_phase(RefreshPhase::InFlight);
                self.exchange(&refresh).await
            }
            None => Err(RefreshError::MissingRefreshToken),
        };

        match outcome {
            Ok(access) => {
                self.set_phase(RefreshPhase::Resolved);
                info!("Access token refreshed");
                self.session.notify(SessionEvent::TokenRefreshed);
                Ok(access)
            }
            Err(e) => {
                self.set_phase(RefreshPhase::Failed);
                warn!(error = %e, "Token refresh failed; clearing session");
                self.expire();
                Err(e)
            }
        }
    }

    async fn exchange(&self, refresh: &str) -> Result<String, RefreshError> {
        let request = ApiRequest::post(self.config.refresh_path.clone())
            .json(&RefreshRequest { refresh })
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;
        let url = self.config.endpoint(&request.path);

        let response = self
            .transport
            .execute(&url, &request, None)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status,
            });
        }

        let body: RefreshResponse = response
            .json()
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        if body.access.trim().is_empty() {
            return Err(RefreshError::Malformed("empty access token".into()));
        }

        let stored = match body.refresh {
            Some(rotated) if !rotated.trim().is_empty() => {
                self.session.rotate(body.access.clone(), rotated)
            }
            _ => self.session.set_access_token(body.access.clone()),
        };
        stored.map_err(|e| RefreshError::Storage(e.to_string()))?;

        Ok(body.access)
    }

    fn expire(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session after refresh failure");
        }
        self.session.notify(SessionEvent::LoginRequired {
            login_path: self.config.login_path.clone(),
        });
    }

    fn set_phase(&self, phase: RefreshPhase) {
        let mut current = self.phase.lock();
        debug!(from = ?*current, to = ?phase, "Refresh phase transition");
        *current = phase;
        #[cfg(test)]
        self.transitions.lock().push(phase);
    }
}
