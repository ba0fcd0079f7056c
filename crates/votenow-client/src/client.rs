use std::sync::Arc;

use tracing::debug;

use crate::api::{AdminApi, BannersApi, DashboardApi, PollsApi, UsersApi};
use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::session::Session;
use crate::transport::{ReqwestTransport, Transport};

/// Entry point: owns the session and dispatcher and hands out the domain
/// clients.
///
/// ```no_run
/// # async fn demo() -> votenow_client::Result<()> {
/// use votenow_client::{ClientConfig, VoteNowClient};
///
/// let client = VoteNowClient::new(ClientConfig::from_env())?;
/// for poll in client.polls().list().await? {
///     println!("{} {}", poll.id, poll.title);
/// }
/// # Ok(())
/// # }
/// ```
pub struct VoteNowClient {
    dispatcher: Dispatcher,
}

impl VoteNowClient {
    /// Client with an in-memory session and the default HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_session(config, Arc::new(Session::in_memory()))
    }

    /// Client over an existing (typically persisted) session.
    pub fn with_session(config: ClientConfig, session: Arc<Session>) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, session, transport))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        debug!(base_url = %config.base_url, "Creating VoteNow client");
        Self {
            dispatcher: Dispatcher::new(Arc::new(config), session, transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    pub fn session(&self) -> &Arc<Session> {
        self.dispatcher.session()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.dispatcher)
    }

    pub fn polls(&self) -> PollsApi<'_> {
        PollsApi::new(&self.dispatcher)
    }

    pub fn banners(&self) -> BannersApi<'_> {
        BannersApi::new(&self.dispatcher)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(&self.dispatcher)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(&self.dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::models::LoginRequest;
    use crate::test_utils::{ScriptedTransport, json_response};

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let err = VoteNowClient::new(ClientConfig::new("ftp://example.com")).err();
        assert!(matches!(err, Some(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_session_shared_between_domain_clients() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(json_response(
            200,
            serde_json::json!({
                "access": "tok1",
                "refresh": "ref1",
                "user": {"id": 1, "username": "u", "email": "u@example.com", "role": "user"}
            }),
        ));
        transport.respond(json_response(200, serde_json::json!([])));

        let client = VoteNowClient::with_transport(
            ClientConfig::default(),
            Arc::new(Session::in_memory()),
            transport.clone(),
        );
        client.users().login(&LoginRequest::new("u", "pw")).await.unwrap();
        assert!(client.session().is_regular_user());

        client.banners().list().await.unwrap();
        assert_eq!(transport.requests()[1].bearer.as_deref(), Some("tok1"));
    }
}
