//! Request dispatcher.
//!
//! Resolves the endpoint, attaches the stored access token, sends through
//! the [`Transport`], and hands 401s on authenticated requests to the
//! [`RefreshCoordinator`]. Every outcome comes back as [`Result`].

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{RefreshError, Result};
use crate::refresh::RefreshCoordinator;
use crate::request::{ApiRequest, ApiResponse};
use crate::session::Session;
use crate::transport::Transport;

/// A request on its way through the dispatcher.
///
/// `refresh_attempted` is the loop guard: once set, a 401 is final.
#[derive(Debug)]
struct PendingRequest {
    request: ApiRequest,
    refresh_attempted: bool,
}

impl PendingRequest {
    fn new(request: ApiRequest) -> Self {
        Self {
            request,
            refresh_attempted: false,
        }
    }

    /// Claim the single refresh this request is entitled to.
    fn claim_refresh(&mut self) -> bool {
        !std::mem::replace(&mut self.refresh_attempted, true)
    }
}

pub struct Dispatcher {
    config: Arc<ClientConfig>,
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    refresher: RefreshCoordinator,
}

impl Dispatcher {
    pub fn new(
        config: Arc<ClientConfig>,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let refresher =
            RefreshCoordinator::new(config.clone(), session.clone(), transport.clone());
        Self {
            config,
            session,
            transport,
            refresher,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Send a request, refreshing the access token at most once on 401.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut pending = PendingRequest::new(request);

        let token = self.session.access_token();
        let response = self.transmit(&pending, token.as_deref(), 1).await?;
        if response.is_success() {
            return Ok(response);
        }

        if response.status != StatusCode::UNAUTHORIZED {
            return Err(response.into_error());
        }

        // Public endpoints called anonymously never trigger a refresh.
        let Some(rejected) = token else {
            debug!("401 on unauthenticated request");
            return Err(response.into_error());
        };

        if !pending.claim_refresh() {
            return Err(response.into_error());
        }

        match self.refresher.refresh(&rejected).await {
            Ok(access) => {
                let retry = self.transmit(&pending, Some(&access), 2).await?;
                if retry.is_success() {
                    Ok(retry)
                } else {
                    Err(retry.into_error())
                }
            }
            Err(RefreshError::SessionCleared) => {
                debug!("Session cleared by a concurrent refresh");
                Err(response.into_error())
            }
            Err(e) => {
                warn!(error = %e, "Giving up on request after failed refresh");
                Err(response.into_error())
            }
        }
    }

    /// Send and decode the body as `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    async fn transmit(
        &self,
        pending: &PendingRequest,
        bearer: Option<&str>,
        attempt: u8,
    ) -> Result<ApiResponse> {
        let url = self.config.endpoint(&pending.request.path);
        let result = self.transport.execute(&url, &pending.request, bearer).await;

        match &result {
            Ok(response) => debug!(
                status = response.status.as_u16(),
                attempt,
                authenticated = bearer.is_some(),
                "Request completed"
            ),
            Err(e) => warn!(error = %e, attempt, "Request failed without response"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ClientError;
    use crate::refresh::RefreshPhase;
    use crate::session::SessionEvent;
    use crate::test_utils::{Scripted, ScriptedTransport, json_response};

    const REFRESH: &str = "/token/refresh/";

    fn dispatcher(session: Arc<Session>, transport: Arc<ScriptedTransport>) -> Dispatcher {
        Dispatcher::new(Arc::new(ClientConfig::default()), session, transport)
    }

    fn logged_in(access: &str) -> Arc<Session> {
        let session = Arc::new(Session::in_memory());
        session.save(access, "ref1").unwrap();
        session
    }

    #[tokio::test]
    async fn test_attaches_bearer_when_token_present() {
        let session = logged_in("tok1");
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(json_response(200, serde_json::json!([])));
        transport.respond(json_response(200, serde_json::json!({"id": 1})));

        let dispatcher = dispatcher(session, transport.clone());
        dispatcher.send(ApiRequest::get("/polls/")).await.unwrap();
        dispatcher.send(ApiRequest::get("/users/profile/")).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|r| r.bearer.as_deref() == Some("tok1")));
        assert_eq!(sent[0].url, "http://127.0.0.1:8000/api/polls/");
    }

    #[tokio::test]
    async fn test_anonymous_401_passes_through() {
        let session = Arc::new(Session::in_memory());
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(json_response(401, serde_json::json!({"detail": "nope"})));

        let dispatcher = dispatcher(session, transport.clone());
        let err = dispatcher.send(ApiRequest::get("/polls/")).await.unwrap_err();

        assert!(err.is_unauthorized());
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].bearer, None);
        assert!(transport.requests_to(REFRESH).is_empty());
        assert_eq!(dispatcher.refresher().phase(), RefreshPhase::Idle);
    }

    #[tokio::test]
    async fn test_refresh_then_retry_returns_retry_result() {
        let session = logged_in("tok1");
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(json_response(401, serde_json::json!({"detail": "expired"})));
        transport.respond(json_response(200, serde_json::json!({"access": "tok2"})));
        transport.respond(json_response(200, serde_json::json!({"id": 5, "title": "Poll"})));

        let dispatcher = dispatcher(session.clone(), transport.clone());
        let body: serde_json::Value = dispatcher
            .send_json(ApiRequest::get("/polls/5/"))
            .await
            .unwrap();

        assert_eq!(body, serde_json::json!({"id": 5, "title": "Poll"}));
        let sent = transport.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].path, "/polls/5/");
        assert_eq!(sent[0].bearer.as_deref(), Some("tok1"));
        assert_eq!(sent[1].path, REFRESH);
        assert_eq!(sent[1].bearer, None);
        assert_eq!(sent[2].path, "/polls/5/");
        assert_eq!(sent[2].bearer.as_deref(), Some("tok2"));
        assert_eq!(session.access_token().as_deref(), Some("tok2"));
    }

    #[tokio::test]
    async fn test_repeated_401_refreshes_exactly_once() {
        let session = logged_in("tok1");
        let transport = Arc::new(ScriptedTransport::with_handler(|req| {
            if req.path == REFRESH {
                Scripted::Respond(json_response(200, serde_json::json!({"access": "tok2"})))
            } else {
                Scripted::Respond(json_response(401, serde_json::json!({"detail": "no"})))
            }
        }));

        let dispatcher = dispatcher(session, transport.clone());
        let err = dispatcher
            .send(ApiRequest::get("/admin/users/"))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(transport.requests_to(REFRESH).len(), 1);
        assert_eq!(transport.requests_to("/admin/users/").len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session_and_requires_login() {
        let session = logged_in("tok1");
        let mut events = session.subscribe();
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(json_response(401, serde_json::json!({"detail": "expired"})));
        transport.respond(json_response(401, serde_json::json!({"detail": "bad refresh"})));

        let dispatcher = dispatcher(session.clone(), transport.clone());
        let err = dispatcher.send(ApiRequest::get("/polls/5/")).await.unwrap_err();

        // The caller sees the original failure, not the refresh call's.
        assert!(matches!(&err, ClientError::Api { body, .. } if body.contains("expired")));
        assert_eq!(session.credential(), None);
        assert_eq!(session.cached_user(), None);
        assert_eq!(dispatcher.refresher().phase(), RefreshPhase::Failed);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoginRequired {
                login_path: "/login".into()
            }
        );
        // No retry after a failed refresh.
        assert_eq!(transport.requests_to("/polls/5/").len(), 1);
    }

    #[tokio::test]
    async fn test_non_401_failures_are_not_retried() {
        let session = logged_in("tok1");
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(json_response(400, serde_json::json!({"non_field_errors": ["x"]})));
        transport.respond(json_response(503, serde_json::json!({"detail": "down"})));

        let dispatcher = dispatcher(session.clone(), transport.clone());
        let err = dispatcher.send(ApiRequest::post("/polls/1/vote/")).await.unwrap_err();
        assert!(err.is_client_error());
        let err = dispatcher.send(ApiRequest::get("/polls/")).await.unwrap_err();
        assert!(err.is_server_error());

        assert_eq!(transport.requests().len(), 2);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_without_refresh() {
        let session = logged_in("tok1");
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("connection reset");

        let dispatcher = dispatcher(session.clone(), transport.clone());
        let err = dispatcher.send(ApiRequest::get("/polls/")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(transport.requests_to(REFRESH).is_empty());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let session = logged_in("tok1");
        let transport = Arc::new(
            ScriptedTransport::with_handler(|req| {
                if req.path == REFRESH {
                    return Scripted::Respond(json_response(
                        200,
                        serde_json::json!({"access": "tok2"}),
                    ));
                }
                match req.bearer.as_deref() {
                    Some("tok2") => Scripted::Respond(json_response(200, serde_json::json!({}))),
                    _ => Scripted::Respond(json_response(401, serde_json::json!({}))),
                }
            })
            .with_delay(Duration::from_millis(20)),
        );

        let dispatcher = dispatcher(session, transport.clone());
        let (a, b, c) = tokio::join!(
            dispatcher.send(ApiRequest::get("/polls/1/")),
            dispatcher.send(ApiRequest::get("/polls/2/")),
            dispatcher.send(ApiRequest::get("/polls/3/")),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(transport.requests_to(REFRESH).len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_401s_after_failed_refresh_do_not_retry_refresh() {
        let session = logged_in("tok1");
        let mut events = session.subscribe();
        let transport = Arc::new(
            ScriptedTransport::with_handler(|_| {
                Scripted::Respond(json_response(401, serde_json::json!({})))
            })
            .with_delay(Duration::from_millis(20)),
        );

        let dispatcher = dispatcher(session.clone(), transport.clone());
        let (a, b) = tokio::join!(
            dispatcher.send(ApiRequest::get("/polls/1/")),
            dispatcher.send(ApiRequest::get("/polls/2/")),
        );

        assert!(a.unwrap_err().is_unauthorized());
        assert!(b.unwrap_err().is_unauthorized());
        assert_eq!(transport.requests_to(REFRESH).len(), 1);
        assert!(!session.is_authenticated());

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::LoginRequired { .. }
        ));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_pending_request_claims_once() {
        let mut pending = PendingRequest::new(ApiRequest::get("/polls/"));
        assert!(pending.claim_refresh());
        assert!(!pending.claim_refresh());
    }
}
