//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::error::{ClientError, Result};
use crate::request::{ApiRequest, ApiResponse, MultipartBody, Payload};
use crate::transport::Transport;

/// What the transport saw for one transmission.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub payload: Payload,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Option<serde_json::Value> {
        match &self.payload {
            Payload::Json(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn multipart(&self) -> Option<&MultipartBody> {
        match &self.payload {
            Payload::Multipart(body) => Some(body),
            _ => None,
        }
    }
}

pub(crate) enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

type Handler = Box<dyn Fn(&RecordedRequest) -> Scripted + Send + Sync>;

/// A [`Transport`] that answers from a queue or a routing closure and
/// records every request it receives.
pub(crate) struct ScriptedTransport {
    queue: Mutex<VecDeque<Scripted>>,
    handler: Option<Handler>,
    delay: Duration,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            handler: None,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer by inspecting each request instead of from the queue.
    pub fn with_handler(
        handler: impl Fn(&RecordedRequest) -> Scripted + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Some(Box::new(handler)),
            ..Self::new()
        }
    }

    /// Hold every response for `delay` so concurrent requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond(&self, response: ApiResponse) {
        self.queue.lock().push_back(Scripted::Respond(response));
    }

    pub fn fail(&self, reason: &str) {
        self.queue.lock().push_back(Scripted::Fail(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(
        &self,
        url: &str,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse> {
        let recorded = RecordedRequest {
            method: request.method.clone(),
            url: url.to_string(),
            path: request.path.clone(),
            query: request.query.clone(),
            bearer: bearer.map(str::to_string),
            payload: request.payload.clone(),
            headers: request.headers.clone(),
        };
        self.requests.lock().push(recorded.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = match &self.handler {
            Some(handler) => handler(&recorded),
            None => self
                .queue
                .lock()
                .pop_front()
                .unwrap_or_else(|| Scripted::Fail(format!("no scripted response for {url}"))),
        };

        match scripted {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(reason) => Err(ClientError::Transport(reason)),
        }
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(
        StatusCode::from_u16(status).expect("valid status code"),
        body.to_string(),
    )
}

pub(crate) fn empty_response(status: u16) -> ApiResponse {
    ApiResponse::new(
        StatusCode::from_u16(status).expect("valid status code"),
        bytes::Bytes::new(),
    )
}
