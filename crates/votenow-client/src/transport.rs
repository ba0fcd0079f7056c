//! HTTP transport.
//!
//! The [`Transport`] trait is the seam between the dispatcher and the wire;
//! [`ReqwestTransport`] is the production implementation. This is the only
//! place `reqwest` errors are caught and mapped.

use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::{ApiRequest, ApiResponse, MultipartBody, MultipartPart, Payload};

/// Sends one request and returns whatever status came back.
///
/// Implementations never interpret status codes; non-2xx responses are
/// returned as `Ok`. `Err` means no response was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        url: &str,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse>;
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate installed one first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        install_rustls_provider();

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout);

        if !config.timeout.is_zero() {
            builder = builder.timeout(config.timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client (proxy or TLS settings applied by the caller).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn build_form(body: &MultipartBody) -> Result<Form> {
    let mut form = Form::new();
    for part in body.parts() {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(content_type)?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        url: &str,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let multipart = matches!(request.payload, Payload::Multipart(_));
        for (name, value) in &request.headers {
            // The multipart boundary must come from reqwest.
            if name == AUTHORIZATION || (multipart && name == CONTENT_TYPE) {
                continue;
            }
            builder = builder.header(name.clone(), value.clone());
        }

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Multipart(body) => builder.multipart(build_form(body)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(ApiResponse { status, body })
    }
}
