//! Executing `HttpRequest`s.
//!
//! # Design
//! The sync controller is generic over [`Transport`] so tests can script
//! failures and hold responses back to force out-of-order completion.
//! [`UreqTransport`] is the real one: a blocking `ureq` agent run on tokio's
//! blocking pool, with status-code-as-error turned off so 4xx/5xx reach
//! `RecordClient::parse_*` as data.
//!
//! The agent carries the configured timeout itself. The controller's
//! `tokio::time::timeout` only stops waiting; without the agent deadline a
//! hung server would keep a pool thread and its socket busy.

use std::future::Future;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    /// Performs one round trip. Only failures where no response arrived are
    /// errors; any status code is a successful `HttpResponse`.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

/// Request headers are forwarded as given; response headers come back with
/// names lowercased. Values that are not visible ASCII are dropped.
fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    tracing::trace!(method = req.method.as_str(), path = %req.path, "sending request");
    let headers = &req.headers;
    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.path), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.path), headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&req.path), headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&req.path), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(&req.path), headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(&req.path), headers).send_empty(),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
