//! The I/O seam between request building and the network.
//!
//! # Design
//! `Transport` executes a fully built `HttpRequest` and returns the raw
//! `HttpResponse`. Status codes and bodies are passed back untouched; errors
//! are reserved for failures to complete the round-trip. `UreqTransport` is
//! the blocking implementation enabled by the default `ureq` feature.

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes requests on behalf of `TdaClient`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use super::*;
    use crate::http::HttpMethod;

    /// Blocking transport backed by a `ureq::Agent`.
    ///
    /// 4xx/5xx responses are returned as data rather than `Err`, so callers
    /// see every status the server sends.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        default_headers: Vec<(String, String)>,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self::from_agent(agent)
        }

        pub fn from_agent(agent: ureq::Agent) -> Self {
            Self {
                agent,
                default_headers: Vec::new(),
            }
        }

        /// Add a header sent with every request, e.g. an `Authorization`
        /// bearer token obtained elsewhere.
        pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.default_headers.push((name.into(), value.into()));
            self
        }

        fn prepare<B>(
            &self,
            mut builder: ureq::RequestBuilder<B>,
            request: &HttpRequest,
        ) -> ureq::RequestBuilder<B> {
            for (name, value) in self.default_headers.iter().chain(&request.headers) {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            let body = request
                .body
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| ApiError::Serialization(e.to_string()))?;

            let url = request.full_url()?;
            let url = url.as_str();
            let result = match (request.method, body) {
                (HttpMethod::Get, _) => self.prepare(self.agent.get(url), request).call(),
                (HttpMethod::Delete, _) => self.prepare(self.agent.delete(url), request).call(),
                (HttpMethod::Post, Some(body)) => {
                    self.prepare(self.agent.post(url), request).send(body.as_bytes())
                }
                (HttpMethod::Post, None) => self.prepare(self.agent.post(url), request).send_empty(),
                (HttpMethod::Put, Some(body)) => {
                    self.prepare(self.agent.put(url), request).send(body.as_bytes())
                }
                (HttpMethod::Put, None) => self.prepare(self.agent.put(url), request).send_empty(),
            };
            let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            tracing::debug!(method = %request.method, path = %request.path, status, "request executed");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
