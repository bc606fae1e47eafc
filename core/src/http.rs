//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! builder produces `HttpRequest` values without touching the network; a
//! `Transport` implementation performs the I/O and hands back an
//! `HttpResponse`, which is returned to the caller uninterpreted.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the API path (`/v1/...`) and `url` is the same path prefixed
/// with the configured base URL. Query parameters are kept in a sorted map;
/// their order carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub(crate) fn new(method: HttpMethod, base_url: &str, path: String) -> Self {
        Self {
            method,
            url: format!("{base_url}{path}"),
            path,
            query: BTreeMap::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub(crate) fn with_json(mut self, body: serde_json::Value) -> Self {
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        self
    }

    /// `url` with the query parameters form-encoded onto it.
    pub fn full_url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid URL {}: {e}", self.url)))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// Convenience accessor for a single query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by a `Transport` after executing an `HttpRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
