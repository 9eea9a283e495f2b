//
//  buildkite-cli
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport
//!
//! The client never talks to the network directly. It hands the wire-level
//! parts of each request to a [`Transport`] and gets back a [`RawResponse`]
//! with the status, the body text and the response headers.
//!
//! [`ReqwestTransport`] is the production implementation. Tests substitute
//! their own implementation to script responses without a server.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};

use super::common::Result;
use super::request::{HttpMethod, QueryParams};

/// Sends one HTTP request and returns the raw result.
///
/// Implementations report network and I/O failures as
/// [`ApiError::Transport`](super::common::ApiError::Transport). Non-success
/// status codes are not errors at this level; they are returned as a normal
/// [`RawResponse`] for the client to interpret.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        query: &QueryParams,
        body: Option<&str>,
    ) -> Result<RawResponse>;
}

/// Response headers with case-insensitive lookup.
///
/// Names are normalised to lowercase on insertion; inserting a name that is
/// already present replaces the previous value.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::api::transport::ResponseHeaders;
///
/// let mut headers = ResponseHeaders::new();
/// headers.insert("Link", "<a>; rel=\"next\"");
/// headers.insert("LINK", "<b>; rel=\"next\"");
///
/// assert_eq!(headers.get("link"), Some("<b>; rel=\"next\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    values: HashMap<String, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

/// What came back from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub headers: ResponseHeaders,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: ResponseHeaders::new(),
        }
    }

    /// Adds a header, replacing any earlier value for the same name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        }
    }
}

/// [`Transport`] backed by a `reqwest` client.
///
/// Applies the bearer token (when configured), a `bk/<version>` User-Agent,
/// and a JSON content type for requests with a body. Multi-valued query
/// parameters are sent as repeated keys.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use buildkite_cli::api::transport::ReqwestTransport;
///
/// let transport = ReqwestTransport::new(Some("bkua_token".to_string()), Some(Duration::from_secs(30)))?;
/// # Ok::<(), buildkite_cli::api::ApiError>(())
/// ```
pub struct ReqwestTransport {
    http: Client,
    token: Option<String>,
}

impl ReqwestTransport {
    /// Creates a transport with an optional bearer token and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`](super::common::ApiError::Transport) if
    /// the underlying HTTP client cannot be built.
    pub fn new(token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(format!("bk/{}", crate::VERSION));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            token,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        query: &QueryParams,
        body: Option<&str>,
    ) -> Result<RawResponse> {
        let pairs: Vec<(&str, &str)> = query.iter().collect();
        let mut request = self.http.request(method.into(), url).query(&pairs);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v.to_string())))
            .collect();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            body,
            headers,
        })
    }
}
