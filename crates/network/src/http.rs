// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A thin HTTP transport layer.
//!
//! [`HttpTransport`] is the seam between the request dispatch logic and the network: it executes
//! exactly one request and returns the raw response, whatever its status. [`HttpClient`] is the
//! production implementation backed by [`reqwest`].

use std::{borrow::Cow, collections::HashMap, fmt::Debug, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
pub use reqwest::{Method, StatusCode};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use wazirx_core::consts::USER_AGENT;

/// Errors raised by the transport before a response is available.
#[derive(Clone, Debug, Error)]
pub enum HttpClientError {
    /// A generic transport error (connection refused, TLS failure, broken body, ...).
    #[error("HTTP error occurred: {0}")]
    Error(String),
    /// The request or the response body did not complete within the configured timeout.
    #[error("HTTP request timed out: {0}")]
    TimeoutError(String),
    /// The underlying client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildError(String),
}

impl HttpClientError {
    /// Returns whether this error is a connection or read timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutError(_))
    }
}

impl From<reqwest::Error> for HttpClientError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::TimeoutError(source.to_string())
        } else if source.is_builder() {
            Self::ClientBuildError(source.to_string())
        } else {
            Self::Error(source.to_string())
        }
    }
}

/// A fully prepared HTTP request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequest`] without headers or body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the first value of the header `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The raw outcome of an HTTP exchange.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Response headers keyed by lowercase name.
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a new [`HttpResponse`] without headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header, normalizing the name to lowercase.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Returns the value of the header `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Executes a single HTTP request.
///
/// Implementations return `Ok` for every response received, including error statuses;
/// `Err` is reserved for failures where no response exists.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Sends `request` and returns the response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

/// A [`reqwest`] backed [`HttpTransport`].
///
/// The client keeps connections alive and can be cloned cheaply.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Creates a new [`HttpClient`] sending `default_headers` with every request.
    ///
    /// `timeout` bounds the whole exchange, from connecting until the body is read.
    ///
    /// # Errors
    ///
    /// Returns an error if a header is invalid or the TLS backend cannot be initialized.
    pub fn new(
        default_headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<Self, HttpClientError> {
        let mut headers = HeaderMap::new();
        for (name, value) in default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpClientError::ClientBuildError(format!("header '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HttpClientError::ClientBuildError(format!("header '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| HttpClientError::ClientBuildError(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Returns the configured request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        tracing::trace!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, request.url.as_str());
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
