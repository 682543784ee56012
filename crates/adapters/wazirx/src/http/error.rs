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

//! Error structures and classification for the WazirX HTTP client.
//!
//! Every failed dispatch ends up as a [`WazirxHttpError`]. Expected rejections (rate limits,
//! bans, timeouts) carry the wait hint a caller needs to decide whether to resubmit.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;
use wazirx_network::http::{HttpClientError, HttpResponse, StatusCode};

use crate::common::consts::{
    BAN_DEFAULT_RETRY_AFTER, MAX_RETRY_AFTER, RATE_LIMIT_DEFAULT_RETRY_AFTER, RETRY_AFTER_HEADER,
};

/// Represents the JSON structure of an error response returned by the WazirX API.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WazirxErrorResponse {
    /// Error code returned by WazirX.
    #[serde(default)]
    pub code: Option<i64>,
    /// A human-readable explanation of the error condition.
    pub message: String,
}

/// The kind of a [`WazirxHttpError`], without its payload.
#[derive(Copy, Clone, Debug, Display, AsRefStr, PartialEq, Eq, Hash)]
pub enum WazirxErrorKind {
    RateLimitExceeded,
    Banned,
    GatewayTimeout,
    ExchangeError,
    RetryBudgetExhausted,
    InvalidRequest,
    JsonError,
    Config,
}

/// A typed error enumeration for the WazirX HTTP client.
#[derive(Debug, Clone, Error)]
pub enum WazirxHttpError {
    /// The per-endpoint request limit is reached, locally or as reported by the server (429).
    #[error("Too many requests to {endpoint}, retry after {}s", .retry_after.as_secs_f64())]
    RateLimitExceeded {
        endpoint: String,
        retry_after: Duration,
    },
    /// The credential is banned, locally recorded or as reported by the server (418).
    #[error("Banned by exchange, retry after {}s", .retry_after.as_secs_f64())]
    Banned { retry_after: Duration },
    /// The exchange did not respond within the request timeout.
    #[error("Exchange is taking too long to respond to {endpoint}")]
    GatewayTimeout { endpoint: String },
    /// Any other failure reported by the exchange or the transport.
    #[error("Exchange error: {message}")]
    ExchangeError {
        status: Option<StatusCode>,
        message: String,
    },
    /// The retry budget ran out before the request succeeded.
    #[error("Retry budget exhausted for {endpoint}")]
    RetryBudgetExhausted { endpoint: String },
    /// The request is malformed and was never sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    JsonError(String),
    /// The client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WazirxHttpError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> WazirxErrorKind {
        match self {
            Self::RateLimitExceeded { .. } => WazirxErrorKind::RateLimitExceeded,
            Self::Banned { .. } => WazirxErrorKind::Banned,
            Self::GatewayTimeout { .. } => WazirxErrorKind::GatewayTimeout,
            Self::ExchangeError { .. } => WazirxErrorKind::ExchangeError,
            Self::RetryBudgetExhausted { .. } => WazirxErrorKind::RetryBudgetExhausted,
            Self::InvalidRequest(_) => WazirxErrorKind::InvalidRequest,
            Self::JsonError(_) => WazirxErrorKind::JsonError,
            Self::Config(_) => WazirxErrorKind::Config,
        }
    }

    /// Returns the wait hint before the request could succeed, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after, .. } | Self::Banned { retry_after } => {
                Some(*retry_after)
            }
            _ => None,
        }
    }

    /// Returns the wait hint in (fractional) seconds, if any.
    #[must_use]
    pub fn retry_after_secs(&self) -> Option<f64> {
        self.retry_after().map(|d| d.as_secs_f64())
    }

    /// Returns `true` for transient conditions worth resubmitting after the wait hint.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::Banned { .. } | Self::GatewayTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for WazirxHttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

/// The raw outcome of a failed dispatch, before classification.
#[derive(Debug)]
pub enum DispatchFailure {
    /// The exchange answered with a non-success status.
    Status(HttpResponse),
    /// No response was received.
    Transport(HttpClientError),
}

impl DispatchFailure {
    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(response) => Some(response.status),
            Self::Transport(_) => None,
        }
    }

    /// Returns `true` for a connection or read timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns the parsed `Retry-After` header, if present.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status(response) => response
                .header(RETRY_AFTER_HEADER)
                .and_then(parse_retry_after),
            Self::Transport(_) => None,
        }
    }
}

/// Parses a `Retry-After` value given in (possibly fractional) seconds.
///
/// Values beyond [`MAX_RETRY_AFTER`] are clamped to it.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let retry_after =
        Duration::try_from_secs_f64(seconds).map_or(MAX_RETRY_AFTER, |d| d.min(MAX_RETRY_AFTER));
    Some(retry_after)
}

/// Maps the raw outcome of a failed request to `endpoint` into a typed error.
///
/// - 429: [`WazirxHttpError::RateLimitExceeded`], `Retry-After` defaulting to 1 second.
/// - 418: [`WazirxHttpError::Banned`], `Retry-After` defaulting to 10 seconds.
/// - Timeouts: [`WazirxHttpError::GatewayTimeout`].
/// - Anything else: [`WazirxHttpError::ExchangeError`] with the exchange message when the
///   body carries one, otherwise a generic message.
#[must_use]
pub fn classify(endpoint: &str, failure: DispatchFailure) -> WazirxHttpError {
    let retry_after = failure.retry_after();
    match failure {
        DispatchFailure::Status(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
            WazirxHttpError::RateLimitExceeded {
                endpoint: endpoint.to_string(),
                retry_after: retry_after.unwrap_or(RATE_LIMIT_DEFAULT_RETRY_AFTER),
            }
        }
        DispatchFailure::Status(response) if response.status == StatusCode::IM_A_TEAPOT => {
            WazirxHttpError::Banned {
                retry_after: retry_after.unwrap_or(BAN_DEFAULT_RETRY_AFTER),
            }
        }
        DispatchFailure::Status(response) => {
            let message = serde_json::from_slice::<WazirxErrorResponse>(&response.body)
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    format!("Request failed with status code {}", response.status.as_u16())
                });
            WazirxHttpError::ExchangeError {
                status: Some(response.status),
                message,
            }
        }
        DispatchFailure::Transport(e) if e.is_timeout() => WazirxHttpError::GatewayTimeout {
            endpoint: endpoint.to_string(),
        },
        DispatchFailure::Transport(e) => WazirxHttpError::ExchangeError {
            status: None,
            message: e.to_string(),
        },
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
