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

//! Request descriptions and their signed wire encoding.

use indexmap::IndexMap;
use wazirx_cryptography::{SIGNATURE_FIELD, SignedPayload, canonical_query};
use wazirx_network::http::Method;

use super::error::WazirxHttpError;
use crate::common::{
    consts::{DEFAULT_RECV_WINDOW_MS, RECV_WINDOW_FIELD, TIMESTAMP_FIELD},
    credential::Credential,
};

/// A parameter mapping, kept in insertion order until it is canonicalized.
pub type Params = IndexMap<String, String>;

/// Describes one logical call against the exchange.
///
/// A spec owns its parameters; the dispatcher injects the volatile fields (`recvWindow`,
/// `timestamp`) on every attempt and strips them again before a retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSpec {
    /// Path relative to the base URL, e.g. `/funds`. Also the rate-limit key.
    pub endpoint: String,
    pub method: Method,
    /// Query parameters (GET).
    pub params: Params,
    /// Form body fields (POST, DELETE).
    pub body: Params,
    pub limit_per_sec: u32,
    pub is_public: bool,
    pub recv_window_ms: u64,
}

impl RequestSpec {
    /// Creates a new authenticated [`RequestSpec`] allowing one request per second.
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            params: Params::new(),
            body: Params::new(),
            limit_per_sec: 1,
            is_public: false,
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Adds a form body field.
    #[must_use]
    pub fn with_body_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.body.insert(key.into(), value.to_string());
        self
    }

    /// Sets the per-second request limit of the endpoint.
    #[must_use]
    pub const fn with_limit(mut self, limit_per_sec: u32) -> Self {
        self.limit_per_sec = limit_per_sec;
        self
    }

    /// Marks the request as public; a public GET is sent unsigned.
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Sets the `recvWindow` sent with the request.
    #[must_use]
    pub const fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    /// Checks the request can be sent at all.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::InvalidRequest`] if the endpoint is empty, the method is not
    /// one of GET, POST or DELETE, or the limit is zero.
    pub fn validate(&self) -> Result<(), WazirxHttpError> {
        if self.endpoint.trim().is_empty() {
            return Err(WazirxHttpError::InvalidRequest(
                "missing endpoint".to_string(),
            ));
        }
        if ![Method::GET, Method::POST, Method::DELETE].contains(&self.method) {
            return Err(WazirxHttpError::InvalidRequest(format!(
                "unsupported method {} for {}",
                self.method, self.endpoint
            )));
        }
        if self.limit_per_sec == 0 {
            return Err(WazirxHttpError::InvalidRequest(format!(
                "zero rate limit for {}",
                self.endpoint
            )));
        }
        Ok(())
    }

    /// Returns `true` if the request must carry a signature.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        !(self.is_public && self.method == Method::GET)
    }

    /// Returns the mapping sent on the wire: the query for GET, the body otherwise.
    #[must_use]
    pub fn payload(&self) -> &Params {
        if self.method == Method::GET {
            &self.params
        } else {
            &self.body
        }
    }

    fn payload_mut(&mut self) -> &mut Params {
        if self.method == Method::GET {
            &mut self.params
        } else {
            &mut self.body
        }
    }

    /// Injects `recvWindow` and a fresh `timestamp` into the payload.
    ///
    /// Any stale `signature` field is dropped; [`Self::encode`] appends a new one when the
    /// request is signed.
    pub fn inject_volatile(&mut self, timestamp_ms: u64) {
        let recv_window = self.recv_window_ms.to_string();
        let payload = self.payload_mut();
        payload.shift_remove(SIGNATURE_FIELD);
        payload.insert(RECV_WINDOW_FIELD.to_string(), recv_window);
        payload.insert(TIMESTAMP_FIELD.to_string(), timestamp_ms.to_string());
    }

    /// Removes every volatile field from the payload.
    pub fn strip_volatile(&mut self) {
        let payload = self.payload_mut();
        for field in [RECV_WINDOW_FIELD, TIMESTAMP_FIELD, SIGNATURE_FIELD] {
            payload.shift_remove(field);
        }
    }

    /// Encodes the payload, signing it with `credential` when the request is signed.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::InvalidRequest`] if the request must be signed but no
    /// credential is available.
    pub fn encode(&self, credential: Option<&Credential>) -> Result<SignedRequest, WazirxHttpError> {
        let pairs = self
            .payload()
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()));

        if !self.is_signed() {
            return Ok(SignedRequest::Unsigned {
                canonical: canonical_query(pairs),
            });
        }

        let credential = credential.ok_or_else(|| {
            WazirxHttpError::InvalidRequest(format!(
                "credentials required for signed request to {}",
                self.endpoint
            ))
        })?;
        Ok(SignedRequest::Signed(credential.sign(pairs)))
    }
}

/// The encoded payload of one request attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignedRequest {
    Signed(SignedPayload),
    Unsigned { canonical: String },
}

impl SignedRequest {
    /// Returns the canonical string (the signing input for signed requests).
    #[must_use]
    pub fn canonical(&self) -> &str {
        match self {
            Self::Signed(payload) => &payload.canonical,
            Self::Unsigned { canonical } => canonical,
        }
    }

    /// Returns the signature, if signed.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        match self {
            Self::Signed(payload) => Some(&payload.signature),
            Self::Unsigned { .. } => None,
        }
    }

    /// Returns the exact bytes to send as query string or form body.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Signed(payload) => payload.to_query(),
            Self::Unsigned { canonical } => canonical.clone(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
