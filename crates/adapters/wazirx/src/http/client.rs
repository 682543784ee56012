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

//! Provides the HTTP client integration for the WazirX REST API.
//!
//! [`WazirxHttpInnerClient`] owns request dispatch: admission control, signing, transport and
//! error classification, with or without a retry budget. [`WazirxHttpClient`] layers typed
//! endpoint wrappers and short-lived market data caching on top.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use wazirx_core::{AtomicClock, get_atomic_clock_realtime};
use wazirx_network::{
    cache::{InMemoryResponseCache, ResponseCache},
    http::{HttpClient, HttpRequest, HttpResponse, HttpTransport, Method, StatusCode},
    ratelimiter::{Admission, InMemoryRateLimitStore, RateLimitStore, RateLimiter},
};

use super::{
    error::{DispatchFailure, WazirxHttpError, classify},
    models::{WazirxFund, WazirxOrder, WazirxPlaceOrderParams, WazirxTicker},
    request::RequestSpec,
};
use crate::{
    common::{
        consts::{
            BAN_DEFAULT_RETRY_AFTER, CONTENT_TYPE_HEADER, FORM_CONTENT_TYPE, FUNDS_ENDPOINT,
            FUNDS_LIMIT_PER_SEC, ORDER_ENDPOINT, ORDER_STATUS_LIMIT_PER_SEC,
            PLACE_ORDER_LIMIT_PER_SEC, PUBLIC_CREDENTIAL_ID, RATE_LIMIT_DEFAULT_RETRY_AFTER,
            TICKER_CACHE_TTL, TICKER_ENDPOINT, TICKER_LIMIT_PER_SEC, TICKERS_ENDPOINT,
            TICKERS_LIMIT_PER_SEC, WAZIRX_API_KEY_HEADER, WAZIRX_KEY_NAMESPACE, ticker_cache_key,
            tickers_cache_key,
        },
        credential::Credential,
    },
    config::WazirxHttpConfig,
};

/// Dispatches requests to the WazirX REST API.
///
/// Rate-limit and ban state lives in the injected [`RateLimitStore`], so every client sharing
/// a store observes the same limits.
#[derive(Debug)]
pub struct WazirxHttpInnerClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    rate_limiter: RateLimiter,
    credential: Option<Credential>,
    recv_window_ms: u64,
    short_wait_threshold: Duration,
    clock: &'static AtomicClock,
}

impl WazirxHttpInnerClient {
    /// Creates a new [`WazirxHttpInnerClient`].
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::Config`] if the configuration is inconsistent.
    pub fn new(
        config: &WazirxHttpConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn RateLimitStore>,
    ) -> Result<Self, WazirxHttpError> {
        config
            .validate()
            .map_err(|e| WazirxHttpError::Config(e.to_string()))?;

        let credential = match (&config.api_key, &config.api_secret) {
            (Some(api_key), Some(api_secret)) => {
                Some(Credential::new(api_key.as_str(), api_secret.as_str()))
            }
            _ => None,
        };

        Ok(Self {
            base_url: config.http_url().trim_end_matches('/').to_string(),
            transport,
            rate_limiter: RateLimiter::new(store, WAZIRX_KEY_NAMESPACE),
            credential,
            recv_window_ms: config.recv_window_ms,
            short_wait_threshold: config.short_wait_threshold(),
            clock: get_atomic_clock_realtime(),
        })
    }

    /// Returns the REST base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured `recvWindow` in milliseconds.
    #[must_use]
    pub const fn recv_window_ms(&self) -> u64 {
        self.recv_window_ms
    }

    /// Returns the rate limiter shared by every dispatch.
    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Returns the identifier rate-limit keys are scoped to: the API key, or `public`.
    #[must_use]
    pub fn credential_id(&self) -> &str {
        self.credential
            .as_ref()
            .map_or(PUBLIC_CREDENTIAL_ID, |credential| credential.api_key().as_str())
    }

    /// Sends `spec` once.
    ///
    /// Requests refused by the local rate limiter fail without reaching the network. A 429 or
    /// 418 response is recorded in the shared store before the typed error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::InvalidRequest`] for malformed requests,
    /// [`WazirxHttpError::RateLimitExceeded`] or [`WazirxHttpError::Banned`] when refused,
    /// and the classified error for any failed exchange.
    pub async fn send(&self, mut spec: RequestSpec) -> Result<HttpResponse, WazirxHttpError> {
        self.check_request(&spec)?;

        match self
            .rate_limiter
            .admit(self.credential_id(), &spec.endpoint, spec.limit_per_sec)
        {
            Admission::Accepted => {}
            Admission::RejectedEndpoint { wait } => {
                return Err(WazirxHttpError::RateLimitExceeded {
                    endpoint: spec.endpoint,
                    retry_after: wait,
                });
            }
            Admission::RejectedBanned { wait } => {
                return Err(WazirxHttpError::Banned { retry_after: wait });
            }
        }

        let request = self.build_request(&mut spec)?;
        match self.dispatch(&spec, request).await {
            Ok(response) => Ok(response),
            Err(failure) => Err(self.handle_failure(&spec, failure)),
        }
    }

    /// Sends `spec`, absorbing short waits, timeouts and server-side limits up to `retry_budget`
    /// attempts.
    ///
    /// Waiting on a ban or a saturated endpoint does not consume budget; waits longer than the
    /// short-wait threshold fail immediately. A timeout consumes one unit of budget, as does a
    /// 429 or 418 response while more than one unit remains.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::RetryBudgetExhausted`] once the budget reaches zero (a zero
    /// budget never touches the network), [`WazirxHttpError::Banned`] or
    /// [`WazirxHttpError::RateLimitExceeded`] for long waits, and the classified error for any
    /// failure that is not retried.
    pub async fn send_with_retry(
        &self,
        mut spec: RequestSpec,
        retry_budget: u32,
    ) -> Result<HttpResponse, WazirxHttpError> {
        self.check_request(&spec)?;

        let mut budget = retry_budget;
        loop {
            if budget == 0 {
                tracing::warn!("Retry budget exhausted for {}", spec.endpoint);
                return Err(WazirxHttpError::RetryBudgetExhausted {
                    endpoint: spec.endpoint,
                });
            }

            match self
                .rate_limiter
                .admit(self.credential_id(), &spec.endpoint, spec.limit_per_sec)
            {
                Admission::Accepted => {}
                Admission::RejectedBanned { wait } => {
                    if wait > self.short_wait_threshold {
                        return Err(WazirxHttpError::Banned { retry_after: wait });
                    }
                    tracing::debug!("Banned, waiting {wait:?} before retrying {}", spec.endpoint);
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Admission::RejectedEndpoint { wait } => {
                    if wait > self.short_wait_threshold {
                        return Err(WazirxHttpError::RateLimitExceeded {
                            endpoint: spec.endpoint,
                            retry_after: wait,
                        });
                    }
                    tracing::debug!(
                        "Rate limited, waiting {wait:?} before retrying {}",
                        spec.endpoint
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }
            }

            let request = self.build_request(&mut spec)?;
            let failure = match self.dispatch(&spec, request).await {
                Ok(response) => return Ok(response),
                Err(failure) => failure,
            };

            if failure.is_timeout() {
                budget -= 1;
                tracing::warn!("Timeout on {}, {budget} attempt(s) left", spec.endpoint);
                spec.strip_volatile();
                continue;
            }

            let server_limited = failure.status().is_some_and(|status| {
                status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT
            });
            if server_limited && budget > 1 {
                self.record_server_limits(&spec, &failure);
                budget -= 1;
                spec.strip_volatile();
                continue;
            }

            return Err(self.handle_failure(&spec, failure));
        }
    }

    fn check_request(&self, spec: &RequestSpec) -> Result<(), WazirxHttpError> {
        spec.validate()?;
        if spec.is_signed() && self.credential.is_none() {
            return Err(WazirxHttpError::InvalidRequest(format!(
                "credentials required for signed request to {}",
                spec.endpoint
            )));
        }
        Ok(())
    }

    /// Injects fresh volatile fields and builds the wire request.
    fn build_request(&self, spec: &mut RequestSpec) -> Result<HttpRequest, WazirxHttpError> {
        spec.inject_volatile(self.clock.get_time_ms());
        let payload = spec.encode(self.credential.as_ref())?.to_wire();
        let url = format!("{}{}", self.base_url, spec.endpoint);

        let mut request = if spec.method == Method::GET {
            if payload.is_empty() {
                HttpRequest::new(Method::GET, url)
            } else {
                HttpRequest::new(Method::GET, format!("{url}?{payload}"))
            }
        } else {
            HttpRequest::new(spec.method.clone(), url)
                .with_header(CONTENT_TYPE_HEADER, FORM_CONTENT_TYPE)
                .with_body(payload)
        };

        if let Some(credential) = &self.credential {
            request = request.with_header(WAZIRX_API_KEY_HEADER, credential.api_key().as_str());
        }
        Ok(request)
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
        request: HttpRequest,
    ) -> Result<HttpResponse, DispatchFailure> {
        tracing::debug!("{} {}", spec.method, spec.endpoint);

        match self.transport.send(request).await {
            Ok(response) if response.status.is_success() => Ok(response),
            Ok(response) => {
                tracing::debug!(
                    "{} {} failed with {}",
                    spec.method,
                    spec.endpoint,
                    response.status
                );
                Err(DispatchFailure::Status(response))
            }
            Err(e) => {
                tracing::debug!("{} {} failed: {e}", spec.method, spec.endpoint);
                Err(DispatchFailure::Transport(e))
            }
        }
    }

    fn handle_failure(&self, spec: &RequestSpec, failure: DispatchFailure) -> WazirxHttpError {
        self.record_server_limits(spec, &failure);
        classify(&spec.endpoint, failure)
    }

    /// Records a 429 as a saturated endpoint window and a 418 as a credential ban.
    fn record_server_limits(&self, spec: &RequestSpec, failure: &DispatchFailure) {
        let Some(status) = failure.status() else {
            return;
        };

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = failure
                .retry_after()
                .unwrap_or(RATE_LIMIT_DEFAULT_RETRY_AFTER);
            self.rate_limiter.record_rate_limited(
                self.credential_id(),
                &spec.endpoint,
                spec.limit_per_sec,
                retry_after,
            );
        } else if status == StatusCode::IM_A_TEAPOT {
            let retry_after = failure.retry_after().unwrap_or(BAN_DEFAULT_RETRY_AFTER);
            self.rate_limiter.record_ban(self.credential_id(), retry_after);
        }
    }
}

/// Provides a higher-level HTTP client for the WazirX REST API.
///
/// Cloning is cheap; clones share the dispatcher, its rate-limit state and the response cache.
#[derive(Clone, Debug)]
pub struct WazirxHttpClient {
    inner: Arc<WazirxHttpInnerClient>,
    cache: Arc<dyn ResponseCache>,
    retry_count: u32,
}

impl WazirxHttpClient {
    /// Creates a new [`WazirxHttpClient`] with in-memory rate-limit state and response cache.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::Config`] if the configuration is inconsistent or the HTTP
    /// client cannot be built.
    pub fn new(config: &WazirxHttpConfig) -> Result<Self, WazirxHttpError> {
        let transport = HttpClient::new(&HashMap::new(), Some(config.http_timeout()))
            .map_err(|e| WazirxHttpError::Config(e.to_string()))?;

        Self::with_components(
            config,
            Arc::new(transport),
            Arc::new(InMemoryRateLimitStore::new()),
            Arc::new(InMemoryResponseCache::new()),
        )
    }

    /// Creates a new [`WazirxHttpClient`] configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::Config`] if the environment holds an inconsistent configuration.
    pub fn from_env() -> Result<Self, WazirxHttpError> {
        let config =
            WazirxHttpConfig::from_env().map_err(|e| WazirxHttpError::Config(e.to_string()))?;
        Self::new(&config)
    }

    /// Creates a new [`WazirxHttpClient`] from explicit components.
    ///
    /// Sharing `store` between clients makes them observe each other's limits and bans.
    ///
    /// # Errors
    ///
    /// Returns [`WazirxHttpError::Config`] if the configuration is inconsistent.
    pub fn with_components(
        config: &WazirxHttpConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn RateLimitStore>,
        cache: Arc<dyn ResponseCache>,
    ) -> Result<Self, WazirxHttpError> {
        let inner = WazirxHttpInnerClient::new(config, transport, store)?;
        Ok(Self {
            inner: Arc::new(inner),
            cache,
            retry_count: config.retry_count,
        })
    }

    /// Returns the underlying dispatcher.
    #[must_use]
    pub fn inner(&self) -> &WazirxHttpInnerClient {
        &self.inner
    }

    /// Sends `spec`, retrying when the effective retry count is positive.
    ///
    /// `retry_count` overrides the configured default for this call.
    ///
    /// # Errors
    ///
    /// Returns the error of [`WazirxHttpInnerClient::send`] or
    /// [`WazirxHttpInnerClient::send_with_retry`].
    pub async fn execute(
        &self,
        spec: RequestSpec,
        retry_count: Option<u32>,
    ) -> Result<HttpResponse, WazirxHttpError> {
        match retry_count.unwrap_or(self.retry_count) {
            0 => self.inner.send(spec).await,
            budget => self.inner.send_with_retry(spec, budget).await,
        }
    }

    /// Requests the account balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_funds(
        &self,
        retry_count: Option<u32>,
    ) -> Result<Vec<WazirxFund>, WazirxHttpError> {
        let spec = self.spec(Method::GET, FUNDS_ENDPOINT, FUNDS_LIMIT_PER_SEC);
        self.execute_json(spec, retry_count).await
    }

    /// Requests the 24 hour ticker for `symbol`, served from cache for a few seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_ticker(
        &self,
        symbol: &str,
        retry_count: Option<u32>,
    ) -> Result<WazirxTicker, WazirxHttpError> {
        let spec = self
            .spec(Method::GET, TICKER_ENDPOINT, TICKER_LIMIT_PER_SEC)
            .with_param("symbol", symbol)
            .public();
        self.cached_json(&ticker_cache_key(symbol), spec, retry_count)
            .await
    }

    /// Requests the 24 hour tickers of every market, served from cache for a few seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_tickers(
        &self,
        retry_count: Option<u32>,
    ) -> Result<Vec<WazirxTicker>, WazirxHttpError> {
        let spec = self
            .spec(Method::GET, TICKERS_ENDPOINT, TICKERS_LIMIT_PER_SEC)
            .public();
        self.cached_json(&tickers_cache_key(), spec, retry_count)
            .await
    }

    /// Places an order. Order placement is never retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn place_order(
        &self,
        params: &WazirxPlaceOrderParams,
    ) -> Result<WazirxOrder, WazirxHttpError> {
        let spec = params.to_fields().into_iter().fold(
            self.spec(Method::POST, ORDER_ENDPOINT, PLACE_ORDER_LIMIT_PER_SEC),
            |spec, (key, value)| spec.with_body_field(key, value),
        );
        let response = self.inner.send(spec).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Requests the status of the order placed with `client_order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_order_status(
        &self,
        client_order_id: &str,
        retry_count: Option<u32>,
    ) -> Result<WazirxOrder, WazirxHttpError> {
        let spec = self
            .spec(Method::GET, ORDER_ENDPOINT, ORDER_STATUS_LIMIT_PER_SEC)
            .with_param("clientOrderId", client_order_id);
        self.execute_json(spec, retry_count).await
    }

    fn spec(&self, method: Method, endpoint: &str, limit_per_sec: u32) -> RequestSpec {
        RequestSpec::new(method, endpoint)
            .with_limit(limit_per_sec)
            .with_recv_window(self.inner.recv_window_ms())
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
        retry_count: Option<u32>,
    ) -> Result<T, WazirxHttpError> {
        let response = self.execute(spec, retry_count).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Serves `key` from the response cache, falling back to the exchange on a miss.
    ///
    /// Cache failures are logged and otherwise ignored.
    async fn cached_json<T: DeserializeOwned>(
        &self,
        key: &str,
        spec: RequestSpec,
        retry_count: Option<u32>,
    ) -> Result<T, WazirxHttpError> {
        match self.cache.get(key).await {
            Ok(Some(cached)) => match serde_json::from_str(&cached) {
                Ok(value) => return Ok(value),
                Err(e) => tracing::warn!("Discarding unreadable cache entry {key}: {e}"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read cache entry {key}: {e}"),
        }

        let response = self.execute(spec, retry_count).await?;
        let value = serde_json::from_slice(&response.body)?;

        if let Err(e) = self
            .cache
            .set(key, response.body_text().into_owned(), TICKER_CACHE_TTL)
            .await
        {
            tracing::warn!("Failed to write cache entry {key}: {e}");
        }
        Ok(value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
