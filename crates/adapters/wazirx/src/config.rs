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

//! Configuration structures for the WazirX HTTP client.

use std::{fmt::Debug, time::Duration};

use serde::Deserialize;
use wazirx_core::env::{get_env_var, load_dotenv};

use crate::common::consts::{
    DEFAULT_RECV_WINDOW_MS, DEFAULT_RETRY_COUNT, SHORT_WAIT_THRESHOLD_MS, WAZIRX_API_KEY_ENV,
    WAZIRX_API_SECRET_ENV, WAZIRX_BASE_URL_HTTP_ENV, WAZIRX_HTTP_URL,
};

/// Configuration for the WazirX HTTP client.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct WazirxHttpConfig {
    /// Optional API key for signed endpoints.
    pub api_key: Option<String>,
    /// Optional API secret for signed endpoints.
    pub api_secret: Option<String>,
    /// Optional override for the REST base URL.
    pub base_url_http: Option<String>,
    /// Validity window sent as `recvWindow` with every signed request.
    pub recv_window_ms: u64,
    /// Retry budget applied by the convenience wrappers (zero disables retrying).
    pub retry_count: u32,
    /// Optional per-request timeout; defaults to the receive window.
    pub http_timeout_ms: Option<u64>,
    /// Waits up to this long are slept through when retrying.
    pub short_wait_threshold_ms: u64,
}

impl Debug for WazirxHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(WazirxHttpConfig))
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("base_url_http", &self.base_url_http)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("retry_count", &self.retry_count)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("short_wait_threshold_ms", &self.short_wait_threshold_ms)
            .finish()
    }
}

impl Default for WazirxHttpConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url_http: None,
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            retry_count: DEFAULT_RETRY_COUNT,
            http_timeout_ms: None,
            short_wait_threshold_ms: SHORT_WAIT_THRESHOLD_MS,
        }
    }
}

impl WazirxHttpConfig {
    /// Creates a configuration with the given credentials and default settings.
    #[must_use]
    pub fn with_credentials(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_secret: Some(api_secret.into()),
            ..Self::default()
        }
    }

    /// Loads a configuration from the environment (and a `.env` file when present).
    ///
    /// Reads `WAZIRX_API_KEY`, `WAZIRX_API_SECRET` and the optional `WAZIRX_BASE_URL_HTTP`.
    /// Credentials may be absent altogether, in which case only public endpoints are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if only one of the API key and secret is set.
    pub fn from_env() -> anyhow::Result<Self> {
        load_dotenv();

        let config = Self {
            api_key: get_env_var(WAZIRX_API_KEY_ENV).ok(),
            api_secret: get_env_var(WAZIRX_API_SECRET_ENV).ok(),
            base_url_http: get_env_var(WAZIRX_BASE_URL_HTTP_ENV).ok(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if only one of the API key and secret is set, or the receive window is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        match (&self.api_key, &self.api_secret) {
            (Some(_), None) => anyhow::bail!("API key set without {WAZIRX_API_SECRET_ENV}"),
            (None, Some(_)) => anyhow::bail!("API secret set without {WAZIRX_API_KEY_ENV}"),
            _ => {}
        }
        anyhow::ensure!(self.recv_window_ms > 0, "`recv_window_ms` must be positive");
        Ok(())
    }

    /// Returns `true` when both the API key and secret are configured.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }

    /// Returns the REST base URL, considering overrides.
    #[must_use]
    pub fn http_url(&self) -> String {
        self.base_url_http
            .clone()
            .unwrap_or_else(|| WAZIRX_HTTP_URL.to_string())
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms.unwrap_or(self.recv_window_ms))
    }

    /// Returns the short-wait threshold.
    #[must_use]
    pub const fn short_wait_threshold(&self) -> Duration {
        Duration::from_millis(self.short_wait_threshold_ms)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_defaults() {
        let config = WazirxHttpConfig::default();
        assert_eq!(config.http_url(), WAZIRX_HTTP_URL);
        assert_eq!(config.recv_window_ms, 2_000);
        assert_eq!(config.retry_count, 0);
        assert_eq!(config.http_timeout(), Duration::from_millis(2_000));
        assert_eq!(config.short_wait_threshold(), Duration::from_millis(2_000));
        assert!(!config.has_credentials());
    }

    #[rstest]
    fn test_timeout_override() {
        let config = WazirxHttpConfig {
            http_timeout_ms: Some(500),
            ..WazirxHttpConfig::default()
        };
        assert_eq!(config.http_timeout(), Duration::from_millis(500));
    }

    #[rstest]
    fn test_half_configured_credentials_are_rejected() {
        let config = WazirxHttpConfig {
            api_key: Some("key".to_string()),
            ..WazirxHttpConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(WazirxHttpConfig::with_credentials("k", "s").validate().is_ok());
    }

    #[rstest]
    fn test_deserializes_partial_json() {
        let config: WazirxHttpConfig =
            serde_json::from_str(r#"{"api_key":"k","api_secret":"s","retry_count":3}"#).unwrap();
        assert!(config.has_credentials());
        assert_eq!(config.retry_count, 3);
        assert_eq!(config.recv_window_ms, DEFAULT_RECV_WINDOW_MS);
    }

    #[rstest]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", WazirxHttpConfig::with_credentials("k", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
