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

//! Core constants shared across the WazirX adapter components.

use std::time::Duration;

/// Venue identifier.
pub const WAZIRX: &str = "WAZIRX";

/// Namespace prefixing every shared store and cache key.
pub const WAZIRX_KEY_NAMESPACE: &str = "WazirX";

/// Base URL of the WazirX REST API.
pub const WAZIRX_HTTP_URL: &str = "https://api.wazirx.com/sapi/v1";

pub const WAZIRX_API_KEY_HEADER: &str = "X-Api-Key";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

pub const RECV_WINDOW_FIELD: &str = "recvWindow";
pub const TIMESTAMP_FIELD: &str = "timestamp";

pub const WAZIRX_API_KEY_ENV: &str = "WAZIRX_API_KEY";
pub const WAZIRX_API_SECRET_ENV: &str = "WAZIRX_API_SECRET";
pub const WAZIRX_BASE_URL_HTTP_ENV: &str = "WAZIRX_BASE_URL_HTTP";

/// Default validity window the exchange grants a signed request, in milliseconds.
pub const DEFAULT_RECV_WINDOW_MS: u64 = 2_000;

/// Default retry budget for convenience wrappers (zero disables retrying).
pub const DEFAULT_RETRY_COUNT: u32 = 0;

/// Waits up to this long are slept through by the retrying dispatcher.
pub const SHORT_WAIT_THRESHOLD_MS: u64 = 2_000;
pub const SHORT_WAIT_THRESHOLD: Duration = Duration::from_millis(SHORT_WAIT_THRESHOLD_MS);

/// Backoff assumed for a 429 response without a `Retry-After` header.
pub const RATE_LIMIT_DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Backoff assumed for a 418 response without a `Retry-After` header.
pub const BAN_DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Longest server-issued backoff honored; exchange bans last at most three days.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Time to live of cached ticker responses.
pub const TICKER_CACHE_TTL: Duration = Duration::from_secs(5);

/// Credential identifier used for rate-limit keys when no API key is configured.
pub const PUBLIC_CREDENTIAL_ID: &str = "public";

pub const FUNDS_ENDPOINT: &str = "/funds";
pub const TICKER_ENDPOINT: &str = "/ticker/24hr";
pub const TICKERS_ENDPOINT: &str = "/tickers/24hr";
pub const ORDER_ENDPOINT: &str = "/order";

pub const FUNDS_LIMIT_PER_SEC: u32 = 1;
pub const TICKER_LIMIT_PER_SEC: u32 = 1;
pub const TICKERS_LIMIT_PER_SEC: u32 = 1;
pub const PLACE_ORDER_LIMIT_PER_SEC: u32 = 10;
pub const ORDER_STATUS_LIMIT_PER_SEC: u32 = 2;

/// Cache key of the 24h ticker for `symbol`.
#[must_use]
pub fn ticker_cache_key(symbol: &str) -> String {
    format!("{WAZIRX_KEY_NAMESPACE}:Ticker:{symbol}")
}

/// Cache key of the 24h ticker list.
#[must_use]
pub fn tickers_cache_key() -> String {
    format!("{WAZIRX_KEY_NAMESPACE}:Tickers")
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
