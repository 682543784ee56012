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

//! Fixed-window admission control for per-credential, per-endpoint request limits.
//!
//! Every `(credential, endpoint)` pair owns a counter that lives for one window (one second
//! by default). A request is admitted while the counter is below the endpoint limit; the
//! counter is incremented in place so the window is never extended by a steady stream of
//! requests. A ban recorded for a credential overrides every endpoint counter until it expires.

pub mod store;

use std::{sync::Arc, time::Duration};

use ustr::Ustr;

pub use self::store::{CounterUpdate, InMemoryRateLimitStore, RateLimitStore};

/// The default length of a rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Key suffix under which a credential's ban flag is stored.
pub const BAN_KEY_SUFFIX: &str = "isIpBlocked";

/// The admission decision for a single request attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The request may be sent; its endpoint counter has been incremented.
    Accepted,
    /// The endpoint limit for the current window is reached.
    RejectedEndpoint { wait: Duration },
    /// The credential is banned.
    RejectedBanned { wait: Duration },
}

impl Admission {
    /// Returns whether the request was admitted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns the time to wait before the request could be admitted.
    #[must_use]
    pub const fn wait(&self) -> Option<Duration> {
        match self {
            Self::Accepted => None,
            Self::RejectedEndpoint { wait } | Self::RejectedBanned { wait } => Some(*wait),
        }
    }
}

/// Admission control over a shared [`RateLimitStore`].
#[derive(Clone, Debug)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    namespace: Ustr,
    window: Duration,
}

impl RateLimiter {
    /// Creates a new [`RateLimiter`] storing its keys under `namespace`.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, namespace: &str) -> Self {
        Self {
            store,
            namespace: Ustr::from(namespace),
            window: DEFAULT_WINDOW,
        }
    }

    /// Overrides the window length (one second by default).
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    /// Returns the window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Returns the store key of the counter for `endpoint` under `credential_id`.
    #[must_use]
    pub fn endpoint_key(&self, credential_id: &str, endpoint: &str) -> String {
        format!("{}:{credential_id}:{endpoint}", self.namespace)
    }

    /// Returns the store key of the ban flag for `credential_id`.
    #[must_use]
    pub fn ban_key(&self, credential_id: &str) -> String {
        format!("{}:{credential_id}:{BAN_KEY_SUFFIX}", self.namespace)
    }

    /// Returns the time left on an active ban for `credential_id`.
    #[must_use]
    pub fn ban_remaining(&self, credential_id: &str) -> Option<Duration> {
        self.store.remaining_ttl(&self.ban_key(credential_id))
    }

    /// Decides whether a request to `endpoint` may be sent now.
    ///
    /// An active ban is checked first. Otherwise the endpoint counter is atomically
    /// initialized or incremented, or the request is refused once `limit_per_sec` is reached.
    pub fn admit(&self, credential_id: &str, endpoint: &str, limit_per_sec: u32) -> Admission {
        if let Some(wait) = self.ban_remaining(credential_id) {
            tracing::debug!("Request to {endpoint} refused, credential banned for {wait:?}");
            return Admission::RejectedBanned { wait };
        }

        let key = self.endpoint_key(credential_id, endpoint);
        match self
            .store
            .increment_within(&key, u64::from(limit_per_sec), self.window)
        {
            CounterUpdate::Initialized | CounterUpdate::Incremented { .. } => Admission::Accepted,
            CounterUpdate::Saturated { count, remaining } => {
                tracing::debug!(
                    "Request to {endpoint} refused, {count}/{limit_per_sec} used, window resets in {remaining:?}"
                );
                Admission::RejectedEndpoint { wait: remaining }
            }
        }
    }

    /// Records a server-side rate-limit rejection: the endpoint counter is saturated for `retry_after`.
    pub fn record_rate_limited(
        &self,
        credential_id: &str,
        endpoint: &str,
        limit_per_sec: u32,
        retry_after: Duration,
    ) {
        tracing::warn!("Rate limit exceeded on {endpoint}, backing off for {retry_after:?}");
        let key = self.endpoint_key(credential_id, endpoint);
        self.store
            .set(&key, u64::from(limit_per_sec), retry_after);
    }

    /// Records a server-side ban for `credential_id` lasting `retry_after`.
    pub fn record_ban(&self, credential_id: &str, retry_after: Duration) {
        tracing::warn!("Credential banned by server for {retry_after:?}");
        self.store.set(&self.ban_key(credential_id), 1, retry_after);
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use tokio::time::advance;

    use super::*;

    const CRED: &str = "api-key";

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(InMemoryRateLimitStore::new()), "WazirX")
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_namespaced() {
        let limiter = limiter();
        assert_eq!(
            limiter.endpoint_key(CRED, "/funds"),
            "WazirX:api-key:/funds"
        );
        assert_eq!(limiter.ban_key(CRED), "WazirX:api-key:isIpBlocked");
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_up_to_limit_then_rejects() {
        let limiter = limiter();
        assert!(limiter.admit(CRED, "/order", 2).is_accepted());
        assert!(limiter.admit(CRED, "/order", 2).is_accepted());

        advance(Duration::from_millis(100)).await;
        let admission = limiter.admit(CRED, "/order", 2);
        assert_eq!(
            admission,
            Admission::RejectedEndpoint {
                wait: Duration::from_millis(900)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_expiry() {
        let limiter = limiter();
        assert!(limiter.admit(CRED, "/funds", 1).is_accepted());
        assert!(!limiter.admit(CRED, "/funds", 1).is_accepted());

        advance(DEFAULT_WINDOW).await;
        assert!(limiter.admit(CRED, "/funds", 1).is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_endpoints_and_credentials_are_isolated() {
        let limiter = limiter();
        assert!(limiter.admit(CRED, "/funds", 1).is_accepted());
        assert!(limiter.admit(CRED, "/order", 1).is_accepted());
        assert!(limiter.admit("other-key", "/funds", 1).is_accepted());
        assert!(!limiter.admit(CRED, "/funds", 1).is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ban_supersedes_endpoint_counters() {
        let limiter = limiter();
        limiter.record_ban(CRED, Duration::from_secs(5));

        advance(Duration::from_secs(2)).await;
        assert_eq!(
            limiter.admit(CRED, "/funds", 10),
            Admission::RejectedBanned {
                wait: Duration::from_secs(3)
            }
        );
        // Rejected attempts do not consume the endpoint budget
        assert_eq!(limiter.store().get("WazirX:api-key:/funds"), None);

        advance(Duration::from_secs(4)).await;
        assert!(limiter.admit(CRED, "/funds", 10).is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ban_remaining_tracks_expiry() {
        let limiter = limiter();
        assert_eq!(limiter.ban_remaining(CRED), None);

        limiter.record_ban(CRED, Duration::from_secs(5));
        advance(Duration::from_secs(1)).await;
        assert_eq!(limiter.ban_remaining(CRED), Some(Duration::from_secs(4)));

        advance(Duration::from_secs(4)).await;
        assert_eq!(limiter.ban_remaining(CRED), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ban_is_scoped_to_credential() {
        let limiter = limiter();
        limiter.record_ban(CRED, Duration::from_secs(10));
        assert!(limiter.admit("other-key", "/funds", 1).is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_rate_limited_saturates_endpoint() {
        let limiter = limiter();
        limiter.record_rate_limited(CRED, "/ticker/24hr", 1, Duration::from_secs(2));

        let admission = limiter.admit(CRED, "/ticker/24hr", 1);
        assert_eq!(admission.wait(), Some(Duration::from_secs(2)));

        advance(Duration::from_secs(2)).await;
        assert!(limiter.admit(CRED, "/ticker/24hr", 1).is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_window() {
        let limiter = limiter().with_window(Duration::from_millis(200));
        assert_eq!(limiter.window(), Duration::from_millis(200));
        assert!(limiter.admit(CRED, "/funds", 1).is_accepted());
        assert_eq!(
            limiter.admit(CRED, "/funds", 1).wait(),
            Some(Duration::from_millis(200))
        );
    }
}
