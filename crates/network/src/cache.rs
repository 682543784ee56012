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

//! Short-lived response caches for market data.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;

use crate::ttl::TtlMap;

/// A string cache whose entries expire after a time to live.
#[async_trait]
pub trait ResponseCache: Send + Sync + Debug {
    /// Returns the cached value at `key`.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Caches `value` at `key` for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()>;
}

/// An in-process [`ResponseCache`].
#[derive(Debug, Default)]
pub struct InMemoryResponseCache {
    entries: TtlMap<String>,
}

impl InMemoryResponseCache {
    /// Creates a new empty [`InMemoryResponseCache`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()> {
        self.entries.set(key, value, Some(ttl));
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use self::redis_cache::RedisResponseCache;

#[cfg(feature = "redis")]
mod redis_cache {
    use std::{fmt::Debug, time::Duration};

    use async_trait::async_trait;
    use redis::{AsyncCommands, aio::ConnectionManager};

    use super::ResponseCache;

    /// A Redis backed [`ResponseCache`] shared across processes.
    ///
    /// Values are written with `SET key value EX ttl`.
    #[derive(Clone)]
    pub struct RedisResponseCache {
        con: ConnectionManager,
    }

    impl Debug for RedisResponseCache {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct(stringify!(RedisResponseCache)).finish()
        }
    }

    impl RedisResponseCache {
        /// Connects to the Redis server at `url`, e.g. `redis://127.0.0.1:6379`.
        ///
        /// # Errors
        ///
        /// Returns an error if the URL is invalid or the connection cannot be established.
        pub async fn connect(url: &str) -> anyhow::Result<Self> {
            let client = redis::Client::open(url)?;
            let con = ConnectionManager::new(client).await?;
            tracing::debug!("Connected to Redis response cache");
            Ok(Self { con })
        }
    }

    #[async_trait]
    impl ResponseCache for RedisResponseCache {
        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            let mut con = self.con.clone();
            let value: Option<String> = con.get(key).await?;
            Ok(value)
        }

        async fn set(&self, key: &str, value: String, ttl: Duration) -> anyhow::Result<()> {
            let mut con = self.con.clone();
            // EX takes whole seconds and rejects zero
            let seconds = ttl.as_secs().max(1);
            let _: () = con.set_ex(key, value, seconds).await?;
            Ok(())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use tokio::time::advance;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_in_memory_cache_round_trip() {
        let cache = InMemoryResponseCache::new();
        assert_eq!(cache.get("WazirX:Tickers").await.unwrap(), None);

        cache
            .set("WazirX:Tickers", "[]".to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(
            cache.get("WazirX:Tickers").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_memory_cache_expires() {
        let cache = InMemoryResponseCache::new();
        cache
            .set("k", "v".to_string(), Duration::from_secs(5))
            .await
            .unwrap();

        advance(Duration::from_millis(4_999)).await;
        assert!(cache.get("k").await.unwrap().is_some());

        advance(Duration::from_millis(1)).await;
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
