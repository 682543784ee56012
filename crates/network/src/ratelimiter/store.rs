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

//! Storage capability backing rate-limit counters and ban flags.

use std::{fmt::Debug, time::Duration};

use tokio::time::Instant;

use crate::ttl::{TtlMap, Update};

/// Outcome of an atomic [`RateLimitStore::increment_within`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterUpdate {
    /// No live counter existed; a new one was created at 1 with a fresh window.
    Initialized,
    /// The live counter was below the limit and has been incremented, keeping its expiry.
    Incremented { count: u64 },
    /// The live counter had reached the limit and was left untouched.
    Saturated { count: u64, remaining: Duration },
}

impl CounterUpdate {
    /// Returns whether the increment was applied.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        !matches!(self, Self::Saturated { .. })
    }
}

/// A time-to-live key-value store for rate-limit bookkeeping.
///
/// Implementations must make [`RateLimitStore::increment_within`] atomic with respect to
/// other calls on the same key, otherwise concurrent callers could jointly exceed a limit.
pub trait RateLimitStore: Send + Sync + Debug {
    /// Returns the live value at `key`.
    fn get(&self, key: &str) -> Option<u64>;

    /// Sets `key` to `value`, expiring after `ttl`.
    fn set(&self, key: &str, value: u64, ttl: Duration);

    /// Returns the instant at which the live entry at `key` expires.
    fn get_ttl(&self, key: &str) -> Option<Instant>;

    /// Returns the time left until the live entry at `key` expires.
    fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        self.get_ttl(key)
            .map(|expiry| expiry.saturating_duration_since(Instant::now()))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Atomically initializes, increments or refuses the counter at `key`.
    ///
    /// - No live counter: set it to 1 with a fresh `window` expiry.
    /// - Live counter below `limit`: increment it, preserving the existing expiry.
    /// - Live counter at or above `limit`: leave it and report the remaining window.
    fn increment_within(&self, key: &str, limit: u64, window: Duration) -> CounterUpdate;
}

/// An in-process [`RateLimitStore`] backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: TtlMap<u64>,
}

impl InMemoryRateLimitStore {
    /// Creates a new empty [`InMemoryRateLimitStore`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts expired counters and bans.
    pub fn purge_expired(&self) {
        self.entries.purge_expired();
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key)
    }

    fn set(&self, key: &str, value: u64, ttl: Duration) {
        self.entries.set(key, value, Some(ttl));
    }

    fn get_ttl(&self, key: &str) -> Option<Instant> {
        self.entries.expires_at(key)
    }

    fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        self.entries
            .remaining(key)
            .filter(|remaining| !remaining.is_zero())
    }

    fn increment_within(&self, key: &str, limit: u64, window: Duration) -> CounterUpdate {
        self.entries.update(key, |current| match current {
            None => (
                Update::Replace {
                    value: 1,
                    ttl: Some(window),
                },
                CounterUpdate::Initialized,
            ),
            Some((&count, _)) if count < limit => (
                Update::KeepExpiry(count + 1),
                CounterUpdate::Incremented { count: count + 1 },
            ),
            Some((&count, remaining)) => (
                Update::Keep,
                CounterUpdate::Saturated {
                    count,
                    remaining: remaining.unwrap_or(window),
                },
            ),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
