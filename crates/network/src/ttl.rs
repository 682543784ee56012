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

//! A concurrent key-value map whose entries expire after a time to live.
//!
//! Expiry is measured with [`tokio::time::Instant`], so tests running on a paused tokio
//! clock can advance time deterministically. Expired entries are evicted lazily on access,
//! or eagerly through [`TtlMap::purge_expired`].

use std::time::Duration;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::time::Instant;

/// Upper bound on any single time to live, keeping deadlines representable.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Clone, Debug)]
struct TtlEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> TtlEntry<V> {
    fn new(value: V, ttl: Option<Duration>, now: Instant) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl.min(MAX_TTL))),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|t| t > now)
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|t| t.saturating_duration_since(now))
    }
}

/// The write applied by [`TtlMap::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update<V> {
    /// Leave the entry untouched.
    Keep,
    /// Replace the value of a live entry, preserving its current expiry.
    KeepExpiry(V),
    /// Replace the entry, starting a fresh time to live (`None` never expires).
    Replace { value: V, ttl: Option<Duration> },
}

/// A concurrent map of values with per-entry expiry.
#[derive(Debug)]
pub struct TtlMap<V> {
    entries: DashMap<String, TtlEntry<V>>,
}

impl<V> Default for TtlMap<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V: Clone> TtlMap<V> {
    /// Creates a new empty [`TtlMap`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the live value at `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    /// Inserts `value` at `key`, replacing any existing entry and its expiry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let entry = TtlEntry::new(value, ttl, Instant::now());
        self.entries.insert(key.into(), entry);
    }

    /// Returns the instant at which the live entry at `key` expires.
    ///
    /// Returns `None` when the key is absent, expired, or has no expiry.
    #[must_use]
    pub fn expires_at(&self, key: &str) -> Option<Instant> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
    }

    /// Returns the remaining time to live of the live entry at `key`.
    #[must_use]
    pub fn remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.remaining(now))
    }

    /// Atomically reads the entry at `key` and applies the [`Update`] returned by `f`.
    ///
    /// `f` receives the live value and its remaining time to live, or `None` when the key is
    /// absent or expired. The shard holding `key` stays write-locked for the duration of `f`,
    /// so concurrent updates to the same key are serialized.
    pub fn update<R, F>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(Option<(&V, Option<Duration>)>) -> (Update<V>, R),
    {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let live = occupied.get().is_live(now);
                let (update, result) = if live {
                    let entry = occupied.get();
                    f(Some((&entry.value, entry.remaining(now))))
                } else {
                    f(None)
                };

                match update {
                    Update::Keep | Update::KeepExpiry(_) if !live => {
                        occupied.remove();
                    }
                    Update::Keep => {}
                    Update::KeepExpiry(value) => occupied.get_mut().value = value,
                    Update::Replace { value, ttl } => {
                        occupied.insert(TtlEntry::new(value, ttl, now));
                    }
                }
                result
            }
            Entry::Vacant(vacant) => {
                let (update, result) = f(None);
                if let Update::Replace { value, ttl } = update {
                    vacant.insert(TtlEntry::new(value, ttl, now));
                }
                result
            }
        }
    }

    /// Removes the entry at `key`, returning its value if it was live.
    pub fn remove(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(_, entry)| entry.value)
    }

    /// Evicts every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Returns the number of stored entries, including expired entries not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
