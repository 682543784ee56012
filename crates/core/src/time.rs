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

//! Atomic realtime clock producing strictly increasing UNIX millisecond timestamps.
//!
//! Exchange APIs reject a signed request whose `timestamp` does not advance. Two requests
//! issued within the same millisecond (for example a retry fired straight after a timeout)
//! would otherwise carry identical timestamps, so [`AtomicClock`] bumps the value by one
//! millisecond whenever the wall clock has not moved past the last issued value.

use std::{
    fmt::Debug,
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::Utc;

static ATOMIC_CLOCK_REALTIME: OnceLock<AtomicClock> = OnceLock::new();

/// Returns a static reference to the global realtime [`AtomicClock`].
#[must_use]
pub fn get_atomic_clock_realtime() -> &'static AtomicClock {
    ATOMIC_CLOCK_REALTIME.get_or_init(AtomicClock::new)
}

/// Returns the current wall clock time as UNIX epoch milliseconds.
///
/// Times before the epoch are reported as zero.
#[must_use]
pub fn unix_millis_now() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// A clock which hands out strictly increasing UNIX millisecond timestamps.
pub struct AtomicClock {
    last_ms: AtomicU64,
}

impl Debug for AtomicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(AtomicClock))
            .field("last_ms", &self.last_ms.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for AtomicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicClock {
    /// Creates a new [`AtomicClock`] which has not issued any timestamp yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_ms: AtomicU64::new(0),
        }
    }

    /// Returns the last timestamp issued by this clock (zero if none).
    #[must_use]
    pub fn last_ms(&self) -> u64 {
        self.last_ms.load(Ordering::Acquire)
    }

    /// Returns the current UNIX millisecond timestamp, strictly greater than any
    /// value previously returned by this clock.
    #[must_use]
    pub fn get_time_ms(&self) -> u64 {
        self.next_after(unix_millis_now())
    }

    fn next_after(&self, now_ms: u64) -> u64 {
        loop {
            let last = self.last_ms.load(Ordering::Acquire);
            let next = if now_ms > last { now_ms } else { last + 1 };
            if self
                .last_ms
                .compare_exchange(last, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return next;
            }
            // Lost the race to another caller, reload
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_time_is_close_to_wall_clock() {
        let clock = AtomicClock::new();
        let before = unix_millis_now();
        let ts = clock.get_time_ms();
        let after = unix_millis_now();
        assert!(ts >= before);
        assert!(ts <= after + 1);
    }

    #[rstest]
    fn test_same_millisecond_is_bumped() {
        let clock = AtomicClock::new();
        assert_eq!(clock.next_after(1_000), 1_000);
        assert_eq!(clock.next_after(1_000), 1_001);
        assert_eq!(clock.next_after(999), 1_002);
        assert_eq!(clock.next_after(2_000), 2_000);
        assert_eq!(clock.last_ms(), 2_000);
    }

    #[rstest]
    fn test_consecutive_calls_strictly_increase() {
        let clock = AtomicClock::new();
        let mut previous = clock.get_time_ms();
        for _ in 0..1_000 {
            let next = clock.get_time_ms();
            assert!(next > previous);
            previous = next;
        }
    }

    #[rstest]
    fn test_concurrent_callers_never_share_a_timestamp() {
        let clock = Arc::new(AtomicClock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = clock.clone();
                thread::spawn(move || (0..250).map(|_| clock.get_time_ms()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[rstest]
    fn test_global_clock_is_shared() {
        let a = get_atomic_clock_realtime();
        let b = get_atomic_clock_realtime();
        assert!(std::ptr::eq(a, b));

        let first = a.get_time_ms();
        assert!(b.get_time_ms() > first);
    }
}
