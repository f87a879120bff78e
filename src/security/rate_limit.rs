//! Fixed-window admission control.
//!
//! One [`WindowRecord`] per client key. A window opens on the first request
//! from a key (or the first one after the previous window expired) and counts
//! every admitted request until `reset_time`. Expiry is evaluated lazily on
//! access; [`AdmissionController::sweep_expired`] only reclaims memory.
//!
//! # Concurrency
//! Check-and-increment for a key runs under the map shard's write lock, so
//! two requests for the same key can never both observe `count < max` and
//! overshoot the limit. Different keys only contend when they hash to the
//! same shard.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::config::validation::MAX_WINDOW_MS;
use crate::config::RateLimitConfig;

/// Request count for one client in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowRecord {
    /// Requests counted in this window. Starts at 1.
    pub count: u32,
    /// Instant the window ends.
    pub reset_time: DateTime<Utc>,
}

impl WindowRecord {
    fn open(now: DateTime<Utc>, window: TimeDelta) -> Self {
        Self {
            count: 1,
            reset_time: now + window,
        }
    }

    /// A window is live up to and including its reset instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_time
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub admit: bool,
    /// Requests left in the window after this one. Always 0 on rejection.
    pub remaining: u32,
    /// Reset instant of the window this decision was evaluated against.
    pub reset_time: DateTime<Utc>,
}

/// Per-process admission controller.
#[derive(Debug)]
pub struct AdmissionController {
    records: DashMap<String, WindowRecord>,
    window: TimeDelta,
    max_requests: u32,
}

impl AdmissionController {
    /// Create a controller. `window_ms` is capped at one day.
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        let window_ms = window_ms.min(MAX_WINDOW_MS) as i64;
        Self {
            records: DashMap::new(),
            window: TimeDelta::milliseconds(window_ms),
            max_requests,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.window_ms, config.max_requests)
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Decide whether a request from `key` at `now` is admitted.
    ///
    /// Rejections leave the stored record untouched.
    pub fn evaluate(&self, key: &str, now: DateTime<Utc>) -> Decision {
        match self.records.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired(now) {
                    *record = WindowRecord::open(now, self.window);
                    return self.opened(record);
                }

                if record.count >= self.max_requests {
                    return Decision {
                        admit: false,
                        remaining: 0,
                        reset_time: record.reset_time,
                    };
                }

                record.count += 1;
                Decision {
                    admit: true,
                    remaining: self.max_requests - record.count,
                    reset_time: record.reset_time,
                }
            }
            Entry::Vacant(vacant) => {
                let record = vacant.insert(WindowRecord::open(now, self.window));
                self.opened(&record)
            }
        }
    }

    fn opened(&self, record: &WindowRecord) -> Decision {
        Decision {
            admit: true,
            remaining: self.max_requests.saturating_sub(1),
            reset_time: record.reset_time,
        }
    }

    /// Live record for `key`, if any.
    pub fn peek(&self, key: &str, now: DateTime<Utc>) -> Option<WindowRecord> {
        self.records
            .get(key)
            .map(|record| *record)
            .filter(|record| !record.is_expired(now))
    }

    /// Drop records whose window ended more than `grace` before `now`.
    ///
    /// Returns the number of records removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>, grace: TimeDelta) -> usize {
        let mut evicted = 0;
        self.records.retain(|_, record| {
            let keep = record.reset_time + grace >= now;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Number of stored records, expired or not.
    pub fn tracked_keys(&self) -> usize {
        self.records.len()
    }
}
