// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window admission gate for contact submissions.
//!
//! Each source address owns an ordered list of admission timestamps.
//! Entries older than the window are pruned on every check; a source is
//! admitted while fewer than `max_submissions` entries remain. Rejected
//! attempts are not recorded.
//!
//! Memory stays bounded: `sweep` drops sources whose entries have all aged
//! out, and the table evicts the least recently admitted source once
//! `max_tracked_sources` is reached.

use crate::config::RateLimitConfig;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of "now" for the gate.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Submission may proceed
    Admitted {
        /// Admissions left for this source in the current window
        remaining: u32,
    },
    /// Quota exhausted
    Rejected {
        /// Time until the oldest in-window admission expires
        retry_after: Duration,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// Admission timestamps recorded for one source.
#[derive(Debug, Default)]
struct RateWindow {
    admissions: Vec<DateTime<Utc>>,
}

impl RateWindow {
    /// Keep only entries strictly younger than `window`.
    fn prune(&mut self, now: DateTime<Utc>, window: TimeDelta) {
        self.admissions
            .retain(|t| now.signed_duration_since(*t) < window);
    }

    fn len(&self) -> usize {
        self.admissions.len()
    }

    fn is_empty(&self) -> bool {
        self.admissions.is_empty()
    }

    fn latest(&self) -> Option<DateTime<Utc>> {
        self.admissions.iter().max().copied()
    }

    fn retry_after(&self, now: DateTime<Utc>, window: TimeDelta) -> Duration {
        let remaining = match self.admissions.iter().min() {
            Some(oldest) => window
                .checked_sub(&now.signed_duration_since(*oldest))
                .unwrap_or(window),
            None => window,
        };
        remaining.to_std().unwrap_or(Duration::ZERO)
    }
}

/// Per-source sliding-window rate limiter.
///
/// The table is a sharded map; the prune/compare/append sequence for a
/// source runs under that entry's write lock, so concurrent submissions
/// from one address cannot both slip past the limit.
pub struct AdmissionGate {
    config: RateLimitConfig,
    window: TimeDelta,
    windows: DashMap<String, RateWindow>,
    clock: Arc<dyn Clock>,
}

impl AdmissionGate {
    /// Create a gate that reads the wall clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a gate with an injected clock.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = i64::try_from(config.window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            config,
            window,
            windows: DashMap::new(),
            clock,
        }
    }

    /// Admit `source` now. Returns `false` when its quota is exhausted.
    pub fn admit(&self, source: &str) -> bool {
        self.admit_at(source, self.clock.now())
    }

    /// Admit `source` at `now`. Returns `false` when its quota is exhausted.
    pub fn admit_at(&self, source: &str, now: DateTime<Utc>) -> bool {
        self.check_at(source, now).is_admitted()
    }

    /// Check and record an admission for `source` using the gate's clock.
    pub fn check(&self, source: &str) -> Admission {
        self.check_at(source, self.clock.now())
    }

    /// Check and record an admission for `source` at `now`.
    pub fn check_at(&self, source: &str, now: DateTime<Utc>) -> Admission {
        let limit = self.config.max_submissions;
        let source = source.trim();

        if source.is_empty() {
            if self.config.fail_open_on_missing_source {
                debug!("No source address, admitting without recording");
                return Admission::Admitted { remaining: limit };
            }
            debug!("No source address, rejecting");
            return Admission::Rejected {
                retry_after: self.config.window_duration(),
            };
        }

        if !self.windows.contains_key(source) {
            self.make_room(now);
        }

        let mut entry = self.windows.entry(source.to_string()).or_default();
        let window = entry.value_mut();
        window.prune(now, self.window);

        if window.len() >= limit as usize {
            let retry_after = window.retry_after(now, self.window);
            debug!(%source, ?retry_after, "Submission quota exhausted");
            return Admission::Rejected { retry_after };
        }

        window.admissions.push(now);
        let remaining = limit.saturating_sub(window.len() as u32);
        debug!(%source, remaining, "Submission admitted");
        Admission::Admitted { remaining }
    }

    /// Drop sources whose admissions have all aged out. Returns how many
    /// sources were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.prune(now, self.window);
            !window.is_empty()
        });
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, tracked = self.windows.len(), "Swept idle sources");
        }
        removed
    }

    /// Number of sources currently tracked.
    pub fn tracked_sources(&self) -> usize {
        self.windows.len()
    }

    /// The clock this gate reads.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Make space for one more source when the table is at capacity.
    ///
    /// The cap is soft under concurrent inserts of new sources.
    fn make_room(&self, now: DateTime<Utc>) {
        let cap = self.config.max_tracked_sources;
        if self.windows.len() < cap {
            return;
        }

        self.sweep(now);
        if self.windows.len() < cap {
            return;
        }

        let stalest = self
            .windows
            .iter()
            .min_by_key(|entry| entry.value().latest())
            .map(|entry| entry.key().clone());

        if let Some(key) = stalest {
            warn!(source = %key, cap, "Tracked source cap reached, evicting stalest source");
            self.windows.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(limit: u32, window_secs: u64) -> AdmissionGate {
        AdmissionGate::new(RateLimitConfig {
            max_submissions: limit,
            window_secs,
            ..Default::default()
        })
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let gate = gate(5, 3600);

        for t in 0..5 {
            assert!(gate.admit_at("1.2.3.4", at(t)), "attempt at t={t} should pass");
        }
        assert!(!gate.admit_at("1.2.3.4", at(5)));
        assert!(gate.admit_at("1.2.3.4", at(3601)));
    }

    #[test]
    fn test_boundary_entry_is_outside_window() {
        let gate = gate(1, 60);

        assert!(gate.admit_at("10.0.0.1", at(0)));
        assert!(!gate.admit_at("10.0.0.1", at(59)));
        assert!(gate.admit_at("10.0.0.1", at(60)));
    }

    #[test]
    fn test_rejection_is_not_recorded() {
        let gate = gate(2, 100);

        assert!(gate.admit_at("10.0.0.1", at(0)));
        assert!(gate.admit_at("10.0.0.1", at(50)));
        // Rejected attempts must not extend the window
        for t in 51..99 {
            assert!(!gate.admit_at("10.0.0.1", at(t)));
        }
        assert!(gate.admit_at("10.0.0.1", at(100)));
    }

    #[test]
    fn test_retry_after_tracks_oldest_entry() {
        let gate = gate(2, 100);

        gate.check_at("10.0.0.1", at(0));
        gate.check_at("10.0.0.1", at(30));
        match gate.check_at("10.0.0.1", at(40)) {
            Admission::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(60));
            }
            other => panic!("Should be rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_remaining_counts_down() {
        let gate = gate(3, 100);

        assert_eq!(gate.check_at("a", at(0)), Admission::Admitted { remaining: 2 });
        assert_eq!(gate.check_at("a", at(1)), Admission::Admitted { remaining: 1 });
        assert_eq!(gate.check_at("a", at(2)), Admission::Admitted { remaining: 0 });
        assert!(!gate.check_at("a", at(3)).is_admitted());
    }

    #[test]
    fn test_missing_source_fails_open() {
        let gate = gate(1, 100);

        for t in 0..10 {
            assert!(gate.admit_at("", at(t)));
            assert!(gate.admit_at("   ", at(t)));
        }
        assert_eq!(gate.tracked_sources(), 0);
    }

    #[test]
    fn test_missing_source_fails_closed_when_configured() {
        let gate = AdmissionGate::new(RateLimitConfig {
            fail_open_on_missing_source: false,
            ..Default::default()
        });

        assert!(!gate.admit_at("", at(0)));
    }

    #[test]
    fn test_sweep_drops_idle_sources() {
        let gate = gate(5, 100);

        gate.admit_at("old", at(0));
        gate.admit_at("fresh", at(90));
        assert_eq!(gate.tracked_sources(), 2);

        assert_eq!(gate.sweep(at(120)), 1);
        assert_eq!(gate.tracked_sources(), 1);
        assert!(gate.admit_at("fresh", at(121)));
    }

    #[test]
    fn test_cap_evicts_stalest_source() {
        let gate = AdmissionGate::new(RateLimitConfig {
            max_submissions: 1,
            window_secs: 1000,
            max_tracked_sources: 2,
            ..Default::default()
        });

        assert!(gate.admit_at("a", at(0)));
        assert!(gate.admit_at("b", at(10)));
        assert!(gate.admit_at("c", at(20)));
        assert_eq!(gate.tracked_sources(), 2);

        // "a" was evicted, so it starts from an empty history
        assert!(gate.admit_at("a", at(30)));
        // "c" is still tracked and saturated
        assert!(!gate.admit_at("c", at(31)));
    }
}
