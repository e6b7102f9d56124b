// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for contact submissions.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Outcome label values for `portfolio_contact_submissions_total`.
pub const OUTCOME_ACCEPTED: &str = "accepted";
pub const OUTCOME_RATE_LIMITED: &str = "rate_limited";
pub const OUTCOME_INVALID: &str = "invalid";

/// Metrics owned by one service instance.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub submissions: IntCounterVec,
    pub spam: IntCounter,
    pub tracked_sources: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "portfolio_contact_submissions_total",
                "Contact submissions by outcome",
            ),
            &["outcome"],
        )?;
        let spam = IntCounter::new(
            "portfolio_contact_spam_total",
            "Stored contact submissions tagged as spam",
        )?;
        let tracked_sources = IntGauge::new(
            "portfolio_tracked_sources",
            "Source addresses currently tracked by the admission gate",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(spam.clone()))?;
        registry.register(Box::new(tracked_sources.clone()))?;

        Ok(Self {
            registry,
            submissions,
            spam,
            tracked_sources,
        })
    }

    pub fn record_submission(&self, outcome: &str) {
        self.submissions.with_label_values(&[outcome]).inc();
    }

    pub fn set_tracked_sources(&self, count: usize) {
        self.tracked_sources
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
