//! Process-wide promotion counters.
//!
//! The evaluator and the force path bump these as badges land, races are
//! lost or saves fail. The CLI calls [`Metrics::flush`] once before exiting
//! so a run leaves one summary line in the log.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

/// Counters are `Relaxed`: they are reported, never used to order work.
pub struct Metrics {
    promotions_recorded: AtomicU64,
    forced_promotions: AtomicU64,
    races_lost: AtomicU64,
    persistence_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            promotions_recorded: AtomicU64::new(0),
            forced_promotions: AtomicU64::new(0),
            races_lost: AtomicU64::new(0),
            persistence_failures: AtomicU64::new(0),
        }
    }

    /// A badge list was inserted, automatically or manually.
    pub fn inc_promotions_recorded(&self) {
        self.promotions_recorded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "promotions_recorded", "counter incremented");
    }

    /// A forced promotion inserted a manual badge list.
    pub fn inc_forced(&self) {
        self.forced_promotions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "forced_promotions", "counter incremented");
    }

    /// `try_add` found the criterion already recorded by a concurrent caller.
    pub fn inc_races_lost(&self) {
        self.races_lost.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "races_lost", "counter incremented");
    }

    pub fn inc_persistence_failures(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "persistence_failures", "counter incremented");
    }

    pub fn flush(&self) {
        tracing::info!(
            metric = "promotion_summary",
            promotions_recorded = self.promotions_recorded(),
            forced_promotions = self.forced_promotions(),
            races_lost = self.races_lost(),
            persistence_failures = self.persistence_failures(),
        );
    }

    pub fn promotions_recorded(&self) -> u64 {
        self.promotions_recorded.load(Ordering::Relaxed)
    }

    pub fn forced_promotions(&self) -> u64 {
        self.forced_promotions.load(Ordering::Relaxed)
    }

    pub fn races_lost(&self) -> u64 {
        self.races_lost.load(Ordering::Relaxed)
    }

    pub fn persistence_failures(&self) -> u64 {
        self.persistence_failures.load(Ordering::Relaxed)
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.promotions_recorded.store(0, Ordering::Relaxed);
        self.forced_promotions.store(0, Ordering::Relaxed);
        self.races_lost.store(0, Ordering::Relaxed);
        self.persistence_failures.store(0, Ordering::Relaxed);
    }
}
