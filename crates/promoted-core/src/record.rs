//! Per-build promotion ledger.
//!
//! A [`PromotionRecord`] maps criterion names to the [`BadgeList`] that
//! proves the build achieved them. It is append-only and copy-on-write:
//!
//! - Writers serialize on a per-record mutex, build a new sequence and swap
//!   it in as a whole.
//! - Readers clone the current `Arc` and work on that snapshot. They never
//!   wait for a writer's duplicate check or copy and never see a partially
//!   built list. Reads are not lock-free: `list` takes a read lock and can
//!   wait briefly while a writer swaps the pointer.
//!
//! # Invariants
//!
//! At most one `BadgeList` per distinct criterion name. Insertion order is
//! promotion order. Entries are never removed or replaced.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::badge::BadgeList;
use crate::domain::config::ProjectPromotionConfig;
use crate::domain::criterion::Criterion;

/// Append-only set of achieved promotions for one build.
#[derive(Debug)]
pub struct PromotionRecord {
    snapshot: RwLock<Arc<[BadgeList]>>,
    write: Mutex<()>,
}

impl Default for PromotionRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PromotionRecord {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::from(Vec::new())),
            write: Mutex::new(()),
        }
    }

    /// Restore a record from its persisted lists. Only the first list per
    /// criterion name is kept.
    pub fn from_lists(lists: Vec<BadgeList>) -> Self {
        let mut kept: Vec<BadgeList> = Vec::with_capacity(lists.len());
        for list in lists {
            if kept.iter().any(|k| k.criterion == list.criterion) {
                tracing::warn!(criterion = %list.criterion, "dropping duplicate persisted badge list");
                continue;
            }
            kept.push(list);
        }
        Self {
            snapshot: RwLock::new(Arc::from(kept)),
            write: Mutex::new(()),
        }
    }

    /// Immutable view of every promotion recorded before this call.
    pub fn list(&self) -> Arc<[BadgeList]> {
        // The guarded value is a single pointer that is only ever replaced
        // whole, so a poisoned lock still holds a consistent snapshot.
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Whether a badge list for `criterion` has been recorded.
    pub fn has_achieved(&self, criterion: &str) -> bool {
        self.list().iter().any(|l| l.is_for(criterion))
    }

    /// Insert `badges` unless its criterion is already recorded.
    ///
    /// Returns `true` for the single caller that inserted; every other
    /// caller racing on the same criterion gets `false` and changes nothing.
    pub fn try_add(&self, badges: BadgeList) -> bool {
        let _writer = self.write.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.list();
        if current.iter().any(|l| l.criterion == badges.criterion) {
            return false;
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(badges);

        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(next);
        true
    }

    /// Criteria of `config` not yet achieved, in config order.
    pub fn pending_criteria(&self, config: &ProjectPromotionConfig) -> Vec<Arc<Criterion>> {
        let achieved = self.list();
        config
            .criteria()
            .iter()
            .filter(|c| !achieved.iter().any(|l| l.is_for(c.name())))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }
}
