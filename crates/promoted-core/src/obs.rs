//! Structured observability hooks for promotion decisions.
//!
//! This module provides:
//! - Build-scoped tracing spans via the `PromotionSpan` RAII guard
//! - Emission functions for ledger outcomes: recorded, skipped, lost race,
//!   forced, persistence failure
//!
//! Events carry an `event` field (`promotion.recorded`, ...) so they can be
//! filtered out of JSON logs.

use tracing::{debug, info, warn};

use crate::domain::badge::PromotionTrigger;

/// RAII guard that enters a span tagged with the build being promoted.
///
/// # Example
///
/// ```ignore
/// let _span = PromotionSpan::enter("team/app", 42);
/// // tracing calls below carry project = "team/app", build = 42
/// ```
pub struct PromotionSpan {
    _span: tracing::span::EnteredSpan,
}

impl PromotionSpan {
    pub fn enter(project: &str, number: u64) -> Self {
        let span = tracing::info_span!("promoted.build", project = %project, build = number);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: criterion newly recorded on the build by evaluation.
pub fn emit_promotion_recorded(criterion: &str, trigger: &PromotionTrigger) {
    let trigger = match trigger {
        PromotionTrigger::BuildCompleted => "build_completed".to_string(),
        PromotionTrigger::ConfigChanged => "config_changed".to_string(),
        PromotionTrigger::Cascade { source } => format!("cascade:{source}"),
    };
    info!(event = "promotion.recorded", criterion = %criterion, trigger = %trigger);
}

/// Emit event: evaluation skipped because the criterion was already achieved.
pub fn emit_already_promoted(criterion: &str) {
    debug!(event = "promotion.already_achieved", criterion = %criterion);
}

/// Emit event: another caller recorded the criterion first.
pub fn emit_race_lost(criterion: &str) {
    debug!(event = "promotion.race_lost", criterion = %criterion);
}

/// Emit event: an operator forced a promotion. `recorded` is false when the
/// criterion was already achieved and the call was a no-op.
pub fn emit_forced(criterion: &str, actor: Option<&str>, recorded: bool) {
    info!(
        event = "promotion.forced",
        criterion = %criterion,
        actor = actor.unwrap_or("-"),
        recorded = recorded,
    );
}

/// Emit event: the ledger changed but the build could not be saved.
pub fn emit_persistence_failed(criterion: &str, error: &dyn std::fmt::Display) {
    warn!(event = "promotion.persistence_failed", criterion = %criterion, error = %error);
}

/// Emit event: a condition failed while evaluating a criterion.
pub fn emit_evaluation_failed(criterion: &str, error: &dyn std::fmt::Display) {
    warn!(event = "promotion.evaluation_failed", criterion = %criterion, error = %error);
}
