//! Automatic promotion: evaluate a criterion and record it on success.
//!
//! [`consider_promotion`] runs three steps:
//!
//! 1. If the build already achieved the criterion, stop (`Ok(false)`).
//! 2. If the criterion is not met, stop (`Ok(false)`).
//! 3. Append an automatic badge list through [`PromotionRecord::try_add`];
//!    the winner saves the build and returns `Ok(true)`, a loser `Ok(false)`.
//!
//! Steps 1 and 2 are fast paths. Correctness rests on step 3 alone, so
//! concurrent callers for the same build and criterion record it exactly once.
//!
//! [`PromotionRecord::try_add`]: crate::record::PromotionRecord::try_add

use crate::domain::badge::{BadgeList, PromotionTrigger};
use crate::domain::build::Build;
use crate::domain::criterion::Criterion;
use crate::domain::error::{PromotionError, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::store::BuildStore;

/// Whether every condition of `criterion` holds for `build`. Condition
/// failures surface as [`PromotionError::Condition`].
pub fn is_met(criterion: &Criterion, build: &Build) -> Result<bool> {
    criterion
        .is_met(build)
        .map_err(|source| PromotionError::Condition {
            criterion: criterion.name().to_string(),
            source,
        })
}

/// Evaluate `criterion` against `build` and record the promotion if it is
/// met. Returns whether this call newly promoted the build.
pub fn consider_promotion<S>(
    criterion: &Criterion,
    build: &Build,
    store: &S,
    trigger: PromotionTrigger,
) -> Result<bool>
where
    S: BuildStore + ?Sized,
{
    let name = criterion.name();

    if build
        .promotion_record()
        .is_some_and(|record| record.has_achieved(name))
    {
        obs::emit_already_promoted(name);
        return Ok(false);
    }

    let met = is_met(criterion, build).inspect_err(|e| obs::emit_evaluation_failed(name, e))?;
    if !met {
        return Ok(false);
    }

    let badges = BadgeList::automatic(name, trigger.clone());
    if !build.attach_promotion_record().try_add(badges) {
        METRICS.inc_races_lost();
        obs::emit_race_lost(name);
        return Ok(false);
    }

    METRICS.inc_promotions_recorded();
    obs::emit_promotion_recorded(name, &trigger);
    persist(build, store, name)?;
    Ok(true)
}

/// Save `build` after a successful insertion. The ledger keeps the promotion
/// even when this fails; the caller may retry the save alone.
pub(crate) fn persist<S>(build: &Build, store: &S, criterion: &str) -> Result<()>
where
    S: BuildStore + ?Sized,
{
    store.save(build).map_err(|source| {
        METRICS.inc_persistence_failures();
        obs::emit_persistence_failed(criterion, &source);
        PromotionError::Persistence {
            project: build.project_full_name().to_string(),
            number: build.number(),
            source,
        }
    })
}
