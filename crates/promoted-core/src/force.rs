//! Operator-forced promotion.

use crate::domain::badge::BadgeList;
use crate::domain::build::Build;
use crate::domain::config::ProjectPromotionConfig;
use crate::domain::error::{PromotionError, Result};
use crate::evaluator::persist;
use crate::metrics::METRICS;
use crate::obs;
use crate::store::BuildStore;

/// Record a manual promotion of `criterion_name` on `build`, bypassing the
/// criterion's conditions.
///
/// Returns `Ok(true)` when the manual badge list was recorded and the build
/// saved, `Ok(false)` when the criterion was already achieved (nothing is
/// saved in that case).
///
/// # Errors
///
/// - [`PromotionError::NoPromotionConfigured`] when `config` is `None`.
/// - [`PromotionError::UnknownCriterion`] when the config has no such name.
/// - [`PromotionError::Persistence`] when the save fails after recording.
pub fn force_promotion<S>(
    build: &Build,
    criterion_name: &str,
    config: Option<&ProjectPromotionConfig>,
    store: &S,
    actor: Option<&str>,
) -> Result<bool>
where
    S: BuildStore + ?Sized,
{
    let config = config.ok_or_else(|| PromotionError::NoPromotionConfigured {
        project: build.project_full_name().to_string(),
    })?;
    let criterion =
        config
            .get_criterion(criterion_name)
            .ok_or_else(|| PromotionError::UnknownCriterion {
                project: build.project_full_name().to_string(),
                name: criterion_name.to_string(),
            })?;

    let recorded = build
        .attach_promotion_record()
        .try_add(BadgeList::manual(criterion.name(), actor));
    obs::emit_forced(criterion.name(), actor, recorded);
    if !recorded {
        return Ok(false);
    }

    METRICS.inc_promotions_recorded();
    METRICS.inc_forced();
    persist(build, store, criterion.name())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criterion::Criterion;
    use crate::store::fakes::MemoryBuildStore;

    fn config() -> ProjectPromotionConfig {
        ProjectPromotionConfig::new(vec![
            Criterion::new("qa", Vec::new()),
            Criterion::new("prod", Vec::new()),
        ])
        .expect("config")
    }

    #[test]
    fn test_force_records_manual_badge() {
        let store = MemoryBuildStore::new();
        let build = Build::new("demo", 4);

        let recorded =
            force_promotion(&build, "prod", Some(&config()), &store, Some("alice")).unwrap();

        assert!(recorded);
        let lists = build.promotion_record().expect("attached").list();
        assert_eq!(lists.len(), 1);
        assert!(lists[0].is_for("prod"));
        assert!(lists[0].is_manual());
        assert_eq!(store.save_calls(), 1);
    }

    #[test]
    fn test_force_twice_is_idempotent() {
        let store = MemoryBuildStore::new();
        let build = Build::new("demo", 4);
        let config = config();

        assert!(force_promotion(&build, "qa", Some(&config), &store, None).unwrap());
        assert!(!force_promotion(&build, "qa", Some(&config), &store, None).unwrap());

        assert_eq!(build.promotion_record().unwrap().len(), 1);
        assert_eq!(store.save_calls(), 1);
    }

    #[test]
    fn test_unknown_criterion() {
        let store = MemoryBuildStore::new();
        let build = Build::new("demo", 4);

        let err = force_promotion(&build, "nightly", Some(&config()), &store, None).unwrap_err();

        assert!(
            matches!(err, PromotionError::UnknownCriterion { ref name, .. } if name == "nightly"),
            "unexpected error: {:?}",
            err
        );
        assert_eq!(store.save_calls(), 0);
    }

    #[test]
    fn test_no_promotion_configured() {
        let store = MemoryBuildStore::new();
        let build = Build::new("demo", 4);

        let err = force_promotion(&build, "qa", None, &store, None).unwrap_err();

        assert!(
            matches!(err, PromotionError::NoPromotionConfigured { ref project } if project == "demo"),
            "unexpected error: {:?}",
            err
        );
        assert!(build.promotion_record().is_none());
    }
}
