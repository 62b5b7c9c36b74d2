//! Entry points for build-lifecycle listeners, operators and status views.
//!
//! [`PromotionEngine`] binds a [`BuildStore`] and a [`ConfigSource`] and
//! exposes the query, evaluation and force operations over them. It holds
//! no promotion state of its own; each build owns its record.

use std::sync::Arc;

use crate::domain::badge::{BadgeList, PromotionTrigger};
use crate::domain::build::Build;
use crate::domain::criterion::Criterion;
use crate::domain::error::{PromotionError, Result};
use crate::domain::target::BuildTargetReference;
use crate::evaluator;
use crate::force;
use crate::obs::PromotionSpan;
use crate::store::{BuildStore, ConfigSource, StorageResult};

/// Outcome of [`PromotionEngine::consider_all`].
#[derive(Debug, Default)]
pub struct PromotionSweep {
    /// Criteria newly promoted by this sweep, in config order.
    pub promoted: Vec<String>,
    /// Criteria whose evaluation or save failed, with the error.
    pub failed: Vec<(String, PromotionError)>,
}

impl PromotionSweep {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Promotion operations over a build store and a configuration source.
pub struct PromotionEngine<S, C> {
    store: S,
    configs: C,
}

impl<S, C> PromotionEngine<S, C>
where
    S: BuildStore,
    C: ConfigSource,
{
    pub fn new(store: S, configs: C) -> Self {
        Self { store, configs }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn configs(&self) -> &C {
        &self.configs
    }

    /// Every promotion the build achieved, in promotion order.
    pub fn promotions(&self, build: &Build) -> Arc<[BadgeList]> {
        match build.promotion_record() {
            Some(record) => record.list(),
            None => Arc::from(Vec::new()),
        }
    }

    /// Configured criteria the build has not achieved yet, in config order.
    /// Empty when the project has no promotion configuration.
    pub fn pending_promotions(&self, build: &Build) -> Vec<Arc<Criterion>> {
        let Some(config) = self.configs.promotion_config(build.project_full_name()) else {
            return Vec::new();
        };
        match build.promotion_record() {
            Some(record) => record.pending_criteria(&config),
            None => config.criteria().to_vec(),
        }
    }

    /// Evaluate one criterion and record it if met. See
    /// [`evaluator::consider_promotion`].
    pub fn consider_promotion(
        &self,
        build: &Build,
        criterion: &Criterion,
        trigger: PromotionTrigger,
    ) -> Result<bool> {
        let _span = PromotionSpan::enter(build.project_full_name(), build.number());
        evaluator::consider_promotion(criterion, build, &self.store, trigger)
    }

    /// Evaluate every pending criterion of the build's project, as a build
    /// listener does when a build finishes. A failing criterion does not
    /// stop the others.
    pub fn consider_all(&self, build: &Build, trigger: PromotionTrigger) -> PromotionSweep {
        let _span = PromotionSpan::enter(build.project_full_name(), build.number());
        let mut sweep = PromotionSweep::default();

        for criterion in self.pending_promotions(build) {
            match evaluator::consider_promotion(&criterion, build, &self.store, trigger.clone()) {
                Ok(true) => sweep.promoted.push(criterion.name().to_string()),
                Ok(false) => {}
                Err(e) => sweep.failed.push((criterion.name().to_string(), e)),
            }
        }

        tracing::debug!(
            promoted = sweep.promoted.len(),
            failed = sweep.failed.len(),
            "promotion sweep finished"
        );
        sweep
    }

    /// Force a promotion by criterion name. See [`force::force_promotion`].
    pub fn force_promotion(
        &self,
        build: &Build,
        criterion_name: &str,
        actor: Option<&str>,
    ) -> Result<bool> {
        let _span = PromotionSpan::enter(build.project_full_name(), build.number());
        let config = self.configs.promotion_config(build.project_full_name());
        force::force_promotion(build, criterion_name, config.as_deref(), &self.store, actor)
    }

    /// Resolve a build reference through the store.
    pub fn resolve(&self, target: &BuildTargetReference) -> StorageResult<Option<Arc<Build>>> {
        target.resolve(&self.store)
    }

    /// Save the build again after a [`PromotionError::Persistence`] failure.
    pub fn retry_save(&self, build: &Build) -> Result<()> {
        self.store
            .save(build)
            .map_err(|source| PromotionError::Persistence {
                project: build.project_full_name().to_string(),
                number: build.number(),
                source,
            })
    }
}
