use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use promoted_core::store::fakes::MemoryBuildStore;
use promoted_core::{
    is_met, Badge, Build, BuildResult, Condition, ConditionError, Criterion,
    ProjectPromotionConfig, PromotionEngine, PromotionError, PromotionTrigger, SelfPromotion,
    StaticConfigSource,
};

#[derive(Debug)]
struct Never;

impl Condition for Never {
    fn kind(&self) -> &str {
        "never"
    }

    fn is_met(&self, _build: &Build) -> Result<bool, ConditionError> {
        Ok(false)
    }
}

#[derive(Debug, Default)]
struct CountingCondition {
    calls: AtomicUsize,
}

impl Condition for CountingCondition {
    fn kind(&self) -> &str {
        "counting"
    }

    fn is_met(&self, _build: &Build) -> Result<bool, ConditionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

fn criterion(name: &str, conditions: Vec<Arc<dyn Condition>>) -> Criterion {
    Criterion::new(name, conditions)
}

fn engine_with(
    criteria: Vec<Criterion>,
) -> PromotionEngine<MemoryBuildStore, StaticConfigSource> {
    let config = ProjectPromotionConfig::new(criteria).expect("config");
    PromotionEngine::new(
        MemoryBuildStore::new(),
        StaticConfigSource::new().with_project("demo", config),
    )
}

#[test]
fn consider_promotion_is_idempotent() {
    let finished: Arc<dyn Condition> = Arc::new(SelfPromotion::default());
    let qa = criterion("qa", vec![finished]);
    let engine = engine_with(vec![qa.clone()]);
    let build = engine
        .store()
        .insert(Build::new("demo", 1).with_result(BuildResult::Success));

    let first = engine
        .consider_promotion(&build, &qa, PromotionTrigger::BuildCompleted)
        .expect("first");
    let len = engine.promotions(&build).len();
    let second = engine
        .consider_promotion(&build, &qa, PromotionTrigger::BuildCompleted)
        .expect("second");

    assert_eq!((first, second), (true, false));
    assert_eq!(engine.promotions(&build).len(), len);
    assert_eq!(engine.store().save_calls(), 1);
}

#[test]
fn pending_excludes_achieved_and_keeps_order() {
    let engine = engine_with(vec![
        criterion("A", Vec::new()),
        criterion("B", Vec::new()),
        criterion("C", Vec::new()),
    ]);
    let build = Build::new("demo", 2);
    engine
        .force_promotion(&build, "B", None)
        .expect("force B");

    let pending: Vec<String> = engine
        .pending_promotions(&build)
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(pending, vec!["A", "C"]);
}

#[test]
fn short_circuit_never_evaluates_later_conditions() {
    let counting = Arc::new(CountingCondition::default());
    let never: Arc<dyn Condition> = Arc::new(Never);
    let counted: Arc<dyn Condition> = counting.clone();
    let gated = criterion("gated", vec![never, counted]);

    assert!(!is_met(&gated, &Build::new("demo", 3)).expect("evaluate"));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn manual_promotion_bypasses_unmet_conditions() {
    let never: Arc<dyn Condition> = Arc::new(Never);
    let prod = criterion("prod", vec![never]);
    let engine = engine_with(vec![prod.clone()]);
    let build = engine.store().insert(Build::new("demo", 4));

    assert!(engine
        .force_promotion(&build, "prod", Some("release-manager"))
        .expect("force"));

    let promotions = engine.promotions(&build);
    assert_eq!(promotions.len(), 1);
    match &promotions[0].badges[..] {
        [Badge::Manual { actor, .. }] => assert_eq!(actor.as_deref(), Some("release-manager")),
        other => panic!("expected one manual badge, got {other:?}"),
    }

    let again = engine
        .consider_promotion(&build, &prod, PromotionTrigger::ConfigChanged)
        .expect("consider");
    assert!(!again, "already achieved, conditions are not consulted");
    assert_eq!(engine.store().save_calls(), 1);
}

#[test]
fn force_unknown_criterion_fails() {
    let engine = engine_with(vec![criterion("qa", Vec::new())]);
    let build = Build::new("demo", 5);

    let err = engine.force_promotion(&build, "prod", None).unwrap_err();

    assert!(
        matches!(err, PromotionError::UnknownCriterion { ref name, .. } if name == "prod"),
        "unexpected error: {:?}",
        err
    );
    assert!(engine.promotions(&build).is_empty());
}

#[test]
fn force_without_configuration_fails() {
    let engine = engine_with(vec![criterion("qa", Vec::new())]);
    let build = Build::new("unconfigured", 1);

    let err = engine.force_promotion(&build, "qa", None).unwrap_err();

    assert!(
        matches!(err, PromotionError::NoPromotionConfigured { ref project } if project == "unconfigured"),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn cascade_trigger_records_source_reference() {
    let finished: Arc<dyn Condition> = Arc::new(SelfPromotion::default());
    let qa = criterion("qa", vec![finished]);
    let engine = engine_with(vec![qa.clone()]);
    let upstream = engine.store().insert(Build::new("upstream", 8));
    let build = engine
        .store()
        .insert(Build::new("demo", 6).with_result(BuildResult::Success));

    let promoted = engine
        .consider_promotion(
            &build,
            &qa,
            PromotionTrigger::Cascade {
                source: upstream.target(),
            },
        )
        .expect("consider");
    assert!(promoted);

    let promotions = engine.promotions(&build);
    let Badge::Automatic {
        trigger: PromotionTrigger::Cascade { source },
        ..
    } = &promotions[0].badges[0]
    else {
        panic!("expected cascade badge, got {:?}", promotions[0].badges[0]);
    };
    let resolved = engine
        .resolve(source)
        .expect("lookup")
        .expect("upstream exists");
    assert!(Arc::ptr_eq(&resolved, &upstream));
}

#[test]
fn sweep_collects_failures_without_stopping() {
    #[derive(Debug)]
    struct Broken;

    impl Condition for Broken {
        fn kind(&self) -> &str {
            "broken"
        }

        fn is_met(&self, _build: &Build) -> Result<bool, ConditionError> {
            Err(ConditionError::new("lookup failed"))
        }
    }

    let broken: Arc<dyn Condition> = Arc::new(Broken);
    let finished: Arc<dyn Condition> = Arc::new(SelfPromotion::default());
    let engine = engine_with(vec![
        criterion("flaky", vec![broken]),
        criterion("qa", vec![finished]),
    ]);
    let build = engine
        .store()
        .insert(Build::new("demo", 7).with_result(BuildResult::Success));

    let sweep = engine.consider_all(&build, PromotionTrigger::BuildCompleted);

    assert_eq!(sweep.promoted, vec!["qa".to_string()]);
    assert_eq!(sweep.failed.len(), 1);
    assert_eq!(sweep.failed[0].0, "flaky");
    assert!(matches!(sweep.failed[0].1, PromotionError::Condition { .. }));
    assert!(!engine.promotions(&build).iter().any(|l| l.is_for("flaky")));
}
