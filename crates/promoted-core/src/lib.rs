//! Promoted Builds Core Library
//!
//! Decides whether a finished build qualifies for a named promotion, records
//! the decision once per criterion on the build's ledger, and lets operators
//! force promotions by hand.

pub mod domain;
pub mod engine;
pub mod evaluator;
pub mod force;
pub mod metrics;
pub mod obs;
pub mod record;
pub mod store;
pub mod telemetry;

pub use domain::{
    Badge, BadgeList, Build, BuildResult, BuildSnapshot, BuildTargetReference, Condition,
    ConditionError, ConditionFactory, ConditionRegistry, ConditionSpec, Criterion, CriterionSpec,
    ParameterMatch, ProjectPromotionConfig, PromotionConfigSpec, PromotionError, PromotionTrigger,
    Result, SelfPromotion,
};

pub use engine::{PromotionEngine, PromotionSweep};
pub use evaluator::{consider_promotion, is_met};
pub use force::force_promotion;
pub use record::PromotionRecord;
pub use store::fs::FsBuildStore;
pub use store::{BuildStore, ConfigSource, StaticConfigSource, StorageError, StorageResult};

pub use metrics::METRICS;
pub use obs::PromotionSpan;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
