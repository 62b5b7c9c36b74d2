//! Domain model for build promotion.
//!
//! - `Build`: the host build a promotion record hangs off
//! - `Criterion` / `Condition`: promotion rules and their predicates
//! - `Badge` / `BadgeList`: evidence of a promotion
//! - `ProjectPromotionConfig`: a project's ordered criteria
//! - `BuildTargetReference`: non-owning pointer to another build

pub mod badge;
pub mod build;
pub mod condition;
pub mod config;
pub mod criterion;
pub mod error;
pub mod registry;
pub mod target;

pub use badge::{Badge, BadgeList, PromotionTrigger};
pub use build::{Build, BuildResult, BuildSnapshot};
pub use condition::{Condition, ParameterMatch, SelfPromotion};
pub use config::{ConditionSpec, CriterionSpec, ProjectPromotionConfig, PromotionConfigSpec};
pub use criterion::Criterion;
pub use error::{ConditionError, PromotionError, Result};
pub use registry::{ConditionFactory, ConditionRegistry};
pub use target::BuildTargetReference;
