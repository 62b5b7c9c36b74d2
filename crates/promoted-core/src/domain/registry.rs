//! Named registry of condition constructors.
//!
//! Condition kinds are registered explicitly when configuration is loaded;
//! a [`ConditionSpec`] names its kind and carries the constructor's
//! parameters.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::condition::{Condition, ParameterMatch, SelfPromotion};
use crate::domain::config::ConditionSpec;
use crate::domain::error::{PromotionError, Result};

/// Builds a condition from its authored parameters.
pub type ConditionFactory =
    Box<dyn Fn(&Map<String, Value>) -> Result<Arc<dyn Condition>> + Send + Sync>;

/// Map of condition kind to constructor.
#[derive(Default)]
pub struct ConditionRegistry {
    factories: BTreeMap<String, ConditionFactory>,
}

impl ConditionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `self_promotion` and `parameter` kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SelfPromotion::KIND, |params| {
            let condition: Arc<dyn Condition> =
                Arc::new(parse_params::<SelfPromotion>(SelfPromotion::KIND, params)?);
            Ok(condition)
        });
        registry.register(ParameterMatch::KIND, |params| {
            let condition: Arc<dyn Condition> =
                Arc::new(parse_params::<ParameterMatch>(ParameterMatch::KIND, params)?);
            Ok(condition)
        });
        registry
    }

    /// Register `factory` under `kind`, replacing any previous registration.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Arc<dyn Condition>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        tracing::debug!(kind = %kind, "condition kind registered");
        self.factories.insert(kind, Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds in name order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Construct the condition described by `spec`.
    pub fn build(&self, spec: &ConditionSpec) -> Result<Arc<dyn Condition>> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| PromotionError::UnknownConditionKind(spec.kind.clone()))?;
        factory(&spec.params)
    }
}

impl std::fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn parse_params<T: DeserializeOwned>(kind: &str, params: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| PromotionError::InvalidConfig(format!("{kind} condition: {e}")))
}
