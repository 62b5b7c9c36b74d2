//! Per-project promotion configuration.
//!
//! [`ProjectPromotionConfig`] is the loaded, immutable form handed to the
//! engine. [`PromotionConfigSpec`] is the authored form it is built from.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::criterion::Criterion;
use crate::domain::error::{PromotionError, Result};
use crate::domain::registry::ConditionRegistry;

/// Authored description of one condition: its registry kind plus the
/// constructor parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionSpec {
    pub kind: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Authored description of one criterion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionSpec {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

/// Authored promotion configuration for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromotionConfigSpec {
    #[serde(default)]
    pub criteria: Vec<CriterionSpec>,
}

/// Ordered criteria of a project, unique by name. Order is display and
/// evaluation order.
#[derive(Debug, Clone, Default)]
pub struct ProjectPromotionConfig {
    criteria: Vec<Arc<Criterion>>,
}

impl ProjectPromotionConfig {
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        let mut seen = HashSet::new();
        for criterion in &criteria {
            if !seen.insert(criterion.name()) {
                return Err(PromotionError::DuplicateCriterion(
                    criterion.name().to_string(),
                ));
            }
        }
        Ok(Self {
            criteria: criteria.into_iter().map(Arc::new).collect(),
        })
    }

    /// Build from the authored form, constructing conditions through
    /// `registry`.
    pub fn from_spec(spec: &PromotionConfigSpec, registry: &ConditionRegistry) -> Result<Self> {
        let mut criteria = Vec::with_capacity(spec.criteria.len());
        for criterion in &spec.criteria {
            if criterion.name.trim().is_empty() {
                return Err(PromotionError::InvalidConfig(
                    "criterion name is empty".to_string(),
                ));
            }
            let conditions = criterion
                .conditions
                .iter()
                .map(|condition| registry.build(condition))
                .collect::<Result<Vec<_>>>()?;
            criteria.push(Criterion::new(criterion.name.clone(), conditions));
        }
        Self::new(criteria)
    }

    pub fn get_criterion(&self, name: &str) -> Option<&Arc<Criterion>> {
        self.criteria.iter().find(|c| c.name() == name)
    }

    pub fn criteria(&self) -> &[Arc<Criterion>] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_from_json(value: Value) -> PromotionConfigSpec {
        serde_json::from_value(value).expect("valid spec")
    }

    #[test]
    fn test_from_spec_preserves_order() {
        let spec = spec_from_json(serde_json::json!({
            "criteria": [
                { "name": "qa", "conditions": [{ "kind": "self_promotion" }] },
                { "name": "staging" },
                {
                    "name": "prod",
                    "conditions": [
                        { "kind": "self_promotion", "even_if_unstable": false },
                        { "kind": "parameter", "name": "ENV", "value": "prod" }
                    ]
                }
            ]
        }));

        let config = ProjectPromotionConfig::from_spec(&spec, &ConditionRegistry::with_builtins())
            .expect("load config");

        let names: Vec<&str> = config.criteria().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["qa", "staging", "prod"]);
        assert_eq!(config.len(), 3);
        assert_eq!(
            config
                .get_criterion("prod")
                .expect("prod exists")
                .conditions()
                .len(),
            2
        );
        assert!(config.get_criterion("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ProjectPromotionConfig::new(vec![
            Criterion::new("qa", Vec::new()),
            Criterion::new("qa", Vec::new()),
        ])
        .unwrap_err();
        assert!(matches!(err, PromotionError::DuplicateCriterion(ref n) if n == "qa"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let spec = spec_from_json(serde_json::json!({ "criteria": [{ "name": "  " }] }));
        let err = ProjectPromotionConfig::from_spec(&spec, &ConditionRegistry::with_builtins())
            .unwrap_err();
        assert!(matches!(err, PromotionError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_condition_kind_fails_load() {
        let spec = spec_from_json(serde_json::json!({
            "criteria": [{ "name": "qa", "conditions": [{ "kind": "nope" }] }]
        }));
        let err = ProjectPromotionConfig::from_spec(&spec, &ConditionRegistry::with_builtins())
            .unwrap_err();
        assert!(matches!(err, PromotionError::UnknownConditionKind(ref k) if k == "nope"));
    }

    #[test]
    fn test_condition_spec_flattens_params() {
        let spec: ConditionSpec =
            serde_json::from_value(serde_json::json!({ "kind": "parameter", "name": "A", "value": "b" }))
                .expect("deserialize");
        assert_eq!(spec.kind, "parameter");
        assert_eq!(spec.params.get("name"), Some(&Value::from("A")));
        assert!(!spec.params.contains_key("kind"));
    }
}
