//! Evidence of how and when a build was promoted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::target::BuildTargetReference;

/// What caused an automatic evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionTrigger {
    /// The build itself finished.
    BuildCompleted,
    /// The project's promotion configuration was saved.
    ConfigChanged,
    /// Another build's lifecycle caused this build to be re-evaluated.
    Cascade { source: BuildTargetReference },
}

/// A single piece of promotion evidence. Carries provenance only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Badge {
    /// Every condition of the criterion was met.
    Automatic {
        trigger: PromotionTrigger,
        promoted_at: DateTime<Utc>,
    },
    /// An operator forced the promotion.
    Manual {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor: Option<String>,
        promoted_at: DateTime<Utc>,
    },
}

impl Badge {
    pub fn automatic(trigger: PromotionTrigger) -> Self {
        Badge::Automatic {
            trigger,
            promoted_at: Utc::now(),
        }
    }

    pub fn manual(actor: Option<&str>) -> Self {
        Badge::Manual {
            actor: actor.map(str::to_string),
            promoted_at: Utc::now(),
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Badge::Manual { .. })
    }

    pub fn promoted_at(&self) -> DateTime<Utc> {
        match self {
            Badge::Automatic { promoted_at, .. } | Badge::Manual { promoted_at, .. } => {
                *promoted_at
            }
        }
    }
}

/// All evidence recorded for one criterion on one build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BadgeList {
    /// Name of the criterion this list belongs to.
    pub criterion: String,
    pub badges: Vec<Badge>,
}

impl BadgeList {
    pub fn new(criterion: impl Into<String>, badges: Vec<Badge>) -> Self {
        Self {
            criterion: criterion.into(),
            badges,
        }
    }

    pub fn automatic(criterion: impl Into<String>, trigger: PromotionTrigger) -> Self {
        Self::new(criterion, vec![Badge::automatic(trigger)])
    }

    pub fn manual(criterion: impl Into<String>, actor: Option<&str>) -> Self {
        Self::new(criterion, vec![Badge::manual(actor)])
    }

    pub fn is_for(&self, criterion: &str) -> bool {
        self.criterion == criterion
    }

    /// `true` if any badge in the list was forced by an operator.
    pub fn is_manual(&self) -> bool {
        self.badges.iter().any(Badge::is_manual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_kind_tagging() {
        let badge = Badge::manual(Some("alice"));
        let json = serde_json::to_value(&badge).expect("serialize");
        assert_eq!(json["kind"], "manual");
        assert_eq!(json["actor"], "alice");

        let badge = Badge::automatic(PromotionTrigger::ConfigChanged);
        let json = serde_json::to_value(&badge).expect("serialize");
        assert_eq!(json["kind"], "automatic");
        assert_eq!(json["trigger"]["type"], "config_changed");
    }

    #[test]
    fn test_cascade_trigger_keeps_only_reference() {
        let trigger = PromotionTrigger::Cascade {
            source: BuildTargetReference::new("upstream", 12),
        };
        let json = serde_json::to_value(&trigger).expect("serialize");
        assert_eq!(json["type"], "cascade");
        assert_eq!(json["source"], serde_json::json!(["upstream", 12]));
    }

    #[test]
    fn test_badge_list_helpers() {
        let list = BadgeList::manual("prod", None);
        assert!(list.is_for("prod"));
        assert!(!list.is_for("qa"));
        assert!(list.is_manual());
        assert!(!BadgeList::automatic("qa", PromotionTrigger::BuildCompleted).is_manual());
    }
}
