//! The slice of the host build model the promotion engine relies on.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::domain::badge::BadgeList;
use crate::domain::target::BuildTargetReference;
use crate::record::PromotionRecord;

/// Outcome of a finished build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    Aborted,
    NotBuilt,
}

impl BuildResult {
    fn rank(self) -> u8 {
        match self {
            BuildResult::Success => 0,
            BuildResult::Unstable => 1,
            BuildResult::Failure => 2,
            BuildResult::NotBuilt => 3,
            BuildResult::Aborted => 4,
        }
    }

    /// `true` when `self` is at least as good as `other`.
    pub fn is_better_or_equal(self, other: BuildResult) -> bool {
        self.rank() <= other.rank()
    }
}

/// A build of a project. The build exclusively owns its promotion record,
/// which is attached lazily the first time a criterion is achieved.
#[derive(Debug)]
pub struct Build {
    project_full_name: String,
    number: u64,
    result: Option<BuildResult>,
    parameters: BTreeMap<String, String>,
    promotion: OnceLock<PromotionRecord>,
}

impl Build {
    /// A build that has not finished yet.
    pub fn new(project_full_name: impl Into<String>, number: u64) -> Self {
        Self {
            project_full_name: project_full_name.into(),
            number,
            result: None,
            parameters: BTreeMap::new(),
            promotion: OnceLock::new(),
        }
    }

    pub fn with_result(mut self, result: BuildResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn project_full_name(&self) -> &str {
        &self.project_full_name
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// `None` while the build is still running.
    pub fn result(&self) -> Option<BuildResult> {
        self.result
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// The promotion record, if any criterion has been achieved.
    pub fn promotion_record(&self) -> Option<&PromotionRecord> {
        self.promotion.get()
    }

    /// The promotion record, created on first use. Concurrent callers all
    /// get the same record.
    pub fn attach_promotion_record(&self) -> &PromotionRecord {
        self.promotion.get_or_init(PromotionRecord::new)
    }

    pub fn target(&self) -> BuildTargetReference {
        BuildTargetReference::from(self)
    }

    pub fn to_snapshot(&self) -> BuildSnapshot {
        BuildSnapshot {
            project: self.project_full_name.clone(),
            number: self.number,
            result: self.result,
            parameters: self.parameters.clone(),
            promotions: self
                .promotion_record()
                .map(|record| record.list().to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn from_snapshot(snapshot: BuildSnapshot) -> Self {
        let promotion = OnceLock::new();
        if !snapshot.promotions.is_empty() {
            let _ = promotion.set(PromotionRecord::from_lists(snapshot.promotions));
        }
        Self {
            project_full_name: snapshot.project,
            number: snapshot.number,
            result: snapshot.result,
            parameters: snapshot.parameters,
            promotion,
        }
    }
}

/// Persisted form of a [`Build`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSnapshot {
    pub project: String,
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BuildResult>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub promotions: Vec<BadgeList>,
}
