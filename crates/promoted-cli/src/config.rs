//! Promotion configuration file loading.
//!
//! The file maps project full names to their criteria:
//!
//! ```toml
//! [[projects."team/app".criteria]]
//! name = "qa"
//!
//! [[projects."team/app".criteria.conditions]]
//! kind = "self_promotion"
//! even_if_unstable = true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use promoted_core::{
    BuildTargetReference, ConditionRegistry, ProjectPromotionConfig, PromotionConfigSpec,
    StaticConfigSource,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct PromotionsFile {
    #[serde(default)]
    projects: BTreeMap<String, PromotionConfigSpec>,
}

/// Parse `contents` and build every project's configuration.
pub fn parse_configs(contents: &str, registry: &ConditionRegistry) -> Result<StaticConfigSource> {
    let file: PromotionsFile = toml::from_str(contents).context("invalid promotion config TOML")?;
    let mut source = StaticConfigSource::new();
    for (project, spec) in &file.projects {
        let config = ProjectPromotionConfig::from_spec(spec, registry)
            .with_context(|| format!("invalid promotion config for project {project}"))?;
        tracing::debug!(project = %project, criteria = config.len(), "promotion config loaded");
        source.insert(project.clone(), config);
    }
    Ok(source)
}

/// Load the configuration file at `path`. No path means no project has
/// promotions configured.
pub fn load_configs(path: Option<&Path>) -> Result<StaticConfigSource> {
    let Some(path) = path else {
        return Ok(StaticConfigSource::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_configs(&contents, &ConditionRegistry::with_builtins())
}

/// Parse `project#number`.
pub fn parse_target(s: &str) -> std::result::Result<BuildTargetReference, String> {
    let (project, number) = s
        .rsplit_once('#')
        .ok_or_else(|| format!("expected PROJECT#NUMBER, got '{s}'"))?;
    if project.is_empty() {
        return Err(format!("missing project in '{s}'"));
    }
    let number = number
        .parse::<u64>()
        .map_err(|e| format!("invalid build number in '{s}': {e}"))?;
    Ok(BuildTargetReference::new(project, number))
}

/// Parse `NAME=VALUE`.
pub fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}
