//! Promoted Builds CLI
//!
//! The `promoted` command records builds, evaluates their promotion criteria
//! and lets operators force promotions.
//!
//! ## Commands
//!
//! - `record-build`: Store a finished (or running) build
//! - `status`: Show achieved and pending promotions of a build
//! - `consider`: Evaluate one or all criteria against a build
//! - `force`: Force a promotion, bypassing its conditions
//! - `resolve`: Check whether a `PROJECT#NUMBER` reference still resolves

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use promoted_core::{
    Build, BuildResult, BuildStore, BuildTargetReference, ConfigSource, FsBuildStore,
    PromotionEngine, PromotionError, PromotionTrigger, StaticConfigSource, METRICS,
};
use serde_json::json;
use tracing::{info, Level};

use crate::config::{load_configs, parse_param, parse_target};

#[derive(Parser)]
#[command(name = "promoted")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build promotion ledger", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Build store directory
    #[arg(long, global = true, env = "PROMOTED_ROOT", default_value = ".promoted")]
    root: PathBuf,

    /// Promotion configuration file (TOML)
    #[arg(long, global = true, env = "PROMOTED_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a build so it can be promoted
    RecordBuild {
        /// Project full name (e.g. team/app)
        #[arg(short, long)]
        project: String,

        /// Build number
        #[arg(short, long)]
        number: u64,

        /// Build result (omit for a build still running)
        #[arg(short, long, value_enum)]
        result: Option<ResultArg>,

        /// Build parameter as NAME=VALUE (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Show achieved and pending promotions
    Status {
        #[arg(short, long)]
        project: String,

        #[arg(short, long)]
        number: u64,
    },

    /// Evaluate promotion criteria against a build
    Consider {
        #[arg(short, long)]
        project: String,

        #[arg(short, long)]
        number: u64,

        /// Only evaluate this criterion (default: every pending criterion)
        #[arg(short, long)]
        criterion: Option<String>,

        /// Why the evaluation happens
        #[arg(long, value_enum, default_value = "build-completed")]
        trigger: TriggerArg,

        /// Build that caused the evaluation, as PROJECT#NUMBER
        #[arg(long, value_parser = parse_target)]
        cascade_from: Option<BuildTargetReference>,
    },

    /// Force a promotion regardless of its conditions
    Force {
        #[arg(short, long)]
        project: String,

        #[arg(short, long)]
        number: u64,

        /// Criterion name
        #[arg(short, long)]
        criterion: String,

        /// Operator performing the promotion
        #[arg(long)]
        by: Option<String>,
    },

    /// Check whether a PROJECT#NUMBER reference resolves
    Resolve {
        #[arg(value_parser = parse_target)]
        target: BuildTargetReference,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResultArg {
    Success,
    Unstable,
    Failure,
    Aborted,
    NotBuilt,
}

impl From<ResultArg> for BuildResult {
    fn from(arg: ResultArg) -> Self {
        match arg {
            ResultArg::Success => BuildResult::Success,
            ResultArg::Unstable => BuildResult::Unstable,
            ResultArg::Failure => BuildResult::Failure,
            ResultArg::Aborted => BuildResult::Aborted,
            ResultArg::NotBuilt => BuildResult::NotBuilt,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TriggerArg {
    BuildCompleted,
    ConfigChanged,
}

type Engine = PromotionEngine<FsBuildStore, StaticConfigSource>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    promoted_core::init_tracing(cli.json, level);

    let store = FsBuildStore::new(&cli.root)
        .with_context(|| format!("failed to open build store at {}", cli.root.display()))?;
    let configs = load_configs(cli.config.as_deref())?;
    let engine = PromotionEngine::new(store, configs);

    let outcome = match cli.command {
        Commands::RecordBuild {
            project,
            number,
            result,
            params,
        } => cmd_record_build(&engine, &project, number, result, params),
        Commands::Status { project, number } => cmd_status(&engine, &project, number),
        Commands::Consider {
            project,
            number,
            criterion,
            trigger,
            cascade_from,
        } => cmd_consider(
            &engine,
            &project,
            number,
            criterion.as_deref(),
            trigger,
            cascade_from,
        ),
        Commands::Force {
            project,
            number,
            criterion,
            by,
        } => cmd_force(&engine, &project, number, &criterion, by.as_deref()),
        Commands::Resolve { target } => cmd_resolve(&engine, &target),
    };

    METRICS.flush();
    outcome
}

fn find_build(engine: &Engine, project: &str, number: u64) -> Result<Arc<Build>> {
    engine
        .store()
        .find_build(project, number)
        .with_context(|| format!("failed to load {project}#{number}"))?
        .ok_or_else(|| anyhow!("build {project}#{number} not found"))
}

fn cmd_record_build(
    engine: &Engine,
    project: &str,
    number: u64,
    result: Option<ResultArg>,
    params: Vec<(String, String)>,
) -> Result<()> {
    if engine.store().find_build(project, number)?.is_some() {
        bail!("build {project}#{number} already recorded");
    }

    let mut build = Build::new(project, number);
    if let Some(result) = result {
        build = build.with_result(result.into());
    }
    for (name, value) in params {
        build = build.with_parameter(name, value);
    }

    engine.store().insert(build)?;
    info!(project = %project, number = number, "build recorded");
    println!("Recorded {project}#{number}");
    Ok(())
}

fn cmd_status(engine: &Engine, project: &str, number: u64) -> Result<()> {
    let build = find_build(engine, project, number)?;
    let promotions = engine.promotions(&build);
    let pending_criteria = engine.pending_promotions(&build);
    let pending: Vec<&str> = pending_criteria.iter().map(|c| c.name()).collect();

    let status = json!({
        "build": build.target(),
        "configured": engine.configs().promotion_config(project).is_some(),
        "promotions": &*promotions,
        "pending": pending,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn cmd_consider(
    engine: &Engine,
    project: &str,
    number: u64,
    criterion: Option<&str>,
    trigger: TriggerArg,
    cascade_from: Option<BuildTargetReference>,
) -> Result<()> {
    let build = find_build(engine, project, number)?;
    let trigger = match (cascade_from, trigger) {
        (Some(source), _) => PromotionTrigger::Cascade { source },
        (None, TriggerArg::BuildCompleted) => PromotionTrigger::BuildCompleted,
        (None, TriggerArg::ConfigChanged) => PromotionTrigger::ConfigChanged,
    };

    let Some(name) = criterion else {
        let sweep = engine.consider_all(&build, trigger);
        for promoted in &sweep.promoted {
            println!("Promoted {project}#{number} to {promoted}");
        }
        for (name, err) in &sweep.failed {
            eprintln!("Criterion {name} failed: {err}");
        }
        if !sweep.is_clean() {
            bail!("{} criteria failed", sweep.failed.len());
        }
        if sweep.promoted.is_empty() {
            println!("No new promotions for {project}#{number}");
        }
        return Ok(());
    };

    let config = engine
        .configs()
        .promotion_config(project)
        .ok_or_else(|| PromotionError::NoPromotionConfigured {
            project: project.to_string(),
        })?;
    let criterion = config
        .get_criterion(name)
        .ok_or_else(|| PromotionError::UnknownCriterion {
            project: project.to_string(),
            name: name.to_string(),
        })?;

    if engine.consider_promotion(&build, criterion, trigger)? {
        println!("Promoted {project}#{number} to {name}");
    } else {
        println!("{project}#{number} not promoted to {name}");
    }
    Ok(())
}

fn cmd_force(
    engine: &Engine,
    project: &str,
    number: u64,
    criterion: &str,
    by: Option<&str>,
) -> Result<()> {
    let build = find_build(engine, project, number)?;
    if engine.force_promotion(&build, criterion, by)? {
        println!("Forced {project}#{number} to {criterion}");
    } else {
        println!("{project}#{number} already promoted to {criterion}");
    }
    Ok(())
}

fn cmd_resolve(engine: &Engine, target: &BuildTargetReference) -> Result<()> {
    match engine.resolve(target)? {
        Some(build) => println!(
            "{target} -> {} promotion(s)",
            engine.promotions(&build).len()
        ),
        None => println!("{target} not found"),
    }
    Ok(())
}
