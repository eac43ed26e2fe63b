// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod formula;
pub mod logging;
pub mod plan;
pub mod report;
pub mod source;
pub mod types;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::dag::Scope;
use crate::plan::{plan_updates, PlanError};
use crate::source::{collect_universe, BrewSource, CollectOptions, FormulaSource, SnapshotSource};
use crate::types::{SkipList, Target};
use crate::version::VersionPolicy;

/// Effective settings for one run: CLI flags layered over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub targets: Vec<Target>,
    pub include_all_taps: bool,
    pub skip: SkipList,
    pub raw_versions: bool,
    pub jobs: usize,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Merge CLI arguments with the config file. Flags can only switch
    /// options on; skip lists are unioned.
    pub fn resolve(args: &CliArgs, cfg: &ConfigFile) -> errors::Result<Self> {
        let targets = args
            .targets
            .iter()
            .map(|t| t.parse::<Target>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut skip = SkipList::parse(&args.skip)?;
        skip.merge(cfg.skip.clone());

        let jobs = args.jobs.unwrap_or(cfg.config.jobs);
        if jobs == 0 {
            return Err(errors::TapbatchError::ConfigError(
                "--jobs must be >= 1 (got 0)".to_string(),
            ));
        }

        Ok(Self {
            targets,
            include_all_taps: args.all_taps || cfg.config.all_taps,
            skip,
            raw_versions: args.raw_versions || cfg.config.raw_versions,
            jobs,
            log_file: args.log_file.clone().or_else(|| cfg.config.log_file.clone()),
        })
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.targets.clone())
            .include_all_taps(self.include_all_taps)
            .skip(self.skip.clone())
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            include_all_taps: self.include_all_taps,
            skip: self.skip.clone(),
            policy: VersionPolicy::new(self.raw_versions),
            jobs: self.jobs,
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - metadata collection (brew or config snapshot)
/// - planning (scope -> graph -> batches)
/// - report rendering on stdout
pub async fn run(settings: Settings, cfg: &ConfigFile) -> Result<()> {
    info!("starting tapbatch");

    let source: Arc<dyn FormulaSource> = if cfg.has_snapshot() {
        debug!(formulae = cfg.formula.len(), "using formula snapshot from config");
        Arc::new(SnapshotSource::from_config(cfg))
    } else {
        Arc::new(BrewSource::default())
    };

    let universe = collect_universe(source, &settings.targets, &settings.collect_options()).await?;
    info!(formulae = universe.len(), "formula metadata collected");

    match plan_updates(&universe, &settings.scope()) {
        Ok(plan) => {
            print!("{}", report::render_plan(&plan));
            Ok(())
        }
        Err(PlanError::CyclicDependency { source, unaffected }) => {
            if !unaffected.is_empty() {
                print!("{}", report::render_plan(&unaffected));
            }
            eprint!("{}", report::render_cycle(&source));
            Err(errors::TapbatchError::from(PlanError::CyclicDependency { source, unaffected }).into())
        }
    }
}
