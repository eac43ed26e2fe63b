// src/source/collect.rs

//! Build the formula universe for a run.
//!
//! Lookups are independent, so each round of the breadth-first dependency
//! walk describes its formulae concurrently (bounded by `jobs`). The
//! scheduler only ever sees the finished [`Universe`].

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{Error, Result};
use crate::formula::{Formula, Universe};
use crate::source::FormulaSource;
use crate::types::{QualifiedName, SkipList, Target, TapName};
use crate::version::VersionPolicy;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub include_all_taps: bool,
    pub skip: SkipList,
    pub policy: VersionPolicy,
    /// Maximum number of concurrent lookups (at least 1).
    pub jobs: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_all_taps: false,
            skip: SkipList::default(),
            policy: VersionPolicy::default(),
            jobs: 4,
        }
    }
}

/// Describe the requested formulae and the dependencies they need.
///
/// Dependencies are followed only from outdated, non-skipped formulae, and
/// only within the same tap unless `include_all_taps` is set. Formulae the
/// source does not know are left out; the scope filter reports requested
/// ones as unresolvable.
pub async fn collect_universe(
    source: Arc<dyn FormulaSource>,
    targets: &[Target],
    opts: &CollectOptions,
) -> Result<Universe> {
    let taps: BTreeSet<TapName> = source.known_taps().await?.into_iter().collect();
    info!("found {} local taps", taps.len());

    let mut seeds: BTreeSet<QualifiedName> = BTreeSet::new();
    for target in targets {
        match target {
            Target::Tap(tap) if taps.contains(tap) => {
                info!(tap = %tap, "processing tap");
                seeds.extend(source.tap_formulae(tap).await?);
            }
            Target::Tap(tap) => {
                warn!(tap = %tap, "tap is not known locally");
            }
            Target::Formula(name) => {
                seeds.insert(name.clone());
            }
        }
    }

    let mut seen = seeds.clone();
    let mut frontier: Vec<QualifiedName> = seeds.into_iter().collect();
    let mut formulae: Vec<Formula> = Vec::new();

    while !frontier.is_empty() {
        info!("checking {} formulae", frontier.len());
        let described = describe_all(&source, std::mem::take(&mut frontier), opts).await?;

        for formula in described {
            if formula.is_outdated() && !opts.skip.contains(&formula.name) {
                for dep in formula.resolved_dependencies() {
                    if !opts.include_all_taps && !dep.shares_tap_with(&formula.name) {
                        continue;
                    }
                    if seen.insert(dep.clone()) {
                        debug!(formula = %formula.name, dependency = %dep, "queueing dependency");
                        frontier.push(dep);
                    }
                }
            }
            formulae.push(formula);
        }
    }

    Universe::from_formulae(formulae)
}

/// Describe a batch of formulae concurrently and apply the version policy.
async fn describe_all(
    source: &Arc<dyn FormulaSource>,
    names: Vec<QualifiedName>,
    opts: &CollectOptions,
) -> Result<Vec<Formula>> {
    let permits = Arc::new(Semaphore::new(opts.jobs.max(1)));
    let mut set = JoinSet::new();

    for name in names {
        let source = Arc::clone(source);
        let permits = Arc::clone(&permits);
        let check_latest = !opts.skip.contains(&name);
        if !check_latest {
            debug!(formula = %name, "skipping latest-version check");
        }

        set.spawn(async move {
            let _permit = permits.acquire_owned().await.map_err(Error::from)?;
            source.describe(&name, check_latest).await
        });
    }

    let mut described = Vec::new();
    while let Some(joined) = set.join_next().await {
        let Some(mut formula) = joined.map_err(Error::from)?? else {
            continue;
        };
        apply_policy(&mut formula, opts.policy);
        described.push(formula);
    }

    described.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(described)
}

fn apply_policy(formula: &mut Formula, policy: VersionPolicy) {
    if !formula.is_outdated() {
        return;
    }
    match policy.check(&formula.current_version, &formula.latest_version) {
        Ok(()) => info!(
            formula = %formula.name,
            "new version found: {} => {}",
            formula.current_version,
            formula.latest_version
        ),
        Err(rejection) => {
            info!(formula = %formula.name, "{rejection}; treating as up to date");
            formula.outdated = false;
        }
    }
}
