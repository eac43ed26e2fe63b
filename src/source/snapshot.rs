// src/source/snapshot.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::config::model::{ConfigFile, FormulaEntry};
use crate::errors::Result;
use crate::formula::Formula;
use crate::source::{BoxFuture, FormulaSource};
use crate::types::{QualifiedName, TapName};

/// Formula universe described up front (config file `[formula.*]` tables).
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    entries: BTreeMap<QualifiedName, FormulaEntry>,
}

impl SnapshotSource {
    pub fn new(entries: BTreeMap<QualifiedName, FormulaEntry>) -> Self {
        Self { entries }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.formula.clone())
    }

    fn record(&self, name: &QualifiedName, check_latest: bool) -> Option<Formula> {
        let entry = self.entries.get(name)?;
        let latest = if check_latest {
            entry.latest_or_current()
        } else {
            entry.current.as_str()
        };
        let mut formula = Formula::new(name.clone(), entry.current.clone(), latest);
        formula.dependencies = entry.dependencies.clone();
        formula.source_url = entry.url.clone();
        Some(formula)
    }
}

impl FormulaSource for SnapshotSource {
    fn known_taps(&self) -> BoxFuture<'_, Result<Vec<TapName>>> {
        Box::pin(async move {
            let taps: BTreeSet<TapName> = self
                .entries
                .keys()
                .filter_map(|name| name.tap().parse().ok())
                .collect();
            Ok(taps.into_iter().collect())
        })
    }

    fn tap_formulae<'a>(&'a self, tap: &'a TapName) -> BoxFuture<'a, Result<Vec<QualifiedName>>> {
        Box::pin(async move {
            Ok(self
                .entries
                .keys()
                .filter(|name| name.tap() == tap.as_str())
                .cloned()
                .collect())
        })
    }

    fn describe<'a>(
        &'a self,
        formula: &'a QualifiedName,
        check_latest: bool,
    ) -> BoxFuture<'a, Result<Option<Formula>>> {
        Box::pin(async move { Ok(self.record(formula, check_latest)) })
    }
}
