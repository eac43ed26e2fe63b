// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::model::{ConfigFile, FormulaEntry, RawConfigFile};
use crate::errors::{Result, TapbatchError};
use crate::types::{QualifiedName, SkipList};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TapbatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_global_config(&raw)?;
        let skip = validate_skip_list(&raw)?;
        let formula = validate_formulae(raw.formula)?;
        Ok(ConfigFile::new_unchecked(raw.config, skip, formula))
    }
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.jobs == 0 {
        return Err(TapbatchError::ConfigError(
            "[config].jobs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_skip_list(cfg: &RawConfigFile) -> Result<SkipList> {
    SkipList::parse(&cfg.config.skip)
        .map_err(|e| TapbatchError::ConfigError(format!("invalid entry in [config].skip: {e}")))
}

fn validate_formulae(
    raw: BTreeMap<String, FormulaEntry>,
) -> Result<BTreeMap<QualifiedName, FormulaEntry>> {
    let mut formulae = BTreeMap::new();

    for (key, entry) in raw {
        let name: QualifiedName = key.parse().map_err(|e| {
            TapbatchError::ConfigError(format!("invalid formula name [formula.\"{key}\"]: {e}"))
        })?;

        if entry.current.trim().is_empty() {
            return Err(TapbatchError::ConfigError(format!(
                "formula '{name}' has an empty `current` version"
            )));
        }
        if entry.latest.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(TapbatchError::ConfigError(format!(
                "formula '{name}' has an empty `latest` version"
            )));
        }

        // Dependencies are not checked: they may point outside the snapshot,
        // which just means "already up to date".
        if formulae.insert(name.clone(), entry).is_some() {
            return Err(TapbatchError::ConfigError(format!(
                "formula '{name}' is listed more than once (key '{key}')"
            )));
        }
    }

    Ok(formulae)
}
