// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{QualifiedName, SkipList};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// skip = ["mesa", "linuxbrew/xorg/libva"]
/// all_taps = false
/// jobs = 8
///
/// [formula."linuxbrew/xorg/libx11"]
/// current = "1.8.6"
/// latest = "1.8.7"
/// dependencies = ["linuxbrew/xorg/libxcb", "pkg-config"]
/// ```
///
/// All sections are optional. When `[formula.*]` tables are present they
/// describe the whole formula universe and no `brew` commands are run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Keys are formula names (bare names resolve into `homebrew/core`).
    #[serde(default)]
    pub formula: BTreeMap<String, FormulaEntry>,
}

/// `[config]` section: defaults for command-line switches.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Formulae or taps never scheduled. Merged with `--skip`.
    #[serde(default)]
    pub skip: Vec<String>,

    /// Same as `--all`.
    #[serde(default)]
    pub all_taps: bool,

    /// Same as `--raw-versions`.
    #[serde(default)]
    pub raw_versions: bool,

    /// Maximum number of concurrent metadata lookups.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Log file; `--log-file` wins when both are set.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_jobs() -> usize {
    4
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            skip: Vec::new(),
            all_taps: false,
            raw_versions: false,
            jobs: default_jobs(),
            log_file: None,
        }
    }
}

/// `[formula."<name>"]` section of an offline snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct FormulaEntry {
    /// Version currently defined by the formula.
    pub current: String,

    /// Latest upstream version; `None` means up to date.
    #[serde(default)]
    pub latest: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Download URL containing the current version.
    #[serde(default)]
    pub url: Option<String>,
}

impl FormulaEntry {
    pub fn latest_or_current(&self) -> &str {
        self.latest.as_deref().unwrap_or(&self.current)
    }
}

/// Validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub config: ConfigSection,
    /// Parsed `config.skip`.
    pub skip: SkipList,
    /// Snapshot entries keyed by normalised name.
    pub formula: BTreeMap<QualifiedName, FormulaEntry>,
}

impl ConfigFile {
    /// Construct without validation; use `TryFrom<RawConfigFile>` instead.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        skip: SkipList,
        formula: BTreeMap<QualifiedName, FormulaEntry>,
    ) -> Self {
        Self {
            config,
            skip,
            formula,
        }
    }

    /// Whether the file describes a formula universe of its own.
    pub fn has_snapshot(&self) -> bool {
        !self.formula.is_empty()
    }
}
