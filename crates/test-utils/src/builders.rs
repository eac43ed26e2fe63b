#![allow(dead_code)]

use std::collections::BTreeMap;

use tapbatch::config::{ConfigFile, ConfigSection, FormulaEntry, RawConfigFile};
use tapbatch::formula::{Formula, Universe};
use tapbatch::types::QualifiedName;

/// Builder for a single `Formula` record.
pub struct FormulaBuilder {
    formula: Formula,
}

impl FormulaBuilder {
    /// Outdated formula (`1.0` -> `1.1`).
    pub fn outdated(name: &str) -> Self {
        Self::versions(name, "1.0", "1.1")
    }

    /// Up-to-date formula (`1.0`).
    pub fn current(name: &str) -> Self {
        Self::versions(name, "1.0", "1.0")
    }

    pub fn versions(name: &str, current: &str, latest: &str) -> Self {
        let name: QualifiedName = name.parse().expect("valid formula name in test");
        Self {
            formula: Formula::new(name, current, latest),
        }
    }

    pub fn dep(mut self, dep: &str) -> Self {
        self.formula.dependencies.push(dep.to_string());
        self
    }

    pub fn deps(mut self, deps: &[&str]) -> Self {
        self.formula
            .dependencies
            .extend(deps.iter().map(|d| d.to_string()));
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.formula.source_url = Some(url.to_string());
        self
    }

    pub fn build(self) -> Formula {
        self.formula
    }
}

/// Builder for a `Universe`.
#[derive(Default)]
pub struct UniverseBuilder {
    formulae: Vec<Formula>,
}

impl UniverseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, formula: FormulaBuilder) -> Self {
        self.formulae.push(formula.build());
        self
    }

    pub fn build(self) -> Universe {
        Universe::from_formulae(self.formulae).expect("Failed to build universe from builder")
    }
}

/// Builder for a snapshot-carrying `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                formula: BTreeMap::new(),
            },
        }
    }

    pub fn with_formula(
        mut self,
        name: &str,
        current: &str,
        latest: Option<&str>,
        deps: &[&str],
    ) -> Self {
        self.config.formula.insert(
            name.to_string(),
            FormulaEntry {
                current: current.to_string(),
                latest: latest.map(str::to_string),
                dependencies: deps.iter().map(|d| d.to_string()).collect(),
                url: None,
            },
        );
        self
    }

    pub fn with_skip(mut self, entry: &str) -> Self {
        self.config.config.skip.push(entry.to_string());
        self
    }

    pub fn all_taps(mut self, val: bool) -> Self {
        self.config.config.all_taps = val;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
