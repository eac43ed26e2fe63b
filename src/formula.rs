// src/formula.rs

//! Formula records and the universe they live in.
//!
//! Records are built once per run by a [`crate::source::FormulaSource`] and
//! never mutated afterwards; everything downstream only reads them.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{Result, TapbatchError};
use crate::types::{QualifiedName, TapName};

/// Normalised view of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub name: QualifiedName,
    pub current_version: String,
    pub latest_version: String,
    /// Whether an update is pending. Derived by the metadata collaborator,
    /// which may veto a detected version (see [`crate::version`]).
    pub outdated: bool,
    /// Declared build/test/runtime dependencies, as reported. May contain
    /// bare or malformed names.
    pub dependencies: Vec<String>,
    /// Download URL containing the current version, if known.
    pub source_url: Option<String>,
}

impl Formula {
    /// New record; outdated iff the two version strings differ.
    pub fn new(
        name: QualifiedName,
        current_version: impl Into<String>,
        latest_version: impl Into<String>,
    ) -> Self {
        let current_version = current_version.into();
        let latest_version = latest_version.into();
        let outdated = current_version != latest_version;
        Self {
            name,
            current_version,
            latest_version,
            outdated,
            dependencies: Vec::new(),
            source_url: None,
        }
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn tap(&self) -> &str {
        self.name.tap()
    }

    pub fn is_outdated(&self) -> bool {
        self.outdated
    }

    /// Declared dependencies parsed into qualified names.
    ///
    /// Names that cannot be parsed are dropped (treated as resolved) and only
    /// show up in debug logs.
    pub fn resolved_dependencies(&self) -> Vec<QualifiedName> {
        self.dependencies
            .iter()
            .filter_map(|raw| match raw.parse::<QualifiedName>() {
                Ok(dep) => Some(dep),
                Err(err) => {
                    debug!(
                        formula = %self.name,
                        dependency = %raw,
                        error = %err,
                        "dropping malformed dependency reference"
                    );
                    None
                }
            })
            .collect()
    }
}

/// Every formula known for this run, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    formulae: BTreeMap<QualifiedName, Formula>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a universe, rejecting duplicate qualified names.
    pub fn from_formulae(formulae: impl IntoIterator<Item = Formula>) -> Result<Self> {
        let mut universe = Universe::new();
        for formula in formulae {
            universe.insert(formula)?;
        }
        Ok(universe)
    }

    pub fn insert(&mut self, formula: Formula) -> Result<()> {
        if self.formulae.contains_key(&formula.name) {
            return Err(TapbatchError::DuplicateFormula(formula.name.to_string()));
        }
        self.formulae.insert(formula.name.clone(), formula);
        Ok(())
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&Formula> {
        self.formulae.get(name)
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.formulae.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.formulae.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulae.is_empty()
    }

    /// All records in qualified-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Formula> {
        self.formulae.values()
    }

    /// Members of one tap, in qualified-name order.
    pub fn tap_members<'a>(&'a self, tap: &'a TapName) -> impl Iterator<Item = &'a Formula> + 'a {
        self.formulae
            .values()
            .filter(move |f| f.tap() == tap.as_str())
    }

    pub fn has_tap(&self, tap: &TapName) -> bool {
        self.tap_members(tap).next().is_some()
    }
}
