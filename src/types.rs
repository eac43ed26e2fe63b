// src/types.rs

//! Names used throughout the crate: taps, fully qualified formula names,
//! requested targets and skip lists.
//!
//! Grammar (shared by the command line, config files and dependency lists):
//! - `user/repo` is a tap,
//! - `user/repo/formula` is a fully qualified formula,
//! - a bare `formula` is shorthand for `homebrew/core/formula`.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Tap that bare formula names resolve into.
pub const CORE_TAP: &str = "homebrew/core";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("empty name")]
    Empty,

    #[error("malformed tap name '{0}' (expected user/repo)")]
    MalformedTap(String),

    #[error("malformed formula name '{0}' (expected formula or user/repo/formula)")]
    MalformedFormula(String),

    #[error("don't know how to interpret '{0}' (expected formula, user/repo or user/repo/formula)")]
    MalformedTarget(String),
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.chars().any(char::is_whitespace)
}

/// A tap identifier, `user/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TapName(String);

impl TapName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TapName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        match s.split_once('/') {
            Some((user, repo)) if valid_segment(user) && valid_segment(repo) && !repo.contains('/') => {
                Ok(TapName(s.to_string()))
            }
            _ => Err(NameError::MalformedTap(s.to_string())),
        }
    }
}

impl fmt::Display for TapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Globally unique formula name, `user/repo/formula`.
///
/// Ordering is plain lexicographic order of the full name, which is the
/// tie-break used for batch members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Join a tap and a formula name. The formula name is not validated.
    pub fn new(tap: &TapName, name: &str) -> Self {
        QualifiedName(format!("{tap}/{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `user/repo` part.
    pub fn tap(&self) -> &str {
        self.0.rsplit_once('/').map(|(tap, _)| tap).unwrap_or("")
    }

    /// Short formula name without the tap prefix.
    pub fn name(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, name)| name).unwrap_or(&self.0)
    }

    pub fn shares_tap_with(&self, other: &QualifiedName) -> bool {
        self.tap() == other.tap()
    }
}

impl FromStr for QualifiedName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        let segments: Vec<&str> = s.split('/').collect();
        if !segments.iter().all(|seg| valid_segment(seg)) {
            return Err(NameError::MalformedFormula(s.to_string()));
        }
        match segments.len() {
            1 => Ok(QualifiedName(format!("{CORE_TAP}/{s}"))),
            3 => Ok(QualifiedName(s.to_string())),
            _ => Err(NameError::MalformedFormula(s.to_string())),
        }
    }
}

impl Borrow<str> for QualifiedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something the caller asked to update: a whole tap or a single formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Tap(TapName),
    Formula(QualifiedName),
}

impl FromStr for Target {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.matches('/').count() {
            1 => s.parse().map(Target::Tap),
            0 | 2 => s.parse().map(Target::Formula),
            _ => Err(NameError::MalformedTarget(s.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Tap(tap) => write!(f, "{tap}"),
            Target::Formula(name) => write!(f, "{name}"),
        }
    }
}

/// Formulae (and whole taps) excluded from the dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    taps: BTreeSet<TapName>,
    formulae: BTreeSet<QualifiedName>,
}

impl SkipList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every entry, failing on the first malformed one.
    pub fn parse<I, S>(entries: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skip = SkipList::new();
        for entry in entries {
            skip.insert(entry.as_ref().parse()?);
        }
        Ok(skip)
    }

    pub fn insert(&mut self, target: Target) {
        match target {
            Target::Tap(tap) => {
                self.taps.insert(tap);
            }
            Target::Formula(name) => {
                self.formulae.insert(name);
            }
        }
    }

    /// Union of two skip lists (CLI entries merged with config entries).
    pub fn merge(&mut self, other: SkipList) {
        self.taps.extend(other.taps);
        self.formulae.extend(other.formulae);
    }

    pub fn contains(&self, formula: &QualifiedName) -> bool {
        self.formulae.contains(formula) || self.taps.iter().any(|t| t.as_str() == formula.tap())
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty() && self.formulae.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_resolve_into_core_tap() {
        let name: QualifiedName = "cmake".parse().unwrap();
        assert_eq!(name.as_str(), "homebrew/core/cmake");
        assert_eq!(name.tap(), "homebrew/core");
        assert_eq!(name.name(), "cmake");
    }

    #[test]
    fn qualified_names_keep_their_tap() {
        let name: QualifiedName = "linuxbrew/xorg/libx11".parse().unwrap();
        assert_eq!(name.tap(), "linuxbrew/xorg");
        assert_eq!(name.name(), "libx11");
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!("a/b".parse::<QualifiedName>().is_err());
        assert!("a//c".parse::<QualifiedName>().is_err());
        assert!("a/b/c/d".parse::<QualifiedName>().is_err());
        assert!("lib x".parse::<QualifiedName>().is_err());
        assert_eq!("  ".parse::<QualifiedName>(), Err(NameError::Empty));
    }

    #[test]
    fn targets_are_classified_by_slash_count() {
        assert_eq!(
            "linuxbrew/xorg".parse::<Target>().unwrap(),
            Target::Tap("linuxbrew/xorg".parse().unwrap())
        );
        assert_eq!(
            "mesa".parse::<Target>().unwrap(),
            Target::Formula("homebrew/core/mesa".parse().unwrap())
        );
        assert!(matches!(
            "a/b/c/d".parse::<Target>(),
            Err(NameError::MalformedTarget(_))
        ));
    }

    #[test]
    fn skip_list_matches_formulae_and_whole_taps() {
        let skip = SkipList::parse(["mesa", "linuxbrew/extra", "linuxbrew/xorg/libva"]).unwrap();

        assert!(skip.contains(&"homebrew/core/mesa".parse().unwrap()));
        assert!(skip.contains(&"linuxbrew/extra/anything".parse().unwrap()));
        assert!(skip.contains(&"linuxbrew/xorg/libva".parse().unwrap()));
        assert!(!skip.contains(&"linuxbrew/xorg/libx11".parse().unwrap()));
    }
}
