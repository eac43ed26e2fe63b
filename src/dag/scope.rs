// src/dag/scope.rs

//! Scope filter: which formulae may become graph nodes.
//!
//! Requested targets seed the traversal (taps expand to their members). A
//! formula is eligible when it is outdated and not skipped. Dependencies of
//! eligible formulae are followed transitively; a dependency in another tap is
//! only followed when all taps are included.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace, warn};

use crate::formula::Universe;
use crate::types::{QualifiedName, SkipList, Target};

/// Caller-supplied scheduling parameters.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub requested: Vec<Target>,
    pub include_all_taps: bool,
    pub skip: SkipList,
}

impl Scope {
    pub fn new(requested: Vec<Target>) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    pub fn include_all_taps(mut self, include: bool) -> Self {
        self.include_all_taps = include;
        self
    }

    pub fn skip(mut self, skip: SkipList) -> Self {
        self.skip = skip;
        self
    }

    /// Whether an edge from `dependent` to `dependency` may exist at all.
    pub fn allows_dependency(&self, dependent: &QualifiedName, dependency: &QualifiedName) -> bool {
        self.include_all_taps || dependent.shares_tap_with(dependency)
    }
}

/// Non-fatal problems found while resolving the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeWarning {
    /// The requested tap or formula is not part of the universe.
    UnresolvableTarget(Target),
}

impl std::fmt::Display for ScopeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeWarning::UnresolvableTarget(target) => {
                write!(f, "can't resolve '{target}': no such tap or formula")
            }
        }
    }
}

/// Output of the scope filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleSet {
    pub formulae: BTreeSet<QualifiedName>,
    pub warnings: Vec<ScopeWarning>,
}

/// Compute the eligible set for `scope` over `universe`.
pub fn eligible_set(universe: &Universe, scope: &Scope) -> EligibleSet {
    let mut warnings = Vec::new();
    let mut roots: Vec<QualifiedName> = Vec::new();

    for target in &scope.requested {
        match target {
            Target::Tap(tap) if universe.has_tap(tap) => {
                roots.extend(universe.tap_members(tap).map(|f| f.name.clone()));
            }
            Target::Formula(name) if universe.contains(name) => {
                roots.push(name.clone());
            }
            _ => {
                warn!(target = %target, "requested target not found; continuing without it");
                warnings.push(ScopeWarning::UnresolvableTarget(target.clone()));
            }
        }
    }

    let is_candidate = |name: &QualifiedName| -> bool {
        if scope.skip.contains(name) {
            debug!(formula = %name, "formula is in the skip list");
            return false;
        }
        universe.get(name).is_some_and(|f| f.is_outdated())
    };

    let mut eligible = BTreeSet::new();
    let mut visited: HashSet<QualifiedName> = HashSet::new();
    let mut stack: Vec<QualifiedName> = Vec::new();

    for root in roots {
        if visited.insert(root.clone()) && is_candidate(&root) {
            eligible.insert(root.clone());
            stack.push(root);
        }
    }

    while let Some(current) = stack.pop() {
        let Some(formula) = universe.get(&current) else {
            continue;
        };

        for dep in formula.resolved_dependencies() {
            if !scope.allows_dependency(&current, &dep) {
                trace!(
                    formula = %current,
                    dependency = %dep,
                    "dependency in another tap treated as satisfied"
                );
                continue;
            }
            if !visited.insert(dep.clone()) {
                continue;
            }
            if is_candidate(&dep) {
                debug!(formula = %current, dependency = %dep, "pulling in outdated dependency");
                eligible.insert(dep.clone());
                stack.push(dep);
            }
        }
    }

    EligibleSet {
        formulae: eligible,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;

    fn name(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn formula(n: &str, outdated: bool, deps: &[&str]) -> Formula {
        let mut f = Formula::new(name(n), "1.0", if outdated { "1.1" } else { "1.0" });
        f.dependencies = deps.iter().map(|d| d.to_string()).collect();
        f
    }

    fn names(set: &EligibleSet) -> Vec<&str> {
        set.formulae.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn tap_targets_expand_to_outdated_members() {
        let universe = Universe::from_formulae([
            formula("t/a/x", true, &[]),
            formula("t/a/y", false, &[]),
            formula("t/b/z", true, &[]),
        ])
        .unwrap();
        let scope = Scope::new(vec!["t/a".parse().unwrap()]);

        let set = eligible_set(&universe, &scope);
        assert_eq!(names(&set), vec!["t/a/x"]);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn dependencies_are_followed_transitively() {
        let universe = Universe::from_formulae([
            formula("t/a/x", true, &["t/a/y"]),
            formula("t/a/y", true, &["t/a/z"]),
            formula("t/a/z", true, &["t/a/x"]),
        ])
        .unwrap();
        let scope = Scope::new(vec!["t/a/x".parse().unwrap()]);

        let set = eligible_set(&universe, &scope);
        assert_eq!(names(&set), vec!["t/a/x", "t/a/y", "t/a/z"]);
    }

    #[test]
    fn up_to_date_dependencies_stop_the_traversal() {
        let universe = Universe::from_formulae([
            formula("t/a/x", true, &["t/a/y"]),
            formula("t/a/y", false, &["t/a/z"]),
            formula("t/a/z", true, &[]),
        ])
        .unwrap();
        let scope = Scope::new(vec!["t/a/x".parse().unwrap()]);

        assert_eq!(names(&eligible_set(&universe, &scope)), vec!["t/a/x"]);
    }

    #[test]
    fn unknown_targets_become_warnings() {
        let universe = Universe::from_formulae([formula("t/a/x", true, &[])]).unwrap();
        let scope = Scope::new(vec![
            "t/a/x".parse().unwrap(),
            "t/a/missing".parse().unwrap(),
            "no/tap".parse().unwrap(),
        ]);

        let set = eligible_set(&universe, &scope);
        assert_eq!(names(&set), vec!["t/a/x"]);
        assert_eq!(
            set.warnings,
            vec![
                ScopeWarning::UnresolvableTarget("t/a/missing".parse().unwrap()),
                ScopeWarning::UnresolvableTarget("no/tap".parse().unwrap()),
            ]
        );
    }

    #[test]
    fn skipped_tap_removes_its_members() {
        let universe = Universe::from_formulae([
            formula("t/a/x", true, &["t/b/y"]),
            formula("t/b/y", true, &[]),
        ])
        .unwrap();
        let scope = Scope::new(vec!["t/a/x".parse().unwrap()])
            .include_all_taps(true)
            .skip(SkipList::parse(["t/b"]).unwrap());

        assert_eq!(names(&eligible_set(&universe, &scope)), vec!["t/a/x"]);
    }
}
