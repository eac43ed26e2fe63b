// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::dag::scope::Scope;
use crate::formula::Universe;
use crate::types::QualifiedName;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies that are themselves nodes.
    deps: Vec<QualifiedName>,
    /// Direct dependents: nodes that depend on this one.
    dependents: Vec<QualifiedName>,
}

/// Dependency graph over eligible formulae, keyed by qualified name.
///
/// An edge `A -> B` means "A depends on B" and only exists when B is a node
/// as well. The graph is not assumed to be acyclic.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: BTreeMap<QualifiedName, DagNode>,
}

impl DagGraph {
    /// Build the graph for an eligible set.
    ///
    /// Every eligible name becomes a node. Dependencies outside the set, or
    /// in another tap when the scope excludes other taps, produce no edge.
    pub fn build(universe: &Universe, eligible: &BTreeSet<QualifiedName>, scope: &Scope) -> Self {
        let mut nodes: BTreeMap<QualifiedName, DagNode> = eligible
            .iter()
            .map(|name| (name.clone(), DagNode::default()))
            .collect();

        // First pass: dependency lists, deduplicated and sorted.
        for name in eligible {
            let Some(formula) = universe.get(name) else {
                continue;
            };
            let deps: BTreeSet<QualifiedName> = formula
                .resolved_dependencies()
                .into_iter()
                .filter(|dep| eligible.contains(dep) && scope.allows_dependency(name, dep))
                .collect();
            if let Some(node) = nodes.get_mut(name) {
                node.deps = deps.into_iter().collect();
            }
        }

        // Second pass: populate dependents based on deps.
        let edges: Vec<(QualifiedName, QualifiedName)> = nodes
            .iter()
            .flat_map(|(name, node)| node.deps.iter().map(move |dep| (name.clone(), dep.clone())))
            .collect();
        for (dependent, dep) in edges {
            if let Some(dep_node) = nodes.get_mut(&dep) {
                dep_node.dependents.push(dependent);
            }
        }

        Self { nodes }
    }

    /// All node names, sorted.
    pub fn formulae(&self) -> impl Iterator<Item = &QualifiedName> {
        self.nodes.keys()
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every edge `(dependent, dependency)`.
    pub fn edges(&self) -> impl Iterator<Item = (&QualifiedName, &QualifiedName)> {
        self.nodes
            .iter()
            .flat_map(|(name, node)| node.deps.iter().map(move |dep| (name, dep)))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.deps.len()).sum()
    }

    /// Immediate in-graph dependencies of a formula.
    pub fn dependencies_of(&self, name: &QualifiedName) -> &[QualifiedName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a formula.
    pub fn dependents_of(&self, name: &QualifiedName) -> &[QualifiedName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Strongly connected components that form a cycle (more than one member,
    /// or a single member depending on itself). Members and components are
    /// sorted.
    pub fn cycles(&self) -> Vec<Vec<QualifiedName>> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.nodes.keys() {
            graph.add_node(name.as_str());
        }
        for (dependent, dep) in self.edges() {
            graph.add_edge(dependent.as_str(), dep.as_str(), ());
        }

        let mut cycles: Vec<Vec<QualifiedName>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<QualifiedName> = scc
                    .into_iter()
                    .filter_map(|n| self.nodes.get_key_value(n).map(|(k, _)| k.clone()))
                    .collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Every node weakly connected to any of `seeds` (seeds included).
    pub fn connected_to<'a>(
        &'a self,
        seeds: impl IntoIterator<Item = &'a QualifiedName>,
    ) -> BTreeSet<&'a QualifiedName> {
        let mut seen: BTreeSet<&QualifiedName> = BTreeSet::new();
        let mut stack: Vec<&QualifiedName> = seeds.into_iter().collect();

        while let Some(name) = stack.pop() {
            let Some((key, node)) = self.nodes.get_key_value(name) else {
                continue;
            };
            if !seen.insert(key) {
                continue;
            }
            stack.extend(node.deps.iter());
            stack.extend(node.dependents.iter());
        }

        seen
    }
}
