// src/dag/scheduler.rs

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::types::QualifiedName;

/// One layer of the schedule: formulae that may be updated in any order
/// once every earlier batch is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position.
    pub index: usize,
    /// Members, sorted by qualified name.
    pub members: Vec<QualifiedName>,
}

/// Ordered batch partition of a dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    batches: Vec<Batch>,
}

impl Schedule {
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batch index of a formula, if scheduled.
    pub fn batch_index_of(&self, name: &QualifiedName) -> Option<usize> {
        self.batches
            .iter()
            .find(|b| b.members.contains(name))
            .map(|b| b.index)
    }

    /// Every scheduled formula, batch by batch.
    pub fn formulae(&self) -> impl Iterator<Item = &QualifiedName> {
        self.batches.iter().flat_map(|b| b.members.iter())
    }
}

/// The graph could not be fully layered.
///
/// `formulae` is every node left over by the layering: members of a cycle
/// and anything depending on one. `unaffected` holds the schedule of the
/// graph components that touch none of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cyclic dependency among formulae: {}", join_names(.formulae))]
pub struct CyclicDependency {
    pub formulae: Vec<QualifiedName>,
    pub cycles: Vec<Vec<QualifiedName>>,
    pub unaffected: Schedule,
}

pub(crate) fn join_names(names: &[QualifiedName]) -> String {
    names
        .iter()
        .map(QualifiedName::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layer the graph into batches.
///
/// Kahn-style: every round takes the nodes whose in-graph dependencies were
/// all placed in earlier rounds. Each node ends up in the earliest batch its
/// dependencies allow; a dependency always sits in a strictly lower batch
/// than its dependents.
pub fn schedule(graph: &DagGraph) -> Result<Schedule, CyclicDependency> {
    let all: BTreeSet<&QualifiedName> = graph.formulae().collect();
    let (batches, residual) = layer(graph, &all);

    if residual.is_empty() {
        info!(
            formulae = graph.len(),
            batches = batches.len(),
            "dependency graph layered into batches"
        );
        return Ok(Schedule { batches });
    }

    let cycles = graph.cycles();
    let blocked = graph.connected_to(residual.iter().copied());
    let rest: BTreeSet<&QualifiedName> = all.difference(&blocked).copied().collect();
    let (unaffected, leftover) = layer(graph, &rest);
    debug_assert!(leftover.is_empty());

    let formulae: Vec<QualifiedName> = residual.into_iter().cloned().collect();
    warn!(
        cyclic = %join_names(&formulae),
        withheld = blocked.len(),
        "dependency cycle detected; withholding affected components"
    );

    Err(CyclicDependency {
        formulae,
        cycles,
        unaffected: Schedule {
            batches: unaffected,
        },
    })
}

/// Layer the subgraph induced by `nodes`. Returns the batches plus the nodes
/// that could never be placed.
fn layer<'a>(
    graph: &'a DagGraph,
    nodes: &BTreeSet<&'a QualifiedName>,
) -> (Vec<Batch>, BTreeSet<&'a QualifiedName>) {
    // Number of not-yet-placed dependencies per node.
    let mut remaining: BTreeMap<&QualifiedName, usize> = nodes
        .iter()
        .map(|&name| {
            let pending = graph
                .dependencies_of(name)
                .iter()
                .filter(|dep| nodes.contains(dep))
                .count();
            (name, pending)
        })
        .collect();

    let mut ready: Vec<&QualifiedName> = remaining
        .iter()
        .filter(|(_, pending)| **pending == 0)
        .map(|(&name, _)| name)
        .collect();

    let mut batches: Vec<Batch> = Vec::new();

    while !ready.is_empty() {
        for name in &ready {
            remaining.remove(name);
        }

        let mut next: BTreeSet<&QualifiedName> = BTreeSet::new();
        for name in &ready {
            for dependent in graph.dependents_of(name) {
                if let Some(pending) = remaining.get_mut(dependent) {
                    *pending -= 1;
                    if *pending == 0 {
                        next.insert(dependent);
                    }
                }
            }
        }

        let index = batches.len() + 1;
        debug!(batch = index, size = ready.len(), "batch complete");
        batches.push(Batch {
            index,
            members: ready.into_iter().cloned().collect(),
        });
        ready = next.into_iter().collect();
    }

    let residual = remaining.into_keys().collect();
    (batches, residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::scope::Scope;
    use crate::formula::{Formula, Universe};

    fn name(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn graph(entries: &[(&str, &[&str])]) -> DagGraph {
        let universe = Universe::from_formulae(entries.iter().map(|(n, deps)| {
            let mut f = Formula::new(name(n), "1", "2");
            f.dependencies = deps.iter().map(|d| d.to_string()).collect();
            f
        }))
        .unwrap();
        let eligible = universe.iter().map(|f| f.name.clone()).collect();
        DagGraph::build(&universe, &eligible, &Scope::default())
    }

    fn members(schedule: &Schedule) -> Vec<Vec<&str>> {
        schedule
            .batches()
            .iter()
            .map(|b| b.members.iter().map(|n| n.as_str()).collect())
            .collect()
    }

    #[test]
    fn empty_graph_has_no_batches() {
        let schedule = schedule(&DagGraph::default()).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn diamond_is_layered_by_longest_path() {
        let g = graph(&[
            ("t/a/top", &["t/a/left", "t/a/right"]),
            ("t/a/left", &["t/a/base"]),
            ("t/a/right", &["t/a/mid"]),
            ("t/a/mid", &["t/a/base"]),
            ("t/a/base", &[]),
        ]);

        let s = schedule(&g).unwrap();
        assert_eq!(
            members(&s),
            vec![
                vec!["t/a/base"],
                vec!["t/a/left", "t/a/mid"],
                vec!["t/a/right"],
                vec!["t/a/top"],
            ]
        );
        assert_eq!(s.batch_index_of(&name("t/a/top")), Some(4));
        assert_eq!(s.batches()[0].index, 1);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph(&[("t/a/s", &["t/a/s"])]);

        let err = schedule(&g).unwrap_err();
        assert_eq!(err.formulae, vec![name("t/a/s")]);
        assert_eq!(err.cycles, vec![vec![name("t/a/s")]]);
        assert!(err.unaffected.is_empty());
    }

    #[test]
    fn cycle_withholds_its_component_only() {
        let g = graph(&[
            ("t/a/p", &["t/a/q"]),
            ("t/a/q", &["t/a/p", "t/a/leaf"]),
            ("t/a/leaf", &[]),
            ("t/a/user", &["t/a/p"]),
            ("t/a/x", &["t/a/y"]),
            ("t/a/y", &[]),
        ]);

        let err = schedule(&g).unwrap_err();
        assert_eq!(err.formulae, vec![name("t/a/p"), name("t/a/q"), name("t/a/user")]);
        assert_eq!(err.cycles, vec![vec![name("t/a/p"), name("t/a/q")]]);
        assert_eq!(members(&err.unaffected), vec![vec!["t/a/y"], vec!["t/a/x"]]);
        assert!(err.to_string().contains("t/a/p t/a/q t/a/user"));
    }
}
