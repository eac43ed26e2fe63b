// src/plan.rs

//! Update planning pipeline and result assembly.
//!
//! `plan_updates` runs scope filter -> graph builder -> batch scheduler and
//! joins the resulting batches back to full formula records so the report
//! layer has versions and URLs at hand.

use thiserror::Error;
use tracing::debug;

use crate::dag::{eligible_set, schedule, CyclicDependency, DagGraph, Schedule, Scope, ScopeWarning};
use crate::formula::{Formula, Universe};
use crate::types::QualifiedName;

/// A formula as it appears in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFormula {
    pub formula: Formula,
    /// In-graph dependencies, i.e. the outdated ones that must go first.
    pub outdated_dependencies: Vec<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBatch {
    pub index: usize,
    pub formulae: Vec<PlannedFormula>,
}

/// Everything the report layer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub batches: Vec<PlannedBatch>,
    pub warnings: Vec<ScopeWarning>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// All planned formulae, batch by batch.
    pub fn formulae(&self) -> impl Iterator<Item = &PlannedFormula> {
        self.batches.iter().flat_map(|b| b.formulae.iter())
    }
}

#[derive(Error, Debug)]
pub enum PlanError {
    /// Scheduling hit a cycle. `unaffected` is the plan for the components
    /// that are not involved.
    #[error("{source}")]
    CyclicDependency {
        source: CyclicDependency,
        unaffected: UpdatePlan,
    },
}

/// Join batch membership back to formula records, keeping batch order.
pub fn assemble(schedule: &Schedule, graph: &DagGraph, universe: &Universe) -> Vec<PlannedBatch> {
    schedule
        .batches()
        .iter()
        .map(|batch| PlannedBatch {
            index: batch.index,
            formulae: batch
                .members
                .iter()
                .filter_map(|name| {
                    universe.get(name).map(|formula| PlannedFormula {
                        formula: formula.clone(),
                        outdated_dependencies: graph.dependencies_of(name).to_vec(),
                    })
                })
                .collect(),
        })
        .collect()
}

/// Plan the updates for `scope` over a fully materialised universe.
pub fn plan_updates(universe: &Universe, scope: &Scope) -> Result<UpdatePlan, PlanError> {
    let eligible = eligible_set(universe, scope);
    debug!(
        eligible = eligible.formulae.len(),
        warnings = eligible.warnings.len(),
        "scope resolved"
    );

    let graph = DagGraph::build(universe, &eligible.formulae, scope);
    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        "dependency graph built"
    );

    match schedule(&graph) {
        Ok(schedule) => Ok(UpdatePlan {
            batches: assemble(&schedule, &graph, universe),
            warnings: eligible.warnings,
        }),
        Err(cycle) => {
            let unaffected = UpdatePlan {
                batches: assemble(&cycle.unaffected, &graph, universe),
                warnings: eligible.warnings,
            };
            Err(PlanError::CyclicDependency {
                source: cycle,
                unaffected,
            })
        }
    }
}
