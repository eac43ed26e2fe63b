// src/dag/mod.rs

//! Dependency graph construction and batch scheduling.
//!
//! - [`scope`] decides which formulae are eligible graph nodes.
//! - [`graph`] builds the dependency graph over the eligible set.
//! - [`scheduler`] layers the graph into ordered batches and reports cycles.

pub mod graph;
pub mod scheduler;
pub mod scope;

pub use graph::DagGraph;
pub use scheduler::{schedule, Batch, CyclicDependency, Schedule};
pub use scope::{eligible_set, EligibleSet, Scope, ScopeWarning};
