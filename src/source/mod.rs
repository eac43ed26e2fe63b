// src/source/mod.rs

//! Formula metadata sources.
//!
//! The planner never talks to the package manager itself. A
//! [`FormulaSource`] answers three questions (which taps exist, which
//! formulae a tap holds, what one formula looks like) and
//! [`collect::collect_universe`] turns those answers into a complete,
//! immutable [`crate::formula::Universe`].
//!
//! - [`brew`] queries a local Homebrew installation.
//! - [`snapshot`] serves the `[formula.*]` tables of a config file.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::formula::Formula;
use crate::types::{QualifiedName, TapName};

pub mod brew;
pub mod collect;
pub mod snapshot;

pub use brew::BrewSource;
pub use collect::{collect_universe, CollectOptions};
pub use snapshot::SnapshotSource;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstracting where formula metadata comes from.
///
/// Production code uses [`BrewSource`]; offline runs and tests use
/// [`SnapshotSource`].
pub trait FormulaSource: Send + Sync {
    /// Taps available locally.
    fn known_taps(&self) -> BoxFuture<'_, Result<Vec<TapName>>>;

    /// Formulae defined by one tap.
    fn tap_formulae<'a>(&'a self, tap: &'a TapName) -> BoxFuture<'a, Result<Vec<QualifiedName>>>;

    /// Versions, dependencies and URL of one formula.
    ///
    /// Returns `Ok(None)` when the formula is unknown. With
    /// `check_latest == false` no upstream lookup happens and the record is
    /// reported as up to date.
    fn describe<'a>(
        &'a self,
        formula: &'a QualifiedName,
        check_latest: bool,
    ) -> BoxFuture<'a, Result<Option<Formula>>>;
}
