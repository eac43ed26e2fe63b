use std::sync::{Arc, Mutex};

use tapbatch::errors::Result;
use tapbatch::formula::Formula;
use tapbatch::source::{BoxFuture, FormulaSource, SnapshotSource};
use tapbatch::types::{QualifiedName, TapName};

/// A snapshot source that records every `describe` call as
/// `(formula, check_latest)`.
pub struct RecordingSource {
    inner: SnapshotSource,
    described: Arc<Mutex<Vec<(String, bool)>>>,
}

impl RecordingSource {
    pub fn new(inner: SnapshotSource, described: Arc<Mutex<Vec<(String, bool)>>>) -> Self {
        Self { inner, described }
    }
}

impl FormulaSource for RecordingSource {
    fn known_taps(&self) -> BoxFuture<'_, Result<Vec<TapName>>> {
        self.inner.known_taps()
    }

    fn tap_formulae<'a>(&'a self, tap: &'a TapName) -> BoxFuture<'a, Result<Vec<QualifiedName>>> {
        self.inner.tap_formulae(tap)
    }

    fn describe<'a>(
        &'a self,
        formula: &'a QualifiedName,
        check_latest: bool,
    ) -> BoxFuture<'a, Result<Option<Formula>>> {
        {
            let mut guard = self.described.lock().unwrap();
            guard.push((formula.to_string(), check_latest));
        }
        self.inner.describe(formula, check_latest)
    }
}
