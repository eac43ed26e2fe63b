// src/report.rs

//! Human-readable rendering of an [`UpdatePlan`].
//!
//! Everything here returns a `String`; the caller decides where it goes.

use std::fmt::Write as _;

use crate::dag::CyclicDependency;
use crate::formula::Formula;
use crate::plan::{PlannedFormula, UpdatePlan};
use crate::types::QualifiedName;

const FORMULA_HEADER: &str = "Formula";
const CURRENT_HEADER: &str = "Current version";
const LATEST_HEADER: &str = "New version";
const DEPS_HEADER: &str = "Outdated dependencies";
/// The dependency column never grows wider than this.
const DEPS_MAX_WIDTH: usize = 32;

const VERIFY_NOTICE: &str = "\
Please verify that URLs exist before executing the above commands!
Consider adding 'version \"x.y.z\"' to the formula if detected 'new_version' is likely
to cause problems for Homebrew version detection mechanism.
";

/// Full report: warnings, summary table, batches and suggested commands.
pub fn render_plan(plan: &UpdatePlan) -> String {
    let mut out = String::new();

    for warning in &plan.warnings {
        let _ = writeln!(out, "Warning: {warning}");
    }

    if plan.is_empty() {
        out.push_str("Nothing to update.\n");
        return out;
    }

    out.push_str(&render_table(plan));
    out.push_str(&render_batches(plan));
    out.push_str(&render_suggestions(plan));
    out
}

/// Summary table of every planned formula.
pub fn render_table(plan: &UpdatePlan) -> String {
    let rows: Vec<&PlannedFormula> = plan.formulae().collect();

    let col1 = column_width(rows.iter().map(|r| r.formula.name.as_str().len()), FORMULA_HEADER);
    let col2 = column_width(rows.iter().map(|r| r.formula.current_version.len()), CURRENT_HEADER);
    let col3 = column_width(rows.iter().map(|r| r.formula.latest_version.len()), LATEST_HEADER);
    let col4 = column_width(
        rows.iter().map(|r| dependency_cell(&r.outdated_dependencies).len()),
        DEPS_HEADER,
    )
    .min(DEPS_MAX_WIDTH + 2);
    let separator = "=".repeat(col1 + col2 + col3 + col4 + 3);

    let mut out = String::new();
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(
        out,
        "{FORMULA_HEADER:^col1$}|{CURRENT_HEADER:^col2$}|{LATEST_HEADER:^col3$}|{DEPS_HEADER:^col4$}"
    );
    let _ = writeln!(out, "{separator}");

    for row in rows {
        let f = &row.formula;
        let _ = writeln!(
            out,
            "{:<col1$}|{:^col2$}|{:^col3$}|{:<col4$}",
            f.name.as_str(),
            f.current_version,
            f.latest_version,
            dependency_cell(&row.outdated_dependencies),
        );
    }
    let _ = writeln!(out, "{separator}");
    out
}

/// `Batch N: a b c` lines.
pub fn render_batches(plan: &UpdatePlan) -> String {
    let mut out = String::new();
    for batch in &plan.batches {
        let names: Vec<&str> = batch.formulae.iter().map(|p| p.formula.name.as_str()).collect();
        let _ = writeln!(out, "Batch {}: {}", batch.index, names.join(" "));
    }
    out
}

/// Suggested `brew bump-formula-pr` commands for the first batch.
pub fn render_suggestions(plan: &UpdatePlan) -> String {
    let Some(first) = plan.batches.first() else {
        return String::new();
    };

    let mut out = String::from("Suggested commands for updating formulae in Batch 1:\n");
    for planned in &first.formulae {
        match suggested_command(&planned.formula) {
            Some(cmd) => {
                let _ = writeln!(out, "  {cmd}");
            }
            None => {
                let _ = writeln!(
                    out,
                    "  {}: couldn't match url in the formula file",
                    planned.formula.name
                );
            }
        }
    }
    out.push('\n');
    out.push_str(VERIFY_NOTICE);
    out
}

/// Cycle report for a failed plan.
pub fn render_cycle(cycle: &CyclicDependency) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Error: dependency cycle detected; these formulae can't be scheduled:"
    );
    for name in &cycle.formulae {
        let _ = writeln!(out, "  {name}");
    }
    for members in &cycle.cycles {
        let names: Vec<&str> = members.iter().map(QualifiedName::as_str).collect();
        let _ = writeln!(out, "cycle: {}", names.join(" -> "));
    }
    out
}

/// Download URL for the latest version: the current URL with the current
/// version replaced everywhere.
pub fn suggested_url(formula: &Formula) -> Option<String> {
    let url = formula.source_url.as_deref()?;
    if formula.current_version.is_empty() || !url.contains(&formula.current_version) {
        return None;
    }
    Some(url.replace(&formula.current_version, &formula.latest_version))
}

pub fn suggested_command(formula: &Formula) -> Option<String> {
    suggested_url(formula)
        .map(|url| format!("brew bump-formula-pr --no-browse --url={url} {}", formula.name))
}

fn column_width(lengths: impl Iterator<Item = usize>, header: &str) -> usize {
    lengths.chain(std::iter::once(header.len())).max().unwrap_or(0) + 2
}

fn dependency_cell(deps: &[QualifiedName]) -> String {
    let names: Vec<&str> = deps.iter().map(QualifiedName::as_str).collect();
    format!(" {}", names.join(" "))
}
