// src/source/brew.rs

//! Metadata from a local Homebrew installation.
//!
//! Every question is answered by running `brew` with `tokio::process`:
//! - `brew tap` lists taps,
//! - `brew --repo <tap>` locates a tap; its `*.rb` files are its formulae,
//! - `brew livecheck <f>` reports `name : current ==> latest`; a failed or
//!   unparseable check means "up to date",
//! - `brew deps --include-build --include-test --full-name <f>` lists
//!   dependencies, asked only for outdated formulae,
//! - `brew formula <f>` locates the formula file, whose `url` line gives
//!   the download URL for the current version. It also tells known from
//!   unknown formulae when livecheck had nothing to say.

use std::path::{Path, PathBuf};
use std::process::Output;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{Result, TapbatchError};
use crate::formula::Formula;
use crate::source::{BoxFuture, FormulaSource};
use crate::types::{QualifiedName, TapName};

/// Subdirectories of a tap that may hold formula files, in lookup order.
const FORMULA_DIRS: [&str; 3] = ["Formula", "HomebrewFormula", ""];

#[derive(Debug, Clone)]
pub struct BrewSource {
    program: PathBuf,
}

impl Default for BrewSource {
    fn default() -> Self {
        Self::new("brew")
    }
}

impl BrewSource {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(program = %self.program.display(), ?args, "running brew");
        Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TapbatchError::BrewError(format!(
                    "spawning `{} {}`: {e}",
                    self.program.display(),
                    args.join(" ")
                ))
            })
    }

    /// Run and require a zero exit status.
    async fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(TapbatchError::BrewError(format!(
                "`brew {}` exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `(current, latest)` from `brew livecheck`, or `None` when livecheck
    /// fails or prints nothing usable.
    async fn livecheck(&self, formula: &QualifiedName) -> Result<Option<(String, String)>> {
        let output = self.run(&["livecheck", formula.as_str()]).await?;
        if !output.status.success() {
            warn!(
                formula = %formula,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "'brew livecheck' failed; treating formula as up to date"
            );
            return Ok(None);
        }
        let parsed = parse_livecheck(&String::from_utf8_lossy(&output.stdout));
        if parsed.is_none() {
            warn!(formula = %formula, "can't process output of 'brew livecheck'");
        }
        Ok(parsed)
    }

    /// Whether `brew formula` can locate the formula file.
    async fn exists(&self, formula: &QualifiedName) -> Result<bool> {
        Ok(self.run(&["formula", formula.as_str()]).await?.status.success())
    }

    async fn source_url(&self, formula: &QualifiedName, current: &str) -> Option<String> {
        let path = match self.run_ok(&["formula", formula.as_str()]).await {
            Ok(stdout) => PathBuf::from(stdout.trim()),
            Err(err) => {
                debug!(formula = %formula, error = %err, "could not locate formula file");
                return None;
            }
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => extract_url(&contents, current),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "could not read formula file");
                None
            }
        }
    }
}

impl FormulaSource for BrewSource {
    fn known_taps(&self) -> BoxFuture<'_, Result<Vec<TapName>>> {
        Box::pin(async move {
            let stdout = self.run_ok(&["tap"]).await?;
            Ok(parse_taps(&stdout))
        })
    }

    fn tap_formulae<'a>(&'a self, tap: &'a TapName) -> BoxFuture<'a, Result<Vec<QualifiedName>>> {
        Box::pin(async move {
            let repo = PathBuf::from(self.run_ok(&["--repo", tap.as_str()]).await?.trim());
            debug!(tap = %tap, location = %repo.display(), "tap location");

            let files = formula_files(&repo).await?;
            debug!(tap = %tap, count = files.len(), "found formula files");

            Ok(files
                .iter()
                .filter_map(|file| file.file_stem().and_then(|s| s.to_str()))
                .map(|stem| QualifiedName::new(tap, stem))
                .collect())
        })
    }

    fn describe<'a>(
        &'a self,
        formula: &'a QualifiedName,
        check_latest: bool,
    ) -> BoxFuture<'a, Result<Option<Formula>>> {
        Box::pin(async move {
            let versions = if check_latest {
                self.livecheck(formula).await?
            } else {
                None
            };

            let Some((current, latest)) = versions else {
                if !self.exists(formula).await? {
                    warn!(formula = %formula, "brew doesn't know this formula; treating it as unknown");
                    return Ok(None);
                }
                return Ok(Some(Formula::new(formula.clone(), "", "")));
            };

            let mut record = Formula::new(formula.clone(), current, latest);
            if !record.is_outdated() {
                return Ok(Some(record));
            }

            let deps = self
                .run(&[
                    "deps",
                    "--include-build",
                    "--include-test",
                    "--full-name",
                    formula.as_str(),
                ])
                .await?;
            if deps.status.success() {
                record.dependencies = String::from_utf8_lossy(&deps.stdout)
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
            } else {
                warn!(
                    formula = %formula,
                    stderr = %String::from_utf8_lossy(&deps.stderr).trim(),
                    "brew can't list dependencies; assuming none"
                );
            }
            record.source_url = self.source_url(formula, &record.current_version).await;

            Ok(Some(record))
        })
    }
}

/// Parse `brew tap` output.
pub fn parse_taps(stdout: &str) -> Vec<TapName> {
    stdout
        .split_whitespace()
        .filter_map(|t| t.parse().ok())
        .collect()
}

/// Parse `brew livecheck` output into `(current, latest)`.
///
/// Accepts both `name : 1.0 ==> 1.1` and `name: 1.0 ==> 1.1`.
pub fn parse_livecheck(stdout: &str) -> Option<(String, String)> {
    let line = stdout.lines().find(|l| l.contains(" ==> "))?;
    let (left, latest) = line.split_once(" ==> ")?;
    let (_, current) = left
        .split_once(" : ")
        .or_else(|| left.rsplit_once(": "))?;

    let (current, latest) = (current.trim(), latest.trim());
    if current.is_empty() || latest.is_empty() {
        return None;
    }
    Some((current.to_string(), latest.to_string()))
}

/// Find the `url "..."` in a formula file that contains `version`.
pub fn extract_url(contents: &str, version: &str) -> Option<String> {
    if version.is_empty() {
        return None;
    }
    let pattern = format!(r#"\burl\s+"([^ "]*{}[^ "]*)""#, regex::escape(version));
    let re = Regex::new(&pattern).ok()?;
    contents
        .lines()
        .find_map(|line| re.captures(line))
        .map(|caps| caps[1].to_string())
}

/// All `*.rb` files in the formula directories of a tap checkout.
async fn formula_files(repo: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for sub in FORMULA_DIRS {
        let dir = repo.join(sub);
        if !is_dir(&dir).await {
            continue;
        }
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "rb") && is_file(&path).await {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn livecheck_output_variants() {
        assert_eq!(
            parse_livecheck("libx11 : 1.8.6 ==> 1.8.7\n"),
            Some(("1.8.6".to_string(), "1.8.7".to_string()))
        );
        assert_eq!(
            parse_livecheck("linuxbrew/xorg/libx11: 1.8.6 ==> 1.8.7"),
            Some(("1.8.6".to_string(), "1.8.7".to_string()))
        );
        assert_eq!(parse_livecheck(""), None);
        assert_eq!(parse_livecheck("Error: no livecheck block"), None);
    }

    #[test]
    fn url_is_matched_by_version() {
        let rb = r#"
class Libx11 < Formula
  desc "X.Org: Core X Window System protocol client library"
  homepage "https://www.x.org/"
  url "https://www.x.org/archive/individual/lib/libX11-1.8.6.tar.xz"
  sha256 "abc"
  resource "other" do
    url "https://example.com/other-2.0.tar.gz"
  end
end
"#;
        assert_eq!(
            extract_url(rb, "1.8.6").as_deref(),
            Some("https://www.x.org/archive/individual/lib/libX11-1.8.6.tar.xz")
        );
        assert_eq!(extract_url(rb, "9.9"), None);
        assert_eq!(extract_url(rb, ""), None);
    }

    #[test]
    fn tap_list_ignores_garbage() {
        let taps = parse_taps("homebrew/core\nlinuxbrew/xorg\nnot-a-tap\n");
        let taps: Vec<&str> = taps.iter().map(|t| t.as_str()).collect();
        assert_eq!(taps, vec!["homebrew/core", "linuxbrew/xorg"]);
    }

    #[tokio::test]
    async fn formula_files_are_collected_from_known_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Formula")).unwrap();
        std::fs::write(dir.path().join("Formula/a.rb"), "").unwrap();
        std::fs::write(dir.path().join("Formula/notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.rb"), "").unwrap();

        let files = formula_files(dir.path()).await.unwrap();
        let stems: Vec<&str> = files
            .iter()
            .filter_map(|f| f.file_stem().and_then(|s| s.to_str()))
            .collect();
        assert_eq!(stems, vec!["a", "b"]);
    }
}
