// tests/config_loading.rs

use std::io::Write;

use tapbatch::config::{load_and_validate, load_or_default};
use tapbatch::errors::TapbatchError;
use tapbatch::types::QualifiedName;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn name(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

#[test]
fn full_config_is_loaded_and_normalised() {
    let file = write_config(
        r#"
[config]
skip = ["mesa", "linuxbrew/extra"]
all_taps = true
jobs = 8
log_file = "tapbatch.log"

[formula."linuxbrew/xorg/libx11"]
current = "1.8.6"
latest = "1.8.7"
dependencies = ["linuxbrew/xorg/libxcb", "pkg-config"]
url = "https://xorg.freedesktop.org/archive/individual/lib/libX11-1.8.6.tar.xz"

[formula.pkg-config]
current = "0.29.2"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert!(cfg.config.all_taps);
    assert!(!cfg.config.raw_versions);
    assert_eq!(cfg.config.jobs, 8);
    assert_eq!(cfg.config.log_file.as_deref(), Some(std::path::Path::new("tapbatch.log")));

    assert!(cfg.skip.contains(&name("mesa")));
    assert!(cfg.skip.contains(&name("linuxbrew/extra/anything")));
    assert!(!cfg.skip.contains(&name("linuxbrew/xorg/libx11")));

    assert!(cfg.has_snapshot());
    let libx11 = &cfg.formula[&name("linuxbrew/xorg/libx11")];
    assert_eq!(libx11.latest_or_current(), "1.8.7");
    assert_eq!(libx11.dependencies.len(), 2);

    // Bare keys land in homebrew/core; a missing `latest` means up to date.
    let pkg = &cfg.formula[&name("homebrew/core/pkg-config")];
    assert_eq!(pkg.latest_or_current(), "0.29.2");
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.jobs, 4);
    assert!(!cfg.config.all_taps);
    assert!(cfg.skip.is_empty());
    assert!(!cfg.has_snapshot());
}

#[test]
fn zero_jobs_is_rejected() {
    let file = write_config("[config]\njobs = 0\n");

    let err = load_and_validate(file.path()).unwrap_err();
    match err {
        TapbatchError::ConfigError(msg) => assert!(msg.contains("jobs"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_skip_entry_is_rejected() {
    let file = write_config("[config]\nskip = [\"a/b/c/d\"]\n");

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, TapbatchError::ConfigError(ref msg) if msg.contains("skip")));
}

#[test]
fn malformed_formula_key_is_rejected() {
    let file = write_config(
        r#"
[formula."user/repo"]
current = "1.0"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, TapbatchError::ConfigError(ref msg) if msg.contains("user/repo")));
}

#[test]
fn formula_listed_under_two_spellings_is_rejected() {
    let file = write_config(
        r#"
[formula.wget]
current = "1.0"

[formula."homebrew/core/wget"]
current = "1.0"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, TapbatchError::ConfigError(ref msg) if msg.contains("more than once")));
}

#[test]
fn empty_versions_are_rejected() {
    let file = write_config(
        r#"
[formula."t/a/x"]
current = ""
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TapbatchError::ConfigError(_))
    ));

    let file = write_config(
        r#"
[formula."t/a/x"]
current = "1.0"
latest = " "
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TapbatchError::ConfigError(_))
    ));
}

#[test]
fn invalid_toml_surfaces_as_toml_error() {
    let file = write_config("[config\njobs = 2\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TapbatchError::TomlError(_))
    ));
}

#[test]
fn missing_explicit_config_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(
        load_or_default(Some(&missing)),
        Err(TapbatchError::IoError(_))
    ));
}
