use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One formula served by [`FakeBrew`].
pub struct FakeFormula {
    pub name: String,
    /// `Some((current, latest))` prints a livecheck line; `None` makes
    /// `brew livecheck` fail.
    pub livecheck: Option<(String, String)>,
    pub deps: Vec<String>,
    pub url: Option<String>,
}

impl FakeFormula {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            livecheck: None,
            deps: Vec::new(),
            url: None,
        }
    }

    pub fn versions(mut self, current: &str, latest: &str) -> Self {
        self.livecheck = Some((current.to_string(), latest.to_string()));
        self
    }

    pub fn dep(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

/// A shell script standing in for `brew`, serving one tap.
///
/// Every invocation is appended to `calls.log` in the root directory.
pub struct FakeBrew {
    root: PathBuf,
}

impl FakeBrew {
    /// Write the tap checkout and the `brew` script under `root`.
    pub fn install(root: &Path, tap: &str, formulae: &[FakeFormula]) -> io::Result<Self> {
        let repo = root.join("tap");
        let formula_dir = repo.join("Formula");
        fs::create_dir_all(&formula_dir)?;

        let mut cases = String::new();
        for f in formulae {
            let qualified = format!("{tap}/{}", f.name);
            let rb = formula_dir.join(format!("{}.rb", f.name));
            let url_line = f
                .url
                .as_deref()
                .map(|u| format!("  url \"{u}\"\n"))
                .unwrap_or_default();
            fs::write(&rb, format!("class Fake < Formula\n{url_line}end\n"))?;

            let livecheck = match &f.livecheck {
                Some((current, latest)) => format!("echo '{qualified} : {current} ==> {latest}'"),
                None => format!("echo 'Error: {qualified}: Unable to get versions' >&2; exit 1"),
            };
            cases.push_str(&format!(
                "  'livecheck {qualified}') {livecheck} ;;\n  'deps --include-build --include-test --full-name {qualified}') echo '{}' ;;\n  'formula {qualified}') echo '{}' ;;\n",
                f.deps.join(" "),
                rb.display(),
            ));
        }

        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{log}'\ncase \"$*\" in\n  'tap') echo '{tap}' ;;\n  '--repo {tap}') echo '{repo}' ;;\n{cases}  *) echo \"Error: No available formula: $*\" >&2; exit 1 ;;\nesac\n",
            log = root.join("calls.log").display(),
            repo = repo.display(),
        );

        let program = root.join("brew");
        fs::write(&program, script)?;
        make_executable(&program)?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn program(&self) -> PathBuf {
        self.root.join("brew")
    }

    /// Argument lists of every invocation so far.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
