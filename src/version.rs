// src/version.rs

//! Acceptance policy for detected upstream versions.
//!
//! Upstream release detection is noisy: tags change format, pre-releases
//! show up, unrelated numbers get scraped. Unless raw versions are requested,
//! a new version is accepted only when it looks like the current one.

use thiserror::Error;

/// Substrings that mark a version as a pre-release.
pub const UNSTABLE_MARKERS: [&str; 4] = ["alpha", "beta", "rc", "preview"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionRejection {
    #[error("new version ({latest}) differs too much from the old one ({current})")]
    SchemeChanged { current: String, latest: String },

    #[error(
        "new version ({latest}) has a naming convention that is different from the currently used one ({current})"
    )]
    NamingChanged { current: String, latest: String },

    #[error("new version ({latest}) is not stable")]
    Unstable { latest: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionPolicy {
    /// Accept any detected version as-is.
    pub raw_versions: bool,
}

impl VersionPolicy {
    pub fn new(raw_versions: bool) -> Self {
        Self { raw_versions }
    }

    /// Decide whether `latest` is a believable successor of `current`.
    pub fn check(&self, current: &str, latest: &str) -> Result<(), VersionRejection> {
        if self.raw_versions {
            return Ok(());
        }

        if current.matches('.').count() != latest.matches('.').count() {
            return Err(VersionRejection::SchemeChanged {
                current: current.to_string(),
                latest: latest.to_string(),
            });
        }

        let naming_changed = current
            .split('.')
            .zip(latest.split('.'))
            .any(|(old, new)| is_numeric(old) != is_numeric(new));
        if naming_changed {
            return Err(VersionRejection::NamingChanged {
                current: current.to_string(),
                latest: latest.to_string(),
            });
        }

        if UNSTABLE_MARKERS.iter().any(|marker| latest.contains(marker)) {
            return Err(VersionRejection::Unstable {
                latest: latest.to_string(),
            });
        }

        Ok(())
    }
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}
