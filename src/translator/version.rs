//! Version string translation
//!
//! Tekton Hub addresses resource versions as `major.minor` while Artifact Hub
//! publishes full semantic versions. The translator converts in both
//! directions and never rejects input it cannot understand: unknown shapes are
//! passed through untouched so the upstream can decide.
//!
//! Format examples:
//! - `0.4` -> `0.4.0` (to upstream)
//! - `0.4.0` -> `0.4` (to external)
//! - `0.4.1` and `1.0.0-alpha.1` are kept as-is in both directions

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: {0}")]
    Invalid(String),
}

/// A version parsed with the loose grammar used by the upstream catalog.
///
/// Accepts an optional `v` prefix, any number of numeric segments (padded to
/// three), an optional `-pre-release` and optional `+build` metadata. An
/// alphabetic pre-release may drop the hyphen (`1.0.0beta`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseVersion {
    segments: Vec<u64>,
    pre: Option<String>,
    build: Option<String>,
}

impl LooseVersion {
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.pre.as_deref()
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    fn compare(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }

        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

/// Pre-release precedence follows semver rules; labels semver cannot parse
/// fall back to plain string ordering.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    match (semver::Prerelease::new(a), semver::Prerelease::new(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        write!(f, "{}", numbers.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

/// Bidirectional translator between simplified and full version strings
pub struct VersionTranslator {
    /// `major.minor` with an optional `.patch`, anchored at the start only
    shape_re: Regex,
    /// Whole-string loose version grammar
    loose_re: Regex,
}

impl VersionTranslator {
    pub fn new() -> Self {
        Self {
            shape_re: Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version shape pattern"),
            loose_re: Regex::new(
                r"^v?(\d+(?:\.\d+)*)(?:-([0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*)|([A-Za-z~][0-9A-Za-z~-]*(?:\.[0-9A-Za-z~-]+)*))?(?:\+([0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*))?$",
            )
            .expect("valid loose version pattern"),
        }
    }

    /// Converts a Tekton Hub version to its Artifact Hub form.
    ///
    /// Never fails: unparseable input is returned unchanged.
    pub fn to_upstream(&self, external: &str) -> String {
        if external.is_empty() {
            return String::new();
        }

        if self.is_full_semver(external) {
            debug!(input = external, status = "unchanged_full_semver", "version to upstream");
            return external.to_string();
        }

        if self.is_simplified_semver(external) {
            let upstream = format!("{}.0", external);
            debug!(
                input = external,
                output = %upstream,
                status = "converted_simplified_to_full",
                "version to upstream"
            );
            return upstream;
        }

        match self.parse(external) {
            Ok(version) => {
                let normalized = version.to_string();
                debug!(input = external, output = %normalized, status = "normalized", "version to upstream");
                normalized
            }
            Err(e) => {
                debug!(input = external, error = %e, status = "invalid_passthrough", "version to upstream");
                external.to_string()
            }
        }
    }

    /// Converts an Artifact Hub version to its Tekton Hub form.
    ///
    /// Only release versions whose patch segment is zero are simplified.
    pub fn to_external(&self, upstream: &str) -> String {
        if upstream.is_empty() {
            return String::new();
        }

        let version = match self.parse(upstream) {
            Ok(version) => version,
            Err(_) => {
                debug!(input = upstream, status = "invalid_passthrough", "version to external");
                return upstream.to_string();
            }
        };

        if version.prerelease().is_some() {
            return upstream.to_string();
        }

        match version.segments() {
            [major, minor, 0, ..] => {
                let external = format!("{}.{}", major, minor);
                debug!(input = upstream, output = %external, "converted full semver to simplified");
                external
            }
            _ => upstream.to_string(),
        }
    }

    /// Empty versions are valid (they mean "latest").
    pub fn validate(&self, version: &str) -> Result<(), VersionError> {
        if version.is_empty() {
            return Ok(());
        }
        self.parse(version).map(|_| ())
    }

    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        let a = self.parse(a)?;
        let b = self.parse(b)?;
        Ok(a.compare(&b))
    }

    pub fn parse(&self, version: &str) -> Result<LooseVersion, VersionError> {
        let caps = self
            .loose_re
            .captures(version)
            .ok_or_else(|| VersionError::Invalid(version.to_string()))?;

        let mut segments = caps[1]
            .split('.')
            .map(|s| s.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError::Invalid(version.to_string()))?;
        while segments.len() < 3 {
            segments.push(0);
        }

        Ok(LooseVersion {
            segments,
            pre: caps.get(2).or(caps.get(3)).map(|m| m.as_str().to_string()),
            build: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    fn is_full_semver(&self, version: &str) -> bool {
        self.shape_re
            .captures(version)
            .is_some_and(|caps| caps.get(3).is_some())
    }

    fn is_simplified_semver(&self, version: &str) -> bool {
        self.shape_re.captures(version).is_some_and(|caps| {
            caps.get(3).is_none() && caps[0].len() == version.len()
        })
    }
}

impl Default for VersionTranslator {
    fn default() -> Self {
        Self::new()
    }
}
