//! Artifact Hub access
//!
//! # Modules
//!
//! - [`cache`]: TTL response cache keyed by request fingerprints
//! - [`client`]: HTTP client with retry, backoff and cache integration
//! - [`error`]: upstream error type
//! - [`types`]: search parameters and cached values

pub mod cache;
pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
use mockall::automock;

pub use cache::{ResponseCache, fingerprint};
pub use client::ArtifactHubClient;
pub use error::UpstreamError;
pub use types::{CachedResponse, SearchParams};

use crate::models::artifacthub::{ArtifactHubPackage, ArtifactHubSearchResponse};

/// Source of Artifact Hub documents
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches one version of a package.
    ///
    /// `version` is in upstream (three-segment) form.
    async fn get_package(
        &self,
        repo_kind: &str,
        catalog: &str,
        name: &str,
        version: &str,
    ) -> Result<ArtifactHubPackage, UpstreamError>;

    /// Fetches the latest version of a package
    async fn get_package_latest(
        &self,
        repo_kind: &str,
        catalog: &str,
        name: &str,
    ) -> Result<ArtifactHubPackage, UpstreamError>;

    async fn search_packages(
        &self,
        params: &SearchParams,
    ) -> Result<ArtifactHubSearchResponse, UpstreamError>;
}
