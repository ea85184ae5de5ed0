//! Artifact Hub API payloads
//!
//! Only the fields the proxy reads are modelled; everything else in the
//! upstream documents is ignored during deserialization.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubPackage {
    pub package_id: String,
    pub name: String,
    pub normalized_name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub app_version: String,
    pub license: String,
    pub deprecated: bool,
    pub signed: bool,
    pub official: bool,
    pub ts: i64,
    pub repository: ArtifactHubRepository,
    pub available_versions: Vec<ArtifactHubVersion>,
    pub keywords: Vec<String>,
    pub home_url: String,
    pub readme: String,
    pub content_url: String,
    pub prerelease: bool,
    pub data: ArtifactHubPackageData,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubPackageData {
    #[serde(rename = "manifestRaw")]
    pub manifest_raw: String,
    #[serde(rename = "pipelines.minVersion")]
    pub pipelines_min_version: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubRepository {
    pub repository_id: String,
    pub kind: i64,
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub verified_publisher: bool,
    pub official: bool,
    pub organization_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubVersion {
    pub version: String,
    pub contains_security_updates: bool,
    pub prerelease: bool,
    pub ts: i64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubSearchResponse {
    pub packages: Vec<ArtifactHubPackageSummary>,
    pub facets: Vec<ArtifactHubFacet>,
}

/// Package entry as returned by the search endpoint
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubPackageSummary {
    pub package_id: String,
    pub name: String,
    pub normalized_name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub app_version: String,
    pub deprecated: bool,
    pub signed: bool,
    pub official: bool,
    pub ts: i64,
    pub repository: ArtifactHubRepository,
    pub stars: i64,
}

impl From<&ArtifactHubPackageSummary> for ArtifactHubPackage {
    /// Search summaries carry no keywords, versions or manifest.
    fn from(summary: &ArtifactHubPackageSummary) -> Self {
        Self {
            package_id: summary.package_id.clone(),
            name: summary.name.clone(),
            normalized_name: summary.normalized_name.clone(),
            display_name: summary.display_name.clone(),
            description: summary.description.clone(),
            version: summary.version.clone(),
            app_version: summary.app_version.clone(),
            deprecated: summary.deprecated,
            signed: summary.signed,
            official: summary.official,
            ts: summary.ts,
            repository: summary.repository.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubFacet {
    pub title: String,
    pub filter_key: String,
    pub options: Vec<ArtifactHubFacetOption>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubFacetOption {
    pub id: serde_json::Value,
    pub name: String,
    pub total: i64,
}
