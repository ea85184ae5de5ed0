//! Artifact Hub package documents to Tekton Hub resources

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::artifacthub::{ArtifactHubPackage, ArtifactHubSearchResponse};
use crate::models::tektonhub::{
    Catalog, Category, Platform, ReadmeData, ReadmeResponse, Resource, ResourceVersion,
    ResourcesResponse, Tag, VersionSummary, YamlData, YamlResponse,
};
use crate::translator::catalog::CatalogTranslator;
use crate::translator::version::VersionTranslator;

/// Artifact Hub has no ratings; every resource reports this one
const DEFAULT_RATING: f64 = 4.0;
const DEFAULT_PLATFORM: &str = "linux/amd64";
const DEFAULT_PROVIDER: &str = "github";
const MAX_CATEGORIES: usize = 5;
const RESOURCE_ID_MODULUS: i64 = 1_000_000;
const CATALOG_ID_MODULUS: i64 = 1_000;

pub struct ResponseTranslator {
    version_translator: VersionTranslator,
}

impl ResponseTranslator {
    pub fn new() -> Self {
        Self {
            version_translator: VersionTranslator::new(),
        }
    }

    pub fn package_to_resource(
        &self,
        package: &ArtifactHubPackage,
        catalog_translator: &CatalogTranslator,
    ) -> Resource {
        debug!(package_name = %package.name, "converting Artifact Hub package to Tekton Hub resource");

        let tekton_catalog = catalog_translator.to_external(&package.repository.name);
        let kind = catalog_translator
            .repo_kind_to_kind(package.repository.kind)
            .to_string();
        let latest_version = self.version_translator.to_external(&package.version);

        let versions = package
            .available_versions
            .iter()
            .enumerate()
            .map(|(i, v)| VersionSummary {
                id: i as i64 + 1,
                version: self.version_translator.to_external(&v.version),
            })
            .collect();

        let platforms = vec![Platform {
            id: 1,
            name: DEFAULT_PLATFORM.to_string(),
        }];
        let hub_url_path = format!("{}/{}/{}", tekton_catalog, kind, package.name);
        let hub_raw_url_path = format!("/{}/{}/{}/raw", tekton_catalog, kind, package.name);

        let latest_version = ResourceVersion {
            id: 1,
            version: latest_version,
            display_name: package.display_name.clone(),
            description: package.description.clone(),
            min_pipelines_version: package.data.pipelines_min_version.clone(),
            raw_url: package.content_url.clone(),
            web_url: package.content_url.clone(),
            updated_at: DateTime::<Utc>::from_timestamp(package.ts, 0).unwrap_or_default(),
            platforms: platforms.clone(),
            hub_url_path: hub_url_path.clone(),
            hub_raw_url_path: hub_raw_url_path.clone(),
            resource: None,
            deprecated: package.deprecated,
        };

        Resource {
            id: polynomial_id(&package.package_id, RESOURCE_ID_MODULUS),
            name: package.name.clone(),
            kind,
            catalog: Catalog {
                id: polynomial_id(&package.repository.name, CATALOG_ID_MODULUS),
                name: tekton_catalog,
                provider: DEFAULT_PROVIDER.to_string(),
                catalog_type: catalog_type(package.repository.official).to_string(),
                url: package.repository.url.clone(),
            },
            categories: keywords_to_categories(&package.keywords),
            tags: keywords_to_tags(&package.keywords),
            platforms,
            rating: DEFAULT_RATING,
            latest_version,
            versions,
            hub_url_path,
            hub_raw_url_path,
        }
    }

    pub fn package_to_yaml(&self, package: &ArtifactHubPackage) -> YamlResponse {
        YamlResponse {
            data: YamlData {
                yaml: package.data.manifest_raw.clone(),
            },
        }
    }

    pub fn package_to_readme(&self, package: &ArtifactHubPackage) -> ReadmeResponse {
        ReadmeResponse {
            data: ReadmeData {
                readme: package.readme.clone(),
                yaml: package.data.manifest_raw.clone(),
            },
        }
    }

    pub fn search_to_resources(
        &self,
        search: &ArtifactHubSearchResponse,
        catalog_translator: &CatalogTranslator,
    ) -> ResourcesResponse {
        let data = search
            .packages
            .iter()
            .map(|summary| {
                self.package_to_resource(&ArtifactHubPackage::from(summary), catalog_translator)
            })
            .collect();

        ResourcesResponse { data }
    }
}

impl Default for ResponseTranslator {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable numeric id derived from a string (`h = h * 31 + c`, wrapping).
fn polynomial_id(value: &str, modulus: i64) -> i64 {
    let hash = value
        .chars()
        .fold(0i64, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i64));
    hash.wrapping_abs().rem_euclid(modulus)
}

fn catalog_type(official: bool) -> &'static str {
    if official { "official" } else { "community" }
}

fn keywords_to_categories(keywords: &[String]) -> Vec<Category> {
    keywords
        .iter()
        .take(MAX_CATEGORIES)
        .enumerate()
        .map(|(i, keyword)| Category {
            id: i as i64 + 1,
            name: keyword.clone(),
        })
        .collect()
}

fn keywords_to_tags(keywords: &[String]) -> Vec<Tag> {
    keywords
        .iter()
        .enumerate()
        .map(|(i, keyword)| Tag {
            id: i as i64 + 1,
            name: keyword.clone(),
        })
        .collect()
}
