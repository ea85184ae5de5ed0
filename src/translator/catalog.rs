//! Catalog name and resource kind translation

use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

use crate::config::CatalogMapping;

/// Artifact Hub repository kind id for Tekton tasks
pub const REPO_KIND_TEKTON_TASK: i64 = 12;
/// Artifact Hub repository kind id for Tekton pipelines
pub const REPO_KIND_TEKTON_PIPELINE: i64 = 13;

/// Prefix Artifact Hub uses for Tekton repository kinds in package paths
const REPO_KIND_PREFIX: &str = "tekton";

/// Maps Tekton Hub catalog names to Artifact Hub repository names and back.
///
/// Both tables are built once and never mutated. Names are assumed unique in
/// each direction; with duplicates the last entry wins.
pub struct CatalogTranslator {
    mappings: IndexMap<String, String>,
    reverse_mappings: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(catalog_mappings: &[CatalogMapping]) -> Self {
        let mut mappings = IndexMap::with_capacity(catalog_mappings.len());
        let mut reverse_mappings = HashMap::with_capacity(catalog_mappings.len());

        for mapping in catalog_mappings {
            mappings.insert(mapping.tekton_hub.clone(), mapping.artifact_hub.clone());
            reverse_mappings.insert(mapping.artifact_hub.clone(), mapping.tekton_hub.clone());
        }

        Self {
            mappings,
            reverse_mappings,
        }
    }

    /// Unmapped names pass through unchanged.
    pub fn to_upstream(&self, tekton_catalog: &str) -> String {
        match self.mappings.get(tekton_catalog) {
            Some(artifact_hub_catalog) => {
                debug!(
                    tekton_catalog,
                    artifact_hub_catalog = %artifact_hub_catalog,
                    status = "mapped",
                    "catalog to upstream"
                );
                artifact_hub_catalog.clone()
            }
            None => {
                debug!(tekton_catalog, status = "passthrough", "no catalog mapping found");
                tekton_catalog.to_string()
            }
        }
    }

    /// Unmapped names pass through unchanged.
    pub fn to_external(&self, artifact_hub_catalog: &str) -> String {
        match self.reverse_mappings.get(artifact_hub_catalog) {
            Some(tekton_catalog) => {
                debug!(
                    artifact_hub_catalog,
                    tekton_catalog = %tekton_catalog,
                    status = "mapped",
                    "catalog to external"
                );
                tekton_catalog.clone()
            }
            None => {
                debug!(artifact_hub_catalog, status = "passthrough", "no reverse catalog mapping found");
                artifact_hub_catalog.to_string()
            }
        }
    }

    /// Tekton Hub catalog name -> Artifact Hub repository name, in configuration order
    pub fn available_mappings(&self) -> &IndexMap<String, String> {
        &self.mappings
    }

    /// `task` -> `tekton-task`
    pub fn kind_to_repo_kind(&self, kind: &str) -> String {
        format!("{}-{}", REPO_KIND_PREFIX, kind)
    }

    /// Numeric Artifact Hub repository kind -> Tekton Hub kind.
    ///
    /// Unknown kinds are reported as tasks.
    pub fn repo_kind_to_kind(&self, repo_kind: i64) -> &'static str {
        match repo_kind {
            REPO_KIND_TEKTON_PIPELINE => "pipeline",
            _ => "task",
        }
    }
}
