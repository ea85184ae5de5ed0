use std::sync::Arc;

use crate::models::artifacthub::{ArtifactHubPackage, ArtifactHubSearchResponse};

/// Filters for the Artifact Hub search endpoint
///
/// Empty lists and zero `limit`/`offset` are left out of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub kinds: Vec<i64>,
    pub categories: Vec<String>,
    pub repositories: Vec<String>,
    pub limit: u32,
    pub offset: u32,
    pub facets: bool,
}

impl SearchParams {
    /// Query string pairs in the order Artifact Hub documents them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if !self.query.is_empty() {
            pairs.push(("ts_query_web", self.query.clone()));
        }
        pairs.extend(self.kinds.iter().map(|kind| ("kind", kind.to_string())));
        pairs.extend(self.categories.iter().map(|c| ("category", c.clone())));
        pairs.extend(self.repositories.iter().map(|r| ("repo", r.clone())));
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if self.offset > 0 {
            pairs.push(("offset", self.offset.to_string()));
        }
        if self.facets {
            pairs.push(("facets", "true".to_string()));
        }

        pairs
    }
}

/// Value type held by the response cache
#[derive(Debug, Clone)]
pub enum CachedResponse {
    Package(Arc<ArtifactHubPackage>),
    Search(Arc<ArtifactHubSearchResponse>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_query_pairs_omits_empty_values() {
        let params = SearchParams {
            query: "git".to_string(),
            ..Default::default()
        };

        assert_eq!(
            params.to_query_pairs(),
            vec![("ts_query_web", "git".to_string())]
        );
        assert!(SearchParams::default().to_query_pairs().is_empty());
    }

    #[test]
    fn to_query_pairs_repeats_list_values() {
        let params = SearchParams {
            query: "build".to_string(),
            kinds: vec![12, 13],
            categories: vec!["ci".to_string()],
            repositories: vec!["tekton-catalog-tasks".to_string(), "other".to_string()],
            limit: 20,
            offset: 40,
            facets: true,
        };

        let owned = params.to_query_pairs();
        let pairs: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();

        assert_eq!(
            pairs,
            vec![
                ("ts_query_web", "build"),
                ("kind", "12"),
                ("kind", "13"),
                ("category", "ci"),
                ("repo", "tekton-catalog-tasks"),
                ("repo", "other"),
                ("limit", "20"),
                ("offset", "40"),
                ("facets", "true"),
            ]
        );
    }
}
