//! Proxy wiring against a mock Artifact Hub

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use hub_proxy::config::{CatalogMapping, Config};
use hub_proxy::server::{AppState, router};
use hub_proxy::upstream::{ArtifactHubClient, CachedResponse, ResponseCache};

pub struct TestProxy {
    router: Router,
    pub cache: Option<Arc<ResponseCache<CachedResponse>>>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is UTF-8")
    }
}

/// Config pointing at `base_url` with fast retries and one catalog mapping
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config {
        catalog_mappings: vec![CatalogMapping {
            tekton_hub: "tekton".to_string(),
            artifact_hub: "tekton-catalog-tasks".to_string(),
        }],
        ..Default::default()
    };
    config.artifacthub.base_url = base_url.to_string();
    config.artifacthub.max_retries = 2;
    config.artifacthub.retry_backoff = Duration::from_millis(1);
    config
}

/// Builds the full stack (cache, client, router) the way the binary does
pub fn build_proxy(config: &Config) -> TestProxy {
    let cache_config = &config.artifacthub.cache;
    let cache = cache_config
        .enabled
        .then(|| Arc::new(ResponseCache::new(cache_config.ttl, cache_config.max_size)));
    let client = ArtifactHubClient::new(&config.artifacthub, cache.clone())
        .expect("client builds from test config");
    let state = Arc::new(AppState::new(Arc::new(client), config));

    TestProxy {
        router: router(state),
        cache,
    }
}

impl TestProxy {
    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Artifact Hub package document for a Tekton task
pub fn package_body(name: &str, version: &str, manifest: &str) -> String {
    json!({
        "package_id": format!("{}-id", name),
        "name": name,
        "display_name": name,
        "description": format!("{} task", name),
        "version": version,
        "ts": 1_700_000_000,
        "content_url": format!("https://example.com/{}.yaml", name),
        "readme": format!("# {}", name),
        "keywords": ["git", "scm"],
        "repository": {
            "name": "tekton-catalog-tasks",
            "kind": 12,
            "url": "https://github.com/tektoncd/catalog",
            "official": true
        },
        "available_versions": [
            { "version": "0.8.0" },
            { "version": version }
        ],
        "data": {
            "manifestRaw": manifest,
            "pipelines.minVersion": "0.38.0"
        }
    })
    .to_string()
}

/// Artifact Hub search document listing `names` at version 0.1.0
pub fn search_body(names: &[&str]) -> String {
    let packages: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "package_id": format!("{}-id", name),
                "name": name,
                "version": "0.1.0",
                "repository": { "name": "tekton-catalog-tasks", "kind": 12 }
            })
        })
        .collect();
    json!({ "packages": packages, "facets": [] }).to_string()
}
