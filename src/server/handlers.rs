//! Tekton Hub API endpoints

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::models::artifacthub::ArtifactHubPackage;
use crate::models::tektonhub::{
    Catalog, CatalogsResponse, ReadmeResponse, ResourceResponse, ResourceVersionResponse,
    ResourcesResponse, YamlResponse,
};
use crate::server::error::ApiError;
use crate::server::landing;
use crate::server::state::AppState;
use crate::translator::catalog::{REPO_KIND_TEKTON_PIPELINE, REPO_KIND_TEKTON_TASK};
use crate::upstream::{SearchParams, UpstreamError};

const DEFAULT_SEARCH_LIMIT: u32 = 1000;
const CATALOG_PROVIDER: &str = "github";
const CATALOG_TYPE: &str = "community";
const CATALOG_URL: &str = "https://github.com/tektoncd/catalog";
const RAW_YAML_CONTENT_TYPE: &str = "application/x-yaml";

type AppStateRef = State<Arc<AppState>>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn landing_page(State(state): AppStateRef) -> Html<String> {
    Html(landing::render(state.cache_ttl))
}

/// One catalog per configured mapping, in configuration order
pub async fn list_catalogs(State(state): AppStateRef) -> Json<CatalogsResponse> {
    debug!("listing catalogs");

    let data = state
        .catalogs
        .available_mappings()
        .keys()
        .enumerate()
        .map(|(i, name)| Catalog {
            id: i as i64 + 1,
            name: name.clone(),
            provider: CATALOG_PROVIDER.to_string(),
            catalog_type: CATALOG_TYPE.to_string(),
            url: CATALOG_URL.to_string(),
        })
        .collect();

    Json(CatalogsResponse { data })
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    limit: Option<String>,
}

pub async fn list_resources(
    State(state): AppStateRef,
    Query(params): Query<ListParams>,
) -> Result<Json<ResourcesResponse>, ApiError> {
    debug!("listing resources");

    let search = SearchParams {
        kinds: vec![REPO_KIND_TEKTON_TASK, REPO_KIND_TEKTON_PIPELINE],
        repositories: mapped_repositories(&state),
        limit: parse_limit(params.limit.as_deref()),
        ..Default::default()
    };

    search_resources(&state, &search, "failed to list resources").await
}

/// Free-form search; repeated `catalogs`, `kinds`, `categories` and `tags`
/// parameters are all honoured.
pub async fn query_resources(
    State(state): AppStateRef,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ResourcesResponse>, ApiError> {
    let values = |key: &str| -> Vec<&str> {
        pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    };
    let first = |key: &str| values(key).first().map(|v| v.to_string());

    let mut query = first("name").unwrap_or_default();
    for extra in [values("categories"), values("tags")] {
        if extra.is_empty() {
            continue;
        }
        if !query.is_empty() {
            query.push(' ');
        }
        query.push_str(&extra.join(" "));
    }

    let catalogs = values("catalogs");
    let repositories = if catalogs.is_empty() {
        mapped_repositories(&state)
    } else {
        catalogs
            .iter()
            .map(|c| state.catalogs.to_upstream(c))
            .collect()
    };

    let kinds = values("kinds");
    let kinds = if kinds.is_empty() {
        vec![REPO_KIND_TEKTON_TASK, REPO_KIND_TEKTON_PIPELINE]
    } else {
        kinds
            .iter()
            .filter_map(|kind| match kind.to_lowercase().as_str() {
                "task" => Some(REPO_KIND_TEKTON_TASK),
                "pipeline" => Some(REPO_KIND_TEKTON_PIPELINE),
                _ => None,
            })
            .collect()
    };

    let search = SearchParams {
        query,
        kinds,
        repositories,
        limit: parse_limit(first("limit").as_deref()),
        ..Default::default()
    };
    debug!(
        query = %search.query,
        kinds = ?search.kinds,
        repositories = ?search.repositories,
        limit = search.limit,
        "querying resources"
    );

    search_resources(&state, &search, "failed to query resources").await
}

pub async fn get_resource(
    State(state): AppStateRef,
    Path((catalog, kind, name)): Path<(String, String, String)>,
) -> Result<Json<ResourceResponse>, ApiError> {
    debug!(catalog = %catalog, kind = %kind, name = %name, "getting resource");

    let package = fetch_package(&state, &catalog, &kind, &name, None)
        .await
        .map_err(|_| ApiError::not_found("resource not found"))?;

    let resource = state.responses.package_to_resource(&package, &state.catalogs);
    Ok(Json(ResourceResponse { data: resource }))
}

/// The requested version is echoed back as given, not in upstream form.
pub async fn get_resource_version(
    State(state): AppStateRef,
    Path((catalog, kind, name, version)): Path<(String, String, String, String)>,
) -> Result<Json<ResourceVersionResponse>, ApiError> {
    debug!(catalog = %catalog, kind = %kind, name = %name, version = %version, "getting resource version");

    let package = fetch_package(&state, &catalog, &kind, &name, Some(&version))
        .await
        .map_err(|_| ApiError::not_found("resource version not found"))?;

    let resource = state.responses.package_to_resource(&package, &state.catalogs);
    let mut data = resource.latest_version.clone();
    data.version = version;
    data.resource = Some(Box::new(resource));

    Ok(Json(ResourceVersionResponse { data }))
}

pub async fn get_resource_yaml(
    State(state): AppStateRef,
    Path((catalog, kind, name, version)): Path<(String, String, String, String)>,
) -> Result<Json<YamlResponse>, ApiError> {
    debug!(catalog = %catalog, kind = %kind, name = %name, version = %version, "getting resource YAML");

    let package = fetch_package(&state, &catalog, &kind, &name, Some(&version))
        .await
        .map_err(|_| ApiError::not_found("resource not found"))?;

    Ok(Json(state.responses.package_to_yaml(&package)))
}

pub async fn get_resource_readme(
    State(state): AppStateRef,
    Path((catalog, kind, name, version)): Path<(String, String, String, String)>,
) -> Result<Json<ReadmeResponse>, ApiError> {
    debug!(catalog = %catalog, kind = %kind, name = %name, version = %version, "getting resource README");

    let package = fetch_package(&state, &catalog, &kind, &name, Some(&version))
        .await
        .map_err(|_| ApiError::not_found("resource not found"))?;

    Ok(Json(state.responses.package_to_readme(&package)))
}

pub async fn get_resource_raw(
    State(state): AppStateRef,
    Path((catalog, kind, name, version)): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    debug!(catalog = %catalog, kind = %kind, name = %name, version = %version, "getting raw resource YAML");

    let package = fetch_package(&state, &catalog, &kind, &name, Some(&version))
        .await
        .map_err(|_| ApiError::not_found("resource not found"))?;

    Ok(raw_manifest(package))
}

pub async fn get_latest_resource_raw(
    State(state): AppStateRef,
    Path((catalog, kind, name)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    debug!(catalog = %catalog, kind = %kind, name = %name, "getting latest raw resource YAML");

    let package = fetch_package(&state, &catalog, &kind, &name, None)
        .await
        .map_err(|_| ApiError::not_found("resource not found"))?;

    Ok(raw_manifest(package))
}

pub async fn get_resource_by_id(Path(id): Path<String>) -> ApiError {
    match parse_id(&id) {
        Some(id) => {
            debug!(id, "resource lookup by id");
            ApiError::not_implemented("resource lookup by ID not implemented")
        }
        None => ApiError::bad_request("invalid resource ID"),
    }
}

pub async fn get_resource_versions_by_id(Path(id): Path<String>) -> ApiError {
    match parse_id(&id) {
        Some(id) => {
            debug!(id, "resource versions lookup by id");
            ApiError::not_implemented("resource versions lookup by ID not implemented")
        }
        None => ApiError::bad_request("invalid resource ID"),
    }
}

pub async fn get_resource_by_version_id(Path(id): Path<String>) -> ApiError {
    match parse_id(&id) {
        Some(id) => {
            debug!(version_id = id, "resource lookup by version id");
            ApiError::not_implemented("resource lookup by version ID not implemented")
        }
        None => ApiError::bad_request("invalid version ID"),
    }
}

/// Resolves external names to upstream ones and fetches the package;
/// `version: None` fetches the latest.
async fn fetch_package(
    state: &AppState,
    catalog: &str,
    kind: &str,
    name: &str,
    version: Option<&str>,
) -> Result<ArtifactHubPackage, UpstreamError> {
    let upstream_catalog = state.catalogs.to_upstream(catalog);
    let repo_kind = state.catalogs.kind_to_repo_kind(kind);

    info!(
        original_catalog = catalog,
        translated_catalog = %upstream_catalog,
        original_kind = kind,
        translated_repo_kind = %repo_kind,
        name,
        "translated resource request"
    );

    let result = match version {
        Some(version) => {
            let upstream_version = state.versions.to_upstream(version);
            state
                .upstream
                .get_package(&repo_kind, &upstream_catalog, name, &upstream_version)
                .await
        }
        None => {
            state
                .upstream
                .get_package_latest(&repo_kind, &upstream_catalog, name)
                .await
        }
    };

    result.inspect_err(|e| {
        error!(
            repo_kind = %repo_kind,
            catalog = %upstream_catalog,
            name,
            error = %e,
            "Failed to get package from Artifact Hub"
        );
    })
}

async fn search_resources(
    state: &AppState,
    search: &SearchParams,
    failure: &'static str,
) -> Result<Json<ResourcesResponse>, ApiError> {
    let result = state.upstream.search_packages(search).await.map_err(|e| {
        error!(error = %e, "Failed to search packages");
        ApiError::internal(failure)
    })?;

    Ok(Json(
        state.responses.search_to_resources(&result, &state.catalogs),
    ))
}

fn mapped_repositories(state: &AppState) -> Vec<String> {
    state.catalogs.available_mappings().values().cloned().collect()
}

/// Positive integers only; anything else falls back to the default
fn parse_limit(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
}

fn parse_id(value: &str) -> Option<i64> {
    value.parse().ok()
}

fn raw_manifest(package: ArtifactHubPackage) -> Response {
    (
        [(CONTENT_TYPE, RAW_YAML_CONTENT_TYPE)],
        package.data.manifest_raw,
    )
        .into_response()
}
