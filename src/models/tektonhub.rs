//! Tekton Hub API response shapes served by the proxy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogsResponse {
    pub data: Vec<Catalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub id: i64,
    pub name: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub catalog_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceResponse {
    pub data: Resource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourcesResponse {
    pub data: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub catalog: Catalog,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub platforms: Vec<Platform>,
    pub rating: f64,
    pub latest_version: ResourceVersion,
    pub versions: Vec<VersionSummary>,
    #[serde(rename = "hubURLPath")]
    pub hub_url_path: String,
    #[serde(rename = "hubRawURLPath")]
    pub hub_raw_url_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceVersion {
    pub id: i64,
    pub version: String,
    pub display_name: String,
    pub description: String,
    pub min_pipelines_version: String,
    #[serde(rename = "rawURL")]
    pub raw_url: String,
    #[serde(rename = "webURL")]
    pub web_url: String,
    pub updated_at: DateTime<Utc>,
    pub platforms: Vec<Platform>,
    #[serde(rename = "hubURLPath")]
    pub hub_url_path: String,
    #[serde(rename = "hubRawURLPath")]
    pub hub_raw_url_path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resource: Option<Box<Resource>>,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceVersionResponse {
    pub data: ResourceVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionSummary {
    pub id: i64,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YamlResponse {
    pub data: YamlData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YamlData {
    pub yaml: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadmeResponse {
    pub data: ReadmeData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadmeData {
    pub readme: String,
    pub yaml: String,
}
