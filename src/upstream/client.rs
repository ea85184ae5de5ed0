//! Artifact Hub HTTP client

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ArtifactHubConfig;
use crate::models::artifacthub::{ArtifactHubPackage, ArtifactHubSearchResponse};
use crate::upstream::Upstream;
use crate::upstream::cache::{ResponseCache, fingerprint};
use crate::upstream::error::UpstreamError;
use crate::upstream::types::{CachedResponse, SearchParams};

const USER_AGENT: &str = "tekton-hub-proxy/1.0";

/// Client for the Artifact Hub package API
pub struct ArtifactHubClient {
    http: reqwest::Client,
    base_url: Url,
    max_retries: u32,
    retry_backoff: Duration,
    cache: Option<Arc<ResponseCache<CachedResponse>>>,
}

impl ArtifactHubClient {
    /// Creates a client; responses are cached only when `cache` is given.
    pub fn new(
        config: &ArtifactHubConfig,
        cache: Option<Arc<ResponseCache<CachedResponse>>>,
    ) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Url(format!("{}: {}", config.base_url, e)))?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
            cache,
        })
    }

    /// `{base}/api/v1/packages/{segments...}`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| UpstreamError::Url(self.base_url.to_string()))?;
            path.pop_if_empty()
                .extend(["api", "v1", "packages"])
                .extend(segments);
        }
        Ok(url)
    }

    fn cached(&self, key: &str) -> Option<CachedResponse> {
        self.cache.as_ref()?.get(key)
    }

    fn store(&self, key: &str, value: CachedResponse) {
        if let Some(cache) = &self.cache {
            cache.set(key, value);
        }
    }

    /// Fetches a package document, consulting the cache first
    async fn fetch_package(
        &self,
        operation: &'static str,
        segments: &[&str],
    ) -> Result<ArtifactHubPackage, UpstreamError> {
        let key = fingerprint(operation, segments);
        if let Some(CachedResponse::Package(package)) = self.cached(&key) {
            return Ok((*package).clone());
        }

        let url = self.endpoint(segments)?;
        let package: ArtifactHubPackage = self
            .fetch_json(&url)
            .await
            .map_err(|e| UpstreamError::operation(operation, e))?;

        self.store(&key, CachedResponse::Package(Arc::new(package.clone())));
        Ok(package)
    }

    /// GET `url` and decode the JSON body, retrying with linear backoff.
    ///
    /// Attempt `n` (from 0) first sleeps `n * retry_backoff`. A 4xx response
    /// ends the loop at once; any other failure is retried until
    /// `max_retries` is exhausted, and the last error is returned.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, UpstreamError> {
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying upstream request");
                tokio::time::sleep(delay).await;
            }

            match self.try_fetch(url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_client_error() => {
                    debug!(url = %url, error = %e, "upstream rejected request");
                    return Err(e);
                }
                Err(e) if attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    warn!(url = %url, attempt, error = %e, "upstream request failed");
                }
            }
            attempt += 1;
        }
    }

    /// Delay before retry `attempt`, growing linearly with the attempt
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(attempt)
    }

    async fn try_fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<T, UpstreamError> {
        debug!(url = %url, "requesting upstream");
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl Upstream for ArtifactHubClient {
    async fn get_package(
        &self,
        repo_kind: &str,
        catalog: &str,
        name: &str,
        version: &str,
    ) -> Result<ArtifactHubPackage, UpstreamError> {
        info!(repo_kind, catalog, name, version, "fetching package");
        self.fetch_package("get_package", &[repo_kind, catalog, name, version])
            .await
    }

    async fn get_package_latest(
        &self,
        repo_kind: &str,
        catalog: &str,
        name: &str,
    ) -> Result<ArtifactHubPackage, UpstreamError> {
        info!(repo_kind, catalog, name, "fetching latest package");
        self.fetch_package("get_package_latest", &[repo_kind, catalog, name])
            .await
    }

    async fn search_packages(
        &self,
        params: &SearchParams,
    ) -> Result<ArtifactHubSearchResponse, UpstreamError> {
        let mut url = self.endpoint(&["search"])?;
        let pairs = params.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let key = fingerprint("search_packages", &[url.query().unwrap_or_default()]);
        if let Some(CachedResponse::Search(search)) = self.cached(&key) {
            return Ok((*search).clone());
        }

        info!(query = %params.query, "searching packages");
        let search: ArtifactHubSearchResponse = self
            .fetch_json(&url)
            .await
            .map_err(|e| UpstreamError::operation("search_packages", e))?;

        self.store(&key, CachedResponse::Search(Arc::new(search.clone())));
        Ok(search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use reqwest::StatusCode;

    const PACKAGE_PATH: &str = "/api/v1/packages/tekton-task/tekton-catalog-tasks/git-clone/0.9.0";
    const PACKAGE_BODY: &str = r#"{"package_id":"p1","name":"git-clone","version":"0.9.0","repository":{"name":"tekton-catalog-tasks","kind":7}}"#;

    fn config(base_url: &str, max_retries: u32) -> ArtifactHubConfig {
        ArtifactHubConfig {
            base_url: base_url.to_string(),
            max_retries,
            retry_backoff: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn client(base_url: &str, max_retries: u32) -> ArtifactHubClient {
        ArtifactHubClient::new(&config(base_url, max_retries), None).unwrap()
    }

    fn cached_client(base_url: &str, max_retries: u32) -> ArtifactHubClient {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(60), 100));
        ArtifactHubClient::new(&config(base_url, max_retries), Some(cache)).unwrap()
    }

    async fn get_git_clone(client: &ArtifactHubClient) -> Result<ArtifactHubPackage, UpstreamError> {
        client
            .get_package("tekton-task", "tekton-catalog-tasks", "git-clone", "0.9.0")
            .await
    }

    #[tokio::test]
    async fn get_package_requests_versioned_path_with_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .match_header("user-agent", USER_AGENT)
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PACKAGE_BODY)
            .create_async()
            .await;

        let package = get_git_clone(&client(&server.url(), 3)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(package.name, "git-clone");
        assert_eq!(package.repository.name, "tekton-catalog-tasks");
    }

    #[tokio::test]
    async fn get_package_latest_omits_version_segment() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/packages/tekton-pipeline/tekton/build-push")
            .with_status(200)
            .with_body(r#"{"name":"build-push","version":"1.0.0"}"#)
            .create_async()
            .await;

        let package = client(&server.url(), 0)
            .get_package_latest("tekton-pipeline", "tekton", "build-push")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(package.version, "1.0.0");
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", PACKAGE_PATH)
            .with_status(503)
            .expect(2)
            .create_async()
            .await;
        let succeeding = server
            .mock("GET", PACKAGE_PATH)
            .with_status(200)
            .with_body(PACKAGE_BODY)
            .expect(1)
            .create_async()
            .await;

        let package = get_git_clone(&client(&server.url(), 3)).await.unwrap();

        failing.assert_async().await;
        succeeding.assert_async().await;
        assert_eq!(package.name, "git-clone");
    }

    #[tokio::test]
    async fn client_errors_stop_after_one_attempt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .with_status(404)
            .with_body("not found")
            .expect(1)
            .create_async()
            .await;

        let err = get_git_clone(&client(&server.url(), 3)).await.unwrap_err();

        mock.assert_async().await;
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            UpstreamError::Operation {
                operation: "get_package",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .with_status(500)
            .with_body("boom")
            .expect(3)
            .create_async()
            .await;

        let err = get_git_clone(&client(&server.url(), 2)).await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn backoff_grows_linearly_with_attempts() {
        let mut config = config("http://localhost", 3);
        config.retry_backoff = Duration::from_millis(200);
        let client = ArtifactHubClient::new(&config, None).unwrap();

        let delays: Vec<Duration> = (1..=4).map(|attempt| client.backoff(attempt)).collect();

        assert_eq!(
            delays,
            [200, 400, 600, 800].map(Duration::from_millis).to_vec()
        );
    }

    #[tokio::test]
    async fn retries_wait_for_the_accumulated_backoff() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .with_status(503)
            .expect(4)
            .create_async()
            .await;
        let mut config = config(&server.url(), 3);
        config.retry_backoff = Duration::from_millis(50);
        let client = ArtifactHubClient::new(&config, None).unwrap();

        let started = std::time::Instant::now();
        let err = get_git_clone(&client).await.unwrap_err();
        let elapsed = started.elapsed();

        mock.assert_async().await;
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        // 50ms + 100ms + 150ms; a constant backoff would only wait 150ms
        assert!(elapsed >= Duration::from_millis(300), "waited {:?}", elapsed);
    }

    #[tokio::test]
    async fn malformed_bodies_are_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .with_status(200)
            .with_body("not json")
            .expect(2)
            .create_async()
            .await;

        let err = get_git_clone(&client(&server.url(), 1)).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err.root(), UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn cached_responses_skip_the_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .with_status(200)
            .with_body(PACKAGE_BODY)
            .expect(1)
            .create_async()
            .await;
        let client = cached_client(&server.url(), 0);

        let first = get_git_clone(&client).await.unwrap();
        let second = get_git_clone(&client).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PACKAGE_PATH)
            .with_status(404)
            .expect(2)
            .create_async()
            .await;
        let client = cached_client(&server.url(), 0);

        assert!(get_git_clone(&client).await.is_err());
        assert!(get_git_clone(&client).await.is_err());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_packages_encodes_query_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/packages/search")
            .match_query(Matcher::Exact(
                "ts_query_web=git+clone&kind=12&kind=13&repo=tekton-catalog-tasks&limit=5&facets=true"
                    .to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"packages":[{"name":"git-clone","version":"0.9.0"}],"facets":[]}"#)
            .create_async()
            .await;

        let params = SearchParams {
            query: "git clone".to_string(),
            kinds: vec![12, 13],
            repositories: vec!["tekton-catalog-tasks".to_string()],
            limit: 5,
            facets: true,
            ..Default::default()
        };
        let search = client(&server.url(), 0).search_packages(&params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(search.packages.len(), 1);
        assert_eq!(search.packages[0].name, "git-clone");
    }

    #[tokio::test]
    async fn search_cache_is_keyed_by_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/packages/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"packages":[]}"#)
            .expect(2)
            .create_async()
            .await;
        let client = cached_client(&server.url(), 0);
        let git = SearchParams {
            query: "git".to_string(),
            ..Default::default()
        };
        let helm = SearchParams {
            query: "helm".to_string(),
            ..Default::default()
        };

        client.search_packages(&git).await.unwrap();
        client.search_packages(&git).await.unwrap();
        client.search_packages(&helm).await.unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn endpoint_percent_encodes_segments() {
        let client = client("http://localhost:8000/", 0);

        let url = client.endpoint(&["tekton-task", "my catalog", "a/b"]).unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/packages/tekton-task/my%20catalog/a%2Fb"
        );
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = ArtifactHubClient::new(&config("not a url", 0), None);
        assert!(matches!(result, Err(UpstreamError::Url(_))));
    }
}
