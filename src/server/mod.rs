//! HTTP surface speaking the Tekton Hub API
//!
//! # Modules
//!
//! - [`handlers`]: one handler per endpoint
//! - [`middleware`]: request logging, CORS and panic recovery
//! - [`error`]: JSON error responses
//! - [`landing`]: HTML landing page
//! - [`state`]: state shared by all handlers

pub mod error;
pub mod handlers;
pub mod landing;
pub mod middleware;
pub mod state;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use state::AppState;

use handlers::*;

/// Builds the application router.
///
/// The first segment after `/v1/resource/` is always captured as
/// `{catalog}`, including on the id routes, so the routes can share one
/// tree node. Handlers extract path segments by position.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/v1/catalogs", get(list_catalogs))
        .route("/v1/resources", get(list_resources))
        .route("/v1/query", get(query_resources))
        .route("/v1/resource/{catalog}", get(get_resource_by_id))
        .route(
            "/v1/resource/{catalog}/versions",
            get(get_resource_versions_by_id),
        )
        .route("/v1/resource/version/{id}", get(get_resource_by_version_id))
        .route("/v1/resource/{catalog}/{kind}/{name}", get(get_resource))
        .route(
            "/v1/resource/{catalog}/{kind}/{name}/raw",
            get(get_latest_resource_raw),
        )
        .route(
            "/v1/resource/{catalog}/{kind}/{name}/{version}",
            get(get_resource_version),
        )
        .route(
            "/v1/resource/{catalog}/{kind}/{name}/{version}/yaml",
            get(get_resource_yaml),
        )
        .route(
            "/v1/resource/{catalog}/{kind}/{name}/{version}/readme",
            get(get_resource_readme),
        )
        .route(
            "/v1/resource/{catalog}/{kind}/{name}/{version}/raw",
            get(get_resource_raw),
        );

    if state.landing_page {
        router = router.route("/", get(landing_page));
    }

    // Last layer added runs first
    router
        .layer(from_fn(middleware::recover_panics))
        .layer(from_fn(middleware::cors))
        .layer(from_fn(middleware::log_requests))
        .with_state(state)
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
