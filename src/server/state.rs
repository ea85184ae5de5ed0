use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::translator::{CatalogTranslator, ResponseTranslator, VersionTranslator};
use crate::upstream::Upstream;

/// Shared state handed to every handler
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub catalogs: CatalogTranslator,
    pub versions: VersionTranslator,
    pub responses: ResponseTranslator,
    /// `None` when response caching is disabled
    pub cache_ttl: Option<Duration>,
    pub landing_page: bool,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>, config: &Config) -> Self {
        let cache = &config.artifacthub.cache;
        Self {
            upstream,
            catalogs: CatalogTranslator::new(&config.catalog_mappings),
            versions: VersionTranslator::new(),
            responses: ResponseTranslator::new(),
            cache_ttl: cache.enabled.then_some(cache.ttl),
            landing_page: config.landing_page.enabled,
        }
    }
}
