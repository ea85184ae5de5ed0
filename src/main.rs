use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use hub_proxy::config::{self, Config};
use hub_proxy::server::{self, AppState};
use hub_proxy::upstream::{ArtifactHubClient, ResponseCache};

#[derive(Parser, Debug)]
#[command(name = "hub-proxy")]
#[command(version, about = "Serves the Tekton Hub API from Artifact Hub")]
struct Cli {
    /// Config file (default: ./configs/config.yaml, then ./config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long)]
    bind: Option<String>,

    #[arg(long)]
    disable_landing_page: bool,

    /// Disable the Artifact Hub response cache
    #[arg(long)]
    disable_cache: bool,

    /// Cache TTL, e.g. 5m or 1h30m
    #[arg(long, value_parser = parse_duration_arg)]
    cache_ttl: Option<Duration>,

    /// Maximum number of cached responses
    #[arg(long)]
    cache_max_size: Option<usize>,
}

impl Cli {
    /// Flags take precedence over both the file and the environment
    fn apply(&self, config: &mut Config) {
        if self.debug {
            config.logging.level = "debug".to_string();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = &self.bind {
            config.server.host = bind.clone();
        }
        if self.disable_landing_page {
            config.landing_page.enabled = false;
        }
        if self.disable_cache {
            config.artifacthub.cache.enabled = false;
        }
        if let Some(ttl) = self.cache_ttl {
            config.artifacthub.cache.ttl = ttl;
        }
        if let Some(max_size) = self.cache_max_size {
            config.artifacthub.cache.max_size = max_size;
        }
    }
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    config::parse_duration(value).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    cli.apply(&mut config);
    config.validate()?;

    hub_proxy::log::init(&config.logging)?;

    let cache_config = &config.artifacthub.cache;
    let cache = cache_config
        .enabled
        .then(|| Arc::new(ResponseCache::new(cache_config.ttl, cache_config.max_size)));

    let client = ArtifactHubClient::new(&config.artifacthub, cache.clone())
        .context("failed to create Artifact Hub client")?;
    let state = Arc::new(AppState::new(Arc::new(client), &config));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        addr = %addr,
        artifacthub = %config.artifacthub.base_url,
        cache_enabled = cache_config.enabled,
        catalog_mappings = config.catalog_mappings.len(),
        "starting hub-proxy"
    );

    server::serve(listener, server::router(state), shutdown_signal()).await?;

    if let Some(cache) = cache {
        cache.shutdown().await;
    }
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
