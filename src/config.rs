use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_BASE_URL: &str = "https://artifacthub.io";

/// Timeout for a single upstream request (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Backoff unit between retries; attempt `n` waits `n` units
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Cached upstream responses live for 5 minutes
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CACHE_MAX_SIZE: usize = 2000;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "THP_";

/// Config files tried in order when no explicit path is given
const CONFIG_SEARCH_PATHS: &[&str] = &["./configs/config.yaml", "./config.yaml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid duration {0:?} (expected e.g. 500ms, 30s, 5m, 1h30m)")]
    InvalidDuration(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Proxy configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub artifacthub: ArtifactHubConfig,
    pub catalog_mappings: Vec<CatalogMapping>,
    pub logging: LoggingConfig,
    pub landing_page: LandingPageConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Upstream (Artifact Hub) access settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactHubConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub max_retries: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub retry_backoff: Duration,
    pub cache: CacheConfig,
}

impl Default for ArtifactHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            cache: CacheConfig::default(),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_duration")]
    pub ttl: Duration,
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL,
            max_size: DEFAULT_CACHE_MAX_SIZE,
        }
    }
}

/// One Tekton Hub catalog name and the Artifact Hub repository serving it
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogMapping {
    pub tekton_hub: String,
    pub artifact_hub: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandingPageConfig {
    pub enabled: bool,
}

impl Default for LandingPageConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Loads configuration from `path`, or the first file found in the
    /// default search paths, then applies `THP_*` environment overrides.
    ///
    /// Without any config file the built-in defaults are used. The result is
    /// not validated; call [`Config::validate`] once every override is in.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => CONFIG_SEARCH_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.is_file()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
    }

    /// Applies `THP_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("SERVER_HOST") {
            self.server.host = value;
        }
        if let Some(value) = var("SERVER_PORT") {
            self.server.port = parse_value("SERVER_PORT", &value)?;
        }
        if let Some(value) = var("ARTIFACTHUB_BASE_URL") {
            self.artifacthub.base_url = value;
        }
        if let Some(value) = var("ARTIFACTHUB_TIMEOUT") {
            self.artifacthub.timeout = parse_duration(&value)?;
        }
        if let Some(value) = var("ARTIFACTHUB_MAX_RETRIES") {
            self.artifacthub.max_retries = parse_value("ARTIFACTHUB_MAX_RETRIES", &value)?;
        }
        if let Some(value) = var("ARTIFACTHUB_RETRY_BACKOFF") {
            self.artifacthub.retry_backoff = parse_duration(&value)?;
        }
        if let Some(value) = var("ARTIFACTHUB_CACHE_ENABLED") {
            self.artifacthub.cache.enabled = parse_value("ARTIFACTHUB_CACHE_ENABLED", &value)?;
        }
        if let Some(value) = var("ARTIFACTHUB_CACHE_TTL") {
            self.artifacthub.cache.ttl = parse_duration(&value)?;
        }
        if let Some(value) = var("ARTIFACTHUB_CACHE_MAX_SIZE") {
            self.artifacthub.cache.max_size = parse_value("ARTIFACTHUB_CACHE_MAX_SIZE", &value)?;
        }
        if let Some(value) = var("LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = var("LOGGING_FORMAT") {
            self.logging.format = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: format!("{}LOGGING_FORMAT", ENV_PREFIX),
                value,
            })?;
        }
        if let Some(value) = var("LANDING_PAGE_ENABLED") {
            self.landing_page.enabled = parse_value("LANDING_PAGE_ENABLED", &value)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.artifacthub.base_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "artifacthub.base_url {:?}: {}",
                self.artifacthub.base_url, e
            ))
        })?;

        let cache = &self.artifacthub.cache;
        if cache.enabled && cache.ttl.is_zero() {
            return Err(ConfigError::Invalid(
                "artifacthub.cache.ttl must be greater than zero".to_string(),
            ));
        }
        if cache.enabled && cache.max_size == 0 {
            return Err(ConfigError::Invalid(
                "artifacthub.cache.max_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` the server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, name),
        value: value.to_string(),
    })
}

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(ms|s|m|h)").expect("valid duration pattern"));

/// Parses durations such as `500ms`, `30s`, `5m` or `1h30m`.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let invalid = || ConfigError::InvalidDuration(value.to_string());

    let mut total = Duration::ZERO;
    let mut consumed = 0;
    for caps in DURATION_RE.captures_iter(trimmed) {
        let whole = caps.get(0).ok_or_else(invalid)?;
        // Every unit must directly follow the previous one
        if whole.start() != consumed {
            return Err(invalid());
        }
        consumed = whole.end();

        let amount: u64 = caps[1].parse().map_err(|_| invalid())?;
        let part = match &caps[2] {
            "ms" => Some(Duration::from_millis(amount)),
            "s" => Some(Duration::from_secs(amount)),
            "m" => amount.checked_mul(60).map(Duration::from_secs),
            "h" => amount.checked_mul(60 * 60).map(Duration::from_secs),
            _ => return Err(invalid()),
        }
        .ok_or_else(invalid)?;
        total = total.checked_add(part).ok_or_else(invalid)?;
    }

    if consumed == 0 || consumed != trimmed.len() {
        return Err(invalid());
    }
    Ok(total)
}

/// Renders a duration the way config files spell it (`5m`, `1h30m`, `250ms`).
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    out
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_duration(&value).map_err(serde::de::Error::custom)
}
