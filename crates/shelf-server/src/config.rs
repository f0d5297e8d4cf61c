//! Server configuration.
//!
//! Loaded from an optional TOML file (`shelf.toml` by default) and overridden
//! by `SHELF__<SECTION>__<KEY>` environment variables, e.g.
//! `SHELF__REDIS__URL=redis://cache:6379`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::cache::{NegativeCaching, RedisConfig};
use crate::warmup::WarmupConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "shelf.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "SHELF";

/// Errores de configuracion.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub warmup: WarmupSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server address: {e}")))
    }
}

/// TTLs y politicas del cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// TTL de productos y variantes (default: 3600).
    #[serde(default = "default_entity_ttl")]
    pub entity_ttl_seconds: u64,
    /// TTL de `set_default` (default: 300).
    #[serde(default = "default_store_ttl")]
    pub default_ttl_seconds: u64,
    /// Capacidad del backend en memoria.
    #[serde(default = "default_max_local_entries")]
    pub max_local_entries: u64,
    #[serde(default)]
    pub negative_caching: bool,
    #[serde(default = "default_negative_ttl")]
    pub negative_ttl_seconds: u64,
}

fn default_entity_ttl() -> u64 {
    3600
}

fn default_store_ttl() -> u64 {
    300
}

fn default_max_local_entries() -> u64 {
    100_000
}

fn default_negative_ttl() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            entity_ttl_seconds: default_entity_ttl(),
            default_ttl_seconds: default_store_ttl(),
            max_local_entries: default_max_local_entries(),
            negative_caching: false,
            negative_ttl_seconds: default_negative_ttl(),
        }
    }
}

impl CacheSettings {
    pub fn entity_ttl(&self) -> Duration {
        Duration::from_secs(self.entity_ttl_seconds)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    pub fn negative(&self) -> NegativeCaching {
        if self.negative_caching {
            NegativeCaching::Enabled {
                ttl: Duration::from_secs(self.negative_ttl_seconds),
            }
        } else {
            NegativeCaching::Disabled
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarmupSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Intervalo entre pasadas (default: 3600 = 60 minutos).
    #[serde(default = "default_warmup_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_warmup_interval() -> u64 {
    3600
}

fn default_page_size() -> usize {
    1000
}

impl Default for WarmupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_warmup_interval(),
            page_size: default_page_size(),
            run_on_startup: true,
        }
    }
}

impl WarmupSettings {
    pub fn scheduler_config(&self) -> WarmupConfig {
        WarmupConfig {
            interval: Duration::from_secs(self.interval_seconds),
            run_on_startup: self.run_on_startup,
        }
    }
}

/// Catalogo en memoria usado como source of record.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    /// JSON con `products` y `variants` cargado al arrancar.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    /// Eventos en buffer por suscriptor.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_event_buffer() -> usize {
    1024
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            seed_path: None,
            event_buffer: default_event_buffer(),
        }
    }
}

impl AppConfig {
    /// Rechaza combinaciones que no tienen sentido.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".into()));
        }
        if self.redis.key_prefix.trim_matches(':').is_empty() {
            return Err(ConfigError::Invalid("redis.key_prefix must not be empty".into()));
        }
        if self.redis.pool_size == 0 {
            return Err(ConfigError::Invalid("redis.pool_size must be > 0".into()));
        }
        if self.redis.timeout_ms == 0 {
            return Err(ConfigError::Invalid("redis.timeout_ms must be > 0".into()));
        }
        if self.cache.entity_ttl_seconds == 0 || self.cache.default_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("cache TTLs must be > 0".into()));
        }
        if self.cache.negative_caching && self.cache.negative_ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "cache.negative_caching=true requires cache.negative_ttl_seconds > 0".into(),
            ));
        }
        if self.warmup.page_size == 0 {
            return Err(ConfigError::Invalid("warmup.page_size must be > 0".into()));
        }
        if self.warmup.enabled && self.warmup.interval_seconds == 0 {
            return Err(ConfigError::Invalid("warmup.interval_seconds must be > 0".into()));
        }
        if self.catalog.event_buffer == 0 {
            return Err(ConfigError::Invalid("catalog.event_buffer must be > 0".into()));
        }
        Ok(())
    }
}

/// Carga la configuracion.
///
/// An explicit `path` must exist. Without one, `shelf.toml` in the working
/// directory is used when present. Environment overrides always apply.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ::config::Config::builder();

    match path {
        Some(p) => {
            let pathbuf = PathBuf::from(p);
            if !pathbuf.exists() {
                return Err(ConfigError::NotFound(pathbuf));
            }
            builder = builder.add_source(::config::File::from(pathbuf));
        },
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                builder = builder.add_source(::config::File::from(default_path));
            }
        },
    }

    builder = builder.add_source(
        ::config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .separator("__"),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
