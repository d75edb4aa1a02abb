// Configuration module entry point
// Server settings, layered env files and the resolved backend origin

mod env;
mod runtime;
mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

pub use env::{load_env_layer, merge_layers, EnvMap, ENV_PREFIX};
pub use runtime::{RuntimeConfig, DEFAULT_BACKEND_HOST, DEFAULT_BACKEND_PORT};
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ProxyConfig, ServerConfig, StaticConfig,
    StaticMount,
};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "devserver";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DEVSERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self::builder()?.build()?.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            .set_default("mode", "development")?
            .set_default("env_dirs", vec!["..", "."])?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("proxy.connect_timeout_ms", 5000)?
            .set_default("proxy.response_timeout_secs", 30)?
            .set_default("static_files.root", "dist")?
            .set_default("static_files.index_files", vec!["index.html"])?
            .set_default("static_files.spa_fallback", true)?
            .set_default("http.server_name", "devserver")?
            .set_default("http.max_body_size", 10_485_760)?) // 10MB
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|_| ConfigError::InvalidListenAddr(addr))
    }

    /// Resolve backend settings from the configured env directories
    pub fn load_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        let layers = self
            .env_dirs
            .iter()
            .map(|dir| load_env_layer(dir, &self.mode, None))
            .collect::<Result<Vec<_>, _>>()?;
        RuntimeConfig::resolve(&merge_layers(layers))
    }
}

impl ProxyConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}
