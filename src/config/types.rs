// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Env file mode, selects `.env.<mode>` files
    pub mode: String,
    /// Directories scanned for env files, base layer first
    pub env_dirs: Vec<String>,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub proxy: ProxyConfig,
    pub static_files: StaticConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a client to send request headers
    pub read_timeout: u64,
}

/// Upstream forwarding limits
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    pub connect_timeout_ms: u64,
    /// Bounded wait for upstream response headers, handshakes included
    pub response_timeout_secs: u64,
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    pub root: String,
    pub index_files: Vec<String>,
    /// Serve root index.html for unknown HTML navigations
    pub spa_fallback: bool,
    #[serde(default)]
    pub mounts: Vec<StaticMount>,
}

/// Extra directory served under a URL prefix
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StaticMount {
    pub prefix: String,
    pub dir: String,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// `Server` header on locally generated responses
    pub server_name: String,
    pub max_body_size: u64,
}
