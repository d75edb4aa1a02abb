// Runtime configuration module
// Resolves the backend origin once at startup; immutable afterwards

use hyper::http::uri::Authority;

use super::env::EnvMap;
use crate::error::ConfigError;

pub const DEFAULT_BACKEND_PORT: u16 = 5000;
pub const DEFAULT_BACKEND_HOST: &str = "localhost";

const PORT_KEY: &str = "vite_backend_dev_port";
const HOST_KEY: &str = "vite_backend_dev_host";

/// Resolved backend location used to materialize rule targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub backend_host: String,
    pub backend_port: u16,
}

impl RuntimeConfig {
    /// Resolve from merged env layers, falling back to the defaults.
    ///
    /// Present but malformed values are errors, not silently defaulted.
    pub fn resolve(env: &EnvMap) -> Result<Self, ConfigError> {
        let backend_port = match env.get(PORT_KEY) {
            Some(raw) => parse_port(raw)?,
            None => DEFAULT_BACKEND_PORT,
        };
        let backend_host = env
            .get(HOST_KEY)
            .map_or(DEFAULT_BACKEND_HOST, String::as_str)
            .trim()
            .to_string();

        let resolved = Self {
            backend_host,
            backend_port,
        };
        resolved.backend_authority()?;
        Ok(resolved)
    }

    /// `host:port` of the backend, validated as a URI authority
    pub fn backend_authority(&self) -> Result<Authority, ConfigError> {
        if self.backend_host.is_empty() {
            return Err(ConfigError::InvalidBackendHost(self.backend_host.clone()));
        }
        format!("{}:{}", self.backend_host, self.backend_port)
            .parse::<Authority>()
            .map_err(|_| ConfigError::InvalidBackendHost(self.backend_host.clone()))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend_host: DEFAULT_BACKEND_HOST.to_string(),
            backend_port: DEFAULT_BACKEND_PORT,
        }
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidBackendPort(raw.to_string())),
    }
}
