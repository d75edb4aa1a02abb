// Application state module
// Everything a connection needs, built once at startup and shared read-only

use super::runtime::RuntimeConfig;
use super::types::Config;
use crate::error::ConfigError;
use crate::handler::Pipeline;
use crate::routing::RuleSet;

/// Application state
pub struct AppState {
    pub config: Config,
    pub runtime: RuntimeConfig,
    pub pipeline: Pipeline,

    // Cached so the request path does not dig through config
    pub access_log: bool,
}

impl AppState {
    /// Build the standard rule set for `runtime` and the serving pipeline
    pub fn new(config: &Config, runtime: RuntimeConfig) -> Result<Self, ConfigError> {
        let rules = RuleSet::standard(&runtime)?;
        Ok(Self::with_rules(config, runtime, rules))
    }

    /// Same as [`AppState::new`] with a caller-provided rule set
    #[must_use]
    pub fn with_rules(config: &Config, runtime: RuntimeConfig, rules: RuleSet) -> Self {
        Self {
            config: config.clone(),
            runtime,
            pipeline: Pipeline::from_config(config, rules),
            access_log: config.logging.access_log,
        }
    }

    #[must_use]
    pub fn rules(&self) -> Option<&RuleSet> {
        self.pipeline.rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_uses_resolved_backend() {
        let config = Config::defaults().unwrap();
        let runtime = RuntimeConfig {
            backend_host: "127.0.0.1".to_string(),
            backend_port: 8080,
        };
        let state = AppState::new(&config, runtime).unwrap();
        let rules = state.rules().unwrap();
        assert!(rules
            .rules()
            .iter()
            .all(|rule| rule.target.authority.as_str() == "127.0.0.1:8080"));
        assert!(state.access_log);
    }
}
