//! Forwarding rules
//!
//! A [`RuleSet`] is built once at startup and shared read-only by every
//! connection handler.

use hyper::http::uri::{Authority, Scheme};

use super::rewrite::Rewrite;
use crate::config::RuntimeConfig;
use crate::error::ConfigError;

/// Upstream origin a rule forwards to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    pub authority: Authority,
}

impl Target {
    #[must_use]
    pub const fn http(authority: Authority) -> Self {
        Self {
            scheme: Scheme::HTTP,
            authority,
        }
    }

    /// `scheme://host:port`, the value sent as `Origin` when the origin changes
    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.origin())
    }
}

/// A single forwarding rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    /// Literal path prefix
    pub prefix: String,
    pub target: Target,
    pub rewrite: Option<Rewrite>,
    /// Accept upgrade handshakes and relay bytes afterwards
    pub upgrade: bool,
    /// Present the target's identity in `Host`/`Origin` instead of the client's
    pub change_origin: bool,
}

impl Rule {
    #[must_use]
    pub fn new(name: &str, prefix: &str, target: Target) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            target,
            rewrite: None,
            upgrade: false,
            change_origin: false,
        }
    }

    #[must_use]
    pub fn rewrite(mut self, rewrite: Rewrite) -> Self {
        self.rewrite = Some(rewrite);
        self
    }

    #[must_use]
    pub const fn upgrade(mut self, enabled: bool) -> Self {
        self.upgrade = enabled;
        self
    }

    #[must_use]
    pub const fn change_origin(mut self, enabled: bool) -> Self {
        self.change_origin = enabled;
        self
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Ordered rules; first match wins
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build from rules in declared order. Empty prefixes would swallow every
    /// request and are rejected.
    pub fn new(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        if let Some(rule) = rules.iter().find(|r| r.prefix.is_empty()) {
            return Err(ConfigError::EmptyPrefix(rule.name.clone()));
        }
        Ok(Self { rules })
    }

    /// The dev server's rules, all pointing at the resolved backend
    pub fn standard(runtime: &RuntimeConfig) -> Result<Self, ConfigError> {
        let backend = Target::http(runtime.backend_authority()?);

        Self::new(vec![
            Rule::new("api", "/api", backend.clone()).rewrite(Rewrite::strip_prefix("/api")),
            Rule::new("ws", "/ws", backend.clone()).upgrade(true),
            Rule::new("openapi", "/openapi.json", backend).rewrite(Rewrite::pin("/openapi.json")),
        ])
    }

    #[must_use]
    pub const fn rules(&self) -> &[Rule] {
        self.rules.as_slice()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
