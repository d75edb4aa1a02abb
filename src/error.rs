//! Error types
//!
//! Configuration errors abort startup. Proxy errors stay local to one request
//! and are turned into a gateway response by the proxy stage.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying config source could not be read or deserialized.
    #[error("config source error: {0}")]
    Source(#[from] config::ConfigError),

    /// Listening address could not be parsed.
    #[error("invalid listen address '{0}'")]
    InvalidListenAddr(String),

    /// Backend port is not a valid non-zero TCP port.
    #[error("invalid backend port '{0}'")]
    InvalidBackendPort(String),

    /// Backend host is empty or cannot form a URI authority.
    #[error("invalid backend host '{0}'")]
    InvalidBackendHost(String),

    /// A rule was declared with an empty match prefix.
    #[error("rule '{0}' has an empty match prefix")]
    EmptyPrefix(String),
}

/// Errors raised while forwarding a matched request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connecting to the upstream target failed (refused, unresolvable, connect timeout).
    #[error("upstream {target} unreachable: {reason}")]
    Unreachable { target: String, reason: String },

    /// Upstream accepted the connection but did not send response headers in time.
    #[error("upstream {target} did not respond within {}s", .after.as_secs())]
    Timeout { target: String, after: Duration },

    /// Upstream connection broke after it was established.
    #[error("upstream {target} failed: {reason}")]
    Upstream { target: String, reason: String },

    /// The forwarded request could not be assembled.
    #[error("cannot build upstream request: {0}")]
    Request(#[from] hyper::http::Error),
}

impl ProxyError {
    /// HTTP status the client sees for this failure.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Timeout { .. } => 504,
            Self::Unreachable { .. } | Self::Upstream { .. } | Self::Request(_) => 502,
        }
    }
}
