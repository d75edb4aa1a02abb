//! Logger module
//!
//! Thin facade over `tracing` so call sites stay one-liners:
//! - Server lifecycle logging
//! - Proxy forwarding and relay events
//! - Access logging with multiple formats (target `access`)
//! - Optional file outputs

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::ACCESS_TARGET;

use std::net::SocketAddr;

use hyper::{Method, Uri};

use crate::config::{Config, RuntimeConfig};
use crate::error::ProxyError;
use crate::proxy::RelaySummary;
use crate::routing::{Rule, RuleSet};

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        &config.logging.level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, runtime: &RuntimeConfig, rules: &RuleSet) {
    tracing::info!(
        listen = %addr,
        mode = %config.mode,
        static_root = %config.static_files.root,
        "Dev server listening on http://{addr}"
    );
    tracing::info!(
        host = %runtime.backend_host,
        port = runtime.backend_port,
        "Backend resolved"
    );
    for rule in rules.rules() {
        log_rule(rule);
    }
}

pub fn log_pipeline(stages: &[&str]) {
    tracing::info!(stages = %stages.join(" -> "), "Serving pipeline");
}

fn log_rule(rule: &Rule) {
    tracing::info!(
        rule = %rule.name,
        prefix = %rule.prefix,
        target = %rule.target,
        rewrite = rule.rewrite.is_some(),
        upgrade = rule.upgrade,
        change_origin = rule.change_origin,
        "Proxy rule"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::trace!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::debug!(error = %err, "Failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_debug(message: &str) {
    tracing::debug!("{message}");
}

pub fn log_forward(rule: &Rule, method: &Method, uri: &Uri, upgrade: bool) {
    tracing::debug!(
        rule = %rule.name,
        method = %method,
        path = %uri.path(),
        target = %rule.target,
        upgrade,
        "Forwarding request"
    );
}

pub fn log_proxy_error(rule: &str, err: &ProxyError) {
    tracing::warn!(rule, status = err.status(), error = %err, "Proxy request failed");
}

pub fn log_relay_opened(rule: &str, path: &str) {
    tracing::debug!(rule, path, "Upgrade relay established");
}

pub fn log_relay_closed(rule: &str, summary: RelaySummary) {
    tracing::debug!(
        rule,
        closed_by = ?summary.closed_by,
        bytes = summary.bytes,
        error = ?summary.error,
        "Upgrade relay closed"
    );
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown() {
    tracing::info!("Shutdown requested, no longer accepting connections");
}
