//! Serving pipeline
//!
//! An ordered list of named stages. Each stage either answers the request or
//! hands it, unchanged, to the next one. The order is fixed at startup.

use hyper::body::Incoming;
use hyper::{Method, Request};
use std::path::PathBuf;

use super::router::RequestContext;
use super::static_files;
use crate::config::{Config, StaticMount};
use crate::http::cache::CachePolicy;
use crate::http::{
    build_404_response, build_405_response, build_413_response, build_options_response,
    ProxyResponse,
};
use crate::proxy::{self, Forwarder};
use crate::routing::{match_rule, RuleSet};

/// Result of running one stage
pub enum Outcome {
    Respond(ProxyResponse),
    Continue(Request<Incoming>),
}

/// Options of the forwarding stage
pub struct ProxyOptions {
    pub rules: RuleSet,
    pub forwarder: Forwarder,
}

/// Options of the static file stage
#[derive(Debug, Clone)]
pub struct StaticOptions {
    pub root: String,
    pub mounts: Vec<StaticMount>,
    pub index_files: Vec<String>,
    pub max_body_size: u64,
}

/// Options of the application shell fallback
#[derive(Debug, Clone)]
pub struct AppShellOptions {
    pub enabled: bool,
    pub index_path: PathBuf,
}

pub enum Stage {
    Proxy(ProxyOptions),
    Static(StaticOptions),
    AppShell(AppShellOptions),
}

impl Stage {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Proxy(_) => "proxy",
            Self::Static(_) => "static",
            Self::AppShell(_) => "app-shell",
        }
    }

    async fn handle(&self, req: Request<Incoming>) -> Outcome {
        match self {
            Self::Proxy(opts) => match match_rule(req.uri().path(), &opts.rules) {
                Some(rule) => Outcome::Respond(proxy::forward(req, rule, &opts.forwarder).await),
                None => Outcome::Continue(req),
            },
            Self::Static(opts) => {
                let ctx = RequestContext::from_request(&req);
                match static_stage(&ctx, opts).await {
                    Some(resp) => Outcome::Respond(resp),
                    None => Outcome::Continue(req),
                }
            }
            Self::AppShell(opts) => {
                let ctx = RequestContext::from_request(&req);
                Outcome::Respond(app_shell_stage(&ctx, opts).await)
            }
        }
    }
}

/// GET/HEAD file lookup; other methods are answered here, not passed on
pub async fn static_stage(ctx: &RequestContext, opts: &StaticOptions) -> Option<ProxyResponse> {
    match ctx.method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return Some(build_options_response()),
        _ => return Some(build_405_response()),
    }
    if ctx.content_length.is_some_and(|len| len > opts.max_body_size) {
        return Some(build_413_response());
    }
    static_files::serve_static(ctx, &opts.root, &opts.mounts, &opts.index_files).await
}

/// Serve the root `index.html` for HTML navigations, 404 otherwise
pub async fn app_shell_stage(ctx: &RequestContext, opts: &AppShellOptions) -> ProxyResponse {
    if !opts.enabled || !ctx.accepts_html || !matches!(ctx.method, Method::GET | Method::HEAD) {
        return build_404_response();
    }
    static_files::serve_file(ctx, &opts.index_path, CachePolicy::NoStore)
        .await
        .unwrap_or_else(build_404_response)
}

/// Ordered stages, read-only after startup
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub const fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// `proxy` -> `static` -> `app-shell`, built from configuration
    #[must_use]
    pub fn from_config(config: &Config, rules: RuleSet) -> Self {
        let statics = &config.static_files;
        let index_path = PathBuf::from(&statics.root).join(
            statics
                .index_files
                .first()
                .map_or("index.html", String::as_str),
        );

        Self::new(vec![
            Stage::Proxy(ProxyOptions {
                rules,
                forwarder: Forwarder::new(&config.proxy),
            }),
            Stage::Static(StaticOptions {
                root: statics.root.clone(),
                mounts: statics.mounts.clone(),
                index_files: statics.index_files.clone(),
                max_body_size: config.http.max_body_size,
            }),
            Stage::AppShell(AppShellOptions {
                enabled: statics.spa_fallback,
                index_path,
            }),
        ])
    }

    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Proxy rules of the first proxy stage, if any
    #[must_use]
    pub fn rules(&self) -> Option<&RuleSet> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Proxy(opts) => Some(&opts.rules),
            _ => None,
        })
    }

    /// Run stages in order until one answers
    pub async fn run(&self, req: Request<Incoming>) -> ProxyResponse {
        let mut req = req;
        for stage in &self.stages {
            match stage.handle(req).await {
                Outcome::Respond(resp) => return resp,
                Outcome::Continue(next) => req = next,
            }
        }
        build_404_response()
    }
}
