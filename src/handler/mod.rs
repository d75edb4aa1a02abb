//! Request handler module
//!
//! Runs each request through the serving pipeline: proxy rules first, then
//! static files, then the application shell.

pub mod pipeline;
pub mod router;
pub mod static_files;

pub use pipeline::{Pipeline, Stage};
pub use router::{handle_request, RequestContext};
