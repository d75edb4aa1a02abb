//! HTTP protocol layer module
//!
//! Protocol helpers shared by the static stages and the proxy stage.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_413_response, build_gateway_error,
    build_options_response, empty, full, ProxyBody, ProxyResponse,
};
