//! Development server that serves the built client and forwards API,
//! websocket and schema traffic to a local backend.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod proxy;
pub mod routing;
pub mod server;
