//! Log writer module
//!
//! Installs the global `tracing` subscriber. Access lines and diagnostics go
//! to separate outputs: files when configured, stdout/stderr otherwise.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Target carried by access log events
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides `level` when set. Access lines are always enabled at
/// info so a quieter diagnostic level does not silence them.
pub fn init(level: &str, access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},{ACCESS_TARGET}=info")));

    let access_writer = match access_log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(io::stdout),
    };
    let error_writer = match error_log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(io::stderr),
    };
    let to_file = error_log_file.is_some();

    let access_layer = fmt::layer()
        .with_writer(access_writer)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_ansi(false)
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    let diagnostics_layer = fmt::layer()
        .with_writer(error_writer)
        .with_target(false)
        .with_ansi(!to_file)
        .with_filter(filter_fn(|meta| meta.target() != ACCESS_TARGET));

    tracing_subscriber::registry()
        .with(filter)
        .with(access_layer)
        .with(diagnostics_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
