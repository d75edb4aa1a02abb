use std::sync::Arc;

use devserver::config::{self, AppState, Config, RuntimeConfig};
use devserver::{logger, server};
use tokio::sync::Notify;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());

    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Backend origin is fixed for the life of the process
    let runtime_cfg = match cfg.load_runtime() {
        Ok(r) => r,
        Err(e) => {
            logger::log_error(&format!("Cannot resolve backend: {e}"));
            return Err(e.into());
        }
    };

    // Connections and relays are local tasks, one thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg, runtime_cfg))
}

async fn async_main(cfg: Config, runtime_cfg: RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg, runtime_cfg)?);

    if let Some(rules) = state.rules() {
        logger::log_server_start(&addr, &cfg, &state.runtime, rules);
    }
    logger::log_pipeline(&state.pipeline.stage_names());

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state, shutdown)).await;
    Ok(())
}
