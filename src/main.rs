use std::sync::Arc;

use pricelog::config::{AppState, Config};
use pricelog::logger;
use pricelog::server::{self, ShutdownSignal};
use pricelog::store::{self, SharedDatabase, SqliteDatabase};

const IN_MEMORY_PATH: &str = ":memory:";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument overrides the config file path
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let db = open_database(&cfg)?;
    let listener = server::create_reusable_listener(addr)?;

    let shutdown = ShutdownSignal::new();
    server::signal::start_signal_handler(shutdown.clone())?;

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::new(cfg, db));

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state, shutdown))
        .await?;
    Ok(())
}

fn open_database(cfg: &Config) -> Result<SharedDatabase, store::StoreError> {
    let db = if cfg.database.path == IN_MEMORY_PATH {
        SqliteDatabase::open_in_memory()?
    } else {
        SqliteDatabase::open(&cfg.database.path, cfg.database.busy_timeout_ms)?
    };
    if cfg.database.create_schema {
        store::init_schema(&db)?;
        logger::log_info("[DB] Entries schema ready");
    }
    Ok(Arc::new(db))
}
