// Application state module
// Shared, read-only collaborators handed to every request

use std::sync::Arc;

use super::types::Config;
use crate::clock::{Clock, SystemClock};
use crate::handler::static_files::AssetStore;
use crate::store::SharedDatabase;

/// Application state
pub struct AppState {
    pub config: Config,
    pub db: SharedDatabase,
    pub clock: Arc<dyn Clock>,
    pub assets: AssetStore,
}

impl AppState {
    /// Create `AppState` backed by the wall clock
    pub fn new(config: Config, db: SharedDatabase) -> Self {
        Self::with_clock(config, db, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, db: SharedDatabase, clock: Arc<dyn Clock>) -> Self {
        let assets = AssetStore::new(&config.assets.dir, &config.assets.index_file);
        Self {
            config,
            db,
            clock,
            assets,
        }
    }
}
