mod seed;

pub use seed::run_seed;

use crate::config::ServerConfig;
use crate::store::{SqliteStore, Store};

/// Opens the configured database, creating the data directory and schema
/// when missing.
pub fn open_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
    std::fs::create_dir_all(&config.data_dir)?;
    let store = SqliteStore::new(&config.db_path())?;
    store.initialize()?;
    Ok(store)
}
