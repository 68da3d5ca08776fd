pub mod add;
pub mod brief;
pub mod context;
pub mod doctor;
pub mod import;
pub mod stats;
pub mod weather;

use daybrief::config::ResolvedConfig;
use daybrief::error::BriefError;
use daybrief::memory::sqlite::SqliteStore;

/// Open the fact store for a brief run. Failure is reported as the store-init stage.
pub(crate) fn open_store(config: &ResolvedConfig) -> Result<SqliteStore, BriefError> {
    SqliteStore::open(&config.db_path).map_err(|e| {
        BriefError::StoreInit(format!("{}: {e:#}", config.db_path.display()))
    })
}
