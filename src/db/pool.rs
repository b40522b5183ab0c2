use std::sync::Arc;

use super::{DocumentStore, InMemoryStore, MongoStore};
use crate::config::Config;
use crate::error::AppResult;

/// Opens the process-wide store selected by `DATABASE_URL`.
pub async fn connect(config: &Config) -> AppResult<Arc<dyn DocumentStore>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; data will not survive a restart");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let store = MongoStore::connect(&config.database_url, &config.database_name).await?;
    store.ping().await?;
    Ok(Arc::new(store))
}
