pub mod postgres;
pub mod resolve;
pub mod sqlite;
pub mod trait_def;

mod rows;

pub use postgres::PostgresStore;
pub use resolve::resolve_metadata;
pub use sqlite::SqliteStore;
pub use trait_def::{EventStore, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Open the configured backend and make sure its tables exist
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match config.backend {
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {}", config.url);
            Arc::new(SqliteStore::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage");
            Arc::new(PostgresStore::new(&config.url, config.max_connections).await?)
        }
    };

    store.init().await?;
    Ok(store)
}
