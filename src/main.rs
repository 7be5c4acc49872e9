use std::sync::Arc;

use anyhow::Result;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use order_aggregate_service::{
    infra::{
        app_state::AppState,
        bootstrap::{self, bootstrap},
        config::{self, StorageBackend},
        db,
    },
    routes,
    store::{MemoryStore, OrderStore, PgOrderStore},
};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_env();
    bootstrap::init_tracing();

    let config = config::load()?;

    let store: Arc<dyn OrderStore> = match config.backend {
        StorageBackend::Postgres => {
            let database_url = config.database.url()?;

            tracing::info!("Running migrations...");
            let migrations_count = db::run_migrations_blocking(MIGRATIONS, database_url).await?;
            tracing::info!("Run {} new migrations successfully", migrations_count);

            let db_pool = db::create_pool(database_url, config.database.pool_size).await?;
            Arc::new(PgOrderStore::new(db_pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store, orders will not survive a restart");
            Arc::new(MemoryStore::default())
        }
    };

    let state = AppState::new(store, config.cache.capacity)?;
    let app = routes::app(state.clone());

    tracing::info!("Bootstrapping...");
    bootstrap("OrderService", app, state, &config.server.addr).await?;
    Ok(())
}
