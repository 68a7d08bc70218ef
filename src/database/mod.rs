//! database (db) union structure.
//!
//! Handlers only see the repository traits. Two backends implement them:
//! PostgreSQL through sqlx, and an in-memory store used when no connection
//! string is configured.
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::booking::BookingRepository;
use crate::flight::FlightRepository;
use crate::user::UserRepository;

pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("`{0}` is already taken")]
    Duplicate(&'static str),
    #[error("stored value is corrupted: {0}")]
    Corrupted(String),
}

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserRepository>,
    pub flights: Arc<dyn FlightRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

impl Database {
    /// Init database connections and run migrations.
    pub async fn connect(url: &str, pool: u32) -> Result<Self, StoreError> {
        let postgres = PgPoolOptions::new()
            .max_connections(pool)
            .connect(url)
            .await?;

        sqlx::migrate!().run(&postgres).await?;
        tracing::info!(pool, "postgres connected");

        Ok(Self::from_store(Arc::new(postgres::PgStore::new(postgres))))
    }

    /// Volatile store, lost on restart.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(memory::MemoryStore::default()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + FlightRepository + BookingRepository + 'static,
    {
        Self {
            users: store.clone(),
            flights: store.clone(),
            bookings: store,
        }
    }
}
