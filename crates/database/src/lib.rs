//! SQLite persistence layer for the WhatsApp gateway.
//!
//! This crate provides async database operations for tenants, the
//! append-only message log, tenant datasources and per-conversation board
//! metadata using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{message, tenant, Database, NewMessage, NewTenant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:gateway.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let tenant_id = tenant::create_tenant(
//!         db.pool(),
//!         &NewTenant {
//!             name: "Cafe Central".to_string(),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//!
//!     message::insert_message(
//!         db.pool(),
//!         &NewMessage {
//!             tenant_id,
//!             instance: format!("brand_{tenant_id}"),
//!             jid: "5493511234567@s.whatsapp.net".to_string(),
//!             from_me: false,
//!             text: Some("hola".to_string()),
//!             ts: 1_700_000_000,
//!             agent: None,
//!             raw_json: "{}".to_string(),
//!         },
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod conversation_meta;
pub mod datasource;
pub mod error;
pub mod message;
pub mod models;
pub mod tenant;

pub use error::{DatabaseError, Result};
pub use models::{
    ConversationMeta, Datasource, NewMessage, NewTenant, StoredMessage, Tenant,
    TenantConfigUpdate,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/gateway.db?mode=rwc").await?;
    ///
    /// // In-memory databases are per connection, so use a single one.
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
