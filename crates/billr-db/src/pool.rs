//! # Connection Pool
//!
//! Opens the SQLite file behind every account and hands out repositories
//! that share one pool.
//!
//! ```text
//! BILLR_* env ──► BillrConfig::load() ──► db_config() ──► DbConfig
//!                                                           │
//!                        connect_options() ◄────────────────┤
//!                        pool_options()    ◄────────────────┘
//!                                │
//!                                ▼
//!                   Database { SqlitePool } ──► migrations (once)
//!                                │
//!       companies() / customers() / products() / invoices()
//! ```
//!
//! The journal runs in WAL mode so the date-range report and broker ledger
//! can read while an invoice is being written. Foreign keys are switched on
//! per connection because SQLite leaves them off.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::company::CompanyRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool around it is sized.
///
/// Usually built by [`BillrConfig::db_config`](crate::BillrConfig::db_config)
/// rather than by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Upper bound on open connections.
    pub max_connections: u32,

    /// Connections kept open while idle. Never above `max_connections`.
    pub min_connections: u32,

    /// How long a query waits for a free connection before failing.
    pub acquire_timeout: Duration,

    /// Idle connections above `min_connections` close after this long.
    pub idle_timeout: Duration,

    /// Apply embedded migrations while opening.
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Private in-memory database for tests.
    ///
    /// Every connection to `:memory:` would see its own empty database, so
    /// the pool is pinned to a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(IN_MEMORY)
        }
    }

    /// Sets the pool bounds. `min` is clamped to `max`, and `max` to at
    /// least one.
    pub fn pool_size(mut self, min: u32, max: u32) -> Self {
        self.max_connections = max.max(1);
        self.min_connections = min.min(self.max_connections);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Opens without touching the schema; call
    /// [`Database::run_migrations`] later.
    pub fn skip_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Some(self.idle_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the pool. Cheap to clone; each repository accessor
/// returns a repository holding its own pool clone.
///
/// ```rust,ignore
/// async fn invoice_list(db: &Database, tenant_id: &str) -> DbResult<Vec<Invoice>> {
///     db.invoices().list(tenant_id).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool described by `config` and, unless skipped, brings the
    /// schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Opening database"
        );

        let connect_options = config.connect_options()?;
        debug!(
            acquire_timeout_secs = config.acquire_timeout.as_secs(),
            in_memory = config.is_in_memory(),
            "Connection options ready"
        );

        let pool = config
            .pool_options()
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending embedded migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Schema up to date");
        Ok(())
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Letterhead profiles.
    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Invoices, numbering, e-way bills, ledger and report.
    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later queries fail with
    /// [`DbError::ConnectionFailed`].
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// `true` while the pool can still run a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
