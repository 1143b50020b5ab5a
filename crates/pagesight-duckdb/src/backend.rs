use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use pagesight_core::config::Config;

use crate::schema::init_sql;

/// A DuckDB store for the reporting engine.
///
/// DuckDB is single-writer: concurrent reads are fine, but the embedded
/// connection object itself is not thread-safe, so it sits behind an
/// `Arc<Mutex<_>>`. Report queries therefore serialise on the lock —
/// the assemblers issue window and comparison queries concurrently, and
/// correctness never depends on them actually overlapping.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"`; it comes
    /// from `Config.duckdb_memory_limit`. Runs the idempotent schema init
    /// so all tables and indexes exist.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!("DuckDB opened at {} with memory_limit={}", path, memory_limit);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database at its configured location.
    ///
    /// Ensures `config.data_dir` exists, then opens `pagesight.db` inside
    /// it with the configured memory limit. Hosts pair this with
    /// [`pagesight_core::config::Config::from_env`] at startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let db_path = format!("{}/pagesight.db", config.data_dir);
        Self::open(&db_path, &config.duckdb_memory_limit)
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests — data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Register an event type. Safe to call repeatedly with the same slug.
    pub async fn seed_event_type(&self, id: i64, slug: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO event_types (id, slug) VALUES (?1, ?2)",
            duckdb::params![id, slug],
        )?;
        Ok(())
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to seed or verify stored
    /// data. Production reads go through the executor trait.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
