//! SQLite storage layer -- schema, inserts, history queries.

pub mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use r2d2::Pool as R2D2Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::model::TestResult;

/// Connection Pool type
pub type Pool = R2D2Pool<SqliteConnectionManager>;

/// Where the runner writes its records.
pub trait ResultStore: Send + Sync {
    /// Persist one result. Records are never updated afterwards.
    fn create(&self, result: &TestResult) -> Result<()>;
}

/// Open (or create) the SQLite database and return a connection pool.
pub fn open_pool(path: &Path) -> Result<Pool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = R2D2Pool::new(manager)?;

    // Run migrations on a single connection
    let conn = pool.get()?;
    schema::migrate(&conn)?;

    Ok(pool)
}

/// `ResultStore` backed by the `test_results` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            pool: open_pool(path)?,
        })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Most recent results first.
    pub fn recent(&self, limit: usize) -> Result<Vec<TestResult>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT server_ip, client_ip, forward_bandwidth, reverse_bandwidth,
                    success, timestamp, message
             FROM test_results ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(TestResult {
                    server_ip: row.get(0)?,
                    client_ip: row.get(1)?,
                    forward_bandwidth: row.get(2)?,
                    reverse_bandwidth: row.get(3)?,
                    success: row.get(4)?,
                    timestamp: row.get(5)?,
                    message: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl ResultStore for SqliteStore {
    fn create(&self, r: &TestResult) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO test_results
                (server_ip, client_ip, forward_bandwidth, reverse_bandwidth, success, timestamp, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                r.server_ip,
                r.client_ip,
                r.forward_bandwidth,
                r.reverse_bandwidth,
                r.success,
                r.timestamp,
                r.message
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TestFailure, MSG_FORWARD_FAILED};

    #[test]
    fn test_create_and_read_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("nested").join("bw.db")).unwrap();

        let ok = TestResult::success(
            "10.0.0.5",
            "10.0.0.9",
            "941 Mbits/sec".to_string(),
            "12.5 Mbits/sec".to_string(),
        );
        let failed = TestResult::failure("10.0.0.5", "10.0.0.9", TestFailure::ForwardParse);
        store.create(&ok).unwrap();
        store.create(&failed).unwrap();

        let rows = store.recent(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], failed);
        assert_eq!(rows[1], ok);
        assert_eq!(rows[0].message.as_deref(), Some(MSG_FORWARD_FAILED));
    }

    #[test]
    fn test_absent_message_stays_null() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("bw.db")).unwrap();

        store
            .create(&TestResult::failure("a", "b", TestFailure::NoOutput))
            .unwrap();

        let rows = store.recent(1).unwrap();
        assert!(rows[0].message.is_none());
        assert!(!rows[0].success);
    }

    #[test]
    fn test_recent_respects_limit() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = open_pool(&dir.path().join("bw.db")).unwrap();
        let store = SqliteStore::from_pool(pool);

        for _ in 0..5 {
            store
                .create(&TestResult::failure("a", "b", TestFailure::NoOutput))
                .unwrap();
        }
        assert_eq!(store.recent(3).unwrap().len(), 3);
    }
}
