//! Database schema and migrations.

use anyhow::Result;
use rusqlite::Connection;

/// Run all pending migrations.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS test_results (
            id INTEGER PRIMARY KEY,
            server_ip TEXT NOT NULL,
            client_ip TEXT NOT NULL,
            forward_bandwidth TEXT,
            reverse_bandwidth TEXT,
            success INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            message TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_test_results_created ON test_results(created_at);
        CREATE INDEX IF NOT EXISTS idx_test_results_pair ON test_results(client_ip, server_ip);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);",
    )?;

    Ok(())
}
