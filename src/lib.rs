//! bwtest -- bidirectional iperf3 bandwidth tests between a client and a server.
//!
//! This crate drives the external `iperf3` utility in both directions, extracts
//! the reported throughput from its text output, and records one result per
//! run in a SQLite store.

pub mod config;
pub mod model;
pub mod storage;
pub mod throughput;

use std::sync::Arc;

use anyhow::Result;

use crate::config::BwtestConfig;
use crate::model::TestResult;
use crate::storage::SqliteStore;
use crate::throughput::iperf::Iperf3Process;
use crate::throughput::runner::BandwidthTestRunner;

/// Build a runner wired to the real iperf3 binary and the configured database.
pub fn build_runner(config: &BwtestConfig) -> Result<BandwidthTestRunner> {
    tracing::info!(db_path = %config.storage.db_path.display(), "Initializing database");
    let store = SqliteStore::open(&config.storage.db_path)?;
    let exec = Iperf3Process::new(config.iperf3.timeout());

    Ok(BandwidthTestRunner::new(
        config.iperf3.clone(),
        Arc::new(exec),
        Arc::new(store),
    ))
}

/// Run one bidirectional test and return the record that was written.
pub async fn run_test(
    config: &BwtestConfig,
    client_ip: &str,
    server_ip: &str,
) -> Result<TestResult> {
    let runner = build_runner(config)?;
    Ok(runner.run(client_ip, server_ip).await)
}
