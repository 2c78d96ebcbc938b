//! Throughput testing engine: iperf3 wrapper, output parsing, and the
//! forward/reverse test runner.

pub mod iperf;
pub mod parse;
pub mod report;
pub mod runner;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThroughputError {
    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: &'static str },

    #[error("iperf3 not found at {path}")]
    Iperf3NotFound { path: String },

    #[error("failed to execute iperf3: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("iperf3 process exited with code {code}: {stderr}")]
    Iperf3Failed { code: i32, stderr: String },

    #[error("iperf3 did not finish within {limit:?}")]
    Timeout { limit: std::time::Duration },
}
