//! Forward/reverse bandwidth test orchestration.
//!
//! A run measures client-to-server first, then server-to-client, and writes
//! exactly one [`TestResult`]. Every failure is recorded rather than returned.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::iperf::{CommandExecutor, Iperf3Command};
use super::parse::extract_bandwidth;
use crate::config::Iperf3Config;
use crate::model::{TestFailure, TestResult};
use crate::storage::ResultStore;

#[derive(Clone)]
pub struct BandwidthTestRunner {
    flags: Iperf3Config,
    exec: Arc<dyn CommandExecutor>,
    store: Arc<dyn ResultStore>,
}

impl BandwidthTestRunner {
    pub fn new(
        flags: Iperf3Config,
        exec: Arc<dyn CommandExecutor>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self { flags, exec, store }
    }

    /// Start a run in the background. The outcome is only visible through the
    /// store and the log.
    pub fn spawn(
        &self,
        client_ip: impl Into<String>,
        server_ip: impl Into<String>,
    ) -> JoinHandle<()> {
        let runner = self.clone();
        let client_ip = client_ip.into();
        let server_ip = server_ip.into();
        tokio::spawn(async move {
            runner.run(&client_ip, &server_ip).await;
        })
    }

    /// Run both directions, persist the outcome, and return the written record.
    pub async fn run(&self, client_ip: &str, server_ip: &str) -> TestResult {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "bandwidth_test",
            %run_id,
            client = %client_ip,
            server = %server_ip
        );

        async {
            let result = match self.measure(client_ip, server_ip).await {
                Ok((forward, reverse)) => {
                    info!(%forward, %reverse, "test ran successfully");
                    TestResult::success(client_ip, server_ip, forward, reverse)
                }
                Err(failure) => {
                    warn!(?failure, "{}", failure);
                    TestResult::failure(client_ip, server_ip, failure)
                }
            };

            if let Err(e) = self.store.create(&result) {
                error!(error = %e, "Failed to save test result");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn measure(
        &self,
        client_ip: &str,
        server_ip: &str,
    ) -> Result<(String, String), TestFailure> {
        let forward = Iperf3Command::forward(&self.flags, client_ip, server_ip).map_err(|e| {
            warn!(error = %e, "refusing to run iperf3");
            TestFailure::NoOutput
        })?;

        info!(command = %forward, "running forward performance test");
        let output = self.invoke(&forward).await;
        if output.is_empty() {
            return Err(TestFailure::NoOutput);
        }
        let forward_bw = extract_bandwidth(&output).ok_or(TestFailure::ForwardParse)?;

        let reverse = forward.reverse();
        info!(command = %reverse, "running reverse performance test");
        let output = self.invoke(&reverse).await;
        let reverse_bw = extract_bandwidth(&output).ok_or(TestFailure::ReverseParse)?;

        Ok((forward_bw, reverse_bw))
    }

    /// Invocation errors count as empty output.
    async fn invoke(&self, cmd: &Iperf3Command) -> String {
        match self.exec.execute(cmd).await {
            Ok(out) => out,
            Err(e) => {
                warn!(error = %e, command = %cmd, "iperf3 invocation failed");
                String::new()
            }
        }
    }
}
