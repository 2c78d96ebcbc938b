//! iperf3 process wrapper -- build the command line, spawn, capture stdout.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::ThroughputError;
use crate::config::Iperf3Config;

/// A fully built iperf3 invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iperf3Command {
    pub program: String,
    pub args: Vec<String>,
}

impl Iperf3Command {
    /// Client-to-server test: connect to `server_ip`, bind to `client_ip`.
    pub fn forward(
        flags: &Iperf3Config,
        client_ip: &str,
        server_ip: &str,
    ) -> Result<Self, ThroughputError> {
        validate_target(server_ip)?;
        validate_target(client_ip)?;

        let mut args = vec![
            "-c".to_string(),
            server_ip.to_string(),
            "-B".to_string(),
            client_ip.to_string(),
            "-f".to_string(),
            flags.format.clone(),
            "-t".to_string(),
            flags.duration_sec.to_string(),
            "-i".to_string(),
            flags.interval_sec.to_string(),
        ];
        if flags.no_delay {
            args.push("-N".to_string());
        }
        args.extend([
            "-S".to_string(),
            flags.tos.clone(),
            "-w".to_string(),
            flags.window.clone(),
        ]);

        Ok(Self {
            program: flags.path.clone(),
            args,
        })
    }

    /// The same test with the data direction inverted (`-R`).
    pub fn reverse(&self) -> Self {
        let mut cmd = self.clone();
        cmd.args.push("-R".to_string());
        cmd
    }
}

impl fmt::Display for Iperf3Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Targets end up as process arguments, so reject anything that could be
/// read as a flag. `%` is allowed for IPv6 zone IDs (`fe80::1%eth0`).
pub fn validate_target(target: &str) -> Result<(), ThroughputError> {
    let reason = if target.is_empty() {
        "target cannot be empty"
    } else if target.starts_with('-') {
        "target cannot start with hyphen"
    } else if target
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != ':' && c != '%')
    {
        "target contains invalid characters"
    } else {
        return Ok(());
    };

    Err(ThroughputError::InvalidTarget {
        target: target.to_string(),
        reason,
    })
}

/// Runs an iperf3 command and hands back whatever it wrote to stdout.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, cmd: &Iperf3Command) -> Result<String, ThroughputError>;
}

/// Spawns the real iperf3 binary via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct Iperf3Process {
    timeout: Option<Duration>,
}

impl Iperf3Process {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandExecutor for Iperf3Process {
    async fn execute(&self, cmd: &Iperf3Command) -> Result<String, ThroughputError> {
        let child = tokio::process::Command::new(&cmd.program)
            .args(&cmd.args)
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child)
                .await
                .map_err(|_| ThroughputError::Timeout { limit })?,
            None => child.await,
        }
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ThroughputError::Iperf3NotFound {
                path: cmd.program.clone(),
            },
            _ => ThroughputError::Spawn(e),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(status = %output.status, bytes = stdout.len(), "iperf3 exited");

        // iperf3 reports connection errors on stdout with a non-zero exit;
        // that text is still output and goes to the parser.
        if stdout.is_empty() && !output.status.success() {
            return Err(ThroughputError::Iperf3Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}
