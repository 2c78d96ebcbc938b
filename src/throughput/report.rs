//! Test result formatting for terminal output.

use crate::model::TestResult;

/// Format a test result as a one-line human-readable summary.
pub fn format_summary(result: &TestResult) -> String {
    let status = if result.success { "OK" } else { "FAILED" };

    let mut summary = format!(
        "[{}] {} {} -> {}",
        result.timestamp, status, result.client_ip, result.server_ip
    );

    if let (Some(fwd), Some(rev)) = (&result.forward_bandwidth, &result.reverse_bandwidth) {
        summary.push_str(&format!(", forward: {}, reverse: {}", fwd, rev));
    }
    if let Some(msg) = &result.message {
        summary.push_str(&format!(" ({})", msg));
    }

    summary
}
