//! The persisted test result record and its timestamp format.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

pub const MSG_SUCCESS: &str = "Test ran successfully";
pub const MSG_FORWARD_FAILED: &str =
    "Test did not run. Please verify the IP addresses are accessible from the web server.";
pub const MSG_REVERSE_FAILED: &str = "Test did not return results correctly. Please try again.";

/// Why a run ended without both bandwidth values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestFailure {
    /// iperf3 produced nothing (includes spawn errors, timeouts and invalid targets).
    NoOutput,
    /// Forward output had no bandwidth token.
    ForwardParse,
    /// Reverse output had no bandwidth token.
    ReverseParse,
}

impl TestFailure {
    /// The message recorded for this failure. `NoOutput` records none.
    pub fn message(self) -> Option<&'static str> {
        match self {
            TestFailure::NoOutput => None,
            TestFailure::ForwardParse => Some(MSG_FORWARD_FAILED),
            TestFailure::ReverseParse => Some(MSG_REVERSE_FAILED),
        }
    }
}

impl std::fmt::Display for TestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestFailure::NoOutput => write!(f, "iperf3 produced no output"),
            TestFailure::ForwardParse => write!(f, "{}", MSG_FORWARD_FAILED),
            TestFailure::ReverseParse => write!(f, "{}", MSG_REVERSE_FAILED),
        }
    }
}

/// One bidirectional test outcome. Created once per run, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub server_ip: String,
    pub client_ip: String,
    pub forward_bandwidth: Option<String>,
    pub reverse_bandwidth: Option<String>,
    pub success: bool,
    pub timestamp: String,
    pub message: Option<String>,
}

impl TestResult {
    pub fn success(
        client_ip: &str,
        server_ip: &str,
        forward_bandwidth: String,
        reverse_bandwidth: String,
    ) -> Self {
        Self {
            server_ip: server_ip.to_string(),
            client_ip: client_ip.to_string(),
            forward_bandwidth: Some(forward_bandwidth),
            reverse_bandwidth: Some(reverse_bandwidth),
            success: true,
            timestamp: timestamp_now(),
            message: Some(MSG_SUCCESS.to_string()),
        }
    }

    pub fn failure(client_ip: &str, server_ip: &str, failure: TestFailure) -> Self {
        Self {
            server_ip: server_ip.to_string(),
            client_ip: client_ip.to_string(),
            forward_bandwidth: None,
            reverse_bandwidth: None,
            success: false,
            timestamp: timestamp_now(),
            message: failure.message().map(str::to_string),
        }
    }
}

/// Current local time as "day date time", e.g. `Mon Oct 19 2026 3:04:05 PM`.
pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}

pub fn format_timestamp<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    dt.format("%a %b %d %Y %-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_timestamp_afternoon() {
        let dt = Utc.with_ymd_and_hms(2026, 10, 19, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(&dt), "Mon Oct 19 2026 3:04:05 PM");
    }

    #[test]
    fn test_format_timestamp_pads_day_not_hour() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 5, 0, 30, 0).unwrap();
        assert_eq!(format_timestamp(&dt), "Thu Mar 05 2026 12:30:00 AM");
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(TestFailure::NoOutput.message(), None);
        assert_eq!(TestFailure::ForwardParse.message(), Some(MSG_FORWARD_FAILED));
        assert_eq!(TestFailure::ReverseParse.message(), Some(MSG_REVERSE_FAILED));
    }

    #[test]
    fn test_failure_record_has_no_bandwidth() {
        let r = TestResult::failure("10.0.0.5", "10.0.0.9", TestFailure::ReverseParse);
        assert!(!r.success);
        assert_eq!(r.client_ip, "10.0.0.5");
        assert_eq!(r.server_ip, "10.0.0.9");
        assert!(r.forward_bandwidth.is_none());
        assert!(r.reverse_bandwidth.is_none());
        assert_eq!(r.message.as_deref(), Some(MSG_REVERSE_FAILED));
        assert!(!r.timestamp.is_empty());
    }

    #[test]
    fn test_success_record() {
        let r = TestResult::success(
            "10.0.0.5",
            "10.0.0.9",
            "941 Mbits/sec".to_string(),
            "938 Mbits/sec".to_string(),
        );
        assert!(r.success);
        assert_eq!(r.forward_bandwidth.as_deref(), Some("941 Mbits/sec"));
        assert_eq!(r.reverse_bandwidth.as_deref(), Some("938 Mbits/sec"));
        assert_eq!(r.message.as_deref(), Some(MSG_SUCCESS));
    }
}
