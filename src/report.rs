use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::ProbeConfig;
use crate::payload::TestCase;

/// Shortest interval a throughput is computed over.
pub const MIN_ELAPSED: Duration = Duration::from_nanos(1);

/// Bytes per second for one operation.
///
/// The elapsed time is floored at [`MIN_ELAPSED`], so a timer that reports zero
/// still yields a finite rate.
///
pub fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    bytes as f64 / elapsed.max(MIN_ELAPSED).as_secs_f64()
}

/// Arithmetic mean of per-case rates.
///
/// This is deliberately the mean of rates and not total bytes over total time; the
/// two disagree whenever cases differ in size or speed.
///
pub fn mean(rates: &[f64]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().sum::<f64>() / rates.len() as f64
}

/// Human readable size with binary prefixes and one decimal, e.g. `1.5MiB`.
pub fn sizeof_fmt(num: f64, suffix: &str) -> String {
    let mut num = num;
    for unit in ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"] {
        if num.abs() < 1024.0 {
            return format!("{num:3.1}{unit}{suffix}");
        }
        num /= 1024.0;
    }
    format!("{num:.1}Yi{suffix}")
}

/// The framed description printed before a batch run.
pub fn banner(test_count: usize) -> String {
    let rule = "*".repeat(80);
    format!(
        "\n\n{rule}\n\
         This test opens {test_count} files and writes data at random offsets(mid-block too).\n\
         Then all {test_count} files are opened, read and cross checked for correctness.\n\
         In the end, all {} file descriptors are closed.\n\
         {rule}\n",
        test_count * 2
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub block_size: u64,
    pub block_count: u64,
    pub test_count: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub errored: usize,
    /// Mean write throughput in bytes per second.
    pub write_rate: f64,
    /// Mean read throughput in bytes per second.
    pub read_rate: f64,
}

impl Report {
    pub fn from_cases(cases: &[TestCase], config: &ProbeConfig) -> Report {
        let write_rates: Vec<f64> = cases
            .iter()
            .filter_map(|c| c.write_duration.map(|d| throughput(c.payload.len(), d)))
            .collect();
        let read_rates: Vec<f64> = cases
            .iter()
            .filter_map(|c| c.read_duration.map(|d| throughput(c.payload.len(), d)))
            .collect();
        let matched = cases.iter().filter(|c| c.outcome.is_match()).count();
        let errored = cases.iter().filter(|c| c.outcome.is_error()).count();

        Report {
            block_size: config.block_size,
            block_count: config.block_count,
            test_count: cases.len(),
            matched,
            mismatched: cases.len() - matched - errored,
            errored,
            write_rate: mean(&write_rates),
            read_rate: mean(&read_rates),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.matched == self.test_count
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Write: {}/s Read: {}/s",
            sizeof_fmt(self.write_rate, "B"),
            sizeof_fmt(self.read_rate, "B")
        )?;
        write!(f, "Tests passed: {}/{}", self.matched, self.test_count)?;
        if self.errored > 0 {
            write!(f, " ({} errored)", self.errored)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Outcome;
    use std::path::PathBuf;

    fn case(len: usize, write: Option<Duration>, read: Option<Duration>, outcome: Outcome) -> TestCase {
        TestCase {
            path: PathBuf::from("/mnt/x"),
            first_offset: 0,
            second_offset: 0,
            payload: vec![0; len],
            write_duration: write,
            read_duration: read,
            read_len: None,
            outcome,
        }
    }

    #[test]
    fn zero_duration_is_finite() {
        let rate = throughput(8192, Duration::ZERO);
        assert!(rate.is_finite());
        assert!(rate > 0.0);
    }

    #[test]
    fn throughput_is_bytes_per_second() {
        assert_eq!(throughput(1024, Duration::from_secs(2)), 512.0);
    }

    #[test]
    fn mean_of_rates_not_total_over_time() {
        let cases = vec![
            case(100, Some(Duration::from_secs(1)), None, Outcome::Matched),
            case(100, Some(Duration::from_secs(4)), None, Outcome::Matched),
        ];
        let report = Report::from_cases(&cases, &ProbeConfig::default());
        // (100 + 25) / 2, where total/time would give 40.
        assert_eq!(report.write_rate, 62.5);
        assert_eq!(report.read_rate, 0.0);
    }

    #[test]
    fn formats_binary_units() {
        assert_eq!(sizeof_fmt(0.0, "B"), "0.0B");
        assert_eq!(sizeof_fmt(1023.0, "B"), "1023.0B");
        assert_eq!(sizeof_fmt(1536.0, "B"), "1.5KiB");
        assert_eq!(sizeof_fmt(3.0 * 1024.0 * 1024.0, "B"), "3.0MiB");
        assert_eq!(sizeof_fmt(1024f64.powi(8), "B"), "1.0YiB");
    }

    #[test]
    fn counts_and_display() {
        let d = Some(Duration::from_secs(1));
        let cases = vec![
            case(1024, d, d, Outcome::Matched),
            case(1024, d, d, Outcome::Mismatched),
            case(1024, None, None, Outcome::Error { message: "denied".into() }),
        ];
        let report = Report::from_cases(&cases, &ProbeConfig::default());
        assert_eq!(report.matched, 1);
        assert_eq!(report.mismatched, 1);
        assert_eq!(report.errored, 1);
        assert!(!report.all_passed());
        assert_eq!(
            report.to_string(),
            "Write: 1.0KiB/s Read: 1.0KiB/s\nTests passed: 1/3 (1 errored)"
        );
    }

    #[test]
    fn banner_mentions_descriptor_count() {
        let text = banner(150);
        assert!(text.contains("This test opens 150 files"));
        assert!(text.contains("all 300 file descriptors are closed"));
        assert!(text.starts_with("\n\n********"));
    }
}
