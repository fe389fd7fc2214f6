//! # Run Metrics
//!
//! Purpose: Fold per-command samples into one summary per run.
//!
//! ## Notes
//! - A sample is `Success`, `Rejected` (the store answered with an error, or
//!   the client refused the command), or `Error` (transport failure).
//! - `failed_commands` counts both rejected and errored samples.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Which workload produced the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum TestKind {
    /// Valid `SET` commands through the client.
    Load,
    /// Malformed raw lines the store should reject.
    Fuzz,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestKind::Load => "load",
            TestKind::Fuzz => "fuzz",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
    Error,
}

/// One command's result and how long it took.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub outcome: Outcome,
    pub latency: Duration,
}

/// Summary of a load or fuzz run.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    /// Seconds since the Unix epoch when the run finished.
    pub timestamp: u64,
    pub test_type: TestKind,
    pub total_commands: usize,
    pub successful_commands: usize,
    pub failed_commands: usize,
    /// Subset of `failed_commands` caused by connect/IO/timeout failures.
    pub transport_errors: usize,
    pub average_latency_ms: f64,
    pub max_latency_ms: f64,
}

impl Metrics {
    pub fn from_samples(test_type: TestKind, samples: &[Sample]) -> Self {
        let count = |outcome: Outcome| samples.iter().filter(|s| s.outcome == outcome).count();
        let successful_commands = count(Outcome::Success);
        let transport_errors = count(Outcome::Error);

        let total: Duration = samples.iter().map(|s| s.latency).sum();
        let average_latency_ms = if samples.is_empty() {
            0.0
        } else {
            total.as_secs_f64() * 1e3 / samples.len() as f64
        };
        let max_latency_ms = samples
            .iter()
            .map(|s| s.latency)
            .max()
            .unwrap_or_default()
            .as_secs_f64()
            * 1e3;

        Metrics {
            timestamp: unix_now(),
            test_type,
            total_commands: samples.len(),
            successful_commands,
            failed_commands: samples.len() - successful_commands,
            transport_errors,
            average_latency_ms,
            max_latency_ms,
        }
    }

    /// Appends the pipe-separated summary line to `path`, creating it if needed.
    pub fn append_to(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        writeln!(file, "{}", self)
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{:.3}|{:.3}",
            self.timestamp,
            self.test_type,
            self.total_commands,
            self.successful_commands,
            self.failed_commands,
            self.transport_errors,
            self.average_latency_ms,
            self.max_latency_ms
        )
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
