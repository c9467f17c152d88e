//! Data Model
//!
//! Test inputs, raw process results, verdicts and suite reports.
//!
//! A `SuiteReport` is folded from verdicts in discovery order. Its counters are
//! private so that `passed_count + failures.len() == total_count` holds for
//! every report that can be observed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the source text of a test case comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Source code held in memory
    Inline(String),
    /// Source code read from a file when the case is materialized
    File(PathBuf),
}

impl Source {
    /// Read the source text
    pub fn load(&self) -> std::io::Result<String> {
        match self {
            Source::Inline(code) => Ok(code.clone()),
            Source::File(path) => std::fs::read_to_string(path),
        }
    }
}

/// A named program to build and, optionally, run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    name: String,
    source: Source,
    expected_exit_code: Option<i32>,
    category: Option<String>,
}

impl TestCase {
    /// Create a build-only test case
    pub fn new(name: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            source,
            expected_exit_code: None,
            category: None,
        }
    }

    /// Create a build-only test case from inline code
    pub fn inline(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(name, Source::Inline(code.into()))
    }

    /// Require the produced executable to exit with `code`
    pub fn expecting(mut self, code: i32) -> Self {
        self.expected_exit_code = Some(code);
        self
    }

    /// Attach a category label (used only for grouped output)
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Case name; this is the case's identity
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case source
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Expected exit code of the produced executable, if the case runs it
    pub fn expected_exit_code(&self) -> Option<i32> {
        self.expected_exit_code
    }

    /// Category label
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Raw outcome of one external process invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code; `128 + signal` when the child was killed by a signal
    pub exit_code: i32,
    /// Terminating signal (Unix only)
    pub signal: Option<i32>,
    /// Captured standard output (lossy UTF-8)
    pub stdout: String,
    /// Captured standard error (lossy UTF-8)
    pub stderr: String,
    /// The wall-clock budget expired and the child was terminated
    pub timed_out: bool,
    /// Wall-clock time from spawn to reap
    pub elapsed: Duration,
}

impl ExecutionResult {
    /// Finished in time with exit code 0
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Pass/fail outcome for one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the case passed
    pub passed: bool,
    /// Human-readable explanation
    pub detail: String,
}

impl Verdict {
    /// Passing verdict
    pub fn pass() -> Self {
        Self {
            passed: true,
            detail: "Success".to_string(),
        }
    }

    /// Failing verdict with an explanation
    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
        }
    }

    /// Judge a build-only invocation: pass iff it finished in time with exit code 0.
    ///
    /// Output content is ignored for the decision; stderr becomes the failure detail.
    pub fn from_build(result: &ExecutionResult) -> Self {
        if result.timed_out {
            return Self::fail("Timeout");
        }
        if result.exit_code == 0 {
            return Self::pass();
        }
        let stderr = result.stderr.trim();
        if stderr.is_empty() {
            Self::fail(format!("exit code {}", result.exit_code))
        } else {
            Self::fail(stderr)
        }
    }
}

/// A failed case in a suite report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Case name
    pub name: String,
    /// Failure explanation
    pub detail: String,
}

/// Aggregated verdicts of one suite, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    passed_count: usize,
    total_count: usize,
    failures: Vec<Failure>,
}

impl SuiteReport {
    /// Empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one verdict into the report
    pub fn record(&mut self, name: impl Into<String>, verdict: Verdict) {
        self.total_count += 1;
        if verdict.passed {
            self.passed_count += 1;
        } else {
            self.failures.push(Failure {
                name: name.into(),
                detail: verdict.detail,
            });
        }
    }

    /// Append another report, keeping its failure order after ours
    pub fn merge(&mut self, other: &SuiteReport) {
        self.passed_count += other.passed_count;
        self.total_count += other.total_count;
        self.failures.extend(other.failures.iter().cloned());
    }

    /// Number of passing cases
    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    /// Number of evaluated cases
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Number of failing cases
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Failures in the order they were recorded
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// No case was evaluated
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Success rate in percent; `None` for an empty report
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_count == 0 {
            None
        } else {
            Some(self.passed_count as f64 / self.total_count as f64 * 100.0)
        }
    }

    /// Whether the success rate reaches `min_rate` percent.
    ///
    /// An empty report never meets any threshold.
    pub fn meets(&self, min_rate: f64) -> bool {
        self.success_rate().is_some_and(|rate| rate >= min_rate)
    }
}

impl<N: Into<String>> FromIterator<(N, Verdict)> for SuiteReport {
    fn from_iter<I: IntoIterator<Item = (N, Verdict)>>(iter: I) -> Self {
        let mut report = SuiteReport::new();
        for (name, verdict) in iter {
            report.record(name, verdict);
        }
        report
    }
}
