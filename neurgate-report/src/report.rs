//! Report Data Structures

use chrono::{DateTime, Utc};
use neurgate_core::{Failure, SuiteReport};
use neurgate_gate::RegressionCheck;
use serde::{Deserialize, Serialize};

/// Complete record of one `neurgate` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    /// Command that produced the report (`corpus`, `features`, ...)
    pub command: String,
    /// Overall verdict; mirrors the process exit status
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suites: Vec<SuiteResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub smoke: Vec<SmokeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<SuiteRunRecord>,
    /// Fatal error that ended the command early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    /// Empty report for `command`
    pub fn new(meta: ReportMeta, command: impl Into<String>) -> Self {
        Self {
            meta,
            command: command.into(),
            passed: false,
            suites: Vec::new(),
            gate: None,
            smoke: Vec::new(),
            runs: Vec::new(),
            error: None,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub system: SystemInfo,
}

/// Host information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_cores: u32,
}

/// Aggregated result of a corpus directory or feature suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub name: String,
    pub passed_count: usize,
    pub total_count: usize,
    /// Percent; absent when nothing was evaluated
    pub success_rate: Option<f64>,
    pub min_success_rate: f64,
    pub passed: bool,
    pub failures: Vec<Failure>,
}

impl SuiteResult {
    /// Snapshot `report` and judge it against `min_success_rate`
    pub fn from_report(
        name: impl Into<String>,
        report: &SuiteReport,
        min_success_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            passed_count: report.passed_count(),
            total_count: report.total_count(),
            success_rate: report.success_rate(),
            min_success_rate,
            passed: report.meets(min_success_rate),
            failures: report.failures().to_vec(),
        }
    }
}

/// Outcome of the benchmark regression gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub threshold_ratio: f64,
    pub checks: Vec<CheckRecord>,
}

/// One regression check plus its verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    #[serde(flatten)]
    pub check: RegressionCheck,
    pub passed: bool,
}

impl From<RegressionCheck> for CheckRecord {
    fn from(check: RegressionCheck) -> Self {
        let passed = check.passed();
        Self { check, passed }
    }
}

/// One release smoke example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeRecord {
    pub example: String,
    pub expected_exit_code: i32,
    /// Exit code of the produced binary, if it ran
    pub actual_exit_code: Option<i32>,
    pub passed: bool,
    pub detail: String,
}

/// One suite run by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteRunRecord {
    pub name: String,
    pub description: String,
    pub passed: bool,
    pub exit_code: i32,
    pub timed_out: bool,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurgate_core::Verdict;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_suite_result_snapshot() {
        let report: SuiteReport = [("a.nr", Verdict::pass()), ("b.nr", Verdict::fail("boom"))]
            .into_iter()
            .collect();

        let result = SuiteResult::from_report("debug", &report, 50.0);

        assert_eq!(result.passed_count, 1);
        assert_eq!(result.total_count, 2);
        assert_eq!(result.success_rate, Some(50.0));
        assert!(result.passed);
        assert_eq!(result.failures[0].name, "b.nr");
    }

    #[test]
    fn test_empty_suite_never_passes() {
        let result = SuiteResult::from_report("examples", &SuiteReport::new(), 0.0);
        assert!(!result.passed);
        assert_eq!(result.success_rate, None);
    }

    #[test]
    fn test_check_record_carries_verdict() {
        let key = "g/b".parse().unwrap();
        let check = RegressionCheck::new(&key, 1_400_000.0, 1_000_000.0, 0.35);
        let record = CheckRecord::from(check);
        assert!(!record.passed);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["key"], "g/b");
        assert_eq!(json["passed"], false);
    }
}
