//! Regression Gate
//!
//! Compares each baseline budget with the measured mean and fails if any
//! benchmark is slower than `budget * (1 + threshold_ratio)`.

use crate::baseline::{Baseline, BaselineEntry, BenchmarkKey};
use crate::error::GateError;
use crate::estimates::measured_mean_ns;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default allowed slowdown over baseline (35 %)
pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.35;

/// One baseline-versus-measured comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionCheck {
    /// Benchmark key (`group/name`)
    pub key: String,
    /// Measured mean in nanoseconds
    pub measured_ns: f64,
    /// Baseline budget in nanoseconds
    pub budget_ns: f64,
    /// Largest passing measurement: `budget_ns * (1 + threshold_ratio)`
    pub allowed_ns: f64,
    /// Slowdown factor: `measured_ns / budget_ns`
    pub ratio: f64,
}

impl RegressionCheck {
    /// Compare a measurement against its budget
    pub fn new(
        key: &BenchmarkKey,
        measured_ns: f64,
        budget_ns: f64,
        threshold_ratio: f64,
    ) -> Self {
        Self {
            key: key.to_string(),
            measured_ns,
            budget_ns,
            allowed_ns: budget_ns * (1.0 + threshold_ratio),
            ratio: measured_ns / budget_ns,
        }
    }

    /// The measurement is within the allowed budget
    pub fn passed(&self) -> bool {
        self.measured_ns <= self.allowed_ns
    }

    /// Summary line for a check that exceeded its budget
    pub fn failure_line(&self) -> String {
        format!(
            "{} exceeded budget: measured {:.0}ns > allowed {:.0}ns",
            self.key, self.measured_ns, self.allowed_ns
        )
    }
}

impl fmt::Display for RegressionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: measured={:.0}ns baseline={:.0}ns allowed={:.0}ns ratio={:.2}x",
            self.key, self.measured_ns, self.budget_ns, self.allowed_ns, self.ratio
        )
    }
}

/// Result of a completed gate run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GateOutcome {
    /// Checks in baseline order
    pub checks: Vec<RegressionCheck>,
}

impl GateOutcome {
    /// Every check is within budget
    pub fn passed(&self) -> bool {
        self.checks.iter().all(RegressionCheck::passed)
    }

    /// Checks that exceeded their budget
    pub fn regressions(&self) -> impl Iterator<Item = &RegressionCheck> {
        self.checks.iter().filter(|check| !check.passed())
    }
}

impl FromIterator<RegressionCheck> for GateOutcome {
    fn from_iter<I: IntoIterator<Item = RegressionCheck>>(iter: I) -> Self {
        Self {
            checks: iter.into_iter().collect(),
        }
    }
}

/// Validated gate configuration
#[derive(Debug, Clone)]
pub struct RegressionGate {
    baseline: Baseline,
    results_root: PathBuf,
    threshold_ratio: f64,
}

impl RegressionGate {
    /// Build a gate, rejecting an empty baseline or an invalid threshold
    pub fn new(
        baseline: Baseline,
        results_root: impl Into<PathBuf>,
        threshold_ratio: f64,
    ) -> Result<Self, GateError> {
        if !threshold_ratio.is_finite() || threshold_ratio < 0.0 {
            return Err(GateError::InvalidThreshold(threshold_ratio));
        }
        if baseline.is_empty() {
            return Err(GateError::EmptyBaseline);
        }
        Ok(Self {
            baseline,
            results_root: results_root.into(),
            threshold_ratio,
        })
    }

    /// Baseline being checked
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Allowed slowdown ratio
    pub fn threshold_ratio(&self) -> f64 {
        self.threshold_ratio
    }

    /// Lazily compare each baseline entry, in baseline order.
    ///
    /// A key's estimates are read only when the iterator reaches it, so callers
    /// can report each check before the next one can fail.
    pub fn checks(&self) -> impl Iterator<Item = Result<RegressionCheck, GateError>> + '_ {
        self.baseline
            .entries()
            .iter()
            .map(move |entry| self.check_entry(entry))
    }

    /// Run every comparison, stopping at the first infrastructure error
    pub fn run(&self) -> Result<GateOutcome, GateError> {
        let outcome = self.checks().collect::<Result<GateOutcome, GateError>>()?;
        info!(
            checks = outcome.checks.len(),
            regressions = outcome.regressions().count(),
            "regression gate finished"
        );
        Ok(outcome)
    }

    fn check_entry(&self, entry: &BaselineEntry) -> Result<RegressionCheck, GateError> {
        let measured = measured_mean_ns(&self.results_root, &entry.key)?;
        let check =
            RegressionCheck::new(&entry.key, measured, entry.budget_ns, self.threshold_ratio);
        debug!(
            key = %check.key,
            measured_ns = measured,
            passed = check.passed(),
            "compared benchmark"
        );
        Ok(check)
    }
}

/// Load `baseline_path` and compare it against `results_root`
pub fn check(
    baseline_path: &Path,
    results_root: &Path,
    threshold_ratio: f64,
) -> Result<GateOutcome, GateError> {
    let baseline = Baseline::load(baseline_path)?;
    RegressionGate::new(baseline, results_root, threshold_ratio)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_estimate(root: &Path, key: &str, mean_ns: f64) {
        let dir = root.join(key).join("new");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("estimates.json"),
            format!(r#"{{"mean": {{"point_estimate": {mean_ns}}}}}"#),
        )
        .unwrap();
    }

    fn write_baseline(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("baseline.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_within_tolerance_passes() {
        let tmp = TempDir::new().unwrap();
        let baseline = write_baseline(tmp.path(), r#"{"benchmarks": {"g/b": 1000000}}"#);
        write_estimate(tmp.path(), "g/b", 1_300_000.0);

        let outcome = check(&baseline, tmp.path(), 0.35).unwrap();

        assert!(outcome.passed());
        let only = &outcome.checks[0];
        assert!((only.allowed_ns - 1_350_000.0).abs() < 1e-6);
        assert_eq!(
            only.to_string(),
            "g/b: measured=1300000ns baseline=1000000ns allowed=1350000ns ratio=1.30x"
        );
    }

    #[test]
    fn test_over_tolerance_fails() {
        let tmp = TempDir::new().unwrap();
        let baseline = write_baseline(tmp.path(), r#"{"benchmarks": {"g/b": 1000000}}"#);
        write_estimate(tmp.path(), "g/b", 1_400_000.0);

        let outcome = check(&baseline, tmp.path(), 0.35).unwrap();

        assert!(!outcome.passed());
        let lines: Vec<_> = outcome.regressions().map(RegressionCheck::failure_line).collect();
        assert_eq!(
            lines,
            vec!["g/b exceeded budget: measured 1400000ns > allowed 1350000ns"]
        );
    }

    #[test]
    fn test_exactly_at_allowance_passes() {
        let key: BenchmarkKey = "g/b".parse().unwrap();
        let check = RegressionCheck::new(&key, 1500.0, 1000.0, 0.5);
        assert!(check.passed());
        assert_eq!(check.ratio, 1.5);
    }

    #[test]
    fn test_empty_baseline_is_rejected_before_any_read() {
        let tmp = TempDir::new().unwrap();
        let baseline = write_baseline(tmp.path(), r#"{"benchmarks": {}}"#);

        let err = check(&baseline, tmp.path(), 0.35).unwrap_err();

        assert!(matches!(err, GateError::EmptyBaseline));
        assert_eq!(err.to_string(), "no benchmark baseline entries found");
    }

    #[test]
    fn test_invalid_threshold() {
        let baseline: Baseline = [BaselineEntry {
            key: "g/b".parse().unwrap(),
            budget_ns: 10.0,
        }]
        .into_iter()
        .collect();

        for ratio in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                RegressionGate::new(baseline.clone(), "target/criterion", ratio),
                Err(GateError::InvalidThreshold(_))
            ));
        }
        assert!(RegressionGate::new(baseline, "target/criterion", 0.0).is_ok());
    }

    #[test]
    fn test_checks_stop_at_missing_results() {
        let tmp = TempDir::new().unwrap();
        write_estimate(tmp.path(), "a/first", 90.0);
        let baseline = Baseline::from_json(
            r#"{"benchmarks": {"a/first": 100, "b/missing": 100, "c/never": 100}}"#,
            Path::new("baseline.json"),
        )
        .unwrap();
        let gate = RegressionGate::new(baseline, tmp.path(), 0.1).unwrap();

        let mut checks = gate.checks();
        let first = checks.next().unwrap().unwrap();
        assert_eq!(first.key, "a/first");
        assert!(first.passed());
        assert!(matches!(
            checks.next().unwrap(),
            Err(GateError::MissingResults { .. })
        ));

        assert!(matches!(gate.run(), Err(GateError::MissingResults { .. })));
    }
}
