//! Suite Orchestrator
//!
//! Runs each suite as its own process, one after another, and reproduces its
//! output verbatim. A suite is judged only by its exit status; the orchestrator
//! knows nothing about what happens inside.

use neurgate_core::ProcessRunner;
use std::ffi::OsString;
use std::time::Duration;
use tracing::{info, warn};

/// Suites `neurgate all` knows how to run, with their display names
pub const KNOWN_SUITES: [(&str, &str); 4] = [
    ("corpus", "File Compilation Tests"),
    ("features", "Language Feature Tests"),
    ("bench-gate", "Benchmark Regression Gate"),
    ("smoke", "Release Smoke Tests"),
];

/// Display name of a known suite
pub fn suite_description(name: &str) -> Option<&'static str> {
    KNOWN_SUITES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, description)| *description)
}

/// A suite and the command line that runs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSpec {
    /// Suite name as given on the command line
    pub name: String,
    /// Heading printed before the suite's output
    pub description: String,
    /// Program and arguments
    pub command: Vec<OsString>,
}

/// What one suite did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRun {
    /// Suite name
    pub name: String,
    /// Suite heading
    pub description: String,
    /// Exit status was zero
    pub passed: bool,
    /// Exit code, `128 + signal` when killed
    pub exit_code: i32,
    /// The suite hit the per-suite timeout
    pub timed_out: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error, or the reason the suite did not run
    pub stderr: String,
    /// Wall-clock time
    pub elapsed: Duration,
}

/// Runs suites sequentially under a per-suite timeout
#[derive(Debug, Clone)]
pub struct Orchestrator {
    runner: ProcessRunner,
    timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator that gives each suite `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            runner: ProcessRunner::new(),
            timeout,
        }
    }

    /// Run one suite to completion; failure to start counts as a failed suite
    pub fn run_suite(&self, suite: &SuiteSpec) -> SuiteRun {
        info!(suite = %suite.name, "running suite");
        match self
            .runner
            .run(&suite.command, None, self.timeout)
        {
            Ok(result) => SuiteRun {
                name: suite.name.clone(),
                description: suite.description.clone(),
                passed: result.success(),
                exit_code: result.exit_code,
                timed_out: result.timed_out,
                stdout: result.stdout,
                stderr: if result.timed_out {
                    "Test timed out".to_string()
                } else {
                    result.stderr
                },
                elapsed: result.elapsed,
            },
            Err(e) => {
                warn!(suite = %suite.name, error = %e, "suite could not be started");
                SuiteRun {
                    name: suite.name.clone(),
                    description: suite.description.clone(),
                    passed: false,
                    exit_code: 1,
                    timed_out: false,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    elapsed: Duration::ZERO,
                }
            }
        }
    }

    /// Run every suite in order, printing each one's output as it completes
    pub fn run_all(&self, suites: &[SuiteSpec]) -> Vec<SuiteRun> {
        println!("*** neurgate - Master Test Suite ***");
        println!("{}", "=".repeat(60));

        let mut runs = Vec::with_capacity(suites.len());
        for suite in suites {
            println!("\n[*] Running {}", suite.description);
            println!("{}", "-".repeat(40));

            let run = self.run_suite(suite);
            if run.passed {
                println!("[PASS] {} - PASSED", run.description);
            } else {
                println!("[FAIL] {} - FAILED", run.description);
            }
            if !run.stdout.is_empty() {
                println!("{}", run.stdout);
            }
            if !run.stderr.is_empty() {
                println!("Errors: {}", run.stderr);
            }
            runs.push(run);
        }

        println!("\n{}", "=".repeat(60));
        println!("*** MASTER TEST SUITE RESULTS ***");
        println!("{}", "=".repeat(60));
        if all_passed(&runs) {
            println!("[SUCCESS] ALL TESTS PASSED!");
        } else {
            println!("[ERROR] SOME TESTS FAILED");
            println!("Review the test output above for details.");
        }
        runs
    }
}

/// Every suite passed (vacuously true for no suites)
pub fn all_passed(runs: &[SuiteRun]) -> bool {
    runs.iter().all(|run| run.passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shell_suite(name: &str, script: &str) -> SuiteSpec {
        SuiteSpec {
            name: name.to_string(),
            description: format!("{name} suite"),
            command: vec!["sh".into(), "-c".into(), script.into()],
        }
    }

    #[test]
    fn test_known_suites() {
        assert_eq!(suite_description("corpus"), Some("File Compilation Tests"));
        assert_eq!(suite_description("smoke"), Some("Release Smoke Tests"));
        assert_eq!(suite_description("lint"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_every_suite_and_aggregates() {
        let orchestrator = Orchestrator::new(Duration::from_secs(10));
        let runs = orchestrator.run_all(&[
            shell_suite("first", "echo one; exit 1"),
            shell_suite("second", "echo two; echo warn >&2"),
        ]);

        assert_eq!(runs.len(), 2);
        assert!(!runs[0].passed);
        assert_eq!(runs[0].stdout, "one\n");
        assert!(runs[1].passed);
        assert_eq!(runs[1].stderr, "warn\n");
        assert!(!all_passed(&runs));
    }

    #[cfg(unix)]
    #[test]
    fn test_timed_out_suite() {
        let orchestrator = Orchestrator::new(Duration::from_millis(300));
        let run = orchestrator.run_suite(&shell_suite("slow", "sleep 30"));

        assert!(!run.passed);
        assert!(run.timed_out);
        assert_eq!(run.stderr, "Test timed out");
    }

    #[test]
    fn test_unstartable_suite_fails() {
        let orchestrator = Orchestrator::new(Duration::from_secs(1));
        let run = orchestrator.run_suite(&SuiteSpec {
            name: "ghost".to_string(),
            description: "Ghost".to_string(),
            command: vec!["/no/such/neurgate".into()],
        });
        assert!(!run.passed);
        assert!(run.stderr.contains("/no/such/neurgate"));
    }

    #[test]
    fn test_all_passed() {
        assert!(all_passed(&[]));

        let orchestrator = Orchestrator::new(Duration::from_secs(1));
        let failed = orchestrator.run_suite(&SuiteSpec {
            name: "ghost".to_string(),
            description: "Ghost".to_string(),
            command: vec!["/no/such/neurgate".into()],
        });
        assert!(!all_passed(&[failed]));
    }
}
