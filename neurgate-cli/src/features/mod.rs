//! Feature Harness
//!
//! Compiles small programs and checks the exit code of what the compiler
//! produced. Each case gets a private scratch directory that is removed when
//! the case finishes, however it finishes.

mod cases;
mod catalog;

pub use cases::{CaseFileError, load_cases, parse_cases};
pub use catalog::{CATEGORIES, builtin_cases, category_summary_label, category_title};

use crate::pool::{PoolError, run_ordered};
use neurgate_core::{
    CompilerDriver, ProcessError, ProcessRunner, SuiteReport, TestCase, Verdict, executable_for,
};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

/// Infrastructure problems inside one case; they fail that case only
#[derive(Debug, Error)]
enum HarnessError {
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Failed to read case source {}: {source}", .path.display())]
    LoadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Verdict for one case, with the labels needed for grouped output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Case name
    pub name: String,
    /// Catalog category, if the case has one
    pub category: Option<String>,
    /// Pass/fail result
    pub verdict: Verdict,
}

/// Builds, runs and judges feature cases
pub struct FeatureHarness<'a> {
    driver: &'a dyn CompilerDriver,
    runner: ProcessRunner,
    build_timeout: Duration,
    run_timeout: Duration,
    scratch_root: Option<PathBuf>,
    jobs: usize,
}

impl<'a> FeatureHarness<'a> {
    /// Create a sequential harness with the default timeouts
    pub fn new(driver: &'a dyn CompilerDriver) -> Self {
        Self {
            driver,
            runner: ProcessRunner::new(),
            build_timeout: Duration::from_secs(neurgate_core::DEFAULT_BUILD_TIMEOUT_SECS),
            run_timeout: Duration::from_secs(neurgate_core::DEFAULT_RUN_TIMEOUT_SECS),
            scratch_root: None,
            jobs: 1,
        }
    }

    /// Set the compile and run timeouts for each case
    pub fn with_timeouts(mut self, build: Duration, run: Duration) -> Self {
        self.build_timeout = build;
        self.run_timeout = run;
        self
    }

    /// Create scratch directories under `root` instead of the system temp dir
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Evaluate up to `jobs` cases at once
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Evaluate `cases` in the given order
    pub fn evaluate(&self, cases: &[TestCase]) -> Result<SuiteReport, PoolError> {
        let outcomes = self.evaluate_outcomes(cases)?;
        Ok(outcomes
            .into_iter()
            .map(|outcome| (outcome.name, outcome.verdict))
            .collect())
    }

    /// Evaluate `cases`, printing a line per case under category headings
    pub fn evaluate_outcomes(&self, cases: &[TestCase]) -> Result<Vec<CaseOutcome>, PoolError> {
        let mut current_category: Option<Option<String>> = None;
        let verdicts = run_ordered(
            self.jobs,
            cases,
            |case| self.evaluate_case(case),
            |case, verdict| {
                let category = case.category().map(str::to_string);
                if current_category.as_ref() != Some(&category) {
                    let title = category.as_deref().map(category_title).unwrap_or("Features");
                    println!("\n=== Testing {title} ===");
                    current_category = Some(category);
                }
                if verdict.passed {
                    println!("[PASS] {}", case.name());
                } else {
                    println!("[FAIL] {}: {}", case.name(), verdict.detail);
                }
            },
        )?;

        Ok(cases
            .iter()
            .zip(verdicts)
            .map(|(case, verdict)| CaseOutcome {
                name: case.name().to_string(),
                category: case.category().map(str::to_string),
                verdict,
            })
            .collect())
    }

    /// Judge one case; infrastructure errors become failing verdicts
    pub fn evaluate_case(&self, case: &TestCase) -> Verdict {
        match self.try_evaluate(case) {
            Ok(verdict) => verdict,
            Err(e) => Verdict::fail(e.to_string()),
        }
    }

    fn try_evaluate(&self, case: &TestCase) -> Result<Verdict, HarnessError> {
        let code = case.source().load().map_err(|source| HarnessError::LoadSource {
            path: match case.source() {
                neurgate_core::Source::File(path) => path.clone(),
                neurgate_core::Source::Inline(_) => PathBuf::new(),
            },
            source,
        })?;

        // Dropping `scratch` removes the source and everything built beside it
        let scratch = self.scratch_dir()?;
        let file = scratch
            .path()
            .join(format!("{}.{}", slug(case.name()), self.driver.source_extension()));
        std::fs::write(&file, code).map_err(|source| HarnessError::Materialize {
            path: file.clone(),
            source,
        })?;
        debug!(case = case.name(), file = %file.display(), "materialized case");

        let build = self.driver.build(&file, self.build_timeout)?;
        if build.timed_out {
            return Ok(Verdict::fail(format!(
                "Build timed out after {}",
                format_secs(self.build_timeout)
            )));
        }
        if build.exit_code != 0 {
            return Ok(Verdict::fail(format!(
                "Build failed: {}",
                build.stderr.trim()
            )));
        }

        let Some(expected) = case.expected_exit_code() else {
            return Ok(Verdict::pass());
        };

        let exe = executable_for(&file);
        if !exe.is_file() {
            return Ok(Verdict::fail(format!(
                "Expected executable not produced: {}",
                exe.display()
            )));
        }

        let run = self
            .runner
            .run(&[exe.as_os_str()], Some(scratch.path()), self.run_timeout)?;
        if run.timed_out {
            return Ok(Verdict::fail(format!(
                "Executable timed out after {}",
                format_secs(self.run_timeout)
            )));
        }
        if run.exit_code != expected {
            return Ok(Verdict::fail(format!(
                "Expected exit code {expected}, got {}",
                run.exit_code
            )));
        }
        Ok(Verdict::pass())
    }

    fn scratch_dir(&self) -> Result<TempDir, HarnessError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("neurgate-case-");
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(HarnessError::Scratch)
    }
}

/// Print per-category and total results; returns the combined report
pub fn print_summary(outcomes: &[CaseOutcome], min_success_rate: f64) -> SuiteReport {
    let mut categories: Vec<(Option<&str>, SuiteReport)> = Vec::new();
    for outcome in outcomes {
        let category = outcome.category.as_deref();
        let index = match categories.iter().position(|(c, _)| *c == category) {
            Some(index) => index,
            None => {
                categories.push((category, SuiteReport::new()));
                categories.len() - 1
            }
        };
        categories[index]
            .1
            .record(outcome.name.as_str(), outcome.verdict.clone());
    }

    println!("\n=== FEATURE TEST RESULTS ===");
    let mut total = SuiteReport::new();
    for (category, report) in &categories {
        let label = category.map(category_summary_label).unwrap_or("Uncategorized");
        println!(
            "{label}: {}/{}",
            report.passed_count(),
            report.total_count()
        );
        total.merge(report);
    }
    println!("Total: {}/{}", total.passed_count(), total.total_count());

    match total.success_rate() {
        Some(rate) => {
            println!("Success rate: {rate:.1}%");
            if rate >= 90.0 {
                println!("[EXCELLENT] Language features working well!");
            } else if rate >= 75.0 {
                println!("[GOOD] Most language features working");
            } else {
                println!("[NEEDS WORK] Some language features need attention");
            }
            if total.meets(min_success_rate) {
                println!("PASSED: success rate meets the {min_success_rate}% requirement");
            } else {
                println!("FAILED: success rate below the {min_success_rate}% requirement");
            }
        }
        None => println!("FAILED: no feature cases were evaluated"),
    }

    total
}

/// File-name-safe form of a case name
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "case".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_secs(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}
