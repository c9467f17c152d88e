//! Corpus Validator
//!
//! Builds every matching source file in a directory and counts how many the
//! compiler accepts. Files are visited in sorted order so two runs over the
//! same directory print and report identically.

use crate::pool::{PoolError, run_ordered};
use globset::{Glob, GlobMatcher};
use neurgate_core::{CompilerDriver, SuiteReport, Verdict};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that prevent a directory from being validated
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The file pattern is not a valid glob
    #[error("Invalid file pattern {pattern:?}: {source}")]
    Glob {
        /// Pattern as given
        pattern: String,
        /// Parse error
        #[source]
        source: globset::Error,
    },

    /// The directory could not be listed
    #[error("Failed to list {}: {source}", .path.display())]
    ReadDir {
        /// Directory being listed
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be built
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Validates directories of source files against the compiler
pub struct CorpusValidator<'a> {
    driver: &'a dyn CompilerDriver,
    timeout: Duration,
    jobs: usize,
}

impl<'a> CorpusValidator<'a> {
    /// Validator building each file with `timeout`
    pub fn new(driver: &'a dyn CompilerDriver, timeout: Duration) -> Self {
        Self {
            driver,
            timeout,
            jobs: 1,
        }
    }

    /// Build up to `jobs` files at once
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Default pattern for the driver's source extension
    pub fn default_pattern(&self) -> String {
        format!("*.{}", self.driver.source_extension())
    }

    /// Regular files directly in `dir` whose name matches `pattern`, sorted.
    ///
    /// A missing directory has no files.
    pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, CorpusError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let matcher = compile_pattern(pattern)?;
        let read_err = |source| CorpusError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_file() && path.file_name().is_some_and(|name| matcher.is_match(name)) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Validate `dir`, labelling console output with its path
    pub fn validate(&self, dir: &Path, pattern: &str) -> Result<SuiteReport, CorpusError> {
        self.validate_named(&dir.display().to_string(), dir, pattern)
    }

    /// Validate `dir`, labelling console output with `label`
    pub fn validate_named(
        &self,
        label: &str,
        dir: &Path,
        pattern: &str,
    ) -> Result<SuiteReport, CorpusError> {
        if !dir.is_dir() {
            println!("Directory {label} does not exist");
            return Ok(SuiteReport::new());
        }
        let files = Self::discover(dir, pattern)?;
        if files.is_empty() {
            println!("No files matching {pattern} found in {label}");
            return Ok(SuiteReport::new());
        }

        println!("\n=== Testing {label}/ directory ===");
        info!(directory = %dir.display(), files = files.len(), "validating corpus directory");

        let mut report = SuiteReport::new();
        run_ordered(
            self.jobs,
            &files,
            |file| self.build_one(file),
            |file, verdict| {
                let name = display_name(file);
                if verdict.passed {
                    println!("PASS {name}");
                } else {
                    println!("FAIL {name}: {}", verdict.detail);
                }
                report.record(name, verdict.clone());
            },
        )?;
        Ok(report)
    }

    fn build_one(&self, file: &Path) -> Verdict {
        match self.driver.build(file, self.timeout) {
            Ok(result) => {
                debug!(file = %file.display(), exit_code = result.exit_code, "built");
                Verdict::from_build(&result)
            }
            Err(e) => Verdict::fail(e.to_string()),
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher, CorpusError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| CorpusError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the final results block for per-directory `sections` and return the
/// combined report
pub fn print_summary(sections: &[(String, SuiteReport)], min_success_rate: f64) -> SuiteReport {
    let mut combined = SuiteReport::new();
    for (_, report) in sections {
        combined.merge(report);
    }

    println!("\n=== FINAL RESULTS ===");
    for (label, report) in sections {
        println!(
            "{label} files: {}/{} successful",
            report.passed_count(),
            report.total_count()
        );
    }
    println!(
        "Total: {}/{} successful",
        combined.passed_count(),
        combined.total_count()
    );

    match combined.success_rate() {
        Some(rate) => {
            println!("Success rate: {rate:.1}%");
            if combined.meets(min_success_rate) {
                println!("SUCCESS: Achieved {min_success_rate}%+ success rate!");
            } else {
                println!("FAILED: Did not achieve {min_success_rate}% success rate");
            }
        }
        None => println!("FAILED: no source files discovered"),
    }

    if !combined.failures().is_empty() {
        println!("\n=== FAILURES ({} files) ===", combined.failed_count());
        for (i, failure) in combined.failures().iter().enumerate() {
            println!("{}. FAIL {}: {}", i + 1, failure.name, failure.detail);
        }
    }

    combined
}
