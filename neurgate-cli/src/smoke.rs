//! Release Smoke Tester
//!
//! Compiles a short list of example programs with optimizations and checks the
//! exit code of each binary. The first failure ends the run.

use neurgate_core::{
    CompileOptions, CompilerDriver, EXE_SUFFIX, ExecutionResult, ProcessError, ProcessRunner,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use tracing::info;

/// An example under `<workspace>/examples/` and the exit code it must produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeExample {
    /// File name relative to `examples/`
    pub file: String,
    /// Exit code the optimized binary must return
    pub expected_exit_code: i32,
}

impl SmokeExample {
    /// Expect `file` to exit with `expected_exit_code`
    pub fn new(file: impl Into<String>, expected_exit_code: i32) -> Self {
        Self {
            file: file.into(),
            expected_exit_code,
        }
    }
}

/// A passing example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokePass {
    /// Example file name
    pub example: String,
    /// Exit code the binary returned
    pub exit_code: i32,
}

/// Why a smoke run stopped
#[derive(Debug, Error)]
pub enum SmokeError {
    /// The scratch directory could not be created
    #[error("Failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),

    /// The compiler rejected the example or timed out
    #[error("Compile failed for {example} (exit={exit_code})")]
    CompileFailed {
        /// Example file name
        example: String,
        /// Compiler exit code
        exit_code: i32,
        /// The compile hit its timeout
        timed_out: bool,
        /// Compiler standard output
        stdout: String,
        /// Compiler standard error
        stderr: String,
    },

    /// The binary exited with the wrong code
    #[error("Smoke test failed for {example}: expected exit {expected}, got {actual}")]
    ExitMismatch {
        /// Example file name
        example: String,
        /// Required exit code
        expected: i32,
        /// Observed exit code
        actual: i32,
        /// Binary standard output
        stdout: String,
        /// Binary standard error
        stderr: String,
    },

    /// The binary hit the run timeout
    #[error("Smoke test failed for {example}: timed out after {}s", .timeout.as_secs_f64())]
    RunTimedOut {
        /// Example file name
        example: String,
        /// Run timeout that expired
        timeout: Duration,
    },

    /// The compiler or the binary could not be started
    #[error("Smoke test failed for {example}: {source}")]
    Process {
        /// Example file name
        example: String,
        /// Process failure
        #[source]
        source: ProcessError,
    },
}

impl SmokeError {
    /// Example the failure belongs to, if any
    pub fn example(&self) -> Option<&str> {
        match self {
            SmokeError::TempDir(_) => None,
            SmokeError::CompileFailed { example, .. }
            | SmokeError::ExitMismatch { example, .. }
            | SmokeError::RunTimedOut { example, .. }
            | SmokeError::Process { example, .. } => Some(example.as_str()),
        }
    }

    /// Captured output of the failing step
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            SmokeError::CompileFailed { stdout, stderr, .. }
            | SmokeError::ExitMismatch { stdout, stderr, .. } => {
                Some((stdout.as_str(), stderr.as_str()))
            }
            _ => None,
        }
    }
}

/// Compiles and runs the release examples
pub struct SmokeTester<'a> {
    driver: &'a dyn CompilerDriver,
    runner: ProcessRunner,
    workspace: PathBuf,
    opt_level: u8,
    compile_timeout: Duration,
    run_timeout: Duration,
}

impl<'a> SmokeTester<'a> {
    /// Tester for the examples under `<workspace>/examples/`
    pub fn new(driver: &'a dyn CompilerDriver, workspace: impl Into<PathBuf>) -> Self {
        Self {
            driver,
            runner: ProcessRunner::new(),
            workspace: workspace.into(),
            opt_level: 2,
            compile_timeout: Duration::from_secs(60),
            run_timeout: Duration::from_secs(neurgate_core::DEFAULT_RUN_TIMEOUT_SECS),
        }
    }

    /// Optimization level passed as `-O <n>`
    pub fn with_opt_level(mut self, opt_level: u8) -> Self {
        self.opt_level = opt_level;
        self
    }

    /// Set the compile and run timeouts for each example
    pub fn with_timeouts(mut self, compile: Duration, run: Duration) -> Self {
        self.compile_timeout = compile;
        self.run_timeout = run;
        self
    }

    /// Source path of `example`
    pub fn source_for(&self, example: &SmokeExample) -> PathBuf {
        self.workspace.join("examples").join(&example.file)
    }

    /// Compile and run each example in order, stopping at the first failure
    pub fn run(&self, examples: &[SmokeExample]) -> Result<Vec<SmokePass>, SmokeError> {
        let temp = TempDir::new().map_err(SmokeError::TempDir)?;
        let mut passes = Vec::with_capacity(examples.len());
        for example in examples {
            let pass = self.run_one(example, temp.path())?;
            println!(
                "Smoke test passed: {} -> exit {}",
                pass.example, pass.exit_code
            );
            passes.push(pass);
        }
        info!(examples = passes.len(), "release smoke tests passed");
        Ok(passes)
    }

    fn run_one(&self, example: &SmokeExample, temp: &Path) -> Result<SmokePass, SmokeError> {
        let source = self.source_for(example);
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| example.file.clone());
        let options = CompileOptions {
            opt_level: self.opt_level,
            output: temp.join(format!("{stem}_smoke{EXE_SUFFIX}")),
        };
        let process_err = |source| SmokeError::Process {
            example: example.file.clone(),
            source,
        };

        let compiled = self
            .driver
            .compile(&source, &options, self.compile_timeout)
            .map_err(process_err)?;
        if !compiled.success() {
            return Err(SmokeError::CompileFailed {
                example: example.file.clone(),
                exit_code: compiled.exit_code,
                timed_out: compiled.timed_out,
                stdout: compiled.stdout,
                stderr: compiled.stderr,
            });
        }

        let ran: ExecutionResult = self
            .runner
            .run(
                &[options.output.as_os_str()],
                Some(&self.workspace),
                self.run_timeout,
            )
            .map_err(process_err)?;
        if ran.timed_out {
            return Err(SmokeError::RunTimedOut {
                example: example.file.clone(),
                timeout: self.run_timeout,
            });
        }
        if ran.exit_code != example.expected_exit_code {
            return Err(SmokeError::ExitMismatch {
                example: example.file.clone(),
                expected: example.expected_exit_code,
                actual: ran.exit_code,
                stdout: ran.stdout,
                stderr: ran.stderr,
            });
        }

        Ok(SmokePass {
            example: example.file.clone(),
            exit_code: ran.exit_code,
        })
    }
}
