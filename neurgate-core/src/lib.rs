#![warn(missing_docs)]
//! neurgate Core - Data Model and Process Plumbing
//!
//! This crate holds everything the suites share:
//! - `TestCase`, `ExecutionResult`, `Verdict` and `SuiteReport`
//! - `ProcessRunner`, which runs an external executable under a wall-clock timeout
//! - the `CompilerDriver` capability and its process-backed `NeurcDriver`
//! - platform helpers for executable naming

mod driver;
mod model;
mod platform;
mod process;

pub use driver::{CompileOptions, CompilerDriver, DEFAULT_SOURCE_EXTENSION, NeurcDriver};
pub use model::{ExecutionResult, Failure, Source, SuiteReport, TestCase, Verdict};
pub use platform::{EXE_SUFFIX, executable_for};
pub use process::{ProcessError, ProcessRunner, display_command};

/// Default timeout for a `build` invocation (seconds)
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 30;

/// Default timeout for running a produced executable (seconds)
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 10;

/// Default timeout for a whole suite run by the orchestrator (seconds)
pub const DEFAULT_SUITE_TIMEOUT_SECS: u64 = 300;
