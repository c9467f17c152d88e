#![warn(missing_docs)]
//! # neurgate
//!
//! Verification and release gating for the neurc compiler.
//!
//! - **Corpus validation**: every source file in the corpus directories must build
//! - **Language features**: small programs are compiled, run, and judged by exit code
//! - **Benchmark regression gate**: criterion means are compared with nanosecond budgets
//! - **Release smoke tests**: optimized builds of the examples must exit as expected
//! - **Orchestration**: `neurgate all` runs each suite as a separate process
//!
//! ## Quick Start
//!
//! ```text
//! neurgate init --write
//! neurgate all --neurc target/release/neurc
//! ```
//!
//! ## As a library
//!
//! ```no_run
//! use neurgate::{FeatureHarness, NeurcDriver, TestCase};
//!
//! let driver = NeurcDriver::new("target/release/neurc");
//! let cases = [TestCase::inline("answer", "fn main() -> int { return 42; }").expecting(42)];
//! let report = FeatureHarness::new(&driver).evaluate(&cases)?;
//! assert!(report.meets(100.0));
//! # Ok::<(), neurgate::PoolError>(())
//! ```

// Re-export core types
pub use neurgate_core::{
    CompileOptions, CompilerDriver, ExecutionResult, Failure, NeurcDriver, ProcessError,
    ProcessRunner, Source, SuiteReport, TestCase, Verdict, executable_for,
};

// Re-export the gate
pub use neurgate_gate::{
    Baseline, BenchmarkKey, GateError, GateOutcome, RegressionCheck, RegressionGate, check,
};

// Re-export reports
pub use neurgate_report::{OutputFormat, Report};

// Re-export suites
pub use neurgate_cli::corpus::CorpusValidator;
pub use neurgate_cli::features::{FeatureHarness, builtin_cases, load_cases};
pub use neurgate_cli::orchestrator::{Orchestrator, SuiteSpec};
pub use neurgate_cli::smoke::{SmokeExample, SmokeTester};
pub use neurgate_cli::{NeurgateConfig, PoolError};

/// Run the neurgate CLI with the process arguments.
pub use neurgate_cli::run;
