#![warn(missing_docs)]
//! neurgate Gate - Benchmark Regression Gate
//!
//! Loads a baseline of nanosecond budgets, reads criterion's measured means
//! from `<results_root>/<group>/<name>/new/estimates.json`, and fails when a
//! benchmark is slower than its budget by more than the allowed ratio.
//!
//! ```no_run
//! use neurgate_gate::check;
//! use std::path::Path;
//!
//! let outcome = check(
//!     Path::new("benchmarks/baseline.json"),
//!     Path::new("target/criterion"),
//!     0.35,
//! )?;
//! for line in outcome.regressions().map(|c| c.failure_line()) {
//!     eprintln!("{line}");
//! }
//! # Ok::<(), neurgate_gate::GateError>(())
//! ```

mod baseline;
mod error;
mod estimates;
mod gate;

pub use baseline::{Baseline, BaselineEntry, BenchmarkKey};
pub use error::GateError;
pub use estimates::{estimates_path, measured_mean_ns, read_mean_ns};
pub use gate::{DEFAULT_THRESHOLD_RATIO, GateOutcome, RegressionCheck, RegressionGate, check};

/// Default criterion output root, relative to the workspace
pub const DEFAULT_RESULTS_ROOT: &str = "target/criterion";
