//! Gate errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a regression gate run
///
/// Everything here is fatal for the whole gate: a missing or malformed
/// measurement is never downgraded to a skipped check.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    /// A file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid JSON
    #[error("Failed to parse {}: {source}", .path.display())]
    Json {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The baseline document has no `"benchmarks"` object
    #[error("Baseline {} has no \"benchmarks\" object", .path.display())]
    MissingBenchmarks {
        /// Baseline document
        path: PathBuf,
    },

    /// The baseline has zero entries
    #[error("no benchmark baseline entries found")]
    EmptyBaseline,

    /// A baseline key is not of the form `group/name`
    #[error("Invalid benchmark key {0:?}: expected \"group/name\"")]
    InvalidKey(String),

    /// A baseline budget is not a positive finite number
    #[error("Invalid budget for {key}: {value} (expected a positive number of nanoseconds)")]
    InvalidBudget {
        /// Offending key
        key: String,
        /// Raw value as written in the baseline
        value: String,
    },

    /// The threshold ratio is negative or not finite
    #[error("Invalid threshold ratio {0}: expected a finite value >= 0")]
    InvalidThreshold(f64),

    /// The measured-results document for a key does not exist
    #[error("Missing benchmark output: {}", .path.display())]
    MissingResults {
        /// Key whose results are missing
        key: String,
        /// Expected location
        path: PathBuf,
    },

    /// The measured-results document lacks `mean.point_estimate`
    #[error("Invalid criterion estimates format in {}: {reason}", .path.display())]
    MalformedEstimates {
        /// Estimates document
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },
}
