//! Measured estimates produced by criterion

use crate::baseline::BenchmarkKey;
use crate::error::GateError;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Estimates {
    mean: Option<Estimate>,
}

#[derive(Debug, Deserialize)]
struct Estimate {
    point_estimate: Option<Value>,
}

/// Location of the measured-results document for `key`:
/// `<results_root>/<group>/<name>/new/estimates.json`
pub fn estimates_path(results_root: &Path, key: &BenchmarkKey) -> PathBuf {
    results_root
        .join(&key.group)
        .join(&key.name)
        .join("new")
        .join("estimates.json")
}

/// Read `mean.point_estimate` (nanoseconds) from an estimates document
pub fn read_mean_ns(path: &Path) -> Result<f64, GateError> {
    let text = std::fs::read_to_string(path).map_err(|source| GateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let estimates: Estimates = serde_json::from_str(&text).map_err(|e| {
        GateError::MalformedEstimates {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let Some(raw) = estimates.mean.and_then(|mean| mean.point_estimate) else {
        return Err(GateError::MalformedEstimates {
            path: path.to_path_buf(),
            reason: "missing mean.point_estimate".to_string(),
        });
    };
    parse_point_estimate(&raw).ok_or_else(|| GateError::MalformedEstimates {
        path: path.to_path_buf(),
        reason: format!("mean.point_estimate is not a number: {raw}"),
    })
}

/// A JSON number or a numeric string
fn parse_point_estimate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|ns| ns.is_finite())
}

/// Read the measured mean for `key`, failing if its document does not exist
pub fn measured_mean_ns(results_root: &Path, key: &BenchmarkKey) -> Result<f64, GateError> {
    let path = estimates_path(results_root, key);
    if !path.is_file() {
        return Err(GateError::MissingResults {
            key: key.to_string(),
            path,
        });
    }
    read_mean_ns(&path)
}
