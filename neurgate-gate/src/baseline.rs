//! Baseline Budgets
//!
//! A baseline is a JSON document mapping `"group/name"` keys to nanosecond
//! budgets:
//!
//! ```json
//! {"benchmarks": {"parse/large_file": 1000000, "codegen/fib": 250000}}
//! ```
//!
//! Entries keep the document's insertion order so gate output follows the
//! order the baseline was written in.

use crate::error::GateError;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Identifies one benchmark in the measured-results tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BenchmarkKey {
    /// First path component
    pub group: String,
    /// Remainder after the first `/` (may contain further `/`)
    pub name: String,
}

impl FromStr for BenchmarkKey {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((group, name)) if !group.is_empty() && !name.is_empty() => Ok(Self {
                group: group.to_string(),
                name: name.to_string(),
            }),
            _ => Err(GateError::InvalidKey(s.to_string())),
        }
    }
}

impl fmt::Display for BenchmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

/// One budgeted benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineEntry {
    /// Benchmark key
    pub key: BenchmarkKey,
    /// Expected mean time in nanoseconds
    pub budget_ns: f64,
}

/// Validated baseline document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    entries: Vec<BaselineEntry>,
}

impl Baseline {
    /// Read and validate a baseline file
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let text = std::fs::read_to_string(path).map_err(|source| GateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Parse baseline text; `origin` is used in error messages.
    ///
    /// Every entry is validated here so that a bad key or budget is reported
    /// before any measurement is read.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self, GateError> {
        let document: Value = serde_json::from_str(text).map_err(|source| GateError::Json {
            path: origin.to_path_buf(),
            source,
        })?;

        let benchmarks = document
            .get("benchmarks")
            .and_then(Value::as_object)
            .ok_or_else(|| GateError::MissingBenchmarks {
                path: origin.to_path_buf(),
            })?;

        let entries = benchmarks
            .iter()
            .map(|(raw_key, raw_budget)| {
                let key: BenchmarkKey = raw_key.parse()?;
                let budget_ns = parse_budget(raw_key, raw_budget)?;
                Ok(BaselineEntry { key, budget_ns })
            })
            .collect::<Result<Vec<_>, GateError>>()?;

        Ok(Self { entries })
    }

    /// Entries in document order
    pub fn entries(&self) -> &[BaselineEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the baseline has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<BaselineEntry> for Baseline {
    fn from_iter<I: IntoIterator<Item = BaselineEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Budgets are numbers, or strings holding a number
fn parse_budget(key: &str, value: &Value) -> Result<f64, GateError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(ns) if ns.is_finite() && ns > 0.0 => Ok(ns),
        _ => Err(GateError::InvalidBudget {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Baseline, GateError> {
        Baseline::from_json(text, Path::new("baseline.json"))
    }

    #[test]
    fn test_key_splits_at_first_slash() {
        let key: BenchmarkKey = "parse/nested/case".parse().unwrap();
        assert_eq!(key.group, "parse");
        assert_eq!(key.name, "nested/case");
        assert_eq!(key.to_string(), "parse/nested/case");
    }

    #[test]
    fn test_key_rejects_missing_parts() {
        for raw in ["noslash", "/name", "group/", ""] {
            assert!(
                matches!(raw.parse::<BenchmarkKey>(), Err(GateError::InvalidKey(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_entries_keep_document_order() {
        let baseline =
            parse(r#"{"benchmarks": {"z/last": 3, "a/first": 1, "m/middle": "2.5"}}"#).unwrap();
        let keys: Vec<_> = baseline.entries().iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["z/last", "a/first", "m/middle"]);
        assert_eq!(baseline.entries()[2].budget_ns, 2.5);
    }

    #[test]
    fn test_missing_benchmarks_object() {
        let err = parse(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, GateError::MissingBenchmarks { .. }));
    }

    #[test]
    fn test_empty_benchmarks_parses_to_empty_baseline() {
        let baseline = parse(r#"{"benchmarks": {}}"#).unwrap();
        assert!(baseline.is_empty());
    }

    #[test]
    fn test_invalid_budgets() {
        for budget in ["0", "-5", "\"fast\"", "null", "[1]"] {
            let text = format!(r#"{{"benchmarks": {{"g/b": {budget}}}}}"#);
            assert!(
                matches!(parse(&text), Err(GateError::InvalidBudget { .. })),
                "budget {budget} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse("{not json"), Err(GateError::Json { .. })));
    }
}
