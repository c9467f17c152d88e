//! Feature case files
//!
//! A case file replaces the built-in catalog:
//!
//! ```toml
//! [[case]]
//! name = "Simple main function"
//! source = "fn main() -> int { return 42; }"
//! expected_exit_code = 42
//! category = "basic"
//!
//! [[case]]
//! name = "Big program"
//! path = "cases/big.nr"   # relative to this file
//! ```

use neurgate_core::{Source, TestCase};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a case file
#[derive(Debug, Error)]
pub enum CaseFileError {
    /// The file could not be read
    #[error("Failed to read case file {}: {source}", .path.display())]
    Read {
        /// Case file
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid case list
    #[error("Failed to parse case file {}: {source}", .path.display())]
    Parse {
        /// Case file
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Two cases share a name
    #[error("Duplicate case name {0:?}")]
    DuplicateName(String),

    /// A case gave both or neither of `source` and `path`
    #[error("Case {0:?} must set exactly one of `source` or `path`")]
    SourceConflict(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseFile {
    #[serde(default)]
    case: Vec<CaseEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseEntry {
    name: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    expected_exit_code: Option<i32>,
    #[serde(default)]
    category: Option<String>,
}

/// Read test cases from `path`, in file order
pub fn load_cases(path: &Path) -> Result<Vec<TestCase>, CaseFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| CaseFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_cases(&text, base).map_err(|e| match e {
        CaseFileError::Parse { source, .. } => CaseFileError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parse case file text; `path` entries are resolved against `base`
pub fn parse_cases(text: &str, base: &Path) -> Result<Vec<TestCase>, CaseFileError> {
    let file: CaseFile = toml::from_str(text).map_err(|source| CaseFileError::Parse {
        path: PathBuf::new(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut cases = Vec::with_capacity(file.case.len());
    for entry in file.case {
        if !seen.insert(entry.name.clone()) {
            return Err(CaseFileError::DuplicateName(entry.name));
        }
        let source = match (entry.source, entry.path) {
            (Some(code), None) => Source::Inline(code),
            (None, Some(path)) => Source::File(base.join(path)),
            _ => return Err(CaseFileError::SourceConflict(entry.name)),
        };

        let mut case = TestCase::new(entry.name, source);
        if let Some(code) = entry.expected_exit_code {
            case = case.expecting(code);
        }
        if let Some(category) = entry.category {
            case = case.in_category(category);
        }
        cases.push(case);
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_inline_and_file_cases() {
        let cases = parse_cases(
            r#"
            [[case]]
            name = "answer"
            source = "fn main() -> int { return 42; }"
            expected_exit_code = 42
            category = "basic"

            [[case]]
            name = "from disk"
            path = "cases/big.nr"
            "#,
            Path::new("/repo/tests"),
        )
        .unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].expected_exit_code(), Some(42));
        assert_eq!(cases[0].category(), Some("basic"));
        assert_eq!(
            cases[1].source(),
            &Source::File(PathBuf::from("/repo/tests/cases/big.nr"))
        );
        assert_eq!(cases[1].expected_exit_code(), None);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = parse_cases(
            r#"
            [[case]]
            name = "same"
            source = "a"
            [[case]]
            name = "same"
            source = "b"
            "#,
            Path::new("."),
        )
        .unwrap_err();
        assert!(matches!(err, CaseFileError::DuplicateName(name) if name == "same"));
    }

    #[test]
    fn test_source_and_path_conflict() {
        for body in [
            "name = \"both\"\nsource = \"x\"\npath = \"y.nr\"",
            "name = \"neither\"",
        ] {
            let text = format!("[[case]]\n{body}\n");
            assert!(matches!(
                parse_cases(&text, Path::new(".")),
                Err(CaseFileError::SourceConflict(_))
            ));
        }
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.toml");
        std::fs::write(&path, "[[case]]\nnme = \"typo\"\n").unwrap();

        let err = load_cases(&path).unwrap_err();
        assert!(err.to_string().contains("cases.toml"));
    }
}
