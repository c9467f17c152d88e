#![warn(missing_docs)]
//! neurgate Report - Run Documents
//!
//! Every command can emit a document describing its outcome:
//! - JSON (machine-readable)
//! - GitHub Summary (Markdown for $GITHUB_STEP_SUMMARY)
//! - plain text

mod github;
mod human;
mod json;
mod report;

pub use github::generate_github_summary;
pub use human::generate_human_report;
pub use json::generate_json_report;
pub use report::{
    CheckRecord, GateResult, Report, ReportMeta, SmokeRecord, SuiteResult, SuiteRunRecord,
    SystemInfo,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON document
    Json,
    /// Markdown for GitHub Actions
    GithubSummary,
    /// Human-readable text
    Human,
}

impl OutputFormat {
    /// Render `report` in this format
    pub fn render(self, report: &Report) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Json => generate_json_report(report),
            OutputFormat::GithubSummary => Ok(generate_github_summary(report)),
            OutputFormat::Human => Ok(generate_human_report(report)),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "github" | "github-summary" => Ok(OutputFormat::GithubSummary),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("github".parse::<OutputFormat>(), Ok(OutputFormat::GithubSummary));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
