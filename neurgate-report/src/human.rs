//! Plain Text Output

use crate::report::Report;
use std::fmt::Write;

/// Render `report` as a plain text summary
pub fn generate_human_report(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "neurgate {} {} at {}",
        report.meta.version,
        report.command,
        report.meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for suite in &report.suites {
        let rate = suite
            .success_rate
            .map(|r| format!("{r:.1}%"))
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "{}: {}/{} passed ({rate}, required {:.1}%)",
            suite.name, suite.passed_count, suite.total_count, suite.min_success_rate
        );
        for (i, failure) in suite.failures.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}: {}", i + 1, failure.name, failure.detail);
        }
    }

    if let Some(gate) = &report.gate {
        for record in &gate.checks {
            let _ = writeln!(out, "{}", record.check);
        }
    }

    for record in &report.smoke {
        let tag = if record.passed { "PASS" } else { "FAIL" };
        let _ = writeln!(out, "[{tag}] {}: {}", record.example, record.detail);
    }

    for run in &report.runs {
        let tag = if run.passed { "PASS" } else { "FAIL" };
        let _ = writeln!(out, "[{tag}] {} (exit {})", run.description, run.exit_code);
    }

    if let Some(error) = &report.error {
        let _ = writeln!(out, "error: {error}");
    }

    let _ = writeln!(out, "{}", if report.passed { "PASSED" } else { "FAILED" });
    out
}
