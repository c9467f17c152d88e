//! GitHub Actions Summary
//!
//! Markdown for `$GITHUB_STEP_SUMMARY`.

use crate::report::Report;
use std::fmt::Write;

/// Render `report` as a Markdown job summary
pub fn generate_github_summary(report: &Report) -> String {
    let mut out = String::new();
    let status = if report.passed { "✅ passed" } else { "❌ failed" };

    let _ = writeln!(out, "## neurgate `{}`: {status}", report.command);
    let _ = writeln!(out);
    if let Some(commit) = &report.meta.git_commit {
        let branch = report.meta.git_branch.as_deref().unwrap_or("detached");
        let short = commit.get(..8).unwrap_or(commit);
        let _ = writeln!(out, "Commit `{short}` on `{branch}`");
        let _ = writeln!(out);
    }

    if !report.suites.is_empty() {
        let _ = writeln!(out, "| Suite | Passed | Total | Rate | Required | Status |");
        let _ = writeln!(out, "|-------|-------:|------:|-----:|---------:|:------:|");
        for suite in &report.suites {
            let rate = suite
                .success_rate
                .map(|r| format!("{r:.1}%"))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {:.1}% | {} |",
                suite.name,
                suite.passed_count,
                suite.total_count,
                rate,
                suite.min_success_rate,
                if suite.passed { "✅" } else { "❌" }
            );
        }
        let _ = writeln!(out);

        let failures: Vec<_> = report
            .suites
            .iter()
            .flat_map(|s| s.failures.iter().map(move |f| (&s.name, f)))
            .collect();
        if !failures.is_empty() {
            let _ = writeln!(out, "<details><summary>{} failure(s)</summary>", failures.len());
            let _ = writeln!(out);
            for (suite, failure) in failures {
                let detail = failure.detail.lines().next().unwrap_or_default();
                let _ = writeln!(out, "- **{suite}** `{}`: {detail}", failure.name);
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "</details>");
            let _ = writeln!(out);
        }
    }

    if let Some(gate) = &report.gate {
        let _ = writeln!(
            out,
            "### Benchmark regression gate (threshold {:.0}%)",
            gate.threshold_ratio * 100.0
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "| Benchmark | Measured | Baseline | Allowed | Ratio | Status |");
        let _ = writeln!(out, "|-----------|---------:|---------:|--------:|------:|:------:|");
        for record in &gate.checks {
            let c = &record.check;
            let _ = writeln!(
                out,
                "| `{}` | {:.0} ns | {:.0} ns | {:.0} ns | {:.2}x | {} |",
                c.key,
                c.measured_ns,
                c.budget_ns,
                c.allowed_ns,
                c.ratio,
                if record.passed { "✅" } else { "❌" }
            );
        }
        let _ = writeln!(out);
    }

    if !report.smoke.is_empty() {
        let _ = writeln!(out, "### Release smoke tests");
        let _ = writeln!(out);
        for record in &report.smoke {
            let mark = if record.passed { "✅" } else { "❌" };
            let _ = writeln!(out, "- {mark} `{}`: {}", record.example, record.detail);
        }
        let _ = writeln!(out);
    }

    if !report.runs.is_empty() {
        let _ = writeln!(out, "| Suite | Exit | Time | Status |");
        let _ = writeln!(out, "|-------|-----:|-----:|:------:|");
        for run in &report.runs {
            let status = match (run.passed, run.timed_out) {
                (true, _) => "✅",
                (false, true) => "⏱️",
                (false, false) => "❌",
            };
            let _ = writeln!(
                out,
                "| {} | {} | {:.1}s | {status} |",
                run.description,
                run.exit_code,
                run.elapsed_ms as f64 / 1000.0
            );
        }
        let _ = writeln!(out);
    }

    if let Some(error) = &report.error {
        let _ = writeln!(out, "> **Error:** {error}");
    }

    out
}
