//! Report metadata
//!
//! Git details come from `git rev-parse` and are simply absent outside a
//! repository.

use chrono::Utc;
use neurgate_report::{ReportMeta, SystemInfo};
use std::path::Path;

/// Build report metadata for a run rooted at `workspace`
pub fn build_report_meta(workspace: &Path) -> ReportMeta {
    ReportMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git(workspace, &["rev-parse", "HEAD"]),
        git_branch: git(workspace, &["rev-parse", "--abbrev-ref", "HEAD"]),
        system: SystemInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus(),
        },
    }
}

fn git(workspace: &Path, args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .current_dir(workspace)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get number of available CPU cores
fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let meta = build_report_meta(dir.path());

        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(meta.system.os, std::env::consts::OS);
        assert!(meta.system.cpu_cores >= 1);
        assert_eq!(meta.git_commit, None);
    }
}
