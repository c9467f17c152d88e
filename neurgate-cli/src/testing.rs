//! In-process stand-in for the compiler used by unit tests

use neurgate_core::{
    CompileOptions, CompilerDriver, ExecutionResult, ProcessError, executable_for,
};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

enum Rule {
    Fail { pattern: String, stderr: String },
    TimeOut { pattern: String },
}

impl Rule {
    fn matches(&self, name: &str, source: &str) -> bool {
        let pattern = match self {
            Rule::Fail { pattern, .. } | Rule::TimeOut { pattern } => pattern,
        };
        name == pattern || source.contains(pattern.as_str())
    }
}

/// Accepts every file unless a rule matches its name or content.
///
/// With `emit_executables`, a successful build writes a shell script beside
/// the source that exits with the first `return <n>` in the source.
pub struct MockDriver {
    rules: Vec<Rule>,
    emit_executables: bool,
    calls: Mutex<Vec<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            emit_executables: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_build(mut self, pattern: &str, stderr: &str) -> Self {
        self.rules.push(Rule::Fail {
            pattern: pattern.to_string(),
            stderr: stderr.to_string(),
        });
        self
    }

    pub fn time_out_build(mut self, pattern: &str) -> Self {
        self.rules.push(Rule::TimeOut {
            pattern: pattern.to_string(),
        });
        self
    }

    pub fn emit_executables(mut self) -> Self {
        self.emit_executables = true;
        self
    }

    /// `"<subcommand> <file name>"` for every invocation, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn translate(&self, subcommand: &str, source: &Path, output: &Path) -> ExecutionResult {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(format!("{subcommand} {name}"));
        let code = std::fs::read_to_string(source).unwrap_or_default();

        for rule in &self.rules {
            if rule.matches(&name, &code) {
                return match rule {
                    Rule::Fail { stderr, .. } => ExecutionResult {
                        exit_code: 1,
                        stderr: stderr.clone(),
                        ..Default::default()
                    },
                    Rule::TimeOut { .. } => ExecutionResult {
                        exit_code: 137,
                        signal: Some(9),
                        timed_out: true,
                        ..Default::default()
                    },
                };
            }
        }

        if self.emit_executables {
            write_exit_script(output, returned_value(&code));
        }
        ExecutionResult::default()
    }
}

impl CompilerDriver for MockDriver {
    fn build(&self, source: &Path, _timeout: Duration) -> Result<ExecutionResult, ProcessError> {
        Ok(self.translate("build", source, &executable_for(source)))
    }

    fn compile(
        &self,
        source: &Path,
        options: &CompileOptions,
        _timeout: Duration,
    ) -> Result<ExecutionResult, ProcessError> {
        Ok(self.translate("compile", source, &options.output))
    }
}

fn returned_value(code: &str) -> i32 {
    code.split("return ")
        .nth(1)
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

#[cfg(unix)]
fn write_exit_script(path: &Path, code: i32) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, format!("#!/bin/sh\nexit {code}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn write_exit_script(_path: &Path, _code: i32) {}

/// Write an executable shell script (Unix only)
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Whether `dir` has no entries (or does not exist)
pub fn scratch_is_clean(dir: &Path) -> bool {
    std::fs::read_dir(dir).map_or(true, |mut entries| entries.next().is_none())
}
