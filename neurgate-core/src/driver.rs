//! Compiler Driver
//!
//! The compiler is reached only through its command line. `CompilerDriver`
//! captures the two subcommands the suites rely on so that any implementation
//! (the real `neurc`, or a mock in tests) can be plugged in.
//!
//! ```text
//! neurc build <path>                              exit 0 on success, diagnostics on stderr
//! neurc compile <path> -O <level> -o <output>     same, plus an executable at <output>
//! ```

use crate::model::ExecutionResult;
use crate::process::{ProcessError, ProcessRunner};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File extension of compiler source files
pub const DEFAULT_SOURCE_EXTENSION: &str = "nr";

/// Options for an optimized `compile` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Optimization level passed as `-O <level>`
    pub opt_level: u8,
    /// Executable path passed as `-o <output>`
    pub output: PathBuf,
}

/// Capability to translate source files with an external compiler
pub trait CompilerDriver: Send + Sync {
    /// Extension (without dot) the compiler expects on source files
    fn source_extension(&self) -> &str {
        DEFAULT_SOURCE_EXTENSION
    }

    /// Translate `source`; the executable is written beside it
    fn build(&self, source: &Path, timeout: Duration) -> Result<ExecutionResult, ProcessError>;

    /// Translate `source` into the executable named by `options`
    fn compile(
        &self,
        source: &Path,
        options: &CompileOptions,
        timeout: Duration,
    ) -> Result<ExecutionResult, ProcessError>;
}

/// `CompilerDriver` backed by the `neurc` executable
#[derive(Debug, Clone)]
pub struct NeurcDriver {
    program: PathBuf,
    working_dir: Option<PathBuf>,
    extension: String,
    runner: ProcessRunner,
}

impl NeurcDriver {
    /// Drive the compiler at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            runner: ProcessRunner::new(),
        }
    }

    /// Run the compiler from `dir`
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Override the source file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Use a preconfigured process runner
    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Path of the compiler executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn invoke(
        &self,
        args: Vec<OsString>,
        timeout: Duration,
    ) -> Result<ExecutionResult, ProcessError> {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.program.clone().into_os_string());
        command.extend(args);
        self.runner.run(&command, self.working_dir.as_deref(), timeout)
    }
}

impl CompilerDriver for NeurcDriver {
    fn source_extension(&self) -> &str {
        &self.extension
    }

    fn build(&self, source: &Path, timeout: Duration) -> Result<ExecutionResult, ProcessError> {
        self.invoke(
            vec![OsString::from("build"), source.as_os_str().to_owned()],
            timeout,
        )
    }

    fn compile(
        &self,
        source: &Path,
        options: &CompileOptions,
        timeout: Duration,
    ) -> Result<ExecutionResult, ProcessError> {
        self.invoke(
            vec![
                OsString::from("compile"),
                source.as_os_str().to_owned(),
                OsString::from("-O"),
                OsString::from(options.opt_level.to_string()),
                OsString::from("-o"),
                options.output.as_os_str().to_owned(),
            ],
            timeout,
        )
    }
}
