#![warn(missing_docs)]
//! neurgate CLI Library
//!
//! Command line front end for the neurc verification harness. Each suite is a
//! subcommand; `neurgate all` re-invokes this binary once per configured suite
//! and judges the run by their exit codes.
//!
//! ```text
//! neurgate corpus --neurc target/release/neurc
//! neurgate features --jobs 4 --format json -o features.json
//! neurgate bench-gate --baseline benchmarks/baseline.json
//! neurgate smoke --opt-level 3
//! neurgate all
//! ```

mod config;
pub mod corpus;
pub mod features;
mod metadata;
pub mod orchestrator;
mod pool;
pub mod smoke;
#[cfg(test)]
mod testing;

pub use config::*;
pub use metadata::build_report_meta;
pub use pool::{PoolError, run_ordered};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use corpus::CorpusValidator;
use features::FeatureHarness;
use neurgate_core::{NeurcDriver, TestCase};
use neurgate_gate::RegressionGate;
use neurgate_report::{
    CheckRecord, GateResult, OutputFormat, Report, SmokeRecord, SuiteResult, SuiteRunRecord,
};
use orchestrator::{Orchestrator, SuiteSpec};
use regex::Regex;
use smoke::{SmokeError, SmokeExample, SmokeTester};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// neurgate CLI arguments
#[derive(Parser, Debug)]
#[command(name = "neurgate")]
#[command(author, version, about = "neurgate - verification harness for the neurc compiler")]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: neurgate.toml found by walking up from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: human, json, github
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// Write the formatted report to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Where the compiler and the workspace live
#[derive(Args, Debug, Clone, Default)]
pub struct CompilerArgs {
    /// Compiler executable (default: compiler.path from the config, under the workspace)
    #[arg(long)]
    pub neurc: Option<PathBuf>,

    /// Workspace root (default: current directory)
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every source file in the corpus directories
    Corpus {
        #[command(flatten)]
        compiler: CompilerArgs,

        /// Directory to validate, relative to the workspace (repeatable)
        #[arg(long = "dir")]
        dirs: Vec<String>,

        /// File name pattern (default: *.<extension>)
        #[arg(long)]
        glob: Option<String>,

        /// Minimum success rate in percent
        #[arg(long)]
        min_success_rate: Option<f64>,

        /// Number of parallel builds
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },
    /// Compile and run the language feature cases
    Features {
        #[command(flatten)]
        compiler: CompilerArgs,

        /// TOML case file replacing the built-in catalog
        #[arg(long)]
        cases: Option<PathBuf>,

        /// Only run cases whose name matches this regex
        #[arg(long)]
        filter: Option<String>,

        /// Minimum success rate in percent
        #[arg(long)]
        min_success_rate: Option<f64>,

        /// Number of parallel cases
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Root for per-case scratch directories
        #[arg(long)]
        scratch_dir: Option<PathBuf>,
    },
    /// Compare criterion results against a baseline of budgets
    BenchGate {
        /// Baseline JSON file
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Criterion output root
        #[arg(long)]
        results_root: Option<PathBuf>,

        /// Allowed slowdown over baseline (0.35 = 35%)
        #[arg(long)]
        threshold_ratio: Option<f64>,
    },
    /// Compile the release examples with optimizations and check their exit codes
    Smoke {
        #[command(flatten)]
        compiler: CompilerArgs,

        /// Optimization level passed to `neurc compile -O`
        #[arg(long)]
        opt_level: Option<u8>,
    },
    /// Run every configured suite as a separate process
    All {
        #[command(flatten)]
        compiler: CompilerArgs,

        /// Suite to run instead of the configured list (repeatable)
        #[arg(long = "suite")]
        suites: Vec<String>,
    },
    /// Print a default neurgate.toml
    Init {
        /// Write neurgate.toml in the current directory instead of printing it
        #[arg(long)]
        write: bool,

        /// Overwrite an existing file
        #[arg(long, requires = "write")]
        force: bool,
    },
}

impl Commands {
    /// Command name as written on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Corpus { .. } => "corpus",
            Commands::Features { .. } => "features",
            Commands::BenchGate { .. } => "bench-gate",
            Commands::Smoke { .. } => "smoke",
            Commands::All { .. } => "all",
            Commands::Init { .. } => "init",
        }
    }
}

/// Run the neurgate CLI with the process arguments.
///
/// Returns whether the command passed; infrastructure and configuration
/// problems are errors.
pub fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the neurgate CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<bool> {
    init_logging(cli.verbose, cli.quiet);

    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    debug!(command = cli.command.name(), "starting");

    let report = match &cli.command {
        Commands::Init { write, force } => {
            init_config(*write, *force)?;
            return Ok(true);
        }
        Commands::Corpus {
            compiler,
            dirs,
            glob,
            min_success_rate,
            jobs,
        } => {
            let session = Session::resolve(&cli, compiler)?;
            session.corpus(dirs, glob.as_deref(), *min_success_rate, *jobs)?
        }
        Commands::Features {
            compiler,
            cases,
            filter,
            min_success_rate,
            jobs,
            scratch_dir,
        } => {
            let session = Session::resolve(&cli, compiler)?;
            session.features(
                cases.as_deref(),
                filter.as_deref(),
                *min_success_rate,
                *jobs,
                scratch_dir.as_deref(),
            )?
        }
        Commands::BenchGate {
            baseline,
            results_root,
            threshold_ratio,
        } => {
            let session = Session::resolve(&cli, &CompilerArgs::default())?;
            session.bench_gate(baseline.as_deref(), results_root.as_deref(), *threshold_ratio)?
        }
        Commands::Smoke {
            compiler,
            opt_level,
        } => {
            let session = Session::resolve(&cli, compiler)?;
            session.smoke(*opt_level)?
        }
        Commands::All { compiler, suites } => {
            let session = Session::resolve(&cli, compiler)?;
            session.all(&cli, compiler, suites)?
        }
    };

    emit_report(&report, format, cli.output.as_deref())?;
    Ok(report.passed)
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default filter
fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "neurgate=debug"
    } else if quiet {
        "neurgate=warn"
    } else {
        "neurgate=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded (e.g. in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_config(write: bool, force: bool) -> anyhow::Result<()> {
    let contents = NeurgateConfig::default_toml();
    if !write {
        print!("{contents}");
        return Ok(());
    }

    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn emit_report(report: &Report, format: OutputFormat, output: Option<&Path>) -> anyhow::Result<()> {
    let rendered = format.render(report).context("failed to render report")?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None if format != OutputFormat::Human => print!("{rendered}"),
        None => {}
    }
    Ok(())
}

/// Resolved configuration plus the workspace every relative path hangs off
struct Session {
    config: NeurgateConfig,
    workspace: PathBuf,
    neurc: Option<PathBuf>,
}

impl Session {
    /// Load the configuration named by `cli` (or discovered) and settle the workspace
    fn resolve(cli: &Cli, args: &CompilerArgs) -> anyhow::Result<Self> {
        let config = NeurgateConfig::resolve(cli.config.as_deref())?;
        debug!(?config, "resolved configuration");
        Self::new(config, args)
    }

    fn new(config: NeurgateConfig, args: &CompilerArgs) -> anyhow::Result<Self> {
        let workspace = match &args.workspace {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        if !workspace.is_dir() {
            bail!("Workspace {} is not a directory", workspace.display());
        }
        // The compiler runs from the workspace, so paths handed to it must not be relative
        let workspace = std::path::absolute(&workspace)
            .with_context(|| format!("failed to resolve {}", workspace.display()))?;
        Ok(Self {
            config,
            workspace,
            neurc: args.neurc.clone(),
        })
    }

    fn in_workspace(&self, path: impl AsRef<Path>) -> PathBuf {
        self.workspace.join(path)
    }

    fn report(&self, command: &str) -> Report {
        Report::new(build_report_meta(&self.workspace), command)
    }

    /// The compiler driver; a missing compiler is a configuration error
    fn driver(&self) -> anyhow::Result<NeurcDriver> {
        let program = match &self.neurc {
            Some(path) => path.clone(),
            None => self.in_workspace(&self.config.compiler.path),
        };
        if !program.is_file() {
            bail!("Compiler not found at {}", program.display());
        }
        let program = std::path::absolute(&program)
            .with_context(|| format!("failed to resolve {}", program.display()))?;
        info!(compiler = %program.display(), "using compiler");

        Ok(NeurcDriver::new(program)
            .with_working_dir(&self.workspace)
            .with_extension(&self.config.compiler.extension))
    }

    fn build_timeout(&self) -> anyhow::Result<std::time::Duration> {
        NeurgateConfig::parse_duration(&self.config.compiler.build_timeout)
            .context("invalid compiler.build_timeout")
    }

    fn run_timeout(&self) -> anyhow::Result<std::time::Duration> {
        NeurgateConfig::parse_duration(&self.config.compiler.run_timeout)
            .context("invalid compiler.run_timeout")
    }

    fn corpus(
        &self,
        dirs: &[String],
        glob: Option<&str>,
        min_success_rate: Option<f64>,
        jobs: Option<usize>,
    ) -> anyhow::Result<Report> {
        let settings = &self.config.corpus;
        let driver = self.driver()?;
        let min_success_rate = min_success_rate.unwrap_or(settings.min_success_rate);
        let validator = CorpusValidator::new(&driver, self.build_timeout()?)
            .with_jobs(jobs.or(settings.jobs).unwrap_or(1));
        let pattern = glob
            .map(str::to_string)
            .or_else(|| settings.glob.clone())
            .unwrap_or_else(|| validator.default_pattern());
        let dirs = if dirs.is_empty() {
            settings.directories.as_slice()
        } else {
            dirs
        };

        let mut sections = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let report = validator.validate_named(dir, &self.in_workspace(dir), &pattern)?;
            sections.push((dir.clone(), report));
        }
        let combined = corpus::print_summary(&sections, min_success_rate);

        let mut report = self.report("corpus");
        report.passed = combined.meets(min_success_rate);
        report.suites.push(SuiteResult::from_report(
            "corpus",
            &combined,
            min_success_rate,
        ));
        Ok(report)
    }

    fn features(
        &self,
        cases_file: Option<&Path>,
        filter: Option<&str>,
        min_success_rate: Option<f64>,
        jobs: Option<usize>,
        scratch_dir: Option<&Path>,
    ) -> anyhow::Result<Report> {
        let settings = &self.config.features;
        let driver = self.driver()?;
        let min_success_rate = min_success_rate.unwrap_or(settings.min_success_rate);

        let cases_file = cases_file
            .map(Path::to_path_buf)
            .or_else(|| settings.cases_file.as_ref().map(|p| self.in_workspace(p)));
        let mut cases: Vec<TestCase> = match &cases_file {
            Some(path) => features::load_cases(path)?,
            None => features::builtin_cases(),
        };
        if let Some(pattern) = filter {
            let re = Regex::new(pattern)
                .with_context(|| format!("invalid case filter {pattern:?}"))?;
            cases.retain(|case| re.is_match(case.name()));
        }
        info!(cases = cases.len(), "running feature cases");

        let mut harness = FeatureHarness::new(&driver)
            .with_timeouts(self.build_timeout()?, self.run_timeout()?)
            .with_jobs(jobs.or(settings.jobs).unwrap_or(1));
        let scratch_dir = scratch_dir
            .map(Path::to_path_buf)
            .or_else(|| settings.scratch_dir.as_ref().map(|p| self.in_workspace(p)));
        if let Some(root) = scratch_dir {
            std::fs::create_dir_all(&root)
                .with_context(|| format!("failed to create {}", root.display()))?;
            harness = harness.with_scratch_root(root);
        }

        println!("*** neurgate - Language Feature Test Suite ***");
        let outcomes = harness.evaluate_outcomes(&cases)?;
        let total = features::print_summary(&outcomes, min_success_rate);

        let mut report = self.report("features");
        report.passed = total.meets(min_success_rate);
        report.suites.push(SuiteResult::from_report(
            "features",
            &total,
            min_success_rate,
        ));
        Ok(report)
    }

    fn bench_gate(
        &self,
        baseline: Option<&Path>,
        results_root: Option<&Path>,
        threshold_ratio: Option<f64>,
    ) -> anyhow::Result<Report> {
        let settings = &self.config.bench;
        let Some(baseline_path) = baseline
            .map(Path::to_path_buf)
            .or_else(|| settings.baseline.as_ref().map(PathBuf::from))
        else {
            bail!("No baseline given: pass --baseline or set bench.baseline");
        };
        let results_root = results_root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&settings.results_root));
        let threshold_ratio = threshold_ratio.unwrap_or(settings.threshold_ratio);

        let mut report = self.report("bench-gate");
        let gate = match neurgate_gate::Baseline::load(&baseline_path)
            .and_then(|baseline| RegressionGate::new(baseline, &results_root, threshold_ratio))
        {
            Ok(gate) => gate,
            Err(e) => {
                eprintln!("{e}");
                report.error = Some(e.to_string());
                return Ok(report);
            }
        };

        let mut checks = Vec::with_capacity(gate.baseline().len());
        for check in gate.checks() {
            match check {
                Ok(check) => {
                    println!("{check}");
                    checks.push(check);
                }
                Err(e) => {
                    eprintln!("{e}");
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }

        let regressed = checks.iter().any(|c| !c.passed());
        if report.error.is_none() {
            for line in gate_summary(&checks) {
                println!("{line}");
            }
        }

        report.passed = report.error.is_none() && !regressed;
        report.gate = Some(GateResult {
            threshold_ratio,
            checks: checks.into_iter().map(CheckRecord::from).collect(),
        });
        Ok(report)
    }

    fn smoke(&self, opt_level: Option<u8>) -> anyhow::Result<Report> {
        let settings = &self.config.smoke;
        let driver = self.driver()?;
        let compile_timeout = NeurgateConfig::parse_duration(&settings.compile_timeout)
            .context("invalid smoke.compile_timeout")?;
        let run_timeout = NeurgateConfig::parse_duration(&settings.run_timeout)
            .context("invalid smoke.run_timeout")?;
        let examples: Vec<SmokeExample> = settings
            .examples
            .iter()
            .map(|e| SmokeExample::new(&e.file, e.expected_exit_code))
            .collect();

        let tester = SmokeTester::new(&driver, &self.workspace)
            .with_opt_level(opt_level.unwrap_or(settings.opt_level))
            .with_timeouts(compile_timeout, run_timeout);

        let mut report = self.report("smoke");
        match tester.run(&examples) {
            Ok(passes) => {
                println!("All release smoke tests passed.");
                report.passed = true;
                report.smoke = passes
                    .into_iter()
                    .map(|pass| SmokeRecord {
                        example: pass.example,
                        expected_exit_code: pass.exit_code,
                        actual_exit_code: Some(pass.exit_code),
                        passed: true,
                        detail: "Success".to_string(),
                    })
                    .collect();
            }
            Err(e) => {
                print_smoke_failure(&e);
                report.smoke = smoke_records_for_failure(&examples, &e);
                report.error = Some(e.to_string());
            }
        }
        Ok(report)
    }

    fn all(
        &self,
        cli: &Cli,
        compiler: &CompilerArgs,
        requested: &[String],
    ) -> anyhow::Result<Report> {
        let settings = &self.config.orchestrator;
        let names = if requested.is_empty() {
            settings.suites.as_slice()
        } else {
            requested
        };
        if names.is_empty() {
            bail!("No suites configured: set orchestrator.suites or pass --suite");
        }
        let timeout = NeurgateConfig::parse_duration(&settings.suite_timeout)
            .context("invalid orchestrator.suite_timeout")?;
        let exe = std::env::current_exe().context("failed to locate the neurgate executable")?;

        let suites = names
            .iter()
            .map(|name| suite_spec(&exe, name, cli, compiler))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let runs = Orchestrator::new(timeout).run_all(&suites);

        let mut report = self.report("all");
        report.passed = orchestrator::all_passed(&runs);
        report.runs = runs
            .into_iter()
            .map(|run| SuiteRunRecord {
                name: run.name,
                description: run.description,
                passed: run.passed,
                exit_code: run.exit_code,
                timed_out: run.timed_out,
                elapsed_ms: run.elapsed.as_millis() as u64,
            })
            .collect();
        Ok(report)
    }
}

/// Closing lines of a completed gate run
fn gate_summary(checks: &[neurgate_gate::RegressionCheck]) -> Vec<String> {
    let regressions: Vec<String> = checks
        .iter()
        .filter(|c| !c.passed())
        .map(|c| format!("  - {}", c.failure_line()))
        .collect();
    if regressions.is_empty() {
        return vec!["Benchmark regression check passed.".to_string()];
    }
    let mut lines = vec!["Benchmark regression check failed:".to_string()];
    lines.extend(regressions);
    lines
}

/// Command line that runs suite `name` as a child of this binary
fn suite_spec(
    exe: &Path,
    name: &str,
    cli: &Cli,
    compiler: &CompilerArgs,
) -> anyhow::Result<SuiteSpec> {
    let Some(description) = orchestrator::suite_description(name) else {
        bail!("Unknown suite {name:?} in orchestrator.suites");
    };

    let mut command: Vec<OsString> = vec![exe.into()];
    if let Some(config) = &cli.config {
        command.push("--config".into());
        command.push(config.into());
    }
    let log_flag = if cli.verbose { "--verbose" } else { "--quiet" };
    command.push(log_flag.into());
    command.push(name.into());

    if name != "bench-gate" {
        if let Some(neurc) = &compiler.neurc {
            command.push("--neurc".into());
            command.push(neurc.into());
        }
        if let Some(workspace) = &compiler.workspace {
            command.push("--workspace".into());
            command.push(workspace.into());
        }
    }

    Ok(SuiteSpec {
        name: name.to_string(),
        description: description.to_string(),
        command,
    })
}

fn print_smoke_failure(error: &SmokeError) {
    eprintln!("{error}");
    if let Some((stdout, stderr)) = error.captured_output() {
        if !stdout.is_empty() {
            eprintln!("stdout:\n{stdout}");
        }
        if !stderr.is_empty() {
            eprintln!("stderr:\n{stderr}");
        }
    }
}

/// Records for a failed smoke run: passes before the failing example, then the failure
fn smoke_records_for_failure(examples: &[SmokeExample], error: &SmokeError) -> Vec<SmokeRecord> {
    let Some(failed) = error.example() else {
        return Vec::new();
    };
    let mut records = Vec::new();
    for example in examples {
        if example.file == failed {
            let actual_exit_code = match error {
                SmokeError::ExitMismatch { actual, .. } => Some(*actual),
                _ => None,
            };
            records.push(SmokeRecord {
                example: example.file.clone(),
                expected_exit_code: example.expected_exit_code,
                actual_exit_code,
                passed: false,
                detail: error.to_string(),
            });
            break;
        }
        records.push(SmokeRecord {
            example: example.file.clone(),
            expected_exit_code: example.expected_exit_code,
            actual_exit_code: Some(example.expected_exit_code),
            passed: true,
            detail: "Success".to_string(),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("neurgate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_corpus_flags() {
        let cli = parse(&[
            "--format", "json", "corpus", "--dir", "debug", "--dir", "examples", "-j", "4",
        ]);
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Corpus { dirs, jobs, .. } => {
                assert_eq!(dirs, vec!["debug", "examples"]);
                assert_eq!(jobs, Some(4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["smoke", "--neurc", "/opt/neurc", "-v", "--opt-level", "3"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Smoke {
                compiler,
                opt_level,
            } => {
                assert_eq!(compiler.neurc, Some(PathBuf::from("/opt/neurc")));
                assert_eq!(opt_level, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["neurgate", "-v", "-q", "all"]).is_err());
    }

    #[test]
    fn test_suite_spec_forwards_flags() {
        let cli = parse(&["--config", "ci.toml", "all", "--neurc", "bin/neurc"]);
        let Commands::All { compiler, .. } = &cli.command else {
            panic!("expected all");
        };

        let corpus = suite_spec(Path::new("/bin/neurgate"), "corpus", &cli, compiler).unwrap();
        assert_eq!(corpus.description, "File Compilation Tests");
        assert_eq!(
            corpus.command,
            ["/bin/neurgate", "--config", "ci.toml", "--quiet", "corpus", "--neurc", "bin/neurc"]
                .map(OsString::from)
                .to_vec()
        );

        let gate = suite_spec(Path::new("/bin/neurgate"), "bench-gate", &cli, compiler).unwrap();
        assert_eq!(gate.command.last(), Some(&OsString::from("bench-gate")));

        assert!(suite_spec(Path::new("/bin/neurgate"), "lint", &cli, compiler).is_err());
    }

    #[test]
    fn test_smoke_records_stop_at_failure() {
        let examples = [
            SmokeExample::new("milestone.nr", 8),
            SmokeExample::new("factorial.nr", 120),
            SmokeExample::new("fib.nr", 55),
        ];
        let error = SmokeError::ExitMismatch {
            example: "factorial.nr".to_string(),
            expected: 120,
            actual: 119,
            stdout: String::new(),
            stderr: String::new(),
        };

        let records = smoke_records_for_failure(&examples, &error);

        assert_eq!(records.len(), 2);
        assert!(records[0].passed);
        assert_eq!(records[1].actual_exit_code, Some(119));
        assert!(!records[1].passed);
    }

    #[test]
    fn test_bench_gate_requires_baseline() {
        let session = Session::new(NeurgateConfig::default(), &CompilerArgs::default()).unwrap();
        let err = session.bench_gate(None, None, None).unwrap_err();
        assert!(err.to_string().contains("--baseline"));
    }

    #[test]
    fn test_missing_compiler_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CompilerArgs {
            neurc: Some(dir.path().join("neurc")),
            workspace: Some(dir.path().to_path_buf()),
        };
        let session = Session::new(NeurgateConfig::default(), &args).unwrap();
        let err = session.smoke(None).unwrap_err();
        assert!(err.to_string().starts_with("Compiler not found"));
    }

    #[test]
    fn test_empty_baseline_fails_without_checks() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline.json");
        std::fs::write(&baseline, r#"{"benchmarks": {}}"#).unwrap();
        let session = Session::new(NeurgateConfig::default(), &CompilerArgs::default()).unwrap();

        let report = session
            .bench_gate(Some(&baseline), Some(dir.path()), None)
            .unwrap();

        assert!(!report.passed);
        assert_eq!(
            report.error.as_deref(),
            Some("no benchmark baseline entries found")
        );
        assert!(report.gate.is_none());
    }

    #[test]
    fn test_regression_fails_bench_gate() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline.json");
        std::fs::write(&baseline, r#"{"benchmarks": {"g/fast": 1000000, "g/slow": 1000000}}"#)
            .unwrap();
        let results = dir.path().join("criterion");
        for (key, mean) in [("fast", 900_000.0), ("slow", 1_400_000.0)] {
            let estimates = results.join("g").join(key).join("new");
            std::fs::create_dir_all(&estimates).unwrap();
            std::fs::write(
                estimates.join("estimates.json"),
                format!(r#"{{"mean": {{"point_estimate": {mean}}}}}"#),
            )
            .unwrap();
        }
        let session = Session::new(NeurgateConfig::default(), &CompilerArgs::default()).unwrap();

        let report = session
            .bench_gate(Some(&baseline), Some(&results), Some(0.35))
            .unwrap();

        assert!(!report.passed);
        assert_eq!(report.error, None);
        let gate = report.gate.unwrap();
        let verdicts: Vec<(&str, bool)> = gate
            .checks
            .iter()
            .map(|c| (c.check.key.as_str(), c.passed))
            .collect();
        assert_eq!(verdicts, vec![("g/fast", true), ("g/slow", false)]);

        let checks: Vec<_> = gate.checks.into_iter().map(|c| c.check).collect();
        assert_eq!(
            gate_summary(&checks),
            vec![
                "Benchmark regression check failed:".to_string(),
                "  - g/slow exceeded budget: measured 1400000ns > allowed 1350000ns".to_string(),
            ]
        );
    }

    #[test]
    fn test_gate_summary_when_within_budget() {
        assert_eq!(
            gate_summary(&[]),
            vec!["Benchmark regression check passed.".to_string()]
        );
    }
}
