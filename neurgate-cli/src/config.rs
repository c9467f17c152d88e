//! Configuration loading from neurgate.toml
//!
//! neurgate configuration can be specified in a `neurgate.toml` file in the
//! workspace root. The configuration is automatically discovered by walking up
//! from the current directory. Explicit command-line flags always win over
//! values from the file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name searched for by [`NeurgateConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "neurgate.toml";

/// neurgate configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NeurgateConfig {
    /// Compiler invocation
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Corpus validation
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// Language feature suite
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Benchmark regression gate
    #[serde(default)]
    pub bench: BenchConfig,
    /// Release smoke tests
    #[serde(default)]
    pub smoke: SmokeConfig,
    /// Master suite runner
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// How to reach the compiler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler executable, relative to the workspace unless absolute
    #[serde(default = "default_compiler_path")]
    pub path: String,
    /// Source file extension (without dot)
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Timeout for one `build` invocation (e.g., "30s")
    #[serde(default = "default_build_timeout")]
    pub build_timeout: String,
    /// Timeout for running a produced executable (e.g., "10s")
    #[serde(default = "default_run_timeout")]
    pub run_timeout: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            path: default_compiler_path(),
            extension: default_extension(),
            build_timeout: default_build_timeout(),
            run_timeout: default_run_timeout(),
        }
    }
}

fn default_compiler_path() -> String {
    "target/release/neurc".to_string()
}
fn default_extension() -> String {
    neurgate_core::DEFAULT_SOURCE_EXTENSION.to_string()
}
fn default_build_timeout() -> String {
    format!("{}s", neurgate_core::DEFAULT_BUILD_TIMEOUT_SECS)
}
fn default_run_timeout() -> String {
    format!("{}s", neurgate_core::DEFAULT_RUN_TIMEOUT_SECS)
}

/// Corpus validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directories to validate, relative to the workspace, in order
    #[serde(default = "default_corpus_directories")]
    pub directories: Vec<String>,
    /// File name glob; defaults to `*.<compiler.extension>`
    #[serde(default)]
    pub glob: Option<String>,
    /// Minimum success rate in percent
    #[serde(default = "default_corpus_min_success_rate")]
    pub min_success_rate: f64,
    /// Number of parallel builds
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            directories: default_corpus_directories(),
            glob: None,
            min_success_rate: default_corpus_min_success_rate(),
            jobs: None,
        }
    }
}

fn default_corpus_directories() -> Vec<String> {
    vec!["debug".to_string(), "examples".to_string()]
}
fn default_corpus_min_success_rate() -> f64 {
    98.0
}

/// Language feature suite settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Minimum success rate in percent
    #[serde(default = "default_features_min_success_rate")]
    pub min_success_rate: f64,
    /// TOML case file replacing the built-in catalog
    #[serde(default)]
    pub cases_file: Option<String>,
    /// Root for per-case scratch directories (system temp dir if unset)
    #[serde(default)]
    pub scratch_dir: Option<String>,
    /// Number of parallel cases
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            min_success_rate: default_features_min_success_rate(),
            cases_file: None,
            scratch_dir: None,
            jobs: None,
        }
    }
}

fn default_features_min_success_rate() -> f64 {
    90.0
}

/// Benchmark regression gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Baseline JSON file
    #[serde(default)]
    pub baseline: Option<String>,
    /// Criterion output root
    #[serde(default = "default_results_root")]
    pub results_root: String,
    /// Allowed slowdown over baseline (0.35 = 35%)
    #[serde(default = "default_threshold_ratio")]
    pub threshold_ratio: f64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            results_root: default_results_root(),
            threshold_ratio: default_threshold_ratio(),
        }
    }
}

fn default_results_root() -> String {
    neurgate_gate::DEFAULT_RESULTS_ROOT.to_string()
}
fn default_threshold_ratio() -> f64 {
    neurgate_gate::DEFAULT_THRESHOLD_RATIO
}

/// Release smoke test settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokeConfig {
    /// Optimization level passed to `compile -O`
    #[serde(default = "default_opt_level")]
    pub opt_level: u8,
    /// Timeout for one `compile` invocation
    #[serde(default = "default_compile_timeout")]
    pub compile_timeout: String,
    /// Timeout for running a compiled example
    #[serde(default = "default_run_timeout")]
    pub run_timeout: String,
    /// Examples under `<workspace>/examples/` and their expected exit codes
    #[serde(default = "default_smoke_examples")]
    pub examples: Vec<SmokeExampleConfig>,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            opt_level: default_opt_level(),
            compile_timeout: default_compile_timeout(),
            run_timeout: default_run_timeout(),
            examples: default_smoke_examples(),
        }
    }
}

/// One smoke example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeExampleConfig {
    /// File name under `examples/`
    pub file: String,
    /// Required exit code of the compiled binary
    pub expected_exit_code: i32,
}

fn default_opt_level() -> u8 {
    2
}
fn default_compile_timeout() -> String {
    "60s".to_string()
}
fn default_smoke_examples() -> Vec<SmokeExampleConfig> {
    vec![
        SmokeExampleConfig {
            file: "milestone.nr".to_string(),
            expected_exit_code: 8,
        },
        SmokeExampleConfig {
            file: "factorial.nr".to_string(),
            expected_exit_code: 120,
        },
    ]
}

/// Master suite runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Suites run by `neurgate all`, in order
    #[serde(default = "default_suites")]
    pub suites: Vec<String>,
    /// Timeout for one suite (e.g., "5m")
    #[serde(default = "default_suite_timeout")]
    pub suite_timeout: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            suites: default_suites(),
            suite_timeout: default_suite_timeout(),
        }
    }
}

fn default_suites() -> Vec<String> {
    vec!["corpus".to_string(), "features".to_string()]
}
fn default_suite_timeout() -> String {
    format!("{}s", neurgate_core::DEFAULT_SUITE_TIMEOUT_SECS)
}

impl NeurgateConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Find `neurgate.toml` by walking up from `start`
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Discover and load configuration by walking up from the current directory.
    ///
    /// Returns `Ok(None)` when no file exists; a file that exists but does not
    /// parse is an error.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Self::find_from(&cwd).map(Self::load).transpose()
    }

    /// Load `explicit` if given, else the discovered file, else defaults
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::discover()?.unwrap_or_default()),
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# neurgate configuration

[compiler]
# Compiler executable, relative to the workspace unless absolute
path = "target/release/neurc"
# Source file extension
extension = "nr"
# Timeout for one `neurc build`
build_timeout = "30s"
# Timeout for running a produced executable
run_timeout = "10s"

[corpus]
# Directories whose source files must all build, in order
directories = ["debug", "examples"]
# File name pattern (defaults to "*.<extension>")
# glob = "*.nr"
# Minimum success rate in percent
min_success_rate = 98.0
# Number of parallel builds (uncomment to enable)
# jobs = 4

[features]
# Minimum success rate in percent
min_success_rate = 90.0
# TOML case file replacing the built-in catalog (uncomment to enable)
# cases_file = "tests/features.toml"
# Root for per-case scratch directories (uncomment to enable)
# scratch_dir = "target/neurgate-scratch"
# Number of parallel cases (uncomment to enable)
# jobs = 4

[bench]
# Baseline mapping "group/name" to nanosecond budgets (uncomment to enable)
# baseline = "benchmarks/baseline.json"
# Criterion output root
results_root = "target/criterion"
# Allowed slowdown over baseline (0.35 = 35%)
threshold_ratio = 0.35

[smoke]
# Optimization level passed to `neurc compile -O`
opt_level = 2
compile_timeout = "60s"
run_timeout = "10s"

[[smoke.examples]]
file = "milestone.nr"
expected_exit_code = 8

[[smoke.examples]]
file = "factorial.nr"
expected_exit_code = 120

[orchestrator]
# Suites run by `neurgate all`: corpus, features, bench-gate, smoke
suites = ["corpus", "features"]
# Timeout for one suite
suite_timeout = "5m"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "30s", "500ms", "5m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = NeurgateConfig::default();
        assert_eq!(config.compiler.path, "target/release/neurc");
        assert_eq!(config.compiler.extension, "nr");
        assert_eq!(config.corpus.directories, vec!["debug", "examples"]);
        assert_eq!(config.corpus.min_success_rate, 98.0);
        assert_eq!(config.features.min_success_rate, 90.0);
        assert_eq!(config.bench.threshold_ratio, 0.35);
        assert_eq!(config.smoke.opt_level, 2);
        assert_eq!(config.smoke.examples.len(), 2);
        assert_eq!(config.orchestrator.suites, vec!["corpus", "features"]);
    }

    #[test]
    fn test_parse_duration() {
        let secs = |s| NeurgateConfig::parse_duration(s).unwrap();
        assert_eq!(secs("30s"), Duration::from_secs(30));
        assert_eq!(secs("500ms"), Duration::from_millis(500));
        assert_eq!(secs("100us"), Duration::from_micros(100));
        assert_eq!(secs("5m"), Duration::from_secs(300));
        assert_eq!(secs("1.5s"), Duration::from_millis(1500));
        assert_eq!(secs("10"), Duration::from_secs(10));
        assert!(NeurgateConfig::parse_duration("").is_err());
        assert!(NeurgateConfig::parse_duration("3 fortnights").is_err());
        assert!(NeurgateConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [compiler]
            path = "/opt/neurc/bin/neurc"

            [corpus]
            directories = ["tests/corpus"]
            jobs = 4

            [[smoke.examples]]
            file = "hello.nr"
            expected_exit_code = 0
        "#;

        let config: NeurgateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.compiler.path, "/opt/neurc/bin/neurc");
        assert_eq!(config.corpus.jobs, Some(4));
        assert_eq!(
            config.smoke.examples,
            vec![SmokeExampleConfig {
                file: "hello.nr".to_string(),
                expected_exit_code: 0
            }]
        );
        // Defaults should still apply
        assert_eq!(config.compiler.build_timeout, "30s");
        assert_eq!(config.smoke.opt_level, 2);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: NeurgateConfig = toml::from_str(&NeurgateConfig::default_toml()).unwrap();
        let defaults = NeurgateConfig::default();
        assert_eq!(config.corpus.directories, defaults.corpus.directories);
        assert_eq!(config.smoke.examples, defaults.smoke.examples);
        assert_eq!(
            NeurgateConfig::parse_duration(&config.orchestrator.suite_timeout).unwrap(),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_find_from_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(
            NeurgateConfig::find_from(&nested),
            Some(root.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[corpus]\nmin_success_rate = \"lots\"\n").unwrap();

        let err = NeurgateConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }
}
