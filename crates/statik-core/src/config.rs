//! Configuration loading and typed config structures for the Statik
//! simulation.
//!
//! The canonical configuration lives in `statik-config.yaml` at the project
//! root. Every section and field is optional; missing values fall back to
//! the defaults below, which reproduce the classic 200x200 amber field.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use statik_field::{MIN_GRID_SIZE, RuleParams};
use statik_sort::SortOptions;
use statik_types::SortPolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `statik-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid size and seed.
    #[serde(default)]
    pub grid: GridConfig,

    /// Tick and stage timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Update-rule constants and gate thresholds.
    #[serde(default)]
    pub rules: RuleParams,

    /// Sort fan-out and field-sharing policy.
    #[serde(default)]
    pub sort: SortConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `STATIK_SEED` overrides `grid.seed`
    /// - `STATIK_GRID_SIZE` overrides `grid.size`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides
    /// and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.grid.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.size < MIN_GRID_SIZE {
            return Err(invalid(format!(
                "grid.size must be at least {MIN_GRID_SIZE}, got {}",
                self.grid.size
            )));
        }
        if self.timing.tick_interval_ms == 0 {
            return Err(invalid("timing.tick_interval_ms must be at least 1"));
        }
        if self.timing.stage_interval_ms == 0 {
            return Err(invalid("timing.stage_interval_ms must be at least 1"));
        }
        let thresholds = [
            ("rules.damping", self.rules.damping),
            ("rules.constant_increment", self.rules.constant_increment),
            ("rules.linear_decay", self.rules.linear_decay),
            ("rules.square_decay", self.rules.square_decay),
            ("rules.adoption_threshold", self.rules.adoption_threshold),
            ("rules.freeze_threshold", self.rules.freeze_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// Parse the value of environment variable `name`.
fn parse_override<T>(name: &str, val: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| invalid(format!("{name} is not a number: {val} ({e})")))
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Side length `N` of the square field.
    #[serde(default = "default_grid_size")]
    pub size: usize,

    /// Seed for the initial field, the random buffer and the fresh-draw
    /// rule.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl GridConfig {
    /// Override grid values with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but is not a
    /// number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("STATIK_SEED") {
            self.seed = parse_override("STATIK_SEED", &val)?;
        }
        if let Ok(val) = std::env::var("STATIK_GRID_SIZE") {
            self.size = parse_override("STATIK_GRID_SIZE", &val)?;
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            seed: default_seed(),
        }
    }
}

/// Tick and stage timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Real-time milliseconds between global stage advances.
    #[serde(default = "default_stage_interval_ms")]
    pub stage_interval_ms: u64,
}

impl TimingConfig {
    /// Tick period.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Stage period.
    pub const fn stage_interval(&self) -> Duration {
        Duration::from_millis(self.stage_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            stage_interval_ms: default_stage_interval_ms(),
        }
    }
}

/// Sort configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortConfig {
    /// How a sort shares the field with the tick loop.
    #[serde(default)]
    pub policy: SortPolicy,

    /// Subranges at or below this length are sorted without spawning.
    #[serde(default = "default_sequential_cutoff")]
    pub sequential_cutoff: usize,

    /// Pause before each spawn, in milliseconds (0 = none).
    #[serde(default)]
    pub dispatch_delay_ms: u64,

    /// Worker threads in the sort pool (0 = one per core).
    #[serde(default)]
    pub threads: usize,
}

impl SortConfig {
    /// Fan-out options for the partition sort.
    pub const fn options(&self) -> SortOptions {
        SortOptions {
            sequential_cutoff: self.sequential_cutoff,
            dispatch_delay: Duration::from_millis(self.dispatch_delay_ms),
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            policy: SortPolicy::default(),
            sequential_cutoff: default_sequential_cutoff(),
            dispatch_delay_ms: 0,
            threads: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit a progress line every this many ticks (0 = never).
    #[serde(default = "default_report_every_ticks")]
    pub report_every_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            report_every_ticks: default_report_every_ticks(),
        }
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = run until stopped).
    #[serde(default)]
    pub max_ticks: u64,
}

const fn default_grid_size() -> usize {
    200
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    25
}

const fn default_stage_interval_ms() -> u64 {
    25_000
}

const fn default_sequential_cutoff() -> usize {
    statik_sort::partition::DEFAULT_SEQUENTIAL_CUTOFF
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_report_every_ticks() -> u64 {
    400
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid.size, 200);
        assert_eq!(config.grid.seed, 42);
        assert_eq!(config.timing.tick_interval(), Duration::from_millis(25));
        assert_eq!(config.timing.stage_interval(), Duration::from_secs(25));
        assert_eq!(config.sort.policy, SortPolicy::Interleaved);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
grid:
  size: 64
  seed: 7

timing:
  tick_interval_ms: 10
  stage_interval_ms: 2000

rules:
  damping: 0.1
  freeze_threshold: 0.2

sort:
  policy: snapshot
  sequential_cutoff: 8
  dispatch_delay_ms: 1
  threads: 2

logging:
  level: "debug"
  report_every_ticks: 50

simulation:
  max_ticks: 1000
"#;

        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.grid.size, 64);
        assert_eq!(config.timing.stage_interval_ms, 2000);
        assert_eq!(config.rules.damping, 0.1);
        assert_eq!(config.rules.freeze_threshold, 0.2);
        // Untouched rule constants keep their defaults.
        assert_eq!(config.rules.constant_increment, 0.08);
        assert_eq!(config.sort.policy, SortPolicy::Snapshot);
        assert_eq!(config.sort.options().dispatch_delay, Duration::from_millis(1));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulation.max_ticks, 1000);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn tiny_grid_rejected() {
        let err = SimulationConfig::parse("grid:\n  size: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn zero_interval_rejected() {
        let err = SimulationConfig::parse("timing:\n  tick_interval_ms: 0\n").unwrap_err();
        assert!(err.to_string().contains("tick_interval_ms"));
    }

    #[test]
    fn negative_threshold_rejected() {
        let err = SimulationConfig::parse("rules:\n  freeze_threshold: -0.1\n").unwrap_err();
        assert!(err.to_string().contains("freeze_threshold"));
    }

    #[test]
    fn unknown_policy_is_a_yaml_error() {
        let err = SimulationConfig::parse("sort:\n  policy: sideways\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("statik-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }

    #[test]
    fn env_override_values_are_parsed() {
        let seed: Result<u64, _> = parse_override("STATIK_SEED", " 7 ");
        assert_eq!(seed.ok(), Some(7));

        let size: Result<usize, _> = parse_override("STATIK_GRID_SIZE", "big");
        assert!(matches!(
            size,
            Err(ConfigError::Invalid { ref reason })
                if reason.starts_with("STATIK_GRID_SIZE is not a number: big (")
                    && reason.contains("invalid digit")
        ));
    }
}
