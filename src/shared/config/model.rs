use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::engine::compare::FloatPolicy;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub harness: HarnessConfig,
    pub poll: PollConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    pub fixtures: FixturesConfig,
    pub backends: HashMap<String, BackendConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Deserialize)]
pub struct HarnessConfig {
    /// Cases executed at the same time, each on its own clients.
    pub max_concurrency: usize,
    pub case_timeout_ms: u64,
    /// Randomize case order to surface hidden ordering dependencies.
    #[serde(default)]
    pub shuffle: bool,
    /// Leave provisioned fixtures in place after the run.
    #[serde(default)]
    pub keep_fixtures: bool,
}

impl HarnessConfig {
    pub fn case_timeout(&self) -> Duration {
        Duration::from_millis(self.case_timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct PollConfig {
    pub timeout_ms: u64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    2.0
}

impl PollConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompareConfig {
    /// `exact`, `ulps` or `relative`
    #[serde(default = "default_float_policy")]
    pub float_policy: String,
    pub float_tolerance: Option<f64>,
}

fn default_float_policy() -> String {
    "exact".to_string()
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            float_policy: default_float_policy(),
            float_tolerance: None,
        }
    }
}

impl CompareConfig {
    pub fn policy(&self) -> Result<FloatPolicy, String> {
        FloatPolicy::from_config(&self.float_policy, self.float_tolerance)
    }
}

#[derive(Debug, Deserialize)]
pub struct FixturesConfig {
    pub dir: String,
    /// Catalog the query engine exposes the wide store under.
    pub catalog: String,
    /// Native keyspace fixtures are installed into.
    pub keyspace: String,
    /// Backend that executes fixture setup statements.
    pub installer_backend: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub auth_token: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

use std::env;

/// Loads the file named by `CONFORMANCE_CONFIG`, or `config` next to the
/// working directory.
pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("CONFORMANCE_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
