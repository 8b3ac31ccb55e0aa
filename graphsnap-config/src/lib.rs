//! Loader for graphsnap configuration: optional YAML file plus environment overlays.
//!
//! Precedence, lowest to highest:
//!
//! 1. YAML files added with [`ConfigLoader::with_file`] / [`ConfigLoader::with_yaml_str`]
//! 2. `GRAPHSNAP_`-prefixed variables, nested with `__` (`GRAPHSNAP_FETCH__PAGE_LIMIT=50`)
//! 3. `BSKY_HANDLE`, `BSKY_APP_PWD`, `BSKY_INSTANCE`
//!
//! String values may reference other variables as `${VAR}`; they are expanded before
//! the typed structs are built. The three credentials are mandatory and must be
//! non-empty.
use config::{Config, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const HANDLE_ENV: &str = "BSKY_HANDLE";
pub const APP_PASSWORD_ENV: &str = "BSKY_APP_PWD";
pub const INSTANCE_ENV: &str = "BSKY_INSTANCE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("{0} env var not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphsnapConfig {
    /// Account handle used as the session identifier.
    #[serde(default)]
    pub handle: String,
    /// App-scoped password; never logged.
    #[serde(default, rename = "app_pwd")]
    pub app_password: String,
    /// Base address of the PDS / entryway, e.g. `https://bsky.social`.
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// Pagination and retry knobs. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub page_limit: u32,
    pub page_delay_ms: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_limit: 100,
            page_delay_ms: 1_000,
            max_retries: 5,
            initial_backoff_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Directory for the rolling log file; falls back to the platform data dir.
    pub dir: Option<String>,
    /// Keep a log file in addition to stderr.
    pub file: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: None,
            file: true,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => {
            let mut cur = std::mem::take(s);
            for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                let expanded = shellexpand::env(&cur)
                    .map(|cow| cow.into_owned())
                    .unwrap_or_else(|_| cur.clone());
                if expanded == cur {
                    break;
                }
                cur = expanded;
            }
            *s = cur;
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Start empty; environment sources are layered on top in [`ConfigLoader::load`].
    ///
    /// ```
    /// use graphsnap_config::ConfigLoader;
    ///
    /// let cfg = ConfigLoader::new()
    ///     .with_yaml_str("handle: alice.test\napp_pwd: secret\ninstance: https://pds.test")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.fetch.page_limit, 100);
    /// assert_eq!(cfg.fetch.max_retries, 5);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; a missing file is skipped so CI runs can rely on
    /// the environment alone.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Layer the environment on top, expand `${VAR}` placeholders, and validate.
    ///
    /// ```
    /// use graphsnap_config::{ConfigLoadError, ConfigLoader};
    ///
    /// let err = ConfigLoader::new()
    ///     .with_yaml_str("handle: alice.test\ninstance: https://pds.test")
    ///     .load()
    ///     .unwrap_err();
    /// assert!(matches!(err, ConfigLoadError::Missing("BSKY_APP_PWD")));
    /// ```
    pub fn load(self) -> Result<GraphsnapConfig, ConfigLoadError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("GRAPHSNAP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .add_source(Environment::with_prefix("BSKY"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GraphsnapConfig = serde_json::from_value(v)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}

impl GraphsnapConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        for (value, var) in [
            (&self.handle, HANDLE_ENV),
            (&self.app_password, APP_PASSWORD_ENV),
            (&self.instance, INSTANCE_ENV),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigLoadError::Missing(var));
            }
        }
        Ok(())
    }
}
