//! Loader for scraper configuration with file + environment overlays.
//!
//! Sources are merged in the order they are added; `SPOTLIGHT__*` environment
//! variables always win (`SPOTLIGHT__MAX_RETRIES=4`). String values may reference
//! other variables as `${VAR}`, expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use spotlight_http::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT};
use std::path::Path;
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    /// Per-request timeout in seconds.
    pub request_timeout: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// Retries after the first attempt for 429/5xx and transport failures.
    pub max_retries: usize,
    pub base_url: String,
    /// Profiles fetched at once.
    pub concurrency: usize,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            request_timeout: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_retries: 2,
            base_url: DEFAULT_BASE_URL.to_string(),
            concurrency: 1,
        }
    }
}

impl SpotlightConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.request_timeout == 0 {
            return Err(ConfigError::Message(
                "request_timeout must be at least 1 second".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Message("concurrency must be at least 1".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Message("base_url must not be empty".into()));
        }
        Ok(self)
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring.
pub struct SpotlightConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SpotlightConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotlightConfigLoader {
    /// Start from defaults plus `SPOTLIGHT__` env overrides.
    ///
    /// ```
    /// use spotlight_config::SpotlightConfigLoader;
    ///
    /// let config = SpotlightConfigLoader::new()
    ///     .with_yaml_str("concurrency: 4")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.concurrency, 4);
    /// assert_eq!(config.max_retries, 2);
    /// ```
    pub fn new() -> Self {
        let builder = Config::builder().add_source(
            Environment::with_prefix("SPOTLIGHT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        Self { builder }
    }

    /// Attach a file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, in which case defaults apply.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config.file.missing_using_defaults");
        }
        self.builder = self.builder.add_source(File::from(path).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and validate.
    ///
    /// ```
    /// use spotlight_config::SpotlightConfigLoader;
    ///
    /// let config = temp_env::with_var("MIRROR_HOST", Some("mirror.example"), || {
    ///     SpotlightConfigLoader::new()
    ///         .with_yaml_str("base_url: \"https://${MIRROR_HOST}\"")
    ///         .load()
    /// })
    /// .unwrap();
    /// assert_eq!(config.base_url, "https://mirror.example");
    ///
    /// assert!(
    ///     SpotlightConfigLoader::new()
    ///         .with_yaml_str("concurrency: 0")
    ///         .load()
    ///         .is_err()
    /// );
    /// ```
    pub fn load(self) -> Result<SpotlightConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SpotlightConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()
    }
}
