//! Loader for client settings with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//! 1. files / inline YAML, in the order they were attached
//! 2. `TAVILY_`-prefixed environment variables (`TAVILY_API_KEY`,
//!    `TAVILY_TIMEOUT_SECS`, nested keys with `__` such as
//!    `TAVILY_SEARCH__MAX_RESULTS`)
//!
//! `${VAR}` placeholders in string values are expanded after merging.
//!
//! ```yaml
//! api_key: "${TAVILY_API_KEY}"
//! base_url: "https://api.tavily.com/"
//! timeout_secs: 30
//! search:
//!   search_depth: basic
//!   topic: general
//!   max_results: 5
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TAVILY";

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct TavilyConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub search: SearchDefaults,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            search: SearchDefaults::default(),
        }
    }
}

impl TavilyConfig {
    /// The configured key, ignoring blanks and placeholders that never resolved.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !is_unresolved_placeholder(k))
    }
}

/// Default search options, kept as raw strings until the client validates them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchDefaults {
    #[serde(default)]
    pub search_depth: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub include_images: Option<bool>,
    #[serde(default)]
    pub include_answer: Option<bool>,
    #[serde(default)]
    pub include_raw_content: Option<bool>,
    #[serde(default)]
    pub include_domains: Vec<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn is_unresolved_placeholder(s: &str) -> bool {
    s.starts_with("${") && s.ends_with('}')
}

/// `<config dir>/tavily/tavily.yaml`, e.g. `~/.config/tavily/tavily.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tavily").join("tavily.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => {
            let mut cur = std::mem::take(s);
            for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                let expanded = match shellexpand::env(&cur) {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => break,
                };
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
pub struct TavilyConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TavilyConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TavilyConfigLoader {
    /// Start with no file sources; `TAVILY_` env overrides are applied at load.
    ///
    /// ```
    /// use tavily_config::TavilyConfigLoader;
    ///
    /// let cfg = TavilyConfigLoader::new()
    ///     .with_yaml_str("timeout_secs: 12\nsearch:\n  max_results: 7")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.timeout_secs, 12);
    /// assert_eq!(cfg.search.max_results, Some(7));
    /// assert_eq!(cfg.base_url, "https://api.tavily.com/");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach [`default_config_path`] if the platform has a config directory.
    pub fn with_default_file(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, apply env overrides and `${VAR}` expansion, then
    /// deserialize into [`TavilyConfig`].
    ///
    /// ```
    /// use tavily_config::TavilyConfigLoader;
    ///
    /// temp_env::with_var("STAR_FLEET_KEY", Some("tvly-ncc-1701"), || {
    ///     let cfg = TavilyConfigLoader::new()
    ///         .with_yaml_str(r#"api_key: "${STAR_FLEET_KEY}""#)
    ///         .load()
    ///         .expect("valid configuration");
    ///     assert_eq!(cfg.api_key(), Some("tvly-ncc-1701"));
    /// });
    /// ```
    pub fn load(self) -> Result<TavilyConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
