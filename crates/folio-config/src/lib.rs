//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content.base_url`
//! - `content.api_token`
//! - `content.root_page_id`
//!
//! Values without `${` are taken literally, so a token containing `$` needs
//! no escaping.

use serde::Deserialize;
use std::borrow::Cow;
use std::env::VarError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the root page of the content tree.
    pub root_page_id: Option<String>,
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the number of concurrent fetches.
    pub concurrency: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Largest page size the content API accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content API configuration.
    pub content: ContentConfig,
    /// Fetch, retry and concurrency configuration.
    pub fetch: FetchConfig,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Content API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content API base URL.
    pub base_url: String,
    /// Bearer token for the content API.
    pub api_token: String,
    /// Value of the API version header.
    pub api_version: String,
    /// Identifier of the page the site tree hangs off.
    pub root_page_id: String,
    /// Name of the page property holding the page slug.
    pub slug_property: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com".to_owned(),
            api_token: String::new(),
            api_version: "2022-06-28".to_owned(),
            root_page_id: String::new(),
            slug_property: "slug".to_owned(),
        }
    }
}

impl ContentConfig {
    /// Validate that the fields needed to talk to the API are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "content.base_url")?;
        require_http_url(&self.base_url, "content.base_url")?;
        require_non_empty(&self.api_token, "content.api_token")?;
        require_non_empty(&self.root_page_id, "content.root_page_id")?;
        require_non_empty(&self.slug_property, "content.slug_property")?;
        Ok(())
    }

    /// Replace `${VAR}` references in the URL, token and root page id.
    fn expand_env(&mut self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("content.base_url", &mut self.base_url),
            ("content.api_token", &mut self.api_token),
            ("content.root_page_id", &mut self.root_page_id),
        ] {
            if value.contains("${") {
                *value = expand_var_refs(value, field)?;
            }
        }
        Ok(())
    }
}

/// Expand `${VAR}` and `${VAR:-default}` in one field value.
fn expand_var_refs(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: match err.cause {
                VarError::NotPresent => format!("${{{}}} is not set", err.var_name),
                VarError::NotUnicode(_) => format!("${{{}}} is not valid UTF-8", err.var_name),
            },
        })
}

/// Fetch, retry and concurrency configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Number of children requested per page.
    pub page_size: u32,
    /// Attempts per request before giving up (first try included).
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for a single retry delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Maximum number of subtrees fetched at the same time.
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            timeout_secs: 30,
            concurrency: 3,
        }
    }
}

impl FetchConfig {
    /// Delay before the first retry.
    #[must_use]
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Upper bound for a single retry delay.
    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Directory receiving the generated pages.
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.api_token`").
        field: String,
        /// Error message (e.g., "${`NOTION_TOKEN`} is not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root_page_id) = &settings.root_page_id {
            self.content.root_page_id.clone_from(root_page_id);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(concurrency) = settings.concurrency {
            self.fetch.concurrency = concurrency;
        }
    }

    /// Get validated content API configuration.
    ///
    /// Use this instead of accessing the `content` field directly when the
    /// command talks to the content API.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a required field is missing or invalid.
    pub fn require_content(&self) -> Result<&ContentConfig, ConfigError> {
        self.content.validate()?;
        Ok(&self.content)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfig::default(),
            fetch: FetchConfig::default(),
            output: OutputConfigRaw::default(),
            output_resolved: OutputConfig {
                dir: base.join("dist"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.content.expand_env()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Credentials and the root page id are checked lazily by
    /// [`Config::require_content`], so commands that never reach the API
    /// can run without them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.content.base_url, "content.base_url")?;
        require_http_url(&self.content.base_url, "content.base_url")?;
        self.validate_fetch()?;
        Ok(())
    }

    /// Validate fetch configuration.
    fn validate_fetch(&self) -> Result<(), ConfigError> {
        let fetch = &self.fetch;

        if fetch.page_size == 0 || fetch.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Validation(format!(
                "fetch.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if fetch.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_attempts must be at least 1".to_owned(),
            ));
        }
        if fetch.concurrency == 0 {
            return Err(ConfigError::Validation(
                "fetch.concurrency must be at least 1".to_owned(),
            ));
        }
        if fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if fetch.initial_backoff_ms > fetch.max_backoff_ms {
            return Err(ConfigError::Validation(
                "fetch.initial_backoff_ms cannot exceed fetch.max_backoff_ms".to_owned(),
            ));
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or("dist")),
        };
    }
}
