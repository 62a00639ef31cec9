//! Configuration management for Garden.
//!
//! Parses `garden.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! Path values support `~` and environment variable expansion before they
//! are resolved against the config file's directory:
//!
//! - `~/notes` - expands to the home directory
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content.source_dir`
//! - `content.output_dir`
//! - `cache.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "garden.toml";

/// Directory holding Garden's project data (cache, etc.).
const PROJECT_DIRNAME: &str = ".garden";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Notebook embedding configuration.
    pub notebooks: NotebooksConfig,
    /// Canvas embedding configuration.
    pub canvas: CanvasConfig,
    /// Runnable Python block configuration.
    pub python: PythonConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    media_dir: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Root directory of the markdown content.
    pub source_dir: PathBuf,
    /// Directory the built site is written to.
    pub output_dir: PathBuf,
    /// Attachment folder inside the content root.
    pub media_dir: PathBuf,
    /// Project directory for Garden data (`.garden/`).
    pub project_dir: PathBuf,
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Cache root directory.
    pub dir: PathBuf,
}

/// Notebook embedding configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotebooksConfig {
    /// Whether remote notebook URLs are looked up in the cache and fetched.
    pub download_remote: bool,
    /// Freshness window for cached remote notebooks, in hours.
    pub cache_ttl_hours: u64,
}

impl NotebooksConfig {
    /// Freshness window as a [`Duration`]. Saturates for huge hour counts.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(60 * 60))
    }
}

impl Default for NotebooksConfig {
    fn default() -> Self {
        Self {
            download_remote: true,
            cache_ttl_hours: 24,
        }
    }
}

/// Canvas embedding configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// File extensions (without dot) treated as canvas files.
    pub extensions: Vec<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["canvas".to_owned(), "json".to_owned()],
        }
    }
}

/// Runnable Python block configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Fence language marker that turns a code block into a runnable block.
    pub marker: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            marker: "python-run".to_owned(),
        }
    }
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
        /// Config field path (e.g., "`cache.dir`").
        field: String,
        /// Error message (e.g., "${`GARDEN_CACHE`} not set").
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

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `garden.toml` in current directory and parents.
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
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
            self.content_resolved.media_dir = source_dir.join(self.media_dir_name());
        }
        if let Some(output_dir) = &settings.output_dir {
            self.content_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
    }

    fn media_dir_name(&self) -> &str {
        self.content.media_dir.as_deref().unwrap_or("media")
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
        let project_dir = base.join(PROJECT_DIRNAME);
        Self {
            content: ContentConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            notebooks: NotebooksConfig::default(),
            canvas: CanvasConfig::default(),
            python: PythonConfig::default(),
            content_resolved: ContentConfig {
                source_dir: base.join("content"),
                output_dir: base.join("public"),
                media_dir: base.join("content").join("media"),
                project_dir: project_dir.clone(),
            },
            cache_resolved: CacheConfig {
                enabled: true,
                dir: project_dir.join("cache"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notebooks.cache_ttl_hours == 0 {
            return Err(ConfigError::Validation(
                "notebooks.cache_ttl_hours must be greater than 0".to_owned(),
            ));
        }

        if self.canvas.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "canvas.extensions cannot be empty".to_owned(),
            ));
        }
        for ext in &self.canvas.extensions {
            require_non_empty(ext, "canvas.extensions")?;
            if ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "canvas.extensions entries are written without a leading dot (got '{ext}')"
                )));
            }
        }

        require_non_empty(&self.python.marker, "python.marker")?;
        if self.python.marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "python.marker cannot contain whitespace".to_owned(),
            ));
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve = |path: Option<&str>, default: &str, field: &str| {
            let raw = path.unwrap_or(default);
            expand::expand_path(raw, field).map(|expanded| config_dir.join(expanded))
        };

        let source_dir = resolve(self.content.source_dir.as_deref(), "content", "content.source_dir")?;
        let project_dir = config_dir.join(PROJECT_DIRNAME);

        self.content_resolved = ContentConfig {
            media_dir: source_dir.join(self.media_dir_name()),
            output_dir: resolve(self.content.output_dir.as_deref(), "public", "content.output_dir")?,
            source_dir,
            project_dir: project_dir.clone(),
        };

        let cache_dir = match self.cache.dir.as_deref() {
            Some(dir) => config_dir.join(expand::expand_path(dir, "cache.dir")?),
            None => project_dir.join("cache"),
        };
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            dir: cache_dir,
        };

        Ok(())
    }
}
