//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Legacy JSON
//! settings files (`DefaultPath` / `IndexPages`) are accepted too.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [site]
//! default_category = "docs"
//! content_dir = "content"
//! template = "template.html"
//!
//! [categories]
//! docs = "defaults/docs.html"
//! blog = "defaults/blog.html"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `site.content_dir`
//! - `site.template`
//! - every `categories.*` path

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content directory.
    pub content_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Legacy settings filename, searched after [`CONFIG_FILENAME`].
const LEGACY_CONFIG_FILENAME: &str = "settings.json";

/// Template filename legacy settings imply.
const LEGACY_TEMPLATE: &str = "template.html";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Site configuration (paths are relative strings from the file).
    site: SiteConfigRaw,
    /// Category name to default page path.
    categories: BTreeMap<String, String>,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Raw site configuration as parsed from the file (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    default_category: Option<String>,
    content_dir: Option<String>,
    template: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Category that bare requests redirect to.
    pub default_category: String,
    /// Root directory for lazily loaded pages (`<category>/<page>.html`).
    pub content_dir: PathBuf,
    /// Page template file (`None` uses the built-in template).
    pub template: Option<PathBuf>,
    /// Category name to default page path.
    pub categories: BTreeMap<String, PathBuf>,
}

/// Legacy JSON settings layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacySettings {
    default_path: String,
    index_pages: BTreeMap<String, String>,
}

impl From<LegacySettings> for Config {
    fn from(legacy: LegacySettings) -> Self {
        Self {
            site: SiteConfigRaw {
                default_category: Some(legacy.default_path),
                content_dir: None,
                template: Some(LEGACY_TEMPLATE.to_owned()),
            },
            categories: legacy.index_pages,
            ..Self::default()
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
    /// JSON parsing error (legacy settings).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.content_dir`").
        field: String,
        /// Error message (e.g., "${`CONTENT_DIR`} not set").
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

/// Check that a category name is usable as a URL segment.
fn is_valid_category(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// the current directory and its parents for `folio.toml`, then
    /// `settings.json`.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if no config file exists, parsing fails, or the result
    /// doesn't validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            // Resolved paths must not depend on the working directory later.
            Some(path) => std::path::absolute(path)?,
            None => Self::discover_config().ok_or_else(|| {
                let cwd = std::env::current_dir().unwrap_or_default();
                ConfigError::NotFound(cwd.join(CONFIG_FILENAME))
            })?,
        };

        let mut config = Self::load_from_file(&path)?;

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(content_dir) = &settings.content_dir {
            self.site_resolved.content_dir.clone_from(content_dir);
        }
    }

    /// Search for a config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            for name in [CONFIG_FILENAME, LEGACY_CONFIG_FILENAME] {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    ///
    /// Files with a `.json` extension are parsed as legacy settings.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from(serde_json::from_str::<LegacySettings>(&content)?)
        } else {
            toml::from_str(&content)?
        };

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
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
        self.validate_server()?;
        self.validate_site()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate categories and the default category.
    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site_resolved;

        if site.categories.is_empty() {
            return Err(ConfigError::Validation(
                "at least one entry in [categories] is required".to_owned(),
            ));
        }

        for (name, path) in &site.categories {
            if !is_valid_category(name) {
                return Err(ConfigError::Validation(format!(
                    "category '{name}' may only contain letters, digits, '-' and '_'"
                )));
            }
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "categories.{name} cannot be empty"
                )));
            }
        }

        require_non_empty(&site.default_category, "site.default_category")?;
        if !site.categories.contains_key(&site.default_category) {
            return Err(ConfigError::Validation(format!(
                "site.default_category '{}' is not a configured category",
                site.default_category
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        expand::expand_opt(&mut self.site.content_dir, "site.content_dir")?;
        expand::expand_opt(&mut self.site.template, "site.template")?;

        for (name, path) in &mut self.categories {
            *path = expand::expand_env(path, &format!("categories.{name}"))?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    ///
    /// Empty category paths are kept empty so validation can report them.
    /// Without an explicit default category, a single configured category
    /// becomes the default.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let categories: BTreeMap<String, PathBuf> = self
            .categories
            .iter()
            .map(|(name, path)| {
                let resolved = if path.is_empty() {
                    PathBuf::new()
                } else {
                    config_dir.join(path)
                };
                (name.clone(), resolved)
            })
            .collect();

        let default_category = self.site.default_category.clone().or_else(|| {
            let mut names = categories.keys();
            match (names.next(), names.next()) {
                (Some(only), None) => Some(only.clone()),
                _ => None,
            }
        });

        self.site_resolved = SiteConfig {
            default_category: default_category.unwrap_or_default(),
            content_dir: self
                .site
                .content_dir
                .as_deref()
                .map_or_else(|| config_dir.to_path_buf(), |dir| config_dir.join(dir)),
            template: self.site.template.as_deref().map(|t| config_dir.join(t)),
            categories,
        };
    }
}
