//! Configuration management for Quill renderers.
//!
//! Parses the `[render]` table of a `quill.toml` file with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [render]
//! enable_escape = true
//! soft_escape = false
//! non_ascii_no_escape = false
//! base_url = "https://docs.example.com/"
//! max_depth = 128
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `base_url` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Function-valued options (the link rewriter, write observers) cannot be
//! expressed in TOML and are set on the renderer builder instead.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Default nesting limit for [`RendererOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default number of dispatches between hot-path rebuilds.
pub const DEFAULT_REBUILD_INTERVAL: usize = 10_000;

/// Upper bound accepted for `max_depth`.
///
/// Each nesting level costs a few native stack frames; beyond this the
/// guard no longer protects against stack exhaustion on default stacks.
const MAX_ALLOWED_DEPTH: usize = 4096;

/// Options recognized by the renderer.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RendererOptions {
    /// Substitute special characters with entities.
    ///
    /// When disabled, special characters pass through unchanged.
    pub enable_escape: bool,
    /// Escape only `<` and `&`, leaving `>` and `"` as-is.
    #[serde(rename = "soft_escape")]
    pub soft_escape_mode: bool,
    /// Pass non-ASCII characters in URLs through without percent-encoding.
    #[serde(rename = "non_ascii_no_escape")]
    pub use_non_ascii_no_escape: bool,
    /// Absolute base URL used to resolve relative link destinations.
    pub base_url: Option<String>,
    /// Maximum container nesting depth before rendering fails.
    pub max_depth: usize,
    /// Dispatches between rebuilds of the dispatch hot path.
    pub rebuild_interval: usize,
    /// Plain-text output: separate paragraphs with blank lines.
    pub implicit_paragraph: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            enable_escape: true,
            soft_escape_mode: false,
            use_non_ascii_no_escape: false,
            base_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
            rebuild_interval: DEFAULT_REBUILD_INTERVAL,
            implicit_paragraph: false,
        }
    }
}

/// Top-level layout of `quill.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    render: RendererOptions,
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
        /// Config field path (e.g., "`render.base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_URL`} not set").
        message: String,
    },
}

impl RendererOptions {
    /// Set the base URL for relative links.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Enable or disable entity substitution.
    #[must_use]
    pub fn with_escape(mut self, enabled: bool) -> Self {
        self.enable_escape = enabled;
        self
    }

    /// Enable or disable soft escape mode.
    #[must_use]
    pub fn with_soft_escape(mut self, enabled: bool) -> Self {
        self.soft_escape_mode = enabled;
        self
    }

    /// Enable or disable non-ASCII pass-through in URLs.
    #[must_use]
    pub fn with_non_ascii_no_escape(mut self, enabled: bool) -> Self {
        self.use_non_ascii_no_escape = enabled;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the dispatch hot-path rebuild interval.
    #[must_use]
    pub fn with_rebuild_interval(mut self, interval: usize) -> Self {
        self.rebuild_interval = interval;
        self
    }

    /// Enable blank lines between paragraphs in plain-text output.
    #[must_use]
    pub fn with_implicit_paragraph(mut self, enabled: bool) -> Self {
        self.implicit_paragraph = enabled;
        self
    }

    /// Parse options from the `[render]` table of a TOML document.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut options = file.render;
        options.expand_env_vars()?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a config file.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `quill.toml` in the current directory and its parents, falling back
    /// to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Search for `quill.toml` in `start_dir` and its parents.
    #[must_use]
    pub fn discover(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
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

    /// Load options from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parsed base URL, if configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL is not absolute.
    pub fn parsed_base_url(&self) -> Result<Option<Url>, ConfigError> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ConfigError::Validation(format!("render.base_url is not a valid URL: {e}"))
                })
            })
            .transpose()
    }

    /// Validate option values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Validation(
                "render.max_depth must be greater than 0".to_owned(),
            ));
        }
        if self.max_depth > MAX_ALLOWED_DEPTH {
            return Err(ConfigError::Validation(format!(
                "render.max_depth cannot exceed {MAX_ALLOWED_DEPTH}"
            )));
        }
        if self.rebuild_interval == 0 {
            return Err(ConfigError::Validation(
                "render.rebuild_interval must be greater than 0".to_owned(),
            ));
        }
        if let Some(base_url) = &self.base_url {
            require_http_url(base_url, "render.base_url")?;
            self.parsed_base_url()?;
        }
        Ok(())
    }

    /// Expand environment variable references in string options.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.base_url {
            self.base_url = Some(expand::expand_env(url, "render.base_url")?);
        }
        Ok(())
    }
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
