//! Configuration management for EduMark.
//!
//! Parses `edumark.toml` with serde and discovers it in the current directory
//! or any parent. CLI flags are layered on top through [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`. Expanded fields:
//! - `server.host`
//! - `github.owner`
//! - `github.repo`
//! - `github.token`
//! - `github.default_branch`
//! - `github.api_url`

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override local docs directory.
    pub source_dir: Option<PathBuf>,
    /// Override tree cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override the default branch used for remote lookups.
    pub default_branch: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "edumark.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Local docs configuration (relative paths as written in TOML).
    docs: DocsConfigRaw,
    /// Remote repository configuration. Absent means remote lookups are
    /// unavailable.
    pub github: Option<GitHubConfig>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
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
            port: 3000,
        }
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved docs configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory served by the local preview.
    pub source_dir: PathBuf,
    /// Project data directory (`.edumark/`).
    pub project_dir: PathBuf,
    /// Whether the branch index cache is persisted.
    pub cache_enabled: bool,
}

impl DocsConfig {
    /// Cache directory path (`.edumark/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }
}

/// Bearer token for the remote host.
///
/// `Debug` and `Display` never print the secret.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value, for building the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether no token is configured (anonymous access).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Token(<none>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

/// Remote repository configuration (`[github]`).
#[derive(Debug, Deserialize)]
pub struct GitHubConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token; empty for anonymous access to public repositories.
    #[serde(default)]
    pub token: Token,
    /// Branch used when a request does not name one.
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// REST API base URL (GitHub Enterprise installs use `https://host/api/v3`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Timeout for one recursive tree listing, in seconds.
    #[serde(default = "default_tree_timeout")]
    pub tree_timeout_secs: u64,
    /// Timeout for one content fetch, in seconds.
    #[serde(default = "default_content_timeout")]
    pub content_timeout_secs: u64,
}

impl GitHubConfig {
    /// Tree listing timeout.
    #[must_use]
    pub fn tree_timeout(&self) -> Duration {
        Duration::from_secs(self.tree_timeout_secs)
    }

    /// Content fetch timeout.
    #[must_use]
    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.owner, "github.owner")?;
        require_non_empty(&self.repo, "github.repo")?;
        require_non_empty(&self.default_branch, "github.default_branch")?;
        require_non_empty(&self.api_url, "github.api_url")?;
        require_http_url(&self.api_url, "github.api_url")?;
        if self.tree_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "github.tree_timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.content_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "github.content_timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_branch() -> String {
    "main".to_owned()
}

fn default_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_tree_timeout() -> u64 {
    15
}

fn default_content_timeout() -> u64 {
    10
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
        /// Config field path (e.g., "`github.token`").
        field: String,
        /// Error message (e.g., "${`GITHUB_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
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
    /// With `config_path`, that file must exist. Otherwise `edumark.toml` is
    /// searched for in the current directory and its parents, falling back to
    /// defaults rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// validation fails.
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
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.docs_resolved.cache_enabled = cache_enabled;
        }
        if let Some(branch) = &settings.default_branch
            && let Some(github) = self.github.as_mut()
        {
            github.default_branch.clone_from(branch);
        }
    }

    /// Get the validated remote repository configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the `[github]` section is missing or
    /// invalid.
    pub fn require_github(&self) -> Result<&GitHubConfig, ConfigError> {
        let github = self.github.as_ref().ok_or_else(|| {
            ConfigError::Validation("[github] section required in config".into())
        })?;
        github.validate()?;
        Ok(github)
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
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            github: None,
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                project_dir: base.join(".edumark"),
                cache_enabled: true,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

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
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick; never what a config file means
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        if let Some(github) = &self.github {
            github.validate()?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref mut github) = self.github {
            github.owner = expand::expand_env(&github.owner, "github.owner")?;
            github.repo = expand::expand_env(&github.repo, "github.repo")?;
            github.token = Token::new(expand::expand_env(github.token.expose(), "github.token")?);
            github.default_branch =
                expand::expand_env(&github.default_branch, "github.default_branch")?;
            github.api_url = expand::expand_env(&github.api_url, "github.api_url")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            project_dir: config_dir.join(".edumark"),
            cache_enabled: self.docs.cache_enabled.unwrap_or(true),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(
            config.docs_resolved.cache_dir(),
            PathBuf::from("/test/.edumark/cache")
        );
        assert!(config.docs_resolved.cache_enabled);
        assert!(config.github.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.github.is_none());
    }

    #[test]
    fn test_parse_github_defaults() {
        let toml = r#"
[github]
owner = "acme"
repo = "lectures"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let github = config.github.unwrap();
        assert_eq!(github.owner, "acme");
        assert_eq!(github.repo, "lectures");
        assert!(github.token.is_empty());
        assert_eq!(github.default_branch, "main");
        assert_eq!(github.api_url, "https://api.github.com");
        assert_eq!(github.tree_timeout(), Duration::from_secs(15));
        assert_eq!(github.content_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_github_full() {
        let toml = r#"
[github]
owner = "acme"
repo = "lectures"
token = "ghp_secret"
default_branch = "published"
api_url = "https://ghe.example.com/api/v3"
tree_timeout_secs = 30
content_timeout_secs = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let github = config.github.unwrap();
        assert_eq!(github.token.expose(), "ghp_secret");
        assert_eq!(github.default_branch, "published");
        assert_eq!(github.tree_timeout(), Duration::from_secs(30));
        assert_eq!(github.content_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let toml = r#"
[github]
owner = "acme"
repo = "lectures"
token = "ghp_secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_require_github_missing_section() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_github().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[github]"));
    }

    #[test]
    fn test_require_github_empty_owner() {
        let toml = r#"
[github]
owner = ""
repo = "lectures"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.require_github().unwrap_err();
        assert!(err.to_string().contains("github.owner"));
    }

    #[test]
    fn test_validate_rejects_non_http_api_url() {
        let toml = r#"
[github]
owner = "acme"
repo = "lectures"
api_url = "ftp://example.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("github.api_url"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let toml = r#"
[github]
owner = "acme"
repo = "lectures"
tree_timeout_secs = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tree_timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let toml = r"
[server]
port = 0
";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "lectures"
cache_enabled = false
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/lectures")
        );
        assert_eq!(
            config.docs_resolved.project_dir,
            PathBuf::from("/project/.edumark")
        );
        assert!(!config.docs_resolved.cache_enabled);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config: Config = toml::from_str(
            r#"
[github]
owner = "acme"
repo = "lectures"
"#,
        )
        .unwrap();
        config.resolve_paths(Path::new("/project"));

        config.apply_cli_settings(&CliSettings {
            port: Some(9000),
            cache_enabled: Some(false),
            default_branch: Some("draft".to_owned()),
            ..Default::default()
        });

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.docs_resolved.cache_enabled);
        assert_eq!(config.github.unwrap().default_branch, "draft");
    }

    #[test]
    fn test_load_from_file_expands_token() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("edumark.toml");
        std::fs::write(
            &path,
            r#"
[github]
owner = "acme"
repo = "lectures"
token = "${EDUMARK_TEST_LOAD_TOKEN:-anonymous}"
"#,
        )
        .unwrap();

        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("EDUMARK_TEST_LOAD_TOKEN");
        }
        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.github.as_ref().unwrap().token.expose(), "anonymous");
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("docs"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/edumark.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
