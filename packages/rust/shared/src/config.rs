//! Application configuration for paramexport.
//!
//! User config lives at `~/.paramexport/paramexport.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "paramexport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".paramexport";

/// Internal-tooling job markers that are always excluded from discovery.
pub const BUILTIN_EXCLUDE_MARKERS: &[&str] = &["__DSL__", "__factory", "__dso_tools"];

// ---------------------------------------------------------------------------
// Config structs (matching paramexport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Jenkins controller connection settings.
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// Export behavior settings.
    #[serde(default)]
    pub export: ExportSettings,
}

/// `[jenkins]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsConfig {
    /// Base URL of the Jenkins controller.
    #[serde(default = "default_jenkins_url")]
    pub url: String,

    /// HTTP header carrying the API token.
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Name of the env var holding the API token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: default_jenkins_url(),
            auth_header: default_auth_header(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_jenkins_url() -> String {
    "http://localhost:8080".into()
}
fn default_auth_header() -> String {
    "x-awesome-devops-token-x".into()
}
fn default_token_env() -> String {
    "JENKINS_API_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[export]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory for cached job lists, catalogs, and schema checkpoints.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Extra job path exclusion patterns (glob-style), on top of the
    /// built-in internal-tooling markers.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_cache_dir() -> String {
    "tmp".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.paramexport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ExportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.paramexport/paramexport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ExportError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ExportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| ExportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ExportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Jenkins API token from the env var named in the config.
pub fn resolve_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.jenkins.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ExportError::config(format!(
            "Jenkins API token not found. Set the {var_name} environment variable."
        ))),
    }
}
