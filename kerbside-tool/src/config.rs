use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use kerbside_core::Priority;
use kerbside_rest::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;

use crate::error::KerbError;

const API_BASE_ENV: &str = "KERBSIDE_API_BASE";
const TOKEN_ENV: &str = "KERBSIDE_TOKEN";

/// Role of the signed-in operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Superadmin,
    User,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            "user" => Ok(Role::User),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Superadmin => write!(f, "superadmin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub role: Option<Role>,
    pub request_timeout_ms: Option<u64>,
    pub default_priority: Option<Priority>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client: ClientConfig,
    pub role: Role,
    pub default_priority: Priority,
    pub log_file: PathBuf,
}

/// Overrides given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_base: Option<String>,
    pub timeout_ms: Option<u64>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kerbside").join("config.toml"))
}

pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kerbside")
        .join("kerb.log")
}

/// Reads the config file. A missing file yields the defaults; a malformed
/// one is an error.
pub fn load_config_from(path: &Path) -> Result<Config, KerbError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(toml::from_str(&content)?)
}

pub fn load_config() -> Result<Config, KerbError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// Merges CLI flags, environment and config file, in that precedence.
pub fn resolve_settings(
    config: Config,
    cli: CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let base_url = non_empty(cli.api_base)
        .or_else(|| non_empty(env(API_BASE_ENV)))
        .or_else(|| non_empty(config.api_base))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let token = non_empty(env(TOKEN_ENV)).or_else(|| non_empty(config.token));

    let timeout = cli
        .timeout_ms
        .or(config.request_timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT);

    Settings {
        client: ClientConfig {
            base_url,
            token,
            timeout,
        },
        role: config.role.unwrap_or_default(),
        default_priority: config.default_priority.unwrap_or_default(),
        log_file: config.log_file.unwrap_or_else(default_log_path),
    }
}

pub fn load_settings(cli: CliOverrides) -> Result<Settings, KerbError> {
    let config = load_config()?;
    Ok(resolve_settings(config, cli, |key| std::env::var(key).ok()))
}
