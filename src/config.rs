// Runtime configuration. Built once in `main` and handed to the
// operations layer; nothing in the library reads flags or the environment
// on its own.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.bitcoinefectivo.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const USER_AGENT: &str = "be-cli/1.0";

const CONFIG_DIR: &str = ".be";
const CREDENTIALS_FILE: &str = "config.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the API, without the `/api/v1` prefix.
    pub api_url: String,
    pub credentials_path: PathBuf,
    pub timeout: Duration,
}

/// Optional on-disk settings. Only keys present in the file override defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Settings {
    api_url: Option<String>,
}

impl Config {
    pub fn new(api_url: impl Into<String>, credentials_path: impl Into<PathBuf>) -> Self {
        Config {
            api_url: normalize_url(api_url.into()),
            credentials_path: credentials_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the API URL with precedence explicit value > settings file >
    /// default. `explicit` already merges the `--api-url` flag and the
    /// `BE_API_URL` variable.
    ///
    /// An explicitly named settings file must exist; the default one at
    /// `~/.be/settings.json` is skipped when absent.
    pub fn resolve(explicit: Option<String>, settings_path: Option<&Path>) -> Result<Self> {
        let dir = config_dir()?;
        let credentials_path = dir.join(CREDENTIALS_FILE);

        if let Some(url) = explicit.filter(|u| !u.trim().is_empty()) {
            return Ok(Config::new(url, credentials_path));
        }

        let settings = match settings_path {
            Some(path) => read_settings(path)?,
            None => {
                let path = dir.join(SETTINGS_FILE);
                if path.exists() {
                    read_settings(&path)?
                } else {
                    Settings::default()
                }
            }
        };

        let url = settings
            .api_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Config::new(url, credentials_path))
    }
}

/// `~/.be`, the per-user profile directory.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Storage("could not determine home directory".into()))?;
    Ok(home.join(CONFIG_DIR))
}

fn read_settings(path: &Path) -> Result<Settings> {
    debug!("Using config file: {}", path.display());
    let data = std::fs::read_to_string(path)
        .map_err(|e| Error::Storage(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| Error::Storage(format!("failed to parse {}: {}", path.display(), e)))
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
