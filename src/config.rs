//! Project-local configuration stored in `.voicedesk/config.yaml`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

pub const PROJECT_DIR: &str = ".voicedesk";
pub const CONFIG_FILE: &str = "config.yaml";

pub const ENV_API_URL: &str = "VOICEDESK_API_URL";
pub const ENV_TOKEN: &str = "VOICEDESK_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API, without trailing slash.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Quiet period before a search box change triggers a fetch.
    pub debounce_ms: u64,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            token: None,
            debounce_ms: 500,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Read `config.yaml` from a project directory, falling back to defaults
    /// when the file is absent, then apply environment overrides.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_yaml::from_str(&text)?
        } else {
            Config::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)?;
        fs::write(project_dir.join(CONFIG_FILE), text)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(token) = env::var(ENV_TOKEN) {
            if !token.is_empty() {
                self.token = Some(token);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(DeskError::Config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DeskError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Walk up from `start` to the nearest directory holding `.voicedesk/`.
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(PROJECT_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
