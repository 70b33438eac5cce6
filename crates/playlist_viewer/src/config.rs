use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};

use playlist_core::{DEFAULT_PAGE_SIZE, DEFAULT_PLAYLIST_ID};

const APP_DIR: &str = "playlist_viewer";
const CONFIG_NAME: &str = "config.json";
const FAVOURITES_NAME: &str = "favourites.json";

fn default_playlist_id() -> String {
    DEFAULT_PLAYLIST_ID.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_playlist_id")]
    pub playlist_id: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub favourites_path: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            playlist_id: default_playlist_id(),
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
            favourites_path: None,
        }
    }
}

impl ViewerConfig {
    pub fn apply_defaults(&mut self) {
        if self.playlist_id.trim().is_empty() {
            self.playlist_id = default_playlist_id();
        }
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn favourites_path(&self) -> PathBuf {
        match &self.favourites_path {
            Some(path) => PathBuf::from(path),
            None => app_dir().join(FAVOURITES_NAME),
        }
    }
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: ViewerConfig,
}

impl ConfigStore {
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        let path = custom_path.unwrap_or_else(default_config_path);
        let mut config: ViewerConfig = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            serde_json::from_str(&content).context("failed to parse config file")?
        } else {
            ViewerConfig::default()
        };
        config.apply_defaults();
        Ok(Self { path, config })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.path, json).context("failed to write config file")?;
        Ok(())
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ViewerConfig {
        &mut self.config
    }
}

fn app_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_NAME)
}
