//! Configuration management for FarmLink CLI
//!
//! Stores the API location and session tokens in ~/.config/farmlink/config.toml

use anyhow::{Context, Result};
use farmlink::Role;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR: &str = "farmlink";
const CONFIG_FILE: &str = "config.toml";

/// Overrides `base_url` without touching the file
pub const API_URL_ENV: &str = "FARMLINK_API_URL";

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            refresh_token: None,
            email: None,
            role: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Base URL after the environment override (a `.env` file counts)
    pub fn api_url(&self) -> String {
        dotenvy::dotenv().ok();
        Self::resolve_url(std::env::var(API_URL_ENV).ok(), &self.base_url)
    }

    fn resolve_url(env: Option<String>, base_url: &str) -> String {
        env.filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| base_url.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn set_session(&mut self, email: String, role: Role, access: String, refresh: String) {
        self.email = Some(email);
        self.role = Some(role);
        self.access_token = Some(access);
        self.refresh_token = Some(refresh);
    }

    pub fn clear_session(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.email = None;
        self.role = None;
    }
}
