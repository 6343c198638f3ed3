use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::glx::QUERY_TIMEOUT;

fn default_glxinfo() -> String {
    "glxinfo".to_string()
}

fn default_timeout() -> u64 {
    QUERY_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// X display to query (falls back to $DISPLAY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// X screen to query (falls back to the display's default screen)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<u32>,

    /// glxinfo binary used for client-side and OpenGL strings
    #[serde(default = "default_glxinfo")]
    pub glxinfo_path: String,

    /// Seconds before a driver query is abandoned
    #[serde(default = "default_timeout")]
    pub query_timeout_secs: u64,

    /// Open the frame buffer configuration window on startup
    #[serde(default)]
    pub show_fbconfigs_on_start: bool,

    /// kitty-style color file (`color1 #rrggbb`) for the UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: None,
            screen: None,
            glxinfo_path: default_glxinfo(),
            query_timeout_secs: default_timeout(),
            show_fbconfigs_on_start: false,
            theme_file: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("glxview");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        if config.query_timeout_secs == 0 {
            config.query_timeout_secs = default_timeout();
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
