// Console configuration
//
// Defaults, optionally overlaid by a TOML file, then by LOGSHARE_*
// environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::get_history_dir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the hosting panel.
    pub panel_url: String,
    /// Anti-forgery token forwarded to the file API, if the host has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    pub analysis_url: String,
    pub logs_directory: String,
    pub page_size: usize,
    pub max_page_buttons: usize,
    /// No timeout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub history_dir: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            panel_url: "http://localhost".to_string(),
            csrf_token: None,
            analysis_url: "https://api.mclo.gs".to_string(),
            logs_directory: "/logs".to_string(),
            page_size: 5,
            max_page_buttons: 5,
            request_timeout_secs: None,
            history_dir: get_history_dir(),
        }
    }
}

impl ConsoleConfig {
    /// Deserialize from TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse console config")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
    }

    /// Load configuration from file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        tokio::fs::write(path, self.to_toml_string()?).await?;
        Ok(())
    }

    /// Defaults or `path`, then the process environment on top.
    pub async fn load_layered(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load(path).await?,
            _ => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay LOGSHARE_* values read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LOGSHARE_PANEL_URL") {
            self.panel_url = url;
        }
        if let Some(token) = lookup("LOGSHARE_CSRF_TOKEN") {
            self.csrf_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(url) = lookup("LOGSHARE_ANALYSIS_URL") {
            self.analysis_url = url;
        }
        if let Some(dir) = lookup("LOGSHARE_LOGS_DIR") {
            self.logs_directory = dir;
        }
        if let Some(size) = lookup("LOGSHARE_PAGE_SIZE") {
            self.page_size = size.parse().context("LOGSHARE_PAGE_SIZE must be a number")?;
        }
        if let Some(buttons) = lookup("LOGSHARE_MAX_PAGE_BUTTONS") {
            self.max_page_buttons = buttons
                .parse()
                .context("LOGSHARE_MAX_PAGE_BUTTONS must be a number")?;
        }
        if let Some(secs) = lookup("LOGSHARE_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(
                secs.parse()
                    .context("LOGSHARE_REQUEST_TIMEOUT_SECS must be a number")?,
            );
        }
        if let Some(dir) = lookup("LOGSHARE_HISTORY_DIR") {
            self.history_dir = PathBuf::from(dir);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.max_page_buttons == 0 {
            anyhow::bail!("max_page_buttons must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.analysis_url, "https://api.mclo.gs");
        assert_eq!(config.logs_directory, "/logs");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.max_page_buttons, 5);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.history_dir, get_history_dir());
    }

    #[test]
    fn test_history_dir_only_follows_the_given_lookup() {
        let mut config = ConsoleConfig::default();
        config.apply_env_with(|_| None).unwrap();
        assert!(config.history_dir.ends_with(".logshare/history"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
panel_url = "https://panel.example.com"
page_size = 10
request_timeout_secs = 15
"#;
        let config = ConsoleConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.panel_url, "https://panel.example.com");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_page_buttons, 5);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(ConsoleConfig::from_toml_str("page_size = 0").is_err());
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LOGSHARE_PANEL_URL", "https://panel.internal"),
            ("LOGSHARE_CSRF_TOKEN", ""),
            ("LOGSHARE_PAGE_SIZE", "8"),
            ("LOGSHARE_HISTORY_DIR", "/var/lib/logshare"),
        ]);

        let mut config = ConsoleConfig::default();
        config
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.panel_url, "https://panel.internal");
        assert_eq!(config.csrf_token, None);
        assert_eq!(config.page_size, 8);
        assert_eq!(config.history_dir, PathBuf::from("/var/lib/logshare"));
    }

    #[test]
    fn test_env_overlay_rejects_garbage() {
        let mut config = ConsoleConfig::default();
        let result = config.apply_env_with(|key| (key == "LOGSHARE_PAGE_SIZE").then(|| "lots".to_string()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_file_operations() {
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("console.toml");

        let config = ConsoleConfig {
            csrf_token: Some("abc".to_string()),
            history_dir: temp_dir.path().join("history"),
            ..ConsoleConfig::default()
        };

        config.save(&config_path).await.unwrap();
        assert!(config_path.exists());

        let loaded = ConsoleConfig::load(&config_path).await.unwrap();
        assert_eq!(loaded, config);
    }
}
