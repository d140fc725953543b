use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::analysis::{AnalysisMode, AnalysisOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub judge: JudgeConfig,

    pub analysis: AnalysisConfig,

    pub scraper: ScraperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Tokio worker threads; 0 uses the runtime default.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:reelscore.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub api_url: String,

    pub model: String,

    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,

    pub timeout_secs: u64,

    pub temperature: f32,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.deepseek.com/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            timeout_secs: 60,
            temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// "ordered" (restart-safe placeholders), "unordered", or "serial".
    pub mode: String,

    /// In-flight judge calls in the parallel modes.
    pub max_concurrent: usize,

    /// Pause between calls in serial mode, for rate-limited endpoints.
    pub serial_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: "ordered".to_string(),
            max_concurrent: 5,
            serial_delay_ms: 200,
        }
    }
}

impl AnalysisConfig {
    pub fn options(&self) -> Result<AnalysisOptions> {
        Ok(AnalysisOptions {
            mode: self.mode.parse()?,
            max_concurrent: self.max_concurrent,
            serial_delay: std::time::Duration::from_millis(self.serial_delay_ms),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Prefix for review pages when no source URL is given at ingest.
    pub base_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.rottentomatoes.com/m/".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Derives a review-page URL from the movie title: lowercased, spaces to
    /// underscores, everything outside `[a-z0-9_]` stripped.
    pub fn review_page_url(&self, title: &str) -> Result<String> {
        let slug = regex::Regex::new("[^a-z0-9_]")?
            .replace_all(&title.to_lowercase().replace(' ', "_"), "")
            .into_owned();

        Ok(format!("{}{}/reviews?type=user", self.base_url, slug))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("reelscore").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".reelscore").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("database_path cannot be empty");
        }

        if self.judge.api_url.is_empty() {
            anyhow::bail!("judge api_url cannot be empty");
        }

        if self.judge.timeout_secs == 0 {
            anyhow::bail!("judge timeout_secs must be at least 1");
        }

        let options = self.analysis.options()?;
        if matches!(options.mode, AnalysisMode::Ordered | AnalysisMode::Unordered)
            && options.max_concurrent == 0
        {
            anyhow::bail!("analysis max_concurrent must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.mode, "ordered");
        assert_eq!(config.analysis.max_concurrent, 5);
        assert_eq!(config.judge.model, "deepseek-chat");
        assert_eq!(config.judge.api_key_env, "DEEPSEEK_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[judge]"));
        assert!(toml_str.contains("[analysis]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [analysis]
            mode = "serial"
            serial_delay_ms = 500
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.analysis.mode, "serial");
        assert_eq!(config.analysis.serial_delay_ms, 500);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.judge.timeout_secs, 60);
    }

    #[test]
    fn test_unknown_mode_fails_validation() {
        let mut config = Config::default();
        config.analysis.mode = "turbo".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_review_page_url_slug() {
        let scraper = ScraperConfig::default();
        let url = scraper.review_page_url("Knives Out!").unwrap();
        assert_eq!(
            url,
            "https://www.rottentomatoes.com/m/knives_out/reviews?type=user"
        );
    }
}
