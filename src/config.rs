use crate::error::{AircraftIdError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 公開データセットのバケットURLを上書きする環境変数
pub const BUCKET_URL_ENV: &str = "AIRCRAFT_ID_BUCKET_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub download_threads: usize,
    pub confidence_threshold: f64,
    pub bucket_url: String,
    pub annotations_url: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_threads: 5,
            confidence_threshold: 0.25,
            bucket_url: "https://open-images-dataset.s3.amazonaws.com".into(),
            annotations_url: "https://storage.googleapis.com/openimages".into(),
            timeout_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AircraftIdError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("aircraft-id").join("config.json"))
    }

    /// バケットURL（環境変数を優先）
    pub fn bucket_url(&self) -> String {
        std::env::var(BUCKET_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.bucket_url.clone())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn set_download_threads(&mut self, threads: usize) -> Result<()> {
        if threads == 0 {
            return Err(AircraftIdError::Config("スレッド数は1以上を指定してください".into()));
        }
        self.download_threads = threads;
        self.save()
    }

    pub fn set_confidence_threshold(&mut self, threshold: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AircraftIdError::Config("信頼度の閾値は0.0〜1.0で指定してください".into()));
        }
        self.confidence_threshold = threshold;
        self.save()
    }

    pub fn set_bucket_url(&mut self, url: String) -> Result<()> {
        self.bucket_url = url;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.download_threads, 5);
        assert!((config.confidence_threshold - 0.25).abs() < f64::EPSILON);
        assert!(config.bucket_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"download_threads": 12}"#).unwrap();
        assert_eq!(config.download_threads, 12);
        assert_eq!(config.timeout_seconds, 60);
    }
}
