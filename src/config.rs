use crate::catalog::{default_stations, StationEntry};
use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use progress_common::aggregate::default_scurve_cutoff;
use progress_common::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use progress_common::defaults::PASSCODE_ENV;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 駅ワークブックの置き場所
    pub data_dir: PathBuf,
    /// 画像フォルダ（未指定なら data_dir/images）
    pub image_dir: Option<PathBuf>,
    pub stations: Vec<StationEntry>,
    /// S字カーブの実績打ち切り日
    pub scurve_cutoff: NaiveDate,
    pub passcode: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            image_dir: None,
            stations: default_stations(),
            scurve_cutoff: default_scurve_cutoff(),
            passcode: None,
            output_dir: None,
            chart_width: 1000,
            chart_height: 600,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DashboardError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    pub fn image_dir(&self) -> PathBuf {
        self.image_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("images"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn chart_size(&self) -> (u32, u32) {
        (self.chart_width.max(200), self.chart_height.max(150))
    }

    pub fn get_passcode(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(code) = std::env::var(PASSCODE_ENV) {
            return Ok(code);
        }

        self.passcode.clone().ok_or(DashboardError::MissingPasscode)
    }

    pub fn set_passcode(&mut self, code: String) -> Result<()> {
        self.passcode = Some(code);
        self.save()
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) -> Result<()> {
        if !dir.is_dir() {
            return Err(DashboardError::FolderNotFound(dir.display().to_string()));
        }
        self.data_dir = dir;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stations.len(), 6);
        assert_eq!(config.image_dir(), PathBuf::from("./images"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.data_dir = PathBuf::from("/srv/progress");
        config.passcode = Some("1234".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data_dir, PathBuf::from("/srv/progress"));
        assert_eq!(loaded.passcode.as_deref(), Some("1234"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"scurve_cutoff": "2025-04-01"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.scurve_cutoff,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert_eq!(config.chart_size(), (1000, 600));
    }
}
