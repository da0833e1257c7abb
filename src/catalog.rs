//! 駅カタログ（駅名 → ワークブック）

use crate::error::{DashboardError, Result};
use lazy_static::lazy_static;
use progress_common::defaults::DEFAULT_STATIONS;
use progress_common::Error as CommonError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    /// 先頭の駅番号（s05_ など）
    static ref STATION_PREFIX: Regex = Regex::new(r"(?i)^s\d+_").unwrap();
    /// 末尾の _progress
    static ref PROGRESS_SUFFIX: Regex = Regex::new(r"(?i)_progress$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub file: String,
}

impl StationEntry {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
        }
    }
}

/// 既定の駅一覧（表示順）
pub fn default_stations() -> Vec<StationEntry> {
    DEFAULT_STATIONS
        .iter()
        .map(|(name, file)| StationEntry::new(name, file))
        .collect()
}

#[derive(Debug, Clone)]
pub struct StationCatalog {
    data_dir: PathBuf,
    entries: Vec<StationEntry>,
}

impl StationCatalog {
    pub fn new(data_dir: impl Into<PathBuf>, entries: Vec<StationEntry>) -> Self {
        Self {
            data_dir: data_dir.into(),
            entries,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn entries(&self) -> &[StationEntry] {
        &self.entries
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 駅名からワークブックのパスを引く（大文字小文字は区別しない）
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| self.data_dir.join(&e.file))
            .ok_or_else(|| CommonError::UnknownStation(name.to_string()).into())
    }

    /// カタログ上の正式な駅名
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.name.as_str())
    }
}

/// データフォルダで見つかったワークブック
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredWorkbook {
    pub path: PathBuf,
    /// ファイル名から推定した駅名
    pub station: String,
}

/// "s05_aftab_nagar_progress.xlsx" → "Aftab Nagar"
pub fn station_name_from_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = STATION_PREFIX.replace(&stem, "");
    let stem = PROGRESS_SUFFIX.replace(&stem, "");

    stem.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// フォルダ直下の .xlsx を列挙（Excelのロックファイル ~$ は除く）
pub fn discover(dir: &Path) -> Result<Vec<DiscoveredWorkbook>> {
    if !dir.exists() {
        return Err(DashboardError::FolderNotFound(dir.display().to_string()));
    }

    let mut found: Vec<DiscoveredWorkbook> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            !name.starts_with("~$")
                && e.path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
                    .unwrap_or(false)
        })
        .map(|e| DiscoveredWorkbook {
            station: station_name_from_file(e.path()),
            path: e.path().to_path_buf(),
        })
        .collect();

    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_catalog_order() {
        let catalog = StationCatalog::new("/data", default_stations());
        assert_eq!(
            catalog.names(),
            vec!["Aftab Nagar", "Nadda", "Natun Bazar", "Badda", "Rampura", "Malibagh"]
        );
        assert_eq!(
            catalog.path_for("aftab nagar").unwrap(),
            PathBuf::from("/data/s05_aftab_nagar_progress.xlsx")
        );
    }

    /// 既定のワークブック名からは同じ駅名が復元できる
    #[test]
    fn test_default_files_name_their_stations() {
        for (name, file) in DEFAULT_STATIONS {
            assert_eq!(station_name_from_file(Path::new(file)), *name);
        }
    }

    #[test]
    fn test_unknown_station() {
        let catalog = StationCatalog::new("/data", default_stations());
        let err = catalog.path_for("Kamlapur").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Common(CommonError::UnknownStation(_))
        ));
    }

    #[test]
    fn test_station_name_from_file() {
        assert_eq!(
            station_name_from_file(Path::new("s05_aftab_nagar_progress.xlsx")),
            "Aftab Nagar"
        );
        assert_eq!(
            station_name_from_file(Path::new("natun_bazar_progress.xlsx")),
            "Natun Bazar"
        );
        assert_eq!(station_name_from_file(Path::new("Badda.xlsx")), "Badda");
    }

    #[test]
    fn test_discover_xlsx_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("badda_progress.xlsx"), b"").unwrap();
        std::fs::write(dir.path().join("~$badda_progress.xlsx"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].station, "Badda");
    }

    #[test]
    fn test_discover_missing_folder() {
        assert!(matches!(
            discover(Path::new("/nonexistent/data/dir")),
            Err(DashboardError::FolderNotFound(_))
        ));
    }
}
