use anyhow::{Context, Result, anyhow};
use image::imageops::FilterType;
use progress_common::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use progress_common::types::{SHEET_CORRIDOR_WORK, SHEET_IMAGES, SHEET_PROGRESS};
use progress_common::{ReportRecord, load_workbook, sheets};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Settings, StationData};

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}

pub fn load_settings() -> Result<Settings> {
    let Some(path) = config_path().filter(|p| p.exists()) else {
        return Ok(Settings::default());
    };
    let content = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let settings = serde_json::from_str(&content)
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(settings)
}

/// 駅のワークブックを丸ごと読み込む（images シートはなくてもよい）
pub fn load_station(settings: &Settings, station: &str) -> Result<StationData> {
    let path = settings
        .workbook_path(station)
        .ok_or_else(|| anyhow!("Unknown station: {station}"))?;
    let sheet_set = load_workbook(&path).with_context(|| format!("load {}", path.display()))?;

    let items = sheets::work_items(sheet_set.sheet(SHEET_CORRIDOR_WORK)?)?;
    let points = sheets::progress_points(sheet_set.sheet(SHEET_PROGRESS)?)?;
    let images = match sheet_set.sheet(SHEET_IMAGES) {
        Ok(table) => sheets::image_entries(table)?,
        Err(_) => Vec::new(),
    };

    Ok(StationData {
        name: station.to_string(),
        sheets: sheet_set,
        items,
        points,
        images,
    })
}

pub struct DecodedImage {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}

/// `exact` 指定時はその大きさに揃え、なければ長辺 `max` に収める
pub fn decode_image(path: &Path, exact: Option<(u32, u32)>, max: u32) -> Result<DecodedImage> {
    let image = image::open(path)?;
    let image = match exact {
        Some((w, h)) => image.resize_exact(w, h, FilterType::Triangle),
        None => image.thumbnail(max, max),
    };
    Ok(DecodedImage {
        size: [image.width() as usize, image.height() as usize],
        pixels: image.to_rgba8().into_raw(),
    })
}

pub fn work_dir() -> PathBuf {
    std::env::temp_dir().join("progress-dashboard")
}

/// CLIに渡す入力ファイルを書き出す
pub fn write_record(record: &ReportRecord) -> Result<PathBuf> {
    let dir = work_dir();
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join("report_input.json");
    let content = serde_json::to_string_pretty(record)?;
    fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn copy_report(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).with_context(|| format!("copy {} -> {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_record_round_trip() {
        let record = ReportRecord {
            contractor_name: "ABC Builders".into(),
            ..Default::default()
        };
        let path = write_record(&record).unwrap();
        let back: ReportRecord =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back.contractor_name, "ABC Builders");
    }

    #[test]
    fn test_unknown_station() {
        let err = load_station(&Settings::default(), "Gulshan").err().unwrap();
        assert!(err.to_string().contains("Gulshan"));
    }
}
