mod exif;

use crate::error::{DashboardError, Result};
use chrono::NaiveDateTime;
use progress_common::ImageEntry;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use self::exif::extract_datetime;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub date: Option<NaiveDateTime>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// "images" シートの行を画像ファイルに対応付ける
///
/// シートに日付がなければEXIFの撮影日時を使う。並び順はシートのまま。
pub fn resolve_entries(entries: &[ImageEntry], image_dir: &Path) -> Vec<ImageInfo> {
    entries
        .iter()
        .map(|entry| {
            let path = image_dir.join(&entry.image);
            let file_name = Path::new(&entry.image)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| entry.image.clone());
            let date = entry.updated_on.or_else(|| extract_datetime(&path));
            ImageInfo {
                path,
                file_name,
                date,
            }
        })
        .collect()
}

/// フォルダ直下の画像（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(DashboardError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| ImageInfo {
            path: e.path().to_path_buf(),
            file_name: e.file_name().to_string_lossy().to_string(),
            date: extract_datetime(e.path()),
        })
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("PNG"));
        assert!(!is_image_extension("xlsx"));
    }

    #[test]
    fn test_scan_folder_not_found() {
        assert!(matches!(
            scan_folder(Path::new("/nonexistent/folder")),
            Err(DashboardError::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_scan_folder_sorted() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("c.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("a.png")).unwrap().write_all(b"dummy").unwrap();
        fs::write(dir.path().join("readme.txt"), "text").unwrap();

        let result = scan_folder(dir.path()).unwrap();
        let names: Vec<&str> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.jpg"]);
    }

    #[test]
    fn test_resolve_entries_keeps_sheet_order_and_dates() {
        let updated = NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let entries = vec![
            ImageEntry {
                image: "plan.jpg".into(),
                updated_on: Some(updated),
            },
            ImageEntry {
                image: "sub/s1.jpg".into(),
                updated_on: None,
            },
        ];
        let infos = resolve_entries(&entries, Path::new("/img"));
        assert_eq!(infos[0].path, PathBuf::from("/img/plan.jpg"));
        assert_eq!(infos[0].date, Some(updated));
        assert_eq!(infos[1].file_name, "s1.jpg");
        assert_eq!(infos[1].date, None);
    }
}
