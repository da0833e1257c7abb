//! 工事写真ギャラリー
//!
//! 1枚目を平面図（Plan View）として全幅で、残りを800×400に揃えて2列で並べる。
//! 読めない画像はその枠だけエラー表示にして続行する。

use crate::scanner::ImageInfo;
use chrono::NaiveDateTime;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use indicatif::ProgressBar;
use progress_common::dates::ISSUE_DATE_FORMAT;
use rayon::prelude::*;
use std::io::Cursor;
use std::path::Path;

pub const TILE_SIZE: (u32, u32) = (800, 400);
const PLAN_MAX_WIDTH: u32 = 1600;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryTile {
    pub file: String,
    pub caption: String,
    /// PNGバイト列、または表示用のエラーメッセージ
    pub content: std::result::Result<Vec<u8>, String>,
    /// シートの "Updated on"、なければEXIFの撮影日時
    pub updated: Option<NaiveDateTime>,
}

impl GalleryTile {
    pub fn is_loaded(&self) -> bool {
        self.content.is_ok()
    }

    /// "Updated on 05-Mar-2025"
    pub fn updated_label(&self) -> Option<String> {
        self.updated
            .map(|d| format!("Updated on {}", d.format(ISSUE_DATE_FORMAT)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    pub station: String,
    pub plan: Option<GalleryTile>,
    pub sections: Vec<GalleryTile>,
}

impl Gallery {
    pub fn tiles(&self) -> impl Iterator<Item = &GalleryTile> {
        self.plan.iter().chain(self.sections.iter())
    }

    pub fn error_count(&self) -> usize {
        self.tiles().filter(|t| !t.is_loaded()).count()
    }

    /// 2枚ずつの行
    pub fn rows(&self) -> impl Iterator<Item = &[GalleryTile]> {
        self.sections.chunks(2)
    }
}

pub fn plan_caption(station: &str) -> String {
    format!("{} Plan View", station)
}

/// "sec_e1.jpg" → "Section: SEC_E1"
pub fn section_caption(file: &str) -> String {
    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("Section: {}", stem.to_uppercase())
}

fn encode_png(image: &DynamicImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn load_png(path: &Path, exact: Option<(u32, u32)>) -> std::result::Result<Vec<u8>, String> {
    let image = image::open(path).map_err(|e| e.to_string())?;
    let image = match exact {
        Some((w, h)) => image.resize_exact(w, h, FilterType::Triangle),
        None if image.width() > PLAN_MAX_WIDTH => {
            image.resize(PLAN_MAX_WIDTH, u32::MAX, FilterType::Triangle)
        }
        None => image,
    };
    encode_png(&image).map_err(|e| e.to_string())
}

fn load_tile(info: &ImageInfo, caption: String, exact: Option<(u32, u32)>) -> GalleryTile {
    let content = load_png(&info.path, exact).map_err(|e| {
        log::warn!("{}: {}", info.path.display(), e);
        format!("Error loading {}: {}", info.file_name, e)
    });
    GalleryTile {
        file: info.file_name.clone(),
        caption,
        content,
        updated: info.date,
    }
}

/// ギャラリーを組み立てる（区間写真は並列でリサイズ）
pub fn build_gallery(station: &str, images: &[ImageInfo], progress: Option<&ProgressBar>) -> Gallery {
    let Some((plan, rest)) = images.split_first() else {
        return Gallery {
            station: station.to_string(),
            plan: None,
            sections: Vec::new(),
        };
    };

    let plan = load_tile(plan, plan_caption(station), None);
    if let Some(pb) = progress {
        pb.inc(1);
    }

    let sections = rest
        .par_iter()
        .map(|info| {
            let tile = load_tile(info, section_caption(&info.file_name), Some(TILE_SIZE));
            if let Some(pb) = progress {
                pb.inc(1);
            }
            tile
        })
        .collect();

    Gallery {
        station: station.to_string(),
        plan: Some(plan),
        sections,
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn updated_html(tile: &GalleryTile) -> String {
    tile.updated_label()
        .map(|label| format!("<p class=\"updated\">{}</p>", label))
        .unwrap_or_default()
}

fn tile_html(tile: &GalleryTile) -> String {
    match &tile.content {
        Ok(png) => format!(
            "<div class=\"image-container\"><img src=\"data:image/png;base64,{}\"><p class=\"caption\">{}</p>{}</div>",
            STANDARD.encode(png),
            escape_html(&tile.caption),
            updated_html(tile)
        ),
        Err(message) => format!("<div class=\"error\">{}</div>", escape_html(message)),
    }
}

/// 画像を埋め込んだ単体HTML
pub fn render_html(gallery: &Gallery) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str(&format!(
        "<title>{} - Construction Progress Gallery</title>",
        escape_html(&gallery.station)
    ));
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2rem 5%;}\
         .grid{display:grid;grid-template-columns:1fr 1fr;gap:20px;}\
         .image-container{border:2px solid #4a4a4a;border-radius:10px;padding:10px;}\
         .image-container img{width:100%;height:auto;border-radius:5px;}\
         .caption,.plan-caption{text-align:center;font-weight:bold;font-size:24px;}\
         .updated{text-align:center;color:#666;font-size:14px;}\
         .error{color:#b00020;padding:10px;border:1px solid #b00020;border-radius:5px;}</style>",
    );
    html.push_str("</head><body>\n<h1>Construction Progress Gallery</h1>\n");

    if let Some(plan) = &gallery.plan {
        match &plan.content {
            Ok(png) => html.push_str(&format!(
                "<div class=\"plan\"><img style=\"width:100%\" src=\"data:image/png;base64,{}\"><p class=\"plan-caption\">{}</p>{}</div>\n",
                STANDARD.encode(png),
                escape_html(&plan.caption),
                updated_html(plan)
            )),
            Err(message) => html.push_str(&format!(
                "<div class=\"error\">{}</div>\n",
                escape_html(message)
            )),
        }
    }

    html.push_str("<div class=\"grid\">\n");
    for tile in &gallery.sections {
        html.push_str(&tile_html(tile));
        html.push('\n');
    }
    html.push_str("</div>\n</body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn info(path: PathBuf) -> ImageInfo {
        ImageInfo {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path,
            date: None,
        }
    }

    #[test]
    fn test_captions() {
        assert_eq!(plan_caption("Badda"), "Badda Plan View");
        assert_eq!(section_caption("sec_e1.jpg"), "Section: SEC_E1");
    }

    #[test]
    fn test_build_gallery_resizes_and_reports_errors() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("plan.png");
        let good = dir.path().join("e1.png");
        RgbImage::from_pixel(40, 30, Rgb([10, 20, 30])).save(&plan).unwrap();
        RgbImage::from_pixel(20, 20, Rgb([200, 0, 0])).save(&good).unwrap();
        let missing = dir.path().join("w2.jpg");

        let gallery = build_gallery("Nadda", &[info(plan), info(good), info(missing)], None);

        let plan = gallery.plan.as_ref().unwrap();
        assert_eq!(plan.caption, "Nadda Plan View");
        assert!(plan.is_loaded());

        assert_eq!(gallery.sections.len(), 2);
        let png = gallery.sections[0].content.as_ref().unwrap();
        let decoded = image::load_from_memory(png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), TILE_SIZE);

        let err = gallery.sections[1].content.as_ref().unwrap_err();
        assert!(err.starts_with("Error loading w2.jpg:"));
        assert_eq!(gallery.error_count(), 1);
    }

    #[test]
    fn test_tiles_carry_image_dates() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("plan.png");
        RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])).save(&plan).unwrap();
        let updated = chrono::NaiveDate::from_ymd_opt(2025, 2, 14)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut dated = info(plan);
        dated.date = Some(updated);

        let gallery = build_gallery("Badda", &[dated, info(dir.path().join("e1.jpg"))], None);
        let plan = gallery.plan.as_ref().unwrap();
        assert_eq!(plan.updated, Some(updated));
        assert_eq!(plan.updated_label().as_deref(), Some("Updated on 14-Feb-2025"));
        assert_eq!(gallery.sections[0].updated_label(), None);
        assert!(render_html(&gallery).contains("Updated on 14-Feb-2025"));
    }

    #[test]
    fn test_empty_gallery() {
        let gallery = build_gallery("Nadda", &[], None);
        assert!(gallery.plan.is_none());
        assert!(render_html(&gallery).contains("Construction Progress Gallery"));
    }

    #[test]
    fn test_render_html_embeds_base64() {
        let gallery = Gallery {
            station: "Badda".into(),
            plan: None,
            sections: vec![
                GalleryTile {
                    file: "a.png".into(),
                    caption: "Section: A".into(),
                    content: Ok(vec![1, 2, 3]),
                    updated: chrono::NaiveDate::from_ymd_opt(2025, 3, 5)
                        .unwrap()
                        .and_hms_opt(9, 0, 0),
                },
                GalleryTile {
                    file: "b.png".into(),
                    caption: "Section: B".into(),
                    content: Err("Error loading b.png: <bad>".into()),
                    updated: None,
                },
            ],
        };
        let html = render_html(&gallery);
        assert!(html.contains("data:image/png;base64,AQID"));
        assert!(html.contains("Error loading b.png: &lt;bad&gt;"));
        assert!(html.contains("<p class=\"updated\">Updated on 05-Mar-2025</p>"));
        assert_eq!(html.matches("Updated on").count(), 1);
        assert_eq!(gallery.rows().count(), 1);
    }
}
