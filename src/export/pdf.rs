//! 日報PDF生成（printpdf）
//!
//! 表の中身は `progress_common::report::build_report_content` で組み立て、
//! ここでは罫線・文字・写真を配置するだけ。

use crate::error::{DashboardError, Result};
use printpdf::image_crate::{self, DynamicImage};
use printpdf::*;
use progress_common::layout::{
    self, centered_left_mm, column_offsets_mm, inch_to_mm, BASIC_INFO_COLUMNS_IN,
    BODY_FONT_SIZE, CONDITIONS_COLUMNS_IN, HEADING_FONT_SIZE, MARGIN_MM, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM, PHOTO_CELL_HEIGHT_MM, PHOTO_CELL_WIDTH_MM, PHOTO_GRID_COLUMNS,
    PROGRESS_COLUMNS_IN, ROW_HEIGHT_MM, SIGNATURE_COLUMNS_IN, SIGNATURE_ROW_HEIGHT_MM,
    TITLE_FONT_SIZE,
};
use progress_common::report::{
    build_report_content, ReportCell, ReportGrid, ReportRecord, MAX_REPORT_IMAGES,
};
use std::path::Path;

const PT_TO_MM: f32 = 0.3528;
const IMAGE_DPI: f32 = 300.0;
const CHECKBOX_MM: f32 = 2.6;
const SECTION_GAP_MM: f32 = 5.0;
const LINE_GAP_MM: f32 = 4.5;

/// 日報に添付する写真
#[derive(Debug, Clone)]
pub struct ReportImage {
    pub name: String,
    pub data: Vec<u8>,
}

impl ReportImage {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| DashboardError::ImageLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            data,
        })
    }
}

fn pdf_error<E: std::fmt::Debug>(e: E) -> DashboardError {
    DashboardError::PdfGeneration(format!("{:?}", e))
}

/// Helvetica の概算文字幅（mm）
fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5 * PT_TO_MM
}

/// 幅に収まるよう単語単位で折り返す
pub fn wrap_text(text: &str, width_mm: f32, font_size: f32) -> Vec<String> {
    let max_chars = ((width_mm / (font_size * 0.5 * PT_TO_MM)) as usize).max(8);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// 列幅に収まらない文字列を切り詰める
fn fit_text(text: &str, width_mm: f32, font_size: f32) -> String {
    let max_chars = (width_mm / (font_size * 0.5 * PT_TO_MM)) as usize;
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars.saturating_sub(2)).collect();
        cut.push_str("..");
        cut
    }
}

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// 次に描く要素の上端（mm、下から）
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.set_outline_thickness(0.5);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    /// 残りが足りなければ改ページ
    fn ensure_space(&mut self, height_mm: f32) {
        if self.y - height_mm >= MARGIN_MM {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.5);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn line(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }

    /// 左上 (x, top) から幅 w・高さ h の枠
    fn frame(&self, x: f32, top: f32, w: f32, h: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(top)), false),
                (Point::new(Mm(x + w), Mm(top)), false),
                (Point::new(Mm(x + w), Mm(top - h)), false),
                (Point::new(Mm(x), Mm(top - h)), false),
            ],
            is_closed: true,
        });
    }

    fn checkbox(&self, x: f32, baseline: f32, checked: bool) {
        let top = baseline + CHECKBOX_MM - 0.3;
        self.frame(x, top, CHECKBOX_MM, CHECKBOX_MM);
        if checked {
            self.line((x, top), (x + CHECKBOX_MM, top - CHECKBOX_MM));
            self.line((x, top - CHECKBOX_MM), (x + CHECKBOX_MM, top));
        }
    }

    fn centered_title(&mut self, text: &str) {
        let x = (PAGE_WIDTH_MM - text_width_mm(text, TITLE_FONT_SIZE)) / 2.0;
        self.y -= TITLE_FONT_SIZE * PT_TO_MM;
        self.text(text, TITLE_FONT_SIZE, x, self.y, true);
        self.y -= SECTION_GAP_MM * 2.0;
    }

    fn heading(&mut self, text: &str) {
        self.ensure_space(LINE_GAP_MM * 3.0);
        self.y -= HEADING_FONT_SIZE * PT_TO_MM;
        self.text(text, HEADING_FONT_SIZE, MARGIN_MM, self.y, true);
        self.y -= 2.5;
    }

    fn paragraph(&mut self, text: &str) {
        let width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        for line in wrap_text(text, width, BODY_FONT_SIZE) {
            self.ensure_space(LINE_GAP_MM);
            self.y -= LINE_GAP_MM;
            self.text(&line, BODY_FONT_SIZE, MARGIN_MM, self.y, false);
        }
        self.y -= SECTION_GAP_MM;
    }

    fn grid(&mut self, grid: &ReportGrid, widths_in: &[f32], row_heights: &[f32]) {
        let total: f32 = (0..grid.len())
            .map(|r| row_heights.get(r).copied().unwrap_or(ROW_HEIGHT_MM))
            .sum();
        self.ensure_space(total);

        let left = centered_left_mm(widths_in);
        let offsets = column_offsets_mm(left, widths_in);

        for (r, row) in grid.iter().enumerate() {
            let height = row_heights.get(r).copied().unwrap_or(ROW_HEIGHT_MM);
            let top = self.y;
            let baseline = top - height / 2.0 - BODY_FONT_SIZE * PT_TO_MM / 3.0;

            for (c, cell) in row.iter().enumerate() {
                let (Some(&x), Some(&w)) = (offsets.get(c), widths_in.get(c)) else {
                    continue;
                };
                let width = inch_to_mm(w);
                self.frame(x, top, width, height);
                self.cell(cell, x + 1.5, baseline, width - 3.0);
            }
            self.y -= height;
        }
        self.y -= SECTION_GAP_MM;
    }

    fn cell(&self, cell: &ReportCell, x: f32, baseline: f32, width: f32) {
        match cell {
            ReportCell::Label(text) => {
                self.text(&fit_text(text, width, BODY_FONT_SIZE), BODY_FONT_SIZE, x, baseline, true)
            }
            ReportCell::Value(text) => {
                self.text(&fit_text(text, width, BODY_FONT_SIZE), BODY_FONT_SIZE, x, baseline, false)
            }
            ReportCell::Checks(items) => {
                let mut cx = x;
                for (label, checked) in items {
                    self.checkbox(cx, baseline, *checked);
                    cx += CHECKBOX_MM + 1.0;
                    self.text(label, BODY_FONT_SIZE, cx, baseline, false);
                    cx += text_width_mm(label, BODY_FONT_SIZE) + 4.0;
                }
            }
        }
    }

    /// 2列の写真グリッド（空き枠は "No Image"、読めない画像は "Img N: Error"）
    fn photo_grid(&mut self, images: &[ReportImage]) {
        let rows = MAX_REPORT_IMAGES.div_ceil(PHOTO_GRID_COLUMNS);
        let grid_width = PHOTO_CELL_WIDTH_MM * PHOTO_GRID_COLUMNS as f32;
        let left = (PAGE_WIDTH_MM - grid_width) / 2.0;

        self.ensure_space(PHOTO_CELL_HEIGHT_MM * rows as f32 + LINE_GAP_MM * 3.0);
        self.heading("Site Photographs:");

        for row in 0..rows {
            let top = self.y;
            for col in 0..PHOTO_GRID_COLUMNS {
                let slot = row * PHOTO_GRID_COLUMNS + col;
                let x = left + col as f32 * PHOTO_CELL_WIDTH_MM;
                self.frame(x, top, PHOTO_CELL_WIDTH_MM, PHOTO_CELL_HEIGHT_MM);

                let placeholder = match images.get(slot) {
                    None => Some("No Image".to_string()),
                    Some(image) => match decode_image(&image.data) {
                        Ok(decoded) => {
                            self.place_image(&decoded, x, top);
                            None
                        }
                        Err(e) => {
                            log::warn!("image {} could not be decoded: {}", image.name, e);
                            Some(format!("Img {}: Error", slot + 1))
                        }
                    },
                };

                if let Some(text) = placeholder {
                    let tx = x + (PHOTO_CELL_WIDTH_MM - text_width_mm(&text, BODY_FONT_SIZE)) / 2.0;
                    let ty = top - PHOTO_CELL_HEIGHT_MM / 2.0;
                    self.text(&text, BODY_FONT_SIZE, tx, ty, false);
                }
            }
            self.y -= PHOTO_CELL_HEIGHT_MM;
        }
        self.y -= SECTION_GAP_MM;
    }

    /// 枠内に縦横比を保って中央配置
    fn place_image(&self, image: &DynamicImage, x: f32, top: f32) {
        let padding = 2.0;
        let box_w = PHOTO_CELL_WIDTH_MM - padding * 2.0;
        let box_h = PHOTO_CELL_HEIGHT_MM - padding * 2.0;

        let natural_w = image.width() as f32 / IMAGE_DPI * layout::MM_PER_INCH;
        let natural_h = image.height() as f32 / IMAGE_DPI * layout::MM_PER_INCH;
        if natural_w <= 0.0 || natural_h <= 0.0 {
            return;
        }
        let scale = (box_w / natural_w).min(box_h / natural_h);
        let w = natural_w * scale;
        let h = natural_h * scale;

        let pdf_image = Image::from_dynamic_image(image);
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x + padding + (box_w - w) / 2.0)),
                translate_y: Some(Mm(top - padding - box_h + (box_h - h) / 2.0)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

/// 透過情報は落としてRGBにする
fn decode_image(data: &[u8]) -> std::result::Result<DynamicImage, image_crate::ImageError> {
    let image = image_crate::load_from_memory(data)?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// 日報PDFをバイト列で生成
///
/// 必須項目が欠けていれば生成せずにエラーを返す。写真は先頭4枚まで。
pub fn generate_report_pdf(record: &ReportRecord, images: &[ReportImage]) -> Result<Vec<u8>> {
    record.validate()?;

    if images.len() > MAX_REPORT_IMAGES {
        log::warn!(
            "{} images given, only the first {} are placed",
            images.len(),
            MAX_REPORT_IMAGES
        );
    }
    let images = &images[..images.len().min(MAX_REPORT_IMAGES)];

    let content = build_report_content(record);
    let mut page = PageWriter::new(content.title)?;

    page.centered_title(content.title);
    page.grid(&content.basic_info, BASIC_INFO_COLUMNS_IN, &[]);
    page.grid(&content.conditions, CONDITIONS_COLUMNS_IN, &[]);
    page.grid(&content.progress, PROGRESS_COLUMNS_IN, &[]);

    for paragraph in &content.paragraphs {
        page.heading(paragraph.heading);
        page.paragraph(&paragraph.text);
    }

    if !images.is_empty() {
        page.photo_grid(images);
    }

    page.grid(
        &content.signature,
        SIGNATURE_COLUMNS_IN,
        &[ROW_HEIGHT_MM, SIGNATURE_ROW_HEIGHT_MM, ROW_HEIGHT_MM],
    );

    page.finish()
}

/// 日報PDFを出力フォルダに保存し、保存先を返す
pub fn write_report_pdf(
    record: &ReportRecord,
    images: &[ReportImage],
    output_dir: &Path,
) -> Result<std::path::PathBuf> {
    let bytes = generate_report_pdf(record, images)?;
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(record.file_name());
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("alpha beta gamma delta", 12.0, 9.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| !l.is_empty()));
        assert_eq!(wrap_text("", 100.0, 9.0), vec![String::new()]);
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("short", 50.0, 9.0), "short");
        let cut = fit_text(&"x".repeat(200), 20.0, 9.0);
        assert!(cut.ends_with(".."));
        assert!(cut.chars().count() < 200);
    }

    #[test]
    fn test_decode_invalid_image() {
        assert!(decode_image(b"not an image").is_err());
    }
}
