//! レイアウト定数
//!
//! 日報PDFの寸法（A4縦）とグラフの配色。PDF側はmm、グラフ側はpx。

/// A4 縦
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 18.0;

pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const HEADING_FONT_SIZE: f32 = 11.0;
pub const BODY_FONT_SIZE: f32 = 9.0;

/// 表の1行の高さ
pub const ROW_HEIGHT_MM: f32 = 7.5;
/// 署名欄の空行
pub const SIGNATURE_ROW_HEIGHT_MM: f32 = 12.7;
/// 写真グリッドのセル
pub const PHOTO_CELL_WIDTH_MM: f32 = 76.2;
pub const PHOTO_CELL_HEIGHT_MM: f32 = 50.8;
pub const PHOTO_GRID_COLUMNS: usize = 2;

/// 表の列幅（インチ）
pub const BASIC_INFO_COLUMNS_IN: &[f32] = &[1.2, 2.3, 1.0, 2.0];
pub const CONDITIONS_COLUMNS_IN: &[f32] = &[1.0, 1.2, 1.2, 1.0, 2.1];
pub const PROGRESS_COLUMNS_IN: &[f32] = &[1.2, 2.3, 1.2, 1.8];
pub const SIGNATURE_COLUMNS_IN: &[f32] = &[1.5, 1.5, 1.5, 1.5];

pub const MM_PER_INCH: f32 = 25.4;

pub fn inch_to_mm(inch: f32) -> f32 {
    inch * MM_PER_INCH
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / MM_PER_INCH
}

/// 列幅（インチ）→ 各列の左端X（mm）
pub fn column_offsets_mm(left_mm: f32, widths_in: &[f32]) -> Vec<f32> {
    let mut x = left_mm;
    widths_in
        .iter()
        .map(|w| {
            let start = x;
            x += inch_to_mm(*w);
            start
        })
        .collect()
}

pub fn table_width_mm(widths_in: &[f32]) -> f32 {
    widths_in.iter().map(|w| inch_to_mm(*w)).sum()
}

/// 表を中央寄せしたときの左端X（mm）
pub fn centered_left_mm(widths_in: &[f32]) -> f32 {
    (PAGE_WIDTH_MM - table_width_mm(widths_in)) / 2.0
}

/// RGB（0-255）
pub type Rgb = (u8, u8, u8);

pub const BLACK: Rgb = (0, 0, 0);
pub const WHITE: Rgb = (255, 255, 255);
pub const RED: Rgb = (255, 0, 0);
pub const LIGHT_GREY: Rgb = (211, 211, 211);
pub const LINEN: Rgb = (250, 240, 230);
pub const TREND_ORANGE: Rgb = (255, 79, 15);

pub const SKY_BLUE: Rgb = (135, 206, 235);
pub const SEA_GREEN: Rgb = (46, 139, 87);
pub const MAGENTA: Rgb = (255, 0, 255);
pub const CRIMSON: Rgb = (220, 20, 60);
pub const CORAL: Rgb = (255, 127, 80);

/// 計画・実績バー
pub const PLANNED_COLOR: Rgb = (31, 119, 180);
pub const ACTUAL_COLOR: Rgb = (255, 127, 14);

/// 名前の決まっていない系列用
pub const FALLBACK_PALETTE: &[Rgb] = &[
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
];

/// 契約パッケージ用（Set1）
pub const SET1_PALETTE: &[Rgb] = &[
    (228, 26, 28),
    (55, 126, 184),
    (77, 175, 74),
    (152, 78, 163),
    (255, 127, 0),
    (255, 255, 51),
    (166, 86, 40),
    (247, 129, 191),
    (153, 153, 153),
];

/// 埋設機関の色（未登録の機関は出現順にフォールバック）
pub fn agency_color(agency: &str, fallback_index: usize) -> Rgb {
    match agency.trim() {
        "DWASA" => SKY_BLUE,
        "DNCC Drainage" => SEA_GREEN,
        "TITAS" => MAGENTA,
        "BTCL" => CRIMSON,
        "Pvt. Communication Cable" => CORAL,
        _ => FALLBACK_PALETTE[fallback_index % FALLBACK_PALETTE.len()],
    }
}

/// 土木工事（Task Group）の色
pub fn civil_color(task_group: &str) -> Rgb {
    match task_group {
        "Road Reinstatement" => SKY_BLUE,
        "Excavation" => CORAL,
        _ => LIGHT_GREY,
    }
}

pub fn set1_color(index: usize) -> Rgb {
    SET1_PALETTE[index % SET1_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_pt() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_tables_fit_on_page() {
        for widths in [
            BASIC_INFO_COLUMNS_IN,
            CONDITIONS_COLUMNS_IN,
            PROGRESS_COLUMNS_IN,
            SIGNATURE_COLUMNS_IN,
        ] {
            assert!(table_width_mm(widths) <= PAGE_WIDTH_MM - 2.0 * MARGIN_MM + 1.0);
            assert!(centered_left_mm(widths) > 0.0);
        }
    }

    #[test]
    fn test_column_offsets() {
        let offsets = column_offsets_mm(10.0, &[1.0, 2.0]);
        assert_eq!(offsets.len(), 2);
        assert!((offsets[1] - 35.4).abs() < 1e-4);
    }

    #[test]
    fn test_agency_colors() {
        assert_eq!(agency_color("DWASA", 0), SKY_BLUE);
        assert_eq!(agency_color("BTCL", 3), CRIMSON);
        assert_eq!(agency_color("Unknown", 1), FALLBACK_PALETTE[1]);
        assert_eq!(civil_color("Excavation"), CORAL);
        assert_eq!(set1_color(SET1_PALETTE.len()), SET1_PALETTE[0]);
    }
}
