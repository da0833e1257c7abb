//! 作業内訳のExcel出力（rust_xlsxwriter）

use crate::breakdown::BreakdownView;
use crate::error::{DashboardError, Result};
use rust_xlsxwriter::*;
use std::path::Path;

const HEADERS: &[&str] = &[
    "Task Group",
    "Section",
    "Work Breakdown",
    "Size",
    "Planned",
    "Actual",
    "Progress (%)",
];

fn excel_error(e: XlsxError) -> DashboardError {
    DashboardError::ExcelGeneration(e.to_string())
}

/// 絞り込み結果をバッファに書き出す
pub fn generate_breakdown_buffer(view: &BreakdownView) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(13.0);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let group_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF2F2F2))
        .set_border(FormatBorder::Thin);
    let value_format = Format::new().set_border(FormatBorder::Thin);
    let number_format = Format::new()
        .set_num_format("#,##0.00")
        .set_border(FormatBorder::Thin);
    let percent_format = Format::new()
        .set_num_format("0.0")
        .set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(view.corridor.as_str())
        .map_err(excel_error)?;
    worksheet.set_column_width(0, 20).map_err(excel_error)?;
    worksheet.set_column_width(1, 10).map_err(excel_error)?;
    worksheet.set_column_width(2, 32).map_err(excel_error)?;
    worksheet.set_column_width(3, 12).map_err(excel_error)?;
    worksheet.set_column_range_width(4, 6, 14).map_err(excel_error)?;

    worksheet
        .write_string_with_format(0, 0, view.heading(), &title_format)
        .map_err(excel_error)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(2, col as u16, *header, &header_format)
            .map_err(excel_error)?;
    }

    let mut row: u32 = 3;
    for group in &view.groups {
        worksheet
            .write_string_with_format(row, 0, &group.task_group, &group_format)
            .map_err(excel_error)?;
        worksheet
            .write_number_with_format(row, 4, group.totals.planned, &group_format)
            .map_err(excel_error)?;
        worksheet
            .write_number_with_format(row, 5, group.totals.actual, &group_format)
            .map_err(excel_error)?;
        if let Some(pct) = group.totals.completion() {
            worksheet
                .write_number_with_format(row, 6, pct, &group_format)
                .map_err(excel_error)?;
        }
        row += 1;

        for item in &group.rows {
            worksheet
                .write_string_with_format(row, 1, &item.section, &value_format)
                .map_err(excel_error)?;
            worksheet
                .write_string_with_format(row, 2, &item.work_breakdown, &value_format)
                .map_err(excel_error)?;
            worksheet
                .write_string_with_format(row, 3, &item.size, &value_format)
                .map_err(excel_error)?;
            worksheet
                .write_number_with_format(row, 4, item.planned, &number_format)
                .map_err(excel_error)?;
            worksheet
                .write_number_with_format(row, 5, item.actual, &number_format)
                .map_err(excel_error)?;
            // 計画0の行は空欄
            if let Some(pct) = item.progress {
                worksheet
                    .write_number_with_format(row, 6, pct, &percent_format)
                    .map_err(excel_error)?;
            }
            row += 1;
        }
    }

    worksheet.set_freeze_panes(3, 0).map_err(excel_error)?;

    workbook.save_to_buffer().map_err(excel_error)
}

pub fn generate_breakdown_excel(view: &BreakdownView, output_path: &Path) -> Result<()> {
    let buffer = generate_breakdown_buffer(view)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}
