//! シート → ドメイン行の変換
//!
//! 列の有無チェックと型変換のみ行う。値の妥当性検証はしない。

use crate::error::{Error, Result};
use crate::types::{
    Corridor, ImageEntry, ProgressPoint, StationProgress, Table, WorkItem,
};

/// 画像シートの更新日列（先に見つかった列を使う）
const IMAGE_DATE_COLUMNS: &[&str] = &["Updated on", "Update Date", "Date"];

fn invalid(table: &Table, row: usize, message: String) -> Error {
    Error::InvalidCell {
        sheet: table.name.clone(),
        // ヘッダー行を1行目として数える
        row: row + 2,
        message,
    }
}

/// 数値列（空セルは0扱い）
fn number_or_zero(table: &Table, row: usize, col: usize, column: &str) -> Result<f64> {
    let cell = table.cell(row, col);
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.as_f64()
        .ok_or_else(|| invalid(table, row, format!("{} is not a number: '{}'", column, cell)))
}

fn optional_number(table: &Table, row: usize, col: Option<usize>) -> Option<f64> {
    col.and_then(|c| table.cell(row, c).as_f64())
}

/// "Corridor Work" シートを作業項目に変換
///
/// 回廊が空の行（合計行など）は読み飛ばす。
pub fn work_items(table: &Table) -> Result<Vec<WorkItem>> {
    let corridor_col = table.require_column("Corridor")?;
    let section_col = table.require_column("Section")?;
    let task_group_col = table.require_column("Task Group")?;
    let breakdown_col = table.require_column("Work Breakdown")?;
    let planned_col = table.require_column("Planned")?;
    let actual_col = table.require_column("Actual")?;
    let size_col = table.column_index("Size");
    let identifier_col = table.column_index("Identifier");

    let mut items = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let corridor_cell = table.cell(row, corridor_col);
        if corridor_cell.is_empty() {
            continue;
        }
        let corridor: Corridor = corridor_cell
            .text()
            .parse()
            .map_err(|e: String| invalid(table, row, e))?;

        let identifier = identifier_col
            .map(|c| table.cell(row, c).text())
            .filter(|s| !s.is_empty());

        items.push(WorkItem {
            corridor,
            section: table.cell(row, section_col).text(),
            task_group: table.cell(row, task_group_col).text(),
            work_breakdown: table.cell(row, breakdown_col).text(),
            size: size_col.map(|c| table.cell(row, c).text()).unwrap_or_default(),
            planned: number_or_zero(table, row, planned_col, "Planned")?,
            actual: number_or_zero(table, row, actual_col, "Actual")?,
            identifier,
        });
    }

    Ok(items)
}

/// "Progress" シートを進捗点に変換（日付のない行は読み飛ばす）
pub fn progress_points(table: &Table) -> Result<Vec<ProgressPoint>> {
    let date_col = table.require_column("Date")?;
    let baseline_col = table.require_column("Baseline")?;
    let actual_col = table.column_index("Actual");

    let mut points = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let cell = table.cell(row, date_col);
        if cell.is_empty() {
            continue;
        }
        let date = cell
            .as_datetime()
            .ok_or_else(|| invalid(table, row, format!("Date is not a date: '{}'", cell)))?;

        points.push(ProgressPoint {
            date,
            baseline: optional_number(table, row, Some(baseline_col)),
            actual: optional_number(table, row, actual_col),
        });
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}

/// "images" シートを画像エントリに変換
pub fn image_entries(table: &Table) -> Result<Vec<ImageEntry>> {
    let image_col = table.require_column("image")?;
    let date_col = IMAGE_DATE_COLUMNS
        .iter()
        .find_map(|name| table.column_index(name));

    Ok((0..table.len())
        .filter_map(|row| {
            let image = table.cell(row, image_col).text();
            if image.is_empty() {
                return None;
            }
            let updated_on = date_col.and_then(|c| table.cell(row, c).as_datetime());
            Some(ImageEntry { image, updated_on })
        })
        .collect())
}

/// 駅別進捗シートを変換（進捗は0-1の比率 → %）
pub fn station_progress(table: &Table) -> Result<Vec<StationProgress>> {
    let station_col = table.require_column("Station Name")?;
    let package_col = table.require_column("Contract Package")?;
    let progress_col = table.require_column("Work Progress")?;
    let baseline_col = table.require_column("Baseline Progress")?;

    let mut rows = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let station_name = table.cell(row, station_col).text();
        if station_name.is_empty() {
            continue;
        }
        rows.push(StationProgress {
            station_name,
            contract_package: table.cell(row, package_col).text(),
            work_progress: number_or_zero(table, row, progress_col, "Work Progress")? * 100.0,
            baseline_progress: number_or_zero(table, row, baseline_col, "Baseline Progress")?
                * 100.0,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn corridor_table(rows: Vec<Vec<Cell>>) -> Table {
        Table::new(
            "Corridor Work",
            [
                "Corridor",
                "Section",
                "Task Group",
                "Work Breakdown",
                "Size",
                "Planned",
                "Actual",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            rows,
        )
    }

    #[test]
    fn test_work_items_basic() {
        let table = corridor_table(vec![
            vec![
                text("East"),
                Cell::Number(1.0),
                text("Utility Laying"),
                text("DWASA"),
                text("300mm"),
                Cell::Number(100.0),
                Cell::Number(40.0),
            ],
            vec![Cell::Empty, Cell::Empty, text("Total")],
        ]);

        let items = work_items(&table).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].corridor, Corridor::East);
        assert_eq!(items[0].section, "1");
        assert_eq!(items[0].size, "300mm");
        assert_eq!(items[0].progress_pct(), Some(40.0));
        assert_eq!(items[0].identifier, None);
    }

    #[test]
    fn test_work_items_missing_column() {
        let table = Table::new("Corridor Work", vec!["Corridor".to_string()], vec![]);
        let err = work_items(&table).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "Section"));
    }

    #[test]
    fn test_work_items_bad_number() {
        let table = corridor_table(vec![vec![
            text("West"),
            text("A"),
            text("Excavation"),
            text("Trench"),
            Cell::Empty,
            text("lots"),
            Cell::Number(1.0),
        ]]);
        let err = work_items(&table).unwrap_err();
        assert!(matches!(err, Error::InvalidCell { row: 2, .. }));
    }

    #[test]
    fn test_work_items_empty_numbers_are_zero() {
        let table = corridor_table(vec![vec![
            text("West"),
            text("A"),
            text("Excavation"),
            text("Trench"),
            Cell::Empty,
            Cell::Number(10.0),
            Cell::Empty,
        ]]);
        let items = work_items(&table).unwrap();
        assert_eq!(items[0].actual, 0.0);
    }

    #[test]
    fn test_progress_points_sorted() {
        let table = Table::new(
            "Progress",
            vec!["Date".into(), "Baseline".into(), "Actual".into()],
            vec![
                vec![text("2025-03-15"), Cell::Number(20.0), Cell::Empty],
                vec![text("2025-03-01"), Cell::Number(10.0), Cell::Number(8.0)],
            ],
        );
        let points = progress_points(&table).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].date < points[1].date);
        assert_eq!(points[0].actual, Some(8.0));
        assert_eq!(points[1].actual, None);
    }

    #[test]
    fn test_image_entries_optional_date() {
        let table = Table::new(
            "images",
            vec!["image".into(), "Updated on".into()],
            vec![
                vec![text("plan.jpg"), text("2025-02-01")],
                vec![text("s1.jpg"), Cell::Empty],
                vec![Cell::Empty, Cell::Empty],
            ],
        );
        let entries = image_entries(&table).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].updated_on.is_some());
        assert!(entries[1].updated_on.is_none());
    }

    #[test]
    fn test_station_progress_scaled() {
        let table = Table::new(
            "Overview",
            vec![
                "Station Name".into(),
                "Contract Package".into(),
                "Work Progress".into(),
                "Baseline Progress".into(),
            ],
            vec![vec![
                text("Badda"),
                text("CP-07"),
                Cell::Number(0.425),
                Cell::Number(0.5),
            ]],
        );
        let rows = station_progress(&table).unwrap();
        assert!((rows[0].work_progress - 42.5).abs() < 1e-9);
        assert!((rows[0].baseline_progress - 50.0).abs() < 1e-9);
    }
}
