//! ワークブック読み込み（calamine）
//!
//! 全シートを読み、先頭行をヘッダーとして `Table` に変換する。

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};

use crate::dates;
use crate::error::{Error, Result};
use crate::types::{Cell, SheetSet, Table};

/// 駅ワークブックの読み込み口
///
/// セッションはこのトレイト越しに読み込むので、テストでは差し替えられる。
pub trait SheetLoader {
    fn load(&self, path: &Path) -> Result<SheetSet>;
}

/// calamine による xlsx 読み込み
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxLoader;

impl SheetLoader for XlsxLoader {
    fn load(&self, path: &Path) -> Result<SheetSet> {
        load_workbook(path)
    }
}

/// ワークブックの全シートを読み込む
pub fn load_workbook(path: &Path) -> Result<SheetSet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e: XlsxError| Error::Workbook(format!("{}: {}", path.display(), e)))?;

    let mut set = SheetSet::new(path.to_path_buf());
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::Workbook(format!("{} [{}]: {}", path.display(), name, e)))?;
        set.insert(range_to_table(&name, &range));
    }

    Ok(set)
}

/// 先頭行をヘッダーにして表へ変換
pub fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| convert_cell(c).text()).collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row: &Vec<Cell>| row.iter().any(|c| !c.is_empty()))
        .collect();

    Table::new(name, columns, rows)
}

/// calamine のセルを変換
pub fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => dates::parse_date_text(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#ERROR: {:?}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_scalars() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(
            convert_cell(&Data::String("East".into())),
            Cell::Text("East".into())
        );
        assert_eq!(convert_cell(&Data::Bool(true)), Cell::Bool(true));
    }

    #[test]
    fn test_convert_iso_datetime() {
        let cell = convert_cell(&Data::DateTimeIso("2025-03-05T00:00:00".into()));
        assert!(matches!(cell, Cell::Date(_)));
    }

    #[test]
    fn test_range_to_table_skips_blank_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Corridor".into()));
        range.set_value((0, 1), Data::String("Planned".into()));
        range.set_value((1, 0), Data::String("East".into()));
        range.set_value((1, 1), Data::Float(10.0));
        range.set_value((3, 0), Data::String("West".into()));

        let table = range_to_table("Corridor Work", &range);
        assert_eq!(table.columns, vec!["Corridor", "Planned"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 0), &Cell::Text("West".into()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_workbook(Path::new("/nonexistent/station.xlsx")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_load_non_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        let err = XlsxLoader.load(&path).unwrap_err();
        assert!(matches!(err, Error::Workbook(_)));
    }
}
