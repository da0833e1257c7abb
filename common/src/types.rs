//! ワークブックとドメインの型定義
//!
//! - Cell / Table / SheetSet: シートをそのまま保持する汎用表
//! - WorkItem / ProgressPoint / ImageEntry / StationProgress: 各シートの行

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dates;
use crate::error::{Error, Result};

/// 必須シート名
pub const SHEET_CORRIDOR_WORK: &str = "Corridor Work";
pub const SHEET_PROGRESS: &str = "Progress";
pub const SHEET_ISSUE_LOG: &str = "Issue Log";
pub const SHEET_IMAGES: &str = "images";

/// セル値
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    /// 空セル（空白のみの文字列も含む）
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数値として取得（数値文字列も許容）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// 日時として取得（文字列・Excelシリアル値も許容）
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(dt) => Some(*dt),
            Cell::Text(s) => dates::parse_date_text(s),
            Cell::Number(n) => dates::from_excel_serial(*n),
            _ => None,
        }
    }

    /// 表示用文字列（前後空白を除去）
    pub fn text(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Date(dt) => {
                if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// 1シート分の表（先頭行がヘッダー）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// 列名から列番号を取得（前後空白は無視）
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// 必須列の列番号を取得
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| Error::MissingColumn {
            sheet: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// セル参照（範囲外は空セル）
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 指定列の値を書き換える
    pub fn map_column<F>(&mut self, col: usize, f: F)
    where
        F: Fn(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            if row.len() <= col {
                row.resize(col + 1, Cell::Empty);
            }
            row[col] = f(&row[col]);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// ワークブック全シート（シート名 → 表）
#[derive(Debug, Clone, Default)]
pub struct SheetSet {
    pub source: PathBuf,
    sheets: BTreeMap<String, Table>,
}

impl SheetSet {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            sheets: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, table: Table) {
        self.sheets.insert(table.name.clone(), table);
    }

    /// シート取得（存在しなければエラー）
    pub fn sheet(&self, name: &str) -> Result<&Table> {
        self.sheets
            .get(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.sheets.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// 回廊（East / West）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Corridor {
    East,
    West,
}

impl Corridor {
    pub const ALL: [Corridor; 2] = [Corridor::East, Corridor::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Corridor::East => "East",
            Corridor::West => "West",
        }
    }
}

impl fmt::Display for Corridor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corridor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "east" => Ok(Corridor::East),
            "west" => Ok(Corridor::West),
            _ => Err(format!("Unknown corridor: {}. Use East or West", s)),
        }
    }
}

/// 完了率（%）。計画値0は算出不能としてNone
pub fn percent(actual: f64, planned: f64) -> Option<f64> {
    if planned == 0.0 {
        None
    } else {
        Some(actual / planned * 100.0)
    }
}

/// 表示用の完了率（小数1桁）
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

/// "Corridor Work" の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub corridor: Corridor,
    pub section: String,
    pub task_group: String,
    pub work_breakdown: String,
    #[serde(default)]
    pub size: String,
    pub planned: f64,
    pub actual: f64,
    /// 道路区分（Main Road / Secondary Road）
    #[serde(default)]
    pub identifier: Option<String>,
}

impl WorkItem {
    /// Progress (%) = Actual / Planned × 100
    pub fn progress_pct(&self) -> Option<f64> {
        percent(self.actual, self.planned)
    }
}

/// "Progress" の1行（累積%）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDateTime,
    pub baseline: Option<f64>,
    pub actual: Option<f64>,
}

/// "images" の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub image: String,
    #[serde(default)]
    pub updated_on: Option<NaiveDateTime>,
}

/// 駅別進捗（全体概要シートの1行、%換算済み）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProgress {
    pub station_name: String,
    pub contract_package: String,
    pub work_progress: f64,
    pub baseline_progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display_numbers() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn test_cell_as_f64() {
        assert_eq!(Cell::Number(12.5).as_f64(), Some(12.5));
        assert_eq!(Cell::Text(" 1,200 ".to_string()).as_f64(), Some(1200.0));
        assert_eq!(Cell::Text("abc".to_string()).as_f64(), None);
        assert_eq!(Cell::Empty.as_f64(), None);
    }

    #[test]
    fn test_cell_is_empty() {
        assert!(Cell::Empty.is_empty());
        assert!(Cell::Text("   ".to_string()).is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }

    #[test]
    fn test_table_column_lookup() {
        let table = Table::new(
            "Corridor Work",
            vec!["Corridor ".to_string(), "Planned".to_string()],
            vec![vec![Cell::Text("East".to_string())]],
        );
        assert_eq!(table.column_index("Corridor"), Some(0));
        assert_eq!(table.cell(0, 1), &Cell::Empty);
        assert!(matches!(
            table.require_column("Actual"),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_sheet_set_missing_sheet() {
        let mut set = SheetSet::new(PathBuf::from("x.xlsx"));
        set.insert(Table::new("Progress", vec![], vec![]));
        assert!(set.sheet("Progress").is_ok());
        assert!(matches!(set.sheet("images"), Err(Error::SheetNotFound(_))));
    }

    #[test]
    fn test_corridor_parse() {
        assert_eq!("east".parse::<Corridor>(), Ok(Corridor::East));
        assert_eq!(" West ".parse::<Corridor>(), Ok(Corridor::West));
        assert!("North".parse::<Corridor>().is_err());
    }

    #[test]
    fn test_percent_zero_planned() {
        assert_eq!(percent(5.0, 10.0), Some(50.0));
        assert_eq!(percent(5.0, 0.0), None);
        assert_eq!(format_percent(None), "n/a");
        assert_eq!(format_percent(Some(33.333)), "33.3%");
    }
}
