//! 課題ログ（"Issue Log" シート）

use crate::dates::ISSUE_DATE_FORMAT;
use crate::types::{Cell, Table};

/// 日付表示を揃える列
pub const ISSUE_DATE_COLUMNS: &[&str] = &["Created on", "Resolved on"];

/// 日付列を "05-Mar-2025" 形式の文字列に揃える
///
/// 解析できない値・空セルは空文字列になる。列がなければ何もしない。
pub fn normalize_issue_dates(table: &Table) -> Table {
    let mut normalized = table.clone();
    for column in ISSUE_DATE_COLUMNS {
        if let Some(col) = normalized.column_index(column) {
            normalized.map_column(col, |cell| match cell.as_datetime() {
                Some(dt) => Cell::Text(dt.format(ISSUE_DATE_FORMAT).to_string()),
                None => Cell::Text(String::new()),
            });
        }
    }
    normalized
}

/// 画面表示用のタイトル
pub fn issue_log_title(station: &str) -> String {
    format!("{} Station Issue Logs", station.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_normalize_issue_dates() {
        let created = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let table = Table::new(
            "Issue Log",
            vec![
                "Issue".to_string(),
                "Created on".to_string(),
                "Resolved on".to_string(),
            ],
            vec![
                vec![
                    Cell::Text("Gas line clash".into()),
                    Cell::Date(created),
                    Cell::Text("2025-03-20".into()),
                ],
                vec![Cell::Text("Open trench".into()), Cell::Number(45724.0), Cell::Empty],
            ],
        );

        let out = normalize_issue_dates(&table);
        assert_eq!(out.cell(0, 1), &Cell::Text("05-Mar-2025".into()));
        assert_eq!(out.cell(0, 2), &Cell::Text("20-Mar-2025".into()));
        assert_eq!(out.cell(1, 1), &Cell::Text("08-Mar-2025".into()));
        assert_eq!(out.cell(1, 2), &Cell::Text(String::new()));
        // 他の列はそのまま
        assert_eq!(out.cell(0, 0), table.cell(0, 0));
    }

    #[test]
    fn test_normalize_without_date_columns() {
        let table = Table::new(
            "Issue Log",
            vec!["Issue".to_string()],
            vec![vec![Cell::Text("x".into())]],
        );
        assert_eq!(normalize_issue_dates(&table), table);
    }

    #[test]
    fn test_issue_log_title() {
        assert_eq!(issue_log_title("Badda"), "BADDA Station Issue Logs");
    }
}
