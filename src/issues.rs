//! 課題ログ表示（パスコード認証の後）

use crate::error::Result;
use progress_common::issues::{issue_log_title, normalize_issue_dates};
use progress_common::Table;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct IssueLogView {
    pub title: String,
    pub table: Table,
}

impl IssueLogView {
    pub fn new(station: &str, sheet: &Table) -> Self {
        Self {
            title: issue_log_title(station),
            table: normalize_issue_dates(sheet),
        }
    }

    fn rows_text(&self) -> Vec<Vec<String>> {
        self.table
            .rows
            .iter()
            .map(|row| {
                (0..self.table.columns.len())
                    .map(|col| row.get(col).map(|c| c.text()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

const MAX_COLUMN_WIDTH: usize = 40;

fn clip(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}

/// インデックス列なしのテキスト表
pub fn render_text(view: &IssueLogView) -> String {
    let rows = view.rows_text();
    let widths: Vec<usize> = view
        .table
        .columns
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| clip(c, *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&view.title);
    out.push('\n');
    out.push_str(&line(view.table.columns.clone()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

pub fn write_csv<W: Write>(view: &IssueLogView, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&view.table.columns)?;
    for row in view.rows_text() {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(view: &IssueLogView, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(view, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_common::Cell;

    fn sheet() -> Table {
        Table::new(
            "Issue Log",
            vec![
                "Issue".to_string(),
                "Created on".to_string(),
                "Status".to_string(),
            ],
            vec![
                vec![
                    Cell::Text("Gas line clash, north side".into()),
                    Cell::Text("2025-03-05".into()),
                    Cell::Text("Open".into()),
                ],
                vec![Cell::Text("Drain blocked".into()), Cell::Empty],
            ],
        )
    }

    #[test]
    fn test_view_title_and_dates() {
        let view = IssueLogView::new("Rampura", &sheet());
        assert_eq!(view.title, "RAMPURA Station Issue Logs");
        assert_eq!(view.table.cell(0, 1), &Cell::Text("05-Mar-2025".into()));
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&IssueLogView::new("Rampura", &sheet()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "RAMPURA Station Issue Logs");
        assert!(lines[1].starts_with("Issue"));
        assert!(lines[3].contains("05-Mar-2025"));
        // 短い行も列数分そろう
        assert!(lines[4].starts_with("Drain blocked"));
    }

    #[test]
    fn test_write_csv_quotes_commas() {
        let mut buf = Vec::new();
        write_csv(&IssueLogView::new("Rampura", &sheet()), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Issue,Created on,Status");
        assert_eq!(lines[1], "\"Gas line clash, north side\",05-Mar-2025,Open");
        assert_eq!(lines[2], "Drain blocked,,");
    }

    #[test]
    fn test_export_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("issues.csv");
        export_csv(&IssueLogView::new("Rampura", &sheet()), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("abc", 5), "abc  ");
        assert_eq!(clip("abcdef", 4), "abc…");
    }
}
