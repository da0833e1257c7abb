//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Column '{column}' missing in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Invalid value in sheet '{sheet}' row {row}: {message}")]
    InvalidCell {
        sheet: String,
        row: usize,
        message: String,
    },

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("{0}")]
    Validation(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let error = Error::MissingColumn {
            sheet: "Corridor Work".to_string(),
            column: "Planned".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Column 'Planned' missing in sheet 'Corridor Work'"
        );
    }

    #[test]
    fn test_error_display_invalid_cell() {
        let error = Error::InvalidCell {
            sheet: "Progress".to_string(),
            row: 4,
            message: "Date is empty".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("Progress"));
        assert!(display.contains("row 4"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
