use thiserror::Error;

pub use progress_common::defaults::INCORRECT_PASSCODE_MESSAGE;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Common(#[from] progress_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("パスコードが設定されていません。`progress-dashboard config --set-passcode CODE` または環境変数 PROGRESS_DASHBOARD_PASSCODE で設定してください")]
    MissingPasscode,

    #[error("{}", INCORRECT_PASSCODE_MESSAGE)]
    IncorrectPasscode,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error generating report: {0}")]
    PdfGeneration(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("入力エラー: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
