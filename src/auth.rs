//! 課題ログのパスコード確認

use crate::config::Config;
use crate::error::{DashboardError, Result};
use dialoguer::{Password, Select};

/// 入力値とパスコードを比較（前後空白も含めてそのまま比較）
pub fn check_passcode(expected: &str, entered: &str) -> Result<()> {
    if entered == expected {
        Ok(())
    } else {
        Err(DashboardError::IncorrectPasscode)
    }
}

/// パスコードを対話入力
pub fn prompt_passcode() -> Result<String> {
    Password::new()
        .with_prompt("Enter Passcode")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| DashboardError::Prompt(e.to_string()))
}

/// 設定済みのパスコードで認証（未指定なら対話入力）
pub fn authorize(config: &Config, provided: Option<String>) -> Result<()> {
    let expected = config.get_passcode()?;
    let entered = match provided {
        Some(code) => code,
        None => prompt_passcode()?,
    };
    check_passcode(&expected, &entered)
}

/// 駅を対話選択
pub fn select_station_interactive(names: &[&str]) -> Result<String> {
    let index = Select::new()
        .with_prompt("Select Station")
        .items(names)
        .default(0)
        .interact()
        .map_err(|e| DashboardError::Prompt(e.to_string()))?;
    names
        .get(index)
        .map(|s| s.to_string())
        .ok_or_else(|| DashboardError::Prompt(format!("invalid selection: {}", index)))
}
