//! CLIとデスクトップで揃えておく既定値

/// 既定の駅一覧（表示順、駅名とワークブック名）
pub const DEFAULT_STATIONS: &[(&str, &str)] = &[
    ("Aftab Nagar", "s05_aftab_nagar_progress.xlsx"),
    ("Nadda", "nadda_progress.xlsx"),
    ("Natun Bazar", "natun_bazar_progress.xlsx"),
    ("Badda", "badda_progress.xlsx"),
    ("Rampura", "rampura_progress.xlsx"),
    ("Malibagh", "malibagh_progress.xlsx"),
];

/// パスコードの環境変数（設定ファイルより優先）
pub const PASSCODE_ENV: &str = "PROGRESS_DASHBOARD_PASSCODE";

pub const INCORRECT_PASSCODE_MESSAGE: &str = "Incorrect passcode. Please try again.";

/// `~/.config` 配下の設定フォルダ
pub const CONFIG_DIR_NAME: &str = "progress-dashboard";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stations_are_unique_workbooks() {
        assert_eq!(DEFAULT_STATIONS.len(), 6);
        for (i, (name, file)) in DEFAULT_STATIONS.iter().enumerate() {
            assert!(file.ends_with("_progress.xlsx"), "{}", file);
            assert!(
                DEFAULT_STATIONS[i + 1..].iter().all(|(n, _)| n != name),
                "duplicate station {}",
                name
            );
        }
    }
}
