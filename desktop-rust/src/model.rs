use chrono::NaiveDate;
use progress_common::aggregate::default_scurve_cutoff;
use progress_common::defaults::{DEFAULT_STATIONS, INCORRECT_PASSCODE_MESSAGE, PASSCODE_ENV};
use progress_common::filter::{corridors, default_choice, section_choices};
use progress_common::report::MAX_REPORT_IMAGES;
use progress_common::{Corridor, ImageEntry, ProgressPoint, ReportRecord, SectionChoice, SheetSet, WorkItem};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    WorkBreakdown,
    Plotting,
    Images,
    IssueLogs,
    Report,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::WorkBreakdown,
        Page::Plotting,
        Page::Images,
        Page::IssueLogs,
        Page::Report,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::WorkBreakdown => "Work Breakdown",
            Page::Plotting => "Plotting",
            Page::Images => "Images",
            Page::IssueLogs => "Issue Logs",
            Page::Report => "Daily Report",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationFile {
    pub name: String,
    pub file: String,
}

/// CLIと共用の設定ファイル（必要な項目だけ読む）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub image_dir: Option<PathBuf>,
    pub stations: Vec<StationFile>,
    pub scurve_cutoff: NaiveDate,
    pub passcode: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            image_dir: None,
            stations: DEFAULT_STATIONS
                .iter()
                .map(|(name, file)| StationFile {
                    name: name.to_string(),
                    file: file.to_string(),
                })
                .collect(),
            scurve_cutoff: default_scurve_cutoff(),
            passcode: None,
        }
    }
}

impl Settings {
    pub fn image_dir(&self) -> PathBuf {
        self.image_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("images"))
    }

    pub fn workbook_path(&self, station: &str) -> Option<PathBuf> {
        self.stations
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(station))
            .map(|s| self.data_dir.join(&s.file))
    }

    /// 環境変数を優先
    pub fn passcode(&self) -> Option<String> {
        std::env::var(PASSCODE_ENV).ok().or_else(|| self.passcode.clone())
    }
}

/// 選択中の駅のシート一式
#[derive(Debug, Clone)]
pub struct StationData {
    pub name: String,
    pub sheets: SheetSet,
    pub items: Vec<WorkItem>,
    pub points: Vec<ProgressPoint>,
    pub images: Vec<ImageEntry>,
}

/// サイドバーの回廊・区間選択
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub corridor: Option<Corridor>,
    pub section: Option<SectionChoice>,
}

impl Selection {
    /// 駅を切り替えたら先頭の回廊と既定の区間に戻す
    pub fn reset(&mut self, items: &[WorkItem]) {
        self.corridor = corridors(items).first().copied();
        self.section = self
            .corridor
            .and_then(|c| default_choice(&section_choices(items, c)));
    }

    pub fn set_corridor(&mut self, corridor: Corridor, items: &[WorkItem]) {
        if self.corridor != Some(corridor) {
            self.corridor = Some(corridor);
            self.section = default_choice(&section_choices(items, corridor));
        }
    }
}

/// 課題ログのパスコード入力
#[derive(Debug, Clone, Default)]
pub struct IssueGate {
    pub entered: String,
    pub authenticated: bool,
    pub error: Option<String>,
}

impl IssueGate {
    pub fn submit(&mut self, expected: Option<&str>) {
        match expected {
            None => {
                self.error = Some(format!(
                    "Passcode is not configured. Set {} or `passcode` in config.json",
                    PASSCODE_ENV
                ));
            }
            Some(code) if code == self.entered => {
                self.authenticated = true;
                self.error = None;
            }
            Some(_) => {
                self.error = Some(INCORRECT_PASSCODE_MESSAGE.to_string());
            }
        }
        self.entered.clear();
    }
}

/// 生成済みの日報
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub file_name: String,
    pub image_count: usize,
    pub overall_progress: u8,
    pub workers_present: u32,
    pub equipment_count: u32,
}

#[derive(Debug, Clone)]
pub struct ReportForm {
    pub record: ReportRecord,
    pub date_text: String,
    pub images: Vec<PathBuf>,
    pub error: Option<String>,
    pub generated: Option<GeneratedReport>,
}

impl Default for ReportForm {
    fn default() -> Self {
        let record = ReportRecord::default();
        Self {
            date_text: record.report_date.format("%Y-%m-%d").to_string(),
            record,
            images: Vec::new(),
            error: None,
            generated: None,
        }
    }
}

impl ReportForm {
    pub fn add_images(&mut self, paths: Vec<PathBuf>) {
        for path in paths {
            if self.images.len() >= MAX_REPORT_IMAGES {
                break;
            }
            if !self.images.contains(&path) {
                self.images.push(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(corridor: Corridor, section: &str) -> WorkItem {
        WorkItem {
            corridor,
            section: section.to_string(),
            task_group: "Utility Laying".into(),
            work_breakdown: "DWASA".into(),
            size: String::new(),
            planned: 10.0,
            actual: 5.0,
            identifier: None,
        }
    }

    #[test]
    fn test_selection_reset_and_corridor_change() {
        let items = vec![
            item(Corridor::West, "W1"),
            item(Corridor::East, "E1"),
            item(Corridor::East, "E2"),
        ];
        let mut selection = Selection::default();
        selection.reset(&items);
        assert_eq!(selection.corridor, Some(Corridor::West));
        assert_eq!(selection.section, Some(SectionChoice::Section("W1".into())));

        selection.set_corridor(Corridor::East, &items);
        assert_eq!(selection.section, Some(SectionChoice::All));
    }

    #[test]
    fn test_issue_gate() {
        let mut gate = IssueGate::default();
        gate.entered = "wrong".into();
        gate.submit(Some("secret"));
        assert!(!gate.authenticated);
        assert_eq!(gate.error.as_deref(), Some(INCORRECT_PASSCODE_MESSAGE));

        gate.entered = "secret".into();
        gate.submit(Some("secret"));
        assert!(gate.authenticated);
        assert!(gate.error.is_none());
    }

    #[test]
    fn test_issue_gate_without_passcode() {
        let mut gate = IssueGate::default();
        gate.entered = "x".into();
        gate.submit(None);
        assert!(!gate.authenticated);
        assert!(gate.error.is_some());
    }

    #[test]
    fn test_report_form_caps_images() {
        let mut form = ReportForm::default();
        form.add_images((0..6).map(|i| PathBuf::from(format!("{}.jpg", i))).collect());
        assert_eq!(form.images.len(), MAX_REPORT_IMAGES);
    }

    #[test]
    fn test_settings_workbook_path() {
        let settings = Settings::default();
        assert_eq!(
            settings.workbook_path("badda"),
            Some(PathBuf::from("./badda_progress.xlsx"))
        );
        assert!(settings.workbook_path("Gulshan").is_none());
    }

    #[test]
    fn test_settings_stations_follow_shared_defaults() {
        let settings = Settings::default();
        let stations: Vec<(&str, &str)> = settings
            .stations
            .iter()
            .map(|s| (s.name.as_str(), s.file.as_str()))
            .collect();
        assert_eq!(stations, DEFAULT_STATIONS);
    }
}
