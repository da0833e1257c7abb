//! 現場巡回日報（Daily Construction Report）
//!
//! フォーム入力の保持・必須項目チェック・天候チェック欄の判定・
//! PDFに載せる表の内容組み立てまでを担当する。描画はCLI側。

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::REPORT_DATE_FORMAT;
use crate::error::{Error, Result};

pub const DEFAULT_PROJECT_NAME: &str = "Dhaka Metro Rail Project";
pub const DEFAULT_CLIENT_NAME: &str = "DMTCL";
pub const REPORT_TITLE: &str = "DAILY CONSTRUCTION REPORT";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields marked with *";
pub const MAX_REPORT_IMAGES: usize = 4;

pub const STATION_OPTIONS: &[&str] = &[
    "S01-Kamlapur",
    "S02-Rajarbagh",
    "S03-Malibagh",
    "S04-Rampura",
    "S05-Aftab Nagar",
    "S06-Badda",
    "S07-North Badda",
    "S08-Natun Bazar",
    "S09-Nadda",
];

pub const WEATHER_OPTIONS: &[&str] = &["Sunny", "Partly Cloudy", "Cloudy", "Rainy", "Stormy", "Foggy"];

pub const SAFETY_OPTIONS: &[&str] = &[
    "Fully Compliant",
    "Minor Issues",
    "Major Issues",
    "Non-Compliant",
];

pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<i32> = -50..=60;

/// 日報の入力内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRecord {
    pub project_name: String,
    /// 駅名（選択肢または任意入力）
    pub station: String,
    pub client_name: String,
    pub contractor_name: String,
    pub subcontractor_name: String,
    pub inspector_name: String,
    pub report_date: NaiveDate,
    pub visit_start_time: String,
    pub visit_end_time: String,
    pub weather_condition: String,
    pub temperature: i32,
    pub safety_compliance: String,
    pub workers_present: u32,
    pub equipment_count: u32,
    pub overall_progress: u8,
    pub work_started: String,
    pub work_completed: String,
    pub activities_completed: String,
    pub issues_challenges: String,
    pub recommendations: String,
    pub next_day_plan: String,
}

impl Default for ReportRecord {
    fn default() -> Self {
        let now = Local::now();
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            station: STATION_OPTIONS[0].to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            contractor_name: String::new(),
            subcontractor_name: String::new(),
            inspector_name: String::new(),
            report_date: now.date_naive(),
            visit_start_time: now.format("%H:%M").to_string(),
            visit_end_time: now.format("%H:%M").to_string(),
            weather_condition: WEATHER_OPTIONS[0].to_string(),
            temperature: 25,
            safety_compliance: SAFETY_OPTIONS[0].to_string(),
            workers_present: 0,
            equipment_count: 0,
            overall_progress: 50,
            work_started: String::new(),
            work_completed: String::new(),
            activities_completed: String::new(),
            issues_challenges: String::new(),
            recommendations: String::new(),
            next_day_plan: String::new(),
        }
    }
}

impl ReportRecord {
    /// 未入力の必須項目（*）
    pub fn missing_required(&self) -> Vec<&'static str> {
        let required = [
            ("Project Name", &self.project_name),
            ("Station Name", &self.station),
            ("Client Name", &self.client_name),
            ("Inspector Name", &self.inspector_name),
            ("Contractor Name", &self.contractor_name),
        ];
        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect()
    }

    /// 入力チェック
    pub fn validate(&self) -> Result<()> {
        if !self.missing_required().is_empty() {
            return Err(Error::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(Error::Validation(format!(
                "Temperature must be between {} and {} °C",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }
        if self.overall_progress > 100 {
            return Err(Error::Validation(
                "Overall progress must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }

    /// ダウンロード用ファイル名
    pub fn file_name(&self) -> String {
        format!(
            "Site_Visit_Report_{}_{}.pdf",
            self.project_name.replace(' ', "_"),
            self.report_date.format("%Y%m%d")
        )
    }

    pub fn formatted_date(&self) -> String {
        self.report_date.format(REPORT_DATE_FORMAT).to_string()
    }
}

/// 天候チェック欄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherMark {
    Clear,
    Cool,
    Fog,
    Windy,
    Overcast,
    Warm,
}

impl WeatherMark {
    pub fn label(&self) -> &'static str {
        match self {
            WeatherMark::Clear => "Clear",
            WeatherMark::Cool => "Cool",
            WeatherMark::Fog => "Fog",
            WeatherMark::Windy => "Windy",
            WeatherMark::Overcast => "Overcast",
            WeatherMark::Warm => "Warm",
        }
    }
}

/// 天候の自由入力からチェック欄を決める（最初に一致したものだけ）
pub fn weather_mark(condition: &str) -> Option<WeatherMark> {
    let condition = condition.to_lowercase();
    let has = |keyword: &str| condition.contains(keyword);
    if has("sunny") || has("clear") {
        Some(WeatherMark::Clear)
    } else if has("cool") {
        Some(WeatherMark::Cool)
    } else if has("fog") {
        Some(WeatherMark::Fog)
    } else if has("windy") {
        Some(WeatherMark::Windy)
    } else if has("overcast") || has("cloudy") {
        Some(WeatherMark::Overcast)
    } else if has("warm") {
        Some(WeatherMark::Warm)
    } else {
        None
    }
}

/// 表の1セル
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Label(String),
    Value(String),
    /// チェック欄（ラベル, チェック有無）を横に並べる
    Checks(Vec<(String, bool)>),
}

impl ReportCell {
    fn label(s: &str) -> Self {
        ReportCell::Label(s.to_string())
    }

    fn value(s: impl Into<String>) -> Self {
        ReportCell::Value(s.into())
    }

    fn check(label: &str, checked: bool) -> Self {
        ReportCell::Checks(vec![(label.to_string(), checked)])
    }

    fn checks(labels: &[&str]) -> Self {
        ReportCell::Checks(labels.iter().map(|l| (l.to_string(), false)).collect())
    }

    /// セルの文字列表現（チェック欄は [X] / [ ]）
    pub fn plain_text(&self) -> String {
        match self {
            ReportCell::Label(s) | ReportCell::Value(s) => s.clone(),
            ReportCell::Checks(items) => items
                .iter()
                .map(|(label, checked)| format!("[{}] {}", if *checked { "X" } else { " " }, label))
                .collect::<Vec<_>>()
                .join("   "),
        }
    }
}

pub type ReportGrid = Vec<Vec<ReportCell>>;

/// 本文の見出し付き段落
#[derive(Debug, Clone, PartialEq)]
pub struct ReportParagraph {
    pub heading: &'static str,
    pub text: String,
}

/// PDF1ページ分の内容
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub title: &'static str,
    pub basic_info: ReportGrid,
    pub conditions: ReportGrid,
    pub progress: ReportGrid,
    pub paragraphs: Vec<ReportParagraph>,
    pub signature: ReportGrid,
}

fn or_default(text: &str, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// 入力内容から表の中身を組み立てる
pub fn build_report_content(record: &ReportRecord) -> ReportContent {
    let date = record.formatted_date();

    let basic_info = vec![
        vec![
            ReportCell::label("Daily Report No:"),
            ReportCell::value(""),
            ReportCell::label("Date:"),
            ReportCell::value(date.clone()),
        ],
        vec![
            ReportCell::label("Contractor:"),
            ReportCell::value(record.contractor_name.clone()),
            ReportCell::label("Project No:"),
            ReportCell::value(""),
        ],
        vec![
            ReportCell::label("Project Name:"),
            ReportCell::value(record.project_name.clone()),
            ReportCell::value(""),
            ReportCell::value(""),
        ],
    ];

    let mark = weather_mark(&record.weather_condition);
    let w = |m: WeatherMark| ReportCell::check(m.label(), mark == Some(m));
    let conditions = vec![
        vec![
            ReportCell::label("Weather:"),
            ReportCell::value(""),
            ReportCell::label("Site Conditions:"),
            ReportCell::value(""),
            ReportCell::label("Day:"),
        ],
        vec![
            w(WeatherMark::Clear),
            w(WeatherMark::Windy),
            ReportCell::checks(&["Clear"]),
            ReportCell::checks(&["Dusty"]),
            ReportCell::checks(&["Monday", "Thursday"]),
        ],
        vec![
            w(WeatherMark::Cool),
            w(WeatherMark::Overcast),
            ReportCell::checks(&["Dusty"]),
            ReportCell::checks(&["Dry"]),
            ReportCell::checks(&["Tuesday", "Friday"]),
        ],
        vec![
            w(WeatherMark::Fog),
            w(WeatherMark::Warm),
            ReportCell::checks(&["Muddy"]),
            ReportCell::value(""),
            ReportCell::checks(&["Wednesday"]),
        ],
    ];

    let progress = vec![
        vec![
            ReportCell::label("Station Name:"),
            ReportCell::value(record.station.clone()),
            ReportCell::label("Overall Progress:"),
            ReportCell::value(format!("{}%", record.overall_progress)),
        ],
        vec![
            ReportCell::label("Workers Present:"),
            ReportCell::value(format!("{} personnel", record.workers_present)),
            ReportCell::label("Equipment Units:"),
            ReportCell::value(format!("{} units", record.equipment_count)),
        ],
        vec![
            ReportCell::label("Sub-contractor:"),
            ReportCell::value(record.subcontractor_name.clone()),
            ReportCell::label("Safety Status:"),
            ReportCell::value(record.safety_compliance.clone()),
        ],
    ];

    let paragraphs = vec![
        ReportParagraph {
            heading: "Remarks:",
            text: or_default(&record.activities_completed, "No specific remarks for today."),
        },
        ReportParagraph {
            heading: "Project Leader Comments:",
            text: or_default(&record.recommendations, "No additional comments."),
        },
        ReportParagraph {
            heading: "Nature of Exception/Defects:",
            text: or_default(&record.issues_challenges, "No exceptions or defects reported."),
        },
    ];

    let signature = vec![
        vec![
            ReportCell::label("Contractor Signature:"),
            ReportCell::value(""),
            ReportCell::label("Inspector Signature:"),
            ReportCell::value(""),
        ],
        vec![
            ReportCell::value(""),
            ReportCell::value(""),
            ReportCell::value(""),
            ReportCell::value(""),
        ],
        vec![
            ReportCell::label("Completion Date:"),
            ReportCell::value(date),
            ReportCell::label("Report By:"),
            ReportCell::value(record.inspector_name.clone()),
        ],
    ];

    ReportContent {
        title: REPORT_TITLE,
        basic_info,
        conditions,
        progress,
        paragraphs,
        signature,
    }
}

/// 生成後に表示する概要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub overall_progress: u8,
    pub workers_present: u32,
    pub equipment_count: u32,
    pub image_count: usize,
}

impl ReportSummary {
    pub fn new(record: &ReportRecord, image_count: usize) -> Self {
        Self {
            overall_progress: record.overall_progress,
            workers_present: record.workers_present,
            equipment_count: record.equipment_count,
            image_count,
        }
    }
}
