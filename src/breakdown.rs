//! 作業内訳（Work Breakdown）表示
//!
//! 回廊・区間で絞り込んだ行を Task Group ごとにまとめ、進捗バー付きで表示する。

use progress_common::aggregate::Totals;
use progress_common::filter::{filter_rows, group_by_task};
use progress_common::{format_percent, Corridor, SectionChoice, WorkItem};
use serde::Serialize;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub section: String,
    pub work_breakdown: String,
    pub size: String,
    pub planned: f64,
    pub actual: f64,
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownGroup {
    pub task_group: String,
    pub rows: Vec<BreakdownRow>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownView {
    pub station: String,
    pub corridor: Corridor,
    pub section: SectionChoice,
    pub groups: Vec<BreakdownGroup>,
}

impl BreakdownView {
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn heading(&self) -> String {
        format!(
            "{} - {} Corridor / Section: {}",
            self.station, self.corridor, self.section
        )
    }
}

pub fn build_view(
    station: &str,
    items: &[WorkItem],
    corridor: Corridor,
    section: &SectionChoice,
) -> BreakdownView {
    let rows = filter_rows(items, corridor, section);
    let groups = group_by_task(&rows)
        .into_iter()
        .map(|group| BreakdownGroup {
            totals: Totals::of(group.rows.iter().copied()),
            rows: group
                .rows
                .iter()
                .map(|item| BreakdownRow {
                    section: item.section.clone(),
                    work_breakdown: item.work_breakdown.clone(),
                    size: item.size.clone(),
                    planned: item.planned,
                    actual: item.actual,
                    progress: item.progress_pct(),
                })
                .collect(),
            task_group: group.task_group,
        })
        .collect();

    BreakdownView {
        station: station.to_string(),
        corridor,
        section: section.clone(),
        groups,
    }
}

/// "██████░░░░" 形式の進捗バー（100%超は満タン表示）
pub fn progress_bar(progress: Option<f64>, width: usize) -> String {
    let ratio = progress.map(|p| (p / 100.0).clamp(0.0, 1.0)).unwrap_or(0.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// 端末表示用テキスト
pub fn render_text(view: &BreakdownView) -> String {
    let mut out = String::new();
    out.push_str(&format!("📋 {}\n", view.heading()));

    if view.is_empty() {
        out.push_str("  (該当する行がありません)\n");
        return out;
    }

    for group in &view.groups {
        out.push_str(&format!(
            "\n▼ {}  [{}]\n",
            group.task_group,
            format_percent(group.totals.completion())
        ));
        for row in &group.rows {
            let name = if row.size.is_empty() {
                row.work_breakdown.clone()
            } else {
                format!("{} ({})", row.work_breakdown, row.size)
            };
            out.push_str(&format!(
                "  {:<8} {:<36} {:>10} / {:<10} {} {:>7}\n",
                row.section,
                name,
                format_amount(row.actual),
                format_amount(row.planned),
                progress_bar(row.progress, BAR_WIDTH),
                format_percent(row.progress)
            ));
        }
    }
    out
}
