//! グラフ用の集計
//!
//! 完了率は必ず「Actual合計 / Planned合計 × 100」で求める（行ごとの率の平均ではない）。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{percent, Corridor, ProgressPoint, WorkItem};

/// S字カーブの実績打ち切り日（既定値）
pub const DEFAULT_SCURVE_CUTOFF: (i32, u32, u32) = (2025, 3, 8);

pub const UTILITY_LAYING: &str = "utility laying";
pub const CIVIL_TASK_GROUPS: &[&str] = &["Excavation", "Road Reinstatement"];
pub const COMBINED_LABEL: &str = "Combined";

/// 計画・実績の集計値
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub planned: f64,
    pub actual: f64,
}

impl Totals {
    pub fn add(&mut self, item: &WorkItem) {
        self.planned += item.planned;
        self.actual += item.actual;
    }

    pub fn of<'a, I: IntoIterator<Item = &'a WorkItem>>(items: I) -> Self {
        let mut totals = Self::default();
        for item in items {
            totals.add(item);
        }
        totals
    }

    pub fn completion(&self) -> Option<f64> {
        percent(self.actual, self.planned)
    }
}

/// 回廊別サマリーの1本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBar {
    pub category: String,
    pub totals: Totals,
}

impl SummaryBar {
    pub fn completion(&self) -> Option<f64> {
        self.totals.completion()
    }
}

/// East / West / 全体 の計画・実績
pub fn corridor_summary(items: &[WorkItem]) -> Vec<SummaryBar> {
    let side = |corridor: Corridor| Totals::of(items.iter().filter(|i| i.corridor == corridor));
    vec![
        SummaryBar {
            category: "East Side".to_string(),
            totals: side(Corridor::East),
        },
        SummaryBar {
            category: "West Side".to_string(),
            totals: side(Corridor::West),
        },
        SummaryBar {
            category: "Total Work".to_string(),
            totals: Totals::of(items),
        },
    ]
}

/// 道路区分 × 回廊 の集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSummaryRow {
    pub identifier: String,
    pub corridor: Corridor,
    pub totals: Totals,
}

/// Identifier（Main Road / Secondary Road）と回廊で集計（Identifierのない行は除外）
pub fn road_summary(items: &[WorkItem]) -> Vec<RoadSummaryRow> {
    let mut groups: BTreeMap<(String, Corridor), Totals> = BTreeMap::new();
    for item in items {
        if let Some(identifier) = &item.identifier {
            groups
                .entry((identifier.clone(), item.corridor))
                .or_default()
                .add(item);
        }
    }
    groups
        .into_iter()
        .map(|((identifier, corridor), totals)| RoadSummaryRow {
            identifier,
            corridor,
            totals,
        })
        .collect()
}

/// 埋設機関別バーの1本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyBar {
    pub corridor: Corridor,
    pub work_breakdown: String,
    pub size: String,
    pub totals: Totals,
    /// 同一回廊で同じ機関に複数サイズがあればサイズ付き
    pub label: String,
}

impl AgencyBar {
    pub fn completion(&self) -> Option<f64> {
        self.totals.completion()
    }
}

/// Utility Laying 行を (回廊, 機関, サイズ) で集計
pub fn agency_bars(items: &[WorkItem]) -> Vec<AgencyBar> {
    let mut groups: BTreeMap<(Corridor, String, String), Totals> = BTreeMap::new();
    for item in items
        .iter()
        .filter(|i| i.task_group.to_lowercase() == UTILITY_LAYING)
    {
        groups
            .entry((item.corridor, item.work_breakdown.clone(), item.size.trim().to_string()))
            .or_default()
            .add(item);
    }

    let mut variants: BTreeMap<(Corridor, &str), usize> = BTreeMap::new();
    for (corridor, breakdown, _) in groups.keys() {
        *variants.entry((*corridor, breakdown.as_str())).or_default() += 1;
    }

    groups
        .iter()
        .map(|((corridor, breakdown, size), totals)| {
            let multiple = variants
                .get(&(*corridor, breakdown.as_str()))
                .copied()
                .unwrap_or(0)
                > 1;
            // 径の入っていない行は括弧を付けない
            let label = if multiple && !size.is_empty() {
                format!("{} ({})", breakdown, size)
            } else {
                breakdown.clone()
            };
            AgencyBar {
                corridor: *corridor,
                work_breakdown: breakdown.clone(),
                size: size.clone(),
                totals: *totals,
                label,
            }
        })
        .collect()
}

/// 土木工事バーの1本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CivilWorkBar {
    pub corridor: Corridor,
    pub task_group: String,
    pub work_breakdown: String,
    pub totals: Totals,
    pub combined: bool,
}

impl CivilWorkBar {
    pub fn completion(&self) -> Option<f64> {
        self.totals.completion()
    }
}

/// Excavation / Road Reinstatement を細目ごとに集計し、
/// (回廊, Task Group) ごとの "Combined" 行を末尾に追加する
pub fn civil_work_bars(items: &[WorkItem]) -> Vec<CivilWorkBar> {
    let mut detail: Vec<CivilWorkBar> = Vec::new();
    for item in items
        .iter()
        .filter(|i| CIVIL_TASK_GROUPS.contains(&i.task_group.as_str()))
    {
        let existing = detail.iter_mut().find(|b| {
            b.corridor == item.corridor
                && b.task_group == item.task_group
                && b.work_breakdown == item.work_breakdown
        });
        match existing {
            Some(bar) => bar.totals.add(item),
            None => detail.push(CivilWorkBar {
                corridor: item.corridor,
                task_group: item.task_group.clone(),
                work_breakdown: item.work_breakdown.clone(),
                totals: Totals::of([item]),
                combined: false,
            }),
        }
    }

    let mut combined: BTreeMap<(Corridor, String), Totals> = BTreeMap::new();
    for bar in &detail {
        let entry = combined
            .entry((bar.corridor, bar.task_group.clone()))
            .or_default();
        entry.planned += bar.totals.planned;
        entry.actual += bar.totals.actual;
    }

    detail.extend(
        combined
            .into_iter()
            .map(|((corridor, task_group), totals)| CivilWorkBar {
                corridor,
                task_group,
                work_breakdown: COMBINED_LABEL.to_string(),
                totals,
                combined: true,
            }),
    );
    detail
}

/// 回廊で絞り込む（グラフは回廊ごとに1枚）
pub fn for_corridor<T, F>(bars: &[T], corridor: Corridor, key: F) -> Vec<&T>
where
    F: Fn(&T) -> Corridor,
{
    bars.iter().filter(|b| key(b) == corridor).collect()
}

/// S字カーブ: 打ち切り日の0時より後の実績を消す
///
/// 打ち切り日当日でも0時を過ぎた時刻付きの点は消える。
pub fn scurve_points(points: &[ProgressPoint], cutoff: NaiveDate) -> Vec<ProgressPoint> {
    let cutoff = cutoff.and_hms_opt(0, 0, 0);
    points
        .iter()
        .map(|p| {
            let mut point = p.clone();
            if cutoff.is_some_and(|c| p.date > c) {
                point.actual = None;
            }
            point
        })
        .collect()
}

/// 既定の打ち切り日
pub fn default_scurve_cutoff() -> NaiveDate {
    let (y, m, d) = DEFAULT_SCURVE_CUTOFF;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// 契約パッケージ（出現順）
pub fn contract_packages(rows: &[crate::types::StationProgress]) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for row in rows {
        if !packages.contains(&row.contract_package) {
            packages.push(row.contract_package.clone());
        }
    }
    packages
}
