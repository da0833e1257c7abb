//! 回廊・区間フィルタ
//!
//! 選択した回廊の区間一覧を作り、区間が複数あれば先頭に "All" を追加する。

use crate::types::{Corridor, WorkItem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 区間の選択肢
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionChoice {
    All,
    Section(String),
}

impl SectionChoice {
    pub const ALL_LABEL: &'static str = "All";

    /// 入力文字列から選択肢を作る（"all" は大文字小文字を問わない）
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case(Self::ALL_LABEL) {
            SectionChoice::All
        } else {
            SectionChoice::Section(text.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SectionChoice::All => Self::ALL_LABEL,
            SectionChoice::Section(s) => s,
        }
    }
}

impl fmt::Display for SectionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 重複を除いて出現順に並べる
fn unique_in_order<T: PartialEq, I: Iterator<Item = T>>(iter: I) -> Vec<T> {
    let mut out = Vec::new();
    for value in iter {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// データに含まれる回廊（出現順）
pub fn corridors(items: &[WorkItem]) -> Vec<Corridor> {
    unique_in_order(items.iter().map(|i| i.corridor))
}

/// 回廊に含まれる区間（出現順）
pub fn sections_for(items: &[WorkItem], corridor: Corridor) -> Vec<String> {
    unique_in_order(
        items
            .iter()
            .filter(|i| i.corridor == corridor)
            .map(|i| i.section.clone()),
    )
}

/// 区間の選択肢（複数区間なら "All" を先頭に）
pub fn section_choices(items: &[WorkItem], corridor: Corridor) -> Vec<SectionChoice> {
    let sections = sections_for(items, corridor);
    let mut choices = Vec::with_capacity(sections.len() + 1);
    if sections.len() > 1 {
        choices.push(SectionChoice::All);
    }
    choices.extend(sections.into_iter().map(SectionChoice::Section));
    choices
}

/// 既定の選択肢（先頭、すなわち "All" があれば "All"）
pub fn default_choice(choices: &[SectionChoice]) -> Option<SectionChoice> {
    choices.first().cloned()
}

/// 回廊・区間で行を絞り込む
pub fn filter_rows<'a>(
    items: &'a [WorkItem],
    corridor: Corridor,
    choice: &SectionChoice,
) -> Vec<&'a WorkItem> {
    items
        .iter()
        .filter(|i| i.corridor == corridor)
        .filter(|i| match choice {
            SectionChoice::All => true,
            SectionChoice::Section(s) => &i.section == s,
        })
        .collect()
}

/// 作業項目グループ（Task Group 単位、出現順）
#[derive(Debug, Clone)]
pub struct TaskGroupRows<'a> {
    pub task_group: String,
    pub rows: Vec<&'a WorkItem>,
}

/// 絞り込み結果を Task Group ごとにまとめる
pub fn group_by_task<'a>(rows: &[&'a WorkItem]) -> Vec<TaskGroupRows<'a>> {
    let mut groups: Vec<TaskGroupRows<'a>> = Vec::new();
    for &row in rows {
        match groups.iter_mut().find(|g| g.task_group == row.task_group) {
            Some(group) => group.rows.push(row),
            None => groups.push(TaskGroupRows {
                task_group: row.task_group.clone(),
                rows: vec![row],
            }),
        }
    }
    groups
}
