//! グラフ描画（plotters）
//!
//! 集計結果を `Chart` にまとめ、SVG文字列（CLI）またはRGBバッファ（デスクトップ）に描く。
//! 描画は `DrawingBackend` に対して汎用なので、出力先はどちらでも同じコードを通る。

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::aggregate::{
    agency_bars, civil_work_bars, contract_packages, corridor_summary, scurve_points, AgencyBar,
    CivilWorkBar, SummaryBar,
};
use crate::error::{Error, Result};
use crate::layout::{self, Rgb};
use crate::types::{format_percent, Corridor, ProgressPoint, StationProgress, WorkItem};

const FONT: &str = "sans-serif";

pub const DEFAULT_CHART_SIZE: (u32, u32) = (1000, 600);

/// 1枚のグラフ
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    CorridorSummary(Vec<SummaryBar>),
    Agency {
        corridor: Corridor,
        bars: Vec<AgencyBar>,
    },
    CivilWork {
        corridor: Corridor,
        bars: Vec<CivilWorkBar>,
    },
    SCurve(Vec<ProgressPoint>),
    StationProgress(Vec<StationProgress>),
}

impl Chart {
    pub fn title(&self) -> String {
        match self {
            Chart::CorridorSummary(_) => "Planned vs. Actual Work Progress by Corridor".to_string(),
            Chart::Agency { corridor, .. } | Chart::CivilWork { corridor, .. } => {
                format!("{} Corridor: Completion Percentage by Task Group", corridor)
            }
            Chart::SCurve(_) => "Cumulative Work Progress vs. Baseline".to_string(),
            Chart::StationProgress(_) => "Utility Relocation Progress by Station".to_string(),
        }
    }

    /// 出力ファイル名（拡張子なし）
    pub fn file_stem(&self) -> String {
        match self {
            Chart::CorridorSummary(_) => "corridor_summary".to_string(),
            Chart::Agency { corridor, .. } => {
                format!("agency_{}", corridor.as_str().to_lowercase())
            }
            Chart::CivilWork { corridor, .. } => {
                format!("civil_work_{}", corridor.as_str().to_lowercase())
            }
            Chart::SCurve(_) => "s_curve".to_string(),
            Chart::StationProgress(_) => "station_progress".to_string(),
        }
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        match self {
            Chart::CorridorSummary(bars) => draw_corridor_summary(root, &self.title(), bars),
            Chart::Agency { bars, .. } => {
                let bars = agency_percent_bars(bars);
                draw_percent_bars(root, &self.title(), &bars)
            }
            Chart::CivilWork { bars, .. } => {
                let bars = civil_percent_bars(bars);
                draw_percent_bars(root, &self.title(), &bars)
            }
            Chart::SCurve(points) => draw_scurve(root, &self.title(), points),
            Chart::StationProgress(rows) => draw_station_progress(root, &self.title(), rows),
        }
    }
}

/// 駅ワークブックから描くグラフ一式
///
/// サマリー → 埋設機関(East/West) → 土木(East/West) → S字カーブ の順。
pub fn station_charts(items: &[WorkItem], points: &[ProgressPoint], cutoff: NaiveDate) -> Vec<Chart> {
    let agencies = agency_bars(items);
    let civil = civil_work_bars(items);

    let mut charts = vec![Chart::CorridorSummary(corridor_summary(items))];
    for corridor in Corridor::ALL {
        charts.push(Chart::Agency {
            corridor,
            bars: agencies
                .iter()
                .filter(|b| b.corridor == corridor)
                .cloned()
                .collect(),
        });
    }
    for corridor in Corridor::ALL {
        charts.push(Chart::CivilWork {
            corridor,
            bars: civil.iter().filter(|b| b.corridor == corridor).cloned().collect(),
        });
    }
    charts.push(Chart::SCurve(scurve_points(points, cutoff)));
    charts
}

/// SVG文字列に描画
pub fn render_svg(chart: &Chart, size: (u32, u32)) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        chart.draw(&root)?;
    }
    Ok(svg)
}

/// RGB（1画素3バイト）バッファに描画
pub fn render_rgb(chart: &Chart, size: (u32, u32)) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; size.0 as usize * size.1 as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        chart.draw(&root)?;
    }
    Ok(buffer)
}

fn chart_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// 棒の上に載せるラベル
fn bar_label_style() -> TextStyle<'static> {
    TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom))
}

/// 軸上限（最大値の1割増し、0なら1）
fn axis_max<I: IntoIterator<Item = f64>>(values: I, floor: f64) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    (max * 1.1).max(floor).max(1.0)
}

/// カテゴリ軸（i番目の中心が整数 i に来る）
fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..count.max(1) as f64 - 0.5
}

/// 整数位置の目盛りだけにラベルを付ける
fn category_label(labels: &[String], value: f64) -> String {
    let index = value.round();
    if index < 0.0 || (value - index).abs() > 1e-6 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn draw_border<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>) -> Result<()> {
    let (w, h) = root.dim_in_pixel();
    root.draw(&Rectangle::new(
        [(1, 1), (w as i32 - 2, h as i32 - 2)],
        BLACK.stroke_width(2),
    ))
    .map_err(chart_error)
}

fn legend_box(c: RGBColor) -> impl Fn((i32, i32)) -> Rectangle<(i32, i32)> {
    move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.filled())
}

fn draw_corridor_summary<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    bars: &[SummaryBar],
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    let labels: Vec<String> = bars.iter().map(|b| b.category.clone()).collect();
    let y_max = axis_max(
        bars.iter().flat_map(|b| [b.totals.planned, b.totals.actual]),
        0.0,
    );
    let count = labels.len().max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(category_range(count), 0f64..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("Corridor")
        .y_desc("Work Volume")
        .draw()
        .map_err(chart_error)?;

    let planned = color(layout::PLANNED_COLOR);
    let actual = color(layout::ACTUAL_COLOR);

    chart
        .draw_series(bars.iter().enumerate().map(|(i, b)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x, b.totals.planned)], planned.filled())
        }))
        .map_err(chart_error)?
        .label("Planned")
        .legend(legend_box(planned));

    chart
        .draw_series(bars.iter().enumerate().map(|(i, b)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + 0.4, b.totals.actual)], actual.filled())
        }))
        .map_err(chart_error)?
        .label("Actual")
        .legend(legend_box(actual));

    // 実績バーにだけ完了率を載せる
    chart
        .draw_series(bars.iter().enumerate().map(|(i, b)| {
            Text::new(
                format_percent(b.completion()),
                (i as f64 + 0.2, b.totals.actual),
                bar_label_style(),
            )
        }))
        .map_err(chart_error)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    draw_border(root)?;
    root.present().map_err(chart_error)
}

/// 完了率バー1本（凡例グループと色付き）
#[derive(Debug, Clone, PartialEq)]
struct PercentBar {
    label: String,
    group: String,
    color: Rgb,
    value: Option<f64>,
}

fn agency_percent_bars(bars: &[AgencyBar]) -> Vec<PercentBar> {
    let mut unknown: Vec<&str> = Vec::new();
    bars.iter()
        .map(|b| {
            let fallback = match unknown.iter().position(|u| *u == b.work_breakdown) {
                Some(i) => i,
                None => {
                    unknown.push(&b.work_breakdown);
                    unknown.len() - 1
                }
            };
            PercentBar {
                label: b.label.clone(),
                group: b.work_breakdown.clone(),
                color: layout::agency_color(&b.work_breakdown, fallback),
                value: b.completion(),
            }
        })
        .collect()
}

fn civil_percent_bars(bars: &[CivilWorkBar]) -> Vec<PercentBar> {
    bars.iter()
        .map(|b| PercentBar {
            label: if b.combined {
                format!("{} {}", b.task_group, b.work_breakdown)
            } else {
                b.work_breakdown.clone()
            },
            group: b.task_group.clone(),
            color: layout::civil_color(&b.task_group),
            value: b.completion(),
        })
        .collect()
}

fn draw_percent_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    bars: &[PercentBar],
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let y_max = axis_max(bars.iter().filter_map(|b| b.value), 110.0);
    let count = labels.len().max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(count), 0f64..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("Task Breakdown")
        .y_desc("Completion (%)")
        .draw()
        .map_err(chart_error)?;

    // 凡例のためグループごとに系列を分ける
    let mut groups: Vec<(&str, Rgb)> = Vec::new();
    for bar in bars {
        if !groups.iter().any(|(g, _)| *g == bar.group) {
            groups.push((&bar.group, bar.color));
        }
    }

    for (group, rgb) in groups {
        let c = color(rgb);
        chart
            .draw_series(
                bars.iter()
                    .enumerate()
                    .filter(|(_, b)| b.group == group)
                    .map(|(i, b)| {
                        let x = i as f64;
                        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.value.unwrap_or(0.0))], c.filled())
                    }),
            )
            .map_err(chart_error)?
            .label(group)
            .legend(legend_box(c));
    }

    chart
        .draw_series(bars.iter().enumerate().map(|(i, b)| {
            Text::new(
                format_percent(b.value),
                (i as f64, b.value.unwrap_or(0.0)),
                bar_label_style(),
            )
        }))
        .map_err(chart_error)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)
}

/// 値のある連続区間ごとに折れ線を分ける
fn line_segments<F>(points: &[ProgressPoint], start: NaiveDate, value: F) -> Vec<Vec<(f64, f64)>>
where
    F: Fn(&ProgressPoint) -> Option<f64>,
{
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for p in points {
        match value(p) {
            Some(v) => {
                let x = (p.date.date() - start).num_days() as f64;
                current.push((x, v));
            }
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// 週ごとの目盛り（1週に満たなければ日ごと）
fn tick_step(days: i64) -> f64 {
    if days > 7 { 7.0 } else { 1.0 }
}

fn draw_scurve<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    points: &[ProgressPoint],
) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    let start = points
        .first()
        .map(|p| p.date.date())
        .unwrap_or_default();
    let days = points
        .last()
        .map(|p| (p.date.date() - start).num_days())
        .unwrap_or(0)
        .max(1);
    let y_max = axis_max(
        points.iter().flat_map(|p| [p.baseline, p.actual]).flatten(),
        0.0,
    );
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22))
        .margin(15)
        .x_label_area_size(70)
        .y_label_area_size(70)
        .build_cartesian_2d((0f64..days as f64).step(tick_step(days)), 0f64..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .light_line_style(LIGHT_GREY_STYLE)
        .x_label_formatter(&|x| {
            (start + Duration::days(x.round() as i64))
                .format("%d %b %Y")
                .to_string()
        })
        .x_label_style(TextStyle::from((FONT, 12).into_font()).transform(FontTransform::Rotate90))
        .x_desc("Date")
        .y_desc("Cumulative Work (%)")
        .draw()
        .map_err(chart_error)?;

    let baseline = line_segments(points, start, |p| p.baseline);
    for (i, segment) in baseline.into_iter().enumerate() {
        let series = chart
            .draw_series(DashedLineSeries::new(
                segment.into_iter(),
                16,
                8,
                BLACK.stroke_width(4),
            ))
            .map_err(chart_error)?;
        if i == 0 {
            series
                .label("Baseline")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(4)));
        }
    }

    let actual = line_segments(points, start, |p| p.actual);
    for (i, segment) in actual.into_iter().enumerate() {
        let series = chart
            .draw_series(LineSeries::new(segment, RED.stroke_width(4)))
            .map_err(chart_error)?;
        if i == 0 {
            series
                .label("Actual")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(4)));
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    draw_border(root)?;
    root.present().map_err(chart_error)
}

const LIGHT_GREY_STYLE: ShapeStyle = ShapeStyle {
    color: RGBAColor(211, 211, 211, 1.0),
    filled: false,
    stroke_width: 1,
};

fn draw_station_progress<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    rows: &[StationProgress],
) -> Result<()> {
    let linen = color(layout::LINEN);
    root.fill(&linen).map_err(chart_error)?;

    let labels: Vec<String> = rows.iter().map(|r| r.station_name.clone()).collect();
    let count = labels.len().max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22).into_font().style(FontStyle::Bold))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(130)
        .build_cartesian_2d(0f64..107f64, category_range(count))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count)
        .y_label_formatter(&|y| category_label(&labels, *y))
        .x_desc("Work Progress (%)")
        .y_desc("Station Name")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let y = i as f64;
            Rectangle::new(
                [(0.0, y - 0.3), (r.baseline_progress, y + 0.3)],
                BLACK.mix(0.2).filled(),
            )
        }))
        .map_err(chart_error)?
        .label("Baseline")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], BLACK.mix(0.2).filled()));

    for (p, package) in contract_packages(rows).iter().enumerate() {
        let c = color(layout::set1_color(p));
        chart
            .draw_series(
                rows.iter()
                    .enumerate()
                    .filter(|(_, r)| &r.contract_package == package)
                    .map(|(i, r)| {
                        let y = i as f64;
                        Rectangle::new([(0.0, y - 0.2), (r.work_progress, y + 0.2)], c.filled())
                    }),
            )
            .map_err(chart_error)?
            .label(package.as_str())
            .legend(legend_box(c));
    }

    let value_style = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            Text::new(
                format!("{:.1}%", r.work_progress),
                (r.work_progress + 0.8, i as f64),
                value_style.clone(),
            )
        }))
        .map_err(chart_error)?;

    let trend = color(layout::TREND_ORANGE);
    let trend_points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.work_progress, i as f64))
        .collect();
    chart
        .draw_series(LineSeries::new(
            trend_points.clone(),
            trend.mix(0.7).stroke_width(2),
        ))
        .map_err(chart_error)?
        .label("Progress Trend")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], trend.stroke_width(2)));
    chart
        .draw_series(
            trend_points
                .iter()
                .map(|&p| Circle::new(p, 5, trend.mix(0.7).filled())),
        )
        .map_err(chart_error)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)
}
