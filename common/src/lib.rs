//! Progress Dashboard Common Library
//!
//! CLIとデスクトップで共有されるワークブック読み込み・集計・グラフ・日報ロジック

pub mod aggregate;
pub mod dates;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod issues;
pub mod layout;
pub mod report;
pub mod sheets;
pub mod types;

#[cfg(feature = "xlsx")]
pub mod workbook;

#[cfg(feature = "charts")]
pub mod charts;

pub use aggregate::{
    agency_bars, civil_work_bars, corridor_summary, road_summary, scurve_points, Totals,
};
pub use error::{Error, Result};
pub use filter::{filter_rows, section_choices, SectionChoice};
pub use report::{build_report_content, weather_mark, ReportRecord, ReportSummary, WeatherMark};
pub use types::{
    format_percent, percent, Cell, Corridor, ImageEntry, ProgressPoint, SheetSet,
    StationProgress, Table, WorkItem,
};

#[cfg(feature = "xlsx")]
pub use workbook::{load_workbook, SheetLoader, XlsxLoader};

#[cfg(feature = "charts")]
pub use charts::{render_rgb, render_svg, station_charts, Chart};
