use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use progress_common::dates::parse_iso_date;
use progress_common::filter::{corridors, default_choice, section_choices};
use progress_common::{
    format_percent, road_summary, render_svg, sheets, station_charts, Chart, Error as CommonError,
    ReportRecord, SectionChoice, XlsxLoader,
};
use progress_dashboard::{
    auth, breakdown, catalog, cli, config, error, export, gallery, issues, report, scanner,
    session,
};
use std::path::{Path, PathBuf};

use catalog::StationCatalog;
use cli::{Cli, Commands};
use config::Config;
use error::{DashboardError, Result};
use session::Session;

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
        pb.set_style(style);
    }
    pb
}

fn open_session(config: &Config) -> Session<XlsxLoader> {
    let catalog = StationCatalog::new(config.data_dir.clone(), config.stations.clone());
    Session::new(catalog, XlsxLoader)
}

/// 駅名が指定されていなければ対話選択
fn resolve_station(config: &Config, station: Option<String>) -> Result<String> {
    match station {
        Some(name) => Ok(name),
        None => {
            let names: Vec<&str> = config.stations.iter().map(|s| s.name.as_str()).collect();
            auth::select_station_interactive(&names)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Stations => {
            println!("🚉 progress-dashboard - 駅一覧\n");
            let catalog = StationCatalog::new(config.data_dir.clone(), config.stations.clone());
            for entry in catalog.entries() {
                let path = catalog.data_dir().join(&entry.file);
                let mark = if path.exists() { "✔" } else { "✘" };
                println!("  {} {:<16} {}", mark, entry.name, path.display());
            }

            match catalog::discover(catalog.data_dir()) {
                Ok(found) => {
                    println!("\nデータフォルダ内のワークブック: {}件", found.len());
                    for workbook in found {
                        println!("  - {:<16} {}", workbook.station, workbook.path.display());
                    }
                }
                Err(e) => println!("\n{}", e),
            }
        }

        Commands::Breakdown {
            station,
            corridor,
            section,
            xlsx,
        } => {
            let station = resolve_station(&config, station)?;
            let mut session = open_session(&config);

            println!("[1/2] ワークブックを読み込み中...");
            let loaded = session.select_station(&station)?;
            let items = loaded.work_items()?;
            println!("✔ {}: {}行\n", loaded.name, items.len());

            let corridor = match corridor.or_else(|| corridors(&items).first().copied()) {
                Some(c) => c,
                None => {
                    println!("(Corridor Work シートにデータがありません)");
                    return Ok(());
                }
            };
            let choices = section_choices(&items, corridor);
            let choice = match section {
                Some(text) => SectionChoice::parse(&text),
                None => default_choice(&choices).unwrap_or(SectionChoice::All),
            };
            log::debug!(
                "section choices for {}: {:?}",
                corridor,
                choices.iter().map(|c| c.label()).collect::<Vec<_>>()
            );

            println!("[2/2] 集計中...");
            let view = breakdown::build_view(&loaded.name, &items, corridor, &choice);
            println!("{}", breakdown::render_text(&view));

            if let Some(output) = xlsx {
                let path = export::output_path_for(&output, "work_breakdown", "xlsx");
                export::excel::generate_breakdown_excel(&view, &path)?;
                println!("✔ Excelを保存: {}", path.display());
            }
        }

        Commands::Plot {
            station,
            output,
            cutoff,
        } => {
            println!("📈 progress-dashboard - 進捗グラフ\n");
            let station = resolve_station(&config, station)?;
            let cutoff = match cutoff {
                Some(text) => parse_iso_date(&text).map_err(DashboardError::Config)?,
                None => config.scurve_cutoff,
            };
            let mut session = open_session(&config);

            println!("[1/3] ワークブックを読み込み中...");
            let loaded = session.select_station(&station)?;
            let items = loaded.work_items()?;
            let points = loaded.progress_points()?;
            println!("✔ 作業 {}行 / 進捗 {}点\n", items.len(), points.len());

            println!("[2/3] 道路区分別の集計");
            for row in road_summary(&items) {
                println!(
                    "  {:<18} {:<5} {:>12.2} / {:<12.2} {:>7}",
                    row.identifier,
                    row.corridor,
                    row.totals.actual,
                    row.totals.planned,
                    format_percent(row.totals.completion())
                );
            }
            println!();

            println!("[3/3] グラフを出力中...");
            let out_dir = output.unwrap_or_else(|| config.output_dir());
            std::fs::create_dir_all(&out_dir)?;
            let charts = station_charts(&items, &points, cutoff);
            let written = write_charts(&charts, &out_dir, config.chart_size())?;
            println!("✔ {}件のグラフを保存: {}", written.len(), out_dir.display());
            println!("\n✅ 完了");
        }

        Commands::Overview {
            workbook,
            sheet,
            output,
        } => {
            println!("📊 progress-dashboard - 全駅進捗\n");
            let sheet_set = progress_common::load_workbook(&workbook)?;
            let sheet_name = match sheet {
                Some(name) => name,
                None => sheet_set
                    .names()
                    .first()
                    .map(|s| s.to_string())
                    .ok_or_else(|| CommonError::Workbook("シートがありません".into()))?,
            };
            let rows = sheets::station_progress(sheet_set.sheet(&sheet_name)?)?;
            println!("✔ {}駅分の進捗を読み込み", rows.len());

            let chart = Chart::StationProgress(rows);
            let path = output.unwrap_or_else(|| config.output_dir().join("station_progress.svg"));
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, render_svg(&chart, config.chart_size())?)?;
            println!("✔ グラフを保存: {}", path.display());
        }

        Commands::Gallery {
            station,
            image_dir,
            output,
        } => {
            println!("🖼  progress-dashboard - 工事写真\n");
            let station = resolve_station(&config, station)?;
            let image_dir = image_dir.unwrap_or_else(|| config.image_dir());
            let mut session = open_session(&config);

            println!("[1/2] 画像一覧を取得中...");
            let loaded = session.select_station(&station)?;
            let images = match loaded.image_entries() {
                Ok(entries) => scanner::resolve_entries(&entries, &image_dir),
                Err(DashboardError::Common(CommonError::SheetNotFound(sheet))) => {
                    log::warn!("sheet '{}' not found, scanning {}", sheet, image_dir.display());
                    scanner::scan_folder(&image_dir)?
                }
                Err(e) => return Err(e),
            };
            println!("✔ {}枚\n", images.len());

            println!("[2/2] 画像を変換中...");
            let pb = progress_bar(images.len() as u64);
            let built = gallery::build_gallery(&loaded.name, &images, Some(&pb));
            pb.finish_and_clear();

            for tile in built.tiles() {
                if let Err(message) = &tile.content {
                    println!("  {}", message);
                }
            }

            let path = output.unwrap_or_else(|| {
                config
                    .output_dir()
                    .join(format!("{}_gallery.html", loaded.name.replace(' ', "_")))
            });
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, gallery::render_html(&built))?;
            println!("✔ ギャラリーを保存: {}", path.display());
        }

        Commands::Issues {
            station,
            passcode,
            csv,
        } => {
            let station = resolve_station(&config, station)?;
            auth::authorize(&config, passcode)?;

            let mut session = open_session(&config);
            let loaded = session.select_station(&station)?;
            let view = issues::IssueLogView::new(&loaded.name, loaded.issue_log()?);
            println!("{}", issues::render_text(&view));

            if let Some(output) = csv {
                let path = export::output_path_for(&output, "issue_log", "csv");
                issues::export_csv(&view, &path)?;
                println!("✔ CSVを保存: {}", path.display());
            }
        }

        Commands::Report {
            input,
            images,
            output,
        } => {
            println!("📄 progress-dashboard - 現場巡回日報\n");
            let content = std::fs::read_to_string(&input)
                .map_err(|e| DashboardError::FileNotFound(format!("{}: {}", input.display(), e)))?;
            let record: ReportRecord = serde_json::from_str(&content)?;

            println!("[1/2] 写真を読み込み中...");
            let images: Vec<export::pdf::ReportImage> =
                images.iter().map(|path| load_report_image(path)).collect();
            println!("✔ {}枚\n", images.len());

            println!("[2/2] PDFを生成中...");
            let mut form = report::ReportSession::new();
            let generated = form.submit(&record, &images)?;
            let out_dir = output.unwrap_or_else(|| config.output_dir());
            let path = generated.save(&out_dir)?;

            let summary = &generated.summary;
            println!("✔ PDFを保存: {}", path.display());
            println!("  Overall Progress: {}%", summary.overall_progress);
            println!("  Workers Present:  {}", summary.workers_present);
            println!("  Equipment Units:  {}", summary.equipment_count);
            println!("  Images Attached:  {}", summary.image_count);
        }

        Commands::Config {
            show,
            set_data_dir,
            set_passcode,
        } => {
            let mut config = config;

            if let Some(dir) = set_data_dir {
                config.set_data_dir(dir)?;
                println!("✔ データフォルダを設定しました");
            }

            if let Some(code) = set_passcode {
                config.set_passcode(code)?;
                println!("✔ パスコードを設定しました");
            }

            if show {
                println!("設定:");
                println!("  データフォルダ: {}", config.data_dir.display());
                println!("  画像フォルダ: {}", config.image_dir().display());
                println!("  出力フォルダ: {}", config.output_dir().display());
                println!("  S字カーブ打ち切り日: {}", config.scurve_cutoff);
                println!("  グラフサイズ: {}x{}", config.chart_width, config.chart_height);
                println!(
                    "  パスコード: {}",
                    if config.get_passcode().is_ok() { "設定済み" } else { "未設定" }
                );
                println!("  駅:");
                for entry in &config.stations {
                    println!("    - {} ({})", entry.name, entry.file);
                }
            }
        }
    }

    Ok(())
}

/// 読めない写真は空データにしてPDF側でエラー枠にする
fn load_report_image(path: &Path) -> export::pdf::ReportImage {
    export::pdf::ReportImage::from_path(path).unwrap_or_else(|e| {
        println!("  {}", e);
        export::pdf::ReportImage {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            data: Vec::new(),
        }
    })
}

fn write_charts(charts: &[Chart], out_dir: &Path, size: (u32, u32)) -> Result<Vec<PathBuf>> {
    let pb = progress_bar(charts.len() as u64);
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        pb.set_message(chart.title());
        let svg = render_svg(chart, size)?;
        let path = out_dir.join(format!("{}.svg", chart.file_stem()));
        std::fs::write(&path, svg)?;
        written.push(path);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(written)
}
