use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui::{self, Color32, RichText};
use progress_common::dates::{parse_iso_date, ISSUE_DATE_FORMAT};
use progress_common::filter::{corridors, filter_rows, group_by_task, section_choices};
use progress_common::issues::{issue_log_title, normalize_issue_dates};
use progress_common::report::{
    MAX_REPORT_IMAGES, SAFETY_OPTIONS, STATION_OPTIONS, TEMPERATURE_RANGE, WEATHER_OPTIONS,
};
use progress_common::types::SHEET_ISSUE_LOG;
use progress_common::{
    Chart, Totals, format_percent, load_workbook, render_rgb, sheets, station_charts,
};

use crate::io::{
    DecodedImage, copy_report, decode_image, load_settings, load_station, work_dir, write_record,
};
use crate::model::{
    GeneratedReport, IssueGate, Page, ReportForm, Selection, Settings, StationData,
};

const CHART_SIZE: (u32, u32) = (960, 560);
const TILE_SIZE: (u32, u32) = (800, 400);
const PLAN_MAX: u32 = 1600;

enum TileState {
    Loading,
    Ready(egui::TextureHandle),
    Failed(String),
}

struct GalleryTile {
    file: String,
    caption: String,
    updated: Option<String>,
    state: TileState,
}

struct ImageMessage {
    station: String,
    index: usize,
    result: Result<DecodedImage, String>,
}

enum UiMessage {
    ReportDone {
        message: Result<GeneratedReport, String>,
    },
}

pub struct DesktopApp {
    settings: Settings,
    page: Page,
    data: Option<StationData>,
    selection: Selection,
    status: String,
    charts: Vec<(String, egui::TextureHandle)>,
    charts_for: Option<String>,
    overview: Option<(String, egui::TextureHandle)>,
    gallery: Vec<GalleryTile>,
    image_tx: Sender<ImageMessage>,
    image_rx: Receiver<ImageMessage>,
    issue_gate: IssueGate,
    report: ReportForm,
    report_rx: Option<Receiver<UiMessage>>,
    generating: bool,
}

impl DesktopApp {
    pub fn new() -> Self {
        let (image_tx, image_rx) = mpsc::channel();
        let (settings, status) = match load_settings() {
            Ok(settings) => (settings, String::new()),
            Err(err) => (Settings::default(), format!("Config load failed: {err:#}")),
        };
        Self {
            settings,
            page: Page::default(),
            data: None,
            selection: Selection::default(),
            status,
            charts: Vec::new(),
            charts_for: None,
            overview: None,
            gallery: Vec::new(),
            image_tx,
            image_rx,
            issue_gate: IssueGate::default(),
            report: ReportForm::default(),
            report_rx: None,
            generating: false,
        }
    }

    /// 駅が変わったときだけ読み直し、前の駅の表示物は捨てる
    fn select_station(&mut self, name: &str) {
        if self.data.as_ref().is_some_and(|d| d.name == name) {
            return;
        }
        self.data = None;
        self.charts.clear();
        self.charts_for = None;
        self.gallery.clear();

        match load_station(&self.settings, name) {
            Ok(data) => {
                self.selection.reset(&data.items);
                self.status = format!("Loaded {} ({} rows)", data.name, data.items.len());
                self.data = Some(data);
                self.request_gallery();
            }
            Err(err) => self.status = format!("Load failed: {err:#}"),
        }
    }

    fn request_gallery(&mut self) {
        let Some(data) = &self.data else {
            return;
        };
        let image_dir = self.settings.image_dir();
        for (index, entry) in data.images.iter().enumerate() {
            let file = PathBuf::from(&entry.image)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| entry.image.clone());
            let caption = if index == 0 {
                format!("{} Plan View", data.name)
            } else {
                let stem = PathBuf::from(&file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_uppercase())
                    .unwrap_or_default();
                format!("Section: {stem}")
            };
            self.gallery.push(GalleryTile {
                file,
                caption,
                updated: entry
                    .updated_on
                    .map(|d| format!("Updated on {}", d.format(ISSUE_DATE_FORMAT))),
                state: TileState::Loading,
            });

            let path = image_dir.join(&entry.image);
            let exact = if index == 0 { None } else { Some(TILE_SIZE) };
            let sender = self.image_tx.clone();
            let station = data.name.clone();
            std::thread::spawn(move || {
                let result = decode_image(&path, exact, PLAN_MAX).map_err(|e| e.to_string());
                let _ = sender.send(ImageMessage {
                    station,
                    index,
                    result,
                });
            });
        }
    }

    fn poll_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.image_rx.try_recv() {
            // 別の駅に切り替わった後の結果は捨てる
            if self.data.as_ref().map(|d| d.name.as_str()) != Some(msg.station.as_str()) {
                continue;
            }
            let Some(tile) = self.gallery.get_mut(msg.index) else {
                continue;
            };
            tile.state = match msg.result {
                Ok(image) => {
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied(image.size, &image.pixels);
                    TileState::Ready(ctx.load_texture(
                        format!("{}:{}", msg.station, tile.file),
                        color_image,
                        egui::TextureOptions::default(),
                    ))
                }
                Err(err) => TileState::Failed(format!("Error loading {}: {}", tile.file, err)),
            };
        }

        if let Some(rx) = &self.report_rx {
            if let Ok(UiMessage::ReportDone { message }) = rx.try_recv() {
                self.generating = false;
                self.report_rx = None;
                match message {
                    Ok(report) => {
                        self.report.error = None;
                        self.report.generated = Some(report);
                    }
                    // 生成に失敗しても直前の日報は残す
                    Err(err) => self.report.error = Some(err),
                }
            }
        }
    }

    fn ensure_charts(&mut self, ctx: &egui::Context) {
        let Some(data) = &self.data else {
            return;
        };
        if self.charts_for.as_deref() == Some(data.name.as_str()) {
            return;
        }
        self.charts_for = Some(data.name.clone());
        self.charts.clear();

        for chart in station_charts(&data.items, &data.points, self.settings.scurve_cutoff) {
            match chart_texture(ctx, &chart) {
                Ok(texture) => self.charts.push((chart.title(), texture)),
                Err(err) => {
                    self.status = format!("Chart failed: {err}");
                    break;
                }
            }
        }
    }

    fn open_overview(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Excel", &["xlsx"])
            .pick_file()
        else {
            return;
        };
        let result = load_workbook(&path).and_then(|set| {
            let name = set
                .names()
                .first()
                .map(|s| s.to_string())
                .unwrap_or_default();
            sheets::station_progress(set.sheet(&name)?)
        });
        match result.map(Chart::StationProgress) {
            Ok(chart) => match chart_texture(ctx, &chart) {
                Ok(texture) => self.overview = Some((chart.title(), texture)),
                Err(err) => self.status = format!("Chart failed: {err}"),
            },
            Err(err) => self.status = format!("Load failed: {err}"),
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Station");
        let current = self.data.as_ref().map(|d| d.name.clone());
        let mut chosen = current.clone();
        egui::ComboBox::from_id_source("station")
            .selected_text(current.clone().unwrap_or_else(|| "Select...".to_string()))
            .show_ui(ui, |ui| {
                for station in &self.settings.stations {
                    ui.selectable_value(&mut chosen, Some(station.name.clone()), station.name.as_str());
                }
            });
        if chosen != current {
            if let Some(name) = chosen {
                self.select_station(&name);
            }
        }
        if ui.button("Reload").clicked() {
            if let Some(name) = self.data.as_ref().map(|d| d.name.clone()) {
                self.data = None;
                self.select_station(&name);
            }
        }

        let Some(data) = &self.data else {
            return;
        };

        ui.separator();
        ui.heading("Corridor");
        let mut corridor = self.selection.corridor;
        for c in corridors(&data.items) {
            ui.radio_value(&mut corridor, Some(c), c.as_str());
        }
        if let Some(c) = corridor {
            self.selection.set_corridor(c, &data.items);
        }

        let Some(corridor) = self.selection.corridor else {
            return;
        };
        ui.separator();
        ui.heading("Section");
        let choices = section_choices(&data.items, corridor);
        let mut section = self.selection.section.clone();
        egui::ComboBox::from_id_source("section")
            .selected_text(
                section
                    .as_ref()
                    .map(|s| s.label().to_string())
                    .unwrap_or_default(),
            )
            .show_ui(ui, |ui| {
                for choice in &choices {
                    ui.selectable_value(&mut section, Some(choice.clone()), choice.label());
                }
            });
        self.selection.section = section;
    }

    fn render_breakdown(&self, ui: &mut egui::Ui) {
        let Some(data) = &self.data else {
            ui.label("Select a station.");
            return;
        };
        let (Some(corridor), Some(section)) = (self.selection.corridor, &self.selection.section)
        else {
            ui.label("No corridor data.");
            return;
        };

        ui.heading(format!(
            "{} - {} Corridor / Section: {}",
            data.name, corridor, section
        ));
        let rows = filter_rows(&data.items, corridor, section);
        if rows.is_empty() {
            ui.label("No rows match the selection.");
            return;
        }

        for group in group_by_task(&rows) {
            let totals = Totals::of(group.rows.iter().copied());
            egui::CollapsingHeader::new(format!(
                "{}  [{}]",
                group.task_group,
                format_percent(totals.completion())
            ))
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new(format!("group_{}", group.task_group))
                    .striped(true)
                    .min_col_width(60.0)
                    .show(ui, |ui| {
                        for item in &group.rows {
                            let name = if item.size.is_empty() {
                                item.work_breakdown.clone()
                            } else {
                                format!("{} ({})", item.work_breakdown, item.size)
                            };
                            ui.label(item.section.as_str());
                            ui.label(name);
                            ui.label(format!("{:.2} / {:.2}", item.actual, item.planned));
                            let progress = item.progress_pct();
                            let ratio = progress.map(|p| (p / 100.0).clamp(0.0, 1.0)).unwrap_or(0.0);
                            ui.add(
                                egui::ProgressBar::new(ratio as f32)
                                    .desired_width(220.0)
                                    .text(format_percent(progress)),
                            );
                            ui.end_row();
                        }
                    });
            });
        }
    }

    fn render_plotting(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            if ui.button("Open station overview workbook...").clicked() {
                self.open_overview(ctx);
            }
        });
        if let Some((title, texture)) = &self.overview {
            ui.label(RichText::new(title).strong());
            ui.add(egui::Image::new(texture).shrink_to_fit());
            ui.separator();
        }

        if self.data.is_none() {
            ui.label("Select a station.");
            return;
        }
        self.ensure_charts(ctx);
        for (title, texture) in &self.charts {
            ui.label(RichText::new(title).strong());
            ui.add(egui::Image::new(texture).shrink_to_fit());
            ui.add_space(12.0);
        }
    }

    fn render_images(&self, ui: &mut egui::Ui) {
        let Some(data) = &self.data else {
            ui.label("Select a station.");
            return;
        };
        ui.heading(format!("{} - Construction Progress Gallery", data.name));
        if self.gallery.is_empty() {
            ui.label("No images listed for this station.");
            return;
        }

        let width = ui.available_width();
        if let Some(plan) = self.gallery.first() {
            render_tile(ui, plan, width);
        }
        for pair in self.gallery[1..].chunks(2) {
            ui.columns(2, |columns| {
                for (column, tile) in columns.iter_mut().zip(pair) {
                    let w = column.available_width();
                    render_tile(column, tile, w);
                }
            });
        }
    }

    fn render_issue_logs(&mut self, ui: &mut egui::Ui) {
        if !self.issue_gate.authenticated {
            ui.heading("Issue Logs");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.issue_gate.entered)
                    .password(true)
                    .hint_text("Enter Passcode"),
            );
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Submit").clicked() || entered {
                let expected = self.settings.passcode();
                self.issue_gate.submit(expected.as_deref());
            }
            if let Some(err) = &self.issue_gate.error {
                ui.label(RichText::new(err).color(Color32::RED));
            }
            return;
        }

        let Some(data) = &self.data else {
            ui.label("Select a station.");
            return;
        };
        ui.heading(issue_log_title(&data.name));
        let table = match data.sheets.sheet(SHEET_ISSUE_LOG) {
            Ok(table) => normalize_issue_dates(table),
            Err(err) => {
                ui.label(RichText::new(err.to_string()).color(Color32::RED));
                return;
            }
        };

        egui::ScrollArea::horizontal().show(ui, |ui| {
            egui::Grid::new("issue_log").striped(true).show(ui, |ui| {
                for column in &table.columns {
                    ui.label(RichText::new(column).strong());
                }
                ui.end_row();
                for row in 0..table.len() {
                    for col in 0..table.columns.len() {
                        ui.label(table.cell(row, col).text());
                    }
                    ui.end_row();
                }
            });
        });
    }

    fn render_report(&mut self, ui: &mut egui::Ui) {
        ui.heading("Daily Site Visit Report");
        let form = &mut self.report;
        let record = &mut form.record;

        egui::Grid::new("report_basic").num_columns(2).show(ui, |ui| {
            ui.label("Project Name *");
            ui.text_edit_singleline(&mut record.project_name);
            ui.end_row();

            ui.label("Station Name *");
            egui::ComboBox::from_id_source("report_station")
                .selected_text(record.station.clone())
                .show_ui(ui, |ui| {
                    for option in STATION_OPTIONS {
                        ui.selectable_value(&mut record.station, option.to_string(), *option);
                    }
                });
            ui.end_row();

            ui.label("Client Name *");
            ui.text_edit_singleline(&mut record.client_name);
            ui.end_row();
            ui.label("Contractor Name *");
            ui.text_edit_singleline(&mut record.contractor_name);
            ui.end_row();
            ui.label("Sub-Contractor Name");
            ui.text_edit_singleline(&mut record.subcontractor_name);
            ui.end_row();
            ui.label("Inspector Name *");
            ui.text_edit_singleline(&mut record.inspector_name);
            ui.end_row();

            ui.label("Report Date (YYYY-MM-DD)");
            ui.text_edit_singleline(&mut form.date_text);
            ui.end_row();
            ui.label("Visit Start / End");
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut record.visit_start_time).desired_width(60.0));
                ui.add(egui::TextEdit::singleline(&mut record.visit_end_time).desired_width(60.0));
            });
            ui.end_row();

            ui.label("Weather Condition");
            egui::ComboBox::from_id_source("weather")
                .selected_text(record.weather_condition.clone())
                .show_ui(ui, |ui| {
                    for option in WEATHER_OPTIONS {
                        ui.selectable_value(&mut record.weather_condition, option.to_string(), *option);
                    }
                });
            ui.end_row();
            ui.label("Temperature (°C)");
            ui.add(egui::DragValue::new(&mut record.temperature).clamp_range(TEMPERATURE_RANGE));
            ui.end_row();
            ui.label("Safety Compliance");
            egui::ComboBox::from_id_source("safety")
                .selected_text(record.safety_compliance.clone())
                .show_ui(ui, |ui| {
                    for option in SAFETY_OPTIONS {
                        ui.selectable_value(&mut record.safety_compliance, option.to_string(), *option);
                    }
                });
            ui.end_row();

            ui.label("Workers Present");
            ui.add(egui::DragValue::new(&mut record.workers_present));
            ui.end_row();
            ui.label("Equipment Units");
            ui.add(egui::DragValue::new(&mut record.equipment_count));
            ui.end_row();
            ui.label("Overall Progress (%)");
            ui.add(egui::Slider::new(&mut record.overall_progress, 0..=100));
            ui.end_row();
            ui.label("Work Started / Completed");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut record.work_started);
                ui.text_edit_singleline(&mut record.work_completed);
            });
            ui.end_row();
        });

        for (label, text) in [
            ("Activities Completed", &mut record.activities_completed),
            ("Issues & Challenges", &mut record.issues_challenges),
            ("Recommendations", &mut record.recommendations),
            ("Next Day Plan", &mut record.next_day_plan),
        ] {
            ui.label(label);
            ui.add(egui::TextEdit::multiline(text).desired_rows(3).desired_width(f32::INFINITY));
        }

        ui.separator();
        ui.horizontal(|ui| {
            let can_add = form.images.len() < MAX_REPORT_IMAGES;
            if ui.add_enabled(can_add, egui::Button::new("Add Photos...")).clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Images", &["jpg", "jpeg", "png"])
                    .pick_files()
                {
                    form.add_images(paths);
                }
            }
            if ui.add_enabled(!form.images.is_empty(), egui::Button::new("Clear Photos")).clicked() {
                form.images.clear();
            }
            ui.label(format!("{}/{} photos", form.images.len(), MAX_REPORT_IMAGES));
        });
        for path in &form.images {
            ui.label(path.display().to_string());
        }

        ui.separator();
        if ui
            .add_enabled(!self.generating, egui::Button::new("Generate Report"))
            .clicked()
        {
            self.run_report();
        }
        if self.generating {
            ui.label("Generating report...");
        }
        if let Some(err) = &self.report.error {
            ui.label(RichText::new(err).color(Color32::RED));
        }
        if let Some(report) = self.report.generated.clone() {
            ui.group(|ui| {
                ui.label(RichText::new(format!("✔ {}", report.file_name)).strong());
                ui.label(format!("Overall Progress: {}%", report.overall_progress));
                ui.label(format!("Workers Present: {}", report.workers_present));
                ui.label(format!("Equipment Units: {}", report.equipment_count));
                ui.label(format!("Images Attached: {}", report.image_count));
                if ui.button("Save PDF...").clicked() {
                    self.save_report(&report);
                }
            });
        }
    }

    /// 入力を確認してからCLIで日報PDFを生成（ワーカースレッド）
    fn run_report(&mut self) {
        let form = &mut self.report;
        match parse_iso_date(&form.date_text) {
            Ok(date) => form.record.report_date = date,
            Err(err) => {
                form.error = Some(err);
                return;
            }
        }
        if let Err(err) = form.record.validate() {
            form.error = Some(err.to_string());
            return;
        }
        let input = match write_record(&form.record) {
            Ok(path) => path,
            Err(err) => {
                form.error = Some(format!("{err:#}"));
                return;
            }
        };

        let record = form.record.clone();
        let images = form.images.clone();
        let out_dir = work_dir().join("reports");
        let cli = resolve_cli_binary();
        let (tx, rx) = mpsc::channel();
        self.report_rx = Some(rx);
        self.generating = true;

        std::thread::spawn(move || {
            let mut args = vec![
                "report".to_string(),
                "--input".to_string(),
                input.to_string_lossy().to_string(),
                "--output".to_string(),
                out_dir.to_string_lossy().to_string(),
            ];
            for image in &images {
                args.push("--image".to_string());
                args.push(image.to_string_lossy().to_string());
            }
            let result = std::process::Command::new(cli).args(&args).output();

            let message = match result {
                Ok(out) if out.status.success() => Ok(GeneratedReport {
                    path: out_dir.join(record.file_name()),
                    file_name: record.file_name(),
                    image_count: images.len().min(MAX_REPORT_IMAGES),
                    overall_progress: record.overall_progress,
                    workers_present: record.workers_present,
                    equipment_count: record.equipment_count,
                }),
                Ok(out) => {
                    let stderr = String::from_utf8_lossy(&out.stderr);
                    Err(stderr.trim().trim_start_matches("❌").trim().to_string())
                }
                Err(err) => Err(format!("Error generating report: {err}")),
            };
            let _ = tx.send(UiMessage::ReportDone { message });
        });
    }

    fn save_report(&mut self, report: &GeneratedReport) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&report.file_name)
            .add_filter("PDF", &["pdf"])
            .save_file()
        else {
            return;
        };
        match copy_report(&report.path, &path) {
            Ok(_) => self.status = format!("Saved {}", path.display()),
            Err(err) => self.status = format!("Save failed: {err:#}"),
        }
    }
}

fn chart_texture(ctx: &egui::Context, chart: &Chart) -> progress_common::Result<egui::TextureHandle> {
    let rgb = render_rgb(chart, CHART_SIZE)?;
    let image = egui::ColorImage::from_rgb([CHART_SIZE.0 as usize, CHART_SIZE.1 as usize], &rgb);
    Ok(ctx.load_texture(chart.file_stem(), image, egui::TextureOptions::default()))
}

fn render_tile(ui: &mut egui::Ui, tile: &GalleryTile, width: f32) {
    ui.group(|ui| {
        match &tile.state {
            TileState::Loading => {
                ui.label(format!("Loading {}...", tile.file));
            }
            TileState::Ready(texture) => {
                ui.add(egui::Image::new(texture).max_width(width - 16.0));
            }
            TileState::Failed(message) => {
                ui.label(RichText::new(message).color(Color32::RED));
                return;
            }
        }
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&tile.caption).strong().size(18.0));
            if let Some(updated) = &tile.updated {
                ui.label(RichText::new(updated).weak());
            }
        });
    });
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let loading = self
            .gallery
            .iter()
            .any(|t| matches!(t.state, TileState::Loading));
        if self.generating || loading {
            ctx.request_repaint();
        }
        self.poll_messages(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for page in Page::ALL {
                    ui.selectable_value(&mut self.page, page, page.label());
                }
                ui.separator();
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(110)));
                }
            });
        });

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .show(ctx, |ui| self.render_sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.page {
                    Page::WorkBreakdown => self.render_breakdown(ui),
                    Page::Plotting => self.render_plotting(ui, ctx),
                    Page::Images => self.render_images(ui),
                    Page::IssueLogs => self.render_issue_logs(ui),
                    Page::Report => self.render_report(ui),
                });
        });
    }
}

fn resolve_cli_binary() -> PathBuf {
    let name = format!("progress-dashboard{}", std::env::consts::EXE_SUFFIX);
    let exe = std::env::current_exe().ok();
    if let Some(base_dir) = exe.as_ref().and_then(|p| p.parent()) {
        let local = base_dir.join(&name);
        if local.exists() {
            return local;
        }
        if let Some(target_dir) = base_dir.parent() {
            for profile in ["debug", "release"] {
                let candidate = target_dir.join(profile).join(&name);
                if candidate.exists() {
                    return candidate;
                }
            }
        }
    }
    PathBuf::from(name)
}
