//! 日報PDF・作業内訳Excel・ギャラリー出力の統合テスト

use chrono::NaiveDate;
use image::{Rgb, RgbImage};
use progress_common::{Corridor, ReportRecord, SectionChoice, WorkItem};
use progress_dashboard::breakdown::build_view;
use progress_dashboard::export::excel;
use progress_dashboard::export::pdf::{self, ReportImage};
use progress_dashboard::gallery::{build_gallery, render_html};
use progress_dashboard::report::ReportSession;
use progress_dashboard::scanner;
use std::io::Cursor;
use tempfile::tempdir;

fn filled_record() -> ReportRecord {
    ReportRecord {
        project_name: "Dhaka Metro Rail Project".into(),
        station: "S06-Badda".into(),
        contractor_name: "ABC Builders".into(),
        subcontractor_name: "XYZ Utilities".into(),
        inspector_name: "R. Karim".into(),
        report_date: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
        weather_condition: "Partly Cloudy".into(),
        workers_present: 35,
        equipment_count: 4,
        overall_progress: 62,
        activities_completed: "Trench excavation E1 chainage 0+100 to 0+180.".into(),
        ..Default::default()
    }
}

fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(64, 48, Rgb(color));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("PNG encode failed");
    bytes
}

fn report_images(n: usize) -> Vec<ReportImage> {
    (0..n)
        .map(|i| ReportImage {
            name: format!("site_{}.png", i + 1),
            data: png_bytes([40 * i as u8, 120, 200]),
        })
        .collect()
}

#[test]
fn test_report_pdf_with_zero_to_four_images() {
    for n in 0..=4 {
        let bytes = pdf::generate_report_pdf(&filled_record(), &report_images(n));
        assert!(bytes.is_ok(), "PDF生成に失敗 ({}枚): {:?}", n, bytes.err());
        let bytes = bytes.unwrap();
        assert!(bytes.starts_with(b"%PDF"), "PDFヘッダーがない ({}枚)", n);
    }
}

#[test]
fn test_report_pdf_with_undecodable_image() {
    let images = vec![
        ReportImage {
            name: "broken.jpg".into(),
            data: b"not an image".to_vec(),
        },
        report_images(1).remove(0),
    ];
    let bytes = pdf::generate_report_pdf(&filled_record(), &images).unwrap();
    assert!(!bytes.is_empty());
}

#[test]
fn test_report_pdf_missing_required_field() {
    let mut record = filled_record();
    record.contractor_name = String::new();
    let err = pdf::generate_report_pdf(&record, &[]).unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all required fields marked with *");
}

#[test]
fn test_report_session_keeps_previous_pdf_on_invalid_submit() {
    let mut session = ReportSession::new();
    let first = session
        .submit(&filled_record(), &report_images(2))
        .unwrap()
        .clone();
    assert_eq!(first.summary.image_count, 2);
    assert_eq!(
        first.file_name,
        "Site_Visit_Report_Dhaka_Metro_Rail_Project_20250308.pdf"
    );

    let mut invalid = filled_record();
    invalid.project_name = "   ".into();
    assert!(session.submit(&invalid, &[]).is_err());
    assert_eq!(session.generated(), Some(&first));
    assert!(session.error().is_some());
}

#[test]
fn test_write_report_pdf_uses_file_name() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = pdf::write_report_pdf(&filled_record(), &[], dir.path()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "Site_Visit_Report_Dhaka_Metro_Rail_Project_20250308.pdf"
    );
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_breakdown_excel_export() {
    let items = vec![
        WorkItem {
            corridor: Corridor::East,
            section: "E1".into(),
            task_group: "Utility Laying".into(),
            work_breakdown: "DWASA".into(),
            size: "200mm".into(),
            planned: 100.0,
            actual: 40.0,
            identifier: Some("Main Road".into()),
        },
        WorkItem {
            corridor: Corridor::East,
            section: "E2".into(),
            task_group: "Excavation".into(),
            work_breakdown: "Trench".into(),
            size: String::new(),
            planned: 0.0,
            actual: 0.0,
            identifier: None,
        },
    ];
    let view = build_view("Badda", &items, Corridor::East, &SectionChoice::All);
    assert_eq!(view.row_count(), 2);

    let dir = tempdir().unwrap();
    let path = dir.path().join("breakdown.xlsx");
    excel::generate_breakdown_excel(&view, &path).unwrap();
    assert!(path.exists());

    // 出力したExcelは calamine で読み戻せる
    let sheets = progress_common::load_workbook(&path).unwrap();
    assert!(!sheets.is_empty());
}

#[test]
fn test_gallery_from_folder() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a_plan.png"), png_bytes([0, 0, 0])).unwrap();
    std::fs::write(dir.path().join("b_e1.png"), png_bytes([255, 0, 0])).unwrap();
    std::fs::write(dir.path().join("c_w1.jpg"), b"broken").unwrap();

    let images = scanner::scan_folder(dir.path()).unwrap();
    let gallery = build_gallery("Badda", &images, None);

    assert_eq!(gallery.plan.as_ref().unwrap().caption, "Badda Plan View");
    assert_eq!(gallery.sections[0].caption, "Section: B_E1");
    assert!(gallery.sections[1]
        .content
        .as_ref()
        .unwrap_err()
        .starts_with("Error loading c_w1.jpg"));

    let html = render_html(&gallery);
    assert!(html.contains("Section: B_E1"));
    assert!(html.contains("Error loading c_w1.jpg"));
}
