//! 日報フォームの状態
//!
//! 未送信 → 検証 → (不備: エラー表示して未送信のまま) | (生成済み → ダウンロード可)。
//! 不備や生成失敗では直前に生成した日報を残す。

use crate::error::{DashboardError, Result};
use crate::export::pdf::{generate_report_pdf, ReportImage};
use progress_common::report::MAX_REPORT_IMAGES;
use progress_common::{ReportRecord, ReportSummary};
use std::path::{Path, PathBuf};

/// 生成済みの日報
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub summary: ReportSummary,
}

impl GeneratedReport {
    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Default)]
pub struct ReportSession {
    generated: Option<GeneratedReport>,
    error: Option<String>,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力を検証して日報を生成する
    pub fn submit(&mut self, record: &ReportRecord, images: &[ReportImage]) -> Result<&GeneratedReport> {
        self.submit_with(record, images, generate_report_pdf)
    }

    pub fn submit_with<F>(
        &mut self,
        record: &ReportRecord,
        images: &[ReportImage],
        generate: F,
    ) -> Result<&GeneratedReport>
    where
        F: FnOnce(&ReportRecord, &[ReportImage]) -> Result<Vec<u8>>,
    {
        let result = record
            .validate()
            .map_err(DashboardError::from)
            .and_then(|_| generate(record, images));

        match result {
            Ok(bytes) => {
                self.error = None;
                let report = self.generated.insert(GeneratedReport {
                    file_name: record.file_name(),
                    bytes,
                    summary: ReportSummary::new(record, images.len().min(MAX_REPORT_IMAGES)),
                });
                Ok(report)
            }
            Err(e) => {
                log::debug!("report submission rejected: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn generated(&self) -> Option<&GeneratedReport> {
        self.generated.as_ref()
    }

    /// 直近の送信で出たエラー（成功すれば消える）
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_downloadable(&self) -> bool {
        self.generated.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use progress_common::report::REQUIRED_FIELDS_MESSAGE;

    fn filled() -> ReportRecord {
        ReportRecord {
            project_name: "Dhaka MRT Line 1".into(),
            contractor_name: "ABC Builders".into(),
            inspector_name: "R. Karim".into(),
            report_date: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
            workers_present: 42,
            equipment_count: 7,
            overall_progress: 65,
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_success_stores_report() {
        let mut session = ReportSession::new();
        assert!(!session.is_downloadable());

        let report = session
            .submit_with(&filled(), &[], |_, _| Ok(b"%PDF-1.3".to_vec()))
            .unwrap();
        assert_eq!(report.file_name, "Site_Visit_Report_Dhaka_MRT_Line_1_20250308.pdf");
        assert_eq!(report.summary.workers_present, 42);
        assert_eq!(report.summary.image_count, 0);
        assert!(session.is_downloadable());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_invalid_submission_keeps_previous_report() {
        let mut session = ReportSession::new();
        session
            .submit_with(&filled(), &[], |_, _| Ok(b"first".to_vec()))
            .unwrap();

        let mut missing = filled();
        missing.inspector_name = "  ".into();
        let mut called = false;
        let err = session
            .submit_with(&missing, &[], |_, _| {
                called = true;
                Ok(b"second".to_vec())
            })
            .unwrap_err();

        assert!(!called);
        assert_eq!(err.to_string(), REQUIRED_FIELDS_MESSAGE);
        assert_eq!(session.error(), Some(REQUIRED_FIELDS_MESSAGE));
        assert_eq!(session.generated().unwrap().bytes, b"first".to_vec());
    }

    #[test]
    fn test_generation_failure_keeps_previous_report() {
        let mut session = ReportSession::new();
        session
            .submit_with(&filled(), &[], |_, _| Ok(b"first".to_vec()))
            .unwrap();

        let err = session
            .submit_with(&filled(), &[], |_, _| {
                Err(DashboardError::PdfGeneration("font missing".into()))
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "Error generating report: font missing");
        assert_eq!(session.error(), Some("Error generating report: font missing"));
        assert_eq!(session.generated().unwrap().bytes, b"first".to_vec());
    }

    #[test]
    fn test_success_clears_error() {
        let mut session = ReportSession::new();
        let mut missing = filled();
        missing.contractor_name.clear();
        assert!(session.submit_with(&missing, &[], |_, _| Ok(Vec::new())).is_err());
        assert!(session.error().is_some());
        assert!(!session.is_downloadable());

        session
            .submit_with(&filled(), &[], |_, _| Ok(b"ok".to_vec()))
            .unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_image_count_is_capped() {
        let mut session = ReportSession::new();
        let images: Vec<ReportImage> = (0..6)
            .map(|i| ReportImage {
                name: format!("{}.jpg", i),
                data: Vec::new(),
            })
            .collect();
        let report = session
            .submit_with(&filled(), &images, |_, _| Ok(b"ok".to_vec()))
            .unwrap();
        assert_eq!(report.summary.image_count, MAX_REPORT_IMAGES);
    }

    #[test]
    fn test_save_writes_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let report = GeneratedReport {
            file_name: "Site_Visit_Report_X_20250308.pdf".into(),
            bytes: b"%PDF".to_vec(),
            summary: ReportSummary::new(&filled(), 0),
        };
        let path = report.save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Site_Visit_Report_X_20250308.pdf"));
    }
}
