//! 画面操作ごとのセッション状態
//!
//! 選択中の駅とそのシート一式を保持する。駅が変わったときだけ読み直す。

use crate::catalog::StationCatalog;
use crate::error::Result;
use progress_common::sheets;
use progress_common::types::{
    SHEET_CORRIDOR_WORK, SHEET_IMAGES, SHEET_ISSUE_LOG, SHEET_PROGRESS,
};
use progress_common::Error as CommonError;
use progress_common::{ImageEntry, ProgressPoint, SheetLoader, SheetSet, Table, WorkItem};

/// 読み込み済みの駅
#[derive(Debug, Clone)]
pub struct LoadedStation {
    pub name: String,
    pub sheets: SheetSet,
}

impl LoadedStation {
    pub fn work_items(&self) -> Result<Vec<WorkItem>> {
        Ok(sheets::work_items(self.sheets.sheet(SHEET_CORRIDOR_WORK)?)?)
    }

    pub fn progress_points(&self) -> Result<Vec<ProgressPoint>> {
        Ok(sheets::progress_points(self.sheets.sheet(SHEET_PROGRESS)?)?)
    }

    pub fn image_entries(&self) -> Result<Vec<ImageEntry>> {
        Ok(sheets::image_entries(self.sheets.sheet(SHEET_IMAGES)?)?)
    }

    pub fn issue_log(&self) -> Result<&Table> {
        Ok(self.sheets.sheet(SHEET_ISSUE_LOG)?)
    }
}

pub struct Session<L: SheetLoader> {
    catalog: StationCatalog,
    loader: L,
    current: Option<LoadedStation>,
}

impl<L: SheetLoader> Session<L> {
    pub fn new(catalog: StationCatalog, loader: L) -> Self {
        Self {
            catalog,
            loader,
            current: None,
        }
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// 駅を選択（前回と同じ駅なら読み直さない）
    ///
    /// 別の駅に切り替えたときは前の駅のシートを破棄してから読み込む。
    pub fn select_station(&mut self, name: &str) -> Result<&LoadedStation> {
        let path = self.catalog.path_for(name)?;
        let canonical = self
            .catalog
            .canonical_name(name)
            .unwrap_or(name)
            .to_string();

        let cached = matches!(&self.current, Some(current) if current.name == canonical);
        if !cached {
            self.current = None;
            log::debug!("loading workbook for {}: {}", canonical, path.display());
            let sheets = self.loader.load(&path)?;
            log::debug!("{} sheets loaded: {:?}", sheets.len(), sheets.names());
            self.current = Some(LoadedStation {
                name: canonical.clone(),
                sheets,
            });
        }

        self.current
            .as_ref()
            .ok_or_else(|| CommonError::UnknownStation(canonical).into())
    }

    /// 選択中の駅を強制的に読み直す
    pub fn reload(&mut self) -> Result<Option<&LoadedStation>> {
        let Some(name) = self.current.take().map(|c| c.name) else {
            return Ok(None);
        };
        self.select_station(&name).map(Some)
    }

    pub fn current(&self) -> Option<&LoadedStation> {
        self.current.as_ref()
    }

    pub fn station(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }
}
