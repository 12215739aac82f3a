//! Spreadsheet export - renders a [`Sheet`] to a CSV file and hands it to
//! the platform share mechanism.
//!
//! Files land in a fixed export directory with a date-stamped name,
//! overwriting any previous export of the same name. Sharing is behind
//! the [`SharePlatform`] trait; a platform without one reports
//! [`ShareStatus::Unavailable`] instead of failing.

use crate::{core::report::Sheet, errors::Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default file stem for the day-by-day collections matrix.
pub const COLLECTIONS_STEM: &str = "MilkControl_Coletas";
/// Default file stem for the producer roster.
pub const PRODUCERS_STEM: &str = "MilkControl_Produtores";
/// Default file stem for the period summary.
pub const PERIOD_STEM: &str = "Resumo_Por_Periodo";

/// Hook into the platform's share sheet. The UI shell provides the real
/// implementation; [`NoSharing`] is the headless default.
pub trait SharePlatform {
    /// Whether a share mechanism exists on this platform.
    fn is_available(&self) -> bool;

    /// Presents the share sheet for `path`. May fail with
    /// [`crate::errors::Error::ShareCancelled`] when the user dismisses it.
    fn share(&self, path: &Path) -> Result<()>;
}

/// Share implementation for platforms without a share sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSharing;

impl SharePlatform for NoSharing {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// How the share step of an export ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareStatus {
    /// The file was handed to the platform share sheet
    Shared,
    /// No share mechanism exists; the file was still written
    Unavailable,
}

/// Result of a completed export.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Where the spreadsheet file was written
    pub path: PathBuf,
    /// Whether the file could be offered for sharing
    pub share: ShareStatus,
}

/// Writes sheets into the export directory.
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    /// Creates an exporter targeting `export_dir`.
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Renders `sheet` to CSV and writes it as `<stem>_<YYYYMMDD>.csv`,
    /// overwriting any previous file of the same name.
    pub async fn write_sheet(&self, sheet: &Sheet, stem: &str) -> Result<PathBuf> {
        let stamp = chrono::Utc::now().format("%Y%m%d");
        let path = self.export_dir.join(format!("{stem}_{stamp}.csv"));

        tokio::fs::create_dir_all(&self.export_dir).await?;
        tokio::fs::write(&path, sheet_to_csv(sheet)).await?;

        info!(path = %path.display(), rows = sheet.rows.len(), "export written");
        Ok(path)
    }

    /// Writes the sheet, then offers it to the platform share sheet.
    ///
    /// # Errors
    /// I/O failures and share cancellation propagate; an absent share
    /// mechanism is reported through [`ShareStatus::Unavailable`].
    pub async fn export(
        &self,
        sheet: &Sheet,
        stem: &str,
        platform: &dyn SharePlatform,
    ) -> Result<ExportOutcome> {
        let path = self.write_sheet(sheet, stem).await?;

        let share = if platform.is_available() {
            platform.share(&path)?;
            ShareStatus::Shared
        } else {
            ShareStatus::Unavailable
        };

        Ok(ExportOutcome { path, share })
    }
}

/// File stem for a per-producer export: the producer's name with
/// whitespace runs collapsed to underscores.
#[must_use]
pub fn producer_stem(producer_name: &str) -> String {
    let flattened: Vec<&str> = producer_name.split_whitespace().collect();
    format!("{COLLECTIONS_STEM}_{}", flattened.join("_"))
}

fn sheet_to_csv(sheet: &Sheet) -> String {
    let mut out = String::new();

    for line in &sheet.preamble {
        out.push_str(&csv_escape(line));
        out.push('\n');
    }
    if !sheet.preamble.is_empty() {
        out.push('\n');
    }

    push_row(&mut out, &sheet.columns);
    for row in &sheet.rows {
        push_row(&mut out, row);
    }

    out
}

fn push_row(out: &mut String, row: &[String]) {
    let escaped: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn csv_escape(field: &str) -> String {
    if field.contains(['"', ',', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
