//! `batch_report.json` written at the end of a batch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pixelpose_common::PixelposeResult;
use pixelpose_pose_model::RenderJobResult;
use serde::{Deserialize, Serialize};

use crate::jobs::JobSettings;
use crate::pool::BatchReport;

pub const REPORT_FILE_NAME: &str = "batch_report.json";

/// Batch totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    pub jobs: usize,
    pub succeeded: usize,
    pub errors: usize,
    pub frames_rendered: u64,
    pub purged: Option<usize>,
}

/// On-disk batch summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReportFile {
    pub generated_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub count_only: bool,
    pub workers: usize,
    pub settings: JobSettings,
    pub totals: BatchTotals,
    pub results: Vec<RenderJobResult>,
}

impl BatchReportFile {
    pub fn new(report: &BatchReport, settings: &JobSettings, purged: Option<usize>) -> Self {
        let duration = report.finished_at - report.started_at;
        Self {
            generated_at: Utc::now(),
            started_at: report.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            count_only: report.count_only,
            workers: report.workers,
            settings: settings.clone(),
            totals: BatchTotals {
                jobs: report.jobs(),
                succeeded: report.succeeded(),
                errors: report.errors(),
                frames_rendered: report.frames_rendered(),
                purged,
            },
            results: report.sorted_by_job().into_iter().cloned().collect(),
        }
    }
}

/// Write `<output_root>/batch_report.json`.
pub fn write_batch_report(
    report: &BatchReport,
    settings: &JobSettings,
    purged: Option<usize>,
) -> PixelposeResult<PathBuf> {
    let path = report_path(&settings.output_root);
    let file = BatchReportFile::new(report, settings, purged);
    std::fs::create_dir_all(&settings.output_root)?;
    std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;
    tracing::info!(path = %path.display(), "Wrote batch report");
    Ok(path)
}

pub fn report_path(output_root: &Path) -> PathBuf {
    output_root.join(REPORT_FILE_NAME)
}
