//! PixelPose Scheduler
//!
//! Batches `(source motion, target character)` combinations:
//! - **Jobs:** Asset discovery and the full cross product of render jobs
//! - **Pool:** Fixed-size worker threads fed through a bounded queue
//! - **Purge:** Quarantine of sources that failed
//! - **Report:** `batch_report.json` with per-job results and totals

pub mod jobs;
pub mod pool;
pub mod purge;
pub mod report;

pub use jobs::{discover_assets, enumerate_jobs, JobSettings};
pub use pool::{BatchProgress, BatchReport, ProgressCallback, WorkerPool};
pub use purge::purge_failed_sources;
pub use report::{write_batch_report, BatchReportFile, BatchTotals};
