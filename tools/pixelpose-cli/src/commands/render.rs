//! Batch render command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixelpose_common::{AppConfig, FramingConfig, PixelposeResult, SceneToolConfig};
use pixelpose_pose_model::RenderJobResult;
use pixelpose_render_engine::{
    FrameCounter, JobPipeline, RigFrameCounter, SceneRenderer, SceneToolBackend,
};
use pixelpose_scheduler::{
    enumerate_jobs, purge_failed_sources, write_batch_report, BatchProgress, JobSettings,
    ProgressCallback, WorkerPool,
};

/// Command-line overrides for a batch. `None` falls back to the config.
pub struct RenderArgs {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub output: Option<PathBuf>,
    pub resolution: Option<u32>,
    pub fps: Option<u32>,
    pub pixel_size: Option<u32>,
    pub workers: Option<usize>,
    pub count_only: bool,
    pub purge_errors: bool,
    pub purge_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub native_count: bool,
    pub scene_tool: Option<String>,
}

pub fn run(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let defaults = &config.batch;
    let settings = JobSettings {
        output_root: args.output.unwrap_or_else(|| defaults.output_dir.clone()),
        resolution: args.resolution.unwrap_or(defaults.resolution),
        fps: args.fps.unwrap_or(defaults.fps),
        pixel_size: args.pixel_size.unwrap_or(defaults.pixel_size),
        extension: args.extension.unwrap_or_else(|| defaults.extension.clone()),
    };
    let workers = args.workers.unwrap_or(defaults.workers);
    let purge_dir = args.purge_dir.unwrap_or_else(|| defaults.purge_dir.clone());

    let scene_tool = match args.scene_tool {
        Some(command) => SceneToolConfig {
            command: command.split_whitespace().map(str::to_string).collect(),
        },
        None => config.scene_tool.clone(),
    };
    let pipeline = build_pipeline(scene_tool, config.framing, args.native_count);

    println!("PixelPose Batch");
    println!("{}", "=".repeat(50));
    println!("  Sources:    {}", args.source_dir.display());
    println!("  Targets:    {}", args.target_dir.display());
    println!("  Output:     {}", settings.output_root.display());
    println!(
        "  Settings:   {}px @ {} fps, pixel size {}",
        settings.resolution, settings.fps, settings.pixel_size
    );
    if args.count_only {
        println!("  Mode:       count only");
    }

    let jobs = enumerate_jobs(&args.source_dir, &args.target_dir, &settings)?;
    if jobs.is_empty() {
        println!("No jobs: no .{} assets found.", settings.extension);
        return Ok(());
    }
    println!("  Jobs:       {} with {} worker(s)", jobs.len(), workers);
    println!();

    let progress: ProgressCallback = Box::new(|p: BatchProgress| {
        print!(
            "\r  Progress: {}/{} jobs, {} frames, {} errors",
            p.completed, p.total, p.frames_rendered, p.errors
        );
        std::io::stdout().flush().ok();
    });
    let report = WorkerPool::new(workers, pipeline).run(jobs, args.count_only, Some(progress))?;
    println!();
    println!();

    for failed in report.sorted_by_job().into_iter().filter(|r| r.error) {
        println!(
            "[ERROR] {} -> {}: {}",
            failed.job.source_path.display(),
            failed.job.target_path.display(),
            failed.error_message
        );
    }

    let purged = purge_if_requested(args.purge_errors, &report.results, &purge_dir)?;

    if let Err(e) = write_batch_report(&report, &settings, purged) {
        tracing::warn!(error = %e, "Failed to write batch report");
    }

    if args.count_only {
        println!("Counted {} frames", report.frames_rendered());
    } else {
        println!("Rendered {} frames", report.frames_rendered());
    }
    println!("{} combos rendered", report.succeeded());
    println!("{} errors", report.errors());
    if let Some(n) = purged {
        println!("Purged {} files to {}", n, purge_dir.display());
    }

    Ok(())
}

/// Run the purge pass in purge mode, even when every job succeeded, so the
/// summary always reports a count.
fn purge_if_requested(
    purge: bool,
    results: &[RenderJobResult],
    purge_dir: &Path,
) -> PixelposeResult<Option<usize>> {
    if !purge {
        return Ok(None);
    }
    purge_failed_sources(results, purge_dir).map(Some)
}

fn build_pipeline(
    scene_tool: SceneToolConfig,
    framing: FramingConfig,
    native_count: bool,
) -> Arc<JobPipeline> {
    let backend = Arc::new(SceneToolBackend::new(scene_tool));
    if !backend.is_available() {
        tracing::warn!("Scene tool or its script not found, jobs that need it will fail");
    }

    let counter: Arc<dyn FrameCounter> = if native_count {
        Arc::new(RigFrameCounter::new(backend.as_ref().clone()))
    } else {
        backend.clone()
    };
    tracing::debug!(counter = counter.name(), "Frame counter selected");

    Arc::new(JobPipeline::new(counter, backend.clone(), backend, framing))
}
