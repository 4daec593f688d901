//! Scene tool backends: frame counting, rig export, and rasterization.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use pixelpose_common::{PixelposeError, PixelposeResult, SceneToolConfig};
use pixelpose_pose_model::{RenderJob, RigDocument};
use pixelpose_retarget::{estimate_frame_count, SpriteSheetPlan};

use crate::frame_file_name;

/// Reports how many frames a job will produce.
pub trait FrameCounter: Send + Sync {
    /// Frames produced when rendering `source` at `fps`. Zero is a valid
    /// answer; callers treat it as a failed job.
    fn count_frames(&self, source: &Path, fps: u32) -> PixelposeResult<u64>;

    /// Counter name for logs.
    fn name(&self) -> &str;
}

/// Loads skeleton and animation data for an asset.
pub trait RigSource: Send + Sync {
    fn load_rig(&self, asset: &Path) -> PixelposeResult<RigDocument>;
}

/// Rasterizes a sprite-sheet plan into `frames/NNNN.png`.
pub trait SceneRenderer: Send + Sync {
    /// Render every planned frame of `job`. Returns the number of frames
    /// written.
    fn render(&self, job: &RenderJob, plan: &SpriteSheetPlan) -> PixelposeResult<u64>;

    /// Check if this renderer can run on the system.
    fn is_available(&self) -> bool;

    /// Renderer name.
    fn name(&self) -> &str;
}

/// Reads rig documents stored as `.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRigSource;

impl RigSource for JsonRigSource {
    fn load_rig(&self, asset: &Path) -> PixelposeResult<RigDocument> {
        RigDocument::load(asset)
            .map_err(|e| PixelposeError::retarget(format!("Failed to load rig: {e}")))
    }
}

/// Estimates frame counts from a rig's own animation range and frame rate.
#[derive(Debug, Clone)]
pub struct RigFrameCounter<R> {
    rigs: R,
}

impl<R: RigSource> RigFrameCounter<R> {
    pub fn new(rigs: R) -> Self {
        Self { rigs }
    }
}

impl<R: RigSource> FrameCounter for RigFrameCounter<R> {
    fn count_frames(&self, source: &Path, fps: u32) -> PixelposeResult<u64> {
        let rig = self
            .rigs
            .load_rig(source)
            .map_err(|e| PixelposeError::estimation(e.to_string()))?;
        Ok(estimate_frame_count(rig.total_frames(), rig.fps, fps))
    }

    fn name(&self) -> &str {
        "rig"
    }
}

/// Adapter around the external scene tool subprocess.
///
/// Every operation runs the configured command prefix followed by the
/// operation arguments. One subprocess per call; nothing is shared between
/// workers.
#[derive(Debug, Clone)]
pub struct SceneToolBackend {
    config: SceneToolConfig,
}

impl SceneToolBackend {
    pub fn new(config: SceneToolConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> PixelposeResult<Command> {
        let (program, leading) = self.config.program()?;
        let mut cmd = Command::new(program);
        cmd.args(leading);
        Ok(cmd)
    }

    /// Run a short operation to completion and capture its output.
    fn run_captured(&self, args: &[String]) -> PixelposeResult<Output> {
        let mut cmd = self.command()?;
        cmd.args(args).stdin(Stdio::null());
        tracing::debug!(args = ?args, "Running scene tool");
        cmd.output().map_err(|e| {
            PixelposeError::setup(format!(
                "Failed to start scene tool '{}': {e}",
                self.config.command.join(" ")
            ))
        })
    }
}

impl FrameCounter for SceneToolBackend {
    fn count_frames(&self, source: &Path, fps: u32) -> PixelposeResult<u64> {
        let args = vec![
            "count".to_string(),
            source.display().to_string(),
            "--fps".to_string(),
            fps.to_string(),
        ];
        let output = self
            .run_captured(&args)
            .map_err(|e| PixelposeError::estimation(e.to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            return Err(PixelposeError::estimation(format!(
                "Frame count for {} failed (status {}): {}",
                source.display(),
                output.status,
                stderr.trim()
            )));
        }

        parse_frame_count(&stderr)
            .or_else(|| parse_frame_count(&stdout))
            .ok_or_else(|| {
                PixelposeError::estimation(format!(
                    "Scene tool reported no frame count for {}",
                    source.display()
                ))
            })
    }

    fn name(&self) -> &str {
        "scene-tool"
    }
}

impl RigSource for SceneToolBackend {
    fn load_rig(&self, asset: &Path) -> PixelposeResult<RigDocument> {
        if is_json(asset) {
            return JsonRigSource.load_rig(asset);
        }

        let args = vec!["export-rig".to_string(), asset.display().to_string()];
        let output = self.run_captured(&args)?;
        if !output.status.success() {
            return Err(PixelposeError::retarget(format!(
                "Rig export for {} failed (status {}): {}",
                asset.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        RigDocument::from_json(&json).map_err(|e| {
            PixelposeError::retarget(format!("Invalid rig export for {}: {e}", asset.display()))
        })
    }
}

impl SceneRenderer for SceneToolBackend {
    fn render(&self, job: &RenderJob, plan: &SpriteSheetPlan) -> PixelposeResult<u64> {
        let plan_path = job.plan_path();
        std::fs::create_dir_all(job.frames_dir())?;
        std::fs::write(&plan_path, serde_json::to_string_pretty(plan)?)?;

        let args = vec![
            "render".to_string(),
            job.source_path.display().to_string(),
            job.target_path.display().to_string(),
            job.output_dir.display().to_string(),
            "--resolution".to_string(),
            job.resolution.to_string(),
            "--fps".to_string(),
            job.fps.to_string(),
            "--plan".to_string(),
            plan_path.display().to_string(),
        ];

        let mut cmd = self.command()?;
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| PixelposeError::render(format!("Failed to start scene tool: {e}")))?;

        tracing::debug!(
            pid = child.id(),
            frames = plan.len(),
            output = %job.output_dir.display(),
            "Scene tool render started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PixelposeError::render("Failed to capture scene tool stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| PixelposeError::render("Failed to capture scene tool stderr"))?;

        // Drain stderr concurrently so the tool never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = Vec::new();
            match reader.read_to_end(&mut output) {
                Ok(_) => String::from_utf8_lossy(&output).into_owned(),
                Err(err) => format!("<failed to read scene tool stderr: {err}>"),
            }
        });

        trace_output(stdout);

        let status = child
            .wait()
            .map_err(|e| PixelposeError::render(format!("Failed to wait on scene tool: {e}")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(PixelposeError::render(format!(
                "Scene tool render failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        let missing = missing_frames(&job.frames_dir(), plan);
        if !missing.is_empty() {
            return Err(PixelposeError::render(format!(
                "Scene tool finished but {} of {} frames are missing (first: {})",
                missing.len(),
                plan.len(),
                missing[0].display()
            )));
        }

        tracing::debug!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            frames = plan.len(),
            "Scene tool render finished"
        );
        Ok(plan.len() as u64)
    }

    fn is_available(&self) -> bool {
        let program_found = self
            .config
            .program()
            .map(|(program, _)| command_exists(program))
            .unwrap_or(false);
        program_found && self.config.script().map_or(true, Path::is_file)
    }

    fn name(&self) -> &str {
        "scene-tool"
    }
}

/// Forward the tool's stdout to the trace log until it closes. Bytes that
/// are not UTF-8 are replaced; a read error only stops the forwarding.
fn trace_output(stdout: impl Read) {
    let mut reader = BufReader::new(stdout);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    tracing::trace!(line = trimmed, "scene tool");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stopped reading scene tool output");
                break;
            }
        }
    }
}

/// Last non-empty line parsed as a frame count.
fn parse_frame_count(output: &str) -> Option<u64> {
    output
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .and_then(|line| line.parse::<u64>().ok())
}

/// Planned frame images that do not exist in `frames_dir`.
pub fn missing_frames(frames_dir: &Path, plan: &SpriteSheetPlan) -> Vec<PathBuf> {
    plan.frames
        .iter()
        .map(|f| frames_dir.join(frame_file_name(f.frame)))
        .filter(|path| !path.is_file())
        .collect()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Whether `binary` resolves on `PATH` (or is an existing path).
pub fn command_exists(binary: &str) -> bool {
    if binary.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(binary).is_file();
    }
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
