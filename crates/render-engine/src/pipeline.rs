//! The per-job pipeline run by each worker.

use std::sync::Arc;

use pixelpose_common::{FramingConfig, PixelposeError, PixelposeResult};
use pixelpose_pose_model::{RenderJob, RenderJobResult, Resolution};
use pixelpose_retarget::SpriteSheetPlanner;

use crate::backend::{FrameCounter, RigSource, SceneRenderer};
use crate::pixelate::pixelate_frames;
use crate::stick::render_pose_sequence;

/// Turns one job into exactly one result.
pub trait JobProcessor: Send + Sync {
    /// Process `job`. Never fails: every error becomes a failed result.
    fn process(&self, job: &RenderJob, count_only: bool) -> RenderJobResult;
}

/// Count, plan, rasterize, project, pixelate.
pub struct JobPipeline {
    counter: Arc<dyn FrameCounter>,
    rigs: Arc<dyn RigSource>,
    renderer: Arc<dyn SceneRenderer>,
    framing: FramingConfig,
}

impl JobPipeline {
    pub fn new(
        counter: Arc<dyn FrameCounter>,
        rigs: Arc<dyn RigSource>,
        renderer: Arc<dyn SceneRenderer>,
        framing: FramingConfig,
    ) -> Self {
        Self {
            counter,
            rigs,
            renderer,
            framing,
        }
    }

    /// Full render of a job whose frame count is already known to be
    /// non-zero. Returns the number of frames rasterized.
    fn render(&self, job: &RenderJob) -> PixelposeResult<u64> {
        let source = self.rigs.load_rig(&job.source_path)?;
        let target = self.rigs.load_rig(&job.target_path)?;
        let plan = SpriteSheetPlanner::new(self.framing, job.fps).plan(&source, &target)?;

        std::fs::create_dir_all(&job.output_dir)?;
        let rendered = self.renderer.render(job, &plan)?;
        if rendered == 0 {
            return Err(PixelposeError::render("Scene tool produced no frames"));
        }

        let sequence = plan.pose_sequence(
            job.source_name(),
            job.target_name(),
            Resolution::square(job.resolution),
        );
        let poses_path = job.poses_path();
        sequence
            .save(&poses_path)
            .map_err(|e| PixelposeError::render(format!("Failed to write poses: {e}")))?;

        render_pose_sequence(&poses_path, &job.stick_root(), job.resolution, job.resolution)?;
        pixelate_frames(&job.frames_dir(), &job.pixels_root(), job.pixel_size)?;

        Ok(rendered)
    }
}

impl JobProcessor for JobPipeline {
    fn process(&self, job: &RenderJob, count_only: bool) -> RenderJobResult {
        let frames = match self.counter.count_frames(&job.source_path, job.fps) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(source = %job.source_path.display(), error = %e, "Frame count failed");
                return RenderJobResult::failure(job.clone(), 0, e.to_string());
            }
        };

        if frames == 0 {
            let err = PixelposeError::ZeroFrames {
                path: job.source_path.clone(),
            };
            tracing::warn!(target_asset = %job.target_path.display(), "{err}");
            return RenderJobResult::failure(job.clone(), 0, err.to_string());
        }

        if count_only {
            return RenderJobResult::success(job.clone(), frames);
        }

        match self.render(job) {
            Ok(rendered) => {
                tracing::info!(
                    source = %job.source_name(),
                    target = %job.target_name(),
                    frames = rendered,
                    "Job rendered"
                );
                RenderJobResult::success(job.clone(), rendered)
            }
            Err(e) => {
                tracing::warn!(
                    source = %job.source_name(),
                    target = %job.target_name(),
                    error = %e,
                    "Job failed"
                );
                RenderJobResult::failure(job.clone(), 0, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use image::{Rgba, RgbaImage};
    use pixelpose_pose_model::{
        AnimationClip, AnimationKey, JointMap, JointTransform, RigDocument, RigJoint,
    };
    use pixelpose_retarget::SpriteSheetPlan;

    use crate::frame_file_name;

    struct FixedCounter(u64);

    impl FrameCounter for FixedCounter {
        fn count_frames(&self, _source: &Path, _fps: u32) -> PixelposeResult<u64> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FixtureRigs;

    impl RigSource for FixtureRigs {
        fn load_rig(&self, asset: &Path) -> PixelposeResult<RigDocument> {
            let prefix = asset
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let hips = format!("{prefix}:Hips");
            let mut rig = RigDocument {
                name: prefix.clone(),
                fps: 30.0,
                world: JointTransform::IDENTITY,
                joints: vec![
                    RigJoint {
                        name: hips.clone(),
                        parent: None,
                        rest: JointTransform::from_location(0.0, 0.0, 1.0),
                    },
                    RigJoint {
                        name: format!("{prefix}:Head"),
                        parent: Some(hips.clone()),
                        rest: JointTransform::from_location(0.0, 0.0, 0.7),
                    },
                ],
                bounds: None,
                animation: None,
            };
            if prefix == "walk" {
                let keys = (1..=8)
                    .map(|f| {
                        let mut pose = JointMap::new();
                        pose.insert(hips.clone(), JointTransform::from_location(0.0, 0.05 * f as f64, 0.0));
                        AnimationKey { frame: f, pose }
                    })
                    .collect();
                rig.animation = Some(AnimationClip {
                    frame_start: 1,
                    frame_end: 8,
                    keys,
                });
            }
            Ok(rig)
        }
    }

    /// Writes a flat image per planned frame.
    struct SolidRenderer;

    impl SceneRenderer for SolidRenderer {
        fn render(&self, job: &RenderJob, plan: &SpriteSheetPlan) -> PixelposeResult<u64> {
            let dir = job.frames_dir();
            std::fs::create_dir_all(&dir)?;
            for frame in &plan.frames {
                RgbaImage::from_pixel(job.resolution, job.resolution, Rgba([10, 20, 30, 255]))
                    .save(dir.join(frame_file_name(frame.frame)))?;
            }
            Ok(plan.len() as u64)
        }

        fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "solid"
        }
    }

    struct FailingRenderer;

    impl SceneRenderer for FailingRenderer {
        fn render(&self, _job: &RenderJob, _plan: &SpriteSheetPlan) -> PixelposeResult<u64> {
            Err(PixelposeError::render("scene tool crashed"))
        }

        fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn pipeline(frames: u64, renderer: Arc<dyn SceneRenderer>) -> JobPipeline {
        JobPipeline::new(
            Arc::new(FixedCounter(frames)),
            Arc::new(FixtureRigs),
            renderer,
            FramingConfig::default(),
        )
    }

    fn job(dir: &Path) -> RenderJob {
        RenderJob {
            source_path: PathBuf::from("motions/walk.fbx"),
            target_path: PathBuf::from("characters/knight.fbx"),
            output_dir: dir.join("knight").join("walk"),
            resolution: 32,
            fps: 30,
            pixel_size: 4,
        }
    }

    #[test]
    fn test_full_job_writes_every_output() {
        let dir = std::env::temp_dir().join("pixelpose_test_pipeline_full");
        let _ = std::fs::remove_dir_all(&dir);
        let job = job(&dir);

        let result = pipeline(8, Arc::new(SolidRenderer)).process(&job, false);
        assert!(!result.error, "{}", result.error_message);
        assert_eq!(result.frames_rendered, 8);

        assert!(job.poses_path().is_file());
        assert!(job.frames_dir().join("0001.png").is_file());
        assert!(job.output_dir.join("poses").join("poses").join("0008.png").is_file());
        assert!(job.output_dir.join("pixels").join("0008.png").is_file());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_count_only_creates_nothing() {
        let dir = std::env::temp_dir().join("pixelpose_test_pipeline_count_only");
        let _ = std::fs::remove_dir_all(&dir);
        let job = job(&dir);

        let result = pipeline(5, Arc::new(SolidRenderer)).process(&job, true);
        assert!(!result.error);
        assert_eq!(result.frames_rendered, 5);
        assert!(!job.output_dir.exists());
    }

    #[test]
    fn test_zero_frames_is_error_without_render() {
        let dir = std::env::temp_dir().join("pixelpose_test_pipeline_zero");
        let _ = std::fs::remove_dir_all(&dir);
        let job = job(&dir);

        let result = pipeline(0, Arc::new(SolidRenderer)).process(&job, false);
        assert!(result.error);
        assert!(result.error_message.contains("0 frames"));
        assert!(!job.output_dir.exists());
    }

    #[test]
    fn test_render_failure_becomes_error_result() {
        let dir = std::env::temp_dir().join("pixelpose_test_pipeline_render_fail");
        let _ = std::fs::remove_dir_all(&dir);
        let job = job(&dir);

        let result = pipeline(8, Arc::new(FailingRenderer)).process(&job, false);
        assert!(result.error);
        assert!(result.error_message.contains("scene tool crashed"));
        assert_eq!(result.frames_rendered, 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_animation_fails_before_render() {
        let dir = std::env::temp_dir().join("pixelpose_test_pipeline_no_anim");
        let _ = std::fs::remove_dir_all(&dir);
        let mut job = job(&dir);
        job.source_path = PathBuf::from("motions/idle.fbx");

        let result = pipeline(8, Arc::new(SolidRenderer)).process(&job, false);
        assert!(result.error);
        assert!(result.error_message.contains("no animation"));
        assert!(!job.frames_dir().exists());
    }
}
