use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixelpose_common::{FramingConfig, PixelposeResult};
use pixelpose_pose_model::RenderJob;
use pixelpose_render_engine::{FrameCounter, JobPipeline, JsonRigSource, SceneRenderer};
use pixelpose_retarget::SpriteSheetPlan;
use pixelpose_scheduler::{
    enumerate_jobs, purge_failed_sources, write_batch_report, JobSettings, WorkerPool,
};

/// Reports a fixed count, or zero for sources whose name contains "empty".
struct StubCounter(u64);

impl FrameCounter for StubCounter {
    fn count_frames(&self, source: &Path, _fps: u32) -> PixelposeResult<u64> {
        if source.to_string_lossy().contains("empty") {
            Ok(0)
        } else {
            Ok(self.0)
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

struct UnreachableRenderer;

impl SceneRenderer for UnreachableRenderer {
    fn render(&self, _job: &RenderJob, _plan: &SpriteSheetPlan) -> PixelposeResult<u64> {
        panic!("renderer must not run in this scenario");
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

fn workspace(name: &str, sources: &[&str], targets: &[&str]) -> PathBuf {
    let root = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&root);
    for (dir, files) in [("motions", sources), ("characters", targets)] {
        std::fs::create_dir_all(root.join(dir)).unwrap();
        for file in files {
            std::fs::write(root.join(dir).join(file), b"asset").unwrap();
        }
    }
    root
}

fn settings(root: &Path) -> JobSettings {
    JobSettings {
        output_root: root.join("dataset"),
        resolution: 64,
        fps: 8,
        pixel_size: 4,
        extension: "fbx".to_string(),
    }
}

fn pipeline(frames: u64) -> Arc<JobPipeline> {
    Arc::new(JobPipeline::new(
        Arc::new(StubCounter(frames)),
        Arc::new(JsonRigSource),
        Arc::new(UnreachableRenderer),
        FramingConfig::default(),
    ))
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

#[test]
fn count_only_reports_estimates_without_images() {
    let root = workspace("pixelpose_it_count_only", &["walk.fbx"], &["knight.fbx", "mage.fbx"]);
    let settings = settings(&root);

    let jobs = enumerate_jobs(&root.join("motions"), &root.join("characters"), &settings).unwrap();
    let report = WorkerPool::new(2, pipeline(16)).run(jobs, true, None).unwrap();

    assert_eq!(report.jobs(), 2);
    assert_eq!(report.errors(), 0);
    assert!(report.results.iter().all(|r| r.frames_rendered == 16));
    assert_eq!(count_files(&root.join("dataset")), 0);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn zero_frame_source_fails_every_target_and_is_purged_once() {
    let root = workspace(
        "pixelpose_it_zero_frames",
        &["empty.fbx", "walk.fbx"],
        &["knight.fbx", "mage.fbx"],
    );
    let settings = settings(&root);

    let jobs = enumerate_jobs(&root.join("motions"), &root.join("characters"), &settings).unwrap();
    let report = WorkerPool::new(3, pipeline(16)).run(jobs, true, None).unwrap();

    assert_eq!(report.jobs(), 4);
    assert_eq!(report.errors(), 2);
    for failed in report.results.iter().filter(|r| r.error) {
        assert!(failed.error_message.contains("0 frames"));
        assert!(failed.job.source_path.ends_with("empty.fbx"));
    }

    let purged = purge_failed_sources(&report.results, &root.join("purged")).unwrap();
    assert_eq!(purged, 1);
    assert!(!root.join("motions").join("empty.fbx").exists());
    assert!(root.join("motions").join("walk.fbx").exists());
    assert!(root.join("purged").join("empty.fbx").is_file());

    let report_path = write_batch_report(&report, &settings, Some(purged)).unwrap();
    assert!(report_path.is_file());

    std::fs::remove_dir_all(&root).ok();
}
