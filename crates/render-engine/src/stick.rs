//! Stick-figure projection of pose snapshots.
//!
//! The skeleton is projected onto the Y/Z plane (X is discarded), centered
//! horizontally on the hip and scaled to fit the image with a fixed margin.
//! Bones take the color of their child joint's body part; joints are drawn
//! on top in the lighter joint palette.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use pixelpose_common::{PixelposeError, PixelposeResult};
use pixelpose_pose_model::{PoseFrame, PoseSequence, SkeletonTopology, HUMANOID};

use crate::frame_file_name;

/// Margin kept free on every side of the drawing, in pixels.
pub const PADDING: f64 = 16.0;

/// Smallest span used on either axis, for collapsed poses.
const MIN_SPAN: f64 = 1e-5;

/// Draws pose snapshots as color-coded skeletons.
#[derive(Debug, Clone, Copy)]
pub struct StickFigureRenderer {
    topology: &'static SkeletonTopology,
    padding: f64,
    line_width: u32,
    joint_radius: i32,
}

impl Default for StickFigureRenderer {
    fn default() -> Self {
        Self {
            topology: &HUMANOID,
            padding: PADDING,
            line_width: 3,
            joint_radius: 2,
        }
    }
}

impl StickFigureRenderer {
    /// Image-space position of every recognized joint, keyed by suffix.
    pub fn project(
        &self,
        frame: &PoseFrame,
        width: u32,
        height: u32,
    ) -> BTreeMap<&'static str, (f64, f64)> {
        let mut joints: BTreeMap<&'static str, (f64, f64)> = BTreeMap::new();
        for (name, transform) in &frame.pose {
            if let Some(suffix) = self.topology.canonical_suffix(name) {
                joints
                    .entry(suffix)
                    .or_insert((transform.location[1], transform.location[2]));
            }
        }
        if joints.is_empty() {
            return joints;
        }

        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_z, mut max_z) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(y, z) in joints.values() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
            min_z = min_z.min(z);
            max_z = max_z.max(z);
        }

        let hip_y = joints
            .get(self.topology.hip)
            .map(|&(y, _)| y)
            .unwrap_or((min_y + max_y) / 2.0);
        let reach = joints
            .values()
            .map(|&(y, _)| (y - hip_y).abs())
            .fold(0.0, f64::max);

        let span_y = (2.0 * reach).max(MIN_SPAN);
        let span_z = (max_z - min_z).max(MIN_SPAN);
        let (w, h) = (width as f64, height as f64);
        let scale = ((w - 2.0 * self.padding).max(1.0) / span_y)
            .min((h - 2.0 * self.padding).max(1.0) / span_z);

        for point in joints.values_mut() {
            let (y, z) = *point;
            let u = (hip_y - y) * scale + w / 2.0;
            let v = h - ((z - min_z) * scale + self.padding);
            *point = (u, v);
        }
        joints
    }

    /// Draw one frame onto a transparent canvas.
    pub fn render(&self, frame: &PoseFrame, width: u32, height: u32) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        let joints = self.project(frame, width, height);

        for (child, parent) in self.topology.bones {
            let (Some(&a), Some(&b)) = (joints.get(child), joints.get(parent)) else {
                continue;
            };
            let color = rgba(self.topology.body_part(child).bone_color());
            self.draw_thick_line(&mut canvas, a, b, color);
        }

        for (suffix, &(u, v)) in &joints {
            let color = rgba(self.topology.body_part(suffix).joint_color());
            draw_filled_circle_mut(
                &mut canvas,
                (u.round() as i32, v.round() as i32),
                self.joint_radius,
                color,
            );
        }

        canvas
    }

    fn draw_thick_line(
        &self,
        canvas: &mut RgbaImage,
        a: (f64, f64),
        b: (f64, f64),
        color: Rgba<u8>,
    ) {
        let half = (self.line_width / 2) as i32;
        for dx in -half..=half {
            for dy in -half..=half {
                let (ox, oy) = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    canvas,
                    (a.0 as f32 + ox, a.1 as f32 + oy),
                    (b.0 as f32 + ox, b.1 as f32 + oy),
                    color,
                );
            }
        }
    }
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Draw one frame with the humanoid topology.
pub fn render_stick_image(frame: &PoseFrame, width: u32, height: u32) -> RgbaImage {
    StickFigureRenderer::default().render(frame, width, height)
}

/// Render every frame of a persisted pose sequence into
/// `<output_dir>/poses/NNNN.png`. Returns the directory written to.
pub fn render_pose_sequence(
    poses_json: &Path,
    output_dir: &Path,
    width: u32,
    height: u32,
) -> PixelposeResult<PathBuf> {
    let sequence = PoseSequence::load(poses_json)
        .map_err(|e| PixelposeError::render(format!("Failed to load pose sequence: {e}")))?;

    let poses_dir = output_dir.join("poses");
    std::fs::create_dir_all(&poses_dir)?;

    let renderer = StickFigureRenderer::default();
    for frame in &sequence.frames {
        let image = renderer.render(frame, width, height);
        image.save(poses_dir.join(frame_file_name(frame.frame)))?;
    }

    tracing::debug!(
        frames = sequence.frames.len(),
        dir = %poses_dir.display(),
        "Stick figures rendered"
    );
    Ok(poses_dir)
}
