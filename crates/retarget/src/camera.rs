//! Orthographic sprite-sheet camera.
//!
//! The camera sits on the -X side of the subject looking along +X, so the
//! image plane is Y (right) by Z (up). The orthographic scale is derived once
//! from the global bounding box; per frame only the Y/Z position follows the
//! root joint.

use glam::DVec3;
use pixelpose_common::FramingConfig;
use serde::{Deserialize, Serialize};

use crate::bounds::GlobalBoundingBox;

/// Smallest ortho scale the camera will use, for collapsed boxes.
const MIN_ORTHO_SCALE: f64 = 1e-3;

/// Fixed camera configuration for a whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    /// World units covered by the image's larger side.
    pub ortho_scale: f64,

    /// View direction (unit vector).
    pub direction: DVec3,

    /// Camera position derived from the global box.
    pub base_position: DVec3,

    /// Camera Z minus box-center Z, held while tracking.
    pub vertical_bias: f64,
}

impl CameraFrame {
    /// Derive the camera from a frozen bounding box.
    pub fn fit(bounds: &GlobalBoundingBox, framing: &FramingConfig) -> Self {
        let bbox = bounds.bbox();
        let center = bounds.center();

        let size = bbox.width().max(bbox.height()) * framing.padding_factor;
        let padding = framing.render_padding_px as f64 * framing.world_units_per_pixel;
        let ortho_scale = (size + padding).max(MIN_ORTHO_SCALE);

        let base_position = DVec3::new(
            center.x - framing.camera_distance,
            center.y,
            bbox.min.z + ortho_scale / 2.0,
        );

        Self {
            ortho_scale,
            direction: DVec3::X,
            base_position,
            vertical_bias: base_position.z - center.z,
        }
    }

    /// Camera position for one frame, tracking the root joint laterally and
    /// vertically. Depth and scale stay fixed.
    pub fn track(&self, root: DVec3) -> DVec3 {
        DVec3::new(self.base_position.x, root.y, root.z + self.vertical_bias)
    }
}
