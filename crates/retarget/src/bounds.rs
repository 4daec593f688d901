//! Axis-aligned bounding boxes in world space.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned box. `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for point in iter {
            bbox.min = bbox.min.min(point);
            bbox.max = bbox.max.max(point);
        }
        Some(bbox)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y.
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along Z.
    pub fn height(&self) -> f64 {
        self.max.z - self.min.z
    }
}

/// Running min/max over every frame of a sequence.
///
/// Frames are folded in one at a time while sampling; once sampling is
/// done the accumulator is frozen into a [`GlobalBoundingBox`].
#[derive(Debug, Clone, Default)]
pub struct BoundsAccumulator {
    current: Option<BoundingBox>,
    frames: usize,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame's box into the running total.
    pub fn add(&mut self, frame_box: &BoundingBox) {
        self.current = Some(match self.current {
            Some(current) => current.union(frame_box),
            None => *frame_box,
        });
        self.frames += 1;
    }

    /// Freeze the accumulated box. `None` when no frame was added.
    pub fn finish(self) -> Option<GlobalBoundingBox> {
        self.current.map(|bbox| GlobalBoundingBox {
            bbox,
            center: bbox.center(),
            frames: self.frames,
        })
    }
}

/// The union of every per-frame box of a sequence, with its center.
///
/// Immutable: one camera configuration is derived from it for the whole
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalBoundingBox {
    bbox: BoundingBox,
    center: DVec3,
    frames: usize,
}

impl GlobalBoundingBox {
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn min(&self) -> DVec3 {
        self.bbox.min
    }

    pub fn max(&self) -> DVec3 {
        self.bbox.max
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Number of frames the box was accumulated over.
    pub fn frames(&self) -> usize {
        self.frames
    }
}
