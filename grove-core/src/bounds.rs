use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in world coordinates (y up).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::point(first), |mut acc, p| {
            acc.include(p);
            acc
        }))
    }

    pub fn include(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grows this box to also cover `other`.
    pub fn grow_to(&mut self, other: &Bounds) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Enlarges the box by `percent` of its size on each axis, split evenly
    /// between both sides.
    pub fn enlarge(&mut self, percent: f32) {
        let pad = self.size() * (percent / 100.0 / 2.0);
        self.min -= pad;
        self.max += pad;
    }

    /// Extends the box until `width / height` matches the target ratio.
    ///
    /// A box that is too narrow widens symmetrically; one that is too wide
    /// grows upward only, keeping the ground line in place. A box with no
    /// height is left unchanged.
    pub fn fix_aspect_ratio(&mut self, width: f32, height: f32) {
        let size = self.size();
        if size.y <= 0.0 || height <= 0.0 {
            return;
        }
        let target = width / height;
        let current = size.x / size.y;
        if target > current {
            let correction = size.y * (target - current);
            self.min.x -= 0.5 * correction;
            self.max.x += 0.5 * correction;
        } else if target > 0.0 {
            self.max.y = self.min.y + size.x / target;
        }
    }
}
