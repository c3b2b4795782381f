use glam::Vec3;

use crate::GBufferEntry;

#[derive(Clone, Copy, Debug, Default)]
pub struct Ray {
    origin: Vec3,
    dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.dir * distance
    }
}

/// Shading point: the surface seen through a pixel, together with the
/// position of the eye looking at it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hit {
    pub origin: Vec3,
    pub gbuffer: GBufferEntry,
}

impl Hit {
    /// How far to move a hit point away from its surface to avoid
    /// self-intersection when casting shadow rays
    pub const NUDGE_OFFSET: f32 = 0.01;

    pub fn new(origin: Vec3, gbuffer: GBufferEntry) -> Self {
        Self { origin, gbuffer }
    }

    pub fn point(&self) -> Vec3 {
        self.gbuffer.position
    }

    pub fn normal(&self) -> Vec3 {
        self.gbuffer.normal
    }

    /// Returns the hit point moved slightly away from the surface, for use as
    /// the origin of shadow rays.
    pub fn nudged_point(&self) -> Vec3 {
        self.point() + self.normal() * Self::NUDGE_OFFSET
    }

    pub fn is_some(&self) -> bool {
        self.gbuffer.is_some()
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }
}
