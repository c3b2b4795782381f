use glam::UVec2;

use crate::gpu;

/// Produces the G-buffer, i.e. tells which surface is visible through each
/// pixel.
pub trait Rasterizer: Sync {
    /// Returns surface seen through given pixel; an entry with zero depth
    /// means that the pixel doesn't see any geometry.
    fn raster(&self, camera: &gpu::Camera, screen_pos: UVec2)
        -> gpu::GBufferEntry;
}

impl<F> Rasterizer for F
where
    F: Fn(&gpu::Camera, UVec2) -> gpu::GBufferEntry + Sync,
{
    fn raster(
        &self,
        camera: &gpu::Camera,
        screen_pos: UVec2,
    ) -> gpu::GBufferEntry {
        self(camera, screen_pos)
    }
}
