use glam::{vec4, Mat4, UVec2, Vec3};

use crate::gpu;

/// Camera as seen by the host: where it's looking from, how wide, and into
/// how large a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World-to-view transformation
    pub view: Mat4,

    /// Vertical field of view, in degrees
    pub fov_y: f32,

    pub viewport_size: UVec2,
}

impl Camera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;

    pub fn new(view: Mat4, fov_y: f32, viewport_size: UVec2) -> Self {
        Self {
            view,
            fov_y,
            viewport_size,
        }
    }

    pub fn look_at(
        eye: Vec3,
        center: Vec3,
        up: Vec3,
        fov_y: f32,
        viewport_size: UVec2,
    ) -> Self {
        Self::new(Mat4::look_at_rh(eye, center, up), fov_y, viewport_size)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_size.x.max(1) as f32 / self.viewport_size.y.max(1) as f32
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y.to_radians(),
            self.aspect_ratio(),
            Self::NEAR,
            Self::FAR,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    pub fn pixel_count(&self) -> usize {
        (self.viewport_size.x as usize) * (self.viewport_size.y as usize)
    }

    /// Returns whether the buffers allocated for this camera can't be used
    /// for `other` anymore.
    pub fn is_invalidated_by(&self, other: &Self) -> bool {
        self.viewport_size != other.viewport_size
    }

    /// Returns whether switching to `other` should reset the accumulated
    /// state, i.e. whether the view or the field of view has changed.
    pub fn is_moved_by(&self, other: &Self) -> bool {
        self.view != other.view || self.fov_y != other.fov_y
    }

    pub fn serialize(&self) -> gpu::Camera {
        let projection_view = self.projection() * self.view;

        gpu::Camera {
            projection_view,
            ndc_to_world: projection_view.inverse(),
            origin: self.origin().extend(0.0),
            screen: vec4(
                self.viewport_size.x as f32,
                self.viewport_size.y as f32,
                0.0,
                0.0,
            ),
        }
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "size={}x{}, fov={}°, origin={:?}",
            self.viewport_size.x,
            self.viewport_size.y,
            self.fov_y,
            self.origin()
        )
    }
}
