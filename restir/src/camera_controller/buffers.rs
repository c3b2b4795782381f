use bytemuck::Zeroable;
use glam::Vec4;
use log::debug;

use crate::{gpu, Camera, DoubleBuffered, ReservoirArena};

/// Per-camera state; reallocated only when the viewport's size changes.
#[derive(Debug)]
pub struct CameraBuffers {
    pub curr_camera: gpu::Camera,
    pub prev_camera: gpu::Camera,
    pub gbuffers: DoubleBuffered<Vec<gpu::GBufferData>>,
    pub reservoirs: ReservoirArena,
    pub radiance: Vec<Vec4>,
}

impl CameraBuffers {
    pub fn new(camera: &Camera) -> Self {
        debug!("Initializing camera buffers");

        let len = camera.pixel_count();
        let serialized = camera.serialize();

        Self {
            curr_camera: serialized,
            prev_camera: serialized,
            gbuffers: DoubleBuffered::new(|| {
                vec![gpu::GBufferData::zeroed(); len]
            }),
            reservoirs: ReservoirArena::new(len),
            radiance: vec![Vec4::ZERO; len],
        }
    }
}
