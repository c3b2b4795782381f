use crate::{
    gpu, Camera, CameraBuffers, CameraComputePass, FrameParity, Rasterizer,
};

#[derive(Debug)]
pub struct RasterPass {
    pass: CameraComputePass,
}

impl RasterPass {
    pub fn new(_: &Camera) -> Self {
        Self {
            pass: CameraComputePass::new("raster"),
        }
    }

    pub fn run(
        &self,
        buffers: &mut CameraBuffers,
        rasterizer: &dyn Rasterizer,
        parity: FrameParity,
    ) {
        let camera = buffers.curr_camera;

        self.pass.run(
            camera.screen_size(),
            buffers.gbuffers.curr_mut(parity),
            |screen_pos, out: &mut gpu::GBufferData| {
                *out = rasterizer.raster(&camera, screen_pos).pack();
            },
        );
    }
}
