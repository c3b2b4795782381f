use restir_shaders::di_spatial_resampling;

use crate::{
    gpu, Camera, CameraBuffers, CameraComputePass, Engine, FrameParity,
};

#[derive(Debug)]
pub struct DiSpatialResamplingPass {
    pass: CameraComputePass,
}

impl DiSpatialResamplingPass {
    pub fn new(_: &Camera) -> Self {
        Self {
            pass: CameraComputePass::new("di_spatial_resampling"),
        }
    }

    pub fn run<T, V>(
        &self,
        engine: &Engine<T, V>,
        buffers: &mut CameraBuffers,
        world: &gpu::World,
        params: gpu::PassParams,
        parity: FrameParity,
    ) where
        T: gpu::TargetFunction,
        V: gpu::Visibility,
    {
        let lights = engine.lights().items();
        let camera = buffers.curr_camera;
        let gbuffer = buffers.gbuffers.curr(parity);
        let (in_reservoirs, out_reservoirs) =
            buffers.reservoirs.spatial_targets(parity);

        self.pass.run2(
            camera.screen_size(),
            out_reservoirs,
            &mut buffers.radiance,
            |global_id, out_reservoir, out_radiance| {
                di_spatial_resampling::main(
                    global_id,
                    &params,
                    world,
                    lights,
                    engine.target(),
                    engine.visibility(),
                    &camera,
                    gbuffer,
                    in_reservoirs,
                    out_reservoir,
                    out_radiance,
                );
            },
        );
    }
}
