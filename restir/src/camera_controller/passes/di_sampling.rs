use restir_shaders::di_sampling;

use crate::{
    gpu, Camera, CameraBuffers, CameraComputePass, Engine, FrameParity,
};

#[derive(Debug)]
pub struct DiSamplingPass {
    pass: CameraComputePass,
}

impl DiSamplingPass {
    pub fn new(_: &Camera) -> Self {
        Self {
            pass: CameraComputePass::new("di_sampling"),
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
        let alias_table = engine.lights().alias_table(world.environment());
        let curr_camera = buffers.curr_camera;
        let prev_camera = buffers.prev_camera;
        let curr_gbuffer = buffers.gbuffers.curr(parity);
        let prev_gbuffer = buffers.gbuffers.prev(parity);
        let (out, prev_reservoirs) = buffers.reservoirs.sampling_targets(parity);

        self.pass.run(
            curr_camera.screen_size(),
            out,
            |global_id, out_reservoir| {
                di_sampling::main(
                    global_id,
                    &params,
                    world,
                    lights,
                    alias_table.cells(),
                    engine.target(),
                    engine.visibility(),
                    &curr_camera,
                    &prev_camera,
                    curr_gbuffer,
                    prev_gbuffer,
                    prev_reservoirs,
                    out_reservoir,
                );
            },
        );
    }
}
