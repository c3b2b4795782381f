mod buffers;
mod pass;
mod passes;

use std::time::{Duration, Instant};

use glam::Vec4;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use self::buffers::*;
pub use self::pass::*;
pub use self::passes::*;
use crate::{gpu, Camera, Engine, FrameParity, Rasterizer, RestirConfig};

/// Number of frames after a reset during which the temporal history clamp is
/// ramped up.
const INITIALIZATION_FRAMES: u32 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameState {
    /// Accumulated state has been recently reset; temporal history is still
    /// being built up.
    #[default]
    Initializing,

    Steady,
}

/// Everything a frame gets rendered with; compared against the previous
/// frame's context to detect changes.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub camera: Camera,
    pub config: RestirConfig,

    /// Time budget of the frame; exceeding it only gets reported.
    pub deadline: Option<Duration>,
}

#[derive(Clone, Copy, Debug)]
pub struct FrameReport {
    pub frame: u32,
    pub state: FrameState,
    pub parity: FrameParity,
    pub elapsed: Duration,
    pub deadline_missed: bool,
}

/// Owns per-camera buffers and drives the passes, frame by frame.
#[derive(Debug)]
pub struct CameraController {
    camera: Camera,
    config: RestirConfig,
    requested_config: RestirConfig,
    buffers: CameraBuffers,
    passes: CameraPasses,
    frame: u32,
    state: FrameState,
    parity: FrameParity,
    rng: StdRng,
    reset_pending: bool,
    lights_generation: u64,
}

impl CameraController {
    pub(crate) fn new(
        camera: Camera,
        config: RestirConfig,
        lights_generation: u64,
    ) -> Self {
        info!("Creating camera: {}", camera.describe());

        let buffers = CameraBuffers::new(&camera);
        let passes = CameraPasses::new(&camera);
        let sanitized = config.sanitized();

        debug!("Camera created");

        Self {
            camera,
            config: sanitized,
            requested_config: config,
            buffers,
            passes,
            frame: 0,
            state: FrameState::Initializing,
            parity: FrameParity::Odd,
            rng: Self::rng(&sanitized),
            reset_pending: true,
            lights_generation,
        }
    }

    fn rng(config: &RestirConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Switches to a new camera and configuration.
    ///
    /// Moving the camera or changing the configuration resets the frame
    /// counter (keeping the history), while resizing the viewport
    /// reallocates all of the buffers.
    pub fn update(&mut self, camera: &Camera, config: &RestirConfig) {
        if self.camera.is_invalidated_by(camera) {
            self.camera = *camera;
            self.rebuild_buffers();
            self.reset_pending = true;
        } else if self.camera.is_moved_by(camera) {
            trace!("Camera moved: {}", camera.describe());

            self.camera = *camera;
            self.reset_pending = true;
        }

        if self.requested_config != *config {
            debug!("Configuration changed");

            let sanitized = config.sanitized();

            if sanitized.seed != self.config.seed {
                self.rng = Self::rng(&sanitized);
            }

            self.config = sanitized;
            self.requested_config = *config;
            self.reset_pending = true;
        }
    }

    /// Drops all of the reservoirs if the engine's lights have been replaced
    /// since the last frame.
    fn sync_lights(&mut self, lights_generation: u64) {
        if self.lights_generation == lights_generation {
            return;
        }

        debug!(
            "Lights changed (generation {} -> {}), dropping history",
            self.lights_generation, lights_generation
        );

        self.buffers.reservoirs.clear();
        self.lights_generation = lights_generation;
        self.reset_pending = true;
    }

    fn rebuild_buffers(&mut self) {
        debug!("Rebuilding buffers for camera: {}", self.camera.describe());

        self.buffers = CameraBuffers::new(&self.camera);
        self.passes = CameraPasses::new(&self.camera);
        self.parity = FrameParity::Odd;
    }

    /// Renders a single frame: rasterizes the scene, samples the lights,
    /// reuses samples across time and space, and resolves the radiance.
    pub fn render<T, V>(
        &mut self,
        engine: &Engine<T, V>,
        rasterizer: &dyn Rasterizer,
        ctx: &FrameContext,
    ) -> FrameReport
    where
        T: gpu::TargetFunction,
        V: gpu::Visibility,
    {
        let started_at = Instant::now();

        self.update(&ctx.camera, &ctx.config);
        self.sync_lights(engine.lights_generation());
        self.advance();

        let world = self.config.serialize(self.temporal_m_max());
        let parity = self.parity;

        self.passes.raster.run(&mut self.buffers, rasterizer, parity);

        let params = self.pass_params();
        self.passes.di_sampling.run(
            engine,
            &mut self.buffers,
            &world,
            params,
            parity,
        );

        let params = self.pass_params();
        self.passes.di_spatial_resampling.run(
            engine,
            &mut self.buffers,
            &world,
            params,
            parity,
        );

        self.buffers.reservoirs.promote_scratch(parity);

        let elapsed = started_at.elapsed();
        let deadline_missed = match ctx.deadline {
            Some(deadline) if elapsed > deadline => {
                warn!(
                    "Frame {} missed its deadline: took {:?}, budget was {:?}",
                    self.frame, elapsed, deadline
                );

                true
            }
            _ => false,
        };

        FrameReport {
            frame: self.frame,
            state: self.state,
            parity,
            elapsed,
            deadline_missed,
        }
    }

    fn advance(&mut self) {
        if self.reset_pending {
            debug!("Resetting accumulated state");

            self.frame = 0;
            self.state = FrameState::Initializing;
            self.reset_pending = false;
        } else {
            self.frame += 1;

            if self.frame > INITIALIZATION_FRAMES {
                self.state = FrameState::Steady;
            }
        }

        self.parity = self.parity.flip();
        self.buffers.prev_camera = self.buffers.curr_camera;
        self.buffers.curr_camera = self.camera.serialize();
    }

    fn pass_params(&mut self) -> gpu::PassParams {
        gpu::PassParams {
            seed: self.rng.gen(),
        }
    }

    fn temporal_m_max(&self) -> u32 {
        let count = self.config.initial_light_sample_count();
        let multiplier = self.config.temporal_history_clamp_multiplier;

        match self.state {
            FrameState::Initializing => {
                count * multiplier.min(self.frame.saturating_add(1))
            }
            FrameState::Steady => count * multiplier,
        }
    }

    /// Returns radiance resolved during the last frame, row by row.
    pub fn output(&self) -> &[Vec4] {
        &self.buffers.radiance
    }

    /// Returns G-buffer rasterized during the last frame, row by row.
    pub fn gbuffer(&self) -> &[gpu::GBufferData] {
        self.buffers.gbuffers.curr(self.parity)
    }

    /// Returns reservoirs resolved during the last frame, row by row.
    pub fn reservoirs(&self) -> &[gpu::ReservoirData] {
        self.buffers.reservoirs.current(self.parity)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RestirConfig {
        &self.config
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn parity(&self) -> FrameParity {
        self.parity
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        info!("Deleting camera: {}", self.camera.describe());
    }
}
