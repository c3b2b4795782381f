//! Real-time direct lighting through reservoir-based spatiotemporal
//! importance resampling.
//!
//! The [`Engine`] holds scene-wide state (lights, target function, visibility
//! oracle), while each [`CameraController`] owns per-viewport buffers and
//! renders frames through a fixed sequence of data-parallel passes.

mod alias_table;
mod buffers;
mod camera;
mod camera_controller;
mod config;
mod error;
mod lights;
mod rasterizer;
mod utils;

use derivative::Derivative;
use log::info;
pub use restir_gpu as gpu;

pub use self::alias_table::*;
pub use self::buffers::*;
pub use self::camera::*;
pub use self::camera_controller::*;
pub use self::config::*;
pub use self::error::*;
pub use self::lights::*;
pub use self::rasterizer::*;

#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Engine<T, V>
where
    T: gpu::TargetFunction,
    V: gpu::Visibility,
{
    lights: Lights,

    /// Bumped each time the lights get replaced; reservoirs collected for
    /// an older generation point at lights that are gone.
    lights_generation: u64,

    #[derivative(Debug = "ignore")]
    target: T,

    #[derivative(Debug = "ignore")]
    visibility: V,
}

impl<T, V> Engine<T, V>
where
    T: gpu::TargetFunction,
    V: gpu::Visibility,
{
    pub fn new(lights: Lights, target: T, visibility: V) -> Self {
        info!("Initializing engine with {} lights", lights.len());

        Self {
            lights,
            lights_generation: 0,
            target,
            visibility,
        }
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn visibility(&self) -> &V {
        &self.visibility
    }

    pub fn lights_generation(&self) -> u64 {
        self.lights_generation
    }

    /// Replaces the scene's lights.
    ///
    /// Cameras notice the change on their next frame and drop all of their
    /// reservoirs, since light ids stored there are no longer valid.
    pub fn set_lights(&mut self, lights: Lights) {
        info!("Updating lights: {} total", lights.len());

        self.lights = lights;
        self.lights_generation += 1;
    }

    pub fn create_camera(
        &self,
        camera: Camera,
        config: RestirConfig,
    ) -> CameraController {
        CameraController::new(camera, config, self.lights_generation)
    }
}
