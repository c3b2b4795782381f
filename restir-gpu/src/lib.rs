//! Common structs, algorithms etc. used by the resampling passes and the
//! engine.
//!
//! Everything here is plain data (`Pod` where it gets stored in per-pixel
//! buffers) plus the per-pixel building blocks that the kernels in
//! `restir-shaders` are made of.

#![allow(clippy::manual_range_contains)]

mod alias_table;
mod camera;
mod gbuffer;
mod hit;
mod light;
mod lights;
mod noise;
mod passes;
mod reservoir;
mod target;
mod utils;
mod visibility;
mod world;

pub use self::alias_table::*;
pub use self::camera::*;
pub use self::gbuffer::*;
pub use self::hit::*;
pub use self::light::*;
pub use self::lights::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::reservoir::*;
pub use self::target::*;
pub use self::utils::*;
pub use self::visibility::*;
pub use self::world::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use glam::*;

    pub use crate::*;
}

/// Maximum number of neighbours a single pixel can reuse during the spatial
/// pass; the engine clamps its configuration to this value.
pub const MAX_SPATIAL_NEIGHBORS: usize = 32;

/// Distances smaller than this are treated as zero when evaluating lights.
pub const RESTIR_EPSILON: f32 = 0.0001;
