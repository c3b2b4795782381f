use bytemuck::{Pod, Zeroable};

/// Scene-wide uniforms shared by every resampling pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct World {
    /// Combination of `World::*` flags
    pub flags: u32,

    /// Number of candidates drawn from the alias table per pixel
    pub initial_light_sample_count: u32,

    /// Number of neighbours visited by the spatial pass
    pub spatial_neighbors: u32,

    /// Radius (in pixels) of the disk neighbours are chosen from
    pub spatial_radius: f32,

    /// Maximum `m` that a temporal reservoir is allowed to carry over
    pub temporal_m_max: u32,

    /// Luminance threshold for environment contributions; zero disables
    /// the clamp
    pub firefly_clamp_threshold: f32,

    /// Divisor applied to environment contributions
    pub environment_power: f32,

    /// Minimum dot product between normals of surfaces that can share
    /// their reservoirs
    pub normal_threshold: f32,

    /// Maximum (relative) depth difference between surfaces that can share
    /// their reservoirs
    pub depth_threshold: f32,

    /// Maximum metallic / roughness difference between surfaces that can
    /// share their reservoirs
    pub material_threshold: f32,

    pub _padding: [u32; 2],
}

impl World {
    pub const TEMPORAL_REUSE: u32 = 1;
    pub const SPATIAL_REUSE: u32 = 1 << 1;
    pub const VISIBILITY_REUSE: u32 = 1 << 2;
    pub const ENVIRONMENT: u32 = 1 << 3;
    pub const OCCLUSION_RESETS: u32 = 1 << 4;
    pub const SPATIAL_SELECTED_SUPPORT: u32 = 1 << 5;

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    pub fn temporal_reuse(&self) -> bool {
        self.has(Self::TEMPORAL_REUSE)
    }

    pub fn spatial_reuse(&self) -> bool {
        self.has(Self::SPATIAL_REUSE)
    }

    pub fn visibility_reuse(&self) -> bool {
        self.has(Self::VISIBILITY_REUSE)
    }

    pub fn environment(&self) -> bool {
        self.has(Self::ENVIRONMENT)
    }

    pub fn occlusion_resets(&self) -> bool {
        self.has(Self::OCCLUSION_RESETS)
    }

    pub fn spatial_selected_support(&self) -> bool {
        self.has(Self::SPATIAL_SELECTED_SUPPORT)
    }
}
