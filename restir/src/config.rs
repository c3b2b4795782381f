use log::warn;

use crate::gpu;

/// What happens to a pixel's reservoir when its selected light turns out to
/// be occluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OcclusionPolicy {
    /// Reservoir keeps its light and history count, but loses all of its
    /// weight.
    #[default]
    KeepHistory,

    /// Reservoir becomes empty.
    Reset,
}

/// How the spatial pass computes the normalization factor of the merged
/// reservoir.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpatialNormalization {
    /// Counts contributors whose own light is visible from the pixel being
    /// resampled.
    #[default]
    ContributorSupport,

    /// Counts contributors whose surfaces could have produced the light that
    /// got finally selected.
    SelectedSampleSupport,
}

/// Feature flags and tunables of the resampling passes.
///
/// Changing any of them between frames resets the accumulated state, the same
/// way moving the camera does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestirConfig {
    pub temporal_reuse: bool,
    pub spatial_reuse: bool,
    pub visibility_test: bool,
    pub environment: bool,

    /// Log2 of the number of lights sampled per pixel, in range `0..=10`.
    pub initial_sample_count_log2: u32,

    pub spatial_neighbor_count: u32,

    /// Radius (in pixels) in which spatial neighbours are looked for.
    pub spatial_radius: f32,

    /// Temporal history gets clamped to this many times the initial sample
    /// count; in range `0..=100`.
    pub temporal_history_clamp_multiplier: u32,

    /// Maximum luminance of environment contributions; zero disables the
    /// clamp.
    pub firefly_clamp_threshold: f32,

    /// Divisor applied to environment contributions, in range `1.0..=10.0`.
    pub environment_power: f32,

    pub normal_threshold: f32,
    pub depth_threshold: f32,
    pub material_threshold: f32,
    pub occlusion_policy: OcclusionPolicy,
    pub spatial_normalization: SpatialNormalization,

    /// Seed for the per-frame noise; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl RestirConfig {
    pub const MAX_INITIAL_SAMPLE_COUNT_LOG2: u32 = 10;
    pub const MAX_TEMPORAL_HISTORY_CLAMP_MULTIPLIER: u32 = 100;
    pub const MAX_SPATIAL_RADIUS: f32 = 50.0;
    pub const MAX_FIREFLY_CLAMP_THRESHOLD: f32 = 5.0;
    pub const MAX_ENVIRONMENT_POWER: f32 = 10.0;

    pub fn initial_light_sample_count(&self) -> u32 {
        1 << self.initial_sample_count_log2
    }

    /// Returns a copy of this configuration with out-of-range values clamped
    /// to something safe.
    pub fn sanitized(&self) -> Self {
        let default = Self::default();
        let mut this = *self;

        if this.initial_sample_count_log2 > Self::MAX_INITIAL_SAMPLE_COUNT_LOG2
        {
            warn!(
                "initial_sample_count_log2 = {} is out of range; clamping to {}",
                this.initial_sample_count_log2,
                Self::MAX_INITIAL_SAMPLE_COUNT_LOG2
            );

            this.initial_sample_count_log2 = Self::MAX_INITIAL_SAMPLE_COUNT_LOG2;
        }

        if this.temporal_history_clamp_multiplier
            > Self::MAX_TEMPORAL_HISTORY_CLAMP_MULTIPLIER
        {
            warn!(
                "temporal_history_clamp_multiplier = {} is out of range; \
                 clamping to {}",
                this.temporal_history_clamp_multiplier,
                Self::MAX_TEMPORAL_HISTORY_CLAMP_MULTIPLIER
            );

            this.temporal_history_clamp_multiplier =
                Self::MAX_TEMPORAL_HISTORY_CLAMP_MULTIPLIER;
        }

        if this.spatial_neighbor_count as usize > gpu::MAX_SPATIAL_NEIGHBORS {
            warn!(
                "spatial_neighbor_count = {} is out of range; clamping to {}",
                this.spatial_neighbor_count,
                gpu::MAX_SPATIAL_NEIGHBORS
            );

            this.spatial_neighbor_count = gpu::MAX_SPATIAL_NEIGHBORS as u32;
        }

        if this.spatial_reuse && this.spatial_neighbor_count == 0 {
            warn!(
                "spatial reuse is enabled with zero neighbours; using {}",
                default.spatial_neighbor_count
            );

            this.spatial_neighbor_count = default.spatial_neighbor_count;
        }

        if !(this.spatial_radius >= 1.0
            && this.spatial_radius <= Self::MAX_SPATIAL_RADIUS)
        {
            let radius = if this.spatial_radius.is_finite() {
                this.spatial_radius.clamp(1.0, Self::MAX_SPATIAL_RADIUS)
            } else {
                default.spatial_radius
            };

            warn!(
                "spatial_radius = {} is out of range; using {}",
                this.spatial_radius, radius
            );

            this.spatial_radius = radius;
        }

        if !(this.firefly_clamp_threshold >= 0.0
            && this.firefly_clamp_threshold
                <= Self::MAX_FIREFLY_CLAMP_THRESHOLD)
        {
            let threshold = if this.firefly_clamp_threshold.is_finite() {
                this.firefly_clamp_threshold
                    .clamp(0.0, Self::MAX_FIREFLY_CLAMP_THRESHOLD)
            } else {
                default.firefly_clamp_threshold
            };

            warn!(
                "firefly_clamp_threshold = {} is out of range; using {}",
                this.firefly_clamp_threshold, threshold
            );

            this.firefly_clamp_threshold = threshold;
        }

        if !(this.environment_power >= 1.0
            && this.environment_power <= Self::MAX_ENVIRONMENT_POWER)
        {
            let power = if this.environment_power.is_finite() {
                this.environment_power
                    .clamp(1.0, Self::MAX_ENVIRONMENT_POWER)
            } else {
                default.environment_power
            };

            warn!(
                "environment_power = {} is out of range; using {}",
                this.environment_power, power
            );

            this.environment_power = power;
        }

        for (name, value, fallback) in [
            (
                "normal_threshold",
                &mut this.normal_threshold,
                default.normal_threshold,
            ),
            (
                "depth_threshold",
                &mut this.depth_threshold,
                default.depth_threshold,
            ),
            (
                "material_threshold",
                &mut this.material_threshold,
                default.material_threshold,
            ),
        ] {
            if !value.is_finite() || *value < 0.0 {
                warn!("{} = {} is invalid; using {}", name, value, fallback);

                *value = fallback;
            }
        }

        this
    }

    /// Returns the scene uniforms corresponding to this configuration.
    pub fn serialize(&self, temporal_m_max: u32) -> gpu::World {
        let mut flags = 0;

        for (enabled, flag) in [
            (self.temporal_reuse, gpu::World::TEMPORAL_REUSE),
            (self.spatial_reuse, gpu::World::SPATIAL_REUSE),
            (self.visibility_test, gpu::World::VISIBILITY_REUSE),
            (self.environment, gpu::World::ENVIRONMENT),
            (
                self.occlusion_policy == OcclusionPolicy::Reset,
                gpu::World::OCCLUSION_RESETS,
            ),
            (
                self.spatial_normalization
                    == SpatialNormalization::SelectedSampleSupport,
                gpu::World::SPATIAL_SELECTED_SUPPORT,
            ),
        ] {
            if enabled {
                flags |= flag;
            }
        }

        gpu::World {
            flags,
            initial_light_sample_count: self.initial_light_sample_count(),
            spatial_neighbors: self.spatial_neighbor_count,
            spatial_radius: self.spatial_radius,
            temporal_m_max,
            firefly_clamp_threshold: self.firefly_clamp_threshold,
            environment_power: self.environment_power,
            normal_threshold: self.normal_threshold,
            depth_threshold: self.depth_threshold,
            material_threshold: self.material_threshold,
            _padding: Default::default(),
        }
    }
}

impl Default for RestirConfig {
    fn default() -> Self {
        Self {
            temporal_reuse: true,
            spatial_reuse: true,
            visibility_test: true,
            environment: false,
            initial_sample_count_log2: 5,
            spatial_neighbor_count: 4,
            spatial_radius: 30.0,
            temporal_history_clamp_multiplier: 20,
            firefly_clamp_threshold: 2.0,
            environment_power: 1.0,
            normal_threshold: 0.9,
            depth_threshold: 0.1,
            material_threshold: 0.25,
            occlusion_policy: Default::default(),
            spatial_normalization: Default::default(),
            seed: None,
        }
    }
}
