use bytemuck::{Pod, Zeroable};

use crate::{LightId, World};

/// Weighted reservoir holding a single light sample.
///
/// The default value is the empty reservoir: no light, no candidates seen
/// and all weights set to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reservoir {
    /// Currently selected light
    pub light_id: LightId,

    /// Target function of `light_id`, evaluated when it got selected
    pub p_hat: f32,

    /// Sum of the resampling weights of all candidates seen so far
    pub w_sum: f32,

    /// Number of candidates this reservoir represents
    pub m: u32,

    /// Unbiased contribution weight of `light_id`, valid after normalization
    pub w: f32,
}

impl Reservoir {
    pub fn read(buffer: &[ReservoirData], idx: usize) -> Self {
        buffer.get(idx).map(Self::unpack).unwrap_or_default()
    }

    pub fn unpack(data: &ReservoirData) -> Self {
        if data.m == 0 {
            return Default::default();
        }

        Self {
            light_id: LightId::new(data.light_id),
            p_hat: data.p_hat,
            w_sum: data.w_sum,
            m: data.m,
            w: data.w,
        }
    }

    pub fn write(self, out: &mut ReservoirData) {
        *out = self.pack();
    }

    pub fn pack(self) -> ReservoirData {
        ReservoirData {
            light_id: self.light_id.get(),
            m: self.m,
            p_hat: self.p_hat,
            w_sum: self.w_sum,
            w: self.w,
            _padding: Default::default(),
        }
    }

    /// Streams a candidate whose resampling weight is its target function,
    /// i.e. a candidate drawn with unit source pdf.
    pub fn update(&mut self, light_id: LightId, p_hat: f32, u: f32) -> bool {
        self.update_weighted(light_id, p_hat, p_hat, u)
    }

    /// Streams a candidate with given resampling weight; `u` is a uniform
    /// number from `<0.0, 1.0)`.
    ///
    /// The candidate replaces the current sample with probability
    /// `weight / w_sum`; candidates with a zero weight are counted but can
    /// never get selected.
    pub fn update_weighted(
        &mut self,
        light_id: LightId,
        p_hat: f32,
        weight: f32,
        u: f32,
    ) -> bool {
        self.m = self.m.saturating_add(1);

        if !(weight > 0.0 && weight.is_finite()) {
            return false;
        }

        self.w_sum += weight;

        if u * self.w_sum <= weight {
            self.light_id = light_id;
            self.p_hat = p_hat;
            true
        } else {
            false
        }
    }

    /// Folds another (normalized) reservoir into this one as a single
    /// candidate; `p_hat` is the target function of `rhs.light_id`
    /// evaluated at this reservoir's shading point.
    pub fn merge(&mut self, rhs: &Self, p_hat: f32, u: f32) -> bool {
        if rhs.is_empty() {
            return false;
        }

        self.m = self.m.saturating_add(rhs.m - 1);

        self.update_weighted(
            rhs.light_id,
            p_hat,
            p_hat * rhs.w * rhs.m as f32,
            u,
        )
    }

    /// Computes the contribution weight, treating every candidate seen so far
    /// as able to produce the selected light.
    pub fn normalize(&mut self) {
        self.normalize_with(self.m as f32);
    }

    /// Computes the contribution weight using `z` as the number of candidates
    /// that could have produced the selected light; zero `z` empties the
    /// reservoir.
    pub fn normalize_with(&mut self, z: f32) {
        if z <= 0.0 {
            *self = Default::default();
            return;
        }

        let denom = z * self.p_hat;
        let w = self.w_sum / denom;

        self.w = if denom > 0.0 && w.is_finite() { w } else { 0.0 };
    }

    pub fn clamp_m(&mut self, max: u32) {
        self.m = self.m.min(max);
    }

    /// Marks the selected light as occluded.
    ///
    /// Depending on the world's policy, the reservoir either keeps its
    /// history (light and `m`) while losing all of its weight, or becomes
    /// empty.
    pub fn occlude(&mut self, world: &World) {
        if world.occlusion_resets() {
            *self = Default::default();
        } else {
            self.p_hat = 0.0;
            self.w_sum = 0.0;
            self.w = 0.0;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    /// Returns whether this reservoir holds a light that can contribute
    /// anything.
    pub fn is_contributing(&self) -> bool {
        !self.is_empty() && self.light_id.is_some() && self.w > 0.0
    }
}

/// Packed form of [`Reservoir`], as stored in the per-pixel buffers.
///
/// Zeroed data reads back as the empty reservoir.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ReservoirData {
    pub light_id: u32,
    pub m: u32,
    pub p_hat: f32,
    pub w_sum: f32,
    pub w: f32,
    pub _padding: [u32; 3],
}
