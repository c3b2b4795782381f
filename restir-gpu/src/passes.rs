use bytemuck::{Pod, Zeroable};

/// Per-dispatch parameters of a resampling pass.
///
/// Each pass gets its own seed, so that kernels dispatched within the same
/// frame don't draw correlated random numbers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct PassParams {
    pub seed: u32,
}
