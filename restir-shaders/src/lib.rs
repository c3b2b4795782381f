//! Per-pixel kernels of the resampling passes.
//!
//! Every kernel is invoked once per pixel; it reads only from buffers that
//! no invocation of the same dispatch writes to and writes only into the
//! single output slot it's given.

pub mod di_sampling;
pub mod di_spatial_resampling;

#[cfg(test)]
mod testing;
