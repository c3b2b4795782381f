use glam::{uvec2, UVec2};
use log::trace;
use rayon::prelude::*;

use crate::utils;

/// Data-parallel dispatch of a per-pixel kernel.
///
/// Rows of the output are processed concurrently; `run()` returns only after
/// every pixel has been processed, which makes it a barrier between passes.
#[derive(Debug)]
pub struct CameraComputePass {
    label: String,
}

impl CameraComputePass {
    pub fn new(label: impl ToString) -> Self {
        Self {
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invokes `kernel` for each pixel, giving it that pixel's slot of `out`.
    pub fn run<T, F>(&self, size: UVec2, out: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(UVec2, &mut T) + Sync,
    {
        if size.x == 0 || size.y == 0 {
            return;
        }

        trace!("Running pass: {}", self.label);

        let label = format!("restir_{}_pass", self.label);

        utils::measure(&label, || {
            out.par_chunks_mut(size.x as usize)
                .take(size.y as usize)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, item) in row.iter_mut().enumerate() {
                        kernel(uvec2(x as u32, y as u32), item);
                    }
                });
        });
    }

    /// Same as [`Self::run()`], but for kernels with two outputs.
    pub fn run2<A, B, F>(
        &self,
        size: UVec2,
        out_a: &mut [A],
        out_b: &mut [B],
        kernel: F,
    ) where
        A: Send,
        B: Send,
        F: Fn(UVec2, &mut A, &mut B) + Sync,
    {
        if size.x == 0 || size.y == 0 {
            return;
        }

        trace!("Running pass: {}", self.label);

        let label = format!("restir_{}_pass", self.label);

        utils::measure(&label, || {
            out_a
                .par_chunks_mut(size.x as usize)
                .zip(out_b.par_chunks_mut(size.x as usize))
                .take(size.y as usize)
                .enumerate()
                .for_each(|(y, (row_a, row_b))| {
                    for (x, (a, b)) in
                        row_a.iter_mut().zip(row_b.iter_mut()).enumerate()
                    {
                        kernel(uvec2(x as u32, y as u32), a, b);
                    }
                });
        });
    }
}
