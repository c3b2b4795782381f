use bytemuck::{Pod, Zeroable};

use crate::LightId;

/// Single bucket of an alias table (Vose's method).
///
/// Drawing bucket `i` uniformly, then keeping `i` with probability
/// `threshold` (or jumping to `alias` otherwise), selects every light with
/// its normalized weight.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct AliasCell {
    pub threshold: f32,
    pub alias: u32,

    /// Selection probability of this bucket's own light.
    pub pdf: f32,

    /// Selection probability of `alias`.
    pub alias_pdf: f32,
}

#[derive(Clone, Copy)]
pub struct AliasTableView<'a> {
    cells: &'a [AliasCell],
}

impl<'a> AliasTableView<'a> {
    pub fn new(cells: &'a [AliasCell]) -> Self {
        Self { cells }
    }

    /// Picks a light, using a single uniform number from `<0.0, 1.0)`;
    /// returns the light together with the probability of picking it.
    pub fn sample(&self, u: f32) -> Option<(LightId, f32)> {
        if self.cells.is_empty() {
            return None;
        }

        let n = self.cells.len();
        let scaled = u.clamp(0.0, 1.0) * n as f32;
        let idx = (scaled as usize).min(n - 1);
        let cell = self.cells[idx];

        // ---

        if scaled - (idx as f32) < cell.threshold {
            Some((LightId::new(idx as u32), cell.pdf))
        } else {
            Some((LightId::new(cell.alias), cell.alias_pdf))
        }
    }
}
