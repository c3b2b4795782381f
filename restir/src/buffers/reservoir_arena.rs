use std::mem;

use bytemuck::Zeroable;
use log::debug;

use crate::{gpu, DoubleBuffered, FrameParity};

/// Per-pixel reservoirs, laid out as three same-sized buffers.
///
/// Roles of the buffers are derived from the frame parity:
///
/// - `current()` - written by the sampling pass, read by the spatial pass,
/// - `previous()` - last frame's resolved reservoirs, read by the sampling
///   pass,
/// - `scratch()` - written by the spatial pass; after the frame it gets
///   promoted to `current()`.
#[derive(Debug)]
pub struct ReservoirArena {
    frames: DoubleBuffered<Vec<gpu::ReservoirData>>,
    scratch: Vec<gpu::ReservoirData>,
}

impl ReservoirArena {
    /// Allocates buffers for `len` pixels; all reservoirs start empty.
    pub fn new(len: usize) -> Self {
        debug!("Allocating reservoirs for {} pixels", len);

        Self {
            frames: DoubleBuffered::new(|| Self::alloc(len)),
            scratch: Self::alloc(len),
        }
    }

    fn alloc(len: usize) -> Vec<gpu::ReservoirData> {
        vec![gpu::ReservoirData::zeroed(); len]
    }

    pub fn len(&self) -> usize {
        self.scratch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scratch.is_empty()
    }

    pub fn current(&self, parity: FrameParity) -> &[gpu::ReservoirData] {
        self.frames.curr(parity)
    }

    pub fn previous(&self, parity: FrameParity) -> &[gpu::ReservoirData] {
        self.frames.prev(parity)
    }

    pub fn scratch(&self) -> &[gpu::ReservoirData] {
        &self.scratch
    }

    /// Returns buffers used by the sampling pass: current one for writing,
    /// previous one for reading.
    pub fn sampling_targets(
        &mut self,
        parity: FrameParity,
    ) -> (&mut [gpu::ReservoirData], &[gpu::ReservoirData]) {
        let (curr, prev) = self.frames.split_mut(parity);

        (curr, prev)
    }

    /// Returns buffers used by the spatial pass: current one for reading,
    /// scratch one for writing.
    pub fn spatial_targets(
        &mut self,
        parity: FrameParity,
    ) -> (&[gpu::ReservoirData], &mut [gpu::ReservoirData]) {
        (self.frames.curr(parity), &mut self.scratch)
    }

    /// Empties all of the reservoirs.
    pub fn clear(&mut self) {
        debug!("Clearing reservoirs");

        for parity in [FrameParity::Even, FrameParity::Odd] {
            self.frames
                .curr_mut(parity)
                .fill(gpu::ReservoirData::zeroed());
        }

        self.scratch.fill(gpu::ReservoirData::zeroed());
    }

    /// Makes the scratch buffer (holding the resolved reservoirs) current;
    /// the current buffer becomes the new scratch.
    pub fn promote_scratch(&mut self, parity: FrameParity) {
        mem::swap(self.frames.curr_mut(parity), &mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservoir(m: u32) -> gpu::ReservoirData {
        gpu::Reservoir {
            light_id: gpu::LightId::new(0),
            m,
            ..Default::default()
        }
        .pack()
    }

    #[test]
    fn new() {
        let arena = ReservoirArena::new(16);

        assert_eq!(16, arena.len());

        for res in arena.current(FrameParity::Even) {
            assert!(gpu::Reservoir::unpack(res).is_empty());
        }
    }

    #[test]
    fn roles() {
        let mut arena = ReservoirArena::new(1);
        let parity = FrameParity::Even;

        // Frame 1: sample, resample, promote
        arena.sampling_targets(parity).0[0] = reservoir(1);
        arena.spatial_targets(parity).1[0] = reservoir(2);
        arena.promote_scratch(parity);

        assert_eq!(reservoir(2), arena.current(parity)[0]);
        assert_eq!(reservoir(1), arena.scratch()[0]);

        // Frame 2: last frame's resolved reservoirs are visible as previous
        let parity = parity.flip();
        let (curr, prev) = arena.sampling_targets(parity);

        assert_eq!(reservoir(2), prev[0]);

        curr[0] = reservoir(3);

        assert_eq!(reservoir(3), arena.spatial_targets(parity).0[0]);
        assert_eq!(reservoir(2), arena.previous(parity)[0]);
    }

    #[test]
    fn clear() {
        let mut arena = ReservoirArena::new(2);
        let parity = FrameParity::Even;

        arena.sampling_targets(parity).0[0] = reservoir(1);
        arena.spatial_targets(parity).1[1] = reservoir(2);
        arena.promote_scratch(parity);
        arena.sampling_targets(parity.flip()).0[1] = reservoir(3);

        arena.clear();

        for res in arena
            .current(parity)
            .iter()
            .chain(arena.previous(parity))
            .chain(arena.scratch())
        {
            assert!(gpu::Reservoir::unpack(res).is_empty());
        }
    }
}
