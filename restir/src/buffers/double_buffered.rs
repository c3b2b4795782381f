/// Which of the two generations of a double-buffered resource is the current
/// one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameParity {
    #[default]
    Even,
    Odd,
}

impl FrameParity {
    pub fn flip(self) -> Self {
        match self {
            FrameParity::Even => FrameParity::Odd,
            FrameParity::Odd => FrameParity::Even,
        }
    }
}

/// Pair of resources, one holding the current frame's data and one holding
/// the previous frame's; roles are derived only from the parity.
#[derive(Clone, Debug, Default)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl<T> DoubleBuffered<T> {
    pub fn new(mut f: impl FnMut() -> T) -> Self {
        Self { a: f(), b: f() }
    }

    pub fn curr(&self, parity: FrameParity) -> &T {
        match parity {
            FrameParity::Even => &self.a,
            FrameParity::Odd => &self.b,
        }
    }

    pub fn prev(&self, parity: FrameParity) -> &T {
        self.curr(parity.flip())
    }

    pub fn curr_mut(&mut self, parity: FrameParity) -> &mut T {
        match parity {
            FrameParity::Even => &mut self.a,
            FrameParity::Odd => &mut self.b,
        }
    }

    /// Returns the current generation for writing and the previous one for
    /// reading, at the same time.
    pub fn split_mut(&mut self, parity: FrameParity) -> (&mut T, &T) {
        match parity {
            FrameParity::Even => (&mut self.a, &self.b),
            FrameParity::Odd => (&mut self.b, &self.a),
        }
    }
}
