use crate::{Hit, Light};

/// Answers whether a light can be seen from a shading point (a shadow ray).
pub trait Visibility: Sync {
    fn is_visible(&self, hit: &Hit, light: &Light) -> bool;
}

impl<F> Visibility for F
where
    F: Fn(&Hit, &Light) -> bool + Sync,
{
    fn is_visible(&self, hit: &Hit, light: &Light) -> bool {
        self(hit, light)
    }
}

/// Visibility oracle for scenes without any occluders.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unoccluded;

impl Visibility for Unoccluded {
    fn is_visible(&self, _: &Hit, _: &Light) -> bool {
        true
    }
}
