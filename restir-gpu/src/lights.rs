use crate::{Hit, Light, LightId, TargetFunction, World};

#[derive(Clone, Copy)]
pub struct LightsView<'a> {
    items: &'a [Light],
}

impl<'a> LightsView<'a> {
    pub fn new(items: &'a [Light]) -> Self {
        Self { items }
    }

    pub fn get(&self, id: LightId) -> Option<Light> {
        self.items.get(id.get() as usize).copied()
    }

    /// Evaluates target function of given light at `hit`.
    ///
    /// Lights that don't exist (or are environment lights while the
    /// environment is disabled) have a zero target function, as do lights
    /// for which the target function isn't a finite number.
    pub fn p_hat(
        &self,
        world: &World,
        target: &dyn TargetFunction,
        hit: &Hit,
        id: LightId,
    ) -> f32 {
        let Some(light) = self.get(id) else {
            return 0.0;
        };

        if light.is_environment() && !world.environment() {
            return 0.0;
        }

        let p_hat = target.p_hat(hit, &light);

        if p_hat.is_finite() && p_hat > 0.0 {
            p_hat
        } else {
            0.0
        }
    }
}
