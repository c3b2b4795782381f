use glam::{vec3, Vec3};
use log::{debug, info};
use rand::Rng;

use crate::{gpu, AliasTable, Error, Result};

/// Lights of a scene, together with alias tables used to sample them.
///
/// Local lights (points and triangles) always come first, followed by the
/// environment ones; the `local` table covers just the local lights, while
/// the `all` table covers everything.
#[derive(Clone, Debug)]
pub struct Lights {
    items: Vec<gpu::Light>,
    local_count: usize,
    local: AliasTable,
    all: AliasTable,
}

impl Lights {
    pub fn new(lights: Vec<gpu::Light>) -> Result<Self> {
        if lights.is_empty() {
            return Err(Error::NoLights);
        }

        for (id, light) in lights.iter().enumerate() {
            Self::validate(light)
                .map_err(|reason| Error::InvalidLight { id, reason })?;
        }

        let (mut items, environment): (Vec<_>, Vec<_>) =
            lights.into_iter().partition(|light| !light.is_environment());

        let local_count = items.len();

        items.extend(environment);

        let weights: Vec<_> =
            items.iter().map(|light| light.importance()).collect();

        let all = AliasTable::new(&weights)?;

        let local = if local_count > 0 {
            AliasTable::new(&weights[..local_count])?
        } else {
            Default::default()
        };

        info!(
            "Lights loaded: {} local, {} environment",
            local_count,
            items.len() - local_count
        );

        Ok(Self {
            items,
            local_count,
            local,
            all,
        })
    }

    fn validate(light: &gpu::Light) -> std::result::Result<(), &'static str> {
        let is_finite = [light.d0, light.d1, light.d2, light.d3]
            .iter()
            .all(|d| d.truncate().is_finite())
            && light.d1.w.is_finite();

        if !is_finite {
            return Err("light contains non-finite data");
        }

        if light.intensity().min_element() < 0.0 {
            return Err("light has negative intensity");
        }

        match light.kind() {
            Some(gpu::LightKind::Point) => Ok(()),

            Some(gpu::LightKind::Triangle) => {
                if light.area() > 0.0 {
                    Ok(())
                } else {
                    Err("triangle is degenerate")
                }
            }

            Some(gpu::LightKind::Environment) => {
                if light.direction().length_squared() > 0.0 {
                    Ok(())
                } else {
                    Err("environment light has no direction")
                }
            }

            None => Err("unknown light type"),
        }
    }

    /// Generates point lights scattered uniformly inside given bounds; used
    /// for scenes that don't carry any lights on their own.
    pub fn random_points(
        rng: &mut impl Rng,
        min: Vec3,
        max: Vec3,
        count: usize,
        intensity: f32,
        white: bool,
    ) -> Vec<gpu::Light> {
        debug!(
            "Generating {} random point lights within {:?}..{:?}",
            count, min, max
        );

        (0..count)
            .map(|_| {
                let position = vec3(
                    rng.gen_range(min.x..=max.x),
                    rng.gen_range(min.y..=max.y),
                    rng.gen_range(min.z..=max.z),
                );

                let color = if white {
                    Vec3::ONE
                } else {
                    vec3(rng.gen(), rng.gen(), rng.gen())
                };

                gpu::Light::point(position, color * intensity)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn local_count(&self) -> usize {
        self.local_count
    }

    pub fn items(&self) -> &[gpu::Light] {
        &self.items
    }

    pub fn get(&self, id: gpu::LightId) -> Option<&gpu::Light> {
        self.items.get(id.get() as usize)
    }

    /// Returns the alias table to sample lights from, depending on whether
    /// the environment is enabled or not.
    pub fn alias_table(&self, environment: bool) -> &AliasTable {
        if environment || self.local_count == 0 {
            &self.all
        } else {
            &self.local
        }
    }
}
