use core::f32::consts::PI;

use glam::Vec3;

use crate::{Hit, Light, LightKind, Vec3Ext, RESTIR_EPSILON};

/// Shading model that the reservoirs resample lights for.
pub trait TargetFunction: Sync {
    /// Returns radiance reflected from `hit` towards the eye due to `light`,
    /// ignoring occlusion.
    fn radiance(&self, hit: &Hit, light: &Light) -> Vec3;

    /// Returns the (unnormalized) target function of `light` at `hit`.
    ///
    /// Must be non-zero wherever [`Self::radiance()`] is.
    fn p_hat(&self, hit: &Hit, light: &Light) -> f32 {
        self.radiance(hit, light).luma()
    }
}

/// Lambertian surface lit by unshadowed lights.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffuseTarget;

impl DiffuseTarget {
    /// Returns the irradiance `light` delivers onto `hit`.
    pub fn irradiance(hit: &Hit, light: &Light) -> Vec3 {
        let normal = hit.normal();

        match light.kind() {
            Some(LightKind::Point) => {
                let to_light = light.position() - hit.point();
                let distance_sq = to_light.length_squared();

                if distance_sq < RESTIR_EPSILON {
                    return Vec3::ZERO;
                }

                let cos = normal.dot(to_light / distance_sq.sqrt());

                if cos <= 0.0 {
                    return Vec3::ZERO;
                }

                light.intensity() * cos / distance_sq
            }

            Some(LightKind::Triangle) => {
                let to_light = light.center(hit.point()) - hit.point();
                let distance_sq = to_light.length_squared();

                if distance_sq < RESTIR_EPSILON {
                    return Vec3::ZERO;
                }

                let dir = to_light / distance_sq.sqrt();
                let cos = normal.dot(dir);

                if cos <= 0.0 {
                    return Vec3::ZERO;
                }

                let cos_light = light.normal().dot(-dir).abs();

                light.intensity() * light.area() * cos * cos_light / distance_sq
            }

            Some(LightKind::Environment) => {
                let cos = normal.dot(light.direction());

                if cos <= 0.0 {
                    return Vec3::ZERO;
                }

                light.intensity() * cos
            }

            None => Vec3::ZERO,
        }
    }
}

impl TargetFunction for DiffuseTarget {
    fn radiance(&self, hit: &Hit, light: &Light) -> Vec3 {
        Self::irradiance(hit, light) * hit.gbuffer.albedo / PI
    }

    fn p_hat(&self, hit: &Hit, light: &Light) -> f32 {
        Self::irradiance(hit, light).luma()
    }
}
