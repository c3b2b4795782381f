use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::Vec3Ext;

/// Index of a light inside of the light collection.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct LightId(u32);

impl LightId {
    /// Sentinel meaning "no light selected".
    pub const NONE: Self = Self(u32::MAX);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl Default for LightId {
    fn default() -> Self {
        Self::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Triangle,
    Environment,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Light {
    /// x - position x / first vertex x / direction towards the light x
    /// y - position y / first vertex y / direction towards the light y
    /// z - position z / first vertex z / direction towards the light z
    /// w - (as u32) light type
    pub d0: Vec4,

    /// x - intensity r (point) / emitted radiance r (triangle, environment)
    /// y - intensity g (point) / emitted radiance g (triangle, environment)
    /// z - intensity b (point) / emitted radiance b (triangle, environment)
    /// w - area (triangle)
    pub d1: Vec4,

    /// xyz - second vertex (triangle)
    pub d2: Vec4,

    /// xyz - third vertex (triangle)
    pub d3: Vec4,
}

impl Light {
    pub const TYPE_POINT: u32 = 0;
    pub const TYPE_TRIANGLE: u32 = 1;
    pub const TYPE_ENVIRONMENT: u32 = 2;

    /// How far away environment lights are placed when a visibility test
    /// needs an actual point on them.
    pub const ENVIRONMENT_DISTANCE: f32 = 10_000.0;

    pub fn point(position: Vec3, intensity: Vec3) -> Self {
        Self {
            d0: position.extend(f32::from_bits(Self::TYPE_POINT)),
            d1: intensity.extend(0.0),
            d2: Vec4::ZERO,
            d3: Vec4::ZERO,
        }
    }

    /// Creates a triangle light; triangles emit on both sides.
    pub fn triangle([a, b, c]: [Vec3; 3], radiance: Vec3) -> Self {
        let area = 0.5 * (b - a).cross(c - a).length();

        Self {
            d0: a.extend(f32::from_bits(Self::TYPE_TRIANGLE)),
            d1: radiance.extend(area),
            d2: b.extend(0.0),
            d3: c.extend(0.0),
        }
    }

    /// Creates a distant light shining from `direction` (pointing towards
    /// the light), e.g. an environment-map texel.
    pub fn environment(direction: Vec3, radiance: Vec3) -> Self {
        Self {
            d0: direction
                .normalize_or_zero()
                .extend(f32::from_bits(Self::TYPE_ENVIRONMENT)),
            d1: radiance.extend(0.0),
            d2: Vec4::ZERO,
            d3: Vec4::ZERO,
        }
    }

    pub fn ty(&self) -> u32 {
        self.d0.w.to_bits()
    }

    pub fn kind(&self) -> Option<LightKind> {
        match self.ty() {
            Self::TYPE_POINT => Some(LightKind::Point),
            Self::TYPE_TRIANGLE => Some(LightKind::Triangle),
            Self::TYPE_ENVIRONMENT => Some(LightKind::Environment),
            _ => None,
        }
    }

    pub fn is_environment(&self) -> bool {
        self.ty() == Self::TYPE_ENVIRONMENT
    }

    pub fn position(&self) -> Vec3 {
        self.d0.xyz()
    }

    pub fn direction(&self) -> Vec3 {
        self.d0.xyz()
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.d0.xyz(), self.d2.xyz(), self.d3.xyz()]
    }

    pub fn intensity(&self) -> Vec3 {
        self.d1.xyz()
    }

    pub fn area(&self) -> f32 {
        self.d1.w
    }

    /// Returns geometric normal of a triangle light.
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices();

        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Returns the point that represents this light when shading `point`.
    pub fn center(&self, point: Vec3) -> Vec3 {
        match self.kind() {
            Some(LightKind::Triangle) => {
                let [a, b, c] = self.vertices();

                (a + b + c) / 3.0
            }

            Some(LightKind::Environment) => {
                point + self.direction() * Self::ENVIRONMENT_DISTANCE
            }

            _ => self.position(),
        }
    }

    /// Returns the weight this light gets in the alias table.
    pub fn importance(&self) -> f32 {
        let luma = self.intensity().luma().max(0.0);

        match self.kind() {
            Some(LightKind::Triangle) => luma * self.area(),
            _ => luma,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn point() {
        let light = Light::point(vec3(1.0, 2.0, 3.0), vec3(4.0, 4.0, 4.0));

        assert_eq!(Some(LightKind::Point), light.kind());
        assert_eq!(vec3(1.0, 2.0, 3.0), light.center(Vec3::ZERO));
        assert_relative_eq!(light.importance(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn triangle() {
        let light = Light::triangle(
            [
                vec3(0.0, 0.0, 0.0),
                vec3(2.0, 0.0, 0.0),
                vec3(0.0, 0.0, 2.0),
            ],
            Vec3::ONE,
        );

        assert_eq!(Some(LightKind::Triangle), light.kind());
        assert_relative_eq!(light.area(), 2.0);
        assert_relative_eq!(light.importance(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(light.normal().y.abs(), 1.0);

        let center = light.center(Vec3::ZERO);

        assert_relative_eq!(center.x, 2.0 / 3.0);
        assert_relative_eq!(center.z, 2.0 / 3.0);
    }

    #[test]
    fn environment() {
        let light = Light::environment(vec3(0.0, 2.0, 0.0), Vec3::ONE);

        assert!(light.is_environment());
        assert_eq!(vec3(0.0, 1.0, 0.0), light.direction());

        assert_eq!(
            vec3(1.0, Light::ENVIRONMENT_DISTANCE, 0.0),
            light.center(vec3(1.0, 0.0, 0.0)),
        );
    }

    #[test]
    fn light_id() {
        assert!(LightId::default().is_none());
        assert!(LightId::new(0).is_some());
        assert_eq!(12, LightId::new(12).get());
    }
}
