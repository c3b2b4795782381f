use bytemuck::{Pod, Zeroable};
use glam::{vec3, vec4, Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

use crate::{U32Ext, World};

/// Per-pixel surface description produced by the rasterizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GBufferEntry {
    /// World-space position of the visible surface
    pub position: Vec3,

    /// Distance from the camera to `position`; zero means "no geometry"
    pub depth: f32,

    pub albedo: Vec3,
    pub normal: Vec3,
    pub metallic: f32,
    pub roughness: f32,
}

impl GBufferEntry {
    pub fn unpack(data: GBufferData) -> Self {
        let GBufferData { d0, d1 } = data;

        if d0.w <= 0.0 {
            return Default::default();
        }

        let albedo = {
            let [x, y, z, _] = d1.x.to_bits().to_bytes();

            vec3(x as f32 / 255.0, y as f32 / 255.0, z as f32 / 255.0)
        };

        let normal = Normal::decode(d1.yz());

        let (metallic, roughness) = {
            let [metallic, roughness, ..] = d1.w.to_bits().to_bytes();

            (metallic as f32 / 255.0, roughness as f32 / 255.0)
        };

        Self {
            position: d0.xyz(),
            depth: d0.w,
            albedo,
            normal,
            metallic,
            roughness,
        }
    }

    pub fn pack(self) -> GBufferData {
        if !self.is_some() {
            return Default::default();
        }

        let d0 = self.position.extend(self.depth);

        let d1 = {
            let x = {
                let albedo =
                    (self.albedo.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();

                f32::from_bits(u32::from_bytes([
                    albedo.x as u32,
                    albedo.y as u32,
                    albedo.z as u32,
                    255,
                ]))
            };

            let Vec2 { x: y, y: z } = Normal::encode(self.normal);

            let w = {
                let metallic = (self.metallic.clamp(0.0, 1.0) * 255.0).round();
                let roughness = (self.roughness.clamp(0.0, 1.0) * 255.0).round();

                f32::from_bits(u32::from_bytes([
                    metallic as u32,
                    roughness as u32,
                    Default::default(),
                    Default::default(),
                ]))
            };

            vec4(x, y, z, w)
        };

        GBufferData { d0, d1 }
    }

    pub fn is_some(&self) -> bool {
        self.depth > 0.0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Returns whether `prev` (last frame's entry found by reprojecting this
    /// one) describes the same surface, i.e. whether its temporal reservoir
    /// can be reused here.
    pub fn is_reprojection_of(&self, prev: &Self, world: &World) -> bool {
        if self.is_none() || prev.is_none() {
            return false;
        }

        if self.normal.dot(prev.normal) < world.normal_threshold {
            return false;
        }

        let plane_distance = (prev.position - self.position).dot(self.normal);

        plane_distance.abs() <= world.depth_threshold * self.depth
    }

    /// Returns whether `other` (a nearby pixel in the same frame) is similar
    /// enough for its reservoir to be reused here.
    pub fn is_neighbour_of(&self, other: &Self, world: &World) -> bool {
        if self.is_none() || other.is_none() {
            return false;
        }

        if self.normal.dot(other.normal) < world.normal_threshold {
            return false;
        }

        if (self.depth - other.depth).abs() > world.depth_threshold * self.depth
        {
            return false;
        }

        (self.metallic - other.metallic).abs() <= world.material_threshold
            && (self.roughness - other.roughness).abs()
                <= world.material_threshold
    }
}

/// Packed form of [`GBufferEntry`], as stored in the per-pixel buffers.
///
/// Zeroed data unpacks into an entry without geometry.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct GBufferData {
    /// xyz - position
    /// w - depth
    pub d0: Vec4,

    /// x - albedo (rgba8)
    /// yz - normal (octahedral)
    /// w - metallic and roughness (u8 each)
    pub d1: Vec4,
}

pub struct Normal;

impl Normal {
    /// Compresses normal from Vec3 into Vec2 using octahedron-normal mapping.
    pub fn encode(n: Vec3) -> Vec2 {
        let sum = n.x.abs() + n.y.abs() + n.z.abs();

        if sum == 0.0 {
            return Vec2::splat(0.5);
        }

        let n = n / sum;

        let n = if n.z >= 0.0 {
            n.xy()
        } else {
            let mut t = 1.0 - n.yx().abs();

            t.x = t.x.copysign(n.x);
            t.y = t.y.copysign(n.y);
            t
        };

        n * 0.5 + 0.5
    }

    /// See: [`Self::encode()`].
    pub fn decode(n: Vec2) -> Vec3 {
        let n = n * 2.0 - 1.0;
        let mut n = vec3(n.x, n.y, 1.0 - n.x.abs() - n.y.abs());
        let t = (-n.z).max(0.0);

        n.x -= t.copysign(n.x);
        n.y -= t.copysign(n.y);
        n.normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const EPSILON: f32 = 0.01;

    fn world() -> World {
        World {
            normal_threshold: 0.9,
            depth_threshold: 0.1,
            material_threshold: 0.25,
            ..Default::default()
        }
    }

    fn entry() -> GBufferEntry {
        GBufferEntry {
            position: vec3(1.0, 2.0, 3.0),
            depth: 10.0,
            albedo: vec3(0.1, 0.2, 0.3),
            normal: vec3(0.26, 0.53, -0.80).normalize(),
            metallic: 0.33,
            roughness: 0.66,
        }
    }

    #[test]
    fn serialization() {
        let target = entry();
        let actual = GBufferEntry::unpack(target.pack());

        assert_eq!(target.position, actual.position);
        assert_eq!(target.depth, actual.depth);

        assert_relative_eq!(actual.albedo.x, 0.1, epsilon = EPSILON);
        assert_relative_eq!(actual.albedo.y, 0.2, epsilon = EPSILON);
        assert_relative_eq!(actual.albedo.z, 0.3, epsilon = EPSILON);

        assert_relative_eq!(actual.normal.x, target.normal.x, epsilon = EPSILON);
        assert_relative_eq!(actual.normal.y, target.normal.y, epsilon = EPSILON);
        assert_relative_eq!(actual.normal.z, target.normal.z, epsilon = EPSILON);

        assert_relative_eq!(actual.metallic, 0.33, epsilon = EPSILON);
        assert_relative_eq!(actual.roughness, 0.66, epsilon = EPSILON);
    }

    #[test]
    fn zeroed_data_has_no_geometry() {
        let entry = GBufferEntry::unpack(GBufferData::zeroed());

        assert!(entry.is_none());
        assert!(GBufferEntry::default().pack().d0 == Vec4::ZERO);
    }

    #[test]
    fn reprojection() {
        let world = world();
        let curr = entry();

        assert!(curr.is_reprojection_of(&curr, &world));

        // Sliding along the surface's plane is fine
        let moved = GBufferEntry {
            position: curr.position + curr.normal.any_orthonormal_vector(),
            ..curr
        };

        assert!(curr.is_reprojection_of(&moved, &world));

        // ... but leaving it is not
        let detached = GBufferEntry {
            position: curr.position + curr.normal * 2.0,
            ..curr
        };

        assert!(!curr.is_reprojection_of(&detached, &world));

        let rotated = GBufferEntry {
            normal: -curr.normal,
            ..curr
        };

        assert!(!curr.is_reprojection_of(&rotated, &world));
        assert!(!curr.is_reprojection_of(&GBufferEntry::default(), &world));
    }

    #[test]
    fn neighbour() {
        let world = world();
        let curr = entry();

        assert!(curr.is_neighbour_of(&curr, &world));

        let far_away = GBufferEntry {
            depth: curr.depth * 1.5,
            ..curr
        };

        assert!(!curr.is_neighbour_of(&far_away, &world));

        let metallic = GBufferEntry {
            metallic: 1.0,
            ..curr
        };

        assert!(!curr.is_neighbour_of(&metallic, &world));
    }
}
