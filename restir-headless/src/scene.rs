use glam::{vec3, UVec2, Vec3};
use log::debug;
use rand::Rng;
use restir::{gpu, Camera, Rasterizer};

const EPSILON: f32 = 0.0001;

#[derive(Clone, Copy, Debug)]
enum Shape {
    Sphere { center: Vec3, radius: f32 },

    /// Infinite plane at `y = height`, facing up.
    Ground { height: f32 },
}

impl Shape {
    /// Returns distance to the closest intersection (if any) together with
    /// surface normal at that point.
    fn intersect(&self, ray: &gpu::Ray) -> Option<(f32, Vec3)> {
        match *self {
            Shape::Sphere { center, radius } => {
                let oc = ray.origin() - center;
                let b = oc.dot(ray.dir());
                let c = oc.length_squared() - radius * radius;
                let disc = b * b - c;

                if disc < 0.0 {
                    return None;
                }

                let disc = disc.sqrt();

                let distance = if -b - disc > EPSILON {
                    -b - disc
                } else if -b + disc > EPSILON {
                    -b + disc
                } else {
                    return None;
                };

                let normal = (ray.at(distance) - center) / radius;

                Some((distance, normal))
            }

            Shape::Ground { height } => {
                if ray.dir().y.abs() < EPSILON {
                    return None;
                }

                let distance = (height - ray.origin().y) / ray.dir().y;

                if distance > EPSILON {
                    Some((distance, Vec3::Y))
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Object {
    shape: Shape,
    albedo: Vec3,
    metallic: f32,
    roughness: f32,
}

/// Procedural scene made of spheres resting on a ground plane; acts both as
/// the rasterizer and as the shadow-ray oracle.
#[derive(Clone, Debug)]
pub struct Scene {
    objects: Vec<Object>,
}

impl Scene {
    pub fn demo(rng: &mut impl Rng, spheres: usize) -> Self {
        let mut objects = vec![Object {
            shape: Shape::Ground { height: 0.0 },
            albedo: Vec3::splat(0.8),
            metallic: 0.0,
            roughness: 1.0,
        }];

        let side = (spheres as f32).sqrt().ceil().max(1.0) as usize;

        for idx in 0..spheres {
            let (x, z) = ((idx % side) as f32, (idx / side) as f32);
            let radius = rng.gen_range(0.4..=0.9);

            let center = vec3(
                (x - side as f32 / 2.0) * 2.5 + rng.gen_range(-0.3..=0.3),
                radius,
                (z - side as f32 / 2.0) * 2.5 + rng.gen_range(-0.3..=0.3),
            );

            objects.push(Object {
                shape: Shape::Sphere { center, radius },
                albedo: vec3(rng.gen(), rng.gen(), rng.gen()),
                metallic: 0.0,
                roughness: rng.gen_range(0.3..=1.0),
            });
        }

        debug!("Scene generated: {} objects", objects.len());

        Self { objects }
    }

    /// Returns the box inside which lights can be scattered.
    pub fn light_bounds(&self) -> (Vec3, Vec3) {
        let extent = self
            .objects
            .iter()
            .filter_map(|object| match object.shape {
                Shape::Sphere { center, radius } => {
                    Some(center.x.abs().max(center.z.abs()) + radius)
                }
                Shape::Ground { .. } => None,
            })
            .fold(2.0_f32, f32::max);

        (vec3(-extent, 0.5, -extent), vec3(extent, 4.0, extent))
    }

    fn trace(
        &self,
        ray: &gpu::Ray,
        max_distance: f32,
    ) -> Option<(f32, Object, Vec3)> {
        self.objects
            .iter()
            .filter_map(|object| {
                let (distance, normal) = object.shape.intersect(ray)?;

                (distance < max_distance).then_some((distance, *object, normal))
            })
            .min_by(|(a, ..), (b, ..)| a.total_cmp(b))
    }
}

impl Rasterizer for Scene {
    fn raster(
        &self,
        camera: &gpu::Camera,
        screen_pos: UVec2,
    ) -> gpu::GBufferEntry {
        let ray = camera.ray(screen_pos);

        let Some((depth, object, normal)) = self.trace(&ray, Camera::FAR)
        else {
            return Default::default();
        };

        gpu::GBufferEntry {
            position: ray.at(depth),
            depth,
            albedo: object.albedo,
            normal,
            metallic: object.metallic,
            roughness: object.roughness,
        }
    }
}

impl gpu::Visibility for Scene {
    fn is_visible(&self, hit: &gpu::Hit, light: &gpu::Light) -> bool {
        let origin = hit.nudged_point();
        let to_light = light.center(hit.point()) - origin;
        let distance = to_light.length();

        if distance < EPSILON {
            return true;
        }

        let ray = gpu::Ray::new(origin, to_light / distance);

        self.trace(&ray, distance - EPSILON).is_none()
    }
}
