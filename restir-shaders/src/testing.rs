use restir_gpu::prelude::*;

pub const SIZE: UVec2 = UVec2::new(8, 8);

/// Camera hovering above the `y = 0` plane, looking straight down.
pub fn camera() -> Camera {
    let origin = vec3(0.0, 5.0, 0.0);
    let view = Mat4::look_at_rh(origin, Vec3::ZERO, Vec3::Z);

    let projection =
        Mat4::perspective_rh(60.0_f32.to_radians(), 1.0, 0.1, 100.0);

    let projection_view = projection * view;

    Camera {
        projection_view,
        ndc_to_world: projection_view.inverse(),
        origin: origin.extend(0.0),
        screen: SIZE.as_vec2().extend(0.0).extend(0.0),
    }
}

/// Rasterizes the `y = 0` plane.
pub fn gbuffer(camera: &Camera) -> Vec<GBufferData> {
    let mut out = Vec::new();

    for y in 0..SIZE.y {
        for x in 0..SIZE.x {
            let ray = camera.ray(uvec2(x, y));
            let depth = -ray.origin().y / ray.dir().y;

            let entry = GBufferEntry {
                position: ray.at(depth),
                depth,
                albedo: Vec3::ONE,
                normal: Vec3::Y,
                metallic: 0.0,
                roughness: 1.0,
            };

            out.push(entry.pack());
        }
    }

    out
}

pub fn world() -> World {
    World {
        flags: World::TEMPORAL_REUSE
            | World::SPATIAL_REUSE
            | World::VISIBILITY_REUSE,
        initial_light_sample_count: 32,
        spatial_neighbors: 4,
        spatial_radius: 3.0,
        temporal_m_max: 640,
        firefly_clamp_threshold: 2.0,
        environment_power: 1.0,
        normal_threshold: 0.9,
        depth_threshold: 0.1,
        material_threshold: 0.25,
        _padding: Default::default(),
    }
}

pub fn lights() -> Vec<Light> {
    vec![
        Light::point(vec3(0.0, 2.0, 0.0), Vec3::splat(10.0)),
        Light::point(vec3(1.0, 2.0, 1.0), Vec3::splat(30.0)),
    ]
}

/// Alias table for [`lights()`] (weights 1:3).
pub fn alias_table() -> Vec<AliasCell> {
    vec![
        AliasCell {
            threshold: 0.5,
            alias: 1,
            pdf: 0.25,
            alias_pdf: 0.75,
        },
        AliasCell {
            threshold: 1.0,
            alias: 1,
            pdf: 0.75,
            alias_pdf: 0.75,
        },
    ]
}

pub fn pixels() -> impl Iterator<Item = UVec2> {
    (0..SIZE.y).flat_map(|y| (0..SIZE.x).map(move |x| uvec2(x, y)))
}

pub fn occluded(_: &Hit, _: &Light) -> bool {
    false
}
