use restir_gpu::prelude::*;

/// Merges pixel's reservoir with reservoirs of its neighbours and resolves
/// the final radiance.
///
/// Alpha of the radiance tells whether the pixel sees any geometry: it's
/// `1.0` for every pixel with a surface (even an unlit one) and `0.0` for
/// the background.
#[allow(clippy::too_many_arguments)]
pub fn main(
    global_id: UVec2,
    params: &PassParams,
    world: &World,
    lights: &[Light],
    target: &dyn TargetFunction,
    visibility: &dyn Visibility,
    camera: &Camera,
    gbuffer: &[GBufferData],
    in_reservoirs: &[ReservoirData],
    out_reservoir: &mut ReservoirData,
    out_radiance: &mut Vec4,
) {
    let lhs_pos = global_id;
    let lhs_idx = camera.screen_to_idx(lhs_pos);
    let mut wnoise = WhiteNoise::new(params.seed, lhs_pos);
    let lights = LightsView::new(lights);

    if !camera.contains(lhs_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let lhs_hit = Hit::new(
        camera.origin(),
        GBufferEntry::unpack(gbuffer.get(lhs_idx).copied().unwrap_or_default()),
    );

    if lhs_hit.is_none() {
        Reservoir::default().write(out_reservoir);
        *out_radiance = Vec4::ZERO;
        return;
    }

    let lhs = Reservoir::read(in_reservoirs, lhs_idx);

    let res = if world.spatial_reuse() {
        resample(
            &mut wnoise,
            world,
            lights,
            target,
            camera,
            gbuffer,
            in_reservoirs,
            lhs_pos,
            &lhs_hit,
            lhs,
        )
    } else {
        lhs
    };

    res.write(out_reservoir);

    *out_radiance = resolve(world, lights, target, visibility, &lhs_hit, &res)
        .extend(1.0);
}

#[derive(Clone, Copy, Default)]
struct Contributor {
    hit: Hit,
    m: u32,

    /// Target function of contributor's light at the pixel being resampled
    p_hat: f32,
}

#[allow(clippy::too_many_arguments)]
fn resample(
    wnoise: &mut WhiteNoise,
    world: &World,
    lights: LightsView,
    target: &dyn TargetFunction,
    camera: &Camera,
    gbuffer: &[GBufferData],
    in_reservoirs: &[ReservoirData],
    lhs_pos: UVec2,
    lhs_hit: &Hit,
    lhs: Reservoir,
) -> Reservoir {
    let mut main = Reservoir::default();
    let mut contributors = [Contributor::default(); MAX_SPATIAL_NEIGHBORS + 1];
    let mut contributors_len = 0;

    if !lhs.is_empty() {
        let p_hat = lights.p_hat(world, target, lhs_hit, lhs.light_id);

        main.merge(&lhs, p_hat, wnoise.sample());

        contributors[0] = Contributor {
            hit: *lhs_hit,
            m: lhs.m,
            p_hat,
        };

        contributors_len += 1;
    }

    // ---

    let max_samples =
        (world.spatial_neighbors as usize).min(MAX_SPATIAL_NEIGHBORS);
    let mut accepted = 0;

    for _ in 0..max_samples {
        let rhs_pos = (lhs_pos.as_vec2()
            + wnoise.sample_disk() * world.spatial_radius)
            .round()
            .as_ivec2();

        if !camera.contains(rhs_pos) {
            continue;
        }

        let rhs_pos = rhs_pos.as_uvec2();

        if rhs_pos == lhs_pos {
            continue;
        }

        let rhs_idx = camera.screen_to_idx(rhs_pos);

        let rhs_hit = Hit::new(
            camera.origin(),
            GBufferEntry::unpack(
                gbuffer.get(rhs_idx).copied().unwrap_or_default(),
            ),
        );

        if !lhs_hit.gbuffer.is_neighbour_of(&rhs_hit.gbuffer, world) {
            continue;
        }

        let rhs = Reservoir::read(in_reservoirs, rhs_idx);

        if rhs.is_empty() {
            continue;
        }

        let p_hat = lights.p_hat(world, target, lhs_hit, rhs.light_id);

        main.merge(&rhs, p_hat, wnoise.sample());

        contributors[contributors_len] = Contributor {
            hit: rhs_hit,
            m: rhs.m,
            p_hat,
        };

        contributors_len += 1;
        accepted += 1;
    }

    if accepted == 0 {
        return lhs;
    }

    // ---

    let mut z = 0.0;

    for contributor in &contributors[..contributors_len] {
        let has_support = if world.spatial_selected_support() {
            lights.p_hat(world, target, &contributor.hit, main.light_id) > 0.0
        } else {
            contributor.p_hat > 0.0
        };

        if has_support {
            z += contributor.m as f32;
        }
    }

    main.normalize_with(z);
    main
}

fn resolve(
    world: &World,
    lights: LightsView,
    target: &dyn TargetFunction,
    visibility: &dyn Visibility,
    hit: &Hit,
    res: &Reservoir,
) -> Vec3 {
    if !res.is_contributing() {
        return Vec3::ZERO;
    }

    let Some(light) = lights.get(res.light_id) else {
        return Vec3::ZERO;
    };

    if light.is_environment() && !world.environment() {
        return Vec3::ZERO;
    }

    if world.visibility_reuse() && !visibility.is_visible(hit, &light) {
        return Vec3::ZERO;
    }

    let mut radiance = target.radiance(hit, &light) * res.w;

    if light.is_environment() {
        radiance /= world.environment_power.max(RESTIR_EPSILON);

        if world.firefly_clamp_threshold > 0.0 {
            radiance = radiance.clamp_luma(world.firefly_clamp_threshold);
        }
    }

    if radiance.is_finite() {
        radiance.max(Vec3::ZERO)
    } else {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::testing;

    struct Frame {
        world: World,
        camera: Camera,
        gbuffer: Vec<GBufferData>,
        lights: Vec<Light>,
        reservoirs: Vec<ReservoirData>,
    }

    impl Frame {
        fn new() -> Self {
            let camera = testing::camera();

            Self {
                world: testing::world(),
                gbuffer: testing::gbuffer(&camera),
                camera,
                lights: testing::lights(),
                reservoirs: vec![
                    ReservoirData::default();
                    testing::pixels().count()
                ],
            }
        }

        fn run(
            &self,
            visibility: &dyn Visibility,
        ) -> Vec<(Reservoir, Vec4)> {
            testing::pixels()
                .map(|pos| {
                    let mut out_reservoir = ReservoirData::default();
                    let mut out_radiance = Vec4::ZERO;

                    main(
                        pos,
                        &PassParams { seed: 4321 },
                        &self.world,
                        &self.lights,
                        &DiffuseTarget,
                        visibility,
                        &self.camera,
                        &self.gbuffer,
                        &self.reservoirs,
                        &mut out_reservoir,
                        &mut out_radiance,
                    );

                    (Reservoir::unpack(&out_reservoir), out_radiance)
                })
                .collect()
        }
    }

    fn reservoir(m: u32) -> Reservoir {
        reservoir_of(0, m)
    }

    fn reservoir_of(light_id: u32, m: u32) -> Reservoir {
        Reservoir {
            light_id: LightId::new(light_id),
            p_hat: 1.5,
            w_sum: 3.0 * m as f32,
            m,
            w: 2.0,
        }
    }

    #[test]
    fn empty_neighbours() {
        let mut frame = Frame::new();
        let lhs = reservoir(7);

        lhs.write(&mut frame.reservoirs[9]);

        let out = frame.run(&Unoccluded);

        assert_eq!(lhs, out[9].0);

        for (idx, (res, _)) in out.iter().enumerate() {
            if idx != 9 && res.m == 7 {
                // Some pixel picked our reservoir as its neighbour
                assert_eq!(LightId::new(0), res.light_id);
            }
        }
    }

    #[test]
    fn neighbours() {
        let mut frame = Frame::new();

        for data in &mut frame.reservoirs {
            reservoir(4).write(data);
        }

        frame.world.spatial_neighbors = 32;
        frame.world.depth_threshold = 1.0;

        let out = frame.run(&Unoccluded);

        for (pos, (res, radiance)) in testing::pixels().zip(out) {
            if (2..6).contains(&pos.x) && (2..6).contains(&pos.y) {
                assert!(res.m > 4, "pos={pos}");
            }

            assert!(res.m >= 4);
            assert_eq!(0, res.m % 4);
            assert_eq!(LightId::new(0), res.light_id);

            // Every contributor carries the same light with the same weight,
            // so normalizing by the total `m` must give back that weight
            assert_relative_eq!(res.w, 2.0, epsilon = 1e-5);
            assert!(radiance.x > 0.0);
        }
    }

    /// Light `0` illuminates the plane, light `1` sits underneath it and
    /// contributes nothing; the center pixel holds light `0`, while all of
    /// its neighbours hold light `1`.
    fn frame_with_unsupported_neighbours() -> (Frame, usize) {
        let mut frame = Frame::new();

        frame.lights = vec![
            Light::point(vec3(0.0, 2.0, 0.0), Vec3::splat(10.0)),
            Light::point(vec3(0.0, -2.0, 0.0), Vec3::splat(10.0)),
        ];

        frame.world.spatial_neighbors = 32;
        frame.world.depth_threshold = 1.0;

        for data in &mut frame.reservoirs {
            reservoir_of(1, 4).write(data);
        }

        let center = frame.camera.screen_to_idx(uvec2(3, 3));

        reservoir_of(0, 4).write(&mut frame.reservoirs[center]);

        (frame, center)
    }

    #[test]
    fn normalization_by_contributor_support() {
        let (frame, center) = frame_with_unsupported_neighbours();
        let (res, _) = frame.run(&Unoccluded)[center];

        assert!(res.m > 4);
        assert_eq!(LightId::new(0), res.light_id);

        // Neighbours' light has zero target function here, so only the
        // pixel's own `m` counts
        assert_relative_eq!(res.w, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn normalization_by_selected_sample_support() {
        let (mut frame, center) = frame_with_unsupported_neighbours();

        frame.world.flags |= World::SPATIAL_SELECTED_SUPPORT;

        let (res, _) = frame.run(&Unoccluded)[center];

        assert!(res.m > 4);
        assert_eq!(LightId::new(0), res.light_id);

        // Selected light is visible from every neighbour, so all of the
        // merged `m` counts
        assert_relative_eq!(res.w, 2.0 * 4.0 / res.m as f32, epsilon = 1e-5);
    }

    #[test]
    fn normalization_without_support() {
        let (mut frame, center) = frame_with_unsupported_neighbours();

        reservoir_of(1, 4).write(&mut frame.reservoirs[center]);

        let (res, radiance) = frame.run(&Unoccluded)[center];

        assert!(res.is_empty());
        assert_eq!(Reservoir::default(), res);
        assert_eq!(Vec4::W, radiance);
    }

    #[test]
    fn no_geometry() {
        let mut frame = Frame::new();

        for data in &mut frame.reservoirs {
            reservoir(4).write(data);
        }

        frame.gbuffer[0] = GBufferData::default();

        let out = frame.run(&Unoccluded);

        assert!(out[0].0.is_empty());
        assert_eq!(Vec4::ZERO, out[0].1);

        for (_, radiance) in &out[1..] {
            assert_eq!(1.0, radiance.w);
        }
    }

    #[test]
    fn neighbours_on_different_surfaces_are_rejected() {
        let mut frame = Frame::new();

        for data in &mut frame.reservoirs {
            reservoir(4).write(data);
        }

        for data in &mut frame.gbuffer {
            let mut entry = GBufferEntry::unpack(*data);

            entry.metallic = 1.0;
            *data = entry.pack();
        }

        let mut entry = GBufferEntry::unpack(frame.gbuffer[0]);

        entry.metallic = 0.0;
        frame.gbuffer[0] = entry.pack();

        frame.world.spatial_neighbors = 32;

        let out = frame.run(&Unoccluded);

        assert_eq!(reservoir(4), out[0].0);
    }

    #[test]
    fn spatial_reuse_disabled() {
        let mut frame = Frame::new();

        for (idx, data) in frame.reservoirs.iter_mut().enumerate() {
            reservoir(idx as u32 + 1).write(data);
        }

        frame.world.flags &= !World::SPATIAL_REUSE;

        for (idx, (res, _)) in frame.run(&Unoccluded).into_iter().enumerate() {
            assert_eq!(reservoir(idx as u32 + 1), res);
        }
    }

    #[test]
    fn resolve_occluded() {
        let mut frame = Frame::new();

        for data in &mut frame.reservoirs {
            reservoir(4).write(data);
        }

        for (res, radiance) in frame.run(&testing::occluded) {
            assert!(!res.is_empty());
            assert_eq!(Vec4::W, radiance);
        }
    }

    #[test]
    fn resolve_environment() {
        let mut frame = Frame::new();

        frame.lights = vec![Light::environment(Vec3::Y, Vec3::splat(100.0))];
        frame.world.flags = World::ENVIRONMENT;

        for data in &mut frame.reservoirs {
            reservoir(4).write(data);
        }

        for (_, radiance) in frame.run(&Unoccluded) {
            assert_relative_eq!(
                radiance.truncate().luma(),
                2.0,
                epsilon = 1e-4
            );
        }

        frame.world.flags = 0;

        for (_, radiance) in frame.run(&Unoccluded) {
            assert_eq!(Vec4::W, radiance);
        }
    }
}
