use restir_gpu::prelude::*;

/// Draws the initial light candidates for a pixel and merges them with the
/// pixel's temporal history.
#[allow(clippy::too_many_arguments)]
pub fn main(
    global_id: UVec2,
    params: &PassParams,
    world: &World,
    lights: &[Light],
    alias_table: &[AliasCell],
    target: &dyn TargetFunction,
    visibility: &dyn Visibility,
    curr_camera: &Camera,
    prev_camera: &Camera,
    curr_gbuffer: &[GBufferData],
    prev_gbuffer: &[GBufferData],
    prev_reservoirs: &[ReservoirData],
    out_reservoir: &mut ReservoirData,
) {
    let screen_pos = global_id;
    let screen_idx = curr_camera.screen_to_idx(screen_pos);
    let mut wnoise = WhiteNoise::new(params.seed, screen_pos);
    let lights = LightsView::new(lights);
    let alias_table = AliasTableView::new(alias_table);

    if !curr_camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let hit = Hit::new(
        curr_camera.origin(),
        GBufferEntry::unpack(
            curr_gbuffer.get(screen_idx).copied().unwrap_or_default(),
        ),
    );

    if hit.is_none() {
        Reservoir::default().write(out_reservoir);
        return;
    }

    // ---

    let mut res = Reservoir::default();

    for _ in 0..world.initial_light_sample_count {
        let Some((light_id, pdf)) = alias_table.sample(wnoise.sample()) else {
            break;
        };

        let p_hat = lights.p_hat(world, target, &hit, light_id);
        let weight = if pdf > 0.0 { p_hat / pdf } else { 0.0 };

        res.update_weighted(light_id, p_hat, weight, wnoise.sample());
    }

    res.normalize();

    // ---

    if world.visibility_reuse() && res.is_contributing() {
        let is_visible = lights
            .get(res.light_id)
            .map_or(false, |light| visibility.is_visible(&hit, &light));

        if !is_visible {
            res.occlude(world);
        }
    }

    // ---

    if world.temporal_reuse() {
        let prev = reproject(
            world,
            &hit,
            prev_camera,
            prev_gbuffer,
            prev_reservoirs,
        );

        if let Some(mut prev) = prev {
            prev.clamp_m(world.temporal_m_max);

            let p_hat = lights.p_hat(world, target, &hit, prev.light_id);

            res.merge(&prev, p_hat, wnoise.sample());
            res.normalize();
        }
    }

    res.write(out_reservoir);
}

/// Finds the reservoir that described the same surface in the previous
/// frame.
fn reproject(
    world: &World,
    hit: &Hit,
    prev_camera: &Camera,
    prev_gbuffer: &[GBufferData],
    prev_reservoirs: &[ReservoirData],
) -> Option<Reservoir> {
    let prev_pos = prev_camera.world_to_screen(hit.point())?.floor();

    if !prev_pos.is_finite() {
        return None;
    }

    let prev_pos = prev_pos.as_ivec2();

    if !prev_camera.contains(prev_pos) {
        return None;
    }

    let prev_idx = prev_camera.screen_to_idx(prev_pos.as_uvec2());

    let prev_entry = GBufferEntry::unpack(
        prev_gbuffer.get(prev_idx).copied().unwrap_or_default(),
    );

    if !hit.gbuffer.is_reprojection_of(&prev_entry, world) {
        return None;
    }

    let prev = Reservoir::read(prev_reservoirs, prev_idx);

    if prev.is_empty() {
        None
    } else {
        Some(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    struct Frame {
        world: World,
        camera: Camera,
        gbuffer: Vec<GBufferData>,
        lights: Vec<Light>,
        alias_table: Vec<AliasCell>,
        prev_reservoirs: Vec<ReservoirData>,
    }

    impl Frame {
        fn new() -> Self {
            let camera = testing::camera();

            Self {
                world: testing::world(),
                gbuffer: testing::gbuffer(&camera),
                camera,
                lights: testing::lights(),
                alias_table: testing::alias_table(),
                prev_reservoirs: vec![
                    ReservoirData::default();
                    testing::pixels().count()
                ],
            }
        }

        fn run(&self, visibility: &dyn Visibility) -> Vec<Reservoir> {
            testing::pixels()
                .map(|pos| {
                    let mut out = ReservoirData::default();

                    main(
                        pos,
                        &PassParams { seed: 1234 },
                        &self.world,
                        &self.lights,
                        &self.alias_table,
                        &DiffuseTarget,
                        visibility,
                        &self.camera,
                        &self.camera,
                        &self.gbuffer,
                        &self.gbuffer,
                        &self.prev_reservoirs,
                        &mut out,
                    );

                    Reservoir::unpack(&out)
                })
                .collect()
        }
    }

    #[test]
    fn sampling() {
        let mut frame = Frame::new();

        frame.world.flags = 0;

        for res in frame.run(&Unoccluded) {
            assert_eq!(32, res.m);
            assert!(res.light_id.is_some());
            assert!(res.w > 0.0);
        }
    }

    #[test]
    fn sampling_without_geometry() {
        let mut frame = Frame::new();

        frame.gbuffer[3] = GBufferData::default();

        let out = frame.run(&Unoccluded);

        assert_eq!(Reservoir::default(), out[3]);
        assert!(!out[4].is_empty());
    }

    #[test]
    fn sampling_occluded() {
        let mut frame = Frame::new();

        frame.world.flags = World::VISIBILITY_REUSE;

        for res in frame.run(&testing::occluded) {
            assert_eq!(32, res.m);
            assert!(res.light_id.is_some());
            assert_eq!(0.0, res.w);
        }

        frame.world.flags |= World::OCCLUSION_RESETS;

        for res in frame.run(&testing::occluded) {
            assert!(res.is_empty());
        }
    }

    #[test]
    fn temporal_history_is_clamped() {
        let mut frame = Frame::new();

        frame.world.flags = World::TEMPORAL_REUSE;

        for data in &mut frame.prev_reservoirs {
            Reservoir {
                light_id: LightId::new(1),
                p_hat: 1.0,
                w_sum: 10_000.0,
                m: 10_000,
                w: 1.0,
            }
            .write(data);
        }

        for res in frame.run(&Unoccluded) {
            assert_eq!(32 + 640, res.m);
        }
    }

    #[test]
    fn temporal_history_is_rejected_on_disocclusion() {
        let mut frame = Frame::new();

        frame.world.flags = World::TEMPORAL_REUSE;

        for data in &mut frame.prev_reservoirs {
            Reservoir {
                light_id: LightId::new(1),
                p_hat: 1.0,
                w_sum: 100.0,
                m: 100,
                w: 1.0,
            }
            .write(data);
        }

        // Pretend the previous frame saw a wall standing much closer
        let curr_gbuffer = frame.gbuffer.clone();

        for data in &mut frame.gbuffer {
            let mut entry = GBufferEntry::unpack(*data);

            entry.position.y += 1.0;
            *data = entry.pack();
        }

        let prev_gbuffer = std::mem::replace(&mut frame.gbuffer, curr_gbuffer);
        let mut out = ReservoirData::default();

        main(
            uvec2(4, 4),
            &PassParams::default(),
            &frame.world,
            &frame.lights,
            &frame.alias_table,
            &DiffuseTarget,
            &Unoccluded,
            &frame.camera,
            &frame.camera,
            &frame.gbuffer,
            &prev_gbuffer,
            &frame.prev_reservoirs,
            &mut out,
        );

        assert_eq!(32, Reservoir::unpack(&out).m);
    }
}
