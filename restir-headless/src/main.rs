mod scene;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::{uvec2, vec3, UVec2, Vec3, Vec4};
use image::{Rgb, RgbImage};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use restir::{
    gpu, Camera, Engine, FrameContext, Lights, OcclusionPolicy, RestirConfig,
    SpatialNormalization,
};

use self::scene::Scene;

/// Renders a procedural scene lit by many lights and writes the result into
/// a PNG file.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long, default_value_t = 512)]
    width: u32,

    #[clap(long, default_value_t = 512)]
    height: u32,

    /// Vertical field of view, in degrees.
    #[clap(long, default_value_t = 50.0)]
    fov: f32,

    /// Number of frames to render before writing the image.
    #[clap(short, long, default_value_t = 16)]
    frames: u32,

    #[clap(short, long, value_name = "FILE", default_value = "restir.png")]
    output: PathBuf,

    /// Seeds both the scene and the per-frame noise.
    #[clap(long)]
    seed: Option<u64>,

    #[clap(long, default_value_t = 16)]
    spheres: usize,

    #[clap(long, default_value_t = 256)]
    lights: usize,

    #[clap(long, default_value_t = 4.0)]
    light_intensity: f32,

    /// Generate colored lights instead of white ones.
    #[clap(long)]
    colored_lights: bool,

    /// Add a sky light shining from above.
    #[clap(long)]
    environment: bool,

    #[clap(long, default_value_t = 1.0)]
    environment_radiance: f32,

    #[clap(long)]
    no_temporal: bool,

    #[clap(long)]
    no_spatial: bool,

    #[clap(long)]
    no_visibility: bool,

    /// Log2 of the number of initial light samples per pixel.
    #[clap(long, default_value_t = 5)]
    samples_log2: u32,

    #[clap(long, default_value_t = 4)]
    neighbors: u32,

    /// Spatial reuse radius, in pixels.
    #[clap(long, default_value_t = 30.0)]
    radius: f32,

    #[clap(long, default_value_t = 20)]
    history_multiplier: u32,

    #[clap(long, default_value_t = 2.0)]
    firefly_clamp: f32,

    #[clap(long, default_value_t = 1.0)]
    environment_power: f32,

    /// Empty reservoirs whose light got occluded, instead of keeping their
    /// history.
    #[clap(long)]
    reset_on_occlusion: bool,

    /// Normalize spatially-merged reservoirs by the support of the selected
    /// sample.
    #[clap(long)]
    selected_support: bool,

    /// Frame budget, in milliseconds.
    #[clap(long)]
    budget: Option<u64>,

    #[clap(long, default_value_t = 1.0)]
    exposure: f32,

    /// Display gamma, from 1.0 to 5.0.
    #[clap(long, default_value_t = 2.2, value_parser = parse_gamma)]
    gamma: f32,

    /// Write one of the G-buffer's properties instead of the lit image.
    #[clap(long, value_enum, default_value_t = DebugMode::None)]
    debug_mode: DebugMode,
}

fn parse_gamma(s: &str) -> Result<f32, String> {
    let gamma: f32 = s.parse().map_err(|err| format!("{err}"))?;

    if (1.0..=5.0).contains(&gamma) {
        Ok(gamma)
    } else {
        Err(format!("gamma must be between 1.0 and 5.0, got {gamma}"))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum DebugMode {
    #[default]
    None,
    Albedo,
    Normal,
    Roughness,
    Metallic,
    Position,
}

impl DebugMode {
    /// Maps G-buffer into colors, or returns `None` if the lit image should
    /// be written instead.
    fn visualize(self, gbuffer: &[gpu::GBufferData]) -> Option<Vec<Vec4>> {
        let view: fn(&gpu::GBufferEntry) -> Vec3 = match self {
            DebugMode::None => return None,
            DebugMode::Albedo => |entry| entry.albedo,
            DebugMode::Normal => |entry| entry.normal * 0.5 + 0.5,
            DebugMode::Roughness => |entry| Vec3::splat(entry.roughness),
            DebugMode::Metallic => |entry| Vec3::splat(entry.metallic),
            DebugMode::Position => |entry| entry.position.abs().fract(),
        };

        let colors = gbuffer
            .iter()
            .map(|data| {
                let entry = gpu::GBufferEntry::unpack(*data);

                if entry.is_none() {
                    Vec4::ZERO
                } else {
                    view(&entry).extend(1.0)
                }
            })
            .collect();

        Some(colors)
    }
}

impl Args {
    fn config(&self) -> RestirConfig {
        RestirConfig {
            temporal_reuse: !self.no_temporal,
            spatial_reuse: !self.no_spatial,
            visibility_test: !self.no_visibility,
            environment: self.environment,
            initial_sample_count_log2: self.samples_log2,
            spatial_neighbor_count: self.neighbors,
            spatial_radius: self.radius,
            temporal_history_clamp_multiplier: self.history_multiplier,
            firefly_clamp_threshold: self.firefly_clamp,
            environment_power: self.environment_power,
            occlusion_policy: if self.reset_on_occlusion {
                OcclusionPolicy::Reset
            } else {
                OcclusionPolicy::KeepHistory
            },
            spatial_normalization: if self.selected_support {
                SpatialNormalization::SelectedSampleSupport
            } else {
                SpatialNormalization::ContributorSupport
            },
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    debug!("{:?}", args);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let scene = Scene::demo(&mut rng, args.spheres);
    let (min, max) = scene.light_bounds();

    let mut lights = Lights::random_points(
        &mut rng,
        min,
        max,
        args.lights,
        args.light_intensity,
        !args.colored_lights,
    );

    if args.environment {
        lights.push(gpu::Light::environment(
            vec3(0.3, 1.0, 0.2),
            Vec3::splat(args.environment_radiance),
        ));
    }

    let lights = Lights::new(lights).context("Couldn't load lights")?;
    let engine = Engine::new(lights, gpu::DiffuseTarget, scene);

    let camera = Camera::look_at(
        vec3(0.0, 7.0, 12.0),
        Vec3::ZERO,
        Vec3::Y,
        args.fov,
        uvec2(args.width, args.height),
    );

    let ctx = FrameContext {
        camera,
        config: args.config(),
        deadline: args.budget.map(Duration::from_millis),
    };

    let mut controller = engine.create_camera(ctx.camera, ctx.config);
    let mut missed_deadlines = 0;

    for _ in 0..args.frames {
        let report = controller.render(&engine, engine.visibility(), &ctx);

        debug!(
            "Frame {} ({:?}) rendered in {:?}",
            report.frame, report.state, report.elapsed
        );

        if report.deadline_missed {
            missed_deadlines += 1;
        }
    }

    if missed_deadlines > 0 {
        warn!(
            "{} out of {} frames missed their deadline",
            missed_deadlines, args.frames
        );
    }

    let image = match args.debug_mode.visualize(controller.gbuffer()) {
        Some(colors) => {
            info!("Writing G-buffer's {:?}", args.debug_mode);

            encode(&colors, camera.viewport_size, 1.0, 1.0)
        }

        None => encode(
            controller.output(),
            camera.viewport_size,
            args.exposure,
            args.gamma,
        ),
    };

    image
        .save(&args.output)
        .with_context(|| format!("Couldn't write {}", args.output.display()))?;

    info!("Image written to {}", args.output.display());

    Ok(())
}

/// Converts linear radiance into a gamma-encoded 8-bit image.
fn encode(
    radiance: &[Vec4],
    size: UVec2,
    exposure: f32,
    gamma: f32,
) -> RgbImage {
    RgbImage::from_fn(size.x, size.y, |x, y| {
        let idx = (y * size.x + x) as usize;

        let color = radiance
            .get(idx)
            .map_or(Vec3::ZERO, |color| color.truncate() * exposure);

        let color = color
            .clamp(Vec3::ZERO, Vec3::ONE)
            .powf(1.0 / gamma)
            .to_array()
            .map(|c| (c * 255.0).round() as u8);

        Rgb(color)
    })
}
