use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use lode::{Camera, World};
use lode_blocks::Block;
use lode_geom::Vec3;
use lode_render::{RecordingDevice, RecordingShader};
use lode_world::{WorldGen, WorldGenConfig};

/// Headless engine driver: streams terrain around a scripted camera and
/// reports streaming statistics. Rendering goes through a recording device,
/// so this runs anywhere; a windowed host swaps in its own device.
#[derive(Parser, Debug)]
#[command(name = "lode", version, about)]
struct Args {
    /// World generation config (toml); defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// World seed; overrides the configured one.
    #[arg(long)]
    seed: Option<i32>,

    /// Force flat terrain regardless of the configured mode.
    #[arg(long)]
    flat: bool,

    /// Chunks streamed in every direction around the camera.
    #[arg(long, default_value_t = 2)]
    render_distance: i32,

    /// Engine ticks to run before exiting.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Camera speed in cells per tick.
    #[arg(long, default_value_t = 0.5)]
    speed: f32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => match WorldGenConfig::load_from_path(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => WorldGenConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if args.flat {
        cfg.mode = lode_world::worldgen::Mode::Flat;
    }
    let world_gen = Arc::new(WorldGen::from_config(&cfg));
    log::info!(
        "world seed {} chunk size {} render distance {}",
        world_gen.seed,
        world_gen.chunk_size,
        args.render_distance
    );

    let mut device = RecordingDevice::new();
    let mut shader = RecordingShader::new();
    let mut world = World::new(&mut device, world_gen.clone(), args.render_distance);
    let mut camera = Camera::new(Vec3::new(8.0, 24.0, 8.0));
    camera.pitch = -30.0;

    for tick in 0..args.ticks {
        camera.position += camera.forward() * args.speed;
        world.update(&mut device, camera.position);
        world.cull(&camera.frustum());
        world.render(&mut device, &mut shader, &camera);

        if tick == args.ticks / 2 {
            // Mid-run edit demo: place a torch on whatever is in view.
            let placed = world.add_cube_from_raycast(&camera, 64.0, Block::Torch);
            log::info!("torch placement {}", if placed { "succeeded" } else { "missed" });
        }
        if tick % 60 == 0 {
            let s = world.stats();
            log::info!(
                "tick {tick}: {} loaded, {} saved, {} updating, {} culled{}",
                s.loaded,
                s.saved,
                s.updating,
                s.culled,
                if s.generating { ", generating" } else { "" }
            );
        }
        thread::sleep(Duration::from_millis(2));
    }

    let s = world.stats();
    log::info!("done: {} chunks loaded, {} frozen", s.loaded, s.saved);
    world.dispose(&mut device);
}
