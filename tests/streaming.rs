use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lode::{Camera, World};
use lode_blocks::Block;
use lode_geom::Vec3;
use lode_render::RecordingDevice;
use lode_world::{ChunkCoord, WorldGen, WorldGenConfig};

fn flat_gen() -> Arc<WorldGen> {
    let cfg = WorldGenConfig {
        mode: lode_world::worldgen::Mode::Flat,
        flat: lode_world::worldgen::Flat { thickness: 2 },
        ..WorldGenConfig::default()
    };
    Arc::new(WorldGen::from_config(&cfg))
}

/// Ticks the world at a fixed camera position until `done` holds.
fn settle(
    world: &mut World,
    device: &mut RecordingDevice,
    pos: Vec3,
    mut done: impl FnMut(&World) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        world.update(device, pos);
        if done(world) {
            return;
        }
        assert!(Instant::now() < deadline, "world never settled");
        thread::sleep(Duration::from_millis(5));
    }
}

fn assert_registry_disjoint(world: &World) {
    let loaded: HashSet<ChunkCoord> = world.loaded_coords().into_iter().collect();
    let saved: HashSet<ChunkCoord> = world.saved_coords().into_iter().collect();
    assert!(
        loaded.is_disjoint(&saved),
        "coordinate in both loaded and saved"
    );
}

#[test]
fn window_fills_to_render_distance() {
    let mut device = RecordingDevice::new();
    let mut world = World::new(&mut device, flat_gen(), 1);
    let pos = Vec3::new(8.0, 20.0, 8.0);
    settle(&mut world, &mut device, pos, |w| w.stats().loaded == 9);
    let loaded: HashSet<ChunkCoord> = world.loaded_coords().into_iter().collect();
    for dx in -1..=1 {
        for dz in -1..=1 {
            assert!(loaded.contains(&ChunkCoord::new(dx, dz)));
        }
    }
    assert_registry_disjoint(&world);
    world.dispose(&mut device);
}

#[test]
fn leaving_the_window_freezes_chunks_and_reentry_restores_edits() {
    let mut device = RecordingDevice::new();
    let mut world = World::new(&mut device, flat_gen(), 1);
    let home = Vec3::new(8.0, 20.0, 8.0);
    settle(&mut world, &mut device, home, |w| w.stats().loaded == 9);

    // Edit inside the home chunk, then walk far away.
    let mut cam = Camera::new(home);
    cam.pitch = -89.0;
    assert!(world.remove_cube_from_raycast(&cam, 64.0));
    assert_eq!(world.block_at_world(8, 1, 8), Some(Block::Air));

    let far = Vec3::new(8.0 + 64.0 * 5.0, 20.0, 8.0);
    settle(&mut world, &mut device, far, |w| {
        w.is_saved(ChunkCoord::new(0, 0)) && w.stats().loaded == 9
    });
    assert_registry_disjoint(&world);

    // Walk back: the chunk is promoted with its edit intact, never
    // regenerated from scratch.
    settle(&mut world, &mut device, home, |w| {
        w.is_loaded(ChunkCoord::new(0, 0)) && !w.stats().generating
    });
    assert_eq!(world.block_at_world(8, 1, 8), Some(Block::Air));
    assert_registry_disjoint(&world);
    world.dispose(&mut device);
}

#[test]
fn raycast_edits_round_trip() {
    let mut device = RecordingDevice::new();
    let mut world = World::new(&mut device, flat_gen(), 1);
    let pos = Vec3::new(8.0, 20.0, 8.0);
    settle(&mut world, &mut device, pos, |w| {
        w.is_loaded(ChunkCoord::new(0, 0))
    });

    let mut cam = Camera::new(pos);
    cam.pitch = -89.0;
    // Looking straight down at the slab: the surface cell is at y = 1.
    assert_eq!(world.block_at_world(8, 1, 8), Some(Block::Sand));
    assert!(world.add_cube_from_raycast(&cam, 64.0, Block::Torch));
    assert_eq!(world.block_at_world(8, 2, 8), Some(Block::Torch));

    // Remove hits the torch first, then the slab below it.
    assert!(world.remove_cube_from_raycast(&cam, 64.0));
    assert_eq!(world.block_at_world(8, 2, 8), Some(Block::Air));
    assert!(world.remove_cube_from_raycast(&cam, 64.0));
    assert_eq!(world.block_at_world(8, 1, 8), Some(Block::Air));
    world.dispose(&mut device);
}

#[test]
fn missed_raycasts_are_noops() {
    let mut device = RecordingDevice::new();
    let mut world = World::new(&mut device, flat_gen(), 1);
    let pos = Vec3::new(8.0, 20.0, 8.0);
    settle(&mut world, &mut device, pos, |w| {
        w.is_loaded(ChunkCoord::new(0, 0))
    });
    let mut cam = Camera::new(pos);
    // Looking up into empty sky.
    cam.pitch = 45.0;
    assert!(!world.add_cube_from_raycast(&cam, 64.0, Block::Dirt));
    assert!(!world.remove_cube_from_raycast(&cam, 64.0));
    world.dispose(&mut device);
}

#[test]
fn edits_mark_chunks_for_rebuild_and_settle_clean() {
    let mut device = RecordingDevice::new();
    let mut world = World::new(&mut device, flat_gen(), 0);
    let pos = Vec3::new(8.0, 20.0, 8.0);
    settle(&mut world, &mut device, pos, |w| w.stats().loaded == 1);

    let mut cam = Camera::new(pos);
    cam.pitch = -89.0;
    assert!(world.add_cube_from_raycast(&cam, 64.0, Block::Torch));
    // The rebuild cycle drains: eventually no updater is in flight and the
    // chunk is clean again.
    settle(&mut world, &mut device, pos, |w| w.stats().updating == 0);
    world.dispose(&mut device);
}

#[test]
fn no_gpu_leaks_after_dispose() {
    let mut device = RecordingDevice::new();
    let mut world = World::new(&mut device, flat_gen(), 1);
    let pos = Vec3::new(8.0, 20.0, 8.0);
    settle(&mut world, &mut device, pos, |w| w.stats().loaded == 9);
    world.update(&mut device, pos);
    world.dispose(&mut device);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_textures(), 0);
    assert_eq!(device.live_geometries(), 0);
}
