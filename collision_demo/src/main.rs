//! Collision pipeline demo
//!
//! Drives a synthetic scene of bouncing movers through the broad phase and
//! the collision resolver, printing event counts per frame.
//!
//! Usage: `collision_demo [config.toml|config.ron] [frames]`

mod scene;

use std::ops::AddAssign;

use collision_pipeline::foundation::logging;
use collision_pipeline::prelude::*;
use scene::DemoScene;

const SCENE_SEED: u64 = 0x5eed;
const MOVER_COUNT: usize = 400;
const ARENA_SIZE: f32 = 1024.0;
const TILE_SIZE: f32 = 32.0;
const DEFAULT_FRAMES: usize = 120;
const DELTA_TIME: f32 = 1.0 / 60.0;

/// Per-state event tally
#[derive(Debug, Default, Clone, Copy)]
struct EventCounts {
    enter: usize,
    stay: usize,
    leave: usize,
    map: usize,
}

impl EventCounts {
    fn from_hits(hits: &[CollisionHit]) -> Self {
        let mut counts = Self::default();
        for hit in hits {
            match hit.state {
                CollisionState::Enter => counts.enter += 1,
                CollisionState::Stay => counts.stay += 1,
                CollisionState::Leave => counts.leave += 1,
                CollisionState::None => {}
            }
            if hit.is_map() {
                counts.map += 1;
            }
        }
        counts
    }
}

impl AddAssign for EventCounts {
    fn add_assign(&mut self, other: Self) {
        self.enter += other.enter;
        self.stay += other.stay;
        self.leave += other.leave;
        self.map += other.map;
    }
}

fn load_config(path: Option<String>) -> Result<PipelineConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    log::info!("Loading pipeline config from {}", path);
    let config = PipelineConfig::load_from_file(&path)?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next())?;
    let frames = args.next().map(|arg| arg.parse::<usize>()).transpose()?.unwrap_or(DEFAULT_FRAMES);

    println!("=== Collision Pipeline Demo ===");
    println!(
        "  {} movers in a {}x{} arena, {} frames",
        MOVER_COUNT, ARENA_SIZE, ARENA_SIZE, frames
    );
    println!();

    let mut scene = DemoScene::generate(SCENE_SEED, MOVER_COUNT, ARENA_SIZE);
    let mut pipeline = CollisionPipeline::new(config);
    let mut narrow = BoundsNarrowPhase::with_tile_size(TILE_SIZE);
    let mut totals = EventCounts::default();

    for frame in 0..frames {
        scene.update(DELTA_TIME);
        let hits = pipeline.step(scene.store(), &mut narrow);
        let counts = EventCounts::from_hits(&hits);
        totals += counts;

        if frame % 10 == 0 {
            let stats = pipeline.index().stats();
            println!(
                "frame {:4}: enter {:3} stay {:4} leave {:3} map {:3} | \
                 cell {:6.1} cells {:4} regions {:2} ({} entities)",
                frame,
                counts.enter,
                counts.stay,
                counts.leave,
                counts.map,
                stats.cell_size,
                stats.cells,
                stats.regions,
                stats.region_entities,
            );
        }
    }

    println!();
    println!(
        "Totals: enter {} stay {} leave {} map {}, {} pairs colliding at exit",
        totals.enter,
        totals.stay,
        totals.leave,
        totals.map,
        pipeline.resolver().len()
    );
    Ok(())
}
