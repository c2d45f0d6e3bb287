//! Headless GameSpec runner
//!
//! Loads a GameSpec JSON document, steps the scene a fixed number of frames
//! and prints the resulting transforms and any script faults. Useful for
//! smoke-testing authored games and scripts without a renderer.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use worldkit_runtime::SceneRuntime;
use worldkit_world::GameSpec;

#[derive(Parser, Debug)]
#[command(name = "player", about = "Run a Worldkit GameSpec headlessly")]
struct Args {
    /// Path to the GameSpec JSON document
    spec: PathBuf,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Fixed frame delta in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// World id to load (defaults to the document's first world)
    #[arg(long)]
    world: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let json = std::fs::read_to_string(&args.spec)
        .with_context(|| format!("reading {}", args.spec.display()))?;
    let spec = GameSpec::from_json(&json).context("parsing GameSpec")?;

    let mut scene = SceneRuntime::new();
    match &args.world {
        Some(world_id) => scene.load_world(&spec, world_id)?,
        None => scene.load_game(&spec)?,
    }

    info!(
        "Simulating {} frames at dt={:.4}s ({})",
        args.frames,
        args.dt,
        spec.meta.name
    );

    scene.start();
    for _ in 0..args.frames {
        scene.update(args.dt);
    }

    let registry = scene.registry();
    let registry = registry
        .read()
        .map_err(|_| anyhow::anyhow!("scene registry poisoned"))?;
    println!("Final object transforms:");
    for object in registry.iter() {
        let p = object.transform.position;
        println!(
            "  #{:<4} {:<24} position ({:>8.3}, {:>8.3}, {:>8.3})",
            object.id, object.name, p.x, p.y, p.z
        );
    }
    drop(registry);

    let faults: Vec<_> = scene
        .fault_report()
        .into_iter()
        .filter(|entry| entry.info.has_error)
        .collect();
    if faults.is_empty() {
        println!("No script faults.");
    } else {
        println!("Script faults:");
        for entry in faults {
            println!(
                "  #{:<4} {:<24} script={} errors={} disabled={} last={}",
                entry.object_id,
                entry.object_name,
                entry.script_id.as_deref().unwrap_or("-"),
                entry.info.error_count,
                entry.info.is_disabled,
                entry.info.last_error.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
