//! Example: Run the particle field headless and save snapshots.
//!
//! Simulates a pointer sweeping across the field, a dominant color change
//! and a wallpaper transition, writing a PNG every half second.
//!
//! Run with:
//!     cargo run --example render_field -- [output_dir] [config.json]

use anyhow::{bail, Context};
use particle_field::{FieldConfig, FrameStatus, LifecycleState, ParticleField};
use std::path::PathBuf;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const FPS: f64 = 60.0;
const DURATION_SECS: f64 = 5.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "field_frames".into()));
    let config = match args.next() {
        Some(path) => FieldConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => FieldConfig::default(),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    println!("Particle Field - Headless Example");
    println!("=================================\n");
    println!("  Resolution: {}x{}", WIDTH, HEIGHT);
    println!("  Particles: {}", config.particle_count);
    println!("  Output: {}\n", output_dir.display());

    let mut field = ParticleField::new(config, WIDTH, HEIGHT);
    if field.initialize() != LifecycleState::Running {
        bail!("no usable GPU adapter, particle field is disabled");
    }

    let total_frames = (DURATION_SECS * FPS) as u32;
    let snapshot_every = (FPS / 2.0) as u32;
    let mut snapshots = 0;

    for frame in 0..total_frames {
        let now = frame as f64 / FPS;

        // Pointer sweeps left to right along a sine path.
        let t = (now / DURATION_SECS) as f32;
        let x = t * WIDTH as f32;
        let y = HEIGHT as f32 * (0.5 + 0.3 * (t * std::f32::consts::TAU * 2.0).sin());
        field.pointer_moved(x, y);

        match frame {
            60 => field.set_dominant_color("#ff7a3d"),
            120 => field.set_bookmark_hover(WIDTH as f32 * 0.25, HEIGHT as f32 * 0.3, true),
            150 => field.set_bookmark_hover(0.0, 0.0, false),
            180 => field.trigger_wallpaper_change(),
            _ => {}
        }

        let status = field.frame(now);
        if !status.should_continue() {
            bail!("render loop stopped at frame {}: {:?}", frame, status);
        }

        if status == FrameStatus::Rendered && frame % snapshot_every == 0 {
            let path = output_dir.join(format!("frame_{:04}.png", frame));
            field
                .save_snapshot(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            snapshots += 1;
        }
    }

    println!(
        "Rendered {} frames, {} particles, tier {}",
        total_frames,
        field.particle_count(),
        field.tier()
    );
    println!("Saved {} snapshots to {}", snapshots, output_dir.display());

    field.destroy();
    Ok(())
}
