use std::{fs, path::Path, path::PathBuf};

use anyhow::{bail, Context, Result};
use cavewar_core::{RoomSeed, Theme};
use cavewar_world::{build_level, BrickTexture, Level, LevelConfig, Segment};
use clap::Parser;
use image::{imageops::FilterType, Rgba, RgbaImage};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a room's cave to PNG", long_about = None)]
struct Args {
    /// Room name the level seed is derived from
    #[arg(short, long, default_value = "room1")]
    room: String,

    /// Output image path (PNG)
    #[arg(long, default_value = "cave.png")]
    output_image: PathBuf,

    /// Output summary JSON path
    #[arg(long, default_value = "cave.json")]
    output_meta: PathBuf,

    /// Downscale factor applied to the full-size world image
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Tint indestructible segments so they stand out
    #[arg(long)]
    mark_boundary: bool,
}

#[derive(Debug, Serialize)]
struct CaveSummary {
    room: String,
    seed: i32,
    theme: &'static str,
    grid_width: usize,
    grid_height: usize,
    solid_cells: usize,
    main_tunnels: Vec<i32>,
    chambers: usize,
    segments: usize,
    destructible: usize,
    image_width: u32,
    image_height: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    if args.scale == 0 {
        bail!("--scale must be at least 1");
    }
    let room = RoomSeed::derive(&args.room);
    let theme = Theme::from_room_name(&room.name);
    let config = LevelConfig::default();
    let level = build_level(room.seed, theme, &config);

    let full = render(&level, &config, args.mark_boundary);
    let image = if args.scale > 1 {
        image::imageops::resize(
            &full,
            (full.width() / args.scale).max(1),
            (full.height() / args.scale).max(1),
            FilterType::Nearest,
        )
    } else {
        full
    };

    ensure_parent(&args.output_image)?;
    image.save(&args.output_image).with_context(|| {
        format!(
            "Failed to write preview image to {}",
            args.output_image.display()
        )
    })?;

    let summary = CaveSummary {
        room: room.name.clone(),
        seed: room.seed,
        theme: theme.as_str(),
        grid_width: level.layout.grid.width(),
        grid_height: level.layout.grid.height(),
        solid_cells: level.layout.grid.solid_count(),
        main_tunnels: level.layout.main_tunnels.clone(),
        chambers: level.layout.chambers.len(),
        segments: level.segments.len(),
        destructible: level.destructible_count(),
        image_width: image.width(),
        image_height: image.height(),
    };
    ensure_parent(&args.output_meta)?;
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&args.output_meta, json)
        .with_context(|| format!("Failed to write summary to {}", args.output_meta.display()))?;

    info!(room = %room.name, seed = room.seed, segments = summary.segments, "preview written");
    println!(
        "Rendered {} ({} segments, {} destructible) to {}",
        room.name,
        summary.segments,
        summary.destructible,
        args.output_image.display()
    );
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {parent:?}"))?;
        }
    }
    Ok(())
}

fn background(theme: Theme) -> Rgba<u8> {
    match theme {
        Theme::Default => Rgba([18, 18, 22, 255]),
        Theme::Clouds => Rgba([135, 190, 235, 255]),
        Theme::Volcano => Rgba([30, 8, 4, 255]),
        Theme::Space => Rgba([6, 4, 16, 255]),
    }
}

fn render(level: &Level, config: &LevelConfig, mark_boundary: bool) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(
        config.world_width,
        config.world_height,
        background(level.theme),
    );
    for segment in &level.segments {
        blit(&mut canvas, segment, level.theme, mark_boundary);
    }
    canvas
}

fn blit(canvas: &mut RgbaImage, segment: &Segment, theme: Theme, mark_boundary: bool) {
    let texture = BrickTexture::render(&segment.identity, theme);
    let left = (segment.identity.x - segment.identity.width / 2.0).round() as i64;
    let top = (segment.identity.y - segment.identity.height / 2.0).round() as i64;
    for ty in 0..texture.height() {
        for tx in 0..texture.width() {
            let (x, y) = (left + i64::from(tx), top + i64::from(ty));
            if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height())
            {
                continue;
            }
            let mut px = texture.pixel(tx, ty);
            if px[3] == 0 {
                continue;
            }
            if mark_boundary && !segment.is_voxel() {
                px[2] = px[2].saturating_add(80);
            }
            canvas.put_pixel(x as u32, y as u32, Rgba(px));
        }
    }
}
