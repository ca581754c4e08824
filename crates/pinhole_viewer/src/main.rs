use std::path::Path;

use anyhow::{Context, Result};
use pinhole_core::{Color, Mesh};
use pinhole_math::DVec3;
use pinhole_renderer::{DrawOp, RenderConfig, Renderer};

/// Preview size in terminal cells
const PREVIEW_WIDTH: u32 = 96;
const PREVIEW_HEIGHT: u32 = 48;

/// Characters from dark to bright
const RAMP: &[u8] = b" .:-=+*#%@";

const ORBIT_RADIUS: f64 = 6.0;
const ORBIT_STEP: f64 = 0.25;
const DEFAULT_FRAMES: u32 = 24;

const RASTER_OPS: &[DrawOp] = &[
    DrawOp::Clear,
    DrawOp::Rasterize,
    DrawOp::Lit,
    DrawOp::Wireframe,
    DrawOp::Axes,
];

fn load_config(path: Option<&str>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read config {}", path))?;
    let config: RenderConfig =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path))?;
    log::info!("Loaded config from {}", path);
    Ok(config)
}

/// A few tetrahedra around the origin.
fn build_scene(renderer: &mut Renderer) {
    let offsets = [
        DVec3::new(-0.5, -0.5, -0.5),
        DVec3::new(1.5, -0.5, 0.0),
        DVec3::new(-2.0, 0.0, 1.0),
        DVec3::new(0.0, 1.0, -2.0),
    ];
    for (i, offset) in offsets.into_iter().enumerate() {
        let mut mesh = Mesh::tetrahedron(DVec3::ZERO);
        mesh.translate(offset);
        mesh.name = format!("tetrahedron-{}", i);
        renderer.add_mesh(mesh);
    }
}

/// Mean of every vertex in the scene.
fn barycentre(meshes: &[Mesh]) -> DVec3 {
    let (sum, count) = meshes
        .iter()
        .flat_map(|mesh| mesh.vertices())
        .fold((DVec3::ZERO, 0usize), |(sum, n), v| (sum + v.world, n + 1));
    if count == 0 {
        DVec3::ZERO
    } else {
        sum / count as f64
    }
}

/// Camera position on the orbit at `angle`.
fn orbit_position(angle: f64, centre: DVec3) -> DVec3 {
    centre
        + DVec3::new(
            angle.cos() * ORBIT_RADIUS,
            (angle / 4.0).cos() * ORBIT_RADIUS * 0.5,
            angle.sin() * ORBIT_RADIUS,
        )
}

/// Render the color buffer as text, two pixel rows per line.
fn preview(renderer: &Renderer) -> String {
    let mut out = String::new();
    for y in (0..renderer.height()).step_by(2) {
        for x in 0..renderer.width() {
            let color = renderer.pixel(x, y).unwrap_or(Color::BLACK);
            let level = (color.luminance() * (RAMP.len() - 1) as f64).round() as usize;
            out.push(RAMP[level.min(RAMP.len() - 1)] as char);
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Pinhole Viewer");

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().as_deref())?;
    let frames = match args.next() {
        Some(n) => n.parse().with_context(|| format!("Invalid frame count {}", n))?,
        None => DEFAULT_FRAMES,
    };

    let mut renderer = Renderer::new(PREVIEW_WIDTH, PREVIEW_HEIGHT, config)?;
    build_scene(&mut renderer);
    let centre = barycentre(renderer.meshes());

    let centre_x = PREVIEW_WIDTH as f64 / 2.0;
    let centre_y = PREVIEW_HEIGHT as f64 / 2.0;
    let mut angle = 0.0;

    for frame in 0..frames {
        angle += ORBIT_STEP;
        let position = orbit_position(angle, centre);
        renderer.set_camera(position, centre - position, Some(DVec3::Y))?;
        renderer.frame(RASTER_OPS);

        // Highlight whatever sits under the screen centre
        let picked = renderer.pick(centre_x, centre_y);
        if picked != renderer.highlight() {
            log::info!("Frame {}: picked {:?}", frame, picked);
            renderer.set_highlight(picked);
            renderer.frame(RASTER_OPS);
        }

        let stats = renderer.stats();
        log::debug!(
            "Frame {}: {} triangles, {} clipped, {} pixels",
            frame,
            stats.triangles,
            stats.clipped,
            stats.pixels
        );
    }

    println!("{}", preview(&renderer));

    renderer.frame(&[DrawOp::Clear, DrawOp::Rasterize, DrawOp::Flat]);
    let rasterized = renderer.pixels().to_vec();

    renderer.frame(&[DrawOp::Clear, DrawOp::RayTrace]);
    let differing = rasterized
        .iter()
        .zip(renderer.pixels())
        .filter(|(a, b)| a != b)
        .count();
    log::info!(
        "Ray traced frame differs from the rasterized one in {} of {} pixels",
        differing,
        rasterized.len()
    );
    println!("{}", preview(&renderer));

    Ok(())
}
