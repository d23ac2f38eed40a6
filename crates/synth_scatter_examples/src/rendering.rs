use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use synth_scatter::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Fill and outline colors of one layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerStyle {
    pub fill: [u8; 3],
    pub outline: [u8; 3],
}

/// Top-down view of the placement plane, centered on the origin.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World extent covered by the image.
    pub view_extent: Vec2,
    pub background: [u8; 3],
    pub foreground: LayerStyle,
    pub background_layer: LayerStyle,
    pub occluder: LayerStyle,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), view_extent: Vec2) -> Self {
        Self {
            image_size,
            view_extent,
            background: [235, 235, 235],
            foreground: LayerStyle {
                fill: [220, 60, 60],
                outline: [120, 20, 20],
            },
            background_layer: LayerStyle {
                fill: [150, 170, 200],
                outline: [70, 90, 120],
            },
            occluder: LayerStyle {
                fill: [90, 160, 90],
                outline: [30, 80, 30],
            },
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn style(&self, kind: LayerKind) -> LayerStyle {
        match kind {
            LayerKind::Foreground => self.foreground,
            LayerKind::Background => self.background_layer,
            LayerKind::Occluder => self.occluder,
        }
    }

    fn to_pixel(&self, p: Vec2) -> (i64, i64) {
        let (w, h) = self.image_size;
        let uv = p / self.view_extent + Vec2::splat(0.5);
        let x = (uv.x * w as f32).floor() as i64;
        let y = ((1.0 - uv.y) * h as f32).floor() as i64;
        (x, y)
    }

    fn blank(&self) -> RgbImage {
        let (w, h) = self.image_size;
        RgbImage::from_pixel(w, h, Rgb(self.background))
    }
}

/// Renders the xy footprint of every placed instance, far layers first.
pub fn render_report_to_png<P: InstancePool>(
    report: &IterationReport,
    pool: &P,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let mut footprints = Vec::with_capacity(report.placements.len());
    for placement in &report.placements {
        let aabb = compute_bounds(&pool.hierarchy(placement.handle)?)?;
        footprints.push((placement.layer, aabb));
    }
    footprints.sort_by(|a, b| a.1.center().z.total_cmp(&b.1.center().z));

    let mut img = config.blank();
    for (layer, aabb) in &footprints {
        fill_rect(&mut img, config, aabb.min, aabb.max, config.style(*layer));
    }
    img.save(path)?;
    Ok(())
}

/// Renders sample points as dots, each surrounded by a ring of radius `min_distance / 2`.
pub fn render_points_to_png(
    points: &[Vec2],
    min_distance: f32,
    config: &RenderConfig,
    style: LayerStyle,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let mut img = config.blank();
    let px_per_unit = config.image_size.0 as f32 / config.view_extent.x;
    let ring = (min_distance * 0.5 * px_per_unit).max(1.0);
    for &p in points {
        let center = config.to_pixel(p);
        draw_circle(&mut img, center, ring, style.outline, false);
        draw_circle(&mut img, center, 2.0, style.fill, true);
    }
    img.save(path)?;
    Ok(())
}

fn fill_rect(img: &mut RgbImage, config: &RenderConfig, min: Vec3, max: Vec3, style: LayerStyle) {
    let (x0, y1) = config.to_pixel(min.truncate());
    let (x1, y0) = config.to_pixel(max.truncate());
    for y in y0..=y1 {
        for x in x0..=x1 {
            let edge = x == x0 || x == x1 || y == y0 || y == y1;
            put(img, x, y, if edge { style.outline } else { style.fill });
        }
    }
}

fn draw_circle(img: &mut RgbImage, center: (i64, i64), radius: f32, color: [u8; 3], filled: bool) {
    let r = radius.ceil() as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            let d = ((dx * dx + dy * dy) as f32).sqrt();
            let hit = if filled {
                d <= radius
            } else {
                (d - radius).abs() <= 0.5
            };
            if hit {
                put(img, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}
