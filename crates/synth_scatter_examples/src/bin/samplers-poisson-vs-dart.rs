use glam::Vec2;
use synth_scatter::prelude::*;
use synth_scatter_examples::{init_tracing, render_points_to_png, LayerStyle, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let extent = Vec2::new(20.0, 20.0);
    let min_distance = 1.0;
    let config = RenderConfig::new((800, 800), extent);
    let style = LayerStyle {
        fill: [40, 40, 40],
        outline: [160, 160, 200],
    };

    for (name, strategy) in [
        ("poisson", SamplerStrategy::default()),
        (
            "dart",
            SamplerStrategy::DartThrowing {
                max_consecutive_misses: 3000,
            },
        ),
    ] {
        let points = sample_blue_noise(&strategy, extent.x, extent.y, min_distance, 7)?;
        let centered: Vec<Vec2> = points.iter().map(|p| *p - extent * 0.5).collect();
        let out = format!("samplers-{name}.png");
        render_points_to_png(&centered, min_distance, &config, style, &out)?;
        println!("{name}: {} points -> {out}", points.len());
    }
    Ok(())
}
