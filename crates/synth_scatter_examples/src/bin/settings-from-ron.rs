use std::fs;

use glam::Vec3;
use synth_scatter::prelude::*;
use synth_scatter_examples::{init_tracing, render_report_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = format!(
        "{}/assets/settings-from-ron/scene.ron",
        env!("CARGO_MANIFEST_DIR")
    );
    let settings: ScatterSettings = ron::from_str(&fs::read_to_string(&path)?)?;
    settings.validate()?;
    info!("Loaded settings from {}.", path);

    let mut library = PrefabLibrary::new()
        .with_prefab(SceneNode::mesh("bottle", Vec3::Y * 0.5, Vec3::new(0.15, 0.5, 0.15)))
        .with_prefab(SceneNode::mesh("box", Vec3::ZERO, Vec3::splat(0.5)))
        .with_prefab(SceneNode::new("empty_group"));
    let rejected = library.retain_valid();
    println!("skipped prefabs without geometry: {rejected:?}");

    let selectors = LayerSelectors::uniform(&library);
    let view = settings.background.placement_area * 1.5;
    let mut controller =
        IterationController::try_new(settings, PrefabArena::new(library), selectors)?;

    let config = RenderConfig::new((800, 800), view);
    let placed = controller.run_iteration(&mut (), |report, pool| {
        render_report_to_png(report, pool, &config, "settings-from-ron.png")
            .map(|_| report.placements.len())
    })??;
    println!("placed {placed} instances -> settings-from-ron.png");
    Ok(())
}
