use glam::Vec3;
use synth_scatter::prelude::*;
use synth_scatter_examples::{init_tracing, render_report_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut library = PrefabLibrary::new();
    let targets = vec![
        library.add(SceneNode::mesh("mug", Vec3::ZERO, Vec3::new(0.4, 0.5, 0.4))),
        library.add(
            SceneNode::new("desk_lamp")
                .with_child(SceneNode::mesh("foot", Vec3::ZERO, Vec3::new(0.3, 0.05, 0.3)))
                .with_child(SceneNode::mesh("head", Vec3::new(0.2, 1.2, 0.0), Vec3::splat(0.25))),
        ),
    ];
    let distractors = vec![
        library.add(SceneNode::mesh("crate", Vec3::ZERO, Vec3::splat(1.0))),
        library.add(SceneNode::mesh("plank", Vec3::ZERO, Vec3::new(2.0, 0.1, 0.4))),
    ];

    let settings = ScatterSettings::new(42);
    let view = settings.background.placement_area * 1.5;
    let mut controller = IterationController::try_new(
        settings,
        PrefabArena::new(library),
        LayerSelectors::split(targets, distractors),
    )?;

    let config = RenderConfig::new((800, 800), view);
    for i in 0..3 {
        let out = format!("layers-basic-{i}.png");
        let report = controller.run_iteration(&mut (), |report, pool| {
            render_report_to_png(report, pool, &config, &out).map(|_| report.clone())
        })??;
        println!(
            "iteration {}: size {:.2}, {} foreground, {} background, {} occluders -> {out}",
            report.iteration,
            report.reference_size,
            report.count(LayerKind::Foreground),
            report.count(LayerKind::Background),
            report.count(LayerKind::Occluder),
        );
    }

    println!(
        "pool capacity after 3 iterations: {}",
        controller.pool().capacity()
    );
    Ok(())
}
