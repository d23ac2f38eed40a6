#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{
    init_tracing, render_points_to_png, render_report_to_png, LayerStyle, RenderConfig,
};
