// Chart Renderer
// Implements: radar geometry (axes, closed polygon, label anchors) and raster output.
// Rendering is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod radar;

use thiserror::Error;

pub use radar::{render_radar, HAlign, RadarChart, RgbRaster, VAlign};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No dimension has data; nothing to chart")]
    NoData,

    #[error("Chart rendering failed: {0}")]
    Render(String),
}
