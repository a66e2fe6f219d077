// Text Layout
// Implements: base-14 font metrics and greedy line wrapping for the PDF report.

pub mod font_metrics;
pub mod wrap;

pub use font_metrics::{get_metrics, PdfFont};
pub use wrap::wrap_text;
