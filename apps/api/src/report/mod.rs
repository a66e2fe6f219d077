// Report Composer and Pipeline
// Implements: page layout, PDF encoding, end-to-end report generation, report endpoint.
// Layout and encoding are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod compose;
pub mod handlers;
pub mod pdf;
pub mod pipeline;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub use compose::{layout_report, snapshot_rows, ReportContent};
use pdf::PdfMetadata;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Lays out and encodes the report. Returns the PDF bytes.
pub fn compose_report(content: &ReportContent<'_>) -> Result<Vec<u8>, ComposeError> {
    let layout = layout_report(content);
    let metadata = PdfMetadata {
        title: format!("{} \u{2013} {}", content.client, compose::TITLE_SUFFIX),
        subject: "TEAMS executive team diagnostic".to_string(),
    };
    let bytes = pdf::encode_pdf(&layout, &content.chart.raster, &metadata)?;
    debug!(
        "Composed report for '{}': pages={}, bytes={}",
        content.client,
        layout.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Composes the report and writes it to `path`. The caller owns the file.
pub fn compose_to_path(content: &ReportContent<'_>, path: &Path) -> Result<Vec<u8>, ComposeError> {
    let bytes = compose_report(content)?;
    std::fs::write(path, &bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use lopdf::Document;

    use super::compose::tests::{sample_chart, sample_rows};
    use super::*;

    #[test]
    fn test_composed_pdf_parses_and_contains_sections() {
        let chart = sample_chart();
        let rows = sample_rows();
        let content = ReportContent {
            client: "Acme",
            story: "The executive team trusts each other but avoids hard conversations.",
            rows: &rows,
            chart: &chart,
            insight: "Trust peaks while empathy trails the rest.",
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Acme_Executive_Team_Diagnostic.pdf");
        let bytes = compose_to_path(&content, &path).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let text = pdf_extract::extract_text_from_mem(&bytes).unwrap();
        for needle in [
            "Team Story",
            "TEAMS Dimension Snapshot",
            "TEAMS Visual Snapshot",
            "What this means",
            "At risk",
            "No data",
        ] {
            assert!(text.contains(needle), "missing '{needle}' in:\n{text}");
        }
    }
}
