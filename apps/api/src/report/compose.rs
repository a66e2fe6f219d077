//! Fixed-flow page layout for the one-page diagnostic.
//!
//! Layout is pure: it turns report content into positioned draw operations per
//! page. `pdf::encode_pdf` turns those into bytes. Coordinates are PDF points
//! with the origin at the bottom-left of the page.

use serde::Serialize;

use crate::chart::{HAlign, RadarChart, VAlign};
use crate::chart::radar::PLOT_RADIUS_FRACTION;
use crate::layout::{get_metrics, wrap_text, PdfFont};
use crate::models::Dimension;
use crate::narrative::NarrativeResult;
use crate::scoring::{ScoreMapping, StatusThresholds, StatusTier};

// ────────────────────────────────────────────────────────────────────────────
// Page and style constants
// ────────────────────────────────────────────────────────────────────────────

pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;
pub const MARGIN_LEFT: f32 = 42.0;
pub const MARGIN_RIGHT: f32 = 42.0;
pub const MARGIN_TOP: f32 = 36.0;
pub const MARGIN_BOTTOM: f32 = 36.0;
pub const CONTENT_WIDTH: f32 = A4_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

pub const COLUMN_WIDTHS: [f32; 3] = [110.0, 70.0, 260.0];
pub const CELL_PAD_X: f32 = 8.0;
pub const CELL_PAD_Y: f32 = 6.0;
pub const CHART_SIZE: f32 = 230.0;

pub const TITLE_SUFFIX: &str = "Executive Team Diagnostic";
pub const SUBTITLE: &str = "Why this matters: To understand how the executive team\u{2019}s behaviour is helping or hindering execution of the current strategy.";
pub const STORY_HEADING: &str = "Team Story";
pub const TABLE_HEADING: &str = "TEAMS Dimension Snapshot";
pub const VISUAL_HEADING: &str = "TEAMS Visual Snapshot";
pub const TABLE_HEADERS: [&str; 3] = ["Dimension", "Status", "What this means"];
pub const NO_DATA: &str = "No data";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

pub const PRIMARY: Rgb = Rgb::hex(0x111827);
pub const SECONDARY: Rgb = Rgb::hex(0x374151);
pub const MUTED: Rgb = Rgb::hex(0x6B7280);
pub const LIGHT_BG: Rgb = Rgb::hex(0xF9FAFB);
pub const GRID: Rgb = Rgb::hex(0xD3D3D3);
pub const RISK_BG: Rgb = Rgb::hex(0xFEF2F2);
pub const RISK_TEXT: Rgb = Rgb::hex(0x991B1B);
pub const FRAGILE_BG: Rgb = Rgb::hex(0xFFFBEB);
pub const FRAGILE_TEXT: Rgb = Rgb::hex(0x92400E);

/// One paragraph style: font, size, leading, colour and vertical spacing.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    font: PdfFont,
    size: f32,
    leading: f32,
    color: Rgb,
    space_before: f32,
    space_after: f32,
    centered: bool,
}

const TITLE: TextStyle = TextStyle {
    font: PdfFont::HelveticaBold,
    size: 18.0,
    leading: 21.6,
    color: PRIMARY,
    space_before: 0.0,
    space_after: 10.0,
    centered: true,
};
const SUBTITLE_STYLE: TextStyle = TextStyle {
    font: PdfFont::HelveticaOblique,
    size: 10.0,
    leading: 12.0,
    color: MUTED,
    space_before: 0.0,
    space_after: 18.0,
    centered: true,
};
const SECTION: TextStyle = TextStyle {
    font: PdfFont::HelveticaBold,
    size: 12.0,
    leading: 14.4,
    color: PRIMARY,
    space_before: 14.0,
    space_after: 6.0,
    centered: false,
};
const BODY: TextStyle = TextStyle {
    font: PdfFont::Helvetica,
    size: 10.0,
    leading: 14.0,
    color: SECONDARY,
    space_before: 0.0,
    space_after: 8.0,
    centered: false,
};
const CELL: TextStyle = TextStyle {
    font: PdfFont::Helvetica,
    size: 9.5,
    leading: 13.0,
    color: SECONDARY,
    space_before: 0.0,
    space_after: 0.0,
    centered: false,
};
const HEADER_CELL: TextStyle = TextStyle {
    font: PdfFont::HelveticaBold,
    size: 9.5,
    leading: 13.0,
    color: PRIMARY,
    space_before: 0.0,
    space_after: 0.0,
    centered: false,
};
const CHART_LABEL: TextStyle = TextStyle {
    font: PdfFont::Helvetica,
    size: 8.0,
    leading: 9.6,
    color: SECONDARY,
    space_before: 0.0,
    space_after: 0.0,
    centered: false,
};

// ────────────────────────────────────────────────────────────────────────────
// Content model
// ────────────────────────────────────────────────────────────────────────────

/// One row of the dimension snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub dimension: Dimension,
    /// `None` when the dimension has no respondents.
    pub status: Option<StatusTier>,
    pub note: String,
}

impl SnapshotRow {
    pub fn status_label(&self) -> &'static str {
        self.status.map(|s| s.label()).unwrap_or(NO_DATA)
    }
}

/// Builds the five table rows in canonical order. A missing note is an empty cell.
pub fn snapshot_rows(
    scores: &ScoreMapping,
    thresholds: &StatusThresholds,
    narrative: &NarrativeResult,
) -> Vec<SnapshotRow> {
    scores
        .entries()
        .iter()
        .map(|entry| SnapshotRow {
            dimension: entry.dimension,
            status: entry.score.map(|s| thresholds.classify(s)),
            note: narrative.note_for(entry.dimension).to_string(),
        })
        .collect()
}

/// Everything the composer needs for one report.
#[derive(Debug, Clone)]
pub struct ReportContent<'a> {
    pub client: &'a str,
    pub story: &'a str,
    pub rows: &'a [SnapshotRow],
    pub chart: &'a RadarChart,
    pub insight: &'a str,
}

// ────────────────────────────────────────────────────────────────────────────
// Draw operations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        font: PdfFont,
        size: f32,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
        line_width: f32,
    },
    /// The radar raster, scaled into the given box.
    Chart { x: f32, y: f32, w: f32, h: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl Page {
    /// Text of every `Text` op, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub pages: Vec<Page>,
}

// ────────────────────────────────────────────────────────────────────────────
// Flow
// ────────────────────────────────────────────────────────────────────────────

/// Cursor over a sequence of pages. `y` is the top of the remaining space.
struct Flow {
    pages: Vec<Page>,
    y: f32,
}

impl Flow {
    const TOP: f32 = A4_HEIGHT - MARGIN_TOP;

    fn new() -> Self {
        Flow {
            pages: vec![Page::default()],
            y: Self::TOP,
        }
    }

    fn at_page_top(&self) -> bool {
        self.y >= Self::TOP
    }

    fn remaining(&self) -> f32 {
        self.y - MARGIN_BOTTOM
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = Self::TOP;
    }

    /// Starts a new page unless `height` fits or the page is still empty.
    /// Returns true when a break happened.
    fn ensure(&mut self, height: f32) -> bool {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
            return true;
        }
        false
    }

    /// Vertical space; swallowed at the top of a page.
    fn space(&mut self, amount: f32) {
        if !self.at_page_top() {
            self.y = (self.y - amount).max(MARGIN_BOTTOM);
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Wrapped paragraph, split line by line across pages.
    fn paragraph(&mut self, text: &str, style: TextStyle) {
        self.space(style.space_before);
        let metrics = get_metrics(style.font);
        for line in wrap_text(text, metrics, style.size, CONTENT_WIDTH) {
            self.ensure(style.leading);
            let width = metrics.width_pt(&line, style.size);
            let x = if style.centered {
                MARGIN_LEFT + (CONTENT_WIDTH - width) / 2.0
            } else {
                MARGIN_LEFT
            };
            let y = baseline(self.y, style);
            self.push(text_op(x, y, style, line));
            self.y -= style.leading;
        }
        self.space(style.space_after);
    }
}

fn baseline(line_top: f32, style: TextStyle) -> f32 {
    line_top - (style.leading - style.size) / 2.0 - 0.8 * style.size
}

fn text_op(x: f32, y: f32, style: TextStyle, text: String) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        font: style.font,
        size: style.size,
        color: style.color,
        text,
    }
}

/// Lays out the report: header, story, snapshot table, chart and insight.
pub fn layout_report(content: &ReportContent<'_>) -> PageLayout {
    let mut flow = Flow::new();

    flow.paragraph(&format!("{} \u{2013} {TITLE_SUFFIX}", content.client), TITLE);
    flow.paragraph(SUBTITLE, SUBTITLE_STYLE);

    flow.paragraph(STORY_HEADING, SECTION);
    flow.paragraph(content.story, BODY);

    flow.space(10.0);
    flow.paragraph(TABLE_HEADING, SECTION);
    layout_table(&mut flow, content.rows);

    flow.space(16.0);
    flow.paragraph(VISUAL_HEADING, SECTION);
    layout_chart(&mut flow, content.chart);

    flow.space(6.0);
    flow.paragraph(content.insight, BODY);

    PageLayout { pages: flow.pages }
}

// ────────────────────────────────────────────────────────────────────────────
// Table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TableRow {
    cells: [Vec<String>; 3],
    styles: [TextStyle; 3],
    backgrounds: [Option<Rgb>; 3],
    height: f32,
}

impl TableRow {
    fn new(texts: [&str; 3], styles: [TextStyle; 3], backgrounds: [Option<Rgb>; 3]) -> Self {
        let cells: [Vec<String>; 3] = std::array::from_fn(|i| {
            wrap_text(
                texts[i],
                get_metrics(styles[i].font),
                styles[i].size,
                COLUMN_WIDTHS[i] - 2.0 * CELL_PAD_X,
            )
        });
        Self::from_cells(cells, styles, backgrounds)
    }

    fn from_cells(
        cells: [Vec<String>; 3],
        styles: [TextStyle; 3],
        backgrounds: [Option<Rgb>; 3],
    ) -> Self {
        let content = (0..3)
            .map(|i| cells[i].len().max(1) as f32 * styles[i].leading)
            .fold(0.0_f32, f32::max);
        TableRow {
            cells,
            styles,
            backgrounds,
            height: content + 2.0 * CELL_PAD_Y,
        }
    }

    /// Splits off the lines that fit in `available` points. Every cell keeps
    /// at least one line in the head so the split always makes progress.
    fn split(&self, available: f32) -> (TableRow, TableRow) {
        let room = available - 2.0 * CELL_PAD_Y;
        let cut: [usize; 3] = std::array::from_fn(|i| {
            let fit = (room / self.styles[i].leading).floor().max(1.0) as usize;
            fit.min(self.cells[i].len())
        });
        let head = std::array::from_fn(|i| self.cells[i][..cut[i]].to_vec());
        let rest = std::array::from_fn(|i| self.cells[i][cut[i]..].to_vec());
        (
            Self::from_cells(head, self.styles, self.backgrounds),
            Self::from_cells(rest, self.styles, self.backgrounds),
        )
    }

    fn draw(&self, flow: &mut Flow) {
        let top = flow.y;
        let bottom = top - self.height;
        let mut x = MARGIN_LEFT;
        for i in 0..3 {
            let w = COLUMN_WIDTHS[i];
            if let Some(color) = self.backgrounds[i] {
                flow.push(DrawOp::FillRect {
                    x,
                    y: bottom,
                    w,
                    h: self.height,
                    color,
                });
            }
            let style = self.styles[i];
            let mut line_top = top - CELL_PAD_Y;
            for line in &self.cells[i] {
                flow.push(text_op(x + CELL_PAD_X, baseline(line_top, style), style, line.clone()));
                line_top -= style.leading;
            }
            flow.push(DrawOp::StrokeRect {
                x,
                y: bottom,
                w,
                h: self.height,
                color: GRID,
                line_width: 0.5,
            });
            x += w;
        }
        flow.y = bottom;
    }
}

fn status_colors(status: Option<StatusTier>) -> (Option<Rgb>, Rgb) {
    match status {
        Some(StatusTier::AtRisk) => (Some(RISK_BG), RISK_TEXT),
        Some(StatusTier::Fragile) => (Some(FRAGILE_BG), FRAGILE_TEXT),
        Some(StatusTier::Strength) | None => (None, CELL.color),
    }
}

/// Header row shaded; on a page break the header is drawn again before the row.
/// A row taller than a whole page is split line by line across pages.
fn layout_table(flow: &mut Flow, rows: &[SnapshotRow]) {
    let header = TableRow::new(
        TABLE_HEADERS,
        [HEADER_CELL; 3],
        [Some(LIGHT_BG); 3],
    );
    let body: Vec<TableRow> = rows
        .iter()
        .map(|row| {
            let (background, text_color) = status_colors(row.status);
            let status_style = TextStyle {
                color: text_color,
                ..CELL
            };
            TableRow::new(
                [row.dimension.label(), row.status_label(), row.note.as_str()],
                [CELL, status_style, CELL],
                [None, background, None],
            )
        })
        .collect();

    // Same arithmetic as `remaining()` right after a header on a fresh page.
    let page_room = (Flow::TOP - header.height) - MARGIN_BOTTOM;
    let first_height = body.first().map(|r| r.height.min(page_room)).unwrap_or(0.0);
    flow.ensure(header.height + first_height);
    header.draw(flow);
    for row in body {
        let mut pending = Some(row);
        while let Some(row) = pending.take() {
            if row.height.min(page_room) > flow.remaining() {
                flow.new_page();
                header.draw(flow);
            }
            if row.height <= flow.remaining() {
                row.draw(flow);
            } else {
                let (head, rest) = row.split(flow.remaining());
                head.draw(flow);
                pending = Some(rest);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chart
// ────────────────────────────────────────────────────────────────────────────

fn layout_chart(flow: &mut Flow, chart: &RadarChart) {
    flow.ensure(CHART_SIZE);
    let x = MARGIN_LEFT + (CONTENT_WIDTH - CHART_SIZE) / 2.0;
    let y = flow.y - CHART_SIZE;
    flow.push(DrawOp::Chart {
        x,
        y,
        w: CHART_SIZE,
        h: CHART_SIZE,
    });

    let centre = (x + CHART_SIZE / 2.0, y + CHART_SIZE / 2.0);
    let radius = CHART_SIZE / 2.0 * PLOT_RADIUS_FRACTION as f32;
    let style = CHART_LABEL;
    let metrics = get_metrics(style.font);
    for axis in &chart.geometry.axes {
        let ax = centre.0 + axis.label_anchor.0 as f32 * radius;
        let ay = centre.1 + axis.label_anchor.1 as f32 * radius;
        let width = metrics.width_pt(&axis.label, style.size);
        let lx = match axis.h_align {
            HAlign::Left => ax,
            HAlign::Center => ax - width / 2.0,
            HAlign::Right => ax - width,
        };
        let ly = match axis.v_align {
            VAlign::Bottom => ay + 2.0,
            VAlign::Middle => ay - 0.35 * style.size,
            VAlign::Top => ay - 0.8 * style.size - 2.0,
        };
        flow.push(text_op(lx, ly, style, axis.label.clone()));
    }
    flow.y = y;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::chart::render_radar;

    pub(crate) fn sample_chart() -> RadarChart {
        render_radar(&[
            (Dimension::Trust, 4.2),
            (Dimension::Empathy, 2.1),
            (Dimension::Alignment, 3.0),
            (Dimension::MeaningPurpose, 1.5),
            (Dimension::PsychologicalSafety, 3.8),
        ])
        .unwrap()
    }

    pub(crate) fn sample_rows() -> Vec<SnapshotRow> {
        vec![
            SnapshotRow {
                dimension: Dimension::Trust,
                status: Some(StatusTier::Strength),
                note: "Peers rely on each other's commitments.".to_string(),
            },
            SnapshotRow {
                dimension: Dimension::Empathy,
                status: Some(StatusTier::AtRisk),
                note: "Perspectives are rarely explored before decisions are taken, so \
                       disagreement goes underground and resurfaces during delivery."
                    .to_string(),
            },
            SnapshotRow {
                dimension: Dimension::Alignment,
                status: Some(StatusTier::Fragile),
                note: String::new(),
            },
            SnapshotRow {
                dimension: Dimension::MeaningPurpose,
                status: None,
                note: String::new(),
            },
            SnapshotRow {
                dimension: Dimension::PsychologicalSafety,
                status: Some(StatusTier::Fragile),
                note: "Challenge is muted in the room.".to_string(),
            },
        ]
    }

    fn all_text(layout: &PageLayout) -> Vec<String> {
        layout
            .pages
            .iter()
            .flat_map(|p| p.texts().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_snapshot_rows_use_thresholds_and_blank_notes() {
        let scores = ScoreMapping::from_scores([(Dimension::Trust, 4.2), (Dimension::Empathy, 2.1)]);
        let narrative = NarrativeResult {
            story: "s".to_string(),
            dimension_notes: BTreeMap::from([(Dimension::Trust, "Solid.".to_string())]),
            ceo_moves: vec!["a".into(), "b".into(), "c".into()],
        };
        let rows = snapshot_rows(&scores, &StatusThresholds::default(), &narrative);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].status, Some(StatusTier::Strength));
        assert_eq!(rows[0].note, "Solid.");
        assert_eq!(rows[1].status, Some(StatusTier::AtRisk));
        assert_eq!(rows[1].note, "");
        assert_eq!(rows[2].status_label(), NO_DATA);
    }

    #[test]
    fn test_short_report_fits_one_page_in_order() {
        let chart = sample_chart();
        let rows = sample_rows();
        let content = ReportContent {
            client: "Acme",
            story: "The team trusts each other but avoids hard conversations.",
            rows: &rows,
            chart: &chart,
            insight: "Trust peaks while empathy trails the rest.",
        };
        let layout = layout_report(&content);
        assert_eq!(layout.pages.len(), 1);

        let texts = all_text(&layout);
        let position = |needle: &str| texts.iter().position(|t| t == needle).unwrap();
        assert!(texts[0].starts_with("Acme \u{2013} Executive Team Diagnostic"));
        assert!(position(STORY_HEADING) < position(TABLE_HEADING));
        assert!(position(TABLE_HEADING) < position("Dimension"));
        assert!(position("Dimension") < position(VISUAL_HEADING));
        assert!(position(VISUAL_HEADING) < position("Trust peaks while empathy trails the rest."));
        assert!(texts.iter().any(|t| t == NO_DATA));
        assert_eq!(
            layout.pages[0]
                .ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Chart { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_everything_stays_inside_margins() {
        let chart = sample_chart();
        let rows = sample_rows();
        let story = "Execution risk is concentrated in how the team handles disagreement. ".repeat(6);
        let content = ReportContent {
            client: "Acme Holdings",
            story: &story,
            rows: &rows,
            chart: &chart,
            insight: "Balanced profile.",
        };
        for page in layout_report(&content).pages {
            for op in page.ops {
                match op {
                    DrawOp::Text { y, .. } => {
                        assert!(y >= MARGIN_BOTTOM - 1.0 && y <= A4_HEIGHT - MARGIN_TOP);
                    }
                    DrawOp::FillRect { x, y, w, .. } | DrawOp::StrokeRect { x, y, w, .. } => {
                        assert!(x >= MARGIN_LEFT - 1e-3);
                        assert!(x + w <= A4_WIDTH - MARGIN_RIGHT + 1e-3);
                        assert!(y >= MARGIN_BOTTOM - 1e-3);
                    }
                    DrawOp::Chart { x, w, .. } => {
                        assert!((x - (MARGIN_LEFT + (CONTENT_WIDTH - w) / 2.0)).abs() < 1e-3);
                    }
                }
            }
        }
    }

    #[test]
    fn test_long_note_wraps_inside_note_column() {
        let chart = sample_chart();
        let mut rows = sample_rows();
        rows[0].note = "Leaders describe a shared commitment to the strategy, yet disagreements \
                        are settled offline and rarely revisited in the room."
            .repeat(3);
        let content = ReportContent {
            client: "Acme",
            story: "Story.",
            rows: &rows,
            chart: &chart,
            insight: "Insight.",
        };
        let layout = layout_report(&content);
        let note_x = MARGIN_LEFT + COLUMN_WIDTHS[0] + COLUMN_WIDTHS[1] + CELL_PAD_X;
        let metrics = get_metrics(PdfFont::Helvetica);
        let mut note_lines = 0;
        for op in &layout.pages[0].ops {
            if let DrawOp::Text { x, text, size, .. } = op {
                if (*x - note_x).abs() < 1e-3 {
                    note_lines += 1;
                    assert!(metrics.width_pt(text, *size) <= COLUMN_WIDTHS[2] - 2.0 * CELL_PAD_X + 1e-3);
                }
            }
        }
        assert!(note_lines > 3);
    }

    #[test]
    fn test_oversized_note_is_split_across_pages() {
        let mut rows = sample_rows();
        rows[1].note = "Disagreement is settled offline and resurfaces during delivery. ".repeat(60);
        let mut flow = Flow::new();
        layout_table(&mut flow, &rows);

        assert!(flow.pages.len() >= 2);
        for page in &flow.pages {
            assert_eq!(page.texts().filter(|t| *t == "What this means").count(), 1);
            for op in &page.ops {
                match op {
                    DrawOp::Text { y, .. } => assert!(*y >= MARGIN_BOTTOM - 1e-3),
                    DrawOp::FillRect { y, .. } | DrawOp::StrokeRect { y, .. } => {
                        assert!(*y >= MARGIN_BOTTOM - 1e-3)
                    }
                    DrawOp::Chart { .. } => {}
                }
            }
        }
        let last: Vec<&str> = flow.pages.last().unwrap().texts().collect();
        assert!(last.contains(&"Psychological Safety"));
    }

    #[test]
    fn test_status_cells_are_tinted_by_tier() {
        let rows = sample_rows();
        let mut flow = Flow::new();
        layout_table(&mut flow, &rows);

        let status_x = MARGIN_LEFT + COLUMN_WIDTHS[0];
        let fills: Vec<Rgb> = flow.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { x, color, .. } if (*x - status_x).abs() < 1e-3 => Some(*color),
                _ => None,
            })
            .collect();
        // Header, At risk, Fragile, Fragile. Strength and No data stay unfilled.
        assert_eq!(fills, vec![LIGHT_BG, RISK_BG, FRAGILE_BG, FRAGILE_BG]);

        let status_color = |label: &str| {
            flow.pages[0].ops.iter().find_map(|op| match op {
                DrawOp::Text { text, color, .. } if text == label => Some(*color),
                _ => None,
            })
        };
        assert_eq!(status_color("At risk"), Some(RISK_TEXT));
        assert_eq!(status_color("Fragile"), Some(FRAGILE_TEXT));
        assert_eq!(status_color("Strength"), Some(CELL.color));
        assert_eq!(status_color(NO_DATA), Some(CELL.color));
    }

    #[test]
    fn test_table_header_repeats_after_page_break() {
        let rows = sample_rows();
        let mut flow = Flow::new();
        // Room for the header and the first row only.
        flow.y = MARGIN_BOTTOM + 80.0;
        layout_table(&mut flow, &rows);

        assert_eq!(flow.pages.len(), 2);
        for page in &flow.pages {
            assert_eq!(page.texts().filter(|t| *t == "What this means").count(), 1);
        }
        let first: Vec<&str> = flow.pages[0].texts().collect();
        assert!(first.contains(&"Trust"));
        assert!(!first.contains(&"Empathy"));
        let second: Vec<&str> = flow.pages[1].texts().collect();
        for dim in &Dimension::ALL[1..] {
            assert!(second.contains(&dim.label()));
        }
    }
}
