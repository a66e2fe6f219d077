//! Radar chart geometry and raster rendering.
//!
//! Geometry lives in a unit frame: the chart centre is the origin, radius 1.0
//! is the outer ring (score 5), y points up. The raster maps that frame onto
//! `PLOT_RADIUS_FRACTION` of the image half-width; the composer uses the same
//! mapping to place the vector axis labels.

use std::f64::consts::TAU;

use plotters::prelude::*;
use serde::Serialize;

use crate::chart::ChartError;
use crate::models::Dimension;

pub const SCALE_MAX: f64 = 5.0;
pub const RASTER_SIZE: u32 = 800;
/// Outer ring radius as a fraction of half the image size.
pub const PLOT_RADIUS_FRACTION: f64 = 0.82;
/// Label anchors sit just outside the outer ring.
const LABEL_RADIUS: f64 = 1.08;

const GRID: RGBColor = RGBColor(0xD1, 0xD5, 0xDB);
const SPOKE: RGBColor = RGBColor(0xE5, 0xE7, 0xEB);
const SERIES: RGBColor = RGBColor(0x1F, 0x77, 0xB4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    /// Text sits above the anchor.
    Bottom,
    Middle,
    /// Text hangs below the anchor.
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub dimension: Dimension,
    pub label: String,
    /// Radians, counter-clockwise from east.
    pub angle: f64,
    pub value: f64,
    pub label_anchor: (f64, f64),
    pub h_align: HAlign,
    pub v_align: VAlign,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarGeometry {
    pub axes: Vec<RadarAxis>,
    /// Closed value polygon: N + 1 vertices, the last repeating the first.
    pub polygon: Vec<(f64, f64)>,
}

impl RadarGeometry {
    /// Evenly spaced axes in input order, first at 0 rad.
    pub fn new(scores: &[(Dimension, f64)]) -> Result<Self, ChartError> {
        if scores.is_empty() {
            return Err(ChartError::NoData);
        }
        let n = scores.len();
        let axes: Vec<RadarAxis> = scores
            .iter()
            .enumerate()
            .map(|(i, (dimension, value))| {
                let angle = TAU * i as f64 / n as f64;
                let (sin, cos) = angle.sin_cos();
                RadarAxis {
                    dimension: *dimension,
                    label: dimension.label().to_string(),
                    angle,
                    value: *value,
                    label_anchor: (LABEL_RADIUS * cos, LABEL_RADIUS * sin),
                    h_align: h_align(cos),
                    v_align: v_align(sin),
                }
            })
            .collect();

        let mut polygon: Vec<(f64, f64)> = axes
            .iter()
            .map(|axis| {
                let r = axis.value.clamp(0.0, SCALE_MAX) / SCALE_MAX;
                (r * axis.angle.cos(), r * axis.angle.sin())
            })
            .collect();
        polygon.push(polygon[0]);

        Ok(RadarGeometry { axes, polygon })
    }

    #[cfg(test)]
    pub fn labels(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.label.as_str()).collect()
    }
}

fn h_align(cos: f64) -> HAlign {
    if cos > 0.1 {
        HAlign::Left
    } else if cos < -0.1 {
        HAlign::Right
    } else {
        HAlign::Center
    }
}

fn v_align(sin: f64) -> VAlign {
    if sin > 0.1 {
        VAlign::Bottom
    } else if sin < -0.1 {
        VAlign::Top
    } else {
        VAlign::Middle
    }
}

/// 8-bit RGB pixels, row-major, top-left origin.
#[derive(Debug, Clone)]
pub struct RgbRaster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RadarChart {
    pub geometry: RadarGeometry,
    pub raster: RgbRaster,
}

/// Maps a unit-frame point to pixel coordinates.
fn to_pixel((x, y): (f64, f64), size: u32) -> (i32, i32) {
    let half = size as f64 / 2.0;
    let radius = half * PLOT_RADIUS_FRACTION;
    (
        (half + x * radius).round() as i32,
        (half - y * radius).round() as i32,
    )
}

/// Draws rings, spokes and the value polygon. Labels are left to the composer.
pub fn render_radar(scores: &[(Dimension, f64)]) -> Result<RadarChart, ChartError> {
    let geometry = RadarGeometry::new(scores)?;
    let size = RASTER_SIZE;
    let mut pixels = vec![255u8; (size * size * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixels, (size, size)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let centre = to_pixel((0.0, 0.0), size);
        let ring_step = (size as f64 / 2.0 * PLOT_RADIUS_FRACTION) / SCALE_MAX;
        for ring in 1..=SCALE_MAX as i32 {
            let radius = (ring_step * ring as f64).round() as i32;
            root.draw(&Circle::new(centre, radius, GRID.stroke_width(2)))
                .map_err(render_err)?;
        }

        for axis in &geometry.axes {
            let tip = to_pixel((axis.angle.cos(), axis.angle.sin()), size);
            root.draw(&PathElement::new(vec![centre, tip], SPOKE.stroke_width(2)))
                .map_err(render_err)?;
        }

        let outline: Vec<(i32, i32)> = geometry.polygon.iter().map(|p| to_pixel(*p, size)).collect();
        if geometry.axes.len() >= 3 {
            root.draw(&Polygon::new(outline.clone(), SERIES.mix(0.25).filled()))
                .map_err(render_err)?;
        }
        root.draw(&PathElement::new(outline, SERIES.stroke_width(4)))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    Ok(RadarChart {
        geometry,
        raster: RgbRaster {
            width: size,
            height: size,
            pixels,
        },
    })
}

fn render_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Render(e.to_string())
}
