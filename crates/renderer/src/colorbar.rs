//! Colorbar rendering: carves a legend axis next to the map axis.

use choro_common::Rgba;
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, CHAR_H};
use crate::scale::BinnedColorScale;

/// Legend orientation: vertical bars sit to the right of the map axis,
/// horizontal bars below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Pixel-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Options for the carved colorbar axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorbarOptions {
    /// Bar thickness as a percentage of the map axis dimension it splits.
    #[serde(default = "default_size_percent")]
    pub size_percent: f64,

    /// Gap between the map axis and the bar, as a fraction of the same
    /// dimension.
    #[serde(default = "default_pad")]
    pub pad: f64,

    /// Legend label. The render orchestrator falls back to the value
    /// column name when unset.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_size_percent() -> f64 {
    3.0
}

fn default_pad() -> f64 {
    0.05
}

impl Default for ColorbarOptions {
    fn default() -> Self {
        Self {
            size_percent: default_size_percent(),
            pad: default_pad(),
            label: None,
        }
    }
}

/// Handle for an attached colorbar.
#[derive(Debug, Clone)]
pub struct Colorbar {
    pub rect: Rect,
    pub orientation: Orientation,
    /// Tick positions in value space: the scale's bin edges.
    pub ticks: Vec<f64>,
    pub label: Option<String>,
}

/// Geometry of the carved axis: adjacent to `ax` on the right (vertical)
/// or below (horizontal), `size_percent` of the matching dimension thick,
/// separated by `pad` of that dimension.
pub fn split_axis(ax: Rect, orientation: Orientation, size_percent: f64, pad: f64) -> Rect {
    match orientation {
        Orientation::Vertical => {
            let width = (ax.width as f64 * size_percent / 100.0).round().max(1.0) as u32;
            let gap = (ax.width as f64 * pad).round() as u32;
            Rect::new(ax.right() + gap, ax.y, width, ax.height)
        }
        Orientation::Horizontal => {
            let height = (ax.height as f64 * size_percent / 100.0).round().max(1.0) as u32;
            let gap = (ax.height as f64 * pad).round() as u32;
            Rect::new(ax.x, ax.bottom() + gap, ax.width, height)
        }
    }
}

/// Carve an axis adjacent to `ax` and render the scale's legend into it.
///
/// Interval swatches are spaced proportionally to the edge values, ticks
/// sit at every edge, and the label becomes the bar title. The map axis
/// itself is untouched.
pub fn attach_colorbar(
    canvas: &mut Canvas,
    ax: Rect,
    scale: &BinnedColorScale,
    orientation: Orientation,
    opts: &ColorbarOptions,
) -> Colorbar {
    let rect = split_axis(ax, orientation, opts.size_percent, opts.pad);
    let edges = scale.legend_ticks();
    let span = edges[edges.len() - 1] - edges[0];
    let frac = |v: f64| (v - edges[0]) / span;

    for (i, color) in scale.colors().iter().enumerate() {
        let f0 = frac(edges[i]);
        let f1 = frac(edges[i + 1]);
        match orientation {
            Orientation::Vertical => {
                // values grow upward
                let y1 = rect.bottom() as f64 - f0 * rect.height as f64;
                let y0 = rect.bottom() as f64 - f1 * rect.height as f64;
                canvas.fill_rect(
                    rect.x as i64,
                    y0.round() as i64,
                    rect.width,
                    (y1 - y0).round().max(1.0) as u32,
                    *color,
                );
            }
            Orientation::Horizontal => {
                let x0 = rect.x as f64 + f0 * rect.width as f64;
                let x1 = rect.x as f64 + f1 * rect.width as f64;
                canvas.fill_rect(
                    x0.round() as i64,
                    rect.y as i64,
                    (x1 - x0).round().max(1.0) as u32,
                    rect.height,
                    *color,
                );
            }
        }
    }

    draw_frame(canvas, rect);
    draw_ticks(canvas, rect, orientation, edges, &frac);

    if let Some(label) = opts.label.as_deref() {
        draw_label(canvas, rect, orientation, label);
    }

    Colorbar {
        rect,
        orientation,
        ticks: edges.to_vec(),
        label: opts.label.clone(),
    }
}

fn draw_frame(canvas: &mut Canvas, rect: Rect) {
    canvas.draw_hline(rect.x as i64 - 1, rect.y as i64 - 1, rect.width + 2, Rgba::BLACK);
    canvas.draw_hline(rect.x as i64 - 1, rect.bottom() as i64, rect.width + 2, Rgba::BLACK);
    canvas.draw_vline(rect.x as i64 - 1, rect.y as i64 - 1, rect.height + 2, Rgba::BLACK);
    canvas.draw_vline(rect.right() as i64, rect.y as i64 - 1, rect.height + 2, Rgba::BLACK);
}

fn draw_ticks(
    canvas: &mut Canvas,
    rect: Rect,
    orientation: Orientation,
    edges: &[f64],
    frac: &dyn Fn(f64) -> f64,
) {
    const TICK: i64 = 4;
    for &edge in edges {
        let f = frac(edge);
        let text = format_tick(edge);
        match orientation {
            Orientation::Vertical => {
                let y = (rect.bottom() as f64 - f * rect.height as f64).round() as i64;
                canvas.draw_hline(rect.right() as i64 + 1, y, TICK as u32, Rgba::BLACK);
                canvas.draw_text(
                    rect.right() as i64 + TICK + 3,
                    y - (CHAR_H as i64 - 2) / 2,
                    &text,
                    Rgba::BLACK,
                );
            }
            Orientation::Horizontal => {
                let x = (rect.x as f64 + f * rect.width as f64).round() as i64;
                canvas.draw_vline(x, rect.bottom() as i64 + 1, TICK as u32, Rgba::BLACK);
                let text_w = Canvas::text_width(&text) as i64;
                canvas.draw_text(
                    x - text_w / 2,
                    rect.bottom() as i64 + TICK + 3,
                    &text,
                    Rgba::BLACK,
                );
            }
        }
    }
}

fn draw_label(canvas: &mut Canvas, rect: Rect, orientation: Orientation, label: &str) {
    let text_w = Canvas::text_width(label) as i64;
    match orientation {
        Orientation::Vertical => {
            // centered beneath the bar
            let x = rect.x as i64 + rect.width as i64 / 2 - text_w / 2;
            canvas.draw_text(x, rect.bottom() as i64 + 8, label, Rgba::BLACK);
        }
        Orientation::Horizontal => {
            // beneath the tick labels
            let x = rect.x as i64 + rect.width as i64 / 2 - text_w / 2;
            let y = rect.bottom() as i64 + 8 + CHAR_H as i64;
            canvas.draw_text(x, y, label, Rgba::BLACK);
        }
    }
}

/// Compact numeric label for a tick: whole numbers drop the fraction,
/// everything else keeps two decimals with trailing zeros trimmed.
pub fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 && value.abs() < 1e12 {
        return format!("{value:.0}");
    }
    let text = format!("{value:.2}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_axis_vertical() {
        let ax = Rect::new(10, 10, 200, 100);
        let cax = split_axis(ax, Orientation::Vertical, 3.0, 0.05);
        assert_eq!(cax.x, 10 + 200 + 10);
        assert_eq!(cax.y, 10);
        assert_eq!(cax.width, 6);
        assert_eq!(cax.height, 100);
    }

    #[test]
    fn test_split_axis_horizontal() {
        let ax = Rect::new(0, 0, 200, 100);
        let cax = split_axis(ax, Orientation::Horizontal, 4.0, 0.1);
        assert_eq!(cax.x, 0);
        assert_eq!(cax.y, 100 + 10);
        assert_eq!(cax.width, 200);
        assert_eq!(cax.height, 4);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(25.0), "25");
        assert_eq!(format_tick(12.5), "12.5");
        assert_eq!(format_tick(0.125), "0.13");
        assert_eq!(format_tick(-3.0), "-3");
    }

    #[test]
    fn test_orientation_serde_names() {
        let v: Orientation = serde_json::from_str("\"vertical\"").unwrap();
        assert_eq!(v, Orientation::Vertical);
        let h: Orientation = serde_json::from_str("\"horizontal\"").unwrap();
        assert_eq!(h, Orientation::Horizontal);
    }
}
