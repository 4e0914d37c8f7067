//! The choropleth pipeline: orchestrates flattening, binning, color
//! mapping, patch rasterization and the legend.

use std::path::Path;

use choro_common::{BoundingBox, FeatureTable, Rgba};
use classify::{Binner, ClassifyError, Scheme};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::Canvas;
use crate::colorbar::{attach_colorbar, Colorbar, ColorbarOptions, Orientation, Rect};
use crate::flatten::flatten;
use crate::palette::{palette, PaletteError};
use crate::png::PngError;
use crate::scale::{BinnedColorScale, ScaleError};

/// Margin around the map axis, in pixels.
const MARGIN: u32 = 16;

/// Room reserved beyond the colorbar for tick labels and the title.
const LABEL_GUTTER: u32 = 72;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("feature table has no geometry to draw")]
    EmptyTable,

    #[error("column '{0}' not found in feature table")]
    ColumnNotFound(String),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Palette(#[from] PaletteError),

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Options for [`render`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoroplethOptions {
    /// Classification scheme for the value column.
    #[serde(default = "default_scheme")]
    pub scheme: Scheme,

    /// Number of classes, which is also the palette sample count.
    #[serde(default = "default_n_colors")]
    pub n_colors: usize,

    /// Palette name.
    #[serde(default = "default_palette")]
    pub palette: String,

    /// Patch transparency in 0..=1.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Explicit bin edges for [`Scheme::UserDefined`].
    #[serde(default)]
    pub user_bins: Option<Vec<f64>>,

    /// Legend orientation.
    #[serde(default)]
    pub orientation: Orientation,

    /// Raster width of the map axis in pixels; the height follows from
    /// the data bounds so shapes keep their aspect.
    #[serde(default = "default_figure_width")]
    pub figure_width: u32,

    #[serde(default)]
    pub colorbar: ColorbarOptions,
}

fn default_scheme() -> Scheme {
    Scheme::FisherJenks
}

fn default_n_colors() -> usize {
    5
}

fn default_palette() -> String {
    "viridis".to_string()
}

fn default_alpha() -> f64 {
    0.75
}

fn default_figure_width() -> u32 {
    960
}

impl Default for ChoroplethOptions {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            n_colors: default_n_colors(),
            palette: default_palette(),
            alpha: default_alpha(),
            user_bins: None,
            orientation: Orientation::default(),
            figure_width: default_figure_width(),
            colorbar: ColorbarOptions::default(),
        }
    }
}

/// A finished choropleth plot.
///
/// Owns the rendered canvas plus the pieces a caller may want to inspect
/// or build on: the map axis rect, the per-patch values, the bin edges
/// and the attached colorbar.
#[derive(Debug)]
pub struct Choropleth {
    canvas: Canvas,
    ax: Rect,
    patch_values: Vec<f64>,
    bin_edges: Vec<f64>,
    colorbar: Colorbar,
}

impl Choropleth {
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable canvas access for caller-side customization.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// The map axis rect in canvas pixels.
    pub fn axis(&self) -> Rect {
        self.ax
    }

    /// Number of drawn patches (one per flattened simple polygon).
    pub fn patch_count(&self) -> usize {
        self.patch_values.len()
    }

    /// Value carried by each drawn patch, in draw order.
    pub fn patch_values(&self) -> &[f64] {
        &self.patch_values
    }

    pub fn bin_edges(&self) -> &[f64] {
        &self.bin_edges
    }

    pub fn colorbar(&self) -> &Colorbar {
        &self.colorbar
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, PngError> {
        self.canvas.encode_png()
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<(), PngError> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Render a choropleth of `column` over the table's geometries.
///
/// The viewport derives from the combined bounds with the same
/// units-per-pixel on both axes, so shapes are not distorted; no axis
/// frame or gridlines are drawn. Patches are filled from the binned color
/// scale with a one-pixel white outline; rows with non-areal geometry are
/// skipped, rows with a non-finite value draw outline-only. Binning
/// failures abort the whole render.
pub fn render(
    table: &FeatureTable,
    column: &str,
    opts: &ChoroplethOptions,
) -> Result<Choropleth, RenderError> {
    let values = table
        .column(column)
        .ok_or_else(|| RenderError::ColumnNotFound(column.to_string()))?;
    let bounds = table.total_bounds().ok_or(RenderError::EmptyTable)?;

    let (boundaries, patch_values) = flatten(table.geometries(), values);

    let edges = Binner::default().bin_edges(values, opts.scheme, opts.n_colors, opts.user_bins.as_deref())?;
    let colors = palette(&opts.palette, opts.n_colors)?;
    let scale = BinnedColorScale::new(edges, colors, opts.alpha)?;

    let (canvas_w, canvas_h, ax) = figure_layout(&bounds, opts);
    let mut canvas = Canvas::new(canvas_w, canvas_h, Rgba::WHITE);

    let to_pixel = |x: f64, y: f64| {
        let px_per_unit = ax.width as f64 / bounds.width();
        (
            ax.x as f64 + (x - bounds.min_x) * px_per_unit,
            ax.y as f64 + (bounds.max_y - y) * px_per_unit,
        )
    };

    for (ring, &value) in boundaries.iter().zip(&patch_values) {
        let pts: Vec<(f64, f64)> = ring
            .coords()
            .iter()
            .map(|&(x, y)| to_pixel(x, y))
            .collect();
        if value.is_finite() {
            let fill = if scale.is_overflow(value) {
                scale.color_for(value)
            } else {
                scale.color_for(value).with_alpha(opts.alpha)
            };
            canvas.fill_polygon(&pts, fill);
        }
        canvas.stroke_polygon(&pts, Rgba::WHITE);
    }

    let mut cbar_opts = opts.colorbar.clone();
    if cbar_opts.label.is_none() {
        cbar_opts.label = Some(column.to_string());
    }
    let colorbar = attach_colorbar(&mut canvas, ax, &scale, opts.orientation, &cbar_opts);

    debug!(
        patches = patch_values.len(),
        edges = ?scale.edges(),
        width = canvas_w,
        height = canvas_h,
        "rendered choropleth"
    );

    Ok(Choropleth {
        canvas,
        ax,
        patch_values,
        bin_edges: scale.edges().to_vec(),
        colorbar,
    })
}

/// Canvas size and map axis placement: the axis matches the data aspect,
/// margins surround it, and the legend side gains gutter room for the
/// bar, its tick labels and the title.
fn figure_layout(bounds: &BoundingBox, opts: &ChoroplethOptions) -> (u32, u32, Rect) {
    let map_w = opts.figure_width.max(64);
    let px_per_unit = map_w as f64 / bounds.width().max(f64::EPSILON);
    let map_h = (bounds.height() * px_per_unit).round().max(1.0) as u32;

    let ax = Rect::new(MARGIN, MARGIN, map_w, map_h);
    match opts.orientation {
        Orientation::Vertical => {
            let bar = (map_w as f64 * opts.colorbar.size_percent / 100.0).round().max(1.0) as u32;
            let gap = (map_w as f64 * opts.colorbar.pad).round() as u32;
            let w = MARGIN + map_w + gap + bar + LABEL_GUTTER;
            let h = MARGIN + map_h + MARGIN + LABEL_GUTTER / 2;
            (w, h, ax)
        }
        Orientation::Horizontal => {
            let bar = (map_h as f64 * opts.colorbar.size_percent / 100.0).round().max(1.0) as u32;
            let gap = (map_h as f64 * opts.colorbar.pad).round() as u32;
            let w = MARGIN + map_w + MARGIN;
            let h = MARGIN + map_h + gap + bar + LABEL_GUTTER;
            (w, h, ax)
        }
    }
}
