//! Choropleth rendering for areal feature tables.
//!
//! The pipeline: flatten features into per-polygon boundaries, bin the
//! value column into edges, build a discrete color scale, rasterize the
//! patches and attach a colorbar legend.

pub mod canvas;
pub mod choropleth;
pub mod colorbar;
pub mod flatten;
pub mod palette;
pub mod png;
pub mod scale;

pub use canvas::Canvas;
pub use choropleth::{render, Choropleth, ChoroplethOptions, RenderError};
pub use colorbar::{attach_colorbar, split_axis, Colorbar, ColorbarOptions, Orientation, Rect};
pub use flatten::flatten;
pub use palette::{palette, PaletteError};
pub use scale::{BinnedColorScale, ScaleError};
