//! Choropleth plotting CLI.
//!
//! `render` draws a choropleth PNG from a GeoJSON feature collection;
//! `fetch` pulls a listings snapshot into the local cache.

mod ingest;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use classify::Scheme;
use datasets::ListingsClient;
use renderer::{ChoroplethOptions, Orientation};

#[derive(Parser, Debug)]
#[command(name = "choroplot")]
#[command(about = "Choropleth rendering for areal feature tables")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a choropleth PNG from a GeoJSON feature collection
    Render {
        /// Input GeoJSON file
        input: PathBuf,

        /// Attribute column to color by
        #[arg(short, long)]
        column: String,

        /// Classification scheme
        #[arg(long, default_value = "fisher_jenks")]
        scheme: String,

        /// Number of classes
        #[arg(short = 'k', long, default_value = "5")]
        classes: usize,

        /// Palette name
        #[arg(long, default_value = "viridis")]
        palette: String,

        /// Patch transparency
        #[arg(long, default_value = "0.75")]
        alpha: f64,

        /// Explicit bin edges for scheme user_defined (comma separated)
        #[arg(long, value_delimiter = ',')]
        bins: Option<Vec<f64>>,

        /// Legend orientation: vertical or horizontal
        #[arg(long, default_value = "vertical")]
        orientation: String,

        /// Legend label override
        #[arg(long)]
        label: Option<String>,

        /// Map axis width in pixels
        #[arg(long, default_value = "960")]
        width: u32,

        /// Output PNG path
        #[arg(short, long, default_value = "choropleth.png")]
        output: PathBuf,
    },

    /// Fetch a listings snapshot into the local cache
    Fetch {
        /// Snapshot date (YYYY-MM-DD)
        date: NaiveDate,

        /// Cache directory
        #[arg(long, env = "CHOROPLOT_CACHE_DIR", default_value = "data/raw/listings")]
        cache_dir: PathBuf,

        /// Listings host override
        #[arg(long, env = "CHOROPLOT_BASE_URL")]
        base_url: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level: Level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    match args.command {
        Command::Render {
            input,
            column,
            scheme,
            classes,
            palette,
            alpha,
            bins,
            orientation,
            label,
            width,
            output,
        } => run_render(RenderArgs {
            input,
            column,
            scheme,
            classes,
            palette,
            alpha,
            bins,
            orientation,
            label,
            width,
            output,
        }),
        Command::Fetch {
            date,
            cache_dir,
            base_url,
        } => run_fetch(date, cache_dir, base_url),
    }
}

struct RenderArgs {
    input: PathBuf,
    column: String,
    scheme: String,
    classes: usize,
    palette: String,
    alpha: f64,
    bins: Option<Vec<f64>>,
    orientation: String,
    label: Option<String>,
    width: u32,
    output: PathBuf,
}

fn run_render(args: RenderArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let geojson = text
        .parse::<geojson::GeoJson>()
        .context("input is not valid GeoJSON")?;
    let table = ingest::feature_table(&geojson)?;
    info!(rows = table.len(), column = %args.column, "loaded feature table");

    let scheme: Scheme = args.scheme.parse()?;
    let orientation = match args.orientation.as_str() {
        "vertical" => Orientation::Vertical,
        "horizontal" => Orientation::Horizontal,
        other => bail!("unknown orientation '{other}', expected vertical or horizontal"),
    };

    let mut opts = ChoroplethOptions {
        scheme,
        n_colors: args.classes,
        palette: args.palette,
        alpha: args.alpha,
        user_bins: args.bins,
        orientation,
        figure_width: args.width,
        ..Default::default()
    };
    opts.colorbar.label = args.label;

    let plot = renderer::render(&table, &args.column, &opts)?;
    plot.write_png(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        path = %args.output.display(),
        patches = plot.patch_count(),
        classes = plot.bin_edges().len().saturating_sub(1),
        "wrote choropleth"
    );
    Ok(())
}

fn run_fetch(date: NaiveDate, cache_dir: PathBuf, base_url: Option<String>) -> Result<()> {
    let mut client = ListingsClient::new(&cache_dir)?;
    if let Some(base) = base_url {
        client = client.with_base_url(base);
    }

    let table = client.fetch(date)?;
    info!(
        rows = table.len(),
        cache = %client.cache_path(date).display(),
        "listings snapshot ready"
    );
    Ok(())
}
