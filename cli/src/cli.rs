use std::path::PathBuf;

/// County lake/cropland correlation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "lakecrop", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Download and cache TIGER county boundaries for a state
    Download(DownloadArgs),

    /// Compute per-county lake and cropland proportions and correlate them
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Two-letter code, e.g. IA, MN, WI
    pub state: String,

    /// Cache directory, defaults to "data"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// TOML pipeline configuration; flags below override it
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Two-letter state code used for TIGER boundaries
    #[arg(long)]
    pub state: Option<String>,

    /// Lake table: CSV file path or http(s) URL
    #[arg(long)]
    pub lakes: Option<String>,

    /// Cropland CSV file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub cropland: Option<PathBuf>,

    /// County boundary shapefile (.shp); skips the TIGER download
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub boundaries: Option<PathBuf>,

    /// Cache directory for downloaded boundaries
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    /// County area method: auto, geodesic, planar or utm
    #[arg(long)]
    pub area_method: Option<String>,

    /// Output directory for county_metrics.csv and summary.json
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out: Option<PathBuf>,
}
