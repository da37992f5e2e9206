//! Loader: reads the three raw inputs into in-memory tables.
//! Any failure here is fatal for the run.

mod cropland;
mod lakes;
mod tiger;

use std::path::PathBuf;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use log::info;

use crate::config::PipelineConfig;

pub use cropland::load_cropland;
pub use lakes::load_lakes;
pub(crate) use tiger::state_info;
#[cfg(feature = "download")]
pub use tiger::download_tiger_counties;

/// Coordinate reference system of the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// Lon/lat degrees with the given EPSG code.
    Geographic { epsg: u32 },
    /// Projected coordinates in metres.
    Projected,
}

impl Crs {
    /// EPSG code for geographic data, `None` for projected data.
    #[inline]
    pub fn geographic_epsg(&self) -> Option<u32> {
        match self {
            Self::Geographic { epsg } => Some(*epsg),
            Self::Projected => None,
        }
    }
}

/// A named county polygon as delivered by the boundary source.
#[derive(Debug, Clone)]
pub struct CountyBoundary {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    pub counties: Vec<CountyBoundary>,
    pub crs: Crs,
}

/// A raw lake row: geometry is still WKT text and the county is unnormalized.
#[derive(Debug, Clone, PartialEq)]
pub struct LakeRecord {
    pub id: String,
    pub geometry: String,
    pub county: Option<String>,
}

/// A raw cropland row; `value` is the unparsed acreage string, e.g. "123,456".
#[derive(Debug, Clone, PartialEq)]
pub struct CroplandRecord {
    pub county: String,
    pub value: Option<String>,
}

/// Where to read a remote-or-local table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    Path(PathBuf),
}

impl Location {
    /// `http://` and `https://` strings are URLs, everything else is a path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::Path(PathBuf::from(raw))
        }
    }

    /// Read the whole resource into memory.
    pub(crate) fn read(&self) -> Result<Vec<u8>> {
        match self {
            #[cfg(feature = "download")]
            Self::Url(url) => crate::common::fetch_bytes(url),
            #[cfg(not(feature = "download"))]
            Self::Url(url) => anyhow::bail!("cannot fetch {url}: the `download` feature is disabled"),
            Self::Path(path) => std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where county boundaries come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    /// Census TIGER county layer for a state, cached under `cache_dir`.
    Tiger { state: String, cache_dir: PathBuf },
    /// A local county shapefile.
    Shapefile(PathBuf),
}

/// Load county boundaries as (name, polygon) pairs plus their CRS.
pub fn load_boundaries(source: &BoundarySource, name_field: &str) -> Result<BoundaryLayer> {
    let path = match source {
        #[cfg(feature = "download")]
        BoundarySource::Tiger { state, cache_dir } => tiger::download_tiger_counties(state, cache_dir)?,
        #[cfg(not(feature = "download"))]
        BoundarySource::Tiger { state, cache_dir } => tiger::cached_tiger_counties(state, cache_dir)?,
        BoundarySource::Shapefile(path) => {
            crate::common::require_file_exists(path)?;
            path.clone()
        }
    };
    tiger::read_county_shapefile(&path, name_field)
        .context("[source] failed to load county boundaries")
}

/// The Loader's output: three raw tables, passed explicitly to later stages.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub boundaries: BoundaryLayer,
    pub lakes: Vec<LakeRecord>,
    pub cropland: Vec<CroplandRecord>,
}

/// Load all three sources described by `config`.
pub fn load_all(config: &PipelineConfig) -> Result<RawTables> {
    let boundaries = load_boundaries(&config.boundary_source(), &config.columns.boundary_name)?;
    let lakes = load_lakes(&config.lakes_location()?, &config.columns)?;
    let cropland = load_cropland(config.cropland_path()?, &config.columns)?;

    info!(
        "[source] loaded {} counties, {} lakes, {} cropland rows",
        boundaries.counties.len(), lakes.len(), cropland.len(),
    );
    Ok(RawTables { boundaries, lakes, cropland })
}
