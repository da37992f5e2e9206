use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::{common, source::{BoundaryLayer, CountyBoundary, Crs}};

/// Return (two-digit FIPS code string, UPPER_SNAKE name) for a USPS postal code.
/// Includes 50 states + DC + PR.
pub(crate) fn state_info(code: &str) -> Option<(&'static str, &'static str)> {
    match code {
        "AL" => Some(("01", "ALABAMA")),
        "AK" => Some(("02", "ALASKA")),
        "AZ" => Some(("04", "ARIZONA")),
        "AR" => Some(("05", "ARKANSAS")),
        "CA" => Some(("06", "CALIFORNIA")),
        "CO" => Some(("08", "COLORADO")),
        "CT" => Some(("09", "CONNECTICUT")),
        "DE" => Some(("10", "DELAWARE")),
        "FL" => Some(("12", "FLORIDA")),
        "GA" => Some(("13", "GEORGIA")),
        "HI" => Some(("15", "HAWAII")),
        "ID" => Some(("16", "IDAHO")),
        "IL" => Some(("17", "ILLINOIS")),
        "IN" => Some(("18", "INDIANA")),
        "IA" => Some(("19", "IOWA")),
        "KS" => Some(("20", "KANSAS")),
        "KY" => Some(("21", "KENTUCKY")),
        "LA" => Some(("22", "LOUISIANA")),
        "ME" => Some(("23", "MAINE")),
        "MD" => Some(("24", "MARYLAND")),
        "MA" => Some(("25", "MASSACHUSETTS")),
        "MI" => Some(("26", "MICHIGAN")),
        "MN" => Some(("27", "MINNESOTA")),
        "MS" => Some(("28", "MISSISSIPPI")),
        "MO" => Some(("29", "MISSOURI")),
        "MT" => Some(("30", "MONTANA")),
        "NE" => Some(("31", "NEBRASKA")),
        "NV" => Some(("32", "NEVADA")),
        "NH" => Some(("33", "NEW_HAMPSHIRE")),
        "NJ" => Some(("34", "NEW_JERSEY")),
        "NM" => Some(("35", "NEW_MEXICO")),
        "NY" => Some(("36", "NEW_YORK")),
        "NC" => Some(("37", "NORTH_CAROLINA")),
        "ND" => Some(("38", "NORTH_DAKOTA")),
        "OH" => Some(("39", "OHIO")),
        "OK" => Some(("40", "OKLAHOMA")),
        "OR" => Some(("41", "OREGON")),
        "PA" => Some(("42", "PENNSYLVANIA")),
        "RI" => Some(("44", "RHODE_ISLAND")),
        "SC" => Some(("45", "SOUTH_CAROLINA")),
        "SD" => Some(("46", "SOUTH_DAKOTA")),
        "TN" => Some(("47", "TENNESSEE")),
        "TX" => Some(("48", "TEXAS")),
        "UT" => Some(("49", "UTAH")),
        "VT" => Some(("50", "VERMONT")),
        "VA" => Some(("51", "VIRGINIA")),
        "WA" => Some(("53", "WASHINGTON")),
        "WV" => Some(("54", "WEST_VIRGINIA")),
        "WI" => Some(("55", "WISCONSIN")),
        "WY" => Some(("56", "WYOMING")),
        "DC" => Some(("11", "DISTRICT_OF_COLUMBIA")),
        "PR" => Some(("72", "PUERTO_RICO")),
        _ => None,
    }
}

/// Census TIGER 2020 PL county layer: (zip URL, base file name) for a postal code.
/// Example: "IA" -> ".../TIGER2020PL/STATE/19_IOWA/19/tl_2020_19_county20.zip"
pub(crate) fn tiger_county_url(state: &str) -> Result<(String, String)> {
    let code = state.to_ascii_uppercase();
    let (fips, name) = state_info(&code)
        .with_context(|| format!("Unknown state/territory postal code: {code}"))?;

    let base = format!("https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/{fips}_{name}/{fips}/");
    let file = format!("tl_2020_{fips}_county20");
    Ok((format!("{base}{file}.zip"), file))
}

/// Download and extract the TIGER county shapefile for `state` into `cache_dir`,
/// returning the path of the `.shp`. Already extracted layers are reused.
#[cfg(feature = "download")]
pub fn download_tiger_counties(state: &str, cache_dir: &Path) -> Result<PathBuf> {
    let (file_url, file) = tiger_county_url(state)?;
    let out_dir = cache_dir.join(&file);
    let shp_path = out_dir.join(format!("{file}.shp"));

    if shp_path.exists() {
        info!("[source::tiger] using cached {}", shp_path.display());
        return Ok(shp_path);
    }

    common::ensure_dir_exists(cache_dir)?;
    let zip_path = cache_dir.join(format!("{file}.zip"));

    info!("[source::tiger] download {file_url} -> {}", zip_path.display());
    common::download_big_file(&file_url, &zip_path, true)?;

    info!("[source::tiger] extract {} -> {}", zip_path.display(), out_dir.display());
    common::extract_zip(&zip_path, &out_dir, true)?;

    common::require_file_exists(&shp_path)
        .with_context(|| format!("archive {file_url} did not contain {file}.shp"))?;
    Ok(shp_path)
}

/// Resolve the TIGER county shapefile without network access; it must already be cached.
#[cfg(not(feature = "download"))]
pub(crate) fn cached_tiger_counties(state: &str, cache_dir: &Path) -> Result<PathBuf> {
    let (_, file) = tiger_county_url(state)?;
    let shp_path = cache_dir.join(&file).join(format!("{file}.shp"));
    common::require_file_exists(&shp_path)
        .context("TIGER county layer is not cached and the `download` feature is disabled")?;
    Ok(shp_path)
}

/// Read (name, polygon) pairs from a county shapefile.
pub(crate) fn read_county_shapefile(path: &Path, name_field: &str) -> Result<BoundaryLayer> {
    let (shapes, records) = common::read_from_shapefile(path)?;

    let counties = shapes.into_iter()
        .zip(records.iter())
        .map(|(shape, record)| Ok(CountyBoundary {
            name: common::get_character_field(record, name_field)?,
            geometry: common::shape_to_multipolygon(shape)?,
        }))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Error reading counties from shapefile: {}", path.display()))?;

    let crs = match common::prj_from_shapefile(path) {
        Some(common::PrjKind::Geographic { epsg }) => Crs::Geographic { epsg },
        Some(common::PrjKind::Projected) => Crs::Projected,
        None => Crs::Geographic { epsg: 4269 },
    };

    info!("[source::tiger] read {} counties from {} ({crs:?})", counties.len(), path.display());
    Ok(BoundaryLayer { counties, crs })
}
