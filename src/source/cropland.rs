use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{common, config::ColumnSettings, source::CroplandRecord};

/// Load (county, value) rows from a local cropland CSV. Values stay raw strings.
pub fn load_cropland(path: &Path, columns: &ColumnSettings) -> Result<Vec<CroplandRecord>> {
    info!("[source::cropland] reading {}", path.display());
    let df = common::read_csv_file(path)?;

    let counties = common::string_column(&df, &columns.crop_county)
        .with_context(|| format!("[source::cropland] bad cropland table {}", path.display()))?;
    let values = common::string_column(&df, &columns.crop_value)
        .with_context(|| format!("[source::cropland] bad cropland table {}", path.display()))?;

    let records = counties.into_iter()
        .zip(values)
        .enumerate()
        .filter_map(|(row, (county, value))| match county {
            Some(county) => Some(CroplandRecord { county, value }),
            None => { debug!("[source::cropland] row {row} has no county, skipped"); None }
        })
        .collect::<Vec<_>>();

    info!("[source::cropland] {} cropland records", records.len());
    Ok(records)
}
