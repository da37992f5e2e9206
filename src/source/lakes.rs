use anyhow::{Context, Result};
use log::{debug, info};
use polars::frame::DataFrame;

use crate::{common, config::ColumnSettings, source::{LakeRecord, Location}};

/// Convert a lake DataFrame into records. Rows without geometry are kept
/// (their area becomes missing downstream); rows without an id get their
/// row number.
fn records_from_dataframe(df: &DataFrame, columns: &ColumnSettings) -> Result<Vec<LakeRecord>> {
    let ids = common::string_column(df, &columns.lake_id)?;
    let geometries = common::string_column(df, &columns.lake_geometry)?;
    let counties = common::string_column(df, &columns.lake_county)?;

    Ok(ids.into_iter()
        .zip(geometries)
        .zip(counties)
        .enumerate()
        .map(|(row, ((id, geometry), county))| {
            if geometry.is_none() { debug!("[source::lakes] row {row} has no geometry") }
            LakeRecord {
                id: id.unwrap_or_else(|| format!("row{row}")),
                geometry: geometry.unwrap_or_default(),
                county,
            }
        })
        .collect())
}

/// Load lake rows (id, WKT geometry, county) from a URL or a local CSV.
pub fn load_lakes(location: &Location, columns: &ColumnSettings) -> Result<Vec<LakeRecord>> {
    info!("[source::lakes] reading {location}");
    let df = common::read_csv_strings(location.read()?)
        .with_context(|| format!("[source::lakes] failed to parse lake table from {location}"))?;
    let records = records_from_dataframe(&df, columns)
        .with_context(|| format!("[source::lakes] bad lake table from {location}"))?;
    info!("[source::lakes] {} lake records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_wkt_and_blank_counties() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("lakes.csv");
        std::fs::write(&path, concat!(
            "OBJECTID,NAME,the_geom,COUNTY\n",
            "1,Clear Lake,\"POLYGON ((0 0, 1 0, 1 1, 0 0))\",CERRO GORDO\n",
            "2,Mystery Pond,\"POLYGON ((2 2, 3 2, 3 3, 2 2))\",\n",
        )).unwrap();

        let lakes = load_lakes(&Location::Path(path), &ColumnSettings::default()).unwrap();
        assert_eq!(lakes.len(), 2);
        assert_eq!(lakes[0].id, "1");
        assert_eq!(lakes[0].geometry, "POLYGON ((0 0, 1 0, 1 1, 0 0))");
        assert_eq!(lakes[0].county.as_deref(), Some("CERRO GORDO"));
        assert_eq!(lakes[1].county, None);
    }

    #[test]
    fn missing_geometry_column_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("lakes.csv");
        std::fs::write(&path, "OBJECTID,COUNTY\n1,Story\n").unwrap();
        assert!(load_lakes(&Location::Path(path), &ColumnSettings::default()).is_err());
    }
}
