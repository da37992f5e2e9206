use anyhow::Result;
use polars::{frame::DataFrame, prelude::{Column, NamedFrom}};
use serde::Serialize;

use crate::{names::CountyKey, pipeline::correlation::{CorrelationOutcome, pearson}};

/// Per-county output row. `None` means "no data", which is not the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyMetrics {
    pub county: CountyKey,
    pub county_area_acres: Option<f64>,
    pub total_lake_area_acres: Option<f64>,
    pub prop_lake: Option<f64>,
    pub crop_area_acres: Option<f64>,
    pub prop_crop: Option<f64>,
}

/// `numerator / denominator`, or `None` when either side is missing or the
/// denominator is zero or not finite.
#[inline]
pub(crate) fn proportion(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (num, den) = (numerator?, denominator?);
    if den == 0.0 || !den.is_finite() { return None }
    Some(num / den)
}

impl CountyMetrics {
    /// Build a row, deriving both proportions from the areas.
    pub fn new(
        county: CountyKey,
        county_area_acres: Option<f64>,
        total_lake_area_acres: Option<f64>,
        crop_area_acres: Option<f64>,
    ) -> Self {
        Self {
            prop_lake: proportion(total_lake_area_acres, county_area_acres),
            prop_crop: proportion(crop_area_acres, county_area_acres),
            county,
            county_area_acres,
            total_lake_area_acres,
            crop_area_acres,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool { self.prop_lake.is_some() && self.prop_crop.is_some() }
}

/// The pipeline's output table, one row per county key, sorted by county.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountyTable {
    rows: Vec<CountyMetrics>,
}

impl CountyTable {
    pub(crate) fn new(mut rows: Vec<CountyMetrics>) -> Self {
        rows.sort_by(|a, b| a.county.cmp(&b.county));
        Self { rows }
    }

    #[inline] pub fn rows(&self) -> &[CountyMetrics] { &self.rows }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Look up a row by normalized county name.
    pub fn get(&self, county: &str) -> Option<&CountyMetrics> {
        self.rows.binary_search_by(|row| row.county.as_str().cmp(county))
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn prop_lake(&self) -> Vec<Option<f64>> { self.rows.iter().map(|row| row.prop_lake).collect() }

    pub fn prop_crop(&self) -> Vec<Option<f64>> { self.rows.iter().map(|row| row.prop_crop).collect() }

    /// Correlate cropland proportion (x) with lake proportion (y).
    pub fn correlate(&self) -> CorrelationOutcome {
        pearson(&self.prop_crop(), &self.prop_lake())
    }

    /// Expose the table as a polars DataFrame (nulls for missing values).
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let values = |f: fn(&CountyMetrics) -> Option<f64>| self.rows.iter().map(f).collect::<Vec<_>>();

        Ok(DataFrame::new(vec![
            Column::new("county".into(), self.rows.iter().map(|row| row.county.as_str()).collect::<Vec<_>>()),
            Column::new("county_area_acres".into(), values(|row| row.county_area_acres)),
            Column::new("total_lake_area_acres".into(), values(|row| row.total_lake_area_acres)),
            Column::new("prop_lake".into(), values(|row| row.prop_lake)),
            Column::new("crop_area_acres".into(), values(|row| row.crop_area_acres)),
            Column::new("prop_crop".into(), values(|row| row.prop_crop)),
        ])?)
    }
}
