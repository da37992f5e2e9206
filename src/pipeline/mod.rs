//! Normalizer → Aggregator → Analyzer, fed by the Loader's [`RawTables`].

mod aggregate;
mod correlation;
mod metrics;
mod normalize;
mod stats;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::{config::PipelineConfig, source::{RawTables, load_all}};

pub use aggregate::{Aggregation, Completeness, LakeStats, aggregate, parse_grouped_number};
pub use correlation::{CorrelationOutcome, MIN_SAMPLE_SIZE, PearsonTest, pearson};
pub use metrics::{CountyMetrics, CountyTable};
pub use normalize::{CountyAreas, SQ_METERS_TO_ACRES, county_areas, sq_meters_to_acres};

/// Everything a downstream report needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    #[serde(skip)]
    pub table: CountyTable,
    pub completeness: Completeness,
    pub lakes: LakeStats,
    pub correlation: CorrelationOutcome,
}

/// Run every stage after loading: areas, aggregation, correlation.
pub fn process(raw: &RawTables, config: &PipelineConfig) -> Result<PipelineReport> {
    let names = config.normalizer();
    let method = config.area.method;

    let areas = county_areas(&raw.boundaries, method, &names)?;
    let index = normalize::county_index(&raw.boundaries, &names);
    let Aggregation { table, completeness, lakes } =
        aggregate(&areas, &raw.lakes, &raw.cropland, &names, index.as_ref(), method);

    info!(
        "[pipeline] {} counties: {} missing lake data, {} missing cropland data, {} complete cases",
        completeness.counties, completeness.missing_lake, completeness.missing_crop, completeness.complete_cases,
    );
    if !completeness.unmatched_lake_counties.is_empty() {
        warn!("[pipeline] lake counties without boundary: {:?}", completeness.unmatched_lake_counties);
    }
    if !completeness.unmatched_crop_counties.is_empty() {
        warn!("[pipeline] cropland counties without boundary: {:?}", completeness.unmatched_crop_counties);
    }
    if !completeness.duplicate_crop_counties.is_empty() {
        warn!("[pipeline] cropland counties listed more than once: {:?}", completeness.duplicate_crop_counties);
    }

    let correlation = table.correlate();
    match &correlation {
        CorrelationOutcome::Estimate(_) => info!("[pipeline] correlation: {correlation}"),
        _ => warn!("[pipeline] correlation {correlation}"),
    }

    Ok(PipelineReport { table, completeness, lakes, correlation })
}

/// Load all sources described by `config` and process them.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let raw = load_all(config)?;
    process(&raw, config)
}
