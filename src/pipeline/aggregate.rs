//! Aggregator: per-county lake and cropland totals, outer-joined with the
//! county areas on the normalized county name.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use anyhow::{Result, anyhow};
use geo::{InteriorPoint, MultiPolygon};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    geom::{AreaMethod, CountyIndex, area_sq_meters, make_valid, parse_multipolygon},
    names::{CountyKey, NameNormalizer},
    pipeline::{
        metrics::{CountyMetrics, CountyTable},
        normalize::{CountyAreas, sq_meters_to_acres},
    },
    source::{CroplandRecord, LakeRecord},
};

/// Lake geometries are always lon/lat WGS84.
const LAKE_EPSG: u32 = 4326;

/// Parse a grouped-digit number such as "123,456". Anything unparseable
/// (including withheld markers like "(D)") is missing.
pub fn parse_grouped_number(raw: &str) -> Option<f64> {
    let cleaned = raw.chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>();
    if cleaned.is_empty() { return None }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Bookkeeping on how the lake rows were handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LakeStats {
    pub total: usize,
    /// Geometries that needed a topology repair.
    pub repaired: usize,
    /// Geometries that could not be parsed or measured (area counted as zero).
    pub unmeasured: usize,
    /// Lakes with a blank county field placed by spatial lookup.
    pub located: usize,
    /// Lakes with no county at all; excluded from every total.
    pub unassigned: usize,
}

/// Data completeness counts a user should check before trusting the correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub counties: usize,
    pub boundary_counties: usize,
    pub missing_area: usize,
    pub missing_lake: usize,
    pub missing_crop: usize,
    pub complete_cases: usize,
    /// Lake county names with no boundary counterpart.
    pub unmatched_lake_counties: Vec<String>,
    /// Cropland county names with no boundary counterpart.
    pub unmatched_crop_counties: Vec<String>,
    /// Cropland counties listed more than once; their cropland value is missing.
    pub duplicate_crop_counties: Vec<String>,
}

/// Aggregator output.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub table: CountyTable,
    pub completeness: Completeness,
    pub lakes: LakeStats,
}

/// Parse, repair and measure one lake, returning its geometry and area in acres.
fn measure_lake(wkt: &str, method: AreaMethod, stats: &mut LakeStats) -> Result<(MultiPolygon<f64>, f64)> {
    let (geometry, repaired) = make_valid(parse_multipolygon(wkt)?);
    if repaired { stats.repaired += 1 }

    // Lakes follow the county method only when it reprojects; otherwise they are measured on the ellipsoid.
    let method = if method == AreaMethod::Utm { AreaMethod::Utm } else { AreaMethod::Geodesic };
    let sq_meters = area_sq_meters(std::slice::from_ref(&geometry), method, Some(LAKE_EPSG))?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no area computed"))?;
    Ok((geometry, sq_meters_to_acres(sq_meters)))
}

/// Sum lake area per county. Missing individual areas count as zero.
fn lake_totals(
    lakes: &[LakeRecord],
    names: &NameNormalizer,
    index: Option<&CountyIndex>,
    method: AreaMethod,
) -> (BTreeMap<CountyKey, f64>, LakeStats) {
    let mut stats = LakeStats { total: lakes.len(), ..LakeStats::default() };
    let mut totals = BTreeMap::<CountyKey, f64>::new();

    for lake in lakes {
        let (geometry, acres) = match measure_lake(&lake.geometry, method, &mut stats) {
            Ok((geometry, acres)) => (Some(geometry), Some(acres)),
            Err(err) => {
                warn!("[pipeline::aggregate] lake {}: {err:#}; area treated as missing", lake.id);
                stats.unmeasured += 1;
                (None, None)
            }
        };

        let county = match lake.county.as_deref().and_then(|name| names.key(name)) {
            Some(key) => Some(key),
            None => {
                let located = geometry.as_ref()
                    .and_then(|geometry| geometry.interior_point())
                    .zip(index)
                    .and_then(|(point, index)| index.locate(&point).cloned());
                if let Some(key) = &located {
                    debug!("[pipeline::aggregate] lake {} has no county, located in {key}", lake.id);
                    stats.located += 1;
                }
                located
            }
        };

        match county {
            Some(key) => *totals.entry(key).or_insert(0.0) += acres.unwrap_or(0.0),
            None => {
                debug!("[pipeline::aggregate] lake {} has no county and could not be located", lake.id);
                stats.unassigned += 1;
            }
        }
    }

    (totals, stats)
}

/// Cropland acres per county, plus the counties that appear more than once.
/// A county name identifies one cropland row; a repeated county is ambiguous
/// (several years or data items mixed together), so its value becomes missing.
fn crop_totals(
    cropland: &[CroplandRecord],
    names: &NameNormalizer,
) -> (BTreeMap<CountyKey, Option<f64>>, BTreeSet<CountyKey>) {
    let mut totals = BTreeMap::<CountyKey, Option<f64>>::new();
    let mut duplicates = BTreeSet::<CountyKey>::new();

    for record in cropland {
        let Some(key) = names.key(&record.county) else { continue };
        let value = record.value.as_deref().and_then(parse_grouped_number);
        if value.is_none() {
            debug!("[pipeline::aggregate] cropland value {:?} for {key} is not numeric", record.value);
        }

        match totals.entry(key) {
            Entry::Vacant(entry) => { entry.insert(value); }
            Entry::Occupied(mut entry) => {
                warn!("[pipeline::aggregate] cropland county {} appears more than once; value treated as missing", entry.key());
                entry.insert(None);
                duplicates.insert(entry.key().clone());
            }
        }
    }

    (totals, duplicates)
}

/// County names present in a source but absent from the boundary layer.
fn unmatched<'a>(keys: impl Iterator<Item = &'a CountyKey>, areas: &CountyAreas) -> Vec<String> {
    keys.filter(|key| !areas.contains(key))
        .map(|key| key.to_string())
        .collect()
}

/// Join lake totals, cropland totals and county areas (outer join on county
/// name) and compute the proportions.
pub fn aggregate(
    areas: &CountyAreas,
    lakes: &[LakeRecord],
    cropland: &[CroplandRecord],
    names: &NameNormalizer,
    index: Option<&CountyIndex>,
    method: AreaMethod,
) -> Aggregation {
    let (lake_acres, lake_stats) = lake_totals(lakes, names, index, method);
    let (crop_acres, duplicate_crop) = crop_totals(cropland, names);

    let keys = areas.iter().map(|(key, _)| key)
        .chain(lake_acres.keys())
        .chain(crop_acres.keys())
        .cloned()
        .collect::<BTreeSet<_>>();

    let table = CountyTable::new(keys.into_iter()
        .map(|key| {
            let area = areas.get(&key);
            let lake = lake_acres.get(&key).copied();
            let crop = crop_acres.get(&key).copied().flatten();
            CountyMetrics::new(key, area, lake, crop)
        })
        .collect());

    let rows = table.rows();
    let completeness = Completeness {
        counties: rows.len(),
        boundary_counties: areas.len(),
        missing_area: rows.iter().filter(|row| row.county_area_acres.is_none()).count(),
        missing_lake: rows.iter().filter(|row| row.total_lake_area_acres.is_none()).count(),
        missing_crop: rows.iter().filter(|row| row.crop_area_acres.is_none()).count(),
        complete_cases: rows.iter().filter(|row| row.is_complete()).count(),
        unmatched_lake_counties: unmatched(lake_acres.keys(), areas),
        unmatched_crop_counties: unmatched(crop_acres.keys(), areas),
        duplicate_crop_counties: duplicate_crop.iter().map(|key| key.to_string()).collect(),
    };

    info!(
        "[pipeline::aggregate] {} rows ({} boundary counties), {} lakes ({} repaired, {} unmeasured, {} located, {} unassigned)",
        completeness.counties, completeness.boundary_counties,
        lake_stats.total, lake_stats.repaired, lake_stats.unmeasured, lake_stats.located, lake_stats.unassigned,
    );

    Aggregation { table, completeness, lakes: lake_stats }
}
