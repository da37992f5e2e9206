#![doc = "lakecrop public API"]
mod common;
mod config;
mod geom;
mod names;
mod pipeline;
mod report;
mod source;

#[doc(inline)]
pub use config::{AreaSettings, ColumnSettings, NameSettings, OutputSettings, PipelineConfig, SourceSettings};

#[doc(inline)]
pub use geom::{AreaMethod, CountyIndex, area_sq_meters, make_valid, parse_multipolygon, reproject_to_utm};

#[doc(inline)]
pub use names::{CountyKey, NameNormalizer};

#[doc(inline)]
pub use pipeline::{
    Aggregation, Completeness, CorrelationOutcome, CountyAreas, CountyMetrics, CountyTable, LakeStats,
    MIN_SAMPLE_SIZE, PearsonTest, PipelineReport, SQ_METERS_TO_ACRES, aggregate, county_areas, parse_grouped_number, pearson,
    process, run, sq_meters_to_acres,
};

#[doc(inline)]
pub use report::write_report;

#[doc(inline)]
pub use source::{
    BoundaryLayer, BoundarySource, CountyBoundary, CroplandRecord, Crs, LakeRecord, Location, RawTables,
    load_all, load_boundaries, load_cropland, load_lakes,
};

#[cfg(feature = "download")]
#[doc(inline)]
pub use source::download_tiger_counties;
