use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{common::{ensure_dir_exists, write_csv}, pipeline::PipelineReport};

pub(crate) const METRICS_FILE: &str = "county_metrics.csv";
pub(crate) const SUMMARY_FILE: &str = "summary.json";

/// Write the per-county table as CSV and the completeness/correlation summary as JSON into `dir`.
pub fn write_report(report: &PipelineReport, dir: &Path) -> Result<()> {
    ensure_dir_exists(dir)?;

    let metrics_path = dir.join(METRICS_FILE);
    write_csv(&mut report.table.to_dataframe()?, &metrics_path)?;

    let summary_path = dir.join(SUMMARY_FILE);
    let file = File::create(&summary_path)
        .with_context(|| format!("[report] failed to create {}", summary_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("[report] failed to write {}", summary_path.display()))?;

    info!("[report] wrote {} and {}", metrics_path.display(), summary_path.display());
    Ok(())
}
