use anyhow::Result;
use lakecrop::{AreaMethod, Completeness, PipelineConfig, write_report};
use log::info;

/// Config file first (or defaults), then command-line overrides.
fn build_config(args: &crate::cli::RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(state) = &args.state { config.sources.state = state.to_ascii_uppercase() }
    if let Some(lakes) = &args.lakes { config.sources.lakes = Some(lakes.clone()) }
    if let Some(cropland) = &args.cropland { config.sources.cropland = Some(cropland.clone()) }
    if let Some(boundaries) = &args.boundaries { config.sources.boundaries = Some(boundaries.clone()) }
    if let Some(cache_dir) = &args.cache_dir { config.sources.cache_dir = cache_dir.clone() }
    if let Some(method) = &args.area_method { config.area.method = method.parse::<AreaMethod>()? }
    if let Some(out) = &args.out { config.output.dir = out.clone() }

    Ok(config)
}

/// Data completeness counts shown to the user after a run.
fn completeness_line(completeness: &Completeness) -> String {
    format!(
        "counties: {}  missing lake data: {}  missing cropland data: {}  complete cases: {}",
        completeness.counties, completeness.missing_lake, completeness.missing_crop, completeness.complete_cases,
    )
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let config = build_config(args)?;

    let report = lakecrop::run(&config)?;
    write_report(&report, &config.output.dir)?;
    info!("[run] {} county rows written to {}", report.table.len(), config.output.dir.display());

    println!("{}", completeness_line(&report.completeness));
    println!("correlation (prop_crop vs prop_lake): {}", report.correlation);

    Ok(())
}
