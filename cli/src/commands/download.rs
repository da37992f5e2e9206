use anyhow::Result;
use log::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::DownloadArgs) -> Result<()> {
    let state_code = &args.state.to_ascii_uppercase();
    let cache_dir = &args.cache_dir.clone().unwrap_or("data".into());

    let shp_path = lakecrop::download_tiger_counties(state_code, cache_dir)?;
    info!("[download] county boundaries for {state_code} at {}", shp_path.display());
    println!("{}", shp_path.display());

    Ok(())
}
