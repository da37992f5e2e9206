use std::{collections::BTreeMap, path::{Path, PathBuf}};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::{geom::AreaMethod, names::NameNormalizer, source::{BoundarySource, Location, state_info}};

/// Where the three inputs come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    /// USPS state code used to fetch county boundaries, e.g. "IA".
    pub state: String,
    /// Lake table: an http(s) URL or a local CSV path.
    pub lakes: Option<String>,
    /// Cropland table (local CSV).
    pub cropland: Option<PathBuf>,
    /// Local county shapefile; when unset the TIGER county layer for `state` is downloaded.
    pub boundaries: Option<PathBuf>,
    /// Directory for downloaded boundary files.
    pub cache_dir: PathBuf,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            state: "IA".into(),
            lakes: None,
            cropland: None,
            boundaries: None,
            cache_dir: PathBuf::from("data"),
        }
    }
}

/// Column names in the source tables (matched case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnSettings {
    pub lake_id: String,
    pub lake_geometry: String,
    pub lake_county: String,
    pub crop_county: String,
    pub crop_value: String,
    /// Attribute field holding the county name in the boundary shapefile.
    pub boundary_name: String,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            lake_id: "OBJECTID".into(),
            lake_geometry: "the_geom".into(),
            lake_county: "COUNTY".into(),
            crop_county: "County".into(),
            crop_value: "Value".into(),
            boundary_name: "NAME20".into(),
        }
    }
}

/// Residual county-name corrections, keyed by the (normalized) source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NameSettings {
    pub overrides: BTreeMap<String, String>,
}

impl Default for NameSettings {
    fn default() -> Self {
        Self {
            overrides: BTreeMap::from([
                ("Obrien".to_string(), "O'Brien".to_string()),
                ("O Brien".to_string(), "O'Brien".to_string()),
            ]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AreaSettings {
    pub method: AreaMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self { Self { dir: PathBuf::from("out") } }
}

/// Full pipeline configuration, usually read from a TOML file and then
/// overridden by command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub sources: SourceSettings,
    pub columns: ColumnSettings,
    pub names: NameSettings,
    pub area: AreaSettings,
    pub output: OutputSettings,
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("[config] Failed to parse configuration")
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[config] in {}", path.display()))
    }

    /// Check that every required input is present and well-formed.
    pub fn validate(&self) -> Result<()> {
        match self.sources.lakes.as_deref().map(str::trim) {
            None | Some("") => bail!("[config] no lake source given (sources.lakes)"),
            Some(_) => {}
        }
        match &self.sources.cropland {
            None => bail!("[config] no cropland source given (sources.cropland)"),
            Some(path) => ensure!(!path.as_os_str().is_empty(), "[config] sources.cropland is empty"),
        }
        if self.sources.boundaries.is_none() {
            ensure!(
                state_info(&self.sources.state.to_ascii_uppercase()).is_some(),
                "[config] unknown state/territory postal code: {}", self.sources.state,
            );
        }
        for (field, value) in [
            ("lake_id", &self.columns.lake_id),
            ("lake_geometry", &self.columns.lake_geometry),
            ("lake_county", &self.columns.lake_county),
            ("crop_county", &self.columns.crop_county),
            ("crop_value", &self.columns.crop_value),
            ("boundary_name", &self.columns.boundary_name),
        ] {
            ensure!(!value.trim().is_empty(), "[config] columns.{field} is empty");
        }
        Ok(())
    }

    /// Name normalizer carrying the configured override table.
    pub fn normalizer(&self) -> NameNormalizer {
        NameNormalizer::new(&self.names.overrides)
    }

    /// Where county boundaries come from.
    pub fn boundary_source(&self) -> BoundarySource {
        match &self.sources.boundaries {
            Some(path) => BoundarySource::Shapefile(path.clone()),
            None => BoundarySource::Tiger {
                state: self.sources.state.to_ascii_uppercase(),
                cache_dir: self.sources.cache_dir.clone(),
            },
        }
    }

    /// Where the lake table comes from.
    pub fn lakes_location(&self) -> Result<Location> {
        match self.sources.lakes.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(Location::parse(raw)),
            _ => bail!("[config] no lake source given (sources.lakes)"),
        }
    }

    /// Where the cropland table comes from.
    pub fn cropland_path(&self) -> Result<&Path> {
        self.sources.cropland.as_deref()
            .ok_or_else(|| anyhow::anyhow!("[config] no cropland source given (sources.cropland)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_iowa() {
        let config = PipelineConfig::default();
        assert_eq!(config.sources.state, "IA");
        assert_eq!(config.columns.crop_value, "Value");
        assert_eq!(config.area.method, AreaMethod::Auto);
        assert_eq!(config.normalizer().key("OBRIEN").unwrap().as_str(), "O'Brien");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(r#"
            [sources]
            lakes = "https://example.org/lakes.csv"
            cropland = "cropland.csv"

            [area]
            method = "utm"

            [names.overrides]
            "Pottawatamie" = "Pottawattamie"
        "#).unwrap();

        assert_eq!(config.area.method, AreaMethod::Utm);
        assert_eq!(config.columns.lake_geometry, "the_geom");
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(matches!(config.lakes_location().unwrap(), Location::Url(_)));
        assert_eq!(config.normalizer().key("POTTAWATAMIE").unwrap().as_str(), "Pottawattamie");
        // An explicit override table replaces the default one.
        assert_eq!(config.normalizer().key("OBRIEN").unwrap().as_str(), "Obrien");
        config.validate().unwrap();
    }

    #[test]
    fn validation_rejects_missing_sources_and_unknown_state() {
        let mut config = PipelineConfig::default();
        assert!(config.validate().is_err());

        config.sources.lakes = Some("lakes.csv".into());
        config.sources.cropland = Some("crop.csv".into());
        config.validate().unwrap();

        config.sources.state = "ZZ".into();
        assert!(config.validate().is_err());

        config.sources.boundaries = Some("counties.shp".into());
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PipelineConfig::from_toml_str("[sources]\nlake = \"x\"\n").is_err());
    }
}
