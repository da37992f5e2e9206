use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use geo::{Area, GeodesicArea, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::geom::reproject_to_utm;

/// How to measure polygon area in square meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaMethod {
    /// Geodesic for lon/lat data, planar for projected data.
    #[default]
    Auto,
    /// Area on the ellipsoid (lon/lat input only).
    Geodesic,
    /// Shoelace area in the native unit (projected metres).
    Planar,
    /// Reproject lon/lat to the local UTM zone, then shoelace area.
    Utm,
}

/// An [`AreaMethod`] with `Auto` settled against the data's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    /// Lon/lat on the ellipsoid.
    Geodesic,
    Planar,
    /// Lon/lat reprojected to UTM, with the source EPSG code.
    Utm { epsg: u32 },
}

impl AreaMethod {
    /// Resolve `Auto` against the coordinate system of the data.
    /// `epsg` is `Some` for geographic (lon/lat) data and `None` for projected data.
    pub(crate) fn resolve(self, epsg: Option<u32>) -> Result<Measure> {
        match (self, epsg) {
            (Self::Auto | Self::Geodesic, Some(_)) => Ok(Measure::Geodesic),
            (Self::Auto | Self::Planar, None) | (Self::Planar, Some(_)) => Ok(Measure::Planar),
            (Self::Utm, Some(epsg)) => Ok(Measure::Utm { epsg }),
            (Self::Geodesic | Self::Utm, None) => bail!("area method {self:?} requires lon/lat input"),
        }
    }
}

impl FromStr for AreaMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "geodesic" => Ok(Self::Geodesic),
            "planar" => Ok(Self::Planar),
            "utm" => Ok(Self::Utm),
            _ => Err(anyhow!("Unknown area method: {s}. Expected 'auto', 'geodesic', 'planar' or 'utm'")),
        }
    }
}

/// Compute the area of each shape in square meters.
///
/// Planar areas are taken in the native unit of the data, which must be
/// metres for the result to be square meters.
pub fn area_sq_meters(shapes: &[MultiPolygon<f64>], method: AreaMethod, epsg: Option<u32>) -> Result<Vec<f64>> {
    Ok(match method.resolve(epsg)? {
        Measure::Geodesic => shapes.iter().map(|shape| shape.geodesic_area_unsigned()).collect(),
        Measure::Planar => shapes.iter().map(|shape| shape.unsigned_area()).collect(),
        Measure::Utm { epsg } => reproject_to_utm(shapes, epsg)?.iter().map(|shape| shape.unsigned_area()).collect(),
    })
}
