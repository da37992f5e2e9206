use anyhow::{Context, Result, anyhow};
use geo::{BoundingRect, Coord, MapCoords, MultiPolygon, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Build PROJ.4 string for the source geographic CRS (degrees → radians handled in code).
#[inline]
fn source_geog_proj4(epsg: u32) -> &'static str {
    match epsg {
        4269 | 4937 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
        _            => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
    }
}

/// Bounding rectangle of all shapes.
fn bounds(shapes: &[MultiPolygon<f64>]) -> Option<Rect<f64>> {
    shapes.iter()
        .filter_map(|shape| shape.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}

/// Build PROJ.4 string for the target UTM CRS, chosen from a lon/lat center and source datum.
/// - WGS84: north / south zones
/// - NAD83: north only; if south, fall back to WGS84 UTM-S
fn utm_proj4(center: Coord<f64>, epsg: u32) -> String {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let north = center.y >= 0.0;
    let is_nad83 = matches!(epsg, 4269 | 4937);

    let datum = if is_nad83 && north { "NAD83" } else { "WGS84" };
    let south = if north { "" } else { " +south" };

    format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs")
}

/// Reproject lon/lat shapes to the metric UTM zone containing their joint center.
pub fn reproject_to_utm(shapes: &[MultiPolygon<f64>], epsg: u32) -> Result<Vec<MultiPolygon<f64>>> {
    let Some(extent) = bounds(shapes) else { return Ok(shapes.to_vec()) };

    let from = {
        let proj_string = source_geog_proj4(epsg);
        Proj4::from_proj_string(proj_string)
            .map_err(|e| anyhow!("failed to build source PROJ.4 {proj_string}: {e:?}"))?
    };

    let to = {
        let proj_string = utm_proj4(extent.center(), epsg);
        Proj4::from_proj_string(&proj_string)
            .map_err(|e| anyhow!("failed to build target PROJ.4 {proj_string}: {e:?}"))?
    };

    // Map coords → radians in, meters out.
    shapes.iter()
        .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(&from, &to, &mut point)
                .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;
            Ok(Coord { x: point.0, y: point.1 })
        }))
        .collect::<Result<Vec<_>>>()
        .context("[geom::proj] reprojection to UTM failed")
}
