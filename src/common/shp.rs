use std::{path::Path, sync::LazyLock};

use anyhow::{Context, Result, bail};
use regex::Regex;
use shapefile::{self as shp, Reader, Shape, dbase::{FieldValue, Record}};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_from_shapefile(path: &Path) -> Result<(Vec<Shape>, Vec<Record>)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut shapes = Vec::with_capacity(reader.shape_count()?);
    let mut records = Vec::with_capacity(shapes.capacity());
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        shapes.push(shape);
        records.push(record);
    }
    Ok((shapes, records))
}

/// Get the value of a character field from a Record.
pub(crate) fn get_character_field(record: &Record, field: &str) -> Result<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Ok(s.trim().to_string()),
        _ => bail!("missing or invalid character field: {}", field)
    }
}

/// Coerce a generic shape into an owned multipolygon, raising error if different shape.
pub(crate) fn shape_to_multipolygon(shape: Shape) -> Result<geo::MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => Ok(shp_to_geo(&polygon)),
        other => bail!("found non-Polygon shape in layer: {:?}", other.shapetype())
    }
}

/// Coordinate system family declared by a shapefile's `.prj` sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrjKind {
    Geographic { epsg: u32 },
    Projected,
}

static PRJ_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(GEOGCS|PROJCS)\s*\[\s*"([^"]*)""#).expect("static regex")
});

/// Classify WKT from a `.prj` file. NAD83 maps to EPSG:4269, other datums to 4326.
pub(crate) fn classify_prj(wkt: &str) -> Option<PrjKind> {
    let caps = PRJ_ROOT.captures(wkt)?;
    match &caps[1] {
        "PROJCS" => Some(PrjKind::Projected),
        _ if wkt.contains("North_American_Datum_1983") || caps[2].contains("NAD83") => {
            Some(PrjKind::Geographic { epsg: 4269 })
        }
        _ => Some(PrjKind::Geographic { epsg: 4326 }),
    }
}

/// Read the `.prj` next to `path`, if any. Missing or unreadable sidecars yield `None`.
pub(crate) fn prj_from_shapefile(path: &Path) -> Option<PrjKind> {
    let text = std::fs::read_to_string(path.with_extension("prj")).ok()?;
    classify_prj(&text)
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>
pub(crate) fn shp_to_geo(p: &shp::Polygon) -> geo::MultiPolygon<f64> {
    // Shapefile stores each outer ring followed by its holes.
    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in p.rings() {
        let coords = ring.points().iter()
            .map(|pt| geo::Coord { x: pt.x, y: pt.y })
            .collect::<Vec<_>>();
        let ls = geo::LineString::new(coords);

        match ring {
            shp::PolygonRing::Outer(_) => {
                if let Some(ext) = current_exterior.take() {
                    polys.push(geo::Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ls);
            }
            shp::PolygonRing::Inner(_) => current_holes.push(ls),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }

    geo::MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn classify_nad83_geographic() {
        let prj = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;
        assert_eq!(classify_prj(prj), Some(PrjKind::Geographic { epsg: 4269 }));
    }

    #[test]
    fn classify_projected_and_garbage() {
        let prj = r#"PROJCS["NAD_1983_UTM_Zone_15N",GEOGCS["GCS_North_American_1983"]]"#;
        assert_eq!(classify_prj(prj), Some(PrjKind::Projected));
        assert_eq!(classify_prj("not a prj"), None);
        assert_eq!(classify_prj(r#"GEOGCS["GCS_WGS_1984"]"#), Some(PrjKind::Geographic { epsg: 4326 }));
    }

    #[test]
    fn shapefile_polygon_with_hole_converts() {
        let outer = vec![
            shp::Point { x: 0.0, y: 0.0 },
            shp::Point { x: 0.0, y: 10.0 },
            shp::Point { x: 10.0, y: 10.0 },
            shp::Point { x: 10.0, y: 0.0 },
            shp::Point { x: 0.0, y: 0.0 },
        ];
        let inner = vec![
            shp::Point { x: 2.0, y: 2.0 },
            shp::Point { x: 4.0, y: 2.0 },
            shp::Point { x: 4.0, y: 4.0 },
            shp::Point { x: 2.0, y: 4.0 },
            shp::Point { x: 2.0, y: 2.0 },
        ];
        let polygon = shp::Polygon::with_rings(vec![
            shp::PolygonRing::Outer(outer),
            shp::PolygonRing::Inner(inner),
        ]);
        let mp = shp_to_geo(&polygon);
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - 96.0).abs() < 1e-9);
    }
}
