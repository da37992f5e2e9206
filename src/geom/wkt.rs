//! WKT reading for areal geometries.

use anyhow::{Context, Result, anyhow, bail};
use geo::{Geometry, MultiPolygon};
use geozero::{ToGeo, wkt::Wkt};

/// Parse a WKT `POLYGON` or `MULTIPOLYGON` (optionally EWKT `SRID=...;`
/// prefixed) into a MultiPolygon. Other geometry types are an error.
pub fn parse_multipolygon(wkt: &str) -> Result<MultiPolygon<f64>> {
    let mut text = wkt.trim();
    if text.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("SRID=")) {
        let (_, body) = text.split_once(';')
            .ok_or_else(|| anyhow!("[geom::wkt] SRID prefix without ';'"))?;
        text = body.trim_start();
    }
    if text.is_empty() { bail!("[geom::wkt] empty geometry string") }

    let geom: Geometry<f64> = Wkt(text).to_geo()
        .with_context(|| format!("[geom::wkt] invalid WKT {:?}", abbreviate(text)))?;
    match geom {
        Geometry::MultiPolygon(mp) => Ok(mp),
        Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        other => bail!("[geom::wkt] expected POLYGON or MULTIPOLYGON, found {}", kind(&other)),
    }
}

fn kind(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "POINT",
        Geometry::Line(_) | Geometry::LineString(_) => "LINESTRING",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        _ => "non-areal geometry",
    }
}

/// First few characters of a WKT string for error messages.
fn abbreviate(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
