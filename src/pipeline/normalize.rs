use std::collections::{BTreeMap, btree_map::Entry};

use anyhow::{Result, bail, ensure};
use log::info;

use crate::{
    geom::{AreaMethod, CountyIndex, area_sq_meters},
    names::{CountyKey, NameNormalizer},
    source::BoundaryLayer,
};

/// Square meters to acres.
pub const SQ_METERS_TO_ACRES: f64 = 0.000247105;

#[inline]
pub fn sq_meters_to_acres(sq_meters: f64) -> f64 { sq_meters * SQ_METERS_TO_ACRES }

/// County name → total county area in acres; each county appears exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountyAreas {
    acres: BTreeMap<CountyKey, f64>,
}

impl CountyAreas {
    /// Build from (raw name, acres) pairs. Names are normalized; a repeated
    /// name or a non-positive area is an error.
    pub fn from_acres<S: AsRef<str>>(
        counties: impl IntoIterator<Item = (S, f64)>,
        names: &NameNormalizer,
    ) -> Result<Self> {
        let mut acres = BTreeMap::new();
        for (raw, area) in counties {
            let raw = raw.as_ref();
            let Some(key) = names.key(raw) else { bail!("[pipeline::normalize] county with blank name") };
            ensure!(area > 0.0 && area.is_finite(), "[pipeline::normalize] county {raw:?} has non-positive area {area}");
            match acres.entry(key) {
                Entry::Vacant(entry) => { entry.insert(area); }
                Entry::Occupied(entry) => {
                    bail!("[pipeline::normalize] county {raw:?} appears twice (as {})", entry.key())
                }
            }
        }
        Ok(Self { acres })
    }

    #[inline] pub fn get(&self, county: &CountyKey) -> Option<f64> { self.acres.get(county).copied() }

    #[inline] pub fn contains(&self, county: &CountyKey) -> bool { self.acres.contains_key(county) }

    #[inline] pub fn len(&self) -> usize { self.acres.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.acres.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&CountyKey, f64)> {
        self.acres.iter().map(|(key, &area)| (key, area))
    }
}

/// Compute each boundary county's area in acres.
pub fn county_areas(layer: &BoundaryLayer, method: AreaMethod, names: &NameNormalizer) -> Result<CountyAreas> {
    let epsg = layer.crs.geographic_epsg();
    info!("[pipeline::normalize] {} counties, area method {:?}", layer.counties.len(), method.resolve(epsg)?);

    let shapes = layer.counties.iter().map(|county| county.geometry.clone()).collect::<Vec<_>>();
    let areas = area_sq_meters(&shapes, method, epsg)?;

    CountyAreas::from_acres(
        layer.counties.iter()
            .zip(areas)
            .map(|(county, sq_meters)| (county.name.as_str(), sq_meters_to_acres(sq_meters))),
        names,
    )
}

/// Spatial index over the boundary polygons, for lon/lat layers only.
pub(crate) fn county_index(layer: &BoundaryLayer, names: &NameNormalizer) -> Option<CountyIndex> {
    layer.crs.geographic_epsg()?;
    Some(CountyIndex::new(
        layer.counties.iter()
            .filter_map(|county| Some((names.key(&county.name)?, county.geometry.clone())))
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CountyBoundary, Crs};
    use geo::{MultiPolygon, polygon};

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0), (x: x0 + side, y: y0), (x: x0 + side, y: y0 + side), (x: x0, y: y0 + side),
        ]])
    }

    fn projected(counties: &[(&str, f64, f64, f64)]) -> BoundaryLayer {
        BoundaryLayer {
            counties: counties.iter()
                .map(|&(name, x, y, side)| CountyBoundary { name: name.into(), geometry: square(x, y, side) })
                .collect(),
            crs: Crs::Projected,
        }
    }

    #[test]
    fn conversion_is_linear() {
        assert!((sq_meters_to_acres(1.0e6) - 247.105).abs() < 1e-9);
        assert_eq!(sq_meters_to_acres(0.0), 0.0);
        let a = sq_meters_to_acres(12_345.0);
        assert!((a - 12_345.0 * 0.000247105).abs() < 1e-12);
    }

    #[test]
    fn every_county_once_with_positive_area() {
        let layer = projected(&[("Story", 0.0, 0.0, 1000.0), ("Boone", 1000.0, 0.0, 2000.0), ("O'Brien", 0.0, 5000.0, 10.0)]);
        let names = NameNormalizer::default();
        let areas = county_areas(&layer, AreaMethod::Auto, &names).unwrap();

        assert_eq!(areas.len(), 3);
        for county in &layer.counties {
            let key = names.key(&county.name).unwrap();
            assert!(areas.get(&key).unwrap() > 0.0);
        }
        let story = areas.get(&names.key("Story").unwrap()).unwrap();
        assert!((story - 247.105).abs() < 1e-9);
    }

    #[test]
    fn duplicate_county_is_rejected() {
        let layer = projected(&[("Story", 0.0, 0.0, 10.0), ("STORY", 50.0, 0.0, 10.0)]);
        assert!(county_areas(&layer, AreaMethod::Planar, &NameNormalizer::default()).is_err());
    }

    #[test]
    fn zero_area_is_rejected() {
        let layer = projected(&[("Story", 0.0, 0.0, 0.0)]);
        assert!(county_areas(&layer, AreaMethod::Planar, &NameNormalizer::default()).is_err());
    }

    #[test]
    fn projected_layers_have_no_spatial_index() {
        let layer = projected(&[("Story", 0.0, 0.0, 10.0)]);
        assert!(county_index(&layer, &NameNormalizer::default()).is_none());

        let geographic = BoundaryLayer { crs: Crs::Geographic { epsg: 4269 }, ..layer };
        assert_eq!(county_index(&geographic, &NameNormalizer::default()).unwrap().len(), 1);
    }
}
