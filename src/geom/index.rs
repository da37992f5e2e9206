use geo::{BoundingRect, Contains, MultiPolygon, Point};
use rstar::{RTree, AABB};

use crate::{geom::bbox::BoundingBox, names::CountyKey};

/// Spatial lookup from a lon/lat point to the county polygon containing it.
#[derive(Debug, Clone)]
pub struct CountyIndex {
    keys: Vec<CountyKey>,
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl CountyIndex {
    /// Construct an index from (county, shape) pairs. Shapes without extent are skipped.
    pub fn new(counties: impl IntoIterator<Item = (CountyKey, MultiPolygon<f64>)>) -> Self {
        let (keys, shapes): (Vec<_>, Vec<_>) = counties.into_iter().unzip();
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            keys,
            shapes,
        }
    }

    #[inline] pub fn len(&self) -> usize { self.keys.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    /// Find the county containing `point`, if any.
    pub fn locate(&self, point: &Point<f64>) -> Option<&CountyKey> {
        // Query with a degenerate AABB at `point`, then confirm with the actual polygon.
        let env = AABB::from_corners([point.x(), point.y()], [point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&env)
            .map(|bb| bb.idx())
            .find(|&i| self.shapes[i].contains(point))
            .map(|i| &self.keys[i])
    }
}
