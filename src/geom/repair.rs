use geo::{BooleanOps, MultiPolygon, RemoveRepeatedPoints, Validation};

/// Repair an areal geometry so that its area can be trusted.
///
/// Repeated vertices are dropped first. If the geometry is still invalid
/// (self-intersecting rings, overlapping parts, misplaced holes), it is
/// rebuilt by a boolean union with the empty set, which re-nodes every
/// crossing and resolves the rings into a valid MultiPolygon.
///
/// Returns the geometry and whether a topological repair was needed.
pub fn make_valid(geometry: MultiPolygon<f64>) -> (MultiPolygon<f64>, bool) {
    let cleaned = geometry.remove_repeated_points();
    if cleaned.is_valid() { return (cleaned, false) }

    let repaired = cleaned.union(&MultiPolygon::<f64>::new(vec![]));
    (repaired, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, polygon};

    #[test]
    fn valid_geometry_is_untouched() {
        let square = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
        ]]);
        let (out, repaired) = make_valid(square.clone());
        assert!(!repaired);
        assert!((out.unsigned_area() - square.unsigned_area()).abs() < 1e-12);
    }

    #[test]
    fn bowtie_is_split_into_two_triangles() {
        // Signed area of the raw ring cancels to zero.
        let bowtie = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 2.0, y: 2.0), (x: 2.0, y: 0.0), (x: 0.0, y: 2.0),
        ]]);
        assert!(bowtie.unsigned_area() < 1e-12);

        let (out, repaired) = make_valid(bowtie);
        assert!(repaired);
        assert!(out.is_valid());
        assert!((out.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_points_alone_do_not_count_as_repair() {
        let square = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
        ]]);
        let (out, repaired) = make_valid(square);
        assert!(!repaired);
        assert!((out.unsigned_area() - 1.0).abs() < 1e-12);
    }
}
