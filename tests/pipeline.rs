// End-to-end checks over the public pipeline API:
//   county areas, lake/cropland aggregation, outer join, proportions,
//   correlation outcome, and the report files.

use geo::{MultiPolygon, polygon};
use lakecrop::{
    AreaMethod, BoundaryLayer, ColumnSettings, CorrelationOutcome, CountyAreas, CountyBoundary, CroplandRecord, Crs,
    LakeRecord, Location, NameNormalizer, PipelineConfig, RawTables, aggregate, area_sq_meters, load_cropland,
    load_lakes, parse_multipolygon, process, sq_meters_to_acres, write_report,
};

const LAKE_WKT: &str = "POLYGON((-93.60 42.00, -93.59 42.00, -93.59 42.01, -93.60 42.01, -93.60 42.00))";

/// Geodesic acreage of the test lake, the same way the pipeline measures it.
fn lake_acres() -> f64 {
    let shape = parse_multipolygon(LAKE_WKT).unwrap();
    sq_meters_to_acres(area_sq_meters(&[shape], AreaMethod::Geodesic, Some(4326)).unwrap()[0])
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() <= 1e-9 * b.abs().max(1.0))
}

fn lake(id: &str, wkt: &str, county: &str) -> LakeRecord {
    LakeRecord { id: id.into(), geometry: wkt.into(), county: Some(county.into()) }
}

fn crop(county: &str, value: &str) -> CroplandRecord {
    CroplandRecord { county: county.into(), value: Some(value.into()) }
}

/// Counties A, B, C: A has a lake and cropland, B has a lake row with an empty
/// geometry (total zero) and cropland, C has neither.
#[test]
fn three_county_scenario() {
    let la = lake_acres();
    let names = NameNormalizer::default();
    let areas = CountyAreas::from_acres([("A", 10.0 * la), ("B", 2000.0), ("C", 500.0)], &names).unwrap();

    let lakes = vec![lake("1", LAKE_WKT, "A"), lake("2", "MULTIPOLYGON EMPTY", "B")];
    let cropland = vec![crop("A", &format!("{}", 4.0 * la)), crop("B", "1,800"), crop("C", "(D)")];

    let result = aggregate(&areas, &lakes, &cropland, &names, None, AreaMethod::Auto);
    let table = &result.table;
    assert_eq!(table.len(), 3);

    let a = table.get("A").unwrap();
    assert!(close(a.prop_lake, 0.10));
    assert!(close(a.prop_crop, 0.40));

    let b = table.get("B").unwrap();
    assert_eq!(b.total_lake_area_acres, Some(0.0));
    assert_eq!(b.prop_lake, Some(0.0));
    assert!(close(b.prop_crop, 0.90));

    let c = table.get("C").unwrap();
    assert_eq!(c.total_lake_area_acres, None);
    assert_eq!(c.prop_lake, None);
    assert_eq!(c.prop_crop, None);

    assert_eq!(result.lakes.unmeasured, 0);
    assert_eq!(result.completeness.complete_cases, 2);
    assert_eq!(table.correlate(), CorrelationOutcome::InsufficientData { n: 2 });
}

#[test]
fn every_boundary_county_gets_a_row_and_proportions_are_consistent() {
    let la = lake_acres();
    let names = NameNormalizer::default();
    let counties = ["Adair", "Boone", "Story", "O'Brien", "Polk"];
    let areas = CountyAreas::from_acres(counties.iter().enumerate().map(|(i, c)| (*c, (i + 1) as f64 * 1000.0)), &names)
        .unwrap();

    let lakes = vec![lake("1", LAKE_WKT, "story"), lake("2", LAKE_WKT, "Obrien"), lake("3", LAKE_WKT, "Nowhere")];
    let cropland = vec![crop("ADAIR", "800"), crop("Polk County", "1,200"), crop("Boone", "(D)")];

    let result = aggregate(&areas, &lakes, &cropland, &names, None, AreaMethod::Auto);
    assert!(result.table.len() >= areas.len());
    assert_eq!(result.completeness.unmatched_lake_counties, vec!["Nowhere".to_string()]);

    for row in result.table.rows() {
        if let (Some(lake), Some(area)) = (row.total_lake_area_acres, row.county_area_acres) {
            assert!(close(row.prop_lake, lake / area));
        }
        if let (Some(crop), Some(area)) = (row.crop_area_acres, row.county_area_acres) {
            assert!(close(row.prop_crop, crop / area));
        }
        if row.county_area_acres.is_none() {
            assert_eq!((row.prop_lake, row.prop_crop), (None, None));
        }
    }
    assert!(close(result.table.get("O'Brien").unwrap().total_lake_area_acres, la));
    assert!(close(result.table.get("Polk").unwrap().prop_crop, 1200.0 / 5000.0));
}

fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0), (x: x0 + side, y: y0), (x: x0 + side, y: y0 + side), (x: x0, y: y0 + side),
    ]])
}

#[test]
fn process_from_csv_files_and_write_report() {
    let dir = tempfile::tempdir().unwrap();
    let lakes_path = dir.path().join("lakes.csv");
    let crop_path = dir.path().join("cropland.csv");

    std::fs::write(&lakes_path, format!(
        "OBJECTID,the_geom,COUNTY\n1,\"{LAKE_WKT}\",Story\n2,\"{LAKE_WKT}\",Boone\n3,\"{LAKE_WKT}\",Boone\n4,not a polygon,Adair\n5,\"{LAKE_WKT}\",Polk\n"
    )).unwrap();
    std::fs::write(&crop_path, "County,Value\nSTORY,\"1,000\"\nBoone,\"2,500\"\nAdair,900\nPolk,\"(D)\"\nO BRIEN,400\n").unwrap();

    let columns = ColumnSettings::default();
    let lakes = load_lakes(&Location::parse(lakes_path.to_str().unwrap()), &columns).unwrap();
    let cropland = load_cropland(&crop_path, &columns).unwrap();
    assert_eq!(lakes.len(), 5);
    assert_eq!(cropland.len(), 5);

    // Projected squares, 4 km on a side: 16 km² ≈ 3953.68 acres each.
    let boundaries = BoundaryLayer {
        counties: ["Story", "Boone", "Adair", "Polk", "O'Brien"].iter().enumerate()
            .map(|(i, name)| CountyBoundary { name: name.to_string(), geometry: square(i as f64 * 4000.0, 0.0, 4000.0) })
            .collect(),
        crs: Crs::Projected,
    };
    let raw = RawTables { boundaries, lakes, cropland };

    let report = process(&raw, &PipelineConfig::default()).unwrap();
    let county_acres = sq_meters_to_acres(16.0e6);
    let la = lake_acres();

    assert_eq!(report.table.len(), 5);
    assert!(close(report.table.get("Story").unwrap().county_area_acres, county_acres));
    assert!(close(report.table.get("Boone").unwrap().total_lake_area_acres, 2.0 * la));
    assert_eq!(report.table.get("Adair").unwrap().total_lake_area_acres, Some(0.0));
    assert_eq!(report.table.get("Polk").unwrap().prop_crop, None);
    assert_eq!(report.table.get("O'Brien").unwrap().prop_lake, None);
    assert!(close(report.table.get("O'Brien").unwrap().crop_area_acres, 400.0));
    assert_eq!(report.lakes.unmeasured, 1);
    assert_eq!(report.completeness.complete_cases, 3);

    // Story (0.253, la), Boone (0.632, 2la), Adair (0.228, 0): positively related.
    let test = report.correlation.estimate().copied().unwrap();
    assert_eq!(test.n, 3);
    assert!(test.coefficient > 0.0);
    assert!(test.ci_low.is_none());

    let out = dir.path().join("out");
    write_report(&report, &out).unwrap();
    assert!(out.join("county_metrics.csv").is_file());
    assert!(out.join("summary.json").is_file());
}
