use super::*;

fn point_with(id: &str, serials: &[&str]) -> ControlPoint {
    let mut point = ControlPoint::new(id);
    for (i, serial) in serials.iter().enumerate() {
        point
            .add_measure(ControlMeasure::new(*serial, 10.0 * i as f64, 20.0 * i as f64))
            .unwrap();
    }
    point
}

#[test]
fn test_add_measure_rejects_duplicate_serial() {
    let mut point = point_with("P1", &["A", "B"]);
    let err = point
        .add_measure(ControlMeasure::new("A", 1.0, 1.0))
        .unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateSerial {
            point_id: "P1".to_string(),
            serial: "A".to_string(),
        }
    );
    assert_eq!(point.num_measures(), 2);
}

#[test]
fn test_measures_keep_insertion_order() {
    let point = point_with("P1", &["C", "A", "B"]);
    let serials: Vec<&str> = point.measures().iter().map(|m| m.cube_serial()).collect();
    assert_eq!(serials, vec!["C", "A", "B"]);
}

#[test]
fn test_valid_measure_count() {
    let mut point = point_with("P1", &["A", "B", "C", "D"]);
    point.measure_by_serial_mut("B").unwrap().ignored = true;
    point.measure_by_serial_mut("C").unwrap().rejected = true;

    assert_eq!(point.num_measures(), 4);
    assert_eq!(point.num_valid_measures(), 2);

    let valid: Vec<&str> = point.iter_measures(true).map(|m| m.cube_serial()).collect();
    assert_eq!(valid, vec!["A", "D"]);
    assert_eq!(point.iter_measures(false).count(), 4);
}

#[test]
fn test_lookup_by_serial() {
    let point = point_with("P1", &["A", "B"]);
    assert!(point.has_cube_serial("B"));
    assert!(!point.has_cube_serial("Z"));
    assert_eq!(point.measure_by_serial("B").unwrap().sample, 10.0);
    assert!(point.measure_by_serial("Z").is_none());
}

#[test]
fn test_reference_must_be_owned() {
    let mut point = point_with("P1", &["A", "B"]);
    assert!(point.set_reference_measure("B").is_ok());
    assert_eq!(point.reference_serial(), Some("B"));
    assert_eq!(point.reference_measure().unwrap().cube_serial(), "B");

    let err = point.set_reference_measure("Z").unwrap_err();
    assert!(matches!(err, Error::ReferenceNotOwned { .. }));
    assert_eq!(point.reference_serial(), Some("B"));
}

#[test]
fn test_removing_reference_clears_it() {
    let mut point = point_with("P1", &["A", "B"]);
    point.set_reference_measure("A").unwrap();

    let removed = point.remove_measure_by_serial("A").unwrap();
    assert_eq!(removed.cube_serial(), "A");
    assert_eq!(point.reference_serial(), None);
    assert_eq!(point.num_measures(), 1);
}

#[test]
fn test_retain_valid_measures() {
    let mut point = point_with("P1", &["A", "B", "C"]);
    point.set_reference_measure("B").unwrap();
    point.measure_by_serial_mut("B").unwrap().ignored = true;
    point.measure_by_serial_mut("C").unwrap().rejected = true;

    assert_eq!(point.retain_valid_measures(), 2);
    assert_eq!(point.num_measures(), 1);
    assert_eq!(point.reference_serial(), None);
}

#[test]
fn test_worthiness_flags() {
    let mut point = ControlPoint::new("P1");
    assert!(point.is_worthy());

    point.edit_lock = true;
    assert!(!point.is_worthy());
    point.edit_lock = false;

    point.invalid = true;
    assert!(!point.is_worthy());
    point.invalid = false;

    point.rejected = true;
    assert!(!point.is_worthy());
    point.rejected = false;

    point.ignored = true;
    assert!(!point.is_worthy());
}

#[test]
fn test_best_surface_point_prefers_adjusted() {
    let mut point = ControlPoint::new("P1");
    assert!(point.best_surface_point().is_none());

    point.apriori = Some(SurfacePoint::new(10.0, 20.0, 1737.4e3));
    assert_eq!(point.best_surface_point(), point.apriori);

    let adjusted = SurfacePoint::new(10.5, 20.5, 1737.0e3).with_sigmas(1.0, 1.0, 5.0);
    point.adjusted = Some(adjusted);
    assert_eq!(point.best_surface_point(), Some(adjusted));

    point.set_apriori_to_best();
    assert_eq!(point.apriori, Some(adjusted));
}

#[test]
fn test_log_data_replaces_same_kind() {
    let mut measure = ControlMeasure::new("A", 1.0, 2.0);
    assert_eq!(measure.goodness_of_fit(), None);

    measure.set_log_data(LogData::new(LogDataType::GoodnessOfFit, 0.25));
    measure.set_log_data(LogData::new(LogDataType::PixelShift, 3.0));
    measure.set_log_data(LogData::new(LogDataType::GoodnessOfFit, 0.5));

    assert_eq!(measure.log_data.len(), 2);
    assert_eq!(measure.goodness_of_fit(), Some(0.5));
    assert_eq!(measure.log_value(LogDataType::PixelShift), Some(3.0));
}

#[test]
fn test_validate_catches_deserialized_duplicates() {
    let json = r#"{
        "id": "P1",
        "measures": [
            { "cube_serial": "A", "sample": 1.0, "line": 2.0 },
            { "cube_serial": "A", "sample": 3.0, "line": 4.0 }
        ]
    }"#;
    let point: ControlPoint = serde_json::from_str(json).unwrap();
    assert!(matches!(
        point.validate(),
        Err(Error::DuplicateSerial { .. })
    ));
}

#[test]
fn test_validate_catches_foreign_reference() {
    let json = r#"{
        "id": "P1",
        "reference_serial": "B",
        "measures": [ { "cube_serial": "A", "sample": 1.0, "line": 2.0 } ]
    }"#;
    let point: ControlPoint = serde_json::from_str(json).unwrap();
    assert!(matches!(
        point.validate(),
        Err(Error::ReferenceNotOwned { .. })
    ));
}

#[test]
fn test_network_cube_serials_are_distinct_and_sorted() {
    let mut net = ControlNet::new("net", "Mars");
    net.points.push(point_with("P1", &["B", "A"]));
    net.points.push(point_with("P2", &["A", "C"]));

    let serials: Vec<&str> = net.cube_serials().into_iter().collect();
    assert_eq!(serials, vec!["A", "B", "C"]);
    assert_eq!(net.num_measures(), 4);
    assert!(net.point_by_id("P2").is_some());
    assert!(net.validate().is_ok());
}
