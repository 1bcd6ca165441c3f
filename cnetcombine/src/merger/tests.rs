use super::*;
use crate::control::ControlMeasure;

fn point(id: &str, measures: &[(&str, f64, f64)]) -> ControlPoint {
    let mut p = ControlPoint::new(id);
    for &(serial, sample, line) in measures {
        let mut m = ControlMeasure::new(serial, sample, line);
        m.measure_type = MeasureType::RegisteredSubPixel;
        p.add_measure(m).unwrap();
    }
    p
}

fn accepted(verdict: Verdict) -> DistanceStats {
    match verdict {
        Verdict::Accept(stats) => stats,
        other => panic!("expected Accept, got {other:?}"),
    }
}

#[test]
fn test_distance_stats() {
    assert!(DistanceStats::from_distances(&[]).is_none());

    let single = DistanceStats::from_distances(&[0.7]).unwrap();
    assert_eq!(single.count, 1);
    assert!((single.mean - 0.7).abs() < 1e-12);
    assert_eq!(single.std_dev, 0.0);

    let stats = DistanceStats::from_distances(&[1.0, 3.0]).unwrap();
    assert!((stats.mean - 2.0).abs() < 1e-12);
    assert!((stats.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
    assert_eq!(stats.goodness_of_fit(), 1.0);
}

#[test]
fn test_exact_duplicate_is_accepted() {
    let merger = PointMerger::new(1.0);
    let p1 = point("P1", &[("A", 100.0, 200.0), ("B", 150.0, 250.0)]);
    let p2 = point("P2", &[("A", 100.0, 200.0), ("B", 150.0, 250.0)]);

    let stats = accepted(merger.evaluate(&p1, &p2));
    assert_eq!(stats.count, 2);
    assert_eq!(stats.mean, 0.0);
}

#[test]
fn test_within_tolerance_mean_distance() {
    let merger = PointMerger::new(1.0);
    let p1 = point("P1", &[("A", 100.0, 200.0), ("B", 150.0, 250.0)]);
    let p2 = point("P2", &[("A", 100.4, 200.3), ("B", 149.6, 250.2)]);

    let stats = accepted(merger.evaluate(&p1, &p2));
    let expected = (0.5 + 0.2_f64.sqrt()) / 2.0;
    assert!((stats.mean - expected).abs() < 1e-9);
}

#[test]
fn test_beyond_tolerance_is_rejected() {
    let merger = PointMerger::new(1.0);
    let p1 = point("P1", &[("A", 100.0, 200.0), ("B", 150.0, 250.0)]);
    let p2 = point("P2", &[("A", 105.0, 210.0), ("B", 149.6, 250.2)]);

    assert!(matches!(
        merger.evaluate(&p1, &p2),
        Verdict::BeyondTolerance(stats) if stats.mean > 1.0
    ));
}

#[test]
fn test_zero_tolerance_needs_exact_coincidence() {
    let merger = PointMerger::new(0.0);
    let p1 = point("P1", &[("A", 100.0, 200.0)]);
    let exact = point("P2", &[("A", 100.0, 200.0)]);
    let close = point("P3", &[("A", 100.0, 200.001)]);

    assert!(matches!(merger.evaluate(&p1, &exact), Verdict::Accept(_)));
    assert!(matches!(
        merger.evaluate(&p1, &close),
        Verdict::BeyondTolerance(_)
    ));
}

#[test]
fn test_no_common_images() {
    let merger = PointMerger::new(1.0);
    let p1 = point("P1", &[("A", 1.0, 1.0)]);
    let p2 = point("P2", &[("B", 1.0, 1.0)]);
    assert_eq!(merger.evaluate(&p1, &p2), Verdict::NoCommonImages);
}

#[test]
fn test_invalid_common_measures_do_not_count() {
    let merger = PointMerger::new(1.0);
    let p1 = point("P1", &[("A", 1.0, 1.0), ("B", 5.0, 5.0)]);
    let mut p2 = point("P2", &[("A", 1.0, 1.0), ("C", 5.0, 5.0)]);
    p2.measure_by_serial_mut("A").unwrap().rejected = true;

    assert_eq!(merger.evaluate(&p1, &p2), Verdict::NoCommonImages);
}

#[test]
fn test_same_point_and_unworthy_candidates() {
    let merger = PointMerger::new(1.0);
    let p1 = point("P1", &[("A", 1.0, 1.0)]);
    assert_eq!(merger.evaluate(&p1, &p1), Verdict::SamePoint);

    let mut locked = point("P2", &[("A", 1.0, 1.0)]);
    locked.edit_lock = true;
    assert_eq!(merger.evaluate(&p1, &locked), Verdict::Unworthy);

    let empty = ControlPoint::new("P3");
    assert_eq!(merger.evaluate(&p1, &empty), Verdict::Unworthy);
}

#[test]
fn test_empty_source_absorbs_nothing() {
    let merger = PointMerger::new(1.0);
    let empty = ControlPoint::new("P1");
    let p2 = point("P2", &[("A", 1.0, 1.0)]);
    assert_eq!(merger.evaluate(&empty, &p2), Verdict::NoCommonImages);
}

#[test]
fn test_merge_skips_same_image_measures() {
    let merger = PointMerger::new(1.0);
    let mut p1 = point("P1", &[("A", 100.0, 200.0), ("B", 150.0, 250.0)]);
    let mut p2 = point("P2", &[("A", 100.4, 200.3), ("B", 149.6, 250.2)]);

    let stats = accepted(merger.evaluate(&p1, &p2));
    let outcome = merger.merge(&mut p1, &mut p2, &stats).unwrap();

    assert_eq!(
        outcome,
        MergeOutcome {
            transferred: 0,
            dropped: 2
        }
    );
    assert_eq!(p1.num_measures(), 2);
    assert_eq!(p1.measure_by_serial("A").unwrap().sample, 100.0);
    assert!(p2.ignored);
    assert_eq!(p2.num_measures(), 0);
}

#[test]
fn test_merge_moves_new_image_measure() {
    let merger = PointMerger::new(1.0);
    let mut p1 = point("P1", &[("A", 100.0, 200.0)]);
    let mut p2 = point("P2", &[("A", 100.2, 200.1), ("C", 50.0, 50.0)]);

    let stats = accepted(merger.evaluate(&p1, &p2));
    let outcome = merger.merge(&mut p1, &mut p2, &stats).unwrap();

    assert_eq!(outcome.transferred, 1);
    assert_eq!(outcome.dropped, 1);

    let serials: Vec<&str> = p1.measures().iter().map(|m| m.cube_serial()).collect();
    assert_eq!(serials, vec!["A", "C"]);
    let moved = p1.measure_by_serial("C").unwrap();
    assert_eq!(moved.position(), glam::DVec2::new(50.0, 50.0));
    assert_eq!(moved.measure_type, MeasureType::Candidate);
    assert!(p2.ignored);
}

#[test]
fn test_merge_sets_residual_on_candidate_reference() {
    let merger = PointMerger::new(2.0);
    let mut p1 = point("P1", &[("A", 10.0, 10.0), ("B", 20.0, 20.0)]);
    p1.set_reference_measure("A").unwrap();
    let mut p2 = point("P2", &[("A", 11.0, 10.0), ("B", 20.0, 23.0), ("C", 5.0, 5.0)]);
    p2.set_reference_measure("C").unwrap();

    let stats = accepted(merger.evaluate(&p1, &p2));
    assert!((stats.mean - 2.0).abs() < 1e-12);

    merger.merge(&mut p1, &mut p2, &stats).unwrap();

    let moved = p1.measure_by_serial("C").unwrap();
    assert_eq!(moved.measure_type, MeasureType::Candidate);
    assert!((moved.sample_residual - 2.0).abs() < 1e-12);
    assert!((moved.line_residual - 2.0).abs() < 1e-12);
    assert_eq!(moved.goodness_of_fit(), Some(1.0));
    assert_eq!(p1.reference_serial(), Some("A"));
}

#[test]
fn test_merge_with_shared_reference_keeps_measure_types() {
    let merger = PointMerger::new(1.0);
    let mut p1 = point("P1", &[("A", 10.0, 10.0)]);
    p1.set_reference_measure("A").unwrap();
    let mut p2 = point("P2", &[("A", 10.5, 10.0), ("D", 7.0, 7.0)]);
    p2.set_reference_measure("A").unwrap();

    let stats = accepted(merger.evaluate(&p1, &p2));
    merger.merge(&mut p1, &mut p2, &stats).unwrap();

    let moved = p1.measure_by_serial("D").unwrap();
    assert_eq!(moved.measure_type, MeasureType::RegisteredSubPixel);
    assert_eq!(moved.sample_residual, 0.0);
    assert_eq!(moved.goodness_of_fit(), None);
}

#[test]
fn test_merge_drops_invalid_candidate_measures() {
    let merger = PointMerger::new(1.0);
    let mut p1 = point("P1", &[("A", 1.0, 1.0)]);
    let mut p2 = point("P2", &[("A", 1.0, 1.0), ("B", 2.0, 2.0), ("C", 3.0, 3.0)]);
    p2.measure_by_serial_mut("B").unwrap().ignored = true;

    let stats = accepted(merger.evaluate(&p1, &p2));
    let outcome = merger.merge(&mut p1, &mut p2, &stats).unwrap();

    assert_eq!(outcome.transferred, 1);
    assert_eq!(outcome.dropped, 2);
    assert!(!p1.has_cube_serial("B"));
    assert!(p1.has_cube_serial("C"));
}
