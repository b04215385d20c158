// Property tests for the coordinate mapper and the wave geometry engine.

use liquid_gauge::{
    threshold_fill_color, wave_vector, ClosingEdge, Color, GaugeConfig, GaugeOptions, Transform,
};

const EPS: f64 = 1e-9;

fn config_with_level(level: f64) -> GaugeConfig {
    GaugeOptions::builder()
        .level(level)
        .phase(0.3)
        .time_shift(0.7)
        .build()
        .resolve(None)
}

#[test]
fn transform_maps_logical_corners_onto_margin_rectangle() {
    for (w, h, m) in [(500.0, 350.0, 40.0), (400.0, 400.0, 0.0), (1000.0, 200.0, 30.0)] {
        let t = Transform::new(w, h, m);
        assert!((t.x(0.0) - m).abs() < EPS, "scaleX(0) for {w}x{h} margin {m}");
        assert!((t.x(100.0) - (w - m)).abs() < EPS, "scaleX(100) for {w}x{h}");
        assert!((t.y(0.0) - (h - m)).abs() < EPS, "scaleY(0) for {w}x{h}");
        assert!((t.y(100.0) - m).abs() < EPS, "scaleY(100) for {w}x{h}");
    }
}

#[test]
fn transform_y_is_inverted() {
    let t = Transform::new(500.0, 350.0, 40.0);
    assert!(t.y(0.0) > t.y(100.0));
}

#[test]
fn fill_polygon_has_105_points_closing_at_origin() {
    for level in [0.0, 25.0, 50.0, 75.0, 100.0] {
        for t in [0.0, 100.0, 12_345.0] {
            let points = wave_vector(&config_with_level(level), t);
            assert_eq!(points.len(), 105);
            let first = points.first().unwrap();
            let last = points.last().unwrap();
            assert_eq!((first.x, first.y), (0.0, 0.0));
            assert_eq!((last.x, last.y), (0.0, 0.0));
        }
    }
}

#[test]
fn fill_polygon_closing_points_track_the_level() {
    let points = wave_vector(&config_with_level(62.0), 400.0);
    assert_eq!((points[1].x, points[1].y), (0.0, 62.0));
    assert_eq!((points[102].x, points[102].y), (100.0, 62.0));
    assert_eq!((points[103].x, points[103].y), (100.0, 0.0));
}

#[test]
fn wave_samples_sit_at_ascending_integer_x() {
    let points = wave_vector(&config_with_level(50.0), 300.0);
    for (i, p) in points[2..102].iter().enumerate() {
        assert_eq!(p.x, i as f64);
    }
}

#[test]
fn wave_differs_across_time_only_in_interior_heights() {
    let config = config_with_level(50.0);
    let a = wave_vector(&config, 300.0);
    let b = wave_vector(&config, 400.0);
    assert_eq!(a.len(), b.len());
    for (pa, pb) in a.iter().zip(&b) {
        assert_eq!(pa.x, pb.x, "x ordering must not change with time");
    }
    for i in [0, 1, 102, 103, 104] {
        assert_eq!(a[i], b[i], "closing point {i} must not change with time");
    }
    assert!(
        a[2..102].iter().zip(&b[2..102]).any(|(pa, pb)| pa.y != pb.y),
        "interior heights should move as time advances"
    );
}

#[test]
fn crest_is_clamped_inside_the_drawable_square_when_full() {
    let config = GaugeOptions::builder()
        .level(100.0)
        .amplitude(50.0)
        .phase(0.3)
        .time_shift(0.0)
        .build()
        .resolve(None);
    for t in [0.0, 100.0, 700.0, 3_600.0] {
        let points = wave_vector(&config, t);
        for p in &points[2..102] {
            assert!(p.y <= 101.0 + EPS, "crest escaped at t={t}: {}", p.y);
            assert!(p.y >= 99.0 - EPS, "trough below level band at t={t}");
        }
    }
}

#[test]
fn empty_gauge_flattens_to_the_baseline() {
    let points = wave_vector(&config_with_level(0.0), 250.0);
    for p in &points[2..102] {
        assert!(p.y.abs() < EPS, "waveY band collapses to zero when empty");
    }
}

#[test]
fn ripple_keeps_a_unit_floor_when_amplitude_is_zero() {
    let config = GaugeOptions::builder()
        .level(40.0)
        .amplitude(0.0)
        .phase(0.3)
        .time_shift(0.7)
        .build()
        .resolve(None);
    let points = wave_vector(&config, 150.0);
    for p in &points[2..102] {
        assert!(p.y >= 39.0 - EPS && p.y <= 40.0 + EPS);
    }
}

#[test]
fn near_surface_closing_anchors_just_below_the_level() {
    let config = GaugeOptions::builder()
        .level(50.0)
        .phase(0.3)
        .time_shift(0.7)
        .closing_edge(ClosingEdge::NearSurface)
        .build()
        .resolve(None);
    let points = wave_vector(&config, 0.0);
    assert_eq!(points.len(), 105);
    assert_eq!(points[0].y, 45.0);
    assert_eq!(points[103].y, 45.0);
    assert_eq!(points[104].y, 45.0);

    // A nearly empty gauge cannot anchor below the baseline.
    let shallow = GaugeOptions::builder()
        .level(3.0)
        .phase(0.3)
        .time_shift(0.7)
        .closing_edge(ClosingEdge::NearSurface)
        .build()
        .resolve(None);
    assert_eq!(wave_vector(&shallow, 0.0)[0].y, 0.0);
}

#[test]
fn threshold_fill_color_boundaries_are_exact() {
    assert_eq!(threshold_fill_color(74.0), Color::GREEN);
    assert_eq!(threshold_fill_color(75.0), Color::YELLOW);
    assert_eq!(threshold_fill_color(89.0), Color::YELLOW);
    assert_eq!(threshold_fill_color(90.0), Color::RED);
    assert_eq!(threshold_fill_color(0.0), Color::GREEN);
    assert_eq!(threshold_fill_color(100.0), Color::RED);
}
