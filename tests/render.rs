mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::RecordingRenderer;
use gantt_core::model::task::Dependencies;
use gantt_core::render::ShapeKind;
use gantt_core::{ChartEvent, Error, Gantt, Options, RawTask, ViewMode};

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn raw(name: &str, start: &str, end: &str, deps: &[&str]) -> RawTask {
    RawTask {
        name: name.to_string(),
        id: Some(name.to_string()),
        start: Some(start.to_string()),
        end: Some(end.to_string()),
        dependencies: Some(Dependencies::List(
            deps.iter().map(|d| d.to_string()).collect(),
        )),
        ..Default::default()
    }
}

#[test]
fn render_lays_down_the_four_layers_in_order() {
    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let mut chart = Gantt::new(&raws, Options::default());
    let mut r = RecordingRenderer::new();
    chart.render(&mut r).unwrap();

    let layers: Vec<&str> = r
        .shapes
        .iter()
        .filter(|s| s.kind == ShapeKind::Group && s.parent.is_none())
        .map(|s| s.class())
        .collect();
    assert_eq!(layers, vec!["grid", "date", "arrow", "bar"]);
    assert_eq!(r.with_class("grid-background").len(), 1);
    assert_eq!(r.with_class("grid-header").len(), 1);
}

#[test]
fn surface_rejection_is_the_only_render_error() {
    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let mut chart = Gantt::new(&raws, Options::default());
    let mut r = RecordingRenderer::failing();
    let err = chart.render(&mut r).unwrap_err();
    assert!(matches!(err, Error::RenderTarget(_)));
}

#[test]
fn every_dependency_gets_an_arrow_and_dangling_ids_are_skipped() {
    let raws = vec![
        raw("t1", "2024-01-10", "2024-01-12", &[]),
        raw("t2", "2024-01-12", "2024-01-14", &["t1", "no-such-task"]),
    ];
    let mut chart = Gantt::new(&raws, Options::default());
    let mut r = RecordingRenderer::new();
    chart.render(&mut r).unwrap();

    let arrows = r.with_class("arrow");
    let paths: Vec<_> = arrows
        .iter()
        .filter(|s| s.kind == ShapeKind::Path)
        .collect();
    assert_eq!(paths.len(), 1);
    let d = paths[0].text_attr("d").unwrap();
    assert!(d.starts_with("M "));
    assert!(d.ends_with("m -5 -5 l 5 5 l -5 5"));
}

#[test]
fn invalid_tasks_render_flagged_and_without_handles() {
    let raws = vec![
        RawTask {
            name: "broken".to_string(),
            id: Some("broken".to_string()),
            start: Some("not a date".to_string()),
            ..Default::default()
        },
        raw("ok", "2024-01-10", "2024-01-12", &[]),
    ];
    let mut chart = Gantt::new(&raws, Options::default());
    let mut r = RecordingRenderer::new();
    chart.render(&mut r).unwrap();

    assert_eq!(r.wrapper("broken").class(), "bar-wrapper bar-invalid");
    assert!(!r.has_bar_child("broken", "handle right"));
    assert!(!r.has_bar_child("broken", "handle progress"));
    assert!(r.has_bar_child("ok", "handle right"));
}

#[test]
fn bar_geometry_matches_the_day_scale() {
    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let chart = Gantt::new(&raws, Options::default());

    // Range starts two months before the earliest task at Day scale.
    assert_eq!(chart.date_range().0, dt(2023, 11, 10));
    let rect = chart.bar_rect("t1").unwrap();
    assert_eq!(rect.width, 76.0);
    assert_eq!(rect.x, chart.x_of(&dt(2024, 1, 10)));
}

#[test]
fn changing_view_mode_emits_once_and_repads_the_range() {
    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let mut chart = Gantt::new(&raws, Options::default());

    let events = chart.change_view_mode(ViewMode::Month);
    assert_eq!(
        events,
        vec![ChartEvent::ViewChange {
            mode: ViewMode::Month
        }]
    );
    assert_eq!(chart.date_range().0, dt(2023, 5, 10));
    assert!(chart.change_view_mode(ViewMode::Month).is_empty());
}

#[test]
fn zoom_walks_the_view_mode_ladder() {
    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let mut chart = Gantt::new(&raws, Options::default());

    chart.zoom_out();
    assert_eq!(chart.view_mode(), ViewMode::Week);
    chart.zoom_in();
    assert_eq!(chart.view_mode(), ViewMode::Day);
    chart.zoom_in();
    chart.zoom_in();
    assert_eq!(chart.view_mode(), ViewMode::QuarterDay);
    // Already at the finest scale.
    assert!(chart.zoom_in().is_empty());
}

#[test]
fn refresh_replaces_tasks_and_recomputes_the_range() {
    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let mut chart = Gantt::new(&raws, Options::default());

    let later = vec![raw("t9", "2025-06-01", "2025-06-05", &[])];
    chart.refresh(&later);

    assert!(chart.get_task("t1").is_none());
    assert!(chart.get_task("t9").is_some());
    assert_eq!(chart.date_range().0, dt(2025, 4, 1));
}

#[test]
fn settled_scroll_position_reports_once_per_burst() {
    use std::time::{Duration, Instant};

    let raws = vec![raw("t1", "2024-01-10", "2024-01-12", &[])];
    let mut chart = Gantt::new(&raws, Options::default());

    let t0 = Instant::now();
    chart.track_scroll(120.0, t0);
    chart.track_scroll(260.0, t0 + Duration::from_millis(50));
    assert_eq!(chart.poll_scroll(t0 + Duration::from_millis(60)), None);
    assert_eq!(
        chart.poll_scroll(t0 + Duration::from_millis(200)),
        Some(260.0)
    );
    assert_eq!(chart.poll_scroll(t0 + Duration::from_millis(300)), None);
    assert_eq!(chart.scroll_position(), 260.0);
}
