use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use image::{ColorType, DynamicImage, GenericImageView};
use inset_lens::canvas::{CanvasEvent, MagCanvas, SkipReason, UpdateOutcome};
use inset_lens::config::CanvasConfig;
use inset_lens::geometry::{PixelRect, Point, Rectangle};
use inset_lens::inset::{Corner, Mode, ZoomRatio};
use inset_lens::sample::{sample_pattern, write_sample};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("inset_lens_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

fn session(width: u32, height: u32) -> MagCanvas {
    MagCanvas::with_image(
        CanvasConfig::default(),
        DynamicImage::ImageRgba8(sample_pattern(width, height)),
    )
}

#[test]
fn scenario_right_bottom_through_the_session() {
    let mut canvas = session(200, 200);
    canvas.set_corner(Corner::RightBottom).expect("corner");
    canvas.set_mode(Mode::Diagonal).expect("mode");
    canvas.update_image(25).expect("zoom");
    assert_eq!(canvas.zoom_ratio(), ZoomRatio::new(2.0));

    let outcome = canvas
        .set_rectangle(Rectangle::from_coords(10, 10, 50, 50))
        .expect("render failed");
    let UpdateOutcome::Rendered(layout) = outcome else {
        panic!("expected a render, got {outcome:?}");
    };
    assert_eq!(layout.region, PixelRect::new(110, 110, 90, 90));
    assert_eq!(layout.connectors[0].start, Point::new(10, 50));
    assert_eq!(layout.connectors[0].end, Point::new(110, 200));
    assert_eq!(layout.connectors[1].start, Point::new(50, 10));
    assert_eq!(layout.connectors[1].end, Point::new(200, 110));
}

#[test]
fn reversed_drag_matches_forward_drag() {
    let mut forward = session(200, 200);
    forward.pointer_pressed(Point::new(20, 30));
    forward.pointer_released(Point::new(60, 70)).expect("forward");

    let mut backward = session(200, 200);
    backward.pointer_pressed(Point::new(60, 70));
    backward.pointer_moved(Point::new(40, 40));
    backward.pointer_released(Point::new(20, 30)).expect("backward");

    assert_eq!(forward.image(), backward.image());
    assert_eq!(
        forward.last_layout().map(|l| l.source),
        Some(PixelRect::new(20, 30, 40, 40))
    );
}

#[test]
fn degenerate_rectangle_leaves_display_unchanged() {
    let mut canvas = session(200, 200);
    canvas
        .set_rectangle(Rectangle::from_coords(10, 10, 50, 50))
        .expect("first render");
    let before = canvas.image().cloned();

    let outcome = canvas
        .set_rectangle(Rectangle::from_coords(30, 30, 30, 30))
        .expect("degenerate");
    assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::Degenerate));
    assert_eq!(canvas.image().cloned(), before);
}

#[test]
fn flat_rectangle_leaves_display_unchanged() {
    let mut canvas = session(100, 100);
    for rect in [
        Rectangle::from_coords(30, 10, 30, 60),
        Rectangle::from_coords(10, 40, 70, 40),
    ] {
        let outcome = canvas.set_rectangle(rect).expect("flat");
        assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::Flat));
        assert_eq!(canvas.image(), canvas.original());
    }
}

#[test]
fn oversized_margin_still_renders_inside_the_image() {
    let config = CanvasConfig {
        margin: 3_000_000_000,
        ..CanvasConfig::default()
    };
    let mut canvas = MagCanvas::with_image(
        config,
        DynamicImage::ImageRgba8(sample_pattern(120, 80)),
    );
    let outcome = canvas
        .set_rectangle(Rectangle::from_coords(10, 10, 30, 30))
        .expect("render");
    let UpdateOutcome::Rendered(layout) = outcome else {
        panic!("expected a render, got {outcome:?}");
    };
    assert_eq!(layout.margin, 40);
    assert!(PixelRect::new(0, 0, 120, 80).contains_rect(&layout.region));
    assert_eq!(canvas.image().map(|i| i.dimensions()), Some((120, 80)));
}

#[test]
fn selection_outside_image_is_skipped() {
    let mut canvas = session(100, 100);
    let outcome = canvas
        .set_rectangle(Rectangle::from_coords(150, 150, 180, 190))
        .expect("outside");
    assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::OutsideImage));
    assert_eq!(canvas.image(), canvas.original());
}

#[test]
fn update_is_idempotent_and_starts_from_the_original() {
    let mut canvas = session(180, 120);
    canvas
        .set_rectangle(Rectangle::from_coords(40, 30, 70, 60))
        .expect("render");
    canvas.update_image(60).expect("zoom 60");
    let first = canvas.image().cloned();
    canvas.update_image(60).expect("zoom 60 again");
    assert_eq!(canvas.image().cloned(), first);

    // A different corner does not keep the previous inset around.
    canvas.set_corner(Corner::LeftUp).expect("corner");
    canvas.set_corner(Corner::LeftBottom).expect("corner back");
    assert_eq!(canvas.image().cloned(), first);
}

#[test]
fn reset_restores_original_pixels() {
    let mut canvas = session(150, 150);
    canvas
        .set_rectangle(Rectangle::from_coords(5, 5, 45, 45))
        .expect("render");
    assert_ne!(canvas.image(), canvas.original());

    canvas.reset();
    assert_eq!(canvas.image(), canvas.original());
    assert!(canvas.last_layout().is_none());
    assert_eq!(canvas.rectangle(), Some(Rectangle::from_coords(5, 5, 45, 45)));

    let mut fresh = session(150, 150);
    assert_eq!(
        fresh.update_image(40).expect("no rectangle"),
        UpdateOutcome::Skipped(SkipReason::NoSelection)
    );
    assert_eq!(fresh.image(), fresh.original());
}

#[test]
fn load_resize_save_round_trip() {
    let dir = scratch_dir("round_trip");
    let input = dir.join("pattern.png");
    write_sample(&input, 400, 200).expect("write sample");

    let config = CanvasConfig {
        resolution: Some(200),
        ..CanvasConfig::default()
    };
    let mut canvas = MagCanvas::new(config);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    canvas.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    assert_eq!(canvas.load(&input).expect("load"), (200, 100));
    canvas
        .set_rectangle(Rectangle::from_coords(10, 10, 30, 30))
        .expect("render");

    let output = dir.join("nested").join("pattern_inset.jpg");
    let bytes = canvas.save(&output).expect("save");
    assert!(bytes > 0);

    let written = image::open(&output).expect("reopen");
    assert_eq!(written.dimensions(), (400, 200));
    assert_eq!(written.color(), ColorType::Rgb8);

    let events = events.borrow();
    assert_eq!(events.first(), Some(&CanvasEvent::ImageLoaded { width: 200, height: 100 }));
    assert!(matches!(events.last(), Some(CanvasEvent::Saved { bytes: b, .. }) if *b == bytes));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn loading_a_new_image_clears_the_selection() {
    let dir = scratch_dir("reload");
    let input = dir.join("small.png");
    write_sample(&input, 64, 64).expect("write sample");

    let mut canvas = session(100, 100);
    canvas
        .set_rectangle(Rectangle::from_coords(10, 10, 40, 40))
        .expect("render");
    canvas.set_corner(Corner::RightUp).expect("corner");

    canvas.load(&input).expect("load");
    assert_eq!(canvas.rectangle(), None);
    assert_eq!(canvas.corner(), Corner::RightUp);
    assert_eq!(canvas.image(), canvas.original());

    assert!(canvas.load(&dir.join("missing.png")).is_err());
    fs::remove_dir_all(&dir).ok();
}
