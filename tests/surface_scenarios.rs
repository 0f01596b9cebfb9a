use image::RgbaImage;
use roof_sketch::draw::{Color, DrawingSurface, Point, RenderMode, UploadOutcome};
use roof_sketch::settings::SurfaceSettings;
use std::io::Cursor;

fn surface() -> DrawingSurface {
    DrawingSurface::new(&SurfaceSettings::default())
}

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

fn png_of(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn uniform(img: &RgbaImage, rgba: [u8; 4]) -> bool {
    img.pixels().all(|px| px.0 == rgba)
}

#[test]
fn enabled_gesture_captures_exact_point_order() {
    let mut surface = surface();
    surface.enable_drawing();
    let coords: Vec<Point> = (0..50)
        .map(|i| p((i * 7 % 800) as f32, (i * 13 % 500) as f32))
        .collect();

    surface.pointer_press(coords[0]);
    for point in &coords[1..] {
        surface.pointer_move(*point);
    }
    surface.pointer_release();

    assert_eq!(surface.points().as_slice(), coords.as_slice());
}

#[test]
fn moves_without_tracing_never_capture() {
    let mut surface = surface();
    surface.pointer_move(p(1.0, 1.0));
    surface.enable_drawing();
    surface.pointer_move(p(2.0, 2.0));
    surface.disable_drawing();
    surface.pointer_move(p(3.0, 3.0));

    assert!(surface.points().is_empty());
    assert!(uniform(surface.bitmap().expect("mounted"), [0, 0, 0, 0]));
}

#[test]
fn press_while_disabled_does_not_start_tracing() {
    let mut surface = surface();
    assert!(!surface.pointer_press(p(5.0, 5.0)));
    assert!(!surface.pointer_move(p(6.0, 6.0)));
    assert!(!surface.state().is_tracing());
    assert!(surface.points().is_empty());
}

// Disabling mid-stroke keeps the stroke alive until the pointer is released.
#[test]
fn disable_during_trace_keeps_capturing_until_release() {
    let mut surface = surface();
    surface.enable_drawing();
    surface.pointer_press(p(10.0, 10.0));
    surface.pointer_move(p(11.0, 10.0));
    surface.disable_drawing();

    assert!(surface.state().is_tracing());
    assert!(surface.pointer_move(p(12.0, 10.0)));
    assert_eq!(surface.points().len(), 3);

    surface.pointer_release();
    assert!(!surface.pointer_move(p(13.0, 10.0)));
    assert_eq!(surface.points().len(), 3);
}

#[test]
fn three_point_trace_renders_two_connected_segments() {
    let mut surface = surface();
    surface.enable_drawing();
    surface.pointer_press(p(10.0, 10.0));
    surface.pointer_move(p(20.0, 10.0));
    surface.pointer_move(p(30.0, 10.0));
    surface.pointer_release();

    assert_eq!(
        surface.points().as_slice(),
        &[p(10.0, 10.0), p(20.0, 10.0), p(30.0, 10.0)]
    );

    let bitmap = surface.bitmap().expect("mounted");
    for x in 10..=30 {
        assert_eq!(bitmap.get_pixel(x, 10).0, [0, 0, 0, 255], "x = {x}");
    }
    let painted = bitmap.pixels().filter(|px| px.0[3] != 0).count();
    assert_eq!(painted, 21);
}

#[test]
fn clear_resets_points_and_bitmap_and_is_idempotent() {
    let settings = SurfaceSettings {
        background: Color::rgba(255, 255, 255, 255),
        stroke_width: 4,
        ..SurfaceSettings::default()
    };
    let mut surface = DrawingSurface::new(&settings);
    surface.enable_drawing();
    surface.pointer_press(p(100.0, 100.0));
    surface.pointer_move(p(300.0, 250.0));
    surface.pointer_release();
    assert_eq!(
        surface.upload_image(Some(png_of(3, 3, [0, 255, 0, 255]).as_slice())),
        UploadOutcome::Applied
    );

    surface.clear();
    let once = surface.bitmap().expect("mounted").clone();
    assert!(surface.points().is_empty());
    assert!(uniform(&once, [255, 255, 255, 255]));

    surface.clear();
    assert!(surface.points().is_empty());
    assert_eq!(surface.bitmap().expect("mounted"), &once);
    assert!(surface.state().drawing_enabled());
}

#[test]
fn uploaded_image_is_stretched_over_whole_surface() {
    let mut surface = surface();
    let outcome = surface.upload_image(Some(png_of(100, 100, [255, 0, 0, 255]).as_slice()));

    assert_eq!(outcome, UploadOutcome::Applied);
    let bitmap = surface.bitmap().expect("mounted");
    assert_eq!(bitmap.dimensions(), (800, 500));
    assert!(uniform(bitmap, [255, 0, 0, 255]));
}

#[test]
fn export_after_clear_is_uniform_background() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut surface = surface();
    surface.enable_drawing();
    surface.pointer_press(p(1.0, 1.0));
    surface.pointer_move(p(50.0, 50.0));
    surface.clear();

    let exported = surface
        .export_to(dir.path())
        .expect("export")
        .expect("mounted surface exports");
    assert_eq!(exported.path, dir.path().join("drawing.png"));
    assert_eq!((exported.width, exported.height), (800, 500));

    let on_disk = image::open(&exported.path).expect("open export").to_rgba8();
    assert_eq!(on_disk.dimensions(), (800, 500));
    assert!(uniform(&on_disk, [0, 0, 0, 0]));
}

#[test]
fn export_reflects_polyline_over_uploaded_image() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut surface = surface();
    surface.upload_image(Some(png_of(10, 10, [0, 0, 255, 255]).as_slice()));
    surface.enable_drawing();
    surface.pointer_press(p(0.0, 0.0));
    surface.pointer_move(p(10.0, 0.0));

    let exported = surface.export_to(dir.path()).expect("export").expect("mounted");
    let on_disk = image::open(&exported.path).expect("open export").to_rgba8();
    assert_eq!(&on_disk, surface.bitmap().expect("mounted"));
    assert_eq!(on_disk.get_pixel(5, 0).0, [0, 0, 0, 255]);
    assert_eq!(on_disk.get_pixel(5, 5).0, [0, 0, 255, 255]);
}

#[test]
fn corrupt_upload_leaves_bitmap_untouched() {
    let mut surface = surface();
    surface.enable_drawing();
    surface.pointer_press(p(4.0, 4.0));
    surface.pointer_move(p(40.0, 4.0));
    let before = surface.bitmap().expect("mounted").clone();
    let revision = surface.revision();

    let outcome = surface.upload_image(Some(&b"\x89PNG\r\n\x1a\nbroken"[..]));

    assert_eq!(outcome, UploadOutcome::DecodeFailed);
    assert_eq!(surface.bitmap().expect("mounted"), &before);
    assert_eq!(surface.revision(), revision);
}

#[test]
fn upload_without_file_is_a_no_op() {
    let mut surface = surface();
    let revision = surface.revision();
    assert_eq!(surface.upload_image(None), UploadOutcome::NoFile);
    assert_eq!(surface.revision(), revision);
}

// Uploading keeps the captured points; a full redraw puts the old polyline
// back on top of the new image.
#[test]
fn upload_keeps_points_and_full_redraw_restores_stale_polyline() {
    let settings = SurfaceSettings {
        render_mode: RenderMode::FullRedraw,
        ..SurfaceSettings::default()
    };
    let mut surface = DrawingSurface::new(&settings);
    surface.enable_drawing();
    surface.pointer_press(p(10.0, 10.0));
    surface.pointer_move(p(20.0, 10.0));
    surface.pointer_release();

    surface.upload_image(Some(png_of(8, 8, [255, 255, 0, 255]).as_slice()));
    assert_eq!(surface.points().len(), 2);
    assert_eq!(
        surface.bitmap().expect("mounted").get_pixel(15, 10).0,
        [255, 255, 0, 255]
    );

    surface.pointer_press(p(100.0, 100.0));
    let bitmap = surface.bitmap().expect("mounted");
    assert_eq!(bitmap.get_pixel(15, 10).0, [0, 0, 0, 255]);
    // The new press connects to the stale polyline.
    assert_eq!(bitmap.get_pixel(60, 55).0, [0, 0, 0, 255]);
}

// The default incremental mode still puts the whole polyline back on top of
// an uploaded image at the next append.
#[test]
fn incremental_mode_redraws_whole_polyline_after_upload() {
    let mut surface = surface();
    surface.enable_drawing();
    surface.pointer_press(p(10.0, 10.0));
    surface.pointer_move(p(20.0, 10.0));
    surface.upload_image(Some(png_of(8, 8, [255, 255, 0, 255]).as_slice()));
    assert_eq!(
        surface.bitmap().expect("mounted").get_pixel(15, 10).0,
        [255, 255, 0, 255]
    );

    surface.pointer_move(p(30.0, 10.0));
    let bitmap = surface.bitmap().expect("mounted");
    assert_eq!(bitmap.get_pixel(15, 10).0, [0, 0, 0, 255]);
    assert_eq!(bitmap.get_pixel(25, 10).0, [0, 0, 0, 255]);
    assert_eq!(bitmap.get_pixel(15, 11).0, [255, 255, 0, 255]);

    // Later appends are incremental again and keep the same picture.
    surface.pointer_move(p(30.0, 20.0));
    let bitmap = surface.bitmap().expect("mounted");
    assert_eq!(bitmap.get_pixel(15, 10).0, [0, 0, 0, 255]);
    assert_eq!(bitmap.get_pixel(30, 15).0, [0, 0, 0, 255]);
}

#[test]
fn upload_then_clear_then_draw_strokes_only_new_points() {
    let mut surface = surface();
    surface.enable_drawing();
    surface.pointer_press(p(10.0, 10.0));
    surface.pointer_move(p(20.0, 10.0));
    surface.upload_image(Some(png_of(8, 8, [255, 255, 0, 255]).as_slice()));
    surface.clear();

    surface.pointer_press(p(2.0, 2.0));
    let bitmap = surface.bitmap().expect("mounted");
    assert_eq!(bitmap.get_pixel(15, 10).0, [0, 0, 0, 0]);
    assert_eq!(bitmap.get_pixel(2, 2).0, [0, 0, 0, 255]);
}
