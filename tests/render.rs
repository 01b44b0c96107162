use continuous_canvas::draw::{Bounds, CoordinateMapper, Frame, LayerRenderer, RenderOptions};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const CLEAR: [u8; 4] = [0, 0, 0, 0];
const OPAQUE_RED: [u8; 4] = [255, 0, 0, 255];
const OPAQUE_LIME: [u8; 4] = [0, 255, 0, 255];
const OPAQUE_BLUE: [u8; 4] = [0, 0, 255, 255];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

fn unit_mapper() -> CoordinateMapper {
    CoordinateMapper::new(Bounds::new(0.0, 1.0, 0.0, 1.0), 100, 100)
}

fn renderer_with(rt: &tokio::runtime::Runtime, image_dir: &Path) -> LayerRenderer {
    let options = RenderOptions {
        image_dir: image_dir.to_path_buf(),
        ..RenderOptions::default()
    };
    LayerRenderer::new(unit_mapper(), options, rt.handle()).unwrap()
}

fn renderer(rt: &tokio::runtime::Runtime) -> LayerRenderer {
    renderer_with(rt, Path::new("local/custom"))
}

fn frame(json: &str) -> Frame {
    Frame::from_json(json).unwrap()
}

fn write_solid_png(path: &Path, rgb: (f64, f64, f64)) {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 4, 4).unwrap();
    let ctx = cairo::Context::new(&surface).unwrap();
    ctx.set_source_rgb(rgb.0, rgb.1, rgb.2);
    ctx.paint().unwrap();
    drop(ctx);
    let mut file = std::fs::File::create(path).unwrap();
    surface.write_to_png(&mut file).unwrap();
}

#[test]
fn filled_circle_paints_its_center() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"{"0": [{"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0.1,
                    "Color": "red", "Filled": true}]}"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 50), Some(OPAQUE_RED));
    assert_eq!(surface.pixel(5, 5), Some(CLEAR));
}

#[test]
fn circle_maps_onto_a_ten_pixel_disc() {
    let rt = runtime();
    let mapper = CoordinateMapper::new(Bounds::new(0.0, 10.0, 0.0, 10.0), 100, 100);
    let mut renderer = LayerRenderer::new(mapper, RenderOptions::default(), rt.handle()).unwrap();

    renderer.render(&frame(
        r#"[{"Shape": "circle", "x": 5, "y": 5, "r": 1, "Color": "red", "Filled": true}]"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 50), Some(OPAQUE_RED));
    assert_eq!(surface.pixel(50, 42), Some(OPAQUE_RED));
    assert_eq!(surface.pixel(57, 50), Some(OPAQUE_RED));
    assert_eq!(surface.pixel(50, 62), Some(CLEAR));
    assert_eq!(surface.pixel(38, 50), Some(CLEAR));
}

#[test]
fn unfilled_circle_leaves_center_clear() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"{"0": [{"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0.2, "Color": "red"}]}"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 50), Some(CLEAR));
    assert!(surface.has_ink(), "outline should be stroked");
}

#[test]
fn later_layer_covers_earlier_layer() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"{
            "0": [{"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.4, "h": 0.4,
                   "Color": "red", "Filled": true}],
            "1": [{"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.2, "h": 0.2,
                   "Color": "blue", "Filled": true}]
        }"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 50), Some(OPAQUE_BLUE));
    assert_eq!(surface.pixel(33, 50), Some(OPAQUE_RED));
}

#[test]
fn layers_paint_in_frame_order_not_key_order() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"{
            "2": [{"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.2, "h": 0.2,
                   "Color": "blue", "Filled": true}],
            "0": [{"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.2, "h": 0.2,
                   "Color": "red", "Filled": true}]
        }"#,
    ));

    assert_eq!(renderer.surface().pixel(50, 50), Some(OPAQUE_RED));
}

#[test]
fn logical_y_grows_upward() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 0.5, "y": 0.9, "w": 0.1, "h": 0.1,
              "Color": "red", "Filled": true}]"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 10), Some(OPAQUE_RED));
    assert_eq!(surface.pixel(50, 90), Some(CLEAR));
}

#[test]
fn render_replaces_previous_frame() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 0.2, "y": 0.2, "w": 0.1, "h": 0.1,
              "Color": "red", "Filled": true}]"#,
    ));
    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 0.8, "y": 0.8, "w": 0.1, "h": 0.1,
              "Color": "blue", "Filled": true}]"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(20, 80), Some(CLEAR));
    assert_eq!(surface.pixel(80, 20), Some(OPAQUE_BLUE));
}

#[test]
fn reset_then_empty_render_leaves_surface_clear() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0.3, "Color": "red", "Filled": true}]"#,
    ));
    assert!(renderer.surface().has_ink());

    renderer.reset();
    renderer.render(&frame("{}"));
    assert!(!renderer.surface().has_ink());
}

#[test]
fn arrow_follows_its_angle() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "arrow", "x": 0.2, "y": 0.5, "angle": 0, "length": 0.6,
              "width": 0.3, "Color": "lime", "Filled": true}]"#,
    ));
    assert_eq!(renderer.surface().pixel(40, 50), Some(OPAQUE_LIME));
    assert_eq!(renderer.surface().pixel(20, 30), Some(CLEAR));

    renderer.render(&frame(
        r#"[{"Shape": "arrow", "x": 0.2, "y": 0.5, "angle": 1.5707963267948966,
              "length": 0.6, "width": 0.3, "Color": "lime", "Filled": true}]"#,
    ));
    assert_eq!(renderer.surface().pixel(20, 30), Some(OPAQUE_LIME));
    assert_eq!(renderer.surface().pixel(40, 50), Some(CLEAR));
}

#[test]
fn degenerate_records_do_not_stop_the_pass() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[
            {"x": 0.1, "y": 0.1},
            {"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0, "Color": "red", "Filled": true},
            {"Shape": "rect", "x": 0.5, "y": 0.5, "Color": "nonsense", "Filled": true},
            {"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.2, "h": 0.2,
             "Color": "blue", "Filled": true}
        ]"#,
    ));

    assert_eq!(renderer.surface().pixel(50, 50), Some(OPAQUE_BLUE));
}

#[test]
fn invalid_bounds_draw_nothing() {
    let rt = runtime();
    let mapper = CoordinateMapper::new(Bounds::new(1.0, 1.0, 0.0, 1.0), 50, 50);
    let mut renderer = LayerRenderer::new(mapper, RenderOptions::default(), rt.handle()).unwrap();

    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 1.0, "y": 0.5, "w": 0.2, "h": 0.2,
              "Color": "red", "Filled": true}]"#,
    ));

    assert!(!renderer.surface().has_ink());
}

#[test]
fn label_is_drawn_without_a_visible_shape() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0, "text": "W", "text_color": "black"}]"#,
    ));

    assert!(renderer.surface().has_ink());
}

#[test]
fn background_is_painted_on_every_pass() {
    let rt = runtime();
    let options = RenderOptions {
        background: Some(continuous_canvas::draw::WHITE),
        ..RenderOptions::default()
    };
    let mut renderer = LayerRenderer::new(unit_mapper(), options, rt.handle()).unwrap();

    renderer.render(&frame("{}"));
    assert_eq!(renderer.surface().pixel(0, 0), Some([255, 255, 255, 255]));

    renderer.reset();
    assert_eq!(renderer.surface().pixel(99, 99), Some([255, 255, 255, 255]));
}

#[test]
fn custom_image_is_painted_once_loaded() {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    write_solid_png(&dir.path().join("sheep.png"), (0.0, 0.0, 1.0));
    let mut renderer = renderer_with(&rt, dir.path());

    renderer.render(&frame(
        r#"[{"Shape": "sheep.png", "x": 0.5, "y": 0.5, "size": 0.2}]"#,
    ));
    assert_eq!(renderer.pending_images(), 1);

    assert_eq!(renderer.finish_images(), 1);
    assert_eq!(renderer.pending_images(), 0);

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 50), Some(OPAQUE_BLUE));
    assert_eq!(surface.pixel(45, 45), Some(OPAQUE_BLUE));
    assert_eq!(surface.pixel(30, 30), Some(CLEAR));
}

#[test]
fn missing_image_is_skipped() {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    let mut renderer = renderer_with(&rt, dir.path());

    renderer.render(&frame(
        r#"[
            {"Shape": "ghost.png", "x": 0.5, "y": 0.5, "size": 0.5},
            {"Shape": "rect", "x": 0.2, "y": 0.2, "w": 0.1, "h": 0.1, "Color": "red", "Filled": true}
        ]"#,
    ));

    assert_eq!(renderer.finish_images(), 0);
    assert_eq!(renderer.pending_images(), 0);
    assert_eq!(renderer.surface().pixel(50, 50), Some(CLEAR));
    assert_eq!(renderer.surface().pixel(20, 80), Some(OPAQUE_RED));
}

#[test]
fn stale_image_never_paints_over_newer_frame() {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    write_solid_png(&dir.path().join("sheep.png"), (0.0, 0.0, 1.0));
    let mut renderer = renderer_with(&rt, dir.path());

    renderer.render(&frame(
        r#"[{"Shape": "sheep.png", "x": 0.5, "y": 0.5, "size": 0.4}]"#,
    ));
    let first_generation = renderer.generation();
    renderer.render(&frame("{}"));
    assert!(renderer.generation() > first_generation);
    assert_eq!(renderer.pending_images(), 0);

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(renderer.pump_images(), 0);
    assert_eq!(renderer.finish_images(), 0);
    assert!(!renderer.surface().has_ink());
}

#[test]
fn surface_writes_png() {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    let mut renderer = renderer(&rt);
    renderer.render(&frame(
        r#"[{"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0.25, "Color": ["red", "blue"], "Filled": true}]"#,
    ));

    let path = dir.path().join("frame.png");
    renderer.write_png(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = cairo::ImageSurface::create_from_png(&mut bytes.as_slice()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 100));
}

#[test]
fn malformed_record_does_not_drop_the_frame() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"{"0": [
            {"Shape": "rect", "x": "left", "y": 0},
            {"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.2, "h": 0.2,
             "Color": "blue", "Filled": true, "text": 7}
        ]}"#,
    ));

    assert_eq!(renderer.surface().pixel(50, 50).map(|p| p[3]), Some(255));
    assert_eq!(renderer.surface().pixel(42, 42), Some(OPAQUE_BLUE));
}

#[test]
fn rect_gradient_runs_corner_to_corner() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.4, "h": 0.4,
              "Color": ["red", "blue"], "Filled": true}]"#,
    ));

    let surface = renderer.surface();
    // The second stop sits at 0.5, so past the diagonal midpoint it pads blue.
    assert_eq!(surface.pixel(60, 60), Some(OPAQUE_BLUE));
    let [r, _, b, a] = surface.pixel(30, 30).unwrap();
    assert!(r >= 230 && b <= 25 && a == 255, "top-left corner {:?}", [r, b, a]);
    let [r, _, b, _] = surface.pixel(45, 45).unwrap();
    assert!(r > 0 && b > 0, "blend before the midpoint {:?}", [r, b]);
}

#[test]
fn circle_gradient_runs_from_rim_to_center() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "circle", "x": 0.5, "y": 0.5, "r": 0.3,
              "Color": ["red", "blue"], "Filled": true}]"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(50, 50), Some(OPAQUE_BLUE));
    assert_eq!(surface.pixel(50, 38), Some(OPAQUE_BLUE));
    let [r, _, b, a] = surface.pixel(50, 22).unwrap();
    assert!(r > b && a == 255, "near the rim {:?}", [r, b, a]);
}

#[test]
fn arrow_gradient_spans_its_bounding_box() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "arrow", "x": 0.2, "y": 0.5, "angle": 0, "length": 0.6,
              "width": 0.3, "Color": ["red", "blue"], "Filled": true}]"#,
    ));

    let surface = renderer.surface();
    assert_eq!(surface.pixel(75, 50), Some(OPAQUE_BLUE));
    let [r, _, b, _] = surface.pixel(21, 50).unwrap();
    assert!(r > b, "tail {:?}", [r, b]);
    let [r, _, b, _] = surface.pixel(40, 50).unwrap();
    assert!(r > 0 && b > 0, "shaft {:?}", [r, b]);
}

#[test]
fn x_align_shifts_rect_right() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 0.2, "y": 0.5, "w": 0.1, "h": 0.1,
              "Color": "red", "Filled": true, "xAlign": 0.3}]"#,
    ));

    assert_eq!(renderer.surface().pixel(50, 50), Some(OPAQUE_RED));
    assert_eq!(renderer.surface().pixel(20, 50), Some(CLEAR));
}

#[test]
fn positive_y_align_shifts_rect_down() {
    let rt = runtime();
    let mut renderer = renderer(&rt);

    renderer.render(&frame(
        r#"[{"Shape": "rect", "x": 0.5, "y": 0.5, "w": 0.1, "h": 0.1,
              "Color": "red", "Filled": true, "yAlign": 0.2}]"#,
    ));

    assert_eq!(renderer.surface().pixel(50, 70), Some(OPAQUE_RED));
    assert_eq!(renderer.surface().pixel(50, 50), Some(CLEAR));
}

#[test]
fn image_ignores_alignment() {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    write_solid_png(&dir.path().join("sheep.png"), (0.0, 0.0, 1.0));
    let mut renderer = renderer_with(&rt, dir.path());

    renderer.render(&frame(
        r#"[{"Shape": "sheep.png", "x": 0.5, "y": 0.5, "size": 0.2, "xAlign": 0.3}]"#,
    ));
    assert_eq!(renderer.finish_images(), 1);

    assert_eq!(renderer.surface().pixel(50, 50), Some(OPAQUE_BLUE));
    assert_eq!(renderer.surface().pixel(80, 50), Some(CLEAR));
}
