use super::*;

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(w, h, image::Rgb(rgb))
}

fn is_black(img: &RgbImage, x: u32, y: u32) -> bool {
    img.get_pixel(x, y).0 == [0, 0, 0]
}

#[test]
fn widescreen_layout_matches_reference_numbers() {
    let layout = CanvasLayout::compute(CanvasSize::new(1920, 1080), 0.9).unwrap();
    assert_eq!(
        layout,
        CanvasLayout {
            target_size: 972,
            offset_x: 474,
            offset_y: 54,
        }
    );
}

#[test]
fn portrait_canvas_uses_width_as_short_edge() {
    let layout = CanvasLayout::compute(CanvasSize::new(1000, 1600), 0.5).unwrap();
    assert_eq!(layout.target_size, 500);
    assert_eq!(layout.offset_x, 250);
    assert_eq!(layout.offset_y, 550);
}

#[test]
fn invalid_cover_ratio_is_composition_error() {
    for ratio in [0.0, -0.5, 1.01, f64::NAN] {
        let err = CanvasLayout::compute(CanvasSize::new(100, 100), ratio).unwrap_err();
        assert!(matches!(err, HimawariError::Composition(_)), "{ratio}");
    }
    assert!(CanvasLayout::compute(CanvasSize::new(0, 100), 0.5).is_err());
    assert!(CanvasLayout::compute(CanvasSize::new(10, 10), 0.01).is_err());
}

#[test]
fn full_cover_on_square_canvas_has_no_border() {
    let composite = solid(40, 40, [200, 100, 50]);
    let out = compose_canvas(&composite, CanvasSize::new(64, 64), 1.0, FilterType::Lanczos3)
        .unwrap();
    assert_eq!(out.dimensions(), (64, 64));
    for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63), (32, 32)] {
        assert_eq!(out.get_pixel(x, y).0, [200, 100, 50], "({x},{y})");
    }
}

#[test]
fn half_cover_leaves_quarter_border_each_side() {
    let composite = solid(30, 30, [255, 255, 255]);
    let out = compose_canvas(&composite, CanvasSize::new(100, 100), 0.5, FilterType::Nearest)
        .unwrap();

    // border = 100 * 0.25 = 25 on every side
    assert!(is_black(&out, 24, 50));
    assert!(!is_black(&out, 25, 50));
    assert!(!is_black(&out, 74, 50));
    assert!(is_black(&out, 75, 50));
    assert!(is_black(&out, 50, 24));
    assert!(!is_black(&out, 50, 25));
    assert!(!is_black(&out, 50, 74));
    assert!(is_black(&out, 50, 75));
}

#[test]
fn composite_is_centered_on_wide_canvas() {
    let composite = solid(16, 16, [10, 200, 10]);
    let out = compose_canvas(&composite, CanvasSize::new(192, 108), 0.9, FilterType::Triangle)
        .unwrap();
    // target = floor(108 * 0.9) = 97, offsets (47, 5)
    assert!(is_black(&out, 46, 54));
    assert_eq!(out.get_pixel(47, 54).0, [10, 200, 10]);
    assert_eq!(out.get_pixel(143, 54).0, [10, 200, 10]);
    assert!(is_black(&out, 144, 54));
    assert!(is_black(&out, 96, 4));
    assert_eq!(out.get_pixel(96, 5).0, [10, 200, 10]);
    assert_eq!(out.get_pixel(96, 101).0, [10, 200, 10]);
    assert!(is_black(&out, 96, 102));
}

#[test]
fn empty_composite_is_rejected() {
    let err = compose_canvas(
        &RgbImage::new(0, 0),
        CanvasSize::new(10, 10),
        1.0,
        FilterType::Nearest,
    )
    .unwrap_err();
    assert!(matches!(err, HimawariError::Composition(_)));
}
