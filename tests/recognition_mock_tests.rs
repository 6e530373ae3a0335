use base64::Engine as _;
use smart_jotter_lib::core::types::{DrawingData, Stroke, StrokePoint};
use smart_jotter_lib::jotter::recognition::{drawing_has_content, mock_recognize};

fn stroke(points: &[(f64, f64)]) -> Stroke {
    Stroke {
        points: points
            .iter()
            .enumerate()
            .map(|(idx, (x, y))| StrokePoint {
                x: *x,
                y: *y,
                t: (idx as i64) * 16,
            })
            .collect(),
    }
}

fn drawing_with_strokes(strokes: Vec<Stroke>) -> DrawingData {
    DrawingData {
        image_png: None,
        strokes,
        width: 600,
        height: 300,
    }
}

fn tiny_png_base64() -> String {
    let mut png = Vec::new();
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]));
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("encode png");
    base64::engine::general_purpose::STANDARD.encode(&png)
}

#[test]
fn mock_recognition_is_deterministic_for_equal_sized_input() {
    let a = drawing_with_strokes(vec![stroke(&[(1.0, 2.0), (3.0, 4.0)])]);
    // Same stroke and point counts, different coordinates.
    let b = drawing_with_strokes(vec![stroke(&[(50.0, 60.0), (70.0, 80.0)])]);

    let first = mock_recognize(&a);
    let second = mock_recognize(&b);
    assert_eq!(first, second);
}

#[test]
fn mock_recognition_returns_a_realistic_note() {
    let drawing = drawing_with_strokes(vec![stroke(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)])]);
    let result = mock_recognize(&drawing);

    assert!(result.is_mock);
    assert_eq!(result.confidence, 0.85);
    assert!(result.error.is_none());
    assert!(!result.recognized_text.trim().is_empty());
    // The rotation holds full front-desk notes, not single words.
    assert!(result.recognized_text.contains(','));
}

#[test]
fn empty_drawing_has_no_content() {
    assert!(!drawing_has_content(&drawing_with_strokes(vec![])));
    // A stroke with no points does not count either.
    assert!(!drawing_has_content(&drawing_with_strokes(vec![Stroke { points: vec![] }])));
}

#[test]
fn a_single_stroke_counts_as_content() {
    let drawing = drawing_with_strokes(vec![stroke(&[(1.0, 1.0)])]);
    assert!(drawing_has_content(&drawing));
}

#[test]
fn decodable_raster_counts_as_content() {
    let drawing = DrawingData {
        image_png: Some(tiny_png_base64()),
        strokes: vec![],
        width: 4,
        height: 4,
    };
    assert!(drawing_has_content(&drawing));
}

#[test]
fn undecodable_raster_is_not_content() {
    let drawing = DrawingData {
        image_png: Some("bm90IGEgcG5n".to_string()),
        strokes: vec![],
        width: 4,
        height: 4,
    };
    assert!(!drawing_has_content(&drawing));
}
