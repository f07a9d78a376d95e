use doc_watermark_removal::{ClassifyParams, Error, ProcessOptions, WatermarkEngine};
use image::{Rgb, RgbImage};

const PARAMS: ClassifyParams = ClassifyParams {
    threshold: 200,
    tolerance: 20,
};

/// 10x10 image of (50,50,50) with a 3x3 (240,240,240) block at the origin.
fn watermarked_test_image() -> RgbImage {
    let mut img = RgbImage::from_pixel(10, 10, Rgb([50, 50, 50]));
    for y in 0..3 {
        for x in 0..3 {
            img.put_pixel(x, y, Rgb([240, 240, 240]));
        }
    }
    img
}

#[test]
fn watermark_block_is_replaced_with_surrounding_background() {
    let engine = WatermarkEngine::new();
    let img = watermarked_test_image();
    let cleaned = engine.clean_image(&img, PARAMS);

    // The bright block picks up the surrounding background exactly, since
    // every qualifying neighbor is (50,50,50).
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(
                *cleaned.get_pixel(x, y),
                Rgb([50, 50, 50]),
                "block pixel ({x},{y}) was not replaced"
            );
        }
    }

    // Everything outside the block is untouched.
    for (x, y, px) in cleaned.enumerate_pixels() {
        if x >= 3 || y >= 3 {
            assert_eq!(*px, Rgb([50, 50, 50]), "pixel ({x},{y}) changed");
        }
    }
}

#[test]
fn clean_image_never_mutates_its_input() {
    let engine = WatermarkEngine::new();
    let img = watermarked_test_image();
    let snapshot = img.clone();

    let _cleaned = engine.clean_image(&img, PARAMS);
    assert_eq!(img, snapshot);
}

#[test]
fn clean_image_preserves_dimensions() {
    let engine = WatermarkEngine::new();
    for (w, h) in [(1, 1), (7, 3), (10, 10), (33, 17)] {
        let img = RgbImage::new(w, h);
        let cleaned = engine.clean_image(&img, PARAMS);
        assert_eq!(cleaned.dimensions(), (w, h));
    }
}

#[test]
fn clean_image_is_deterministic_across_runs() {
    let engine = WatermarkEngine::new();
    let first = engine.clean_image(&watermarked_test_image(), PARAMS);
    let second = engine.clean_image(&watermarked_test_image(), PARAMS);
    assert_eq!(first, second);
}

#[test]
fn fully_watermark_like_image_is_left_in_place() {
    // Estimation falls back to the original color when every neighbor is
    // itself watermark-like.
    let engine = WatermarkEngine::new();
    let img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
    let cleaned = engine.clean_image(&img, PARAMS);
    assert_eq!(cleaned, img);
}

#[test]
fn clean_image_bytes_round_trips_png() {
    let engine = WatermarkEngine::new();
    let img = watermarked_test_image();

    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

    let outcome = engine
        .clean_image_bytes(bytes.get_ref(), "png", PARAMS)
        .unwrap();
    assert!(!outcome.is_fallback());

    let decoded = image::load_from_memory(outcome.bytes()).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (10, 10));
    assert_eq!(*decoded.get_pixel(0, 0), Rgb([50, 50, 50]));
}

#[test]
fn clean_image_bytes_rejects_undecodable_input() {
    let engine = WatermarkEngine::new();
    let result = engine.clean_image_bytes(b"definitely not an image", "png", PARAMS);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn process_file_writes_cleaned_output() {
    let engine = WatermarkEngine::new();
    let dir = tempfile::tempdir().unwrap();

    let input = dir.path().join("scan.png");
    watermarked_test_image().save(&input).unwrap();

    let output = dir.path().join("out/scan_nowatermark.png");
    let opts = ProcessOptions {
        threshold: 200,
        tolerance: 20,
        ..ProcessOptions::default()
    };
    let result = engine.process_file(&input, &output, &opts);

    assert!(result.success, "{}", result.message);
    assert!(!result.fell_back);

    let written = image::open(&output).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (10, 10));
    assert_eq!(*written.get_pixel(1, 1), Rgb([50, 50, 50]));
}

#[test]
fn process_file_reports_missing_input() {
    let engine = WatermarkEngine::new();
    let dir = tempfile::tempdir().unwrap();

    let result = engine.process_file(
        &dir.path().join("nope.png"),
        &dir.path().join("out.png"),
        &ProcessOptions::default(),
    );
    assert!(!result.success);
    assert!(result.message.contains("Failed to read"));
}

#[test]
fn process_directory_handles_each_supported_image() {
    let engine = WatermarkEngine::new();
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");

    watermarked_test_image()
        .save(dir.path().join("a.png"))
        .unwrap();
    watermarked_test_image()
        .save(dir.path().join("b.png"))
        .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

    let results = engine.process_directory(dir.path(), &out_dir, &ProcessOptions::default());
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success));
    assert!(out_dir.join("a.png").exists());
    assert!(out_dir.join("b.png").exists());
}
