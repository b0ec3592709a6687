use haruspex::capture::CaptureMetadata;
use haruspex::decode::DecodedImage;
use haruspex::signals;
use haruspex::types::{ImageFormat, MetaValue, MetadataMap};
use image::DynamicImage;

fn decoded(
    format: ImageFormat,
    metadata: MetadataMap,
    icc_profile: Option<Vec<u8>>,
) -> DecodedImage {
    DecodedImage {
        pixels: DynamicImage::new_rgb8(10, 10),
        format,
        mode: "RGB",
        width: 10,
        height: 10,
        icc_profile,
        metadata,
    }
}

fn text_entry(key: &str, value: &str) -> MetadataMap {
    let mut map = MetadataMap::new();
    map.insert(key.to_string(), MetaValue::Text(value.to_string()));
    map
}

#[test]
fn test_screenshot_filename_sets_heuristic() {
    let img = decoded(ImageFormat::Png, MetadataMap::new(), None);
    let signals = signals::extract(&img, None, "Screenshot_20240101-092300.png", 100);
    assert!(signals.is_screenshot_heuristic);
    assert!(signals.has_origin(signals::ORIGIN_SCREENSHOT_FILENAME));
}

#[test]
fn test_social_filename_tags_origin_without_heuristic() {
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    let signals = signals::extract(&img, None, "FB_IMG_facebook_123.jpg", 100);
    assert!(!signals.is_screenshot_heuristic);
    assert!(signals.has_origin(signals::ORIGIN_SOCIAL_FILENAME));
}

#[test]
fn test_ai_generator_in_container_metadata() {
    let img = decoded(
        ImageFormat::Png,
        text_entry("Comment", "generated with Stable Diffusion"),
        None,
    );
    let signals = signals::extract(&img, None, "art.png", 100);
    assert!(signals.ai_generated);
    assert!(signals.has_origin(signals::ORIGIN_AI_METADATA));
}

#[test]
fn test_software_key_records_software_and_screenshot_tool() {
    let img = decoded(
        ImageFormat::Png,
        text_entry("Software", "GNOME Screenshot"),
        None,
    );
    let signals = signals::extract(&img, None, "img.png", 100);
    assert!(signals.is_screenshot_heuristic);
    assert!(signals.has_origin(signals::ORIGIN_SCREENSHOT_SOFTWARE));
    assert!(signals.software().any(|s| s == "gnome screenshot"));
}

#[test]
fn test_non_software_key_value_not_recorded_as_software() {
    let img = decoded(
        ImageFormat::Png,
        text_entry("Comment", "made in photoshop probably"),
        None,
    );
    let signals = signals::extract(&img, None, "img.png", 100);
    assert_eq!(signals.software().count(), 0);
}

#[test]
fn test_exif_editing_software_sets_edited() {
    let capture = CaptureMetadata {
        software: Some("Adobe Photoshop 25.0 (Macintosh)".to_string()),
        ..CaptureMetadata::default()
    };
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    let signals = signals::extract(&img, Some(&capture), "edit.jpg", 100);
    assert!(signals.has_exif);
    assert!(signals.edited);
    assert!(signals.has_origin(signals::ORIGIN_EDITING_EXIF));
    assert!(signals.software().any(|s| s.contains("photoshop")));
}

#[test]
fn test_exif_social_software_tags_origin() {
    let capture = CaptureMetadata {
        software: Some("Instagram".to_string()),
        ..CaptureMetadata::default()
    };
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    let signals = signals::extract(&img, Some(&capture), "post.jpg", 100);
    assert!(signals.has_origin(signals::ORIGIN_SOCIAL_EXIF));
    assert!(!signals.edited);
}

#[test]
fn test_user_comment_screenshot_sets_heuristic() {
    let capture = CaptureMetadata {
        user_comment: Some("Screenshot of my receipt".to_string()),
        ..CaptureMetadata::default()
    };
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    let signals = signals::extract(&img, Some(&capture), "receipt.jpg", 100);
    assert!(signals.is_screenshot_heuristic);
    assert!(signals.has_origin(signals::ORIGIN_SCREENSHOT_COMMENT));
}

#[test]
fn test_make_and_model_set_camera_flag() {
    let capture = CaptureMetadata {
        make: Some("Canon".to_string()),
        ..CaptureMetadata::default()
    };
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    let signals = signals::extract(&img, Some(&capture), "IMG_0001.jpg", 100);
    assert!(signals.has_camera_model);
}

#[test]
fn test_display_p3_png_without_camera_is_screenshot_profile() {
    let icc = b"....Display P3....".to_vec();
    let img = decoded(ImageFormat::Png, MetadataMap::new(), Some(icc));
    let signals = signals::extract(&img, None, "img.png", 100);
    assert!(signals.is_screenshot_heuristic);
    assert!(signals.has_origin(signals::ORIGIN_APPLE_SCREENSHOT_ICC));
}

#[test]
fn test_display_p3_with_camera_model_is_ignored() {
    let capture = CaptureMetadata {
        make: Some("Apple".to_string()),
        model: Some("iPhone 15 Pro".to_string()),
        ..CaptureMetadata::default()
    };
    let icc = b"....Display P3....".to_vec();
    let img = decoded(ImageFormat::Png, MetadataMap::new(), Some(icc));
    let signals = signals::extract(&img, Some(&capture), "img.png", 100);
    assert!(!signals.is_screenshot_heuristic);
    assert!(!signals.has_origin(signals::ORIGIN_APPLE_SCREENSHOT_ICC));
}

#[test]
fn test_generic_srgb_png_tags_without_heuristic() {
    let icc = b"..sRGB IEC61966-2.1..".to_vec();
    let img = decoded(ImageFormat::Png, MetadataMap::new(), Some(icc));
    let signals = signals::extract(&img, None, "img.png", 100);
    assert!(!signals.is_screenshot_heuristic);
    assert!(signals.has_origin(signals::ORIGIN_GENERIC_SRGB_PNG));
}

#[test]
fn test_meta_and_google_icc_origins() {
    let icc = b"FBMD facebook cnrgb google".to_vec();
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), Some(icc));
    let signals = signals::extract(&img, None, "img.jpg", 100);
    assert!(signals.has_origin(signals::ORIGIN_META_ICC));
    assert!(signals.has_origin(signals::ORIGIN_GOOGLE_ICC));
}

#[test]
fn test_stripped_exif_origin_when_no_capture_metadata() {
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    let signals = signals::extract(&img, None, "img.jpg", 100);
    assert!(!signals.has_exif);
    assert!(signals.has_origin(signals::ORIGIN_STRIPPED_EXIF));
}

#[test]
fn test_bits_per_pixel_from_byte_size() {
    let img = decoded(ImageFormat::Jpeg, MetadataMap::new(), None);
    // 10x10 pixels, 25 bytes -> 200 bits / 100 px = 2.0 bpp
    let signals = signals::extract(&img, None, "img.jpg", 25);
    assert!((signals.bits_per_pixel - 2.0).abs() < 1e-9);
}
