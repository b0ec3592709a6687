//! Signal extraction: every provenance hint the filename, container
//! metadata, capture metadata, ICC profile, and pixel statistics give up,
//! accumulated into a `SignalSet`. Matches are non-exclusive and each
//! extraction step is isolated from the others.

use crate::border;
use crate::capture::CaptureMetadata;
use crate::decode::DecodedImage;
use crate::lexicon;
use crate::types::{bits_per_pixel, ImageFormat, SignalSet};

pub const ORIGIN_SCREENSHOT_FILENAME: &str = "screenshot_filename";
pub const ORIGIN_SOCIAL_FILENAME: &str = "social_media_filename";
pub const ORIGIN_SCREENSHOT_METADATA: &str = "screenshot_metadata";
pub const ORIGIN_SOCIAL_METADATA: &str = "social_media_metadata";
pub const ORIGIN_AI_METADATA: &str = "ai_generator_metadata";
pub const ORIGIN_SOCIAL_EXIF: &str = "social_media_exif_tag";
pub const ORIGIN_AI_EXIF: &str = "ai_generator_exif_tag";
pub const ORIGIN_EDITING_EXIF: &str = "editing_software_exif_tag";
pub const ORIGIN_SCREENSHOT_SOFTWARE: &str = "screenshot_software";
pub const ORIGIN_SCREENSHOT_COMMENT: &str = "screenshot_user_comment";
pub const ORIGIN_META_ICC: &str = "meta_icc_profile";
pub const ORIGIN_GOOGLE_ICC: &str = "google_icc_profile";
pub const ORIGIN_APPLE_SCREENSHOT_ICC: &str = "ios_mac_screenshot_profile";
pub const ORIGIN_GENERIC_SRGB_PNG: &str = "generic_srgb_png_possible_screenshot";
pub const ORIGIN_STRIPPED_EXIF: &str = "stripped_exif_possible_social_media";

// Container keys whose values name the producing software.
const SOFTWARE_KEYS: [&str; 4] = ["software", "processingsoftware", "creator", "description"];

pub fn extract(
    decoded: &DecodedImage,
    capture: Option<&CaptureMetadata>,
    filename: &str,
    byte_size: u64,
) -> SignalSet {
    let mut signals = SignalSet::new();

    scan_filename(&mut signals, filename);
    scan_container_metadata(&mut signals, decoded);
    scan_capture_metadata(&mut signals, capture);
    scan_icc_profile(&mut signals, decoded, capture);

    if !signals.has_exif {
        signals.tag(ORIGIN_STRIPPED_EXIF);
    }

    signals.is_letterboxed = border::is_letterboxed(&decoded.pixels);
    signals.bits_per_pixel = bits_per_pixel(byte_size, decoded.width, decoded.height);

    signals
}

fn scan_filename(signals: &mut SignalSet, filename: &str) {
    let lowered = filename.to_lowercase();
    if lexicon::has_screenshot_keyword(&lowered) {
        signals.is_screenshot_heuristic = true;
        signals.tag(ORIGIN_SCREENSHOT_FILENAME);
    }
    if lexicon::names_social_platform(&lowered) {
        signals.tag(ORIGIN_SOCIAL_FILENAME);
    }
}

fn scan_container_metadata(signals: &mut SignalSet, decoded: &DecodedImage) {
    for (key, value) in &decoded.metadata {
        let text = value.to_text();
        if text.is_empty() {
            continue;
        }
        let lowered = text.to_lowercase();

        if lexicon::has_screenshot_keyword(&lowered) {
            signals.is_screenshot_heuristic = true;
            signals.tag(ORIGIN_SCREENSHOT_METADATA);
        }
        if lexicon::names_ai_generator(&lowered) {
            signals.ai_generated = true;
            signals.tag(ORIGIN_AI_METADATA);
        }
        if lexicon::names_social_platform(&lowered) {
            signals.tag(ORIGIN_SOCIAL_METADATA);
        }

        if key_names_software(key) {
            signals.record_software(&text);
            if lexicon::names_screenshot_software(&lowered) {
                signals.is_screenshot_heuristic = true;
                signals.tag(ORIGIN_SCREENSHOT_SOFTWARE);
            }
        }
    }
}

fn key_names_software(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SOFTWARE_KEYS.iter().any(|k| *k == lowered)
}

fn scan_capture_metadata(signals: &mut SignalSet, capture: Option<&CaptureMetadata>) {
    let Some(capture) = capture else {
        return;
    };

    signals.has_exif = true;
    signals.has_camera_model = capture.has_camera_model();

    if let Some(software) = &capture.software {
        signals.record_software(software);
        let lowered = software.to_lowercase();
        if lexicon::names_editing_software(&lowered) {
            signals.edited = true;
            signals.tag(ORIGIN_EDITING_EXIF);
        }
        if lexicon::names_social_platform(&lowered) {
            signals.tag(ORIGIN_SOCIAL_EXIF);
        }
        if lexicon::names_screenshot_software(&lowered) {
            signals.is_screenshot_heuristic = true;
            signals.tag(ORIGIN_SCREENSHOT_SOFTWARE);
        }
        if lexicon::names_ai_generator(&lowered) {
            signals.ai_generated = true;
            signals.tag(ORIGIN_AI_EXIF);
        }
    }

    if let Some(comment) = &capture.user_comment {
        if comment.to_lowercase().contains("screenshot") {
            signals.is_screenshot_heuristic = true;
            signals.tag(ORIGIN_SCREENSHOT_COMMENT);
        }
    }
}

fn scan_icc_profile(
    signals: &mut SignalSet,
    decoded: &DecodedImage,
    capture: Option<&CaptureMetadata>,
) {
    let Some(icc) = &decoded.icc_profile else {
        return;
    };
    let lowered = icc.to_ascii_lowercase();
    let has_camera_model = capture.is_some_and(CaptureMetadata::has_camera_model);

    if contains_bytes(&lowered, b"cnrgb") || contains_bytes(&lowered, b"facebook") {
        signals.tag(ORIGIN_META_ICC);
    }
    if contains_bytes(&lowered, b"google") {
        signals.tag(ORIGIN_GOOGLE_ICC);
    }

    if decoded.format == ImageFormat::Png && !has_camera_model {
        if contains_bytes(&lowered, b"display p3") {
            signals.is_screenshot_heuristic = true;
            signals.tag(ORIGIN_APPLE_SCREENSHOT_ICC);
        }
        if contains_bytes(&lowered, b"srgb iec61966-2.1") {
            signals.tag(ORIGIN_GENERIC_SRGB_PNG);
        }
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack.windows(needle.len()).any(|w| w == needle)
}
