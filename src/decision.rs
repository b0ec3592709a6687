//! Decision engine: fuses the extracted signals into the six-feature
//! vector, applies the precedence rules in a fixed order, and selects the
//! final verdict. Each rule takes the current vector and returns the
//! updated one; later rules may override earlier ones.

use crate::lexicon;
use crate::types::{FeatureVector, ImageFormat, SignalSet, Verdict};

const CONFIDENCE_AI_GENERATED: f64 = 0.95;
const CONFIDENCE_RECAPTURED: f64 = 0.88;
const CONFIDENCE_SCREEN_CAPTURE: f64 = 0.90;
const CONFIDENCE_EDITED: f64 = 0.85;
const CONFIDENCE_REENCODED: f64 = 0.88;
const CONFIDENCE_CAMERA_PHOTO: f64 = 0.92;
const CONFIDENCE_UNKNOWN: f64 = 0.0;

const LOW_BITS_PER_PIXEL: f64 = 1.5;

pub const ORIGIN_RECAPTURED_SCREEN: &str = "screenshot_of_photo_detected";
pub const ORIGIN_RECAPTURED_SOCIAL: &str = "screenshot_of_photo_sent_via_social_media";

#[derive(Debug, Clone)]
pub struct Decision {
    pub features: FeatureVector,
    pub verdict: Verdict,
    pub confidence: f64,
    pub notes: Vec<String>,
}

pub fn decide(
    format: ImageFormat,
    width: u32,
    height: u32,
    signals: &mut SignalSet,
) -> Decision {
    let mut notes = Vec::new();

    let mut features = FeatureVector {
        edited: signals.edited,
        ai_generated: signals.ai_generated,
        ..FeatureVector::default()
    };

    features = rule_screen_capture(features, signals, format);
    features = rule_social_letterbox(features, signals, format);
    features = rule_platform_reencode(features, signals, format, width, height, &mut notes);
    features = rule_camera_photo(features, signals, &mut notes);
    features = rule_recapture_precedence(features, &mut notes);

    let (verdict, confidence) = select_verdict(&features);

    Decision {
        features,
        verdict,
        confidence,
        notes,
    }
}

/// Screenshot heuristics, or a PNG with no capture metadata, mean the
/// pixels came off a screen. Letterboxing on top of that means someone
/// photographed or screenshotted the screen content itself.
fn rule_screen_capture(
    mut features: FeatureVector,
    signals: &mut SignalSet,
    format: ImageFormat,
) -> FeatureVector {
    let screen_origin =
        signals.is_screenshot_heuristic || (format == ImageFormat::Png && !signals.has_exif);
    if screen_origin {
        if signals.is_letterboxed {
            features.camera_photo_recaptured = true;
            signals.tag(ORIGIN_RECAPTURED_SCREEN);
        } else {
            features.screen_capture = true;
        }
    }
    features
}

/// A letterboxed JPEG with stripped metadata is the classic shape of a
/// screenshot-of-a-photo that went through a messaging platform. Skipped
/// when the previous rule already claimed the image.
fn rule_social_letterbox(
    mut features: FeatureVector,
    signals: &mut SignalSet,
    format: ImageFormat,
) -> FeatureVector {
    if features.screen_capture || features.camera_photo_recaptured {
        return features;
    }
    if !signals.has_exif && format == ImageFormat::Jpeg && signals.is_letterboxed {
        features.camera_photo_recaptured = true;
        signals.tag(ORIGIN_RECAPTURED_SOCIAL);
    }
    features
}

/// Stripped metadata on a JPEG/WEBP with nothing else claiming the image
/// points at a platform re-encode. PNG is deliberately excluded: a PNG
/// with stripped metadata is already claimed as a screen capture.
fn rule_platform_reencode(
    mut features: FeatureVector,
    signals: &SignalSet,
    format: ImageFormat,
    width: u32,
    height: u32,
    notes: &mut Vec<String>,
) -> FeatureVector {
    if signals.has_exif {
        return features;
    }
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Webp) {
        return features;
    }
    if signals.is_screenshot_heuristic
        || features.camera_photo_recaptured
        || features.edited
        || features.ai_generated
    {
        return features;
    }

    features.platform_reencoded = true;
    notes.push(
        "Capture metadata is fully absent, as left by social media and messaging pipelines."
            .to_string(),
    );
    if lexicon::matches_known_output_dimensions(width, height) {
        notes.push(format!(
            "Resolution {width}x{height} matches a known social media output size."
        ));
    } else {
        notes.push(format!(
            "Resolution {width}x{height} does not match typical native camera sensor output."
        ));
    }
    if signals.bits_per_pixel < LOW_BITS_PER_PIXEL {
        notes.push(format!(
            "Low bits-per-pixel ({:.2}) indicates heavy re-compression.",
            signals.bits_per_pixel
        ));
    }

    features
}

fn rule_camera_photo(
    mut features: FeatureVector,
    signals: &SignalSet,
    notes: &mut Vec<String>,
) -> FeatureVector {
    if !signals.has_camera_model {
        return features;
    }
    if signals.is_screenshot_heuristic
        || features.ai_generated
        || signals.is_letterboxed
        || features.edited
    {
        return features;
    }

    features.camera_photo = true;
    notes.push(
        "Camera make/model present with no screenshot, AI, or editing signals.".to_string(),
    );
    features
}

/// Recapture wins over both screen capture and camera photo: the borders
/// prove another capture happened after the original.
fn rule_recapture_precedence(
    mut features: FeatureVector,
    notes: &mut Vec<String>,
) -> FeatureVector {
    if features.camera_photo_recaptured {
        features.screen_capture = false;
        features.camera_photo = false;
        notes.push(
            "Recapture takes precedence over screen capture and camera photo.".to_string(),
        );
    }
    features
}

pub fn select_verdict(features: &FeatureVector) -> (Verdict, f64) {
    if features.ai_generated {
        (Verdict::AiGenerated, CONFIDENCE_AI_GENERATED)
    } else if features.camera_photo_recaptured {
        (Verdict::CameraPhotoRecaptured, CONFIDENCE_RECAPTURED)
    } else if features.screen_capture {
        (Verdict::ScreenCapture, CONFIDENCE_SCREEN_CAPTURE)
    } else if features.edited {
        (Verdict::Edited, CONFIDENCE_EDITED)
    } else if features.platform_reencoded {
        (Verdict::PlatformReencoded, CONFIDENCE_REENCODED)
    } else if features.camera_photo {
        (Verdict::CameraPhoto, CONFIDENCE_CAMERA_PHOTO)
    } else {
        (Verdict::Unknown, CONFIDENCE_UNKNOWN)
    }
}
