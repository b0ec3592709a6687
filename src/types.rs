use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

pub const BITS_PER_BYTE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Other,
}

impl ImageFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Webp => "WEBP",
            ImageFormat::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata values come in heterogeneous shapes depending on the
/// container and tag; everything renders to text for the output record.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Text(String),
    Int(i64),
    Rational(u32, u32),
    Triple([(u32, u32); 3]),
}

impl MetaValue {
    pub fn to_text(&self) -> String {
        match self {
            MetaValue::Text(s) => s.clone(),
            MetaValue::Int(n) => n.to_string(),
            MetaValue::Rational(num, den) => format!("{num}/{den}"),
            MetaValue::Triple(parts) => format!(
                "({}/{}, {}/{}, {}/{})",
                parts[0].0, parts[0].1, parts[1].0, parts[1].1, parts[2].0, parts[2].1
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type MetadataMap = BTreeMap<String, MetaValue>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything known about the source image once decoding and metadata
/// extraction are done. Immutable after assembly, owned by one request.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub format: ImageFormat,
    pub mode: &'static str,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    pub capture_tags: Option<MetadataMap>,
    pub gps: Option<GpsCoordinates>,
}

/// Accumulator for everything the extraction passes observe. Origin tags
/// and software identifiers are deduplicated sets.
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    origins: BTreeSet<String>,
    software: BTreeSet<String>,
    pub has_exif: bool,
    pub has_camera_model: bool,
    pub is_screenshot_heuristic: bool,
    pub is_letterboxed: bool,
    pub edited: bool,
    pub ai_generated: bool,
    pub bits_per_pixel: f64,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, origin: &str) {
        self.origins.insert(origin.to_string());
    }

    pub fn record_software(&mut self, name: &str) {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.software.insert(trimmed.to_lowercase());
        }
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    pub fn software(&self) -> impl Iterator<Item = &str> {
        self.software.iter().map(String::as_str)
    }

    pub fn has_origin(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }
}

/// The six provenance features the decision engine adjudicates between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    pub camera_photo: bool,
    pub camera_photo_recaptured: bool,
    pub screen_capture: bool,
    pub edited: bool,
    pub ai_generated: bool,
    pub platform_reencoded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AiGenerated,
    CameraPhotoRecaptured,
    ScreenCapture,
    Edited,
    PlatformReencoded,
    CameraPhoto,
    Unknown,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::AiGenerated => "ai_generated",
            Verdict::CameraPhotoRecaptured => "camera_photo_recaptured",
            Verdict::ScreenCapture => "screen_capture",
            Verdict::Edited => "edited",
            Verdict::PlatformReencoded => "platform_reencoded",
            Verdict::CameraPhoto => "camera_photo",
            Verdict::Unknown => "unknown",
        }
    }
}

pub fn bits_per_pixel(byte_size: u64, width: u32, height: u32) -> f64 {
    if width == 0 || height == 0 {
        return 0.0;
    }
    (byte_size as f64 * BITS_PER_BYTE) / (width as f64 * height as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_value_to_text() {
        assert_eq!(MetaValue::Text("x".into()).to_text(), "x");
        assert_eq!(MetaValue::Int(42).to_text(), "42");
        assert_eq!(MetaValue::Rational(1, 3).to_text(), "1/3");
        assert_eq!(
            MetaValue::Triple([(1, 1), (30, 1), (0, 1)]).to_text(),
            "(1/1, 30/1, 0/1)"
        );
    }

    #[test]
    fn test_signal_set_dedup() {
        let mut signals = SignalSet::new();
        signals.tag("meta_icc_profile");
        signals.tag("meta_icc_profile");
        signals.record_software("  Adobe Photoshop 25.0 ");
        signals.record_software("adobe photoshop 25.0");
        assert_eq!(signals.origins().count(), 1);
        assert_eq!(signals.software().count(), 1);
        assert_eq!(signals.software().next(), Some("adobe photoshop 25.0"));
    }

    #[test]
    fn test_bits_per_pixel_zero_dimension() {
        assert_eq!(bits_per_pixel(1000, 0, 1080), 0.0);
        assert_eq!(bits_per_pixel(1000, 1080, 0), 0.0);
    }

    #[test]
    fn test_bits_per_pixel() {
        let bpp = bits_per_pixel(233_280, 1080, 1920);
        assert!((bpp - 0.9).abs() < 1e-9);
    }
}
