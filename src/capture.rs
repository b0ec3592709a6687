//! Capture metadata: the EXIF tag table embedded by cameras and editors,
//! plus rational-GPS conversion to signed decimal degrees.

use std::io::Cursor;

use exif::{In, Reader, Tag, Value};
use tracing::debug;

use crate::container::decode_utf8_ignore;
use crate::types::{GpsCoordinates, MetaValue, MetadataMap};

// UserComment payloads open with an eight-byte character-code marker.
const USER_COMMENT_ASCII: &[u8] = b"ASCII\x00\x00\x00";
const USER_COMMENT_UNICODE: &[u8] = b"UNICODE\x00";

#[derive(Debug, Clone, Default)]
pub struct CaptureMetadata {
    pub tags: MetadataMap,
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub user_comment: Option<String>,
    pub gps: Option<GpsCoordinates>,
}

impl CaptureMetadata {
    pub fn has_camera_model(&self) -> bool {
        self.make.is_some() || self.model.is_some()
    }
}

/// Read the capture metadata embedded in the container bytes, if any.
/// Absence of EXIF is a normal outcome, not an error.
pub fn read(data: &[u8]) -> Option<CaptureMetadata> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(error = %e, "no readable capture metadata");
            return None;
        }
    };

    let mut meta = CaptureMetadata::default();
    let mut lat: Option<[(u32, u32); 3]> = None;
    let mut lat_ref: Option<String> = None;
    let mut lon: Option<[(u32, u32); 3]> = None;
    let mut lon_ref: Option<String> = None;

    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY {
            continue;
        }
        // Unknown private tags have no registered name.
        if field.tag.description().is_none() {
            continue;
        }

        let Some(value) = normalize_value(field.tag, &field.value) else {
            continue;
        };

        match field.tag {
            Tag::Make => meta.make = value.as_str().map(|s| s.trim().to_string()),
            Tag::Model => meta.model = value.as_str().map(|s| s.trim().to_string()),
            Tag::Software => meta.software = value.as_str().map(|s| s.trim().to_string()),
            Tag::UserComment => {
                if let Value::Undefined(bytes, _) = &field.value {
                    meta.user_comment = Some(decode_user_comment(bytes));
                } else {
                    meta.user_comment = value.as_str().map(str::to_string);
                }
            }
            Tag::GPSLatitude => lat = rational_triple(&field.value),
            Tag::GPSLatitudeRef => lat_ref = value.as_str().map(str::to_string),
            Tag::GPSLongitude => lon = rational_triple(&field.value),
            Tag::GPSLongitudeRef => lon_ref = value.as_str().map(str::to_string),
            _ => {}
        }

        meta.tags.insert(field.tag.to_string(), value);
    }

    if meta.tags.is_empty() {
        return None;
    }

    // GPS needs all four of coordinate + reference on both axes.
    if let (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) =
        (lat, lat_ref.as_deref(), lon, lon_ref.as_deref())
    {
        meta.gps = Some(GpsCoordinates {
            latitude: to_decimal_degrees(&lat, lat_ref),
            longitude: to_decimal_degrees(&lon, lon_ref),
        });
    }

    Some(meta)
}

/// Decimal degrees from a (degrees, minutes, seconds) rational triple.
/// A zero denominator contributes 0 for that component, never a fault.
pub fn to_decimal_degrees(triple: &[(u32, u32); 3], reference: &str) -> f64 {
    let value = safe_div(triple[0].0, triple[0].1)
        + safe_div(triple[1].0, triple[1].1) / 60.0
        + safe_div(triple[2].0, triple[2].1) / 3600.0;
    match reference.trim() {
        "S" | "W" => -value,
        _ => value,
    }
}

fn safe_div(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn normalize_value(tag: Tag, value: &Value) -> Option<MetaValue> {
    match value {
        Value::Ascii(lines) => {
            let text = lines
                .iter()
                .map(|line| decode_utf8_ignore(line))
                .collect::<Vec<_>>()
                .join(" ");
            Some(MetaValue::Text(text.trim_end_matches('\0').to_string()))
        }
        Value::Byte(bytes) => Some(MetaValue::Text(decode_utf8_ignore(bytes))),
        Value::Undefined(bytes, _) => Some(MetaValue::Text(decode_utf8_ignore(bytes))),
        Value::Short(v) if v.len() == 1 => Some(MetaValue::Int(v[0] as i64)),
        Value::Long(v) if v.len() == 1 => Some(MetaValue::Int(v[0] as i64)),
        Value::SShort(v) if v.len() == 1 => Some(MetaValue::Int(v[0] as i64)),
        Value::SLong(v) if v.len() == 1 => Some(MetaValue::Int(v[0] as i64)),
        Value::Rational(v) if v.len() == 1 => Some(MetaValue::Rational(v[0].num, v[0].denom)),
        Value::Rational(v) if v.len() == 3 => Some(MetaValue::Triple([
            (v[0].num, v[0].denom),
            (v[1].num, v[1].denom),
            (v[2].num, v[2].denom),
        ])),
        Value::Short(_)
        | Value::Long(_)
        | Value::SShort(_)
        | Value::SLong(_)
        | Value::Rational(_)
        | Value::SRational(_)
        | Value::SByte(_)
        | Value::Float(_)
        | Value::Double(_) => Some(MetaValue::Text(value.display_as(tag).to_string())),
        _ => None,
    }
}

fn rational_triple(value: &Value) -> Option<[(u32, u32); 3]> {
    match value {
        Value::Rational(v) if v.len() == 3 => Some([
            (v[0].num, v[0].denom),
            (v[1].num, v[1].denom),
            (v[2].num, v[2].denom),
        ]),
        _ => None,
    }
}

fn decode_user_comment(bytes: &[u8]) -> String {
    let stripped = bytes
        .strip_prefix(USER_COMMENT_ASCII)
        .or_else(|| bytes.strip_prefix(USER_COMMENT_UNICODE))
        .unwrap_or(bytes);
    decode_utf8_ignore(stripped).trim_matches('\0').to_string()
}
