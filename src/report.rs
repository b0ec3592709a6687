//! Record assembly: runs the full pipeline over one file and folds the
//! outcome into the flat output record. Any failure that escapes the
//! isolated extraction steps collapses the record to a single `error`
//! field; nothing propagates past this module.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ClassifyError;
use crate::types::{FeatureVector, ImageRecord, SignalSet, Verdict};
use crate::{capture, decision, decode, signals};

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub verdict: Verdict,
    pub confidence: f64,
    pub notes: Vec<String>,
    pub features: FeatureVector,
    pub software_detected: Vec<String>,
    pub detected_origins: Vec<String>,
}

/// Classify an image held in memory. The returned value is always a
/// well-formed record: either the assembled analysis or `{"error": ...}`.
pub fn classify_bytes(data: &[u8], filename: &str) -> Value {
    match run(data, filename) {
        Ok(record) => record,
        Err(e) => {
            warn!(filename, error = %e, "classification failed");
            json!({ "error": e.to_string() })
        }
    }
}

/// Classify an image on disk, using `filename` as the original upload
/// name for filename-based signals.
pub fn classify_file(path: &Path, filename: &str) -> Value {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(filename, error = %e, "could not read uploaded file");
            return json!({ "error": e.to_string() });
        }
    };
    classify_bytes(&data, filename)
}

fn run(data: &[u8], filename: &str) -> Result<Value, ClassifyError> {
    let decoded = decode::decode(data)?;
    let capture = capture::read(data);
    let byte_size = data.len() as u64;

    let mut signals = signals::extract(&decoded, capture.as_ref(), filename, byte_size);
    let decision = decision::decide(decoded.format, decoded.width, decoded.height, &mut signals);

    info!(
        filename,
        format = %decoded.format,
        verdict = decision.verdict.label(),
        confidence = decision.confidence,
        "image classified"
    );

    let record = ImageRecord {
        format: decoded.format,
        mode: decoded.mode,
        width: decoded.width,
        height: decoded.height,
        byte_size,
        gps: capture.as_ref().and_then(|c| c.gps),
        capture_tags: capture.map(|c| c.tags),
    };

    Ok(assemble(record, &signals, decision))
}

fn assemble(record: ImageRecord, signals: &SignalSet, decision: decision::Decision) -> Value {
    let analysis = Analysis {
        verdict: decision.verdict,
        confidence: decision.confidence,
        notes: decision.notes,
        features: decision.features,
        software_detected: signals.software().map(str::to_string).collect(),
        detected_origins: signals.origins().map(str::to_string).collect(),
    };

    let mut map = serde_json::Map::new();
    map.insert("format".to_string(), json!(record.format.label()));
    map.insert("mode".to_string(), json!(record.mode));
    map.insert("width".to_string(), json!(record.width));
    map.insert("height".to_string(), json!(record.height));
    map.insert("byte_size".to_string(), json!(record.byte_size));

    // Capture tags are folded in flat, the way downstream consumers read
    // them; their CamelCase names cannot collide with the fixed keys.
    if let Some(tags) = &record.capture_tags {
        for (name, value) in tags {
            map.entry(name.clone()).or_insert_with(|| json!(value.to_text()));
        }
    }

    map.insert(
        "analysis".to_string(),
        serde_json::to_value(&analysis).unwrap_or_else(|_| json!(null)),
    );

    if let Some(gps) = record.gps {
        map.insert(
            "gps".to_string(),
            json!({ "latitude": gps.latitude, "longitude": gps.longitude }),
        );
    }

    Value::Object(map)
}
