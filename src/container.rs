//! Byte-level container walks that gather the raw textual metadata store.
//!
//! Decoding of pixel data lives in `decode`; this module only looks at
//! the container structure. A malformed segment or chunk drops that one
//! entry, never the walk as a whole.

use tracing::debug;

use crate::types::{ImageFormat, MetaValue, MetadataMap};

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const RIFF_MAGIC: [u8; 4] = *b"RIFF";
pub const WEBP_FOURCC: [u8; 4] = *b"WEBP";

const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\x00";

pub fn sniff_format(data: &[u8]) -> ImageFormat {
    if data.len() >= 3 && data[0..2] == JPEG_SOI && data[2] == 0xFF {
        return ImageFormat::Jpeg;
    }
    if data.len() >= 8 && data[..8] == PNG_SIGNATURE {
        return ImageFormat::Png;
    }
    if data.len() >= 12 && data[..4] == RIFF_MAGIC && data[8..12] == WEBP_FOURCC {
        return ImageFormat::Webp;
    }
    ImageFormat::Other
}

/// Collect the container's textual metadata key/value pairs.
pub fn collect_metadata(data: &[u8], format: ImageFormat) -> MetadataMap {
    let mut map = MetadataMap::new();
    match format {
        ImageFormat::Jpeg => collect_jpeg_metadata(data, &mut map),
        ImageFormat::Png => collect_png_metadata(data, &mut map),
        ImageFormat::Webp => collect_webp_metadata(data, &mut map),
        ImageFormat::Other => {}
    }
    map
}

/// UTF-8 decode that drops invalid sequences instead of failing.
pub fn decode_utf8_ignore(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\u{FFFD}', "")
}

fn insert_text(map: &mut MetadataMap, key: &str, value: String) {
    // First occurrence wins for repeated keys.
    map.entry(key.to_string())
        .or_insert(MetaValue::Text(value));
}

fn collect_jpeg_metadata(data: &[u8], map: &mut MetadataMap) {
    let mut pos = 2;

    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            break;
        }

        let marker = data[pos + 1];

        if marker == 0x00 {
            pos += 2;
            continue;
        }

        if marker == 0xFF {
            pos += 1;
            continue;
        }

        if matches!(marker, 0xD0..=0xD7) {
            pos += 2;
            continue;
        }

        // SOS or EOI: entropy-coded data follows, nothing textual past here.
        if marker == 0xDA || marker == 0xD9 {
            break;
        }

        if pos + 3 >= data.len() {
            break;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }

        let seg_end = pos + 2 + seg_len;
        if seg_end > data.len() {
            break;
        }

        let payload = &data[pos + 4..seg_end];

        match marker {
            0xFE => {
                insert_text(map, "comment", decode_utf8_ignore(payload));
            }
            0xE1 => {
                if payload.len() > XMP_HEADER.len() && payload.starts_with(XMP_HEADER) {
                    insert_text(
                        map,
                        "xmp",
                        decode_utf8_ignore(&payload[XMP_HEADER.len()..]),
                    );
                }
            }
            _ => {}
        }

        pos = seg_end;
    }
}

fn collect_png_metadata(data: &[u8], map: &mut MetadataMap) {
    let Some(iter) = PngChunkIterator::new(data) else {
        return;
    };

    for (chunk_type, payload) in iter {
        match &chunk_type {
            b"tEXt" => {
                if let Some((key, value)) = split_text_chunk(payload) {
                    insert_text(map, &key, value);
                }
            }
            b"iTXt" => {
                if let Some((key, value)) = split_itxt_chunk(payload) {
                    insert_text(map, &key, value);
                }
            }
            b"zTXt" => {
                // Value is zlib-compressed; record the key so software-name
                // detection on keys still works.
                if let Some(nul) = payload.iter().position(|&b| b == 0) {
                    let key = decode_utf8_ignore(&payload[..nul]);
                    if !key.is_empty() {
                        insert_text(map, &key, String::new());
                    }
                }
            }
            _ => {}
        }
    }
}

fn split_text_chunk(payload: &[u8]) -> Option<(String, String)> {
    let nul = payload.iter().position(|&b| b == 0)?;
    let key = decode_utf8_ignore(&payload[..nul]);
    if key.is_empty() {
        return None;
    }
    Some((key, decode_utf8_ignore(&payload[nul + 1..])))
}

// iTXt: keyword NUL compression-flag compression-method language NUL
// translated-keyword NUL text. Only uncompressed text is taken.
fn split_itxt_chunk(payload: &[u8]) -> Option<(String, String)> {
    let nul = payload.iter().position(|&b| b == 0)?;
    let key = decode_utf8_ignore(&payload[..nul]);
    if key.is_empty() {
        return None;
    }

    let rest = payload.get(nul + 1..)?;
    let (&compression_flag, rest) = rest.split_first()?;
    let (_, rest) = rest.split_first()?;

    let lang_end = rest.iter().position(|&b| b == 0)?;
    let rest = rest.get(lang_end + 1..)?;
    let translated_end = rest.iter().position(|&b| b == 0)?;
    let text = rest.get(translated_end + 1..)?;

    if compression_flag != 0 {
        return Some((key, String::new()));
    }
    Some((key, decode_utf8_ignore(text)))
}

fn collect_webp_metadata(data: &[u8], map: &mut MetadataMap) {
    // RIFF header, then a sequence of fourcc + LE length + payload,
    // payloads padded to even length.
    let mut pos = 12;

    while pos + 8 <= data.len() {
        let fourcc = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
        let len =
            u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                as usize;

        let payload_start = pos + 8;
        let payload_end = payload_start + len;
        if payload_end > data.len() {
            break;
        }

        if &fourcc == b"XMP " {
            insert_text(map, "xmp", decode_utf8_ignore(&data[payload_start..payload_end]));
        }

        pos = payload_end + (len & 1);
    }
}

pub struct PngChunkIterator<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PngChunkIterator<'a> {
    pub fn new(data: &'a [u8]) -> Option<Self> {
        if data.len() < 8 || data[..8] != PNG_SIGNATURE {
            return None;
        }
        Some(Self { data, pos: 8 })
    }
}

impl<'a> Iterator for PngChunkIterator<'a> {
    type Item = ([u8; 4], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos + 12 > self.data.len() {
                return None;
            }

            let length = u32::from_be_bytes([
                self.data[self.pos],
                self.data[self.pos + 1],
                self.data[self.pos + 2],
                self.data[self.pos + 3],
            ]) as usize;

            let chunk_type: [u8; 4] = [
                self.data[self.pos + 4],
                self.data[self.pos + 5],
                self.data[self.pos + 6],
                self.data[self.pos + 7],
            ];

            let total_size = 4 + 4 + length + 4;
            if self.pos + total_size > self.data.len() {
                return None;
            }

            let payload = &self.data[self.pos + 8..self.pos + 8 + length];

            let mut hasher = crc32fast::Hasher::new();
            hasher.update(&self.data[self.pos + 4..self.pos + 8 + length]);
            let calculated = hasher.finalize();
            let stored = u32::from_be_bytes([
                self.data[self.pos + 8 + length],
                self.data[self.pos + 8 + length + 1],
                self.data[self.pos + 8 + length + 2],
                self.data[self.pos + 8 + length + 3],
            ]);

            self.pos += total_size;

            if calculated != stored {
                debug!(chunk = ?chunk_type, "skipping PNG chunk with bad CRC");
                continue;
            }

            return Some((chunk_type, payload));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_chunk(chunk_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(payload);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(chunk_type);
        hasher.update(payload);
        out.extend_from_slice(&hasher.finalize().to_be_bytes());
        out
    }

    fn minimal_png(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        for chunk in chunks {
            data.extend_from_slice(chunk);
        }
        data
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
        assert_eq!(sniff_format(&PNG_SIGNATURE), ImageFormat::Png);
        let mut webp = b"RIFF\x04\x00\x00\x00WEBP".to_vec();
        webp.extend_from_slice(&[0; 4]);
        assert_eq!(sniff_format(&webp), ImageFormat::Webp);
        assert_eq!(sniff_format(b"GIF89a"), ImageFormat::Other);
        assert_eq!(sniff_format(&[]), ImageFormat::Other);
    }

    #[test]
    fn test_png_text_chunks() {
        let png = minimal_png(&[
            png_chunk(b"tEXt", b"Software\x00GNOME Screenshot"),
            png_chunk(b"tEXt", b"Comment\x00hello"),
        ]);
        let map = collect_metadata(&png, ImageFormat::Png);
        assert_eq!(
            map.get("Software").and_then(MetaValue::as_str),
            Some("GNOME Screenshot")
        );
        assert_eq!(map.get("Comment").and_then(MetaValue::as_str), Some("hello"));
    }

    #[test]
    fn test_png_bad_crc_skipped() {
        let mut bad = png_chunk(b"tEXt", b"Software\x00corrupted");
        let crc_at = bad.len() - 4;
        bad[crc_at] ^= 0xFF;
        let png = minimal_png(&[bad, png_chunk(b"tEXt", b"Comment\x00still here")]);
        let map = collect_metadata(&png, ImageFormat::Png);
        assert!(!map.contains_key("Software"));
        assert_eq!(
            map.get("Comment").and_then(MetaValue::as_str),
            Some("still here")
        );
    }

    #[test]
    fn test_jpeg_comment_segment() {
        let mut jpeg = vec![0xFF, 0xD8];
        let comment = b"shot on Instagram";
        jpeg.extend_from_slice(&[0xFF, 0xFE]);
        jpeg.extend_from_slice(&((comment.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(comment);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        let map = collect_metadata(&jpeg, ImageFormat::Jpeg);
        assert_eq!(
            map.get("comment").and_then(MetaValue::as_str),
            Some("shot on Instagram")
        );
    }

    #[test]
    fn test_jpeg_truncated_segment_stops_cleanly() {
        // Declared segment length runs past the end of the buffer.
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xFE, 0xFF, 0xFF, b'a'];
        let map = collect_metadata(&jpeg, ImageFormat::Jpeg);
        assert!(map.is_empty());
    }

    #[test]
    fn test_itxt_chunk() {
        let png = minimal_png(&[png_chunk(
            b"iTXt",
            b"Description\x00\x00\x00\x00\x00made with ComfyUI",
        )]);
        let map = collect_metadata(&png, ImageFormat::Png);
        assert_eq!(
            map.get("Description").and_then(MetaValue::as_str),
            Some("made with ComfyUI")
        );
    }
}
