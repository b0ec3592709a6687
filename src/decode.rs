//! Decoding boundary: bytes in, pixel buffer plus declared container
//! attributes and the raw metadata store out.

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use tracing::debug;

use crate::container;
use crate::error::ClassifyError;
use crate::types::{ImageFormat, MetadataMap};

pub struct DecodedImage {
    pub pixels: DynamicImage,
    pub format: ImageFormat,
    pub mode: &'static str,
    pub width: u32,
    pub height: u32,
    pub icc_profile: Option<Vec<u8>>,
    pub metadata: MetadataMap,
}

pub fn decode(data: &[u8]) -> Result<DecodedImage, ClassifyError> {
    let format = container::sniff_format(data);
    let metadata = container::collect_metadata(data, format);

    let (pixels, icc_profile) = match format {
        ImageFormat::Jpeg => decode_with(JpegDecoder::new(Cursor::new(data))?)?,
        ImageFormat::Png => decode_with(PngDecoder::new(Cursor::new(data))?)?,
        ImageFormat::Webp => decode_with(WebPDecoder::new(Cursor::new(data))?)?,
        ImageFormat::Other => {
            let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
            (reader.decode()?, None)
        }
    };

    Ok(DecodedImage {
        mode: mode_label(pixels.color()),
        width: pixels.width(),
        height: pixels.height(),
        pixels,
        format,
        icc_profile,
        metadata,
    })
}

fn decode_with(
    mut decoder: impl ImageDecoder,
) -> Result<(DynamicImage, Option<Vec<u8>>), ClassifyError> {
    // A broken ICC blob is a per-value failure; the image itself still decodes.
    let icc_profile = decoder.icc_profile().unwrap_or_else(|e| {
        debug!(error = %e, "skipping unreadable ICC profile");
        None
    });
    let pixels = DynamicImage::from_decoder(decoder)?;
    Ok((pixels, icc_profile))
}

fn mode_label(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L16",
        ColorType::La16 => "LA16",
        ColorType::Rgb16 => "RGB16",
        ColorType::Rgba16 => "RGBA16",
        ColorType::Rgb32F => "RGB32F",
        ColorType::Rgba32F => "RGBA32F",
        _ => "UNKNOWN",
    }
}
