//! Turns a service payload into an image.
use std::path::Path;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

pub const DATA_URI_SCHEME: &str = "data:";

/// Standard alphabet, padding optional on input.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded data empty")]
    Empty,
    #[error("cannot decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Drops a leading `data:<mime>;base64,` header.
///
/// Input that does not start with `data:`, or whose first comma is missing or
/// last, is returned unchanged.
pub fn strip_data_uri_prefix(payload: &str) -> &str {
    if !payload.starts_with(DATA_URI_SCHEME) {
        return payload;
    }
    match payload.find(',') {
        Some(comma) if comma > 0 && comma < payload.len() - 1 => &payload[comma + 1..],
        _ => payload,
    }
}

/// Decodes standard base64, ignoring embedded whitespace and line breaks.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT_STANDARD.decode(compact)?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(bytes)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// A decoded map image plus the bytes it came from.
#[derive(Debug, Clone)]
pub struct MapImage {
    bytes: Vec<u8>,
    image: DynamicImage,
}

impl MapImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let image = image::load_from_memory(&bytes)?;
        Ok(Self { bytes, image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Format sniffed from the raw bytes, if recognised.
    pub fn format(&self) -> Option<ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }

    /// Writes the image, re-encoding to match the extension of `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }
}

/// Strips any data URI header, decodes base64 and then the image bytes.
pub fn decode_image(payload: &str) -> Result<MapImage, DecodeError> {
    let bytes = decode_base64(strip_data_uri_prefix(payload.trim()))?;
    MapImage::from_bytes(bytes)
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 10 % 256) as u8, (y * 10 % 256) as u8, 128])
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode sample png");
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_data_uri_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri_prefix("AAAA"), "AAAA");
        assert_eq!(strip_data_uri_prefix("data:image/png;base64,"), "data:image/png;base64,");
        assert_eq!(strip_data_uri_prefix("data:nocomma"), "data:nocomma");
        assert_eq!(strip_data_uri_prefix("xdata:a,b"), "xdata:a,b");
    }

    #[test]
    fn test_strip_prefix_is_idempotent() {
        for s in [
            "data:image/jpeg;base64,/9j/4AAQ",
            "iVBORw0KGgo=",
            "data:,",
            "data:x,y,z",
            "",
        ] {
            let once = strip_data_uri_prefix(s);
            assert_eq!(strip_data_uri_prefix(once), once, "input {:?}", s);
        }
    }

    #[test]
    fn test_base64_round_trip() {
        let bytes = sample_png(3, 2);
        assert_eq!(decode_base64(&encode_base64(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_base64_tolerates_line_breaks_and_missing_padding() {
        assert_eq!(decode_base64("Zm9v\nYmE=").unwrap(), b"fooba");
        assert_eq!(decode_base64("Zm9vYmE").unwrap(), b"fooba");
    }

    #[test]
    fn test_base64_errors() {
        assert!(matches!(decode_base64("!!!"), Err(DecodeError::Base64(_))));
        assert!(matches!(decode_base64(""), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_image_with_data_uri() {
        let payload = format!("data:image/png;base64,{}", encode_base64(&sample_png(4, 3)));
        let image = decode_image(&payload).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.format(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_decode_image_rejects_non_image_bytes() {
        // "foo"
        assert!(matches!(decode_image("Zm9v"), Err(DecodeError::Image(_))));
    }
}
