//! JPEG encoding of rasterized snapshots.

use image::ImageEncoder as _;

use fundraw_core::{ExportError, ExportResult};

use crate::raster::PixelBuffer;

/// Quality used for every snapshot export.
pub const JPEG_QUALITY: u8 = 90;

/// Format of an [`EncodedImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedFormat {
    /// Baseline JPEG.
    Jpeg,
}

impl EncodedFormat {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
        }
    }
}

/// Encoded image bytes plus how they were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    format: EncodedFormat,
    quality: u8,
}

impl EncodedImage {
    /// The encoded byte stream.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The encoding format.
    #[must_use]
    pub fn format(&self) -> EncodedFormat {
        self.format
    }

    /// The quality the image was encoded at (1-100).
    #[must_use]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Compresses pixel buffers into JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageEncoder;

impl ImageEncoder {
    /// Encode a buffer at the given quality (clamped to 1-100).
    ///
    /// JPEG has no alpha channel, so translucent pixels are flattened over
    /// opaque white first.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Encode`] if the encoder rejects the buffer, for
    /// example when a dimension exceeds what JPEG can represent.
    pub fn encode(&self, buffer: &PixelBuffer, quality: u8) -> ExportResult<EncodedImage> {
        let quality = quality.clamp(1, 100);
        let (width, height) = (buffer.width(), buffer.height());

        let rgb = flatten_over_white(buffer.data())?;

        let mut out = std::io::Cursor::new(Vec::new());
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| ExportError::Encode(format!("JPEG encoding failed: {e}")))?;

        let bytes = out.into_inner();
        tracing::debug!(
            "Encoded {}x{} snapshot to {} bytes (quality {})",
            width,
            height,
            bytes.len(),
            quality
        );

        Ok(EncodedImage {
            bytes,
            format: EncodedFormat::Jpeg,
            quality,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn flatten_over_white(rgba: &[u8]) -> ExportResult<Vec<u8>> {
    let mut rgb = Vec::new();
    rgb.try_reserve_exact(rgba.len() / 4 * 3)
        .map_err(|e| ExportError::Encode(format!("Failed to allocate RGB buffer: {e}")))?;

    for px in rgba.chunks_exact(4) {
        let alpha = u16::from(px[3]);
        let inv = 255 - alpha;
        for &channel in &px[..3] {
            // Rounded (c * a + 255 * (255 - a)) / 255; never exceeds 255.
            let blended = (u16::from(channel) * alpha + 255 * inv + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> PixelBuffer {
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        PixelBuffer::from_rgba(width, height, data).expect("buffer")
    }

    #[test]
    fn test_jpeg_magic_and_metadata() {
        let encoded = ImageEncoder
            .encode(&solid(16, 16, [0, 128, 255, 255]), JPEG_QUALITY)
            .expect("encode");
        assert_eq!(&encoded.bytes()[0..2], &[0xFF, 0xD8]);
        assert_eq!(encoded.format(), EncodedFormat::Jpeg);
        assert_eq!(encoded.quality(), 90);
        assert!(!encoded.is_empty());
    }

    #[test]
    fn test_encode_is_byte_stable() {
        let buffer = solid(33, 17, [12, 34, 56, 255]);
        let first = ImageEncoder.encode(&buffer, JPEG_QUALITY).expect("first");
        let second = ImageEncoder.encode(&buffer, JPEG_QUALITY).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_does_not_mutate_input() {
        let buffer = solid(8, 8, [1, 2, 3, 4]);
        let before = buffer.clone();
        ImageEncoder.encode(&buffer, JPEG_QUALITY).expect("encode");
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_oversized_buffer_is_encode_error() {
        // One row wider than JPEG's 65535 limit.
        let buffer = solid(70_000, 1, [0, 0, 0, 255]);
        let err = ImageEncoder
            .encode(&buffer, JPEG_QUALITY)
            .expect_err("too wide");
        assert!(matches!(err, ExportError::Encode(_)));
    }

    #[test]
    fn test_flatten_over_white() {
        let rgb = flatten_over_white(&[0, 0, 0, 0, 255, 0, 0, 255, 0, 0, 0, 128]).expect("flatten");
        assert_eq!(rgb, vec![255, 255, 255, 255, 0, 0, 127, 127, 127]);
    }

    #[test]
    fn test_decodes_to_same_dimensions() {
        let encoded = ImageEncoder
            .encode(&solid(21, 13, [255, 255, 255, 255]), JPEG_QUALITY)
            .expect("encode");
        let decoded = image::load_from_memory(encoded.bytes()).expect("decode");
        assert_eq!(decoded.width(), 21);
        assert_eq!(decoded.height(), 13);
    }
}
