//! Decoding of user-uploaded signature images.

use crate::error::{ExportError, ExportResult};
use crate::raster::Raster;
use image::ImageFormat;

/// A decoded upload, ready to be used as export source.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    raster: Raster,
    source_format: ImageFormat,
    byte_len: usize,
}

impl UploadedImage {
    /// Sniff and decode raw file bytes.
    pub fn decode(bytes: &[u8]) -> ExportResult<Self> {
        if bytes.is_empty() {
            return Err(ExportError::Decode("empty file".to_string()));
        }

        let source_format =
            image::guess_format(bytes).map_err(|e| ExportError::Decode(e.to_string()))?;
        let rgba = image::load_from_memory_with_format(bytes, source_format)
            .map_err(|e| ExportError::Decode(e.to_string()))?
            .to_rgba8();

        let (width, height) = rgba.dimensions();
        let raster = Raster::from_straight_rgba(width, height, rgba.as_raw()).ok_or_else(|| {
            ExportError::Decode(format!("unsupported image size {}x{}", width, height))
        })?;

        log::info!(
            "Decoded {:?} upload: {}x{} ({} bytes)",
            source_format,
            width,
            height,
            bytes.len()
        );

        Ok(Self {
            raster,
            source_format,
            byte_len: bytes.len(),
        })
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Format detected from the file's magic bytes.
    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    /// Native width in pixels.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Native height in pixels.
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Size of the uploaded file.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportFormat;
    use crate::encode::StandardEncoder;
    use peniko::Color;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut raster = Raster::new(width, height).unwrap();
        raster.fill(Color::from_rgba8(12, 34, 56, 255));
        StandardEncoder::default()
            .encode_now(&raster, ExportFormat::Png)
            .unwrap()
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(80, 20);
        let upload = UploadedImage::decode(&bytes).unwrap();
        assert_eq!(upload.source_format(), ImageFormat::Png);
        assert_eq!((upload.width(), upload.height()), (80, 20));
        assert_eq!(upload.byte_len(), bytes.len());
        assert_eq!(upload.raster().pixel(40, 10), Some([12, 34, 56, 255]));
    }

    #[test]
    fn test_decode_other_upload_formats() {
        let image = image::RgbaImage::from_pixel(8, 4, image::Rgba([12, 34, 56, 255]));

        for format in [ImageFormat::WebP, ImageFormat::Bmp, ImageFormat::Gif] {
            let mut bytes = std::io::Cursor::new(Vec::new());
            image.write_to(&mut bytes, format).unwrap();

            let upload = UploadedImage::decode(bytes.get_ref()).unwrap();
            assert_eq!(upload.source_format(), format);
            assert_eq!((upload.width(), upload.height()), (8, 4), "{:?}", format);
            if format != ImageFormat::Gif {
                // Lossless formats keep the exact color.
                assert_eq!(upload.raster().pixel(3, 2), Some([12, 34, 56, 255]));
            }
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(UploadedImage::decode(&[]), Err(ExportError::Decode(_))));
        assert!(matches!(
            UploadedImage::decode(b"definitely not an image"),
            Err(ExportError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let bytes = png_bytes(30, 30);
        assert!(UploadedImage::decode(&bytes[..bytes.len() / 2]).is_err());
    }
}
