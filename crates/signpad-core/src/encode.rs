//! Raster to file-bytes encoding.

use crate::config::ExportFormat;
use crate::error::{ExportError, ExportResult};
use crate::raster::Raster;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Quality factor applied to lossy formats.
pub const DEFAULT_QUALITY: f32 = 0.8;

/// Turns a raster into encoded file bytes.
///
/// This is the one asynchronous step of an export; callers await the bytes
/// before the size check.
pub trait RasterEncoder {
    fn encode<'a>(
        &'a self,
        raster: &'a Raster,
        format: ExportFormat,
    ) -> BoxFuture<'a, ExportResult<Vec<u8>>>;
}

/// PNG through the `png` crate, JPEG through `image`.
#[derive(Debug, Clone, Copy)]
pub struct StandardEncoder {
    quality: f32,
}

impl Default for StandardEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl StandardEncoder {
    /// Create an encoder with a lossy quality factor in `0.0..=1.0`.
    pub fn new(quality: f32) -> Self {
        let quality = if quality.is_finite() {
            quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY
        };
        Self { quality }
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Quality on the JPEG encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Encode synchronously.
    pub fn encode_now(&self, raster: &Raster, format: ExportFormat) -> ExportResult<Vec<u8>> {
        let bytes = match format {
            ExportFormat::Png => encode_png(raster)?,
            ExportFormat::Jpg | ExportFormat::Jpeg => encode_jpeg(raster, self.jpeg_quality())?,
        };
        if bytes.is_empty() {
            return Err(ExportError::EmptyEncoding);
        }
        Ok(bytes)
    }
}

impl RasterEncoder for StandardEncoder {
    fn encode<'a>(
        &'a self,
        raster: &'a Raster,
        format: ExportFormat,
    ) -> BoxFuture<'a, ExportResult<Vec<u8>>> {
        Box::pin(async move { self.encode_now(raster, format) })
    }
}

fn encode_png(raster: &Raster) -> ExportResult<Vec<u8>> {
    let rgba = raster.to_straight_rgba();
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, raster.width(), raster.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// JPEG has no alpha; transparent areas come out black, as from a browser canvas.
fn encode_jpeg(raster: &Raster, quality: u8) -> ExportResult<Vec<u8>> {
    let rgb: Vec<u8> = raster
        .to_straight_rgba()
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as u32;
            let over_black = |c: u8| ((c as u32 * a + 127) / 255) as u8;
            [over_black(px[0]), over_black(px[1]), over_black(px[2])]
        })
        .collect();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, quality)
        .encode(&rgb, raster.width(), raster.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(jpeg_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::Color;

    fn ink_sample() -> Raster {
        let mut raster = Raster::new(64, 32).unwrap();
        raster.fill(Color::from_rgba8(255, 255, 255, 255));
        raster
    }

    #[test]
    fn test_quality_scale() {
        assert_eq!(StandardEncoder::default().jpeg_quality(), 80);
        assert_eq!(StandardEncoder::new(2.0).jpeg_quality(), 100);
        assert_eq!(StandardEncoder::new(0.0).jpeg_quality(), 1);
        assert!((StandardEncoder::new(f32::NAN).quality() - DEFAULT_QUALITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_png_signature_and_size() {
        let bytes = StandardEncoder::default()
            .encode_now(&ink_sample(), ExportFormat::Png)
            .unwrap();
        assert!(bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]));

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn test_png_keeps_transparency() {
        let raster = Raster::new(10, 10).unwrap();
        let bytes = StandardEncoder::default()
            .encode_now(&raster, ExportFormat::Png)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert!(decoded.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_jpeg_flattens_over_black() {
        let raster = Raster::new(16, 16).unwrap();
        let bytes = pollster::block_on(
            StandardEncoder::default().encode(&raster, ExportFormat::Jpeg),
        )
        .unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c < 8)));
    }

    #[test]
    fn test_jpg_and_jpeg_share_codec() {
        let encoder = StandardEncoder::default();
        let jpg = encoder.encode_now(&ink_sample(), ExportFormat::Jpg).unwrap();
        let jpeg = encoder.encode_now(&ink_sample(), ExportFormat::Jpeg).unwrap();
        assert_eq!(jpg, jpeg);
    }
}
