//! The export pipeline: composite, encode, enforce the size cap, deliver.
//!
//! ```text
//! source raster ──► output buffer (W×H) ──► encoder ──► size check ──► sink
//!                   (+ background fill)
//! ```
//!
//! Every failure aborts the attempt before the sink is touched, so a rejected
//! export never leaves a partial file behind.

use crate::config::{ExportConfig, ExportFormat};
use crate::encode::{RasterEncoder, StandardEncoder};
use crate::error::{ExportError, ExportResult};
use crate::raster::Raster;
use crate::surface::CaptureSurface;
use crate::upload::UploadedImage;

/// Where the exported pixels come from. Exactly one source is active.
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    /// A user-uploaded image.
    Uploaded(&'a UploadedImage),
    /// The ink on the capture surface.
    Drawn(&'a CaptureSurface),
}

impl<'a> ExportSource<'a> {
    /// Pick the upload when present, else the drawing surface.
    pub fn select(
        upload: Option<&'a UploadedImage>,
        surface: Option<&'a CaptureSurface>,
    ) -> Option<Self> {
        upload
            .map(ExportSource::Uploaded)
            .or_else(|| surface.map(ExportSource::Drawn))
    }

    pub fn raster(&self) -> &'a Raster {
        match self {
            ExportSource::Uploaded(image) => image.raster(),
            ExportSource::Drawn(surface) => surface.raster(),
        }
    }
}

/// An encoded file on its way to the user.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: format.file_name(),
            mime_type: format.mime_type(),
            bytes,
        }
    }
}

/// Hands a finished file to the user (browser download, file on disk...).
pub trait DownloadSink {
    /// Deliver the file. Called at most once per export.
    fn deliver(&mut self, file: &ExportFile) -> ExportResult<()>;
}

/// Summary of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub file_name: String,
    pub mime_type: &'static str,
    pub byte_len: usize,
    pub width: u32,
    pub height: u32,
}

/// Runs exports with a given encoder.
#[derive(Debug, Clone, Default)]
pub struct ExportPipeline<E = StandardEncoder> {
    encoder: E,
}

impl<E: RasterEncoder> ExportPipeline<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Encode a composited buffer, check it against the cap, and deliver it.
    pub async fn finish(
        &self,
        output: Raster,
        config: &ExportConfig,
        sink: &mut dyn DownloadSink,
    ) -> ExportResult<ExportReport> {
        let format = config.format();
        let bytes = self.encoder.encode(&output, format).await?;
        if bytes.is_empty() {
            return Err(ExportError::EmptyEncoding);
        }
        check_size(bytes.len(), config)?;

        let file = ExportFile::new(format, bytes);
        sink.deliver(&file)?;

        log::info!(
            "Exported {} ({} bytes, {}x{})",
            file.name,
            file.bytes.len(),
            output.width(),
            output.height()
        );
        Ok(ExportReport {
            file_name: file.name,
            mime_type: file.mime_type,
            byte_len: file.bytes.len(),
            width: output.width(),
            height: output.height(),
        })
    }

    /// Run one complete export.
    pub async fn run(
        &self,
        source: Option<ExportSource<'_>>,
        config: &ExportConfig,
        sink: &mut dyn DownloadSink,
    ) -> ExportResult<ExportReport> {
        let output = compose(source, config)?;
        self.finish(output, config, sink).await
    }
}

/// Composite the source onto a fresh buffer of the configured size.
///
/// The background (if enabled) is filled first and the source is stretched
/// over the whole buffer.
pub fn compose(source: Option<ExportSource<'_>>, config: &ExportConfig) -> ExportResult<Raster> {
    let source = source.ok_or(ExportError::NoSignature)?;
    let (width, height) = (config.width(), config.height());
    let mut output =
        Raster::new(width, height).ok_or(ExportError::ContextUnavailable { width, height })?;

    if let Some(color) = config.background() {
        output.fill(color);
    }
    output.draw_stretched(source.raster());
    Ok(output)
}

/// Reject encodings above `max_size_kb * 1024` bytes. The cap itself is allowed.
pub fn check_size(byte_len: usize, config: &ExportConfig) -> ExportResult<()> {
    if byte_len > config.max_size_bytes() {
        log::warn!(
            "Export of {} bytes exceeds the {}KB limit",
            byte_len,
            config.max_size_kb()
        );
        return Err(ExportError::SizeLimitExceeded {
            size: byte_len,
            limit_kb: config.max_size_kb(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::BoxFuture;
    use crate::geometry::PixelRatio;
    use crate::input::{PointerEvent, PointerPhase};
    use kurbo::Point;

    /// Encoder that returns a fixed number of bytes.
    struct FixedSizeEncoder(usize);

    impl RasterEncoder for FixedSizeEncoder {
        fn encode<'a>(
            &'a self,
            _raster: &'a Raster,
            _format: ExportFormat,
        ) -> BoxFuture<'a, ExportResult<Vec<u8>>> {
            let len = self.0;
            Box::pin(async move { Ok(vec![0xAB; len]) })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        files: Vec<ExportFile>,
    }

    impl DownloadSink for RecordingSink {
        fn deliver(&mut self, file: &ExportFile) -> ExportResult<()> {
            self.files.push(file.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl DownloadSink for FailingSink {
        fn deliver(&mut self, _file: &ExportFile) -> ExportResult<()> {
            Err(ExportError::Delivery("disk full".to_string()))
        }
    }

    fn drawn_surface() -> CaptureSurface {
        let mut surface = CaptureSurface::new(350, 150, PixelRatio::new(2.0)).unwrap();
        surface.handle_pointer(PointerEvent::mouse(PointerPhase::Down, Point::new(20.0, 75.0)));
        surface.handle_pointer(PointerEvent::mouse(PointerPhase::Move, Point::new(180.0, 40.0)));
        surface.handle_pointer(PointerEvent::mouse(PointerPhase::Move, Point::new(330.0, 110.0)));
        surface.handle_pointer(PointerEvent::mouse(PointerPhase::Up, Point::new(330.0, 110.0)));
        surface
    }

    #[test]
    fn test_no_source_aborts() {
        let config = ExportConfig::default();
        let mut sink = RecordingSink::default();
        let pipeline = ExportPipeline::<StandardEncoder>::default();

        let result = pollster::block_on(pipeline.run(None, &config, &mut sink));
        assert!(matches!(result, Err(ExportError::NoSignature)));
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_empty_surface_exports_transparent() {
        let surface = CaptureSurface::new(350, 150, PixelRatio::new(2.0)).unwrap();
        let mut config = ExportConfig::default();
        config.set_width(200);
        config.set_height(80);

        let output = compose(Some(ExportSource::Drawn(&surface)), &config).unwrap();
        assert_eq!((output.width(), output.height()), (200, 80));
        assert!(output.is_fully_transparent());
    }

    #[test]
    fn test_background_fill_under_ink() {
        let surface = drawn_surface();
        let mut config = ExportConfig::default();
        config.set_background_enabled(true);
        config.set_background_color("#FFEFD5");

        let output = compose(Some(ExportSource::Drawn(&surface)), &config).unwrap();
        // Corner has no ink, only background.
        assert_eq!(output.pixel(0, 0), Some([255, 239, 213, 255]));
        assert!(output.to_straight_rgba().chunks_exact(4).all(|px| px[3] == 255));
        // Somewhere along the stroke the ink darkened the fill.
        assert!(output.to_straight_rgba().chunks_exact(4).any(|px| px[0] < 128));
    }

    #[test]
    fn test_upload_takes_priority() {
        let surface = drawn_surface();
        let mut red = Raster::new(10, 10).unwrap();
        red.fill(peniko::Color::from_rgba8(255, 0, 0, 255));
        let png = StandardEncoder::default().encode_now(&red, ExportFormat::Png).unwrap();
        let upload = UploadedImage::decode(&png).unwrap();

        let source = ExportSource::select(Some(&upload), Some(&surface)).unwrap();
        assert!(matches!(source, ExportSource::Uploaded(_)));

        let output = compose(Some(source), &ExportConfig::default()).unwrap();
        let px = output.pixel(175, 75).unwrap();
        assert!(px[0] >= 254 && px[1] <= 1 && px[3] == 255);

        assert!(matches!(
            ExportSource::select(None, Some(&surface)),
            Some(ExportSource::Drawn(_))
        ));
        assert!(ExportSource::select(None, None).is_none());
    }

    #[test]
    fn test_over_cap_rejected_without_delivery() {
        let surface = drawn_surface();
        let mut config = ExportConfig::default();
        config.set_max_size_kb(10);
        let pipeline = ExportPipeline::new(FixedSizeEncoder(10 * 1024 + 1));
        let mut sink = RecordingSink::default();

        let result = pollster::block_on(pipeline.run(
            Some(ExportSource::Drawn(&surface)),
            &config,
            &mut sink,
        ));

        assert!(matches!(
            result,
            Err(ExportError::SizeLimitExceeded { size: 10241, limit_kb: 10 })
        ));
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_at_cap_delivered_once() {
        let surface = drawn_surface();
        let mut config = ExportConfig::default();
        config.set_max_size_kb(10);
        config.set_format(ExportFormat::Jpg);
        let pipeline = ExportPipeline::new(FixedSizeEncoder(10 * 1024));
        let mut sink = RecordingSink::default();

        let report = pollster::block_on(pipeline.run(
            Some(ExportSource::Drawn(&surface)),
            &config,
            &mut sink,
        ))
        .unwrap();

        assert_eq!(sink.files.len(), 1);
        assert_eq!(sink.files[0].name, "signature.jpg");
        assert_eq!(sink.files[0].mime_type, "image/jpg");
        assert_eq!(report.byte_len, 10 * 1024);
        assert_eq!((report.width, report.height), (350, 150));
    }

    #[test]
    fn test_empty_encoding_aborts() {
        let surface = drawn_surface();
        let pipeline = ExportPipeline::new(FixedSizeEncoder(0));
        let mut sink = RecordingSink::default();

        let result = pollster::block_on(pipeline.run(
            Some(ExportSource::Drawn(&surface)),
            &ExportConfig::default(),
            &mut sink,
        ));
        assert!(matches!(result, Err(ExportError::EmptyEncoding)));
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_delivery_failure_reported() {
        let surface = drawn_surface();
        let pipeline = ExportPipeline::new(FixedSizeEncoder(100));

        let result = pollster::block_on(pipeline.run(
            Some(ExportSource::Drawn(&surface)),
            &ExportConfig::default(),
            &mut FailingSink,
        ));
        assert!(matches!(result, Err(ExportError::Delivery(_))));
    }

    #[test]
    fn test_encoded_dimensions_match_request() {
        // Physical buffer is 700x300; the output is stretched, not cropped.
        let surface = drawn_surface();
        let pipeline = ExportPipeline::<StandardEncoder>::default();

        for format in ExportFormat::ALL {
            let mut config = ExportConfig::for_profile(crate::config::ExportProfile::Resize);
            config.set_width(120);
            config.set_height(400);
            config.set_format(format);
            let mut sink = RecordingSink::default();

            pollster::block_on(pipeline.run(
                Some(ExportSource::Drawn(&surface)),
                &config,
                &mut sink,
            ))
            .unwrap();

            let decoded = image::load_from_memory(&sink.files[0].bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (120, 400), "{:?}", format);
        }
    }

    #[test]
    fn test_check_size_boundary() {
        let config = ExportConfig::default();
        assert!(check_size(45 * 1024, &config).is_ok());
        assert!(check_size(45 * 1024 + 1, &config).is_err());
    }
}
