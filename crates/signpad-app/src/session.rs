//! One signature editing session: a capture surface, an optional upload and
//! the export settings, as driven by a single page.

use kurbo::Rect;
use signpad_core::{
    compose, CaptureSurface, ConfigField, DownloadSink, ExportConfig, ExportError, ExportFormat,
    ExportPipeline, ExportProfile, ExportReport, ExportResult, ExportSource, InputResponse,
    PixelRatio, PointerEvent, Raster, UploadedImage, removal_preview,
};
use std::cell::Cell;
use std::rc::Rc;

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message for the host to show (as a toast or similar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a failed operation.
    pub fn from_error(error: &ExportError) -> Self {
        Self::error(error.user_message())
    }

    /// Notice for the outcome of an export.
    pub fn from_export(result: &ExportResult<ExportReport>) -> Self {
        match result {
            Ok(_) => Self::success("Signature downloaded successfully!"),
            Err(e) => Self::from_error(e),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// State behind one signature page.
#[derive(Debug)]
pub struct SignatureSession {
    config: ExportConfig,
    surface: CaptureSurface,
    upload: Option<UploadedImage>,
    pipeline: ExportPipeline,
    /// Exports started but not yet settled.
    in_flight: Rc<Cell<usize>>,
}

impl SignatureSession {
    /// Start a session with the profile's defaults.
    pub fn new(profile: ExportProfile, pixel_ratio: PixelRatio) -> ExportResult<Self> {
        Self::with_config(ExportConfig::for_profile(profile), pixel_ratio)
    }

    /// Start a session from an existing configuration (validated first).
    pub fn with_config(config: ExportConfig, pixel_ratio: PixelRatio) -> ExportResult<Self> {
        let config = config.validated();
        let (width, height) = (config.width(), config.height());
        let surface = CaptureSurface::new(width, height, pixel_ratio)
            .ok_or(ExportError::ContextUnavailable { width, height })?;
        Ok(Self {
            config,
            surface,
            upload: None,
            pipeline: ExportPipeline::default(),
            in_flight: Rc::new(Cell::new(0)),
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn surface(&self) -> &CaptureSurface {
        &self.surface
    }

    pub fn uploaded(&self) -> Option<&UploadedImage> {
        self.upload.as_ref()
    }

    /// Whether an export is in flight.
    pub fn busy(&self) -> bool {
        self.in_flight.get() > 0
    }

    // --- Configuration ---

    /// Apply a config change. A new output size is committed only once the
    /// drawing surface has been reallocated for it; its ink does not survive.
    fn update_config(&mut self, change: impl FnOnce(&mut ExportConfig) -> bool) -> bool {
        let mut next = self.config.clone();
        if !change(&mut next) {
            return false;
        }

        let logical = self.surface.logical_size();
        let (width, height) = (next.width(), next.height());
        if (logical.width as u32 != width || logical.height as u32 != height)
            && !self.surface.resize(width, height)
        {
            log::warn!(
                "Keeping {}x{}: surface could not be reallocated",
                logical.width,
                logical.height
            );
            return false;
        }

        self.config = next;
        true
    }

    pub fn set_width(&mut self, width: u32) -> bool {
        self.update_config(|config| config.set_width(width))
    }

    pub fn set_height(&mut self, height: u32) -> bool {
        self.update_config(|config| config.set_height(height))
    }

    pub fn set_max_size_kb(&mut self, max_size_kb: u32) -> bool {
        self.config.set_max_size_kb(max_size_kb)
    }

    /// Apply raw text from a numeric form field.
    pub fn set_from_input(&mut self, field: ConfigField, raw: &str) -> bool {
        self.update_config(|config| config.set_from_input(field, raw))
    }

    pub fn set_background_enabled(&mut self, enabled: bool) {
        self.config.set_background_enabled(enabled);
    }

    pub fn set_background_color(&mut self, text: &str) -> bool {
        self.config.set_background_color(text)
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.config.set_format(format);
    }

    pub fn set_format_name(&mut self, name: &str) -> bool {
        self.config.set_format_name(name)
    }

    // --- Drawing ---

    /// The display changed density; the surface is reallocated and cleared.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: PixelRatio) -> bool {
        self.surface.set_pixel_ratio(pixel_ratio)
    }

    /// Where the surface sits on screen, in client coordinates.
    pub fn set_screen_rect(&mut self, rect: Rect) {
        self.surface.set_screen_rect(rect);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputResponse {
        self.surface.handle_pointer(event)
    }

    pub fn clear_drawing(&mut self) {
        self.surface.clear();
    }

    // --- Upload ---

    /// Replace the uploaded image. On failure the previous upload is kept.
    pub fn upload(&mut self, bytes: &[u8]) -> Result<(), Notice> {
        match UploadedImage::decode(bytes) {
            Ok(image) => {
                self.upload = Some(image);
                Ok(())
            }
            Err(e) => {
                log::warn!("Upload rejected: {}", e);
                Err(Notice::from_error(&e))
            }
        }
    }

    pub fn clear_upload(&mut self) {
        self.upload = None;
    }

    /// Background-removal preview of the upload, over the background if enabled.
    pub fn removal_preview(&self) -> Option<Raster> {
        let upload = self.upload.as_ref()?;
        removal_preview(upload.raster(), self.config.background())
    }

    // --- Export ---

    /// Composite the active source at the configured size.
    pub fn prepare_export(&self) -> ExportResult<Raster> {
        let source = ExportSource::select(self.upload.as_ref(), Some(&self.surface));
        compose(source, &self.config)
    }

    /// Composite now and hand back the rest of the export.
    ///
    /// The session stays `busy` until the returned export settles or is
    /// dropped. Overlapping exports are not serialized; each runs independently.
    pub fn start_export(&self) -> PendingExport {
        PendingExport {
            prepared: self.prepare_export(),
            config: self.config.clone(),
            pipeline: self.pipeline.clone(),
            _in_flight: InFlight::enter(&self.in_flight),
        }
    }

    /// Run one export and report the outcome.
    pub async fn export(&self, sink: &mut dyn DownloadSink) -> Notice {
        self.start_export().finish(sink).await
    }
}

/// Counts an export as in flight for as long as it lives.
#[derive(Debug)]
struct InFlight(Rc<Cell<usize>>);

impl InFlight {
    fn enter(counter: &Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        Self(Rc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// An export whose output is composited and whose encoding is still ahead.
///
/// Owns everything it needs, so the session stays free for input meanwhile.
#[derive(Debug)]
pub struct PendingExport {
    prepared: ExportResult<Raster>,
    config: ExportConfig,
    pipeline: ExportPipeline,
    _in_flight: InFlight,
}

impl PendingExport {
    /// Encode, check the size cap and deliver.
    pub async fn finish(self, sink: &mut dyn DownloadSink) -> Notice {
        let result = match self.prepared {
            Ok(output) => self.pipeline.finish(output, &self.config, sink).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            log::error!("Export failed: {}", e);
        }
        Notice::from_export(&result)
    }
}
