//! Signpad Core Library
//!
//! Platform-agnostic signature capture and export: freehand strokes on a
//! HiDPI raster surface, background compositing, encoding under a byte budget,
//! and the near-white keying preview.

pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod keying;
pub mod raster;
pub mod stroke;
pub mod surface;
pub mod upload;

pub use config::{
    BackgroundColor, ConfigError, ConfigField, ExportConfig, ExportFormat, ExportProfile,
    PresetColor, PRESET_COLORS,
};
pub use encode::{BoxFuture, RasterEncoder, StandardEncoder, DEFAULT_QUALITY};
pub use error::{ExportError, ExportResult};
pub use export::{
    check_size, compose, DownloadSink, ExportFile, ExportPipeline, ExportReport, ExportSource,
};
pub use geometry::{client_to_buffer, PixelRatio};
pub use input::{InputResponse, PointerEvent, PointerPhase, PointerSource};
pub use keying::{key_near_white, removal_preview, NEAR_WHITE_THRESHOLD};
pub use raster::Raster;
pub use stroke::{Segment, StrokeState, StrokeStyle, DEFAULT_STROKE_WIDTH};
pub use surface::CaptureSurface;
pub use upload::UploadedImage;
