//! The interactive stroke capture surface.
//!
//! A surface of logical size W×H is backed by a physical buffer of W·D × H·D
//! pixels. Input arrives in client coordinates, is mapped into buffer space
//! and rasterized one segment per move event.

use crate::geometry::{client_to_buffer, PixelRatio};
use crate::input::{InputResponse, PointerEvent, PointerPhase, PointerSource};
use crate::raster::Raster;
use crate::stroke::{StrokeState, StrokeStyle};
use kurbo::{Point, Rect, Size};

/// Freehand drawing surface with its own ink raster.
#[derive(Debug, Clone)]
pub struct CaptureSurface {
    /// Logical (CSS) size.
    logical: Size,
    /// Device pixel ratio the buffer was allocated for.
    pixel_ratio: PixelRatio,
    /// Ink buffer at physical resolution.
    raster: Raster,
    /// On-screen box of the surface in client coordinates.
    screen_rect: Rect,
    /// Drawing state machine.
    state: StrokeState,
    /// Ink style.
    style: StrokeStyle,
    /// Segments drawn by the current (or most recent) stroke.
    stroke_segments: usize,
    /// Segments drawn since the last clear.
    total_segments: usize,
}

impl CaptureSurface {
    /// Create and activate a surface of `width`×`height` logical pixels.
    ///
    /// Returns `None` if the physical buffer cannot be allocated.
    pub fn new(width: u32, height: u32, pixel_ratio: PixelRatio) -> Option<Self> {
        let logical = Size::new(width as f64, height as f64);
        let raster = allocate(logical, pixel_ratio)?;
        Some(Self {
            logical,
            pixel_ratio,
            raster,
            screen_rect: logical.to_rect(),
            state: StrokeState::Idle,
            style: StrokeStyle::default(),
            stroke_segments: 0,
            total_segments: 0,
        })
    }

    /// Set the ink style. Existing ink is left as is.
    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    /// Reallocate for new logical dimensions. Prior ink is discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let logical = Size::new(width as f64, height as f64);
        let Some(raster) = allocate(logical, self.pixel_ratio) else {
            log::warn!("Cannot allocate capture surface {}x{}", width, height);
            return false;
        };
        // Keep the on-screen origin; the CSS box follows the logical size.
        self.screen_rect = Rect::from_origin_size(self.screen_rect.origin(), logical);
        self.logical = logical;
        self.reset(raster);
        true
    }

    /// Reallocate for a new device pixel ratio. Prior ink is discarded.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: PixelRatio) -> bool {
        let Some(raster) = allocate(self.logical, pixel_ratio) else {
            log::warn!("Cannot allocate capture surface at ratio {}", pixel_ratio.get());
            return false;
        };
        self.pixel_ratio = pixel_ratio;
        self.reset(raster);
        true
    }

    /// Record where the surface sits on screen, in client coordinates.
    pub fn set_screen_rect(&mut self, rect: Rect) {
        self.screen_rect = rect;
    }

    /// Erase all ink and end any stroke.
    pub fn clear(&mut self) {
        self.raster.clear();
        self.state = StrokeState::Idle;
        self.stroke_segments = 0;
        self.total_segments = 0;
    }

    fn reset(&mut self, raster: Raster) {
        self.raster = raster;
        self.state = StrokeState::Idle;
        self.stroke_segments = 0;
        self.total_segments = 0;
    }

    /// Feed one pointer or touch event through the state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputResponse {
        let mut response = InputResponse::default();

        match event.phase {
            PointerPhase::Down => {
                let point = self.to_buffer(event.client);
                self.state.begin(point);
                self.stroke_segments = 0;
            }
            PointerPhase::Move => {
                let point = self.to_buffer(event.client);
                if let Some(segment) = self.state.extend(point) {
                    self.raster
                        .stroke_segment(&segment, &self.style, self.pixel_ratio.get());
                    self.stroke_segments += 1;
                    self.total_segments += 1;
                    response.segment = Some(segment);
                }
            }
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => {
                if self.state.end() {
                    log::debug!("Stroke ended with {} segments", self.stroke_segments);
                }
            }
        }

        response.prevent_default = event.source == PointerSource::Touch && self.state.is_drawing();
        response
    }

    /// Map a client coordinate into buffer space.
    pub fn to_buffer(&self, client: Point) -> Point {
        client_to_buffer(client, self.screen_rect, self.buffer_size())
    }

    /// Whether a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.state.is_drawing()
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Logical (CSS) size.
    pub fn logical_size(&self) -> Size {
        self.logical
    }

    /// Physical buffer size in pixels.
    pub fn buffer_size(&self) -> Size {
        Size::new(self.raster.width() as f64, self.raster.height() as f64)
    }

    pub fn pixel_ratio(&self) -> PixelRatio {
        self.pixel_ratio
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Segments drawn by the current or most recent stroke.
    pub fn stroke_segments(&self) -> usize {
        self.stroke_segments
    }

    /// Segments drawn since the surface was last cleared.
    pub fn total_segments(&self) -> usize {
        self.total_segments
    }

    /// True when no ink has been laid down.
    pub fn is_blank(&self) -> bool {
        self.raster.is_fully_transparent()
    }

    /// Read-only view of the ink raster.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

fn allocate(logical: Size, pixel_ratio: PixelRatio) -> Option<Raster> {
    let (width, height) = pixel_ratio.physical_size(logical);
    Raster::new(width, height)
}
