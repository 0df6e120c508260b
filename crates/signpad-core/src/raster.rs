//! CPU raster buffer backed by a premultiplied RGBA pixmap.

use crate::stroke::{Segment, StrokeStyle};
use peniko::Color;
use std::fmt;
use tiny_skia::{
    ColorU8, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

/// Largest accepted buffer dimension (same as Chrome's canvas limit).
pub const MAX_DIMENSION: u32 = 32767;

fn skia_color(color: Color) -> tiny_skia::Color {
    let rgba = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

/// A pixel grid that ink, fills and other rasters can be drawn onto.
#[derive(Clone)]
pub struct Raster {
    pixmap: Pixmap,
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Raster {
    /// Allocate a fully transparent buffer.
    ///
    /// Returns `None` for zero or oversized dimensions.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return None;
        }
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    /// Build a raster from straight (non-premultiplied) RGBA8 bytes.
    pub fn from_straight_rgba(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return None;
        }
        let size = IntSize::from_wh(width, height)?;
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }

        let data = rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let p = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
                [p.red(), p.green(), p.blue(), p.alpha()]
            })
            .collect();
        Pixmap::from_vec(data, size).map(|pixmap| Self { pixmap })
    }

    /// Copy out the pixels as straight RGBA8, row-major.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Replace every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    /// Erase to fully transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// True when no pixel carries any alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Stroke one segment with round caps and joins.
    ///
    /// The segment is in buffer coordinates; `scale` maps the style's logical
    /// width to buffer pixels.
    pub fn stroke_segment(&mut self, segment: &Segment, style: &StrokeStyle, scale: f64) {
        let mut pb = PathBuilder::new();
        pb.move_to(segment.from.x as f32, segment.from.y as f32);
        pb.line_to(segment.to.x as f32, segment.to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(skia_color(style.color));
        paint.anti_alias = true;

        let stroke = Stroke {
            width: (style.width * scale) as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draw `source` over this raster, stretched to cover it exactly.
    ///
    /// Aspect ratio is not preserved. Same-size sources are copied pixel for pixel.
    pub fn draw_stretched(&mut self, source: &Raster) {
        let sx = self.width() as f32 / source.width() as f32;
        let sy = self.height() as f32 / source.height() as f32;
        let quality = if source.width() == self.width() && source.height() == self.height() {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.pixmap.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
    }
}
