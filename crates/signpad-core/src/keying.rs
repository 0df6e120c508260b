//! Near-white background keying for the removal preview.
//!
//! A single global threshold: any pixel whose red, green and blue are all
//! above it becomes fully transparent. There is no anti-aliasing tolerance or
//! edge smoothing, so this is only right for ink on a near-pure-white ground.

use crate::raster::Raster;
use peniko::Color;

/// Channel value a pixel must exceed on all of R, G and B to count as background.
pub const NEAR_WHITE_THRESHOLD: u8 = 240;

/// Zero the alpha of every near-white pixel in a straight RGBA8 buffer.
///
/// Pixels are independent, so this is a plain map over 4-byte chunks.
/// A trailing partial pixel is left alone. Returns the number of pixels keyed.
pub fn key_near_white(rgba: &mut [u8], threshold: u8) -> usize {
    let mut keyed = 0;
    for px in rgba.chunks_exact_mut(4) {
        if px[0] > threshold && px[1] > threshold && px[2] > threshold {
            px[3] = 0;
            keyed += 1;
        }
    }
    keyed
}

/// Render the background-removal preview of `source` at its native size.
///
/// The optional background is filled first, the source drawn on top, and
/// then the whole buffer is keyed.
pub fn removal_preview(source: &Raster, background: Option<Color>) -> Option<Raster> {
    let mut canvas = Raster::new(source.width(), source.height())?;
    if let Some(color) = background {
        canvas.fill(color);
    }
    canvas.draw_stretched(source);

    let mut rgba = canvas.to_straight_rgba();
    let keyed = key_near_white(&mut rgba, NEAR_WHITE_THRESHOLD);
    log::debug!(
        "Keyed {} of {} pixels as background",
        keyed,
        source.width() as usize * source.height() as usize
    );
    Raster::from_straight_rgba(source.width(), source.height(), &rgba)
}
