//! Device pixel ratio handling and client-to-buffer coordinate mapping.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Ratio of physical to logical (CSS) pixels for a display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRatio(f64);

impl PixelRatio {
    /// A 1:1 display.
    pub const ONE: Self = Self(1.0);

    /// Create a pixel ratio. Non-finite or non-positive values fall back to 1.0.
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            Self(ratio)
        } else {
            log::debug!("Ignoring invalid device pixel ratio {ratio}, using 1.0");
            Self::ONE
        }
    }

    /// Get the raw ratio.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Physical buffer dimensions for a logical size, never below one pixel.
    ///
    /// Fractional results are truncated, as a canvas does when its width is
    /// assigned a non-integer value.
    pub fn physical_size(self, logical: Size) -> (u32, u32) {
        let scale = |v: f64| (v * self.0).floor().max(1.0) as u32;
        (scale(logical.width), scale(logical.height))
    }
}

impl Default for PixelRatio {
    fn default() -> Self {
        Self::ONE
    }
}

/// Map a client (CSS) coordinate into physical buffer space.
///
/// `surface_rect` is the surface's on-screen box in client coordinates and
/// `buffer` the size of its backing pixel buffer. The mapping stays correct
/// under CSS scaling as well as any device pixel ratio. A degenerate on-screen
/// axis maps with scale 1.
pub fn client_to_buffer(client: Point, surface_rect: Rect, buffer: Size) -> Point {
    let scale = |buffer_len: f64, screen_len: f64| {
        if screen_len > 0.0 { buffer_len / screen_len } else { 1.0 }
    };
    let offset = client - surface_rect.origin();
    Point::new(
        offset.x * scale(buffer.width, surface_rect.width()),
        offset.y * scale(buffer.height, surface_rect.height()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_size_integer_ratios() {
        for &d in &[1.0, 2.0, 3.0] {
            let ratio = PixelRatio::new(d);
            for &(w, h) in &[(50u32, 50u32), (350, 150), (1000, 1000), (73, 999)] {
                let (pw, ph) = ratio.physical_size(Size::new(w as f64, h as f64));
                assert_eq!(pw, w * d as u32);
                assert_eq!(ph, h * d as u32);
            }
        }
    }

    #[test]
    fn test_physical_size_truncates_fractions() {
        let ratio = PixelRatio::new(1.5);
        assert_eq!(ratio.physical_size(Size::new(333.0, 51.0)), (499, 76));
        assert_eq!(PixelRatio::new(0.001).physical_size(Size::new(50.0, 50.0)), (1, 1));
    }

    #[test]
    fn test_invalid_ratio_falls_back() {
        assert_eq!(PixelRatio::new(0.0), PixelRatio::ONE);
        assert_eq!(PixelRatio::new(-2.0), PixelRatio::ONE);
        assert_eq!(PixelRatio::new(f64::NAN), PixelRatio::ONE);
        assert_eq!(PixelRatio::new(f64::INFINITY), PixelRatio::ONE);
    }

    #[test]
    fn test_client_to_buffer_hidpi() {
        // 300x150 CSS box at (10, 20) backed by a 2x buffer.
        let rect = Rect::new(10.0, 20.0, 310.0, 170.0);
        let p = client_to_buffer(Point::new(110.0, 70.0), rect, Size::new(600.0, 300.0));
        assert!((p.x - 200.0).abs() < f64::EPSILON);
        assert!((p.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_client_to_buffer_css_scaled() {
        // Buffer is 400x200 but CSS shrank it to 200x100.
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        let p = client_to_buffer(Point::new(50.0, 25.0), rect, Size::new(400.0, 200.0));
        assert!((p.x - 100.0).abs() < f64::EPSILON);
        assert!((p.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_client_to_buffer_degenerate_rect() {
        let rect = Rect::new(5.0, 5.0, 5.0, 5.0);
        let p = client_to_buffer(Point::new(8.0, 9.0), rect, Size::new(100.0, 100.0));
        assert!((p.x - 3.0).abs() < f64::EPSILON);
        assert!((p.y - 4.0).abs() < f64::EPSILON);
    }
}
