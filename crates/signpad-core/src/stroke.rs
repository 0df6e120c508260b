//! Freehand stroke state machine and ink style.
//!
//! A stroke is approximated as a polyline with one straight segment per move
//! event. Strokes are not retained as vector data; each segment is handed to
//! the rasterizer as soon as it exists.

use kurbo::Point;
use peniko::Color;

/// Default ink width in logical pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Fixed ink style. Caps and joins are always round.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    /// Ink color.
    pub color: Color,
    /// Line width in logical pixels.
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgba8(0, 0, 0, 255),
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// One straight piece of ink between two consecutive input points,
/// in physical buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        (self.to - self.from).hypot()
    }
}

/// Drawing state of the capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    /// No pointer is down.
    #[default]
    Idle,
    /// A stroke is in progress.
    Drawing {
        /// Last recorded point of the stroke.
        last: Point,
    },
}

impl StrokeState {
    /// Whether a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self, StrokeState::Drawing { .. })
    }

    /// Last recorded point, if drawing.
    pub fn last_point(&self) -> Option<Point> {
        match self {
            StrokeState::Drawing { last } => Some(*last),
            StrokeState::Idle => None,
        }
    }

    /// Pointer down: start a stroke at `point`.
    ///
    /// A down while already drawing restarts the stroke at the new point.
    pub fn begin(&mut self, point: Point) {
        *self = StrokeState::Drawing { last: point };
    }

    /// Pointer move: returns the segment to rasterize, or `None` when idle.
    pub fn extend(&mut self, point: Point) -> Option<Segment> {
        match self {
            StrokeState::Drawing { last } => {
                let segment = Segment::new(*last, point);
                *last = point;
                Some(segment)
            }
            StrokeState::Idle => None,
        }
    }

    /// Pointer up, leave or cancel. Returns whether a stroke was active.
    pub fn end(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        *self = StrokeState::Idle;
        was_drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = StrokeState::default();
        assert!(!state.is_drawing());
        assert_eq!(state.last_point(), None);
    }

    #[test]
    fn test_move_while_idle_draws_nothing() {
        let mut state = StrokeState::Idle;
        assert_eq!(state.extend(Point::new(5.0, 5.0)), None);
        assert!(!state.is_drawing());
    }

    #[test]
    fn test_segments_chain() {
        let mut state = StrokeState::Idle;
        state.begin(Point::new(0.0, 0.0));

        let first = state.extend(Point::new(10.0, 0.0)).unwrap();
        let second = state.extend(Point::new(10.0, 10.0)).unwrap();

        assert_eq!(first.from, Point::new(0.0, 0.0));
        assert_eq!(first.to, second.from);
        assert_eq!(second.to, Point::new(10.0, 10.0));
        assert_eq!(state.last_point(), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_end_resets() {
        let mut state = StrokeState::Idle;
        state.begin(Point::new(1.0, 2.0));
        assert!(state.end());
        assert_eq!(state, StrokeState::Idle);
        assert!(!state.end());
    }

    #[test]
    fn test_begin_while_drawing_restarts() {
        let mut state = StrokeState::Idle;
        state.begin(Point::new(0.0, 0.0));
        state.begin(Point::new(50.0, 50.0));
        let segment = state.extend(Point::new(60.0, 50.0)).unwrap();
        assert_eq!(segment.from, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_segment_length() {
        let segment = Segment::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((segment.length() - 5.0).abs() < f64::EPSILON);
    }
}
