//! Unified pointer/touch input for the capture surface.

use crate::stroke::Segment;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

impl PointerSource {
    /// Map a Pointer Events `pointerType`. Pens draw on the screen itself and
    /// are treated like touch.
    pub fn from_pointer_type(pointer_type: &str) -> Self {
        match pointer_type {
            "touch" | "pen" => PointerSource::Touch,
            _ => PointerSource::Mouse,
        }
    }
}

/// Lifecycle phase of a pointer event.
///
/// Mouse-out maps to `Leave`, touch-end to `Up` and touch-cancel to `Cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

impl PointerPhase {
    /// Whether this phase ends an active stroke.
    pub fn ends_stroke(self) -> bool {
        matches!(self, PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel)
    }

    /// Parse a DOM event type (`mousedown`, `touchmove`, `pointerleave`, ...).
    ///
    /// `pointer_type` is the `pointerType` of a Pointer Event and decides its
    /// source; it is ignored for mouse and touch events. Without it a pointer
    /// event counts as mouse input.
    pub fn from_dom_event(
        event_type: &str,
        pointer_type: Option<&str>,
    ) -> Option<(Self, PointerSource)> {
        let (source, rest) = if let Some(rest) = event_type.strip_prefix("touch") {
            (PointerSource::Touch, rest)
        } else if let Some(rest) = event_type.strip_prefix("mouse") {
            (PointerSource::Mouse, rest)
        } else if let Some(rest) = event_type.strip_prefix("pointer") {
            let source = pointer_type
                .map(PointerSource::from_pointer_type)
                .unwrap_or_default();
            (source, rest)
        } else {
            return None;
        };

        let phase = match rest {
            "down" | "start" => PointerPhase::Down,
            "move" => PointerPhase::Move,
            "up" | "end" => PointerPhase::Up,
            "out" | "leave" => PointerPhase::Leave,
            "cancel" => PointerPhase::Cancel,
            _ => return None,
        };
        Some((phase, source))
    }
}

/// A single pointer event in client (CSS) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub source: PointerSource,
    /// Position of the event (first touch point for touch input).
    pub client: Point,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, source: PointerSource, client: Point) -> Self {
        Self { phase, source, client }
    }

    pub fn mouse(phase: PointerPhase, client: Point) -> Self {
        Self::new(phase, PointerSource::Mouse, client)
    }

    pub fn touch(phase: PointerPhase, client: Point) -> Self {
        Self::new(phase, PointerSource::Touch, client)
    }
}

/// Outcome of handling one pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputResponse {
    /// The host should suppress its default scroll/zoom gesture.
    pub prevent_default: bool,
    /// Segment rasterized for this event, if any.
    pub segment: Option<Segment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_stroke() {
        assert!(PointerPhase::Up.ends_stroke());
        assert!(PointerPhase::Leave.ends_stroke());
        assert!(PointerPhase::Cancel.ends_stroke());
        assert!(!PointerPhase::Down.ends_stroke());
        assert!(!PointerPhase::Move.ends_stroke());
    }

    #[test]
    fn test_dom_event_mapping() {
        assert_eq!(
            PointerPhase::from_dom_event("mousedown", None),
            Some((PointerPhase::Down, PointerSource::Mouse))
        );
        assert_eq!(
            PointerPhase::from_dom_event("mouseout", None),
            Some((PointerPhase::Leave, PointerSource::Mouse))
        );
        assert_eq!(
            PointerPhase::from_dom_event("touchstart", None),
            Some((PointerPhase::Down, PointerSource::Touch))
        );
        assert_eq!(
            PointerPhase::from_dom_event("touchend", None),
            Some((PointerPhase::Up, PointerSource::Touch))
        );
        assert_eq!(
            PointerPhase::from_dom_event("touchcancel", None),
            Some((PointerPhase::Cancel, PointerSource::Touch))
        );
        assert_eq!(PointerPhase::from_dom_event("click", None), None);
        // The pointer type only matters for Pointer Events.
        assert_eq!(
            PointerPhase::from_dom_event("mousemove", Some("touch")),
            Some((PointerPhase::Move, PointerSource::Mouse))
        );
        assert_eq!(PointerPhase::from_dom_event("mousewheel", None), None);
    }

    #[test]
    fn test_pointer_events_follow_pointer_type() {
        assert_eq!(
            PointerPhase::from_dom_event("pointerdown", Some("touch")),
            Some((PointerPhase::Down, PointerSource::Touch))
        );
        assert_eq!(
            PointerPhase::from_dom_event("pointermove", Some("pen")),
            Some((PointerPhase::Move, PointerSource::Touch))
        );
        assert_eq!(
            PointerPhase::from_dom_event("pointerup", Some("mouse")),
            Some((PointerPhase::Up, PointerSource::Mouse))
        );
        assert_eq!(
            PointerPhase::from_dom_event("pointercancel", None),
            Some((PointerPhase::Cancel, PointerSource::Mouse))
        );
    }
}
