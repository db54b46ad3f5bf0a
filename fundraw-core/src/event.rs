//! Touch input for the drawing surface.

use serde::{Deserialize, Serialize};

use crate::StrokePoint;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in surface coordinates.
    pub x: f32,
    /// Y position in surface coordinates.
    pub y: f32,
    /// Pressure (0.0 to 1.0, if available).
    pub pressure: Option<f32>,
}

impl TouchPoint {
    /// Create a touch point with no pressure information.
    #[must_use]
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            pressure: None,
        }
    }

    /// Position as a stroke point.
    #[must_use]
    pub fn position(&self) -> StrokePoint {
        StrokePoint::new(self.x, self.y)
    }
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// Timestamp in milliseconds since the surface was shown.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
        }
    }

    /// Single-finger event at `(x, y)`.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(phase, vec![TouchPoint::new(0, x, y)], timestamp_ms)
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_touch() {
        let event = TouchEvent::new(
            TouchPhase::Move,
            vec![TouchPoint::new(3, 1.0, 2.0), TouchPoint::new(4, 5.0, 6.0)],
            10,
        );
        assert!(event.is_multi_touch());
        let primary = event.primary_touch().expect("touch");
        assert_eq!(primary.id, 3);
        assert_eq!(primary.position(), StrokePoint::new(1.0, 2.0));
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        let event = TouchEvent::single(TouchPhase::Start, 1.0, 1.0, 0);
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"phase\":\"start\""));
    }
}
