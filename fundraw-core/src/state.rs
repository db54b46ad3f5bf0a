//! Drawing state: turns touch input into strokes on the surface.

use crate::{
    Background, BrushConfig, BrushSize, Color, Stroke, Surface, TouchEvent, TouchPhase,
};

/// The interactive drawing engine.
///
/// Holds the surface, the current brush selection and at most one stroke in
/// progress. The brush is copied into a stroke when the finger goes down, so a
/// selection change mid-stroke only affects the next stroke.
#[derive(Debug, Clone)]
pub struct CanvasState {
    surface: Surface,
    brush: BrushConfig,
    active: Option<Stroke>,
}

impl CanvasState {
    /// Create a drawing state for a surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_surface(Surface::new(width, height))
    }

    /// Wrap an existing surface.
    #[must_use]
    pub fn from_surface(surface: Surface) -> Self {
        Self {
            surface,
            brush: BrushConfig::default(),
            active: None,
        }
    }

    /// Process a touch event.
    ///
    /// Only the primary touch draws; additional fingers are ignored.
    pub fn process_event(&mut self, event: &TouchEvent) {
        let Some(primary) = event.primary_touch() else {
            return;
        };
        let point = primary.position();

        match event.phase {
            TouchPhase::Start => {
                if self.active.is_some() {
                    tracing::debug!("Touch start while a stroke is active; restarting stroke");
                }
                self.active = Some(Stroke::begin(self.brush, point));
            }
            TouchPhase::Move => {
                if let Some(stroke) = self.active.as_mut() {
                    stroke.extend_to(point);
                }
            }
            TouchPhase::End => {
                if let Some(mut stroke) = self.active.take() {
                    stroke.extend_to(point);
                    tracing::trace!("Committed stroke with {} points", stroke.points().len());
                    self.surface.push_stroke(stroke);
                }
            }
            TouchPhase::Cancel => {
                self.active = None;
            }
        }
    }

    /// Remove the most recent committed stroke.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.surface.undo()
    }

    /// Select the color for subsequent strokes.
    pub fn set_color(&mut self, color: Color) {
        self.brush = self.brush.with_color(color);
    }

    /// Select the brush size for subsequent strokes.
    pub fn set_brush_size(&mut self, size: BrushSize) {
        self.brush = self.brush.with_size(size);
    }

    /// The brush the next stroke will use.
    #[must_use]
    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    /// Set or clear the background.
    pub fn set_background(&mut self, background: Option<Background>) {
        self.surface.set_background(background);
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    /// The committed drawing. The stroke in progress is not part of it.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The stroke currently being drawn, if any.
    #[must_use]
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrokePoint;

    fn touch(phase: TouchPhase, x: f32, y: f32) -> TouchEvent {
        TouchEvent::single(phase, x, y, 0)
    }

    #[test]
    fn test_stroke_committed_on_end() {
        let mut state = CanvasState::new(100, 100);
        state.process_event(&touch(TouchPhase::Start, 1.0, 1.0));
        state.process_event(&touch(TouchPhase::Move, 5.0, 5.0));
        assert_eq!(state.surface().stroke_count(), 0);
        assert!(state.active_stroke().is_some());

        state.process_event(&touch(TouchPhase::End, 9.0, 9.0));
        assert!(state.active_stroke().is_none());
        let strokes = state.surface().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(
            strokes[0].points(),
            &[
                StrokePoint::new(1.0, 1.0),
                StrokePoint::new(5.0, 5.0),
                StrokePoint::new(9.0, 9.0)
            ]
        );
    }

    #[test]
    fn test_cancel_discards_stroke() {
        let mut state = CanvasState::new(100, 100);
        state.process_event(&touch(TouchPhase::Start, 1.0, 1.0));
        state.process_event(&touch(TouchPhase::Cancel, 1.0, 1.0));
        state.process_event(&touch(TouchPhase::End, 2.0, 2.0));
        assert_eq!(state.surface().stroke_count(), 0);
    }

    #[test]
    fn test_brush_change_mid_stroke_applies_to_next_stroke() {
        let mut state = CanvasState::new(100, 100);
        state.set_color(Color::RED);
        state.process_event(&touch(TouchPhase::Start, 1.0, 1.0));
        state.set_color(Color::BLUE);
        state.set_brush_size(BrushSize::Large);
        state.process_event(&touch(TouchPhase::End, 2.0, 2.0));

        state.process_event(&touch(TouchPhase::Start, 3.0, 3.0));
        state.process_event(&touch(TouchPhase::End, 3.0, 3.0));

        let strokes = state.surface().strokes();
        assert_eq!(strokes[0].brush(), BrushConfig::new(Color::RED, BrushSize::Medium));
        assert_eq!(strokes[1].brush(), BrushConfig::new(Color::BLUE, BrushSize::Large));
        assert!(strokes[1].is_dot());
    }

    #[test]
    fn test_undo() {
        let mut state = CanvasState::default();
        assert!(state.undo().is_none());
        state.process_event(&touch(TouchPhase::Start, 1.0, 1.0));
        state.process_event(&touch(TouchPhase::End, 1.0, 1.0));
        assert!(state.undo().is_some());
        assert_eq!(state.surface().stroke_count(), 0);
    }

    #[test]
    fn test_move_without_start_is_ignored() {
        let mut state = CanvasState::default();
        state.process_event(&touch(TouchPhase::Move, 1.0, 1.0));
        state.process_event(&TouchEvent::new(TouchPhase::Start, Vec::new(), 0));
        assert!(state.active_stroke().is_none());
    }
}
