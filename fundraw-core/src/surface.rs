//! The drawing surface: background plus committed strokes.

use std::sync::Arc;

use crate::{CanvasError, CanvasResult, Color, Stroke};

/// A decoded background image in straight RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl BackgroundImage {
    /// Wrap raw RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::BackgroundShape`] if the image has no area or
    /// `rgba` is not exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> CanvasResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(rgba.len()) {
            return Err(CanvasError::BackgroundShape {
                width,
                height,
                len: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixels, row-major RGBA8.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// What is painted beneath the strokes.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// A solid fill.
    Color(Color),
    /// An image stretched to the surface bounds.
    Image(Arc<BackgroundImage>),
}

/// The live drawing area.
///
/// Cloning is cheap for the background image (shared) and copies the stroke
/// list, which is how exports take a stable snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Option<Background>,
    strokes: Vec<Stroke>,
}

impl Surface {
    /// Create an empty surface of the given size with no background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
            strokes: Vec::new(),
        }
    }

    /// Set the background.
    #[must_use]
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the surface has zero area (e.g. not yet laid out).
    #[must_use]
    pub fn is_empty_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Resize the surface. Strokes keep their coordinates.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        tracing::debug!("Surface resized to {}x{}", width, height);
    }

    /// The current background, if one was set.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Replace or clear the background.
    pub fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
    }

    /// Append a committed stroke on top of the existing ones.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove and return the most recent stroke.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Committed strokes in draw order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of committed strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }
}
