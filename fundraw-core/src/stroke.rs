//! Strokes, colors and brush selection.

use serde::{Deserialize, Serialize};

/// An RGBA color with 8 bits per channel, not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a color from all four channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Unpack a `0xAARRGGBB` color, the layout color pickers hand out.
    #[must_use]
    pub const fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self { r, g, b, a }
    }

    /// The color as `[r, g, b, a]`.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// The brush sizes offered by the brush chooser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushSize {
    /// 10 px.
    Small,
    /// 20 px.
    #[default]
    Medium,
    /// 30 px.
    Large,
}

impl BrushSize {
    /// Brush diameter in pixels.
    #[must_use]
    pub const fn width(self) -> f32 {
        match self {
            Self::Small => 10.0,
            Self::Medium => 20.0,
            Self::Large => 30.0,
        }
    }
}

/// Brush selection captured when a stroke begins.
///
/// Changing the selection afterwards never alters a stroke already in
/// progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl BrushConfig {
    /// Create a brush from a color and a preset size.
    #[must_use]
    pub const fn new(color: Color, size: BrushSize) -> Self {
        Self {
            color,
            width: size.width(),
        }
    }

    /// Replace the color.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Replace the width with a preset size.
    #[must_use]
    pub const fn with_size(mut self, size: BrushSize) -> Self {
        self.width = size.width();
        self
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self::new(Color::BLACK, BrushSize::Medium)
    }
}

/// A point on a stroke, in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl StrokePoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A freehand stroke: a polyline painted with one brush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeRepr")]
pub struct Stroke {
    brush: BrushConfig,
    points: Vec<StrokePoint>,
}

#[derive(Deserialize)]
struct StrokeRepr {
    brush: BrushConfig,
    points: Vec<StrokePoint>,
}

impl TryFrom<StrokeRepr> for Stroke {
    type Error = &'static str;

    fn try_from(repr: StrokeRepr) -> Result<Self, Self::Error> {
        Self::from_points(repr.brush, repr.points).ok_or("stroke has no points")
    }
}

impl Stroke {
    /// Start a stroke at `origin` with the given brush.
    #[must_use]
    pub fn begin(brush: BrushConfig, origin: StrokePoint) -> Self {
        Self {
            brush,
            points: vec![origin],
        }
    }

    /// Build a complete stroke from a list of points.
    ///
    /// Returns `None` when `points` is empty.
    #[must_use]
    pub fn from_points(brush: BrushConfig, points: Vec<StrokePoint>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { brush, points })
        }
    }

    /// Extend the stroke to a new point.
    pub fn extend_to(&mut self, point: StrokePoint) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// The brush the stroke was started with.
    #[must_use]
    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    /// All points in draw order. Never empty.
    #[must_use]
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    /// Whether the stroke is a single tap rather than a line.
    #[must_use]
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argb_unpacks_channels() {
        let color = Color::from_argb(0x80FF_2010);
        assert_eq!(color, Color::rgba(0xFF, 0x20, 0x10, 0x80));
        assert_eq!(Color::from_argb(0xFF00_0000), Color::BLACK);
    }

    #[test]
    fn test_brush_sizes() {
        assert!((BrushSize::Small.width() - 10.0).abs() < f32::EPSILON);
        assert!((BrushSize::Medium.width() - 20.0).abs() < f32::EPSILON);
        assert!((BrushSize::Large.width() - 30.0).abs() < f32::EPSILON);
        assert_eq!(BrushSize::default(), BrushSize::Medium);
    }

    #[test]
    fn test_extend_skips_duplicate_points() {
        let mut stroke = Stroke::begin(BrushConfig::default(), StrokePoint::new(1.0, 1.0));
        stroke.extend_to(StrokePoint::new(1.0, 1.0));
        assert!(stroke.is_dot());
        stroke.extend_to(StrokePoint::new(2.0, 3.0));
        assert_eq!(stroke.points().len(), 2);
    }

    #[test]
    fn test_from_points_rejects_empty() {
        assert!(Stroke::from_points(BrushConfig::default(), Vec::new()).is_none());
    }

    #[test]
    fn test_stroke_json_shape() {
        let stroke = Stroke::begin(
            BrushConfig::new(Color::RED, BrushSize::Small),
            StrokePoint::new(4.0, 5.0),
        );
        let json = serde_json::to_value(&stroke).expect("serialize");
        assert_eq!(json["brush"]["color"]["r"], 255);
        assert_eq!(json["points"][0]["x"], 4.0);

        let back: Stroke = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, stroke);
    }

    #[test]
    fn test_deserialize_rejects_stroke_without_points() {
        let json = serde_json::json!({
            "brush": { "color": { "r": 0, "g": 0, "b": 0, "a": 255 }, "width": 20.0 },
            "points": [],
        });
        let err = serde_json::from_value::<Stroke>(json).expect_err("empty stroke");
        assert!(err.to_string().contains("stroke has no points"));
    }
}
