//! Surface rasterization into an RGBA pixel buffer.
//!
//! Painting order is fixed: background (or opaque white), then every stroke
//! in draw order with source-over compositing.

use fundraw_core::{Background, BackgroundImage, Color, ExportError, ExportResult, Stroke, Surface};

/// A `width x height` grid of straight (non-premultiplied) RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 data.
    ///
    /// Returns `None` unless `data.len() == width * height * 4`.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixels, row-major RGBA8.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

}

/// Converts a surface into pixels.
pub trait Rasterizer: Send + Sync {
    /// Rasterize the surface at its current size.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptySurface`] if the surface has no area, or
    /// [`ExportError::Raster`] if the pixel buffer cannot be allocated.
    fn rasterize(&self, surface: &Surface) -> ExportResult<PixelBuffer>;
}

/// CPU rasterizer built on tiny-skia.
#[derive(Debug, Clone)]
pub struct SkiaRasterizer {
    default_background: Color,
}

impl SkiaRasterizer {
    /// Create a rasterizer with a white default background and anti-aliasing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_background: Color::WHITE,
        }
    }

    fn paint_background(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        background: Option<&Background>,
    ) -> ExportResult<()> {
        match background {
            None => pixmap.fill(skia_color(self.default_background)),
            Some(Background::Color(color)) => pixmap.fill(skia_color(*color)),
            Some(Background::Image(image)) => {
                let source = image_pixmap(image)?;
                #[allow(clippy::cast_precision_loss)]
                let transform = tiny_skia::Transform::from_scale(
                    pixmap.width() as f32 / image.width() as f32,
                    pixmap.height() as f32 / image.height() as f32,
                );
                let paint = tiny_skia::PixmapPaint {
                    quality: tiny_skia::FilterQuality::Bilinear,
                    ..tiny_skia::PixmapPaint::default()
                };
                pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
            }
        }
        Ok(())
    }
}

impl Default for SkiaRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SkiaRasterizer {
    fn rasterize(&self, surface: &Surface) -> ExportResult<PixelBuffer> {
        let (width, height) = (surface.width(), surface.height());
        if surface.is_empty_area() {
            return Err(ExportError::EmptySurface { width, height });
        }

        let mut data = rgba_buffer(u64::from(width) * u64::from(height))?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Raster(format!("Failed to create {width}x{height} pixmap"))
        })?;

        self.paint_background(&mut pixmap, surface.background())?;
        for stroke in surface.strokes() {
            paint_stroke(&mut pixmap, stroke);
        }

        tracing::trace!(
            "Rasterized {}x{} surface with {} strokes",
            width,
            height,
            surface.stroke_count()
        );

        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        drop(pixmap);

        PixelBuffer::from_rgba(width, height, data)
            .ok_or_else(|| ExportError::Raster("Pixel buffer size mismatch".to_string()))
    }
}

fn paint_stroke(pixmap: &mut tiny_skia::Pixmap, stroke: &Stroke) {
    let Some((first, rest)) = stroke.points().split_first() else {
        tracing::trace!("Skipping stroke without points");
        return;
    };

    let brush = stroke.brush();
    let mut paint = tiny_skia::Paint::default();
    let [r, g, b, a] = brush.color.to_array();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    if rest.is_empty() {
        if let Some(path) = tiny_skia::PathBuilder::from_circle(first.x, first.y, brush.width / 2.0)
        {
            pixmap.fill_path(
                &path,
                &paint,
                tiny_skia::FillRule::Winding,
                tiny_skia::Transform::identity(),
                None,
            );
        }
        return;
    }

    let mut builder = tiny_skia::PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in rest {
        builder.line_to(point.x, point.y);
    }
    let Some(path) = builder.finish() else {
        tracing::trace!("Skipping degenerate stroke");
        return;
    };

    let style = tiny_skia::Stroke {
        width: brush.width,
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(
        &path,
        &paint,
        &style,
        tiny_skia::Transform::identity(),
        None,
    );
}

/// An empty byte buffer with room for `pixels` RGBA8 pixels.
fn rgba_buffer(pixels: u64) -> ExportResult<Vec<u8>> {
    let len = pixels
        .checked_mul(4)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| ExportError::Raster(format!("{pixels} pixels do not fit in memory")))?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| ExportError::Raster(format!("Failed to allocate pixel buffer: {e}")))?;
    Ok(data)
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Convert straight RGBA into a premultiplied tiny-skia pixmap.
fn image_pixmap(image: &BackgroundImage) -> ExportResult<tiny_skia::Pixmap> {
    let mut data = rgba_buffer(u64::from(image.width()) * u64::from(image.height()))?;
    for px in image.rgba().chunks_exact(4) {
        let c = tiny_skia::ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    tiny_skia::IntSize::from_wh(image.width(), image.height())
        .and_then(|size| tiny_skia::Pixmap::from_vec(data, size))
        .ok_or_else(|| ExportError::Raster("Invalid background image".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fundraw_core::{BrushConfig, BrushSize, StrokePoint};

    use super::*;

    fn line(color: Color, width: f32, from: (f32, f32), to: (f32, f32)) -> Stroke {
        let brush = BrushConfig {
            color,
            width,
        };
        Stroke::from_points(
            brush,
            vec![StrokePoint::new(from.0, from.1), StrokePoint::new(to.0, to.1)],
        )
        .expect("stroke")
    }

    #[test]
    fn test_zero_size_is_empty_surface() {
        let rasterizer = SkiaRasterizer::new();
        for (w, h) in [(0, 0), (0, 10), (10, 0)] {
            let err = rasterizer
                .rasterize(&Surface::new(w, h))
                .expect_err("empty surface");
            assert!(matches!(
                err,
                ExportError::EmptySurface { width, height } if width == w && height == h
            ));
        }
    }

    #[test]
    fn test_oversized_buffer_is_raster_error() {
        let err = rgba_buffer(u64::MAX).expect_err("overflow");
        assert!(matches!(err, ExportError::Raster(_)));
        let err = rgba_buffer(1 << 60).expect_err("too large");
        assert!(matches!(err, ExportError::Raster(_)));
        assert_eq!(rgba_buffer(6).expect("small").capacity(), 24);
    }

    #[test]
    fn test_default_background_is_opaque_white() {
        let buffer = SkiaRasterizer::new()
            .rasterize(&Surface::new(4, 3))
            .expect("raster");
        assert_eq!(buffer.width(), 4);
        assert_eq!(buffer.height(), 3);
        assert_eq!(buffer.data().len(), 4 * 3 * 4);
        assert!(buffer.data().chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_color_background_fill() {
        let surface = Surface::new(5, 5).with_background(Background::Color(Color::RED));
        let buffer = SkiaRasterizer::new().rasterize(&surface).expect("raster");
        assert_eq!(buffer.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(buffer.pixel(5, 0), None);
    }

    #[test]
    fn test_full_cover_stroke_hides_background() {
        let mut surface = Surface::new(10, 10).with_background(Background::Color(Color::RED));
        surface.push_stroke(line(Color::BLUE, 40.0, (0.0, 5.0), (10.0, 5.0)));

        let buffer = SkiaRasterizer::new().rasterize(&surface).expect("raster");
        assert!(buffer.data().chunks_exact(4).all(|px| px == [0, 0, 255, 255]));
    }

    #[test]
    fn test_strokes_paint_in_order() {
        let mut surface = Surface::new(10, 10);
        surface.push_stroke(line(Color::RED, 40.0, (0.0, 5.0), (10.0, 5.0)));
        surface.push_stroke(line(Color::GREEN, 40.0, (0.0, 5.0), (10.0, 5.0)));

        let buffer = SkiaRasterizer::new().rasterize(&surface).expect("raster");
        assert_eq!(buffer.pixel(5, 5), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_dot_stroke_paints_center_only() {
        let mut surface = Surface::new(40, 40);
        surface.push_stroke(Stroke::begin(
            BrushConfig::new(Color::BLACK, BrushSize::Small),
            StrokePoint::new(20.0, 20.0),
        ));

        let buffer = SkiaRasterizer::new().rasterize(&surface).expect("raster");
        assert_eq!(buffer.pixel(20, 20), Some([0, 0, 0, 255]));
        assert_eq!(buffer.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_image_background_is_stretched() {
        // 2x1 image: left half red, right half blue.
        let image = BackgroundImage::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255])
            .expect("image");
        let surface = Surface::new(40, 20).with_background(Background::Image(Arc::new(image)));

        let buffer = SkiaRasterizer::new().rasterize(&surface).expect("raster");
        let left = buffer.pixel(2, 10).expect("left");
        let right = buffer.pixel(37, 10).expect("right");
        assert!(left[0] > 200 && left[2] < 60, "left was {left:?}");
        assert!(right[2] > 200 && right[0] < 60, "right was {right:?}");
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let mut surface = Surface::new(64, 48).with_background(Background::Color(Color::rgb(10, 20, 30)));
        surface.push_stroke(line(Color::rgba(200, 100, 50, 128), 7.0, (3.0, 4.0), (60.0, 40.0)));
        surface.push_stroke(line(Color::GREEN, 3.0, (60.0, 4.0), (3.0, 40.0)));

        let rasterizer = SkiaRasterizer::new();
        let first = rasterizer.rasterize(&surface).expect("first");
        let second = rasterizer.rasterize(&surface).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn test_pixel_buffer_shape_invariant() {
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 12]).is_none());
    }
}
