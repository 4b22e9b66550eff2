//! CPU rasterizer.
//!
//! [`PixelSurface`] draws display lists into a floating-point RGB buffer with
//! straight-alpha source-over blending and analytic anti-aliasing, and exports
//! the result through `image`. It backs headless snapshots and lets tests
//! check actual pixels.

use std::path::Path;

use glam::{Vec2, Vec3, Vec4};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::SurfaceError;
use crate::render::{sample_gradient, DisplayList, DrawCommand, GradientStop};
use crate::surface::Surface;

/// Software surface backed by an RGB float buffer.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Color of a pixel as 8-bit RGBA (always opaque).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let c = self.pixels[(y * self.width + x) as usize];
        [to_u8(c.x), to_u8(c.y), to_u8(c.z), 255]
    }

    /// Copy the buffer into an `image` RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| Rgba(self.pixel(x, y)))
    }

    /// Write the current buffer as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SurfaceError> {
        let path = path.as_ref();
        self.to_image().save_with_format(path, ImageFormat::Png)?;
        log::info!("wrote {}x{} frame to {}", self.width, self.height, path.display());
        Ok(())
    }

    fn clear(&mut self, color: Vec3) {
        self.pixels.fill(color);
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Vec4, coverage: f32) {
        let alpha = (color.w * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let idx = (y * self.width + x) as usize;
        let dst = self.pixels[idx];
        self.pixels[idx] = color.truncate() * alpha + dst * (1.0 - alpha);
    }

    /// Pixel bounds `[x0, x1) x [y0, y1)` covering a box, clipped to the surface.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        let pad = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - pad, center + pad) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = pixel_center(x, y).distance(center);
                let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4) {
        let half = width * 0.5;
        let pad = Vec2::splat(half + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(from.min(to) - pad, from.max(to) + pad) else {
            return;
        };
        let ab = to - from;
        let len_sq = ab.length_squared().max(f32::EPSILON);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = pixel_center(x, y);
                let h = ((p - from).dot(ab) / len_sq).clamp(0.0, 1.0);
                let d = p.distance(from + ab * h);
                let coverage = (half - d + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
        let pad = Vec2::splat(outer + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - pad, center + pad) else {
            return;
        };
        let span = (outer - inner).max(f32::EPSILON);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = pixel_center(x, y).distance(center);
                let edge = (outer - d + 0.5).clamp(0.0, 1.0);
                if edge > 0.0 {
                    let color = sample_gradient(stops, (d - inner) / span);
                    self.blend(x, y, color, edge);
                }
            }
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Vec3::ZERO; (width as usize) * (height as usize)];
    }

    fn draw(&mut self, list: &DisplayList, opacity: f32) -> Result<(), SurfaceError> {
        self.clear(Vec3::ZERO);
        for command in list {
            match command {
                DrawCommand::Fill { color } => {
                    let base = Vec3::ZERO.lerp(color.truncate(), color.w.clamp(0.0, 1.0));
                    self.clear(base);
                }
                DrawCommand::Circle { center, radius, color } => {
                    self.fill_circle(*center, *radius, *color);
                }
                DrawCommand::Line { from, to, width, color } => {
                    self.stroke_segment(*from, *to, *width, *color);
                }
                DrawCommand::Polygon { points, width, color } => {
                    for (i, &a) in points.iter().enumerate() {
                        let b = points[(i + 1) % points.len()];
                        self.stroke_segment(a, b, *width, *color);
                    }
                }
                DrawCommand::RadialGradient {
                    center,
                    inner_radius,
                    outer_radius,
                    stops,
                } => {
                    self.fill_gradient(*center, *inner_radius, *outer_radius, stops);
                }
            }
        }

        // Whole-frame opacity composites over black.
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            for px in &mut self.pixels {
                *px *= opacity;
            }
        }
        Ok(())
    }
}

#[inline]
fn pixel_center(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;

    fn list(commands: Vec<DrawCommand>) -> DisplayList {
        let mut list = DisplayList::new(Viewport::new(32.0, 32.0));
        for c in commands {
            list.push(c);
        }
        list
    }

    #[test]
    fn test_fill_and_circle() {
        let mut surface = PixelSurface::new(32, 32);
        let frame = list(vec![
            DrawCommand::Fill {
                color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            },
            DrawCommand::Circle {
                center: Vec2::new(16.0, 16.0),
                radius: 5.0,
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            },
        ]);
        surface.draw(&frame, 1.0).unwrap();

        assert_eq!(surface.pixel(16, 16), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_half_alpha_blend() {
        let mut surface = PixelSurface::new(8, 8);
        let frame = list(vec![
            DrawCommand::Fill { color: Vec4::new(0.0, 0.0, 0.0, 1.0) },
            DrawCommand::Circle {
                center: Vec2::new(4.0, 4.0),
                radius: 3.0,
                color: Vec4::new(1.0, 1.0, 1.0, 0.5),
            },
        ]);
        surface.draw(&frame, 1.0).unwrap();
        let px = surface.pixel(4, 4);
        assert!((127..=129).contains(&px[0]));
    }

    #[test]
    fn test_frame_opacity_darkens() {
        let mut surface = PixelSurface::new(4, 4);
        let frame = list(vec![DrawCommand::Fill { color: Vec4::ONE }]);
        surface.draw(&frame, 0.25).unwrap();
        let px = surface.pixel(1, 1);
        assert!((63..=65).contains(&px[0]));
    }

    #[test]
    fn test_line_and_offscreen_shapes() {
        let mut surface = PixelSurface::new(32, 32);
        let frame = list(vec![
            DrawCommand::Fill { color: Vec4::new(0.0, 0.0, 0.0, 1.0) },
            DrawCommand::Line {
                from: Vec2::new(2.0, 10.5),
                to: Vec2::new(30.0, 10.5),
                width: 2.0,
                color: Vec4::ONE,
            },
            DrawCommand::Circle {
                center: Vec2::new(-500.0, 9000.0),
                radius: 4.0,
                color: Vec4::ONE,
            },
            DrawCommand::Circle {
                center: Vec2::new(f32::NAN, 3.0),
                radius: 4.0,
                color: Vec4::ONE,
            },
        ]);
        surface.draw(&frame, 1.0).unwrap();
        assert_eq!(surface.pixel(16, 10), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(16, 20), [0, 0, 0, 255]);
    }

    #[test]
    fn test_gradient_center_and_edge() {
        let mut surface = PixelSurface::new(64, 64);
        let frame = list(vec![
            DrawCommand::Fill { color: Vec4::ONE },
            DrawCommand::RadialGradient {
                center: Vec2::new(32.0, 32.0),
                inner_radius: 0.0,
                outer_radius: 30.0,
                stops: vec![
                    GradientStop::new(0.0, Vec4::new(0.0, 0.0, 0.0, 1.0)),
                    GradientStop::new(1.0, Vec4::new(0.0, 0.0, 0.0, 0.0)),
                ],
            },
        ]);
        surface.draw(&frame, 1.0).unwrap();
        assert!(surface.pixel(32, 32)[0] < 10);
        assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut surface = PixelSurface::new(16, 9);
        surface
            .draw(&list(vec![DrawCommand::Fill { color: Vec4::ONE }]), 1.0)
            .unwrap();
        surface.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (16, 9));
        assert_eq!(loaded.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut surface = PixelSurface::new(4, 4);
        surface.resize(10, 6);
        assert_eq!(surface.size(), (10, 6));
        assert_eq!(surface.to_image().dimensions(), (10, 6));
    }
}
