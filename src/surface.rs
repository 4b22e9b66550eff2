//! Drawing surfaces.
//!
//! A [`Surface`] consumes composed [`DisplayList`]s. The animator owns at most
//! one surface; mounting without one is the "no drawing context" case and
//! simply renders nothing.
//!
//! Backends:
//!
//! | Surface | Use |
//! |---------|-----|
//! | [`RecordingSurface`] | keeps the last frame for inspection |
//! | [`PixelSurface`](crate::raster::PixelSurface) | CPU rasterizer, PNG export |
//! | [`GpuSurface`](crate::gpu::GpuSurface) | wgpu renderer for the native window |

use crate::error::SurfaceError;
use crate::render::DisplayList;
use crate::viewport::Viewport;

/// Something a composed frame can be drawn onto.
pub trait Surface {
    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resynchronize the pixel dimensions with the viewport.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw a frame. `opacity` scales the whole frame (1.0 while presenting,
    /// falling to 0.0 during the fade-out).
    fn draw(&mut self, list: &DisplayList, opacity: f32) -> Result<(), SurfaceError>;

    /// Viewport matching the current size.
    fn viewport(&self) -> Viewport {
        Viewport::from(self.size())
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height)
    }

    fn draw(&mut self, list: &DisplayList, opacity: f32) -> Result<(), SurfaceError> {
        (**self).draw(list, opacity)
    }
}

/// Surface that records frames instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    frames_drawn: usize,
    last: Option<DisplayList>,
    last_opacity: f32,
    resizes: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Number of `draw` calls so far.
    pub fn frames_drawn(&self) -> usize {
        self.frames_drawn
    }

    /// The most recently drawn frame.
    pub fn last_frame(&self) -> Option<&DisplayList> {
        self.last.as_ref()
    }

    /// Opacity of the most recent draw.
    pub fn last_opacity(&self) -> f32 {
        self.last_opacity
    }

    /// Number of `resize` calls so far.
    pub fn resizes(&self) -> usize {
        self.resizes
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.resizes += 1;
    }

    fn draw(&mut self, list: &DisplayList, opacity: f32) -> Result<(), SurfaceError> {
        self.frames_drawn += 1;
        self.last = Some(list.clone());
        self.last_opacity = opacity;
        Ok(())
    }
}
