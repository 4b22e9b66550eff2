//! Error types for horizon.
//!
//! The animation core itself never fails: a missing drawing surface or frame
//! scheduler degrades to a blank presentation. These errors are raised by the
//! outer layers only - configuration loading, GPU initialization, frame export
//! and the native window runner.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating an [`IntroConfig`](crate::IntroConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the configuration schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside the range the animator can work with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("GPU surface reports no supported texture format")]
    NoSurfaceFormat,
}

/// Errors raised by a [`Surface`](crate::surface::Surface) while presenting or exporting a frame.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The swapchain texture could not be acquired.
    #[error("failed to acquire surface texture: {0}")]
    Acquire(#[from] wgpu::SurfaceError),
    /// Encoding the rasterized frame failed.
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    /// Writing the exported frame failed.
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when running the intro in a native window.
#[derive(Debug, Error)]
pub enum IntroError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A frame could not be presented or exported.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
