//! Errors raised while bringing up the window and the GPU.
//!
//! The simulation itself cannot fail; only the host side can.

use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Failed to create the event loop or it exited abnormally.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// Failed to create a surface for the window.
    Surface(wgpu::CreateSurfaceError),
    /// No GPU adapter can present to the window.
    NoAdapter,
    /// Failed to create the GPU device.
    Device(wgpu::RequestDeviceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Event loop failed: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Surface(e) => write!(f, "Failed to create GPU surface: {}", e),
            AppError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            AppError::Device(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Surface(e) => Some(e),
            AppError::NoAdapter => None,
            AppError::Device(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for AppError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        AppError::Surface(e)
    }
}

impl From<wgpu::RequestDeviceError> for AppError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        AppError::Device(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn no_adapter_has_no_source() {
        let err = AppError::NoAdapter;
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "No compatible GPU adapter found");
    }
}
