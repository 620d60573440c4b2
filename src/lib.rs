//! Thousands of unit point masses pulled around by a handful of
//! user-placed attraction and repulsion points, drawn in a window.
//!
//! Left click adds an attractor, right click a repeller, middle click
//! clears them all.

pub mod color;
pub mod config;
pub mod error;
pub mod frame_limiter;
pub mod point_mass;
pub mod sketch;
pub mod wgpu_window;
pub mod world;

pub use error::AppError;
pub use point_mass::{Bounds, PointMass};
pub use sketch::{Canvas, MouseButton, Sketch};
pub use wgpu_window::run_wgpu_window;
pub use world::World;
