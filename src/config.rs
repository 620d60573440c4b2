//! Compile-time simulation constants.
//!
//! The values are tuned for the look of the demo, not for physical accuracy.

/// Size of the particle population created at startup.
pub const NUM_PARTICLES: usize = 8000;

/// Radius of the spawn disc around the window center, in pixels.
pub const SPAWN_RADIUS: f32 = 400.0;

/// Gravitational constant. Really big, to make up for unit masses.
pub const GRAVITATION_CONSTANT: f32 = 70.0;

/// Floor on the particle/attractor distance used in the force law.
pub const MIN_DISTANCE: f32 = 50.0;

pub const PARTICLE_MASS: f32 = 1.0;

/// Speed mapped to the top of the color ramp.
pub const MAX_COLOR_SPEED: f32 = 2.4;
pub const COLOR_RAMP_LOW: f32 = 100.0;
pub const COLOR_RAMP_HIGH: f32 = 255.0;

pub const PARTICLE_RADIUS: f32 = 0.8;
pub const ATTRACTOR_RADIUS: f32 = 2.0;

/// Gray level of the window background.
pub const BACKGROUND_GRAY: u8 = 45;

pub const TARGET_FRAME_RATE: u32 = 60;

pub const WINDOW_WIDTH: u32 = 1024;
pub const WINDOW_HEIGHT: u32 = 768;
pub const WINDOW_TITLE: &str = "Attractor Particles";
