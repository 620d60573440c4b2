use cgmath::InnerSpace;
use cgmath::MetricSpace;
use cgmath::Point2;
use cgmath::Vector2;
use rand::Rng;

use crate::config::{GRAVITATION_CONSTANT, MIN_DISTANCE, PARTICLE_MASS};

/// Extent of the area particles bounce around in, in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Bounds {
        Bounds { width, height }
    }
}

/// A point mass. Used both for the free particles and for the fixed
/// attraction points, which only ever act as force sources.
#[derive(Clone, Debug, PartialEq)]
pub struct PointMass {
    pub position: Point2<f32>,
    pub velocity: Vector2<f32>,
    /// Force accumulated for the current frame, cleared by `integration_step`.
    pub force: Vector2<f32>,
    pub mass: f32,
    pub min_distance: f32,
    /// Only meaningful on attractors: push particles away instead of pulling.
    pub repel: bool,
}

impl PointMass {
    pub fn new(position: Point2<f32>) -> PointMass {
        PointMass {
            position,
            velocity: Vector2::new(0.0, 0.0),
            force: Vector2::new(0.0, 0.0),
            mass: PARTICLE_MASS,
            min_distance: MIN_DISTANCE,
            repel: false,
        }
    }

    pub fn attractor(position: Point2<f32>, repel: bool) -> PointMass {
        PointMass {
            repel,
            ..PointMass::new(position)
        }
    }

    /// Creates a resting particle at a uniformly random spot inside the disc
    /// of `radius` around `center`.
    pub fn spawn<R: Rng>(rng: &mut R, center: Point2<f32>, radius: f32) -> PointMass {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let r = radius * rng.random::<f32>().sqrt();
        PointMass::new(center + Vector2::new(angle.cos(), angle.sin()) * r)
    }

    pub fn distance_to(&self, other: &PointMass) -> f32 {
        self.position.distance(other.position)
    }

    /// Calculate the force this point exerts on `other`.
    ///
    /// The magnitude `G * m1 * m2 / d^2` scales the raw displacement rather
    /// than a unit vector, so the effective falloff is `G * m1 * m2 / d`.
    /// `d` is floored at the other point's `min_distance`.
    pub fn force_on(&self, other: &PointMass) -> Vector2<f32> {
        let distance = self.distance_to(other).max(other.min_distance);
        let magnitude = GRAVITATION_CONSTANT * self.mass * other.mass / distance.powi(2);
        let mut direction = self.position - other.position;
        if self.repel {
            direction = -direction;
        }
        magnitude * direction
    }

    pub fn apply_force(&mut self, force: Vector2<f32>) {
        self.force = force;
    }

    /// Advance one frame: `a = F / m`, `v += a`, `p += v`, then reflect the
    /// velocity off any edge the new position touches or crossed.
    ///
    /// Position is not clamped, so a particle may sit outside `bounds` for a
    /// frame before the reflected velocity carries it back.
    pub fn integration_step(&mut self, bounds: Bounds) {
        let acceleration = self.force / self.mass;
        self.velocity += acceleration;
        self.position += self.velocity;

        // Half turn about the vertical axis
        if self.position.x <= 0.0 || self.position.x >= bounds.width {
            self.velocity.x = -self.velocity.x;
        }
        // Half turn about the horizontal axis
        if self.position.y <= 0.0 || self.position.y >= bounds.height {
            self.velocity.y = -self.velocity.y;
        }

        self.force = Vector2::new(0.0, 0.0);
    }

    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }
}
