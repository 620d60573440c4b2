use cgmath::Point2;
use cgmath::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::{speed_color, Rgba};
use crate::config::{
    ATTRACTOR_RADIUS, BACKGROUND_GRAY, NUM_PARTICLES, PARTICLE_RADIUS, SPAWN_RADIUS,
    TARGET_FRAME_RATE, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::point_mass::{Bounds, PointMass};
use crate::sketch::{Canvas, MouseButton, Sketch};

/// The particle population and the set of attraction points acting on it.
pub struct World {
    particles: Vec<PointMass>,
    attractors: Vec<PointMass>,
    num_particles: usize,
    rng: StdRng,
}

impl World {
    pub fn new() -> World {
        World::with_rng(StdRng::from_os_rng(), NUM_PARTICLES)
    }

    pub fn with_rng(rng: StdRng, num_particles: usize) -> World {
        World {
            particles: Vec::with_capacity(num_particles),
            attractors: Vec::new(),
            num_particles,
            rng,
        }
    }

    pub fn particles(&self) -> &[PointMass] {
        &self.particles
    }

    pub fn attractors(&self) -> &[PointMass] {
        &self.attractors
    }

    /// Sum of the forces every attractor exerts on `particle`, in attractor order.
    pub fn net_force(&self, particle: &PointMass) -> Vector2<f32> {
        self.attractors
            .iter()
            .fold(Vector2::new(0.0, 0.0), |sum, attractor| {
                sum + attractor.force_on(particle)
            })
    }

    pub fn add_attractor(&mut self, position: Point2<f32>, repel: bool) {
        log::info!(
            "Adding {} at ({:.0}, {:.0})",
            if repel { "repeller" } else { "attractor" },
            position.x,
            position.y
        );
        self.attractors.push(PointMass::attractor(position, repel));
    }

    pub fn clear_attractors(&mut self) {
        log::info!("Clearing {} attraction points", self.attractors.len());
        self.attractors.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}

impl Sketch for World {
    fn setup(&mut self, canvas: &mut dyn Canvas) {
        let center = Point2::new(canvas.width() / 2.0, canvas.height() / 2.0);
        self.particles.clear();
        for _ in 0..self.num_particles {
            self.particles
                .push(PointMass::spawn(&mut self.rng, center, SPAWN_RADIUS));
        }

        self.attractors.clear();
        let home = Point2::new(WINDOW_WIDTH as f32 / 2.0, WINDOW_HEIGHT as f32 / 2.0);
        self.attractors.push(PointMass::attractor(home, false));

        canvas.set_background(Rgba::gray(BACKGROUND_GRAY));
        canvas.set_frame_rate(TARGET_FRAME_RATE);

        log::info!(
            "Spawned {} particles within {} px of ({}, {})",
            self.particles.len(),
            SPAWN_RADIUS,
            center.x,
            center.y
        );
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) {
        let bounds = Bounds::new(canvas.width(), canvas.height());

        for i in 0..self.particles.len() {
            let force = self.net_force(&self.particles[i]);
            let particle = &mut self.particles[i];
            particle.apply_force(force);
            particle.integration_step(bounds);

            canvas.set_color(speed_color(particle.speed()));
            canvas.circle(particle.position, PARTICLE_RADIUS);
        }

        canvas.set_color(Rgba::BLACK);
        for attractor in &self.attractors {
            canvas.circle(attractor.position, ATTRACTOR_RADIUS);
        }
    }

    fn mouse_pressed(&mut self, position: Point2<f32>, button: MouseButton) {
        match button.code() {
            1 => self.clear_attractors(),
            2 => self.add_attractor(position, true),
            _ => self.add_attractor(position, false),
        }
    }
}
