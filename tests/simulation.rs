use attractor_particles::color::Rgba;
use attractor_particles::{Canvas, MouseButton, PointMass, Sketch, World};
use cgmath::{MetricSpace, Point2, Vector2};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Background(Rgba),
    FrameRate(u32),
    Color(Rgba),
    Circle(Point2<f32>, f32),
}

struct RecordingCanvas {
    width: f32,
    height: f32,
    calls: Vec<Call>,
}

impl RecordingCanvas {
    fn new() -> RecordingCanvas {
        RecordingCanvas::sized(1024.0, 768.0)
    }

    fn sized(width: f32, height: f32) -> RecordingCanvas {
        RecordingCanvas {
            width,
            height,
            calls: Vec::new(),
        }
    }

    fn circles(&self) -> Vec<(Point2<f32>, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Circle(center, radius) => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f32 {
        self.width
    }
    fn height(&self) -> f32 {
        self.height
    }
    fn set_background(&mut self, color: Rgba) {
        self.calls.push(Call::Background(color));
    }
    fn set_frame_rate(&mut self, fps: u32) {
        self.calls.push(Call::FrameRate(fps));
    }
    fn set_color(&mut self, color: Rgba) {
        self.calls.push(Call::Color(color));
    }
    fn circle(&mut self, center: Point2<f32>, radius: f32) {
        self.calls.push(Call::Circle(center, radius));
    }
}

fn setup_world(num_particles: usize) -> (World, RecordingCanvas) {
    let mut world = World::with_rng(StdRng::seed_from_u64(1), num_particles);
    let mut canvas = RecordingCanvas::new();
    world.setup(&mut canvas);
    (world, canvas)
}

#[test]
fn setup_spawns_resting_particles_around_center() {
    let (world, canvas) = setup_world(500);

    assert_eq!(
        canvas.calls,
        vec![Call::Background(Rgba::gray(45)), Call::FrameRate(60)]
    );
    let center = Point2::new(512.0, 384.0);
    for particle in world.particles() {
        assert!(particle.position.distance(center) <= 400.0 + 1e-3);
        assert_eq!(particle.velocity, Vector2::new(0.0, 0.0));
        assert_eq!(particle.force, Vector2::new(0.0, 0.0));
    }
}

#[test]
fn frame_draws_particles_then_black_attractors() {
    let (mut world, mut canvas) = setup_world(3);
    world.mouse_pressed(Point2::new(100.0, 100.0), MouseButton::Right);
    canvas.calls.clear();

    world.draw(&mut canvas);

    let circles = canvas.circles();
    assert_eq!(circles.len(), 5);
    assert!(circles[..3].iter().all(|&(_, radius)| radius == 0.8));
    assert_eq!(circles[3], (Point2::new(512.0, 384.0), 2.0));
    assert_eq!(circles[4], (Point2::new(100.0, 100.0), 2.0));

    let black_at = canvas
        .calls
        .iter()
        .position(|call| *call == Call::Color(Rgba::BLACK))
        .expect("attractors are drawn in black");
    assert_eq!(black_at, canvas.calls.len() - 3);
}

#[test]
fn particles_fall_toward_center_attractor() {
    let (mut world, mut canvas) = setup_world(200);
    let center = Point2::new(512.0, 384.0);
    let before: Vec<f32> = world
        .particles()
        .iter()
        .map(|p| p.position.distance(center))
        .collect();

    world.draw(&mut canvas);

    for (particle, start) in world.particles().iter().zip(before) {
        if start > 1.0 {
            assert!(particle.position.distance(center) < start);
        }
        assert_eq!(particle.force, Vector2::new(0.0, 0.0));
    }
}

#[test]
fn single_step_matches_force_law() {
    let (mut world, mut canvas) = setup_world(0);
    world.clear_attractors();
    world.add_attractor(Point2::new(612.0, 384.0), false);

    let particle = PointMass::new(Point2::new(512.0, 384.0));
    let force = world.net_force(&particle);

    // G / d with d = 100
    assert!((force.x - 0.7).abs() < 1e-5);
    assert!(force.y.abs() < 1e-5);

    world.draw(&mut canvas);
    assert_eq!(canvas.circles(), vec![(Point2::new(612.0, 384.0), 2.0)]);
}

#[test]
fn cleared_attractors_leave_particles_coasting() {
    let (mut world, mut canvas) = setup_world(50);
    world.draw(&mut canvas);
    let velocities: Vec<Vector2<f32>> = world.particles().iter().map(|p| p.velocity).collect();

    world.mouse_pressed(Point2::new(0.0, 0.0), MouseButton::Middle);
    assert!(world.attractors().is_empty());

    world.draw(&mut canvas);
    for (particle, velocity) in world.particles().iter().zip(velocities) {
        // Reflection may flip a sign, but no force changes the speed
        assert!((particle.velocity.x.abs() - velocity.x.abs()).abs() < 1e-6);
        assert!((particle.velocity.y.abs() - velocity.y.abs()).abs() < 1e-6);
    }
}

#[test]
fn resting_particle_on_attractor_is_a_singular_no_op() {
    let (mut world, mut canvas) = setup_world(0);
    let particle = PointMass::new(Point2::new(512.0, 384.0));

    assert_eq!(world.net_force(&particle), Vector2::new(0.0, 0.0));

    world.draw(&mut canvas);
    assert_eq!(world.attractors().len(), 1);
}

#[test]
fn slow_particles_get_the_low_end_of_the_ramp() {
    let (mut world, mut canvas) = setup_world(1);
    world.clear_attractors();
    canvas.calls.clear();

    world.draw(&mut canvas);

    assert_eq!(canvas.calls[0], Call::Color(Rgba::rgb(100, 155, 0)));
}

#[test]
fn home_attractor_ignores_the_live_window_size() {
    let mut world = World::with_rng(StdRng::seed_from_u64(3), 300);
    let mut canvas = RecordingCanvas::sized(400.0, 300.0);
    world.setup(&mut canvas);

    assert_eq!(world.attractors()[0].position, Point2::new(512.0, 384.0));

    let center = Point2::new(200.0, 150.0);
    for particle in world.particles() {
        assert!(particle.position.distance(center) <= 400.0 + 1e-3);
    }
}

#[test]
fn reflection_uses_the_live_window_size() {
    let (width, height) = (400.0, 300.0);
    let mut world = World::with_rng(StdRng::seed_from_u64(9), 50);
    let mut canvas = RecordingCanvas::sized(width, height);
    world.setup(&mut canvas);
    world.clear_attractors();
    world.add_attractor(Point2::new(100_000.0, 150.0), false);

    let mut right_edge_hits = 0;
    for _ in 0..2000 {
        let expected: Vec<(Point2<f32>, Vector2<f32>)> = world
            .particles()
            .iter()
            .map(|particle| {
                let force = world.net_force(particle);
                let velocity = particle.velocity + force / particle.mass;
                (particle.position + velocity, velocity)
            })
            .collect();

        world.draw(&mut canvas);

        for (particle, (position, velocity)) in world.particles().iter().zip(expected) {
            assert_eq!(particle.position, position);
            let x_hit = position.x <= 0.0 || position.x >= width;
            let y_hit = position.y <= 0.0 || position.y >= height;
            let vx = if x_hit { -velocity.x } else { velocity.x };
            let vy = if y_hit { -velocity.y } else { velocity.y };
            assert_eq!(particle.velocity, Vector2::new(vx, vy));
            if position.x >= width && position.x < 1024.0 {
                right_edge_hits += 1;
            }
        }
    }

    assert!(right_edge_hits > 0);
}
