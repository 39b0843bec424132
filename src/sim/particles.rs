use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::scene::Viewport;

/// A point mass anchored to a rest position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Current position in pixels.
    pub position: Vec2,
    /// Velocity in pixels per tick.
    pub velocity: Vec2,
    /// Rest position the particle is pulled back to.
    pub anchor: Vec2,
    /// Radius in pixels.
    pub size: f32,
    /// Per-particle phase (hue offset, orbit angle, twinkle).
    pub phase: f32,
}

impl Particle {
    /// Constructs a particle at rest at the given position.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            anchor: position,
            size: 1.0,
            phase: 0.0,
        }
    }
}

/// A fixed-size pool of particles with the usual force helpers.
///
/// Particles are created by one of the `seed_*` methods and are never
/// removed; they wrap or spring back in place.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    rng: SmallRng,
}

impl ParticleField {
    /// Constructs an empty field with a deterministic random source.
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Returns the particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Returns the particles for in-place updates.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Returns the random source shared by the field.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Returns the number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the field holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Replaces the pool with particles on a jittered grid.
    ///
    /// Each grid slot is filled with probability `fill`; the pool is then
    /// topped up with uniformly placed particles until it holds at least
    /// `min_count`.
    pub fn seed_grid(
        &mut self,
        viewport: Viewport,
        spacing: f32,
        jitter: f32,
        fill: f64,
        min_count: usize,
    ) {
        self.particles.clear();
        let cols = (viewport.width as f32 / spacing).floor() as usize;
        let rows = (viewport.height as f32 / spacing).floor() as usize;
        for i in 0..cols {
            for j in 0..rows {
                if self.rng.gen_bool(fill) {
                    let offset = Vec2::new(
                        self.rng.gen_range(-jitter..=jitter),
                        self.rng.gen_range(-jitter..=jitter),
                    );
                    let position = Vec2::new(i as f32, j as f32) * spacing + offset;
                    let particle = self.spawn(position);
                    self.particles.push(particle);
                }
            }
        }
        while self.particles.len() < min_count {
            let position = self.random_point(viewport);
            let particle = self.spawn(position);
            self.particles.push(particle);
        }
    }

    /// Replaces the pool with `count` uniformly placed particles.
    pub fn seed_uniform(&mut self, viewport: Viewport, count: usize) {
        self.particles.clear();
        for _ in 0..count {
            let position = self.random_point(viewport);
            let particle = self.spawn(position);
            self.particles.push(particle);
        }
    }

    /// Appends an already built particle.
    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    fn spawn(&mut self, position: Vec2) -> Particle {
        Particle {
            position,
            velocity: Vec2::new(
                self.rng.gen_range(-0.5..=0.5),
                self.rng.gen_range(-0.5..=0.5),
            ),
            anchor: position,
            size: self.rng.gen_range(0.5..2.5),
            phase: self.rng.gen_range(0.0..std::f32::consts::TAU),
        }
    }

    fn random_point(&mut self, viewport: Viewport) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(0.0..=viewport.width as f32),
            self.rng.gen_range(0.0..=viewport.height as f32),
        )
    }

    /// Pushes particles within `radius` of `pointer` away from it.
    ///
    /// The push grows linearly towards the pointer. `swirl` adds a
    /// tangential kick proportional to the pointer velocity.
    pub fn repel(&mut self, pointer: Vec2, pointer_velocity: Vec2, radius: f32, strength: f32, swirl: f32) {
        for p in &mut self.particles {
            let delta = pointer - p.position;
            let distance = delta.length();
            if distance < radius && distance > f32::EPSILON {
                let direction = delta / distance;
                let force = (radius - distance) / radius;
                let tangent = Vec2::new(
                    -direction.y * pointer_velocity.x,
                    direction.x * pointer_velocity.y,
                ) * swirl;
                p.velocity -= direction * force * strength + tangent;
            }
        }
    }

    /// Adds a small random velocity to every particle.
    pub fn wander(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        for p in &mut self.particles {
            p.velocity += Vec2::new(
                self.rng.gen_range(-amount..=amount),
                self.rng.gen_range(-amount..=amount),
            );
        }
    }

    /// Pulls every particle back towards its anchor.
    pub fn spring(&mut self, stiffness: f32) {
        for p in &mut self.particles {
            p.velocity += (p.anchor - p.position) * stiffness;
        }
    }

    /// Multiplies every velocity by `friction`.
    pub fn damp(&mut self, friction: f32) {
        for p in &mut self.particles {
            p.velocity *= friction;
        }
    }

    /// Moves every particle by its velocity.
    pub fn integrate(&mut self) {
        for p in &mut self.particles {
            p.position += p.velocity;
        }
    }

    /// Wraps particles that left the viewport to the opposite edge.
    pub fn wrap(&mut self, viewport: Viewport) {
        let size = viewport.size();
        for p in &mut self.particles {
            p.position = wrap_point(p.position, size);
        }
    }

    /// Calls `f` for every pair of particles closer than `max_distance`,
    /// with the pair's distance.
    pub fn for_each_link(&self, max_distance: f32, mut f: impl FnMut(&Particle, &Particle, f32)) {
        let max_sq = max_distance * max_distance;
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let distance_sq = a.position.distance_squared(b.position);
                if distance_sq < max_sq {
                    f(a, b, distance_sq.sqrt());
                }
            }
        }
    }
}

/// Wraps a point into `0..=size` on both axes.
pub fn wrap_point(point: Vec2, size: Vec2) -> Vec2 {
    let wrap = |v: f32, max: f32| {
        if v < 0.0 {
            max
        } else if v > max {
            0.0
        } else {
            v
        }
    };
    Vec2::new(wrap(point.x, size.x), wrap(point.y, size.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_grid_tops_up() {
        let mut field = ParticleField::new(7);
        field.seed_grid(Viewport::new(600, 300), 60.0, 20.0, 0.7, 200);
        assert!(field.len() >= 200);

        field.seed_grid(Viewport::new(60, 60), 60.0, 20.0, 0.7, 5);
        assert_eq!(field.len(), 5);
    }

    #[test]
    fn test_spring_and_damping_settle_at_anchor() {
        let mut field = ParticleField::new(1);
        field.push(Particle {
            position: Vec2::new(100.0, 50.0),
            ..Particle::at(Vec2::ZERO)
        });
        for _ in 0..500 {
            field.spring(0.01);
            field.damp(0.92);
            field.integrate();
        }
        assert!(field.particles()[0].position.length() < 0.01);
    }

    #[test]
    fn test_repel_pushes_away() {
        let mut field = ParticleField::new(1);
        field.push(Particle::at(Vec2::new(10.0, 0.0)));
        field.push(Particle::at(Vec2::new(500.0, 0.0)));
        field.repel(Vec2::ZERO, Vec2::ZERO, 150.0, 0.5, 0.1);
        assert!(field.particles()[0].velocity.x > 0.0);
        assert_eq!(field.particles()[1].velocity, Vec2::ZERO);
    }

    #[test]
    fn test_wrap_point() {
        let size = Vec2::new(100.0, 50.0);
        assert_eq!(wrap_point(Vec2::new(-1.0, 51.0), size), Vec2::new(100.0, 0.0));
        assert_eq!(wrap_point(Vec2::new(20.0, 20.0), size), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_links_are_unique_pairs() {
        let mut field = ParticleField::new(1);
        for x in [0.0, 10.0, 20.0, 200.0] {
            field.push(Particle::at(Vec2::new(x, 0.0)));
        }
        let mut links = Vec::new();
        field.for_each_link(15.0, |a, b, d| links.push((a.position.x, b.position.x, d)));
        assert_eq!(links, vec![(0.0, 10.0, 10.0), (10.0, 20.0, 10.0)]);
    }
}
