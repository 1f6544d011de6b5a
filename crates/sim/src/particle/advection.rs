//! Particle advection and collision handling.

use glam::Vec2;
use rayon::prelude::*;

use super::ParticleSystem;
use crate::scene::Obstacle;

impl ParticleSystem {
    /// Symplectic Euler: gravity into velocity, then velocity into position
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        let dv = Vec2::new(0.0, gravity * dt);
        self.pos
            .par_iter_mut()
            .zip(self.vel.par_iter_mut())
            .for_each(|(p, v)| {
                *v += dv;
                *p += *v * dt;
            });
    }

    /// Resolve obstacle and wall contacts.
    ///
    /// Particles inside the obstacle are projected to its surface and take its
    /// velocity. Particles past a wall are clamped and lose the velocity
    /// component normal to that wall.
    pub fn handle_collisions(&mut self, obstacle: &Obstacle) {
        let min_bound = self.min_bound;
        let max_bound = self.max_bound;
        let contact = obstacle.radius + self.radius;
        let contact_sq = contact * contact;
        let active = obstacle.is_active();

        self.pos
            .par_iter_mut()
            .zip(self.vel.par_iter_mut())
            .for_each(|(p, v)| {
                if active {
                    let d = *p - obstacle.pos;
                    let d_sq = d.length_squared();
                    if d_sq < contact_sq {
                        let normal = if d_sq > 0.0 { d / d_sq.sqrt() } else { Vec2::Y };
                        *p = obstacle.pos + normal * contact;
                        *v = obstacle.vel;
                    }
                }

                if p.x < min_bound.x {
                    p.x = min_bound.x;
                    v.x = 0.0;
                }
                if p.x > max_bound.x {
                    p.x = max_bound.x;
                    v.x = 0.0;
                }
                if p.y < min_bound.y {
                    p.y = min_bound.y;
                    v.y = 0.0;
                }
                if p.y > max_bound.y {
                    p.y = max_bound.y;
                    v.y = 0.0;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use glam::Vec3;

    fn system() -> ParticleSystem {
        let grid = Grid::new(1000.0, 1.0, 1.0, 0.05).unwrap();
        ParticleSystem::new(8, 0.01, &grid).unwrap()
    }

    #[test]
    fn test_integrate_applies_gravity_then_moves() {
        let mut ps = system();
        ps.push(Vec2::new(0.5, 0.5), Vec2::new(1.0, 0.0), Vec3::ZERO).unwrap();
        ps.integrate(0.1, -10.0);
        assert!((ps.velocities()[0] - Vec2::new(1.0, -1.0)).length() < 1e-6);
        assert!((ps.positions()[0] - Vec2::new(0.6, 0.4)).length() < 1e-6);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut ps = system();
        ps.push(Vec2::new(0.5, 0.5), Vec2::new(1.0, 2.0), Vec3::ZERO).unwrap();
        ps.integrate(0.0, -9.81);
        assert_eq!(ps.positions()[0], Vec2::new(0.5, 0.5));
        assert_eq!(ps.velocities()[0], Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_wall_clamp_zeroes_normal_velocity() {
        let mut ps = system();
        ps.push(Vec2::new(-0.2, 0.5), Vec2::new(-3.0, 1.0), Vec3::ZERO).unwrap();
        ps.push(Vec2::new(0.5, 2.0), Vec2::new(0.5, 4.0), Vec3::ZERO).unwrap();
        ps.handle_collisions(&Obstacle::none());

        let (lo, hi) = ps.bounds();
        assert_eq!(ps.positions()[0].x, lo.x);
        assert_eq!(ps.velocities()[0], Vec2::new(0.0, 1.0));
        assert_eq!(ps.positions()[1].y, hi.y);
        assert_eq!(ps.velocities()[1], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_obstacle_pushes_particle_to_surface() {
        let mut ps = system();
        ps.push(Vec2::new(0.52, 0.5), Vec2::ZERO, Vec3::ZERO).unwrap();
        ps.push(Vec2::new(0.5, 0.5), Vec2::ZERO, Vec3::ZERO).unwrap();

        let mut obstacle = Obstacle::new(Vec2::new(0.5, 0.5), 0.1);
        obstacle.vel = Vec2::new(0.3, -0.2);
        ps.handle_collisions(&obstacle);

        let contact = 0.1 + ps.radius();
        for (p, v) in ps.positions().iter().zip(ps.velocities()) {
            assert!((p.distance(obstacle.pos) - contact).abs() < 1e-5);
            assert_eq!(*v, obstacle.vel);
        }
        // Centred particle leaves straight up
        assert!(ps.positions()[1].y > 0.5);
    }
}
