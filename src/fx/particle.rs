//! Confetti fragments and ripple rings

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A confetti fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames left to live
    pub life: i32,
    pub size: f32,
    /// Hue in degrees (0-359)
    pub hue: u16,
    /// Rotation (radians)
    pub rot: f32,
    /// Angular velocity (radians/frame)
    pub vr: f32,
}

impl Particle {
    /// Roll a new fragment at `origin`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, origin: Vec2, power: f32, life_scale: f32) -> Self {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = rng.random::<f32>() * power + CONFETTI_MIN_SPEED;
        let lift = rng.random::<f32>() * CONFETTI_LIFT;
        let vel = Vec2::new(angle.cos() * speed, angle.sin() * speed - lift);

        let base_life = CONFETTI_MIN_LIFE + rng.random::<f32>() * CONFETTI_LIFE_SPREAD;
        let life = (base_life * life_scale).ceil() as i32;

        Self {
            pos: origin,
            vel,
            life,
            size: CONFETTI_MIN_SIZE + rng.random::<f32>() * CONFETTI_SIZE_SPREAD,
            hue: rng.random_range(0..360),
            rot: rng.random::<f32>() * std::f32::consts::TAU,
            vr: (rng.random::<f32>() - 0.5) * CONFETTI_SPIN,
        }
    }

    /// Advance one frame. Returns false once the fragment has expired.
    pub fn step(&mut self) -> bool {
        self.life -= 1;
        if self.life <= 0 {
            return false;
        }
        self.vel.y += GRAVITY;
        self.pos += self.vel;
        self.rot += self.vr;
        true
    }
}

/// An expanding, fading ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ripple {
    pub center: Vec2,
    pub radius: f32,
    /// Radius growth per frame
    pub growth: f32,
    pub alpha: f32,
    /// Alpha change per frame (negative)
    pub decay: f32,
}

impl Ripple {
    pub fn new(center: Vec2, radius: f32, growth: f32) -> Self {
        Self {
            center,
            radius,
            growth,
            alpha: RIPPLE_ALPHA,
            decay: -RIPPLE_DECAY,
        }
    }

    /// Advance one frame. Returns false once fully faded.
    pub fn step(&mut self) -> bool {
        self.radius += self.growth;
        self.alpha += self.decay;
        self.alpha > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_particle_random_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let p = Particle::random(&mut rng, Vec2::new(10.0, 20.0), CONFETTI_POWER, 1.0);
            assert_eq!(p.pos, Vec2::new(10.0, 20.0));
            assert!((60..=110).contains(&p.life));
            assert!(p.size >= 2.0 && p.size < 6.0);
            assert!(p.hue < 360);
            assert!(p.vr.abs() <= 0.1);
            // Speed before lift is [2, 10); lift adds at most 2 more
            assert!(p.vel.length() < 12.0 + 0.001);
        }
    }

    #[test]
    fn test_particle_life_scale() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let p = Particle::random(&mut rng, Vec2::ZERO, CONFETTI_POWER, 0.5);
            assert!((30..=55).contains(&p.life));
        }
    }

    #[test]
    fn test_particle_step_applies_gravity() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, -2.0),
            life: 10,
            size: 3.0,
            hue: 0,
            rot: 0.0,
            vr: 0.1,
        };
        assert!(p.step());
        assert_eq!(p.life, 9);
        assert!((p.vel.y - (-2.0 + GRAVITY)).abs() < 1e-6);
        assert!((p.pos.x - 1.0).abs() < 1e-6);
        assert!((p.pos.y - (-2.0 + GRAVITY)).abs() < 1e-6);
        assert!((p.rot - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_particle_expires_without_moving() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(5.0, 5.0),
            life: 1,
            size: 3.0,
            hue: 0,
            rot: 0.0,
            vr: 0.0,
        };
        assert!(!p.step());
        assert_eq!(p.pos, Vec2::ZERO);
    }

    #[test]
    fn test_ripple_fades_out() {
        let mut r = Ripple::new(Vec2::ZERO, 12.0, 3.0);
        let mut frames = 0;
        while r.step() {
            frames += 1;
            assert!(frames < 100, "ripple never faded");
        }
        // 0.35 / 0.01 frames, give or take float drift
        assert!((33..=35).contains(&frames));
        assert!(r.radius > 12.0);
    }
}
