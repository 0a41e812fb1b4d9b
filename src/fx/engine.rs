//! Confetti/ripple engine
//!
//! Owns the live entities and the "loop running" flag. Spawning marks the
//! loop as running; `tick` clears it the moment both collections are empty.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::particle::{Particle, Ripple};
use crate::consts::*;

/// Ripple stroke color (amber)
const RIPPLE_RGB: (u8, u8, u8) = (234, 179, 8);
const RIPPLE_LINE_WIDTH: f32 = 2.0;
const CONFETTI_ALPHA: f32 = 0.95;

/// Drawing surface for the overlay (a 2D canvas in the browser)
pub trait FxCanvas {
    /// Clear the whole surface
    fn clear(&mut self, width: f32, height: f32);
    /// Fill a rectangle at `pos`, rotated by `rot`, in local coords `(x, y, w, h)`
    fn fill_rotated_rect(&mut self, pos: Vec2, rot: f32, rect: [f32; 4], color: &str);
    /// Stroke a circle outline
    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: &str);
}

/// The overlay simulation
#[derive(Debug, Clone)]
pub struct FxEngine {
    particles: Vec<Particle>,
    ripples: Vec<Ripple>,
    running: bool,
    viewport: Vec2,
    rng: Pcg32,
}

impl FxEngine {
    /// Create an idle engine with a seeded RNG
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            ripples: Vec::new(),
            running: false,
            viewport: Vec2::new(1280.0, 720.0),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Update the viewport used for default spawn positions
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Whether the host should keep requesting frames
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    /// Spawn `count` confetti fragments at (x, y).
    ///
    /// Returns true if the loop was idle and the host must start scheduling
    /// frames again.
    pub fn spawn_confetti(&mut self, x: f32, y: f32, count: usize, power: f32, life_scale: f32) -> bool {
        let origin = Vec2::new(x, y);
        self.particles.reserve(count);
        for _ in 0..count {
            let p = Particle::random(&mut self.rng, origin, power, life_scale);
            self.particles.push(p);
        }
        self.ensure_running()
    }

    /// Spawn `qty` concentric rings at (x, y), radii `r0, r0+8, r0+16, ...`
    ///
    /// Returns true if the host must start scheduling frames again.
    pub fn spawn_ripple(&mut self, x: f32, y: f32, r0: f32, spread: f32, qty: usize) -> bool {
        let center = Vec2::new(x, y);
        for i in 0..qty {
            let radius = r0 + i as f32 * RIPPLE_RING_GAP;
            self.ripples.push(Ripple::new(center, radius, spread));
        }
        self.ensure_running()
    }

    /// Confetti with defaults: upper third of the screen, 140 pieces
    pub fn burst(
        &mut self,
        x: Option<f32>,
        y: Option<f32>,
        n: Option<usize>,
        power: Option<f32>,
        life_scale: Option<f32>,
    ) -> bool {
        let x = x.unwrap_or(self.viewport.x / 2.0);
        let y = y.unwrap_or(self.viewport.y / 3.0);
        self.spawn_confetti(
            x,
            y,
            n.unwrap_or(CONFETTI_COUNT),
            power.unwrap_or(CONFETTI_POWER),
            life_scale.unwrap_or(1.0),
        )
    }

    /// Two rings slightly above screen center
    pub fn ripple(&mut self, x: Option<f32>, y: Option<f32>) -> bool {
        let x = x.unwrap_or(self.viewport.x / 2.0);
        let y = y.unwrap_or(self.viewport.y * 0.35);
        self.spawn_ripple(x, y, 14.0, RIPPLE_SPREAD, RIPPLE_QTY)
    }

    /// Drop every live entity and stop the loop
    pub fn clear(&mut self) {
        self.particles.clear();
        self.ripples.clear();
        self.running = false;
    }

    /// Advance one frame. Returns whether another frame is needed.
    pub fn tick(&mut self) -> bool {
        // Reverse order so removal never skips a neighbour
        for i in (0..self.particles.len()).rev() {
            if !self.particles[i].step() {
                self.particles.remove(i);
            }
        }

        for i in (0..self.ripples.len()).rev() {
            if !self.ripples[i].step() {
                self.ripples.remove(i);
            }
        }

        if self.particles.is_empty() && self.ripples.is_empty() {
            self.running = false;
        }
        self.running
    }

    /// Draw the current frame
    pub fn render<C: FxCanvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear(self.viewport.x, self.viewport.y);

        for p in self.particles.iter().rev() {
            let color = format!("hsl({} 80% 65% / {})", p.hue, CONFETTI_ALPHA);
            canvas.fill_rotated_rect(p.pos, p.rot, [-p.size, 0.0, p.size * 2.0, p.size], &color);
        }

        for r in self.ripples.iter().rev() {
            let (red, green, blue) = RIPPLE_RGB;
            let color = format!("rgba({},{},{},{})", red, green, blue, r.alpha.max(0.0));
            canvas.stroke_circle(r.center, r.radius, RIPPLE_LINE_WIDTH, &color);
        }
    }

    /// Returns true when this call flipped the loop from idle to running
    fn ensure_running(&mut self) -> bool {
        if self.running || (self.particles.is_empty() && self.ripples.is_empty()) {
            return false;
        }
        self.running = true;
        true
    }
}
