//! Celebration overlay effects
//!
//! A tiny frame-stepped simulation of confetti and ripple rings. The engine
//! never schedules itself: the host calls `FxEngine::tick` once per display
//! frame while it returns `true`, then stops until the next spawn.

pub mod engine;
pub mod particle;

pub use engine::{FxCanvas, FxEngine};
pub use particle::{Particle, Ripple};
