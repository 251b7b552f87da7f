//! Core engine types and utilities for Starhold.
//!
//! This crate provides the foundational types used across the simulation:
//! - 2D transform and spatial components
//! - Simulation clock and the tick-loop scheduler
//! - Orbital mechanics for planet motion and interception prediction

pub mod components;
pub mod orbit;
pub mod scheduler;
pub mod time;
pub mod transform;

pub use components::*;
pub use orbit::*;
pub use scheduler::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::Vec2;
pub use hecs::{Entity, World};
