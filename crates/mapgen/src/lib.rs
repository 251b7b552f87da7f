//! Map generation for Starhold: one-shot construction of the initial
//! planet layout and operator seeding. Not tick-driven.

pub mod layout;

pub use layout::*;
