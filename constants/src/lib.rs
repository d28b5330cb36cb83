//! Shared tuning tables for the ocean scene.
//!
//! Everything here is compile-time data: population counts, spawn bounds,
//! animation steps, interaction timings, colour palettes and model file names.

pub mod animation;
pub mod assets;
pub mod interaction;
pub mod palette;
pub mod population;
