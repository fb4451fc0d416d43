//! Headless tick driver for the flocking simulation: resolves settings,
//! seeds the flock, steps it at a fixed rate and streams snapshots.

pub mod driver;
pub mod settings;
pub mod snapshot;
