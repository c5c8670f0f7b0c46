//! Domain core: parameter model, escape-time mathematics and the one-shot
//! renderer. Nothing in here knows about threads beyond rayon.

pub mod actions;
pub mod data;
pub mod fractals;
pub mod util;
