//! Common utilities for the orrery viewer
//!
//! This crate provides shared graphics setup, the orbit-drag camera, and
//! rendering helpers used by the viewer binary.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
