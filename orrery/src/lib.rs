//! Interactive solar system
//!
//! Bodies move on cosmetic circular orbits. Clicking one flies the camera
//! in to it and follows it around its orbit until the user returns to the
//! overview or drags away.

pub mod config;
pub mod controller;
pub mod orbit;
pub mod picking;
pub mod registry;
pub mod scene;
pub mod selection;

pub use config::{CliArgs, ConfigError, OrreryConfig};
pub use controller::{CameraCommand, CameraController, CameraTuning, FlightState, Transition};
pub use orbit::{BodyTransform, OrbitalState};
pub use registry::{BodyId, BodyKind, CelestialBodyConfig};
pub use scene::{Orrery, SceneSettings};
pub use selection::{LivePositions, Selection, SelectionChannel, SelectionEvent};
