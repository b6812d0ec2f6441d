//! Per-body orbital state: circular orbit placement and self-rotation
//!
//! Orbits are cosmetic. A body moves on a circle in the XZ plane around its
//! parent's live position, at a constant angular rate taken from the
//! registry; there is no gravity.

use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use crate::registry::CelestialBodyConfig;

/// Converts registry angular speeds into radians per second.
pub const ORBIT_SPEED_SCALE: f32 = 0.1;

/// Self-rotation per rendered frame, in radians. Not affected by pause.
pub const SPIN_STEP: f32 = 0.005;

/// The three named transforms of a body.
///
/// Composed as `translate(orbit) * rotate_z(tilt) * rotate_y(spin)`: the body
/// spins about its own pole, the pole is tilted, and the result is placed on
/// the orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub orbit: Vec3,
    pub tilt: f32,
    pub spin: f32,
}

impl BodyTransform {
    /// Frame of the equatorial plane: tilted with the pole, not spinning.
    pub fn equator(&self) -> Quat {
        Quat::from_rotation_z(self.tilt)
    }

    /// Orientation of the body: tilt applied after spin.
    pub fn rotation(&self) -> Quat {
        self.equator() * Quat::from_rotation_y(self.spin)
    }
}

/// Mutable orbital state of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalState {
    /// Angle along the orbit, kept in `[0, 2π)`.
    pub phase: f32,
    /// Accumulated self-rotation, kept in `[0, 2π)`.
    pub spin: f32,
    /// World-space position for the current frame.
    pub position: Vec3,
}

impl OrbitalState {
    pub fn new(config: &CelestialBodyConfig, parent_position: Vec3) -> Self {
        let phase = config.start_phase.rem_euclid(TAU);
        Self {
            phase,
            spin: 0.0,
            position: parent_position + orbit_offset(config.orbital_radius, phase),
        }
    }

    /// Advance one frame. The orbit freezes while `paused`; spin does not.
    pub fn advance(
        &mut self,
        config: &CelestialBodyConfig,
        parent_position: Vec3,
        dt: f32,
        paused: bool,
    ) {
        if !paused && !config.is_stationary() {
            self.phase = (self.phase + dt * config.angular_speed * ORBIT_SPEED_SCALE).rem_euclid(TAU);
        }
        self.spin = (self.spin + SPIN_STEP).rem_euclid(TAU);
        self.position = parent_position + orbit_offset(config.orbital_radius, self.phase);
    }

    pub fn transform(&self, config: &CelestialBodyConfig) -> BodyTransform {
        BodyTransform {
            orbit: self.position,
            tilt: config.axial_tilt,
            spin: self.spin,
        }
    }
}

/// Offset from the parent for a circular orbit of `radius` at `phase`.
pub fn orbit_offset(radius: f32, phase: f32) -> Vec3 {
    Vec3::new(phase.sin() * radius, 0.0, phase.cos() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{find, EARTH, SUN};

    fn angle_diff(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn earth_advances_by_speed_times_scale() {
        let earth = find(EARTH).unwrap();
        let mut state = OrbitalState::new(earth, Vec3::ZERO);
        let before = state.phase;

        state.advance(earth, Vec3::ZERO, 1.0, false);

        assert!(angle_diff(state.phase, before + 0.8 * ORBIT_SPEED_SCALE) < 1e-5);
        assert!((state.position.x - state.phase.sin() * 38.0).abs() < 1e-4);
        assert!((state.position.z - state.phase.cos() * 38.0).abs() < 1e-4);
        assert_eq!(state.position.y, 0.0);
    }

    #[test]
    fn position_stays_on_orbit_circle() {
        let earth = find(EARTH).unwrap();
        let mut state = OrbitalState::new(earth, Vec3::ZERO);
        for _ in 0..500 {
            state.advance(earth, Vec3::ZERO, 0.37, false);
            let r2 = state.position.x.powi(2) + state.position.z.powi(2);
            assert!((r2 - 38.0 * 38.0).abs() < 0.05, "r² = {r2}");
        }
    }

    #[test]
    fn pause_freezes_phase_but_not_spin() {
        let earth = find(EARTH).unwrap();
        let mut state = OrbitalState::new(earth, Vec3::ZERO);
        let phase = state.phase;
        let position = state.position;

        for _ in 0..10 {
            state.advance(earth, Vec3::ZERO, 0.5, true);
        }

        assert_eq!(state.phase, phase);
        assert_eq!(state.position, position);
        assert!((state.spin - 10.0 * SPIN_STEP).abs() < 1e-5);
    }

    #[test]
    fn sun_never_moves() {
        let sun = find(SUN).unwrap();
        let mut state = OrbitalState::new(sun, Vec3::ZERO);
        for _ in 0..100 {
            state.advance(sun, Vec3::ZERO, 1.0, false);
        }
        assert_eq!(state.position, Vec3::ZERO);
        assert!(state.spin > 0.0);
    }

    #[test]
    fn orbit_is_relative_to_parent() {
        let earth = find(EARTH).unwrap();
        let parent = Vec3::new(10.0, 2.0, -4.0);
        let state = OrbitalState::new(earth, parent);
        assert!(((state.position - parent).length() - 38.0).abs() < 1e-4);
    }

    #[test]
    fn spin_keeps_the_tilted_pole() {
        let mut transform = BodyTransform {
            orbit: Vec3::new(5.0, 0.0, 0.0),
            tilt: 0.5,
            spin: 0.0,
        };
        let pole = transform.equator() * Vec3::Y;
        assert!((pole - Vec3::new(-0.5f32.sin(), 0.5f32.cos(), 0.0)).length() < 1e-5);

        for spin in [0.3, 1.2, 4.0] {
            transform.spin = spin;
            assert!((transform.rotation() * Vec3::Y - pole).length() < 1e-5);
        }
    }
}
