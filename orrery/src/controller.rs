//! Camera flight controller
//!
//! Flies the camera from the overview to a selected body, follows the body
//! while it orbits, and flies back out when asked to or when the user drags
//! the camera too far away.
//!
//! ```text
//!   Overview --select--> FlyingIn --arrived--> Tracking
//!      ^                    |                     |
//!      |                 return          return / released
//!      |                    v                     v
//!      +----at home----- FlyingOut <--------------+
//! ```
//!
//! The controller is the single integration point for the camera each
//! frame. Mouse drag and scroll act on [`Camera3D`] between frames; the
//! controller reads whatever they left behind, applies its own motion, and
//! writes the result back with [`Camera3D::look_from`].

use common::Camera3D;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::selection::{LivePositions, Selection, SelectionChannel, SelectionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    Overview,
    FlyingIn,
    Tracking,
    FlyingOut,
}

impl FlightState {
    pub fn label(self) -> &'static str {
        match self {
            FlightState::Overview => "Overview",
            FlightState::FlyingIn => "Flying in",
            FlightState::Tracking => "Tracking",
            FlightState::FlyingOut => "Flying out",
        }
    }
}

/// A state change made during one call to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: FlightState,
    pub to: FlightState,
}

/// Commands sent to the controller by the overlay or keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    ReturnToOverview,
}

/// Tuning constants for the flight controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining gap closed per frame while easing.
    pub smoothing: f32,
    /// Distance under which a flight counts as arrived.
    pub arrival_epsilon: f32,
    /// Extra distance beyond the standoff before tracking lets go.
    pub release_margin: f32,
    /// Standoff grows by this much per unit of visual radius.
    pub standoff_radius_factor: f32,
    /// Standoff for a body of zero size.
    pub standoff_base: f32,
    /// Height of the approach above the body, in visual radii, before
    /// normalising back to the standoff distance.
    pub lift_fraction: f32,
    /// Starting camera position, also used when the camera sits exactly on
    /// the origin and has no direction to keep.
    pub home_position: [f32; 3],
    /// Overview never sits closer to the origin than this.
    pub home_min_distance: f32,
    /// Overview never sits lower than this.
    pub home_height_floor: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            smoothing: 0.05,
            arrival_epsilon: 0.05,
            release_margin: 40.0,
            standoff_radius_factor: 4.0,
            standoff_base: 1.5,
            lift_fraction: 0.6,
            home_position: [0.0, 90.0, 210.0],
            home_min_distance: 80.0,
            home_height_floor: 20.0,
        }
    }
}

impl CameraTuning {
    /// Camera-to-body distance when focused on a body of `visual_radius`.
    pub fn standoff(&self, visual_radius: f32) -> f32 {
        visual_radius * self.standoff_radius_factor + self.standoff_base
    }

    /// Distance at which tracking releases the body.
    pub fn release_distance(&self, visual_radius: f32) -> f32 {
        self.standoff(visual_radius) + self.release_margin
    }

    pub fn home_position(&self) -> Vec3 {
        Vec3::from_array(self.home_position)
    }

    /// Overview camera position for a camera currently at `position`: the
    /// same direction from the origin, pushed out to the minimum distance
    /// and lifted to the height floor.
    pub fn home_for(&self, position: Vec3) -> Vec3 {
        let direction = position.normalize_or_zero();
        if direction == Vec3::ZERO {
            return self.home_position();
        }
        let mut home = direction * position.length().max(self.home_min_distance);
        home.y = home.y.max(self.home_height_floor);
        home
    }

    /// Camera offset from a body at `body` when focused on it. The camera sits
    /// on the sun-facing side, raised a little, exactly `standoff` away.
    /// `current` is the camera's present offset, used only for a body at the
    /// origin where there is no sun-facing side.
    pub fn approach_offset(&self, body: Vec3, visual_radius: f32, current: Vec3) -> Vec3 {
        let standoff = self.standoff(visual_radius);
        let mut horizontal = (-body).normalize_or_zero();
        if horizontal == Vec3::ZERO {
            horizontal = Vec3::new(current.x, 0.0, current.z).normalize_or_zero();
        }
        if horizontal == Vec3::ZERO {
            horizontal = Vec3::Z;
        }
        let raw = horizontal * standoff + Vec3::Y * (self.lift_fraction * visual_radius);
        raw.normalize() * standoff
    }
}

pub struct CameraController {
    tuning: CameraTuning,
    state: FlightState,
    focus: Option<Selection>,
    /// Body position seen on the previous frame, for rigid follow.
    last_body_position: Option<Vec3>,
}

impl CameraController {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            tuning,
            state: FlightState::Overview,
            focus: None,
            last_body_position: None,
        }
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn focus(&self) -> Option<&Selection> {
        self.focus.as_ref()
    }

    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Put the camera at the configured home, looking at the origin.
    pub fn place_at_home(&self, camera: &mut Camera3D) {
        camera.look_from(self.tuning.home_position(), Vec3::ZERO);
    }

    pub fn command(
        &mut self,
        command: CameraCommand,
        selection: &mut SelectionChannel,
    ) -> Option<Transition> {
        match command {
            CameraCommand::ReturnToOverview => {
                selection.clear();
                // The clear above is already handled here.
                selection.drain_events().for_each(drop);
                let from = self.state;
                self.begin_return();
                self.report(from)
            }
        }
    }

    /// Run one frame. Body positions must already be advanced for this frame.
    pub fn update<B: LivePositions>(
        &mut self,
        camera: &mut Camera3D,
        selection: &mut SelectionChannel,
        bodies: &B,
    ) -> Option<Transition> {
        let from = self.state;

        for event in selection.drain_events() {
            match event {
                SelectionEvent::Selected(target) => self.begin_flight(target),
                SelectionEvent::Cleared => self.begin_return(),
            }
        }

        match self.state {
            FlightState::Overview => {
                self.ease_home(camera);
            }
            FlightState::FlyingIn | FlightState::Tracking => {
                let focused = self
                    .focus
                    .and_then(|focus| bodies.live_position(focus.body).map(|live| (focus, live)));

                match focused {
                    Some((focus, live)) if self.state == FlightState::FlyingIn => {
                        self.fly_in(camera, focus, live);
                    }
                    Some((focus, live)) => {
                        if self.track(camera, focus, live) {
                            log::info!("Released {}: camera dragged out of range", focus.body);
                            selection.clear();
                            selection.drain_events().for_each(drop);
                            self.begin_return();
                        }
                    }
                    None => {
                        if let Some(focus) = self.focus {
                            log::warn!("Lost track of {}, returning to overview", focus.body);
                        }
                        selection.clear();
                        selection.drain_events().for_each(drop);
                        self.begin_return();
                    }
                }
            }
            FlightState::FlyingOut => {
                if self.ease_home(camera) {
                    self.state = FlightState::Overview;
                }
            }
        }

        self.report(from)
    }

    fn begin_flight(&mut self, target: Selection) {
        let already_focused = self.focus.map(|focus| focus.body) == Some(target.body);
        if already_focused
            && matches!(self.state, FlightState::FlyingIn | FlightState::Tracking)
        {
            return;
        }
        self.focus = Some(target);
        self.last_body_position = None;
        self.state = FlightState::FlyingIn;
    }

    fn begin_return(&mut self) {
        self.focus = None;
        self.last_body_position = None;
        if self.state != FlightState::Overview {
            self.state = FlightState::FlyingOut;
        }
    }

    fn fly_in(&mut self, camera: &mut Camera3D, focus: Selection, live: Vec3) {
        let previous = self.last_body_position.unwrap_or(live);

        // Carry the camera along with the body so the easing below only has
        // to close the gap in the body's own frame.
        let turn = sunward_turn(previous, live);
        let position = live + turn * (camera.position - previous);
        let target = camera.target + (live - previous);

        let goal_position =
            live + self.tuning.approach_offset(live, focus.visual_radius, position - live);

        let position = position.lerp(goal_position, self.tuning.smoothing);
        let target = target.lerp(live, self.tuning.smoothing);
        camera.look_from(position, target);
        self.last_body_position = Some(live);

        let epsilon = self.tuning.arrival_epsilon;
        if position.distance(goal_position) < epsilon && target.distance(live) < epsilon {
            self.state = FlightState::Tracking;
        }
    }

    /// Returns true when the camera is out of range and the body should be
    /// released.
    fn track(&mut self, camera: &mut Camera3D, focus: Selection, live: Vec3) -> bool {
        let previous = self.last_body_position.unwrap_or(live);
        let position = camera.position + (live - previous);
        camera.look_from(position, live);
        self.last_body_position = Some(live);

        position.distance(live) > self.tuning.release_distance(focus.visual_radius)
    }

    /// Ease toward the overview. Returns true once the look-at target has
    /// reached the origin.
    fn ease_home(&self, camera: &mut Camera3D) -> bool {
        let goal = self.tuning.home_for(camera.position);
        let position = camera.position.lerp(goal, self.tuning.smoothing);
        let target = camera.target.lerp(Vec3::ZERO, self.tuning.smoothing);
        camera.look_from(position, target);
        target.length() < self.tuning.arrival_epsilon
    }

    fn report(&self, from: FlightState) -> Option<Transition> {
        if from == self.state {
            return None;
        }
        log::info!("Camera {} -> {}", from.label(), self.state.label());
        Some(Transition {
            from,
            to: self.state,
        })
    }
}

/// Rotation taking the sun-ward direction seen from `previous` to the one
/// seen from `current`. Identity when either sits on the origin.
fn sunward_turn(previous: Vec3, current: Vec3) -> Quat {
    let from = (-previous).normalize_or_zero();
    let to = (-current).normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BodyId, EARTH, SUN};
    use std::collections::HashMap;

    struct Fixed(HashMap<BodyId, Vec3>);

    impl LivePositions for Fixed {
        fn live_position(&self, body: BodyId) -> Option<Vec3> {
            self.0.get(&body).copied()
        }
    }

    fn home_camera(controller: &CameraController) -> Camera3D {
        let mut camera = Camera3D::new(1.0);
        controller.place_at_home(&mut camera);
        camera
    }

    #[test]
    fn standoff_grows_with_radius() {
        let tuning = CameraTuning::default();
        assert!(tuning.standoff(4.0) > tuning.standoff(1.0));
        assert!((tuning.standoff(1.5) - 7.5).abs() < 1e-6);
    }

    #[test]
    fn approach_offset_faces_the_sun_from_above() {
        let tuning = CameraTuning::default();
        let body = Vec3::new(38.0, 0.0, 0.0);
        let offset = tuning.approach_offset(body, 1.5, Vec3::ZERO);

        assert!((offset.length() - tuning.standoff(1.5)).abs() < 1e-4);
        assert!(offset.x < 0.0, "camera should sit between body and sun");
        assert!(offset.y > 0.0, "camera should look slightly down");
    }

    #[test]
    fn approach_offset_for_sun_keeps_current_heading() {
        let tuning = CameraTuning::default();
        let offset = tuning.approach_offset(Vec3::ZERO, 6.0, Vec3::new(3.0, 50.0, 0.0));
        assert!(offset.x > 0.0);
        assert!(offset.z.abs() < 1e-5);

        let again = tuning.approach_offset(Vec3::ZERO, 6.0, offset);
        assert!((again - offset).length() < 1e-4);
    }

    #[test]
    fn home_keeps_direction_and_applies_floors() {
        let tuning = CameraTuning::default();

        let far = Vec3::new(0.0, 150.0, 300.0);
        assert_eq!(tuning.home_for(far), far);

        let close = Vec3::new(10.0, 0.0, 0.0);
        let home = tuning.home_for(close);
        assert!((home.x - tuning.home_min_distance).abs() < 1e-4);
        assert_eq!(home.y, tuning.home_height_floor);

        assert_eq!(tuning.home_for(Vec3::ZERO), tuning.home_position());
    }

    #[test]
    fn overview_sits_still_at_home() {
        let mut controller = CameraController::new(CameraTuning::default());
        let mut camera = home_camera(&controller);
        let mut selection = SelectionChannel::new();
        let bodies = Fixed(HashMap::new());

        for _ in 0..10 {
            assert_eq!(controller.update(&mut camera, &mut selection, &bodies), None);
        }
        assert!((camera.position - controller.tuning().home_position()).length() < 1e-3);
    }

    #[test]
    fn selecting_the_sun_arrives_at_its_standoff() {
        let mut controller = CameraController::new(CameraTuning::default());
        let mut camera = home_camera(&controller);
        let mut selection = SelectionChannel::new();
        let bodies = Fixed(HashMap::from([(SUN, Vec3::ZERO)]));

        selection.select(SUN, 6.0);
        let first = controller.update(&mut camera, &mut selection, &bodies);
        assert_eq!(
            first,
            Some(Transition {
                from: FlightState::Overview,
                to: FlightState::FlyingIn
            })
        );

        for _ in 0..1000 {
            controller.update(&mut camera, &mut selection, &bodies);
        }
        assert_eq!(controller.state(), FlightState::Tracking);
        let standoff = controller.tuning().standoff(6.0);
        assert!((camera.eye_distance() - standoff).abs() < controller.tuning().arrival_epsilon);
    }

    #[test]
    fn reselecting_the_tracked_body_keeps_tracking() {
        let mut controller = CameraController::new(CameraTuning::default());
        let mut camera = home_camera(&controller);
        let mut selection = SelectionChannel::new();
        let bodies = Fixed(HashMap::from([(EARTH, Vec3::new(0.0, 0.0, 38.0))]));

        selection.select(EARTH, 1.5);
        for _ in 0..1000 {
            controller.update(&mut camera, &mut selection, &bodies);
        }
        assert_eq!(controller.state(), FlightState::Tracking);

        selection.select(EARTH, 1.5);
        assert_eq!(controller.update(&mut camera, &mut selection, &bodies), None);
        assert_eq!(controller.state(), FlightState::Tracking);
    }

    #[test]
    fn missing_body_counts_as_return() {
        let mut controller = CameraController::new(CameraTuning::default());
        let mut camera = home_camera(&controller);
        let mut selection = SelectionChannel::new();
        let bodies = Fixed(HashMap::new());

        selection.select(EARTH, 1.5);
        let transition = controller.update(&mut camera, &mut selection, &bodies);

        assert_eq!(transition.map(|t| t.to), Some(FlightState::FlyingOut));
        assert!(selection.is_empty());
        assert!(controller.focus().is_none());
    }

    #[test]
    fn sunward_turn_matches_orbital_motion() {
        let previous = Vec3::new(0.0, 0.0, 10.0);
        let current = Quat::from_rotation_y(0.3) * previous;
        let turn = sunward_turn(previous, current);
        let offset = Vec3::new(1.0, 2.0, -3.0);
        assert!((turn * offset - Quat::from_rotation_y(0.3) * offset).length() < 1e-4);
        assert_eq!(sunward_turn(Vec3::ZERO, current), Quat::IDENTITY);
    }
}
