//! Mouse picking: turn a click into at most one body

use common::Ray;
use glam::{Vec2, Vec3};

use crate::registry::BodyId;
use crate::scene::Orrery;

/// Small moons are hard to hit at their true size.
pub const PICK_MIN_RADIUS: f32 = 0.6;

/// Pointer travel, in physical pixels, under which a press and release
/// count as a click rather than a drag.
pub const CLICK_SLOP: f32 = 4.0;

/// Distance along `ray` to the first intersection with a sphere, if any.
/// A ray starting inside the sphere hits at its exit point.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

/// The nearest body hit by `ray`. Only this body receives the click.
pub fn pick(ray: &Ray, orrery: &Orrery) -> Option<(BodyId, f32)> {
    orrery
        .bodies()
        .iter()
        .filter_map(|node| {
            let radius = node.config.visual_radius.max(PICK_MIN_RADIUS);
            ray_sphere(ray, node.position(), radius).map(|t| (node.id(), t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Tracks a mouse press to tell clicks apart from orbit drags.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClickTracker {
    pressed_at: Option<Vec2>,
    travelled: f32,
}

impl ClickTracker {
    pub fn press(&mut self, cursor: Vec2) {
        self.pressed_at = Some(cursor);
        self.travelled = 0.0;
    }

    pub fn moved(&mut self, delta: Vec2) {
        if self.pressed_at.is_some() {
            self.travelled += delta.length();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed_at.is_some() && self.travelled >= CLICK_SLOP
    }

    /// Returns the press position when the release completes a click.
    pub fn release(&mut self) -> Option<Vec2> {
        let pressed_at = self.pressed_at.take()?;
        (self.travelled < CLICK_SLOP).then_some(pressed_at)
    }
}
