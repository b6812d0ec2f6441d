//! Scene composition: registry bodies, starfield and asteroid belt

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::orbit::OrbitalState;
use crate::registry::{BodyId, BodyInfo, CelestialBodyConfig, BODIES};
use crate::selection::{LivePositions, Selection};

/// Starfield rotation in radians per second. Runs even while paused.
pub const STARFIELD_SPIN: f32 = 0.004;

/// Asteroid belt rotation in radians per second.
pub const BELT_SPIN: f32 = 0.03;

/// Decorative scene settings, loaded from the `scene` section of the config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneSettings {
    pub seed: u64,
    pub star_count: usize,
    /// Radius of the sky sphere the stars sit on.
    pub star_distance: f32,
    pub asteroid_count: usize,
    pub belt_inner: f32,
    pub belt_outer: f32,
    /// Total vertical spread of the belt.
    pub belt_thickness: f32,
    pub show_orbits: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            seed: 7,
            star_count: 1500,
            star_distance: 900.0,
            asteroid_count: 1200,
            belt_inner: 62.0,
            belt_outer: 78.0,
            belt_thickness: 2.0,
            show_orbits: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Unit direction on the sky sphere.
    pub direction: Vec3,
    pub brightness: f32,
}

#[derive(Debug, Clone)]
pub struct Starfield {
    pub stars: Vec<Star>,
    pub distance: f32,
    pub rotation: f32,
}

impl Starfield {
    pub fn generate(rng: &mut StdRng, count: usize, distance: f32) -> Self {
        let stars = (0..count)
            .map(|_| {
                let theta = rng.gen_range(0.0..TAU);
                let phi = (1.0 - 2.0 * rng.gen::<f32>()).acos();
                let direction =
                    Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                // Many dim stars, a few bright ones
                let brightness = 0.25 + 0.75 * rng.gen::<f32>().powi(3);
                Star { direction, brightness }
            })
            .collect();

        Self {
            stars,
            distance,
            rotation: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.rotation = (self.rotation + STARFIELD_SPIN * dt).rem_euclid(TAU);
    }

    /// World position of a star under the current rotation.
    pub fn position(&self, star: &Star) -> Vec3 {
        glam::Quat::from_rotation_y(self.rotation) * star.direction * self.distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asteroid {
    pub angle: f32,
    pub radius: f32,
    pub height: f32,
    pub scale: f32,
}

/// A ring of small rocks rotated together as one rigid group.
#[derive(Debug, Clone)]
pub struct AsteroidBelt {
    pub asteroids: Vec<Asteroid>,
    pub rotation: f32,
}

impl AsteroidBelt {
    pub fn generate(rng: &mut StdRng, settings: &SceneSettings) -> Self {
        let half_thickness = settings.belt_thickness * 0.5;
        let asteroids = (0..settings.asteroid_count)
            .map(|_| Asteroid {
                angle: rng.gen_range(0.0..TAU),
                radius: rng.gen_range(settings.belt_inner..=settings.belt_outer),
                height: rng.gen_range(-half_thickness..=half_thickness),
                scale: rng.gen_range(0.05..0.25),
            })
            .collect();

        Self {
            asteroids,
            rotation: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32, paused: bool) {
        if !paused {
            self.rotation = (self.rotation + BELT_SPIN * dt).rem_euclid(TAU);
        }
    }

    pub fn position(&self, asteroid: &Asteroid) -> Vec3 {
        let angle = asteroid.angle + self.rotation;
        Vec3::new(
            angle.sin() * asteroid.radius,
            asteroid.height,
            angle.cos() * asteroid.radius,
        )
    }
}

/// One registry body and its live orbital state.
#[derive(Debug, Clone)]
pub struct BodyNode {
    pub config: &'static CelestialBodyConfig,
    pub state: OrbitalState,
}

impl BodyNode {
    pub fn id(&self) -> BodyId {
        self.config.id
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }
}

/// The whole scene.
pub struct Orrery {
    bodies: Vec<BodyNode>,
    index: HashMap<BodyId, usize>,
    pub starfield: Starfield,
    pub belt: AsteroidBelt,
}

impl Orrery {
    pub fn new(settings: &SceneSettings) -> Self {
        Self::with_bodies(BODIES, settings)
    }

    /// Build from any registry slice whose parents precede their moons.
    pub fn with_bodies(configs: &'static [CelestialBodyConfig], settings: &SceneSettings) -> Self {
        let mut bodies: Vec<BodyNode> = Vec::with_capacity(configs.len());
        let mut index = HashMap::with_capacity(configs.len());

        for config in configs {
            let parent_position = config
                .parent
                .and_then(|parent| index.get(&parent))
                .map(|&i: &usize| bodies[i].state.position)
                .unwrap_or(Vec3::ZERO);
            index.insert(config.id, bodies.len());
            bodies.push(BodyNode {
                config,
                state: OrbitalState::new(config, parent_position),
            });
        }

        let mut rng = StdRng::seed_from_u64(settings.seed);
        let starfield = Starfield::generate(&mut rng, settings.star_count, settings.star_distance);
        let belt = AsteroidBelt::generate(&mut rng, settings);

        log::debug!(
            "Scene built: {} bodies, {} stars, {} asteroids",
            bodies.len(),
            starfield.stars.len(),
            belt.asteroids.len()
        );

        Self {
            bodies,
            index,
            starfield,
            belt,
        }
    }

    /// Advance every body, parents first, then the decorations.
    pub fn advance(&mut self, dt: f32, paused: bool) {
        for i in 0..self.bodies.len() {
            let parent_position = self.parent_position(i);
            let node = &mut self.bodies[i];
            node.state.advance(node.config, parent_position, dt, paused);
        }
        self.starfield.advance(dt);
        self.belt.advance(dt, paused);
    }

    fn parent_position(&self, i: usize) -> Vec3 {
        self.bodies[i]
            .config
            .parent
            .and_then(|parent| self.index.get(&parent))
            .map(|&p| self.bodies[p].state.position)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn body(&self, id: BodyId) -> Option<&BodyNode> {
        self.index.get(&id).map(|&i| &self.bodies[i])
    }

    pub fn bodies(&self) -> &[BodyNode] {
        &self.bodies
    }

    /// Position of the centre a body orbits around.
    pub fn orbit_center(&self, node: &BodyNode) -> Vec3 {
        node.config
            .parent
            .and_then(|parent| self.body(parent))
            .map(BodyNode::position)
            .unwrap_or(Vec3::ZERO)
    }

    /// Remove a body and everything orbiting it. Returns false if it was not
    /// in the scene.
    pub fn remove(&mut self, id: BodyId) -> bool {
        if !self.index.contains_key(&id) {
            return false;
        }
        let mut removed = vec![id];
        // Registry order puts moons after their parent, so one pass suffices.
        self.bodies.retain(|node| {
            let orphaned = node
                .config
                .parent
                .is_some_and(|parent| removed.contains(&parent));
            if node.id() == id || orphaned {
                removed.push(node.id());
                false
            } else {
                true
            }
        });
        self.index = self
            .bodies
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();
        log::debug!("Removed {} from the scene", removed.len() - 1);
        true
    }

    /// Display metadata for the overlay.
    pub fn describe(&self, selection: &Selection) -> Option<&'static BodyInfo> {
        self.body(selection.body).map(|node| &node.config.info)
    }
}

impl LivePositions for Orrery {
    fn live_position(&self, body: BodyId) -> Option<Vec3> {
        self.body(body).map(BodyNode::position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EARTH, JUPITER, MOON, SUN};

    fn small_scene() -> Orrery {
        let settings = SceneSettings {
            star_count: 50,
            asteroid_count: 40,
            ..SceneSettings::default()
        };
        Orrery::new(&settings)
    }

    #[test]
    fn moon_follows_earth_in_the_same_frame() {
        let mut orrery = small_scene();
        for _ in 0..30 {
            orrery.advance(0.5, false);
            let earth = orrery.live_position(EARTH).unwrap();
            let moon = orrery.body(MOON).unwrap();
            let distance = (moon.position() - earth).length();
            assert!((distance - moon.config.orbital_radius).abs() < 1e-3);
        }
    }

    #[test]
    fn pause_freezes_bodies_and_belt_but_not_stars() {
        let mut orrery = small_scene();
        orrery.advance(1.0, false);
        let earth = orrery.live_position(EARTH).unwrap();
        let belt = orrery.belt.rotation;
        let stars = orrery.starfield.rotation;

        orrery.advance(1.0, true);

        assert_eq!(orrery.live_position(EARTH), Some(earth));
        assert_eq!(orrery.belt.rotation, belt);
        assert!(orrery.starfield.rotation > stars);
    }

    #[test]
    fn same_seed_gives_same_decorations() {
        let a = small_scene();
        let b = small_scene();
        assert_eq!(a.belt.asteroids, b.belt.asteroids);
        assert_eq!(a.starfield.stars, b.starfield.stars);
    }

    #[test]
    fn asteroids_stay_inside_the_belt() {
        let settings = SceneSettings::default();
        let mut orrery = Orrery::new(&settings);
        orrery.advance(3.0, false);
        for asteroid in &orrery.belt.asteroids {
            let p = orrery.belt.position(asteroid);
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert!(r >= settings.belt_inner - 1e-3 && r <= settings.belt_outer + 1e-3);
            assert!(p.y.abs() <= settings.belt_thickness * 0.5 + 1e-6);
        }
    }

    #[test]
    fn sun_stays_at_origin() {
        let mut orrery = small_scene();
        orrery.advance(10.0, false);
        assert_eq!(orrery.live_position(SUN), Some(Vec3::ZERO));
    }

    #[test]
    fn removing_a_planet_takes_its_moons() {
        let mut orrery = small_scene();
        let before = orrery.bodies().len();
        assert!(orrery.remove(JUPITER));
        assert_eq!(orrery.bodies().len(), before - 5);
        assert_eq!(orrery.live_position(JUPITER), None);
        assert!(orrery.body(EARTH).is_some());
        assert!(!orrery.remove(JUPITER));
    }

    #[test]
    fn describe_reads_registry_info() {
        let orrery = small_scene();
        let selection = Selection {
            body: EARTH,
            visual_radius: 1.5,
        };
        let info = orrery.describe(&selection).unwrap();
        assert!(!info.description.is_empty());
    }
}
