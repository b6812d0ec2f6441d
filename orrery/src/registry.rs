//! Compiled-in catalogue of the bodies in the scene
//!
//! Distances and sizes are in scene units and deliberately not to scale:
//! radii are exaggerated so every planet stays visible next to the sun.
//! Angular speeds are unitless factors, scaled by
//! [`ORBIT_SPEED_SCALE`](crate::orbit::ORBIT_SPEED_SCALE) when advanced.

use std::fmt;

/// Unique identifier of a body in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub &'static str);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const SUN: BodyId = BodyId("sun");
pub const MERCURY: BodyId = BodyId("mercury");
pub const VENUS: BodyId = BodyId("venus");
pub const EARTH: BodyId = BodyId("earth");
pub const MOON: BodyId = BodyId("moon");
pub const MARS: BodyId = BodyId("mars");
pub const JUPITER: BodyId = BodyId("jupiter");
pub const SATURN: BodyId = BodyId("saturn");
pub const URANUS: BodyId = BodyId("uranus");
pub const NEPTUNE: BodyId = BodyId("neptune");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
}

/// Flat ring system lying in the body's equatorial plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rings {
    pub inner: f32,
    pub outer: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decorations {
    pub rings: Option<Rings>,
    pub atmosphere: bool,
    pub clouds: bool,
}

impl Decorations {
    pub const NONE: Decorations = Decorations {
        rings: None,
        atmosphere: false,
        clouds: false,
    };
}

/// Descriptive strings shown on the info card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyInfo {
    pub diameter: &'static str,
    pub day_length: &'static str,
    pub temperature: &'static str,
    pub description: &'static str,
}

/// Static configuration of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialBodyConfig {
    pub id: BodyId,
    pub name: &'static str,
    pub kind: BodyKind,
    /// Body whose live position this one orbits. `None` orbits the origin.
    pub parent: Option<BodyId>,
    pub visual_radius: f32,
    pub orbital_radius: f32,
    pub angular_speed: f32,
    pub axial_tilt: f32,
    pub start_phase: f32,
    pub color: [f32; 4],
    pub decorations: Decorations,
    pub info: BodyInfo,
}

impl CelestialBodyConfig {
    const fn new(
        id: BodyId,
        name: &'static str,
        kind: BodyKind,
        visual_radius: f32,
        color: [f32; 4],
        info: BodyInfo,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            parent: None,
            visual_radius,
            orbital_radius: 0.0,
            angular_speed: 0.0,
            axial_tilt: 0.0,
            start_phase: 0.0,
            color,
            decorations: Decorations::NONE,
            info,
        }
    }

    const fn at_orbit(mut self, orbital_radius: f32, angular_speed: f32, start_phase: f32) -> Self {
        self.orbital_radius = orbital_radius;
        self.angular_speed = angular_speed;
        self.start_phase = start_phase;
        self
    }

    const fn around(mut self, parent: BodyId) -> Self {
        self.parent = Some(parent);
        self
    }

    const fn tilted(mut self, axial_tilt: f32) -> Self {
        self.axial_tilt = axial_tilt;
        self
    }

    const fn with_rings(mut self, inner: f32, outer: f32, color: [f32; 4]) -> Self {
        self.decorations.rings = Some(Rings { inner, outer, color });
        self
    }

    const fn with_atmosphere(mut self) -> Self {
        self.decorations.atmosphere = true;
        self
    }

    const fn with_clouds(mut self) -> Self {
        self.decorations.clouds = true;
        self
    }

    /// Bodies with no orbital radius never leave their parent's position.
    pub fn is_stationary(&self) -> bool {
        self.orbital_radius == 0.0
    }
}

const fn info(
    diameter: &'static str,
    day_length: &'static str,
    temperature: &'static str,
    description: &'static str,
) -> BodyInfo {
    BodyInfo {
        diameter,
        day_length,
        temperature,
        description,
    }
}

/// Every body in the scene. Parents always precede the moons that orbit them.
pub static BODIES: &[CelestialBodyConfig] = &[
    CelestialBodyConfig::new(
        SUN,
        "Sun",
        BodyKind::Star,
        6.0,
        [1.0, 0.82, 0.35, 1.0],
        info(
            "1,392,700 km",
            "25.4 Earth days",
            "5,500 °C surface",
            "The star at the centre of the system and the only light source in the scene.",
        ),
    )
    .tilted(0.126),
    CelestialBodyConfig::new(
        MERCURY,
        "Mercury",
        BodyKind::Planet,
        0.8,
        [0.62, 0.6, 0.58, 1.0],
        info(
            "4,879 km",
            "58.6 Earth days",
            "-173 °C to 427 °C",
            "The smallest planet, scorched by day and frozen by night.",
        ),
    )
    .at_orbit(16.0, 1.6, 0.3),
    CelestialBodyConfig::new(
        VENUS,
        "Venus",
        BodyKind::Planet,
        1.4,
        [0.93, 0.76, 0.48, 1.0],
        info(
            "12,104 km",
            "243 Earth days",
            "465 °C",
            "Wrapped in thick sulphuric cloud; spins backwards.",
        ),
    )
    .at_orbit(26.0, 1.17, 1.9)
    .tilted(3.096)
    .with_atmosphere(),
    CelestialBodyConfig::new(
        EARTH,
        "Earth",
        BodyKind::Planet,
        1.5,
        [0.22, 0.45, 0.85, 1.0],
        info(
            "12,742 km",
            "24 hours",
            "15 °C average",
            "Home. The only world known to carry liquid surface water.",
        ),
    )
    .at_orbit(38.0, 0.8, 4.1)
    .tilted(0.409)
    .with_atmosphere()
    .with_clouds(),
    CelestialBodyConfig::new(
        MOON,
        "Moon",
        BodyKind::Moon,
        0.4,
        [0.75, 0.75, 0.72, 1.0],
        info(
            "3,474 km",
            "27.3 Earth days",
            "-173 °C to 127 °C",
            "Tidally locked companion of Earth.",
        ),
    )
    .around(EARTH)
    .at_orbit(3.2, 4.0, 0.0)
    .tilted(0.117),
    CelestialBodyConfig::new(
        MARS,
        "Mars",
        BodyKind::Planet,
        1.0,
        [0.82, 0.38, 0.2, 1.0],
        info(
            "6,779 km",
            "24.6 hours",
            "-65 °C average",
            "A cold desert world with the largest volcano in the system.",
        ),
    )
    .at_orbit(50.0, 0.64, 2.6)
    .tilted(0.439)
    .with_atmosphere(),
    CelestialBodyConfig::new(
        BodyId("phobos"),
        "Phobos",
        BodyKind::Moon,
        0.15,
        [0.55, 0.5, 0.45, 1.0],
        info(
            "22.5 km",
            "7.7 hours",
            "-40 °C",
            "Lumpy inner moon of Mars, slowly spiralling inwards.",
        ),
    )
    .around(MARS)
    .at_orbit(1.8, 9.0, 1.0),
    CelestialBodyConfig::new(
        BodyId("deimos"),
        "Deimos",
        BodyKind::Moon,
        0.12,
        [0.6, 0.55, 0.5, 1.0],
        info(
            "12.4 km",
            "30.3 hours",
            "-40 °C",
            "The smaller, outer moon of Mars.",
        ),
    )
    .around(MARS)
    .at_orbit(2.6, 6.0, 3.5),
    CelestialBodyConfig::new(
        JUPITER,
        "Jupiter",
        BodyKind::Planet,
        4.5,
        [0.85, 0.7, 0.52, 1.0],
        info(
            "139,820 km",
            "9.9 hours",
            "-110 °C cloud tops",
            "The largest planet, banded by storms older than telescopes.",
        ),
    )
    .at_orbit(92.0, 0.35, 5.5)
    .tilted(0.055)
    .with_clouds(),
    CelestialBodyConfig::new(
        BodyId("io"),
        "Io",
        BodyKind::Moon,
        0.35,
        [0.92, 0.85, 0.4, 1.0],
        info(
            "3,643 km",
            "1.8 Earth days",
            "-130 °C",
            "The most volcanically active body known.",
        ),
    )
    .around(JUPITER)
    .at_orbit(6.5, 5.0, 0.4),
    CelestialBodyConfig::new(
        BodyId("europa"),
        "Europa",
        BodyKind::Moon,
        0.3,
        [0.85, 0.82, 0.75, 1.0],
        info(
            "3,122 km",
            "3.5 Earth days",
            "-160 °C",
            "An ice shell over a global ocean.",
        ),
    )
    .around(JUPITER)
    .at_orbit(8.0, 4.0, 2.2),
    CelestialBodyConfig::new(
        BodyId("ganymede"),
        "Ganymede",
        BodyKind::Moon,
        0.5,
        [0.65, 0.62, 0.58, 1.0],
        info(
            "5,268 km",
            "7.2 Earth days",
            "-163 °C",
            "The largest moon in the system, bigger than Mercury.",
        ),
    )
    .around(JUPITER)
    .at_orbit(10.0, 3.0, 4.0),
    CelestialBodyConfig::new(
        BodyId("callisto"),
        "Callisto",
        BodyKind::Moon,
        0.45,
        [0.45, 0.42, 0.38, 1.0],
        info(
            "4,821 km",
            "16.7 Earth days",
            "-139 °C",
            "Heavily cratered and geologically quiet.",
        ),
    )
    .around(JUPITER)
    .at_orbit(12.5, 2.2, 5.6),
    CelestialBodyConfig::new(
        SATURN,
        "Saturn",
        BodyKind::Planet,
        3.8,
        [0.9, 0.8, 0.55, 1.0],
        info(
            "116,460 km",
            "10.7 hours",
            "-140 °C cloud tops",
            "Less dense than water, circled by the brightest rings.",
        ),
    )
    .at_orbit(122.0, 0.26, 0.9)
    .tilted(0.467)
    .with_rings(4.8, 8.5, [0.85, 0.78, 0.6, 0.55])
    .with_clouds(),
    CelestialBodyConfig::new(
        BodyId("titan"),
        "Titan",
        BodyKind::Moon,
        0.5,
        [0.85, 0.65, 0.35, 1.0],
        info(
            "5,150 km",
            "15.9 Earth days",
            "-179 °C",
            "Hazy moon with methane lakes and rivers.",
        ),
    )
    .around(SATURN)
    .at_orbit(11.0, 2.5, 2.0)
    .with_atmosphere(),
    CelestialBodyConfig::new(
        URANUS,
        "Uranus",
        BodyKind::Planet,
        2.4,
        [0.6, 0.85, 0.9, 1.0],
        info(
            "50,724 km",
            "17.2 hours",
            "-195 °C",
            "An ice giant rolling around the sun on its side.",
        ),
    )
    .at_orbit(150.0, 0.18, 3.3)
    .tilted(1.706)
    .with_rings(3.4, 4.2, [0.7, 0.8, 0.85, 0.3])
    .with_atmosphere(),
    CelestialBodyConfig::new(
        NEPTUNE,
        "Neptune",
        BodyKind::Planet,
        2.3,
        [0.25, 0.4, 0.9, 1.0],
        info(
            "49,244 km",
            "16.1 hours",
            "-200 °C",
            "The windiest planet, with supersonic storms.",
        ),
    )
    .at_orbit(175.0, 0.14, 1.2)
    .tilted(0.494)
    .with_atmosphere(),
];

/// Look up a body's configuration by id.
pub fn find(id: BodyId) -> Option<&'static CelestialBodyConfig> {
    BODIES.iter().find(|body| body.id == id)
}

/// The sun followed by the planets, in registry order. Used for the number-key
/// shortcuts.
pub fn primaries() -> impl Iterator<Item = &'static CelestialBodyConfig> {
    BODIES.iter().filter(|body| body.kind != BodyKind::Moon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = BODIES.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BODIES.len());
    }

    #[test]
    fn every_radius_is_positive() {
        for body in BODIES {
            assert!(body.visual_radius > 0.0, "{} has no size", body.id);
            assert!(body.orbital_radius >= 0.0, "{} has a negative orbit", body.id);
        }
    }

    #[test]
    fn parents_precede_children() {
        for (index, body) in BODIES.iter().enumerate() {
            if let Some(parent) = body.parent {
                let parent_index = BODIES.iter().position(|b| b.id == parent);
                assert!(
                    matches!(parent_index, Some(p) if p < index),
                    "{} listed before its parent {}",
                    body.id,
                    parent
                );
            }
        }
    }

    #[test]
    fn sun_is_stationary_and_earth_matches_catalogue() {
        assert!(find(SUN).unwrap().is_stationary());

        let earth = find(EARTH).unwrap();
        assert_eq!(earth.orbital_radius, 38.0);
        assert_eq!(earth.angular_speed, 0.8);
        assert!(earth.decorations.clouds);
    }

    #[test]
    fn primaries_start_with_sun_and_skip_moons() {
        let primaries: Vec<_> = primaries().map(|b| b.id).collect();
        assert_eq!(primaries.first(), Some(&SUN));
        assert_eq!(primaries.len(), 9);
        assert!(!primaries.contains(&MOON));
    }
}
