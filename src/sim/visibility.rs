//! Pulse wavefronts and the fog-of-war opacity map
//!
//! A pulse is a ring growing from a ping point. Whenever the ring passes over
//! an entity (|distance - radius| < band) that entity is re-armed to full
//! opacity. Opacity then fades linearly at a per-kind rate down to zero.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Pickup;
use super::level::Level;
use crate::consts::*;
use crate::retain_over;

/// Stable identity of anything the fog can hide
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// Index into `Level::walls` (borders are 0..4)
    Wall(u16),
    Mover(u16),
    Coin(u16),
    HealthPack(u16),
    EchoPack(u16),
    Key,
}

/// Fade class of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Wall,
    Mover,
    Coin,
    HealthPack,
    EchoPack,
    Key,
}

impl EntityKind {
    /// Opacity lost per second. Movers fade fastest, the key lingers.
    pub fn fade_rate(self) -> f32 {
        match self {
            EntityKind::Wall => WALL_FADE,
            EntityKind::Mover => MOVER_FADE,
            EntityKind::Coin | EntityKind::HealthPack | EntityKind::EchoPack => PICKUP_FADE,
            EntityKind::Key => KEY_FADE,
        }
    }
}

impl EntityId {
    pub fn kind(self) -> EntityKind {
        match self {
            EntityId::Wall(_) => EntityKind::Wall,
            EntityId::Mover(_) => EntityKind::Mover,
            EntityId::Coin(_) => EntityKind::Coin,
            EntityId::HealthPack(_) => EntityKind::HealthPack,
            EntityId::EchoPack(_) => EntityKind::EchoPack,
            EntityId::Key => EntityKind::Key,
        }
    }
}

/// An expanding ping wavefront
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub origin: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    /// Presentation alpha, decays multiplicatively
    pub alpha: f32,
}

impl Pulse {
    pub fn new(origin: Vec2) -> Self {
        Self {
            origin,
            radius: 0.0,
            max_radius: PULSE_MAX_RADIUS,
            alpha: 1.0,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.radius >= self.max_radius
    }

    pub fn advance(&mut self, dt: f32) {
        self.radius += PULSE_SPEED * dt;
        self.alpha *= retain_over(PULSE_ALPHA_RETAIN, dt);
    }

    /// Is the wavefront currently over something `dist` away from the origin
    #[inline]
    pub fn passes(&self, dist: f32) -> bool {
        (dist - self.radius).abs() < REVEAL_BAND
    }
}

/// Drop expired pulses, then grow the survivors
pub fn advance_pulses(pulses: &mut Vec<Pulse>, dt: f32) {
    pulses.retain(|p| !p.is_expired());
    for p in pulses.iter_mut() {
        p.advance(dt);
    }
}

/// Per-entity opacity in [0, 1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(EntityId, f32)>", into = "Vec<(EntityId, f32)>")]
pub struct VisibilityMap {
    opacity: BTreeMap<EntityId, f32>,
}

impl From<Vec<(EntityId, f32)>> for VisibilityMap {
    fn from(entries: Vec<(EntityId, f32)>) -> Self {
        Self {
            opacity: entries
                .into_iter()
                .map(|(id, v)| (id, v.clamp(0.0, 1.0)))
                .collect(),
        }
    }
}

impl From<VisibilityMap> for Vec<(EntityId, f32)> {
    fn from(map: VisibilityMap) -> Self {
        map.opacity.into_iter().collect()
    }
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full reveal, overwriting any partially faded value
    pub fn reveal(&mut self, id: EntityId) {
        self.opacity.insert(id, 1.0);
    }

    pub fn opacity(&self, id: EntityId) -> f32 {
        self.opacity.get(&id).copied().unwrap_or(0.0)
    }

    /// Fade every tracked entity by its kind's rate, floored at zero.
    /// Entries stay in the map at zero.
    pub fn decay(&mut self, dt: f32) {
        for (id, v) in self.opacity.iter_mut() {
            if *v > 0.0 {
                *v = (*v - id.kind().fade_rate() * dt).max(0.0);
            }
        }
    }

    /// Full fog reset
    pub fn clear(&mut self) {
        self.opacity.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.opacity.is_empty()
    }

    pub fn len(&self) -> usize {
        self.opacity.len()
    }

    /// Entities with non-zero opacity, in stable id order
    pub fn visible(&self) -> impl Iterator<Item = (EntityId, f32)> + '_ {
        self.opacity
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(id, v)| (*id, *v))
    }
}

/// Reveal everything in `level` that `pulse`'s wavefront is passing over.
/// Collected pickups are skipped.
pub fn reveal_level(pulse: &Pulse, level: &Level, map: &mut VisibilityMap) {
    let o = pulse.origin;
    for (i, w) in level.walls.iter().enumerate() {
        if pulse.passes(w.distance(o)) {
            map.reveal(EntityId::Wall(i as u16));
        }
    }
    for (i, m) in level.moving_walls.iter().enumerate() {
        if pulse.passes(m.distance(o)) {
            map.reveal(EntityId::Mover(i as u16));
        }
    }
    let pickups: [(&Vec<Pickup>, fn(u16) -> EntityId); 3] = [
        (&level.coins, EntityId::Coin),
        (&level.health_packs, EntityId::HealthPack),
        (&level.echo_packs, EntityId::EchoPack),
    ];
    for (list, make_id) in pickups {
        for (i, p) in list.iter().enumerate() {
            if !p.collected && pulse.passes(o.distance(p.pos)) {
                map.reveal(make_id(i as u16));
            }
        }
    }
    if pulse.passes(o.distance(level.key)) {
        map.reveal(EntityId::Key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::GeneratorConfig;
    use proptest::prelude::*;

    #[test]
    fn pulse_expires_at_max_radius() {
        let mut pulses = vec![Pulse::new(Vec2::new(300.0, 300.0))];
        let mut ticks = 0;
        while !pulses.is_empty() {
            advance_pulses(&mut pulses, SIM_DT);
            ticks += 1;
            assert!(ticks < 100, "pulse never expired");
        }
        // 12 units per tick to reach 500, plus the tick that prunes it
        assert_eq!(ticks, 43);
    }

    #[test]
    fn pulse_alpha_decays() {
        let mut p = Pulse::new(Vec2::ZERO);
        p.advance(SIM_DT);
        assert!((p.alpha - 0.95).abs() < 1e-4);
        assert!((p.radius - 12.0).abs() < 1e-3);
    }

    #[test]
    fn reveal_rearms_faded_entity() {
        let mut map = VisibilityMap::new();
        map.reveal(EntityId::Wall(3));
        for _ in 0..30 {
            map.decay(SIM_DT);
        }
        assert!(map.opacity(EntityId::Wall(3)) < 1.0);
        map.reveal(EntityId::Wall(3));
        assert_eq!(map.opacity(EntityId::Wall(3)), 1.0);
    }

    #[test]
    fn movers_fade_faster_than_walls() {
        let mut map = VisibilityMap::new();
        map.reveal(EntityId::Wall(0));
        map.reveal(EntityId::Mover(0));
        map.reveal(EntityId::Key);
        map.decay(SIM_DT);
        assert!(map.opacity(EntityId::Mover(0)) < map.opacity(EntityId::Wall(0)));
        assert!(map.opacity(EntityId::Wall(0)) < map.opacity(EntityId::Key));
    }

    #[test]
    fn faded_entries_stay_at_zero() {
        let mut map = VisibilityMap::new();
        map.reveal(EntityId::Mover(1));
        for _ in 0..200 {
            map.decay(SIM_DT);
        }
        assert_eq!(map.opacity(EntityId::Mover(1)), 0.0);
        assert_eq!(map.len(), 1);
        assert_eq!(map.visible().count(), 0);
    }

    #[test]
    fn wavefront_reveals_only_within_band() {
        let mut level = Level::bare(0, &GeneratorConfig::default());
        level.key = Vec2::new(300.0, 400.0);
        let mut pulse = Pulse::new(Vec2::new(300.0, 300.0));
        let mut map = VisibilityMap::new();

        pulse.radius = 40.0;
        reveal_level(&pulse, &level, &mut map);
        assert_eq!(map.opacity(EntityId::Key), 0.0);

        pulse.radius = 90.0;
        reveal_level(&pulse, &level, &mut map);
        assert_eq!(map.opacity(EntityId::Key), 1.0);
    }

    #[test]
    fn serializes_as_entry_list() {
        let mut map = VisibilityMap::new();
        map.reveal(EntityId::Coin(2));
        let json = serde_json::to_string(&map).unwrap();
        let back: VisibilityMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    proptest! {
        #[test]
        fn opacity_only_falls_without_reveal(steps in 1usize..400, kind in 0u8..6) {
            let id = match kind {
                0 => EntityId::Wall(0),
                1 => EntityId::Mover(0),
                2 => EntityId::Coin(0),
                3 => EntityId::HealthPack(0),
                4 => EntityId::EchoPack(0),
                _ => EntityId::Key,
            };
            let mut map = VisibilityMap::new();
            map.reveal(id);
            let mut prev = map.opacity(id);
            for _ in 0..steps {
                map.decay(SIM_DT);
                let now = map.opacity(id);
                prop_assert!((0.0..=1.0).contains(&now));
                if prev > 0.0 {
                    prop_assert!(now < prev);
                } else {
                    prop_assert_eq!(now, 0.0);
                }
                prev = now;
            }
        }
    }
}
