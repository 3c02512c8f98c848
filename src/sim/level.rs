//! Procedural stage generation
//!
//! A campaign is 100 stages generated once from a seed. Each stage gets its
//! own PCG stream so a single stage can be regenerated in isolation.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{MovingRect, Pickup, Rect};
use crate::consts::*;
use crate::tuning::GeneratorConfig;

/// Border walls always occupy the first slots of `Level::walls`
pub const BORDER_WALLS: usize = 4;

/// One generated stage. Static geometry never changes after generation;
/// pickups flip `collected` and movers drift while the stage is played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub walls: Vec<Rect>,
    pub moving_walls: Vec<MovingRect>,
    pub coins: Vec<Pickup>,
    pub health_packs: Vec<Pickup>,
    pub echo_packs: Vec<Pickup>,
    pub start: Vec2,
    pub end: Vec2,
    pub key: Vec2,
    /// The key could not be placed clear of walls and sits at the fallback point
    pub key_fallback: bool,
}

impl Level {
    /// Empty stage with only the border, used as a base by tests and tools
    pub fn bare(id: u32, cfg: &GeneratorConfig) -> Self {
        Self {
            id,
            walls: border_walls().to_vec(),
            moving_walls: Vec::new(),
            coins: Vec::new(),
            health_packs: Vec::new(),
            echo_packs: Vec::new(),
            start: cfg.start,
            end: cfg.end,
            key: cfg.key_fallback,
            key_fallback: false,
        }
    }

    pub fn interior_walls(&self) -> &[Rect] {
        &self.walls[BORDER_WALLS.min(self.walls.len())..]
    }

    /// Total entity count scanned per tick
    pub fn entity_count(&self) -> usize {
        self.walls.len()
            + self.moving_walls.len()
            + self.coins.len()
            + self.health_packs.len()
            + self.echo_packs.len()
            + 1
    }
}

/// The four fixed field borders: top, bottom, left, right
pub fn border_walls() -> [Rect; BORDER_WALLS] {
    let t = BORDER_THICKNESS;
    let s = FIELD_SIZE;
    [
        Rect::new(0.0, 0.0, s, t),
        Rect::new(0.0, s - t, s, t),
        Rect::new(0.0, 0.0, t, s),
        Rect::new(s - t, 0.0, t, s),
    ]
}

/// Difficulty in [0, 1)
#[inline]
pub fn difficulty(index: u32) -> f32 {
    index as f32 / LEVEL_COUNT as f32
}

/// Interior static walls for a stage: 5 at stage 0 up to 29 at stage 99
pub fn wall_count(index: u32) -> usize {
    5 + (index * 25 / LEVEL_COUNT) as usize
}

/// Moving obstacles for a stage, none before the ramp-in stage
pub fn mover_count(index: u32, cfg: &GeneratorConfig) -> usize {
    if index < cfg.mover_start_level {
        0
    } else {
        1 + (index * 15 / LEVEL_COUNT) as usize
    }
}

/// Per-stage seed derived from the campaign seed
pub fn level_seed(seed: u64, index: u32) -> u64 {
    (index as u64).wrapping_mul(2654435761).wrapping_add(seed)
}

/// Uniform sample in `[base, base + span)`
#[inline]
fn span<R: Rng + ?Sized>(rng: &mut R, base: f32, span: f32) -> f32 {
    base + rng.random::<f32>() * span
}

#[inline]
fn point<R: Rng + ?Sized>(rng: &mut R, base: f32, extent: f32) -> Vec2 {
    let x = span(rng, base, extent);
    let y = span(rng, base, extent);
    Vec2::new(x, y)
}

/// Rejection-sample a key position clear of every wall.
///
/// Returns `None` once `cfg.key_attempts` candidates have been rejected.
pub fn place_key<R: Rng + ?Sized>(walls: &[Rect], rng: &mut R, cfg: &GeneratorConfig) -> Option<Vec2> {
    (0..cfg.key_attempts)
        .map(|_| point(rng, 100.0, 400.0))
        .find(|&p| walls.iter().all(|w| w.distance(p) >= cfg.key_clearance))
}

/// Generate stage `index`. Never fails; walls may overlap each other and
/// pickups, and connectivity from start to key to exit is not verified.
pub fn generate_level<R: Rng + ?Sized>(index: u32, rng: &mut R, cfg: &GeneratorConfig) -> Level {
    let diff = difficulty(index);
    let mut level = Level::bare(index, cfg);

    let max_extra = 50.0 + diff * 60.0;
    for _ in 0..wall_count(index) {
        let pos = point(rng, 100.0, 380.0);
        let w = span(rng, 40.0, max_extra);
        let h = span(rng, 40.0, max_extra);
        level.walls.push(Rect::new(pos.x, pos.y, w, h));
    }

    let coin_count = 4 + (rng.random::<f32>() * 5.0) as usize;
    level.coins = (0..coin_count)
        .map(|_| Pickup::new(point(rng, 80.0, 440.0)))
        .collect();

    if rng.random::<f64>() < cfg.health_pack_chance {
        level.health_packs.push(Pickup::new(point(rng, 120.0, 360.0)));
    }
    if rng.random::<f64>() < cfg.echo_pack_chance {
        level.echo_packs.push(Pickup::new(point(rng, 120.0, 360.0)));
    }

    // Original balance is per 60 Hz frame
    let speed = (5.0 + diff * 12.0) * SIM_HZ;
    for _ in 0..mover_count(index, cfg) {
        let pos = point(rng, 150.0, 300.0);
        let vx = (rng.random::<f32>() - 0.5) * speed;
        let vy = (rng.random::<f32>() - 0.5) * speed;
        level.moving_walls.push(MovingRect {
            rect: Rect::new(pos.x, pos.y, MOVER_SIZE, MOVER_SIZE),
            vel: Vec2::new(vx, vy),
        });
    }

    match place_key(&level.walls, rng, cfg) {
        Some(key) => level.key = key,
        None => {
            log::info!(
                "Stage {}: no clear key spot after {} attempts, using fallback {:?}",
                index,
                cfg.key_attempts,
                cfg.key_fallback
            );
            level.key = cfg.key_fallback;
            level.key_fallback = true;
        }
    }

    level
}

/// A campaign must hold at least one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("campaign needs at least one stage")]
pub struct EmptyCampaign;

/// All stages of a run, generated up front and reused on stage transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CampaignData")]
pub struct Campaign {
    pub seed: u64,
    levels: Vec<Level>,
}

/// Unchecked wire form of `Campaign`
#[derive(Deserialize)]
struct CampaignData {
    seed: u64,
    levels: Vec<Level>,
}

impl TryFrom<CampaignData> for Campaign {
    type Error = EmptyCampaign;

    fn try_from(data: CampaignData) -> Result<Self, Self::Error> {
        Self::try_from_levels(data.seed, data.levels)
    }
}

impl Campaign {
    pub fn generate(seed: u64, cfg: &GeneratorConfig) -> Self {
        let levels: Vec<Level> = (0..LEVEL_COUNT)
            .map(|i| {
                let mut rng = Pcg32::seed_from_u64(level_seed(seed, i));
                generate_level(i, &mut rng, cfg)
            })
            .collect();
        let fallbacks = levels.iter().filter(|l| l.key_fallback).count();
        log::info!(
            "Campaign generated: seed={} stages={} key fallbacks={}",
            seed,
            levels.len(),
            fallbacks
        );
        Self { seed, levels }
    }

    pub fn try_from_levels(seed: u64, levels: Vec<Level>) -> Result<Self, EmptyCampaign> {
        if levels.is_empty() {
            return Err(EmptyCampaign);
        }
        Ok(Self { seed, levels })
    }

    /// Build from explicit stages. Panics when `levels` is empty.
    pub fn from_levels(seed: u64, levels: Vec<Level>) -> Self {
        match Self::try_from_levels(seed, levels) {
            Ok(campaign) => campaign,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn last_index(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    /// Stage by index, clamped to the last stage
    pub fn level(&self, index: u32) -> &Level {
        let i = (index as usize).min(self.levels.len() - 1);
        &self.levels[i]
    }

    pub fn level_mut(&mut self, index: u32) -> &mut Level {
        let i = (index as usize).min(self.levels.len() - 1);
        &mut self.levels[i]
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}
