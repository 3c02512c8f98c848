//! Data-driven game balance
//!
//! Everything the generator and run rules read that is worth overriding in
//! tests or from a JSON file. Missing fields fall back to the shipped values.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Level generator knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Candidate draws before the key falls back to `key_fallback`
    pub key_attempts: u32,
    pub key_fallback: Vec2,
    /// Minimum distance from the key to any static wall
    pub key_clearance: f32,
    /// First stage with moving obstacles
    pub mover_start_level: u32,
    pub health_pack_chance: f64,
    pub echo_pack_chance: f64,
    pub start: Vec2,
    pub end: Vec2,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            key_attempts: 50,
            key_fallback: Vec2::splat(FIELD_SIZE / 2.0),
            // key radius 15 plus a 10 unit margin
            key_clearance: 25.0,
            mover_start_level: 3,
            health_pack_chance: 0.3,
            echo_pack_chance: 0.3,
            start: Vec2::new(70.0, 70.0),
            end: Vec2::new(530.0, 530.0),
        }
    }
}

/// Run rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub initial_lives: u32,
    pub initial_echoes: u32,
    pub max_lives: u32,
    /// Offer a paid respawn on death instead of a plain game over
    pub respawn_offer: bool,
    pub respawn_cost: u32,
    pub respawn_seconds: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            initial_echoes: INITIAL_ECHOES,
            max_lives: MAX_LIVES,
            respawn_offer: true,
            respawn_cost: RESPAWN_COST,
            respawn_seconds: RESPAWN_SECONDS,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub generator: GeneratorConfig,
    pub run: RunConfig,
}

impl Tuning {
    /// Parse overrides; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
