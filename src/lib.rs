//! Echo Path - echo-location stealth maze
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, fog-of-war, collisions, run state)
//! - `session`: Owns one run, its input queue, fixed-timestep clock and persistence
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Profile, stats and leaderboard documents
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use leaderboard::Leaderboard;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Rates are per second at the fixed simulation rate. Balance values were
/// tuned per 60 Hz frame, hence the `* SIM_HZ` factors.
pub mod consts {
    /// Fixed simulation rate
    pub const SIM_HZ: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Logical play field (square, independent of device pixel ratio)
    pub const FIELD_SIZE: f32 = 600.0;
    pub const BORDER_THICKNESS: f32 = 20.0;
    /// Number of stages in a campaign
    pub const LEVEL_COUNT: u32 = 100;

    /// Player marker
    pub const PLAYER_RADIUS: f32 = 12.0;
    /// Pointer-down closer than this to the player starts a drag instead of a ping
    pub const DRAG_HIT_RADIUS: f32 = 40.0;
    /// Static walls are slightly forgiving
    pub const WALL_HIT_RADIUS: f32 = PLAYER_RADIUS - 2.0;
    pub const MOVER_HIT_RADIUS: f32 = PLAYER_RADIUS;

    /// Resources
    pub const INITIAL_LIVES: u32 = 10;
    pub const MAX_LIVES: u32 = 10;
    pub const INITIAL_ECHOES: u32 = 30;
    pub const RESPAWN_COST: u32 = 20;
    pub const RESPAWN_SECONDS: u32 = 30;

    /// Pulse wavefront
    pub const PULSE_SPEED: f32 = 12.0 * SIM_HZ;
    pub const PULSE_MAX_RADIUS: f32 = 500.0;
    /// Alpha kept per 60 Hz frame
    pub const PULSE_ALPHA_RETAIN: f32 = 0.95;
    pub const REVEAL_BAND: f32 = 25.0;

    /// Opacity lost per second once revealed
    pub const WALL_FADE: f32 = 0.008 * SIM_HZ;
    pub const PICKUP_FADE: f32 = 0.006 * SIM_HZ;
    pub const MOVER_FADE: f32 = 0.015 * SIM_HZ;
    pub const KEY_FADE: f32 = 0.005 * SIM_HZ;

    /// Pickup radii
    pub const COIN_RADIUS: f32 = 20.0;
    pub const PACK_RADIUS: f32 = 22.0;
    pub const KEY_RADIUS: f32 = 25.0;
    pub const EXIT_RADIUS: f32 = 35.0;

    /// Rewards
    pub const COIN_SCORE: u64 = 50;
    pub const HEALTH_SCORE: u64 = 100;
    pub const ECHO_PACK_SCORE: u64 = 75;
    pub const ECHO_PACK_AMOUNT: u32 = 15;
    pub const LEVEL_SCORE: u64 = 250;

    /// Moving obstacles bounce off this inner band
    pub const MOVER_SIZE: f32 = 25.0;
    pub const MOVER_BOUNCE_MIN: f32 = 20.0;
    pub const MOVER_BOUNCE_MAX: f32 = 550.0;
}

/// Clamp a point into the logical play field
#[inline]
pub fn clamp_to_field(p: Vec2) -> Vec2 {
    p.clamp(Vec2::ZERO, Vec2::splat(consts::FIELD_SIZE))
}

/// Per-frame multiplicative factor converted to an arbitrary timestep
#[inline]
pub fn retain_over(per_frame: f32, dt: f32) -> f32 {
    per_frame.powf(dt * consts::SIM_HZ)
}
