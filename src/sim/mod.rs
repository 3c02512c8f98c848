//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entity lists and ordered maps)
//! - No rendering, audio or platform dependencies

pub mod geometry;
pub mod level;
pub mod phase;
pub mod respawn;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod tick;
pub mod visibility;

pub use geometry::{MovingRect, Pickup, Rect, dist_to_point, dist_to_rect};
pub use level::{Campaign, EmptyCampaign, Level, generate_level, place_key};
pub use phase::{GamePhase, IllegalTransition, PhaseTrigger};
pub use respawn::{RespawnStage, RespawnTimer};
pub use snapshot::{FrameSnapshot, RespawnView, VisibleEntity};
pub use state::{GameEvent, GameState, PlayerState};
pub use store::StoreOffer;
pub use tick::{InputEvent, TickInput, handle_input, tick};
pub use visibility::{EntityId, EntityKind, Pulse, VisibilityMap};
