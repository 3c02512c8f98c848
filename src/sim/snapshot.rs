//! Per-frame view handed to the presentation layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Pickup;
use super::level::Level;
use super::phase::GamePhase;
use super::state::GameState;
use super::visibility::{EntityId, EntityKind, Pulse};

/// Something the fog currently lets through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Top-left corner for rectangles, center for point entities
    pub pos: Vec2,
    /// Present for rectangles
    pub size: Option<Vec2>,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnView {
    pub seconds_left: u32,
    pub offered: bool,
    pub cost: u32,
    pub can_afford: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub level_index: u32,
    pub level_count: u32,
    pub max_level_reached: u32,
    pub player_pos: Vec2,
    pub dragging: bool,
    pub has_key: bool,
    pub lives: u32,
    pub echoes: u32,
    pub coins: u32,
    pub score: u64,
    pub start: Vec2,
    pub exit: Vec2,
    /// The exit accepts the player (key held)
    pub exit_open: bool,
    pub entities: Vec<VisibleEntity>,
    pub pulses: Vec<Pulse>,
    pub respawn: Option<RespawnView>,
}

/// Resolve an id to its current shape; `None` once collected or gone
fn locate(level: &Level, id: EntityId, has_key: bool) -> Option<(Vec2, Option<Vec2>)> {
    let point = |list: &[Pickup], i: u16| {
        list.get(i as usize)
            .filter(|p| !p.collected)
            .map(|p| (p.pos, None::<Vec2>))
    };
    match id {
        EntityId::Wall(i) => level
            .walls
            .get(i as usize)
            .map(|w| (w.pos, Some(w.size))),
        EntityId::Mover(i) => level
            .moving_walls
            .get(i as usize)
            .map(|m| (m.rect.pos, Some(m.rect.size))),
        EntityId::Coin(i) => point(&level.coins[..], i),
        EntityId::HealthPack(i) => point(&level.health_packs[..], i),
        EntityId::EchoPack(i) => point(&level.echo_packs[..], i),
        EntityId::Key => (!has_key).then_some((level.key, None)),
    }
}

impl GameState {
    pub fn snapshot(&self) -> FrameSnapshot {
        let level = self.level();
        let entities = self
            .visibility
            .visible()
            .filter_map(|(id, opacity)| {
                locate(level, id, self.player.has_key).map(|(pos, size)| VisibleEntity {
                    id,
                    kind: id.kind(),
                    pos,
                    size,
                    opacity,
                })
            })
            .collect();

        let respawn = self.respawn.as_ref().map(|r| RespawnView {
            seconds_left: r.seconds_left(),
            offered: r.is_offered(),
            cost: self.tuning.run.respawn_cost,
            can_afford: self.player.coins >= self.tuning.run.respawn_cost,
        });

        FrameSnapshot {
            phase: self.phase,
            level_index: self.level_index,
            level_count: self.campaign.len() as u32,
            max_level_reached: self.max_level_reached,
            player_pos: self.player.pos,
            dragging: self.player.dragging,
            has_key: self.player.has_key,
            lives: self.player.lives,
            echoes: self.player.echoes,
            coins: self.player.coins,
            score: self.player.score,
            start: level.start,
            exit: level.end,
            exit_open: self.player.has_key,
            entities,
            pulses: self.pulses.clone(),
            respawn,
        }
    }
}
