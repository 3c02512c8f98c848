//! Fixed timestep simulation tick
//!
//! Per-tick order matters, later checks see earlier results:
//!  1. Advance/prune pulses, reveal what their wavefronts cross, fade the fog
//!  2. Player vs static walls
//!  3. Coins
//!  4. Health and echo packs
//!  5. Move obstacles, player vs moving obstacles
//!  6. Key pickup
//!  7. Exit portal (key required)
//!
//! A collision ends the tick, so one tick costs at most one life.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::dist_to_point;
use super::phase::PhaseTrigger;
use super::respawn::RespawnTimer;
use super::state::{GameEvent, GameState};
use super::visibility::{Pulse, advance_pulses, reveal_level};
use crate::clamp_to_field;
use crate::consts::*;

/// Pointer/touch input in logical field coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp,
}

/// Input consumed by a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events received since the previous tick, oldest first
    pub events: Vec<InputEvent>,
}

/// Apply one pointer event. Ignored unless a run is in progress.
pub fn handle_input(state: &mut GameState, event: InputEvent) {
    if let InputEvent::PointerUp = event {
        state.player.dragging = false;
        return;
    }
    if !state.phase.is_running() {
        return;
    }

    match event {
        InputEvent::PointerDown(p) => {
            let p = clamp_to_field(p);
            if dist_to_point(p, state.player.pos) < DRAG_HIT_RADIUS {
                state.player.dragging = true;
            } else if state.player.echoes > 0 {
                state.player.echoes -= 1;
                state.pulses.push(Pulse::new(p));
                log::debug!("Ping at {:?}, {} echoes left", p, state.player.echoes);
                state.emit(GameEvent::Ping { origin: p });
            }
        }
        InputEvent::PointerMove(p) => {
            if state.player.dragging {
                state.player.pos = clamp_to_field(p);
            }
        }
        InputEvent::PointerUp => {}
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    for event in &input.events {
        handle_input(state, *event);
    }

    // Don't tick outside a run
    if !state.phase.is_running() {
        return;
    }

    state.time_ticks += 1;

    update_fog(state, dt);

    if hits_static_wall(state) {
        resolve_collision(state);
        return;
    }

    collect_pickups(state);

    if move_obstacles(state, dt) {
        resolve_collision(state);
        return;
    }

    collect_key(state);

    let at_exit = dist_to_point(state.player.pos, state.level().end) < EXIT_RADIUS;
    if state.player.has_key && at_exit {
        complete_level(state);
    }
}

fn update_fog(state: &mut GameState, dt: f32) {
    advance_pulses(&mut state.pulses, dt);
    let level = state.campaign.level(state.level_index);
    for pulse in &state.pulses {
        reveal_level(pulse, level, &mut state.visibility);
    }
    state.visibility.decay(dt);
}

fn hits_static_wall(state: &GameState) -> bool {
    let pos = state.player.pos;
    state
        .level()
        .walls
        .iter()
        .any(|w| w.distance(pos) < WALL_HIT_RADIUS)
}

fn collect_pickups(state: &mut GameState) {
    let pos = state.player.pos;
    let max_lives = state.tuning.run.max_lives;
    let level = state.campaign.level_mut(state.level_index);
    let player = &mut state.player;
    let mut collected = Vec::new();

    for coin in level.coins.iter_mut() {
        if coin.try_collect(pos, COIN_RADIUS) {
            player.coins += 1;
            player.score += COIN_SCORE;
            collected.push(GameEvent::CoinCollected);
        }
    }
    for pack in level.health_packs.iter_mut() {
        if pack.try_collect(pos, PACK_RADIUS) {
            player.lives = (player.lives + 1).min(max_lives);
            player.score += HEALTH_SCORE;
            collected.push(GameEvent::HealthCollected);
        }
    }
    for pack in level.echo_packs.iter_mut() {
        if pack.try_collect(pos, PACK_RADIUS) {
            player.echoes += ECHO_PACK_AMOUNT;
            player.score += ECHO_PACK_SCORE;
            collected.push(GameEvent::EchoPackCollected);
        }
    }

    state.events.extend(collected);
}

/// Move every obstacle, then report whether any touches the player
fn move_obstacles(state: &mut GameState, dt: f32) -> bool {
    let pos = state.player.pos;
    let level = state.campaign.level_mut(state.level_index);
    let mut hit = false;
    for m in level.moving_walls.iter_mut() {
        m.advance(dt, MOVER_BOUNCE_MIN, MOVER_BOUNCE_MAX);
        hit |= m.distance(pos) < MOVER_HIT_RADIUS;
    }
    hit
}

fn collect_key(state: &mut GameState) {
    if state.player.has_key {
        return;
    }
    if dist_to_point(state.player.pos, state.level().key) < KEY_RADIUS {
        state.player.has_key = true;
        log::debug!("Key collected on stage {}", state.level_index + 1);
        state.emit(GameEvent::KeyCollected);
    }
}

/// Lose a life. With lives left: back to start with the fog reset. On the
/// last life: the run ends (respawn offer or game over).
pub fn resolve_collision(state: &mut GameState) {
    let lives_left = state.player.lives.saturating_sub(1);
    if lives_left > 0 {
        state.player.lives = lives_left;
        state.reset_to_start();
        state.emit(GameEvent::Collision { lives_left });
        return;
    }

    state.player.lives = 0;
    state.player.dragging = false;
    let respawn_offer = state.tuning.run.respawn_offer;
    if state.set_phase(PhaseTrigger::Died { respawn_offer }) {
        if respawn_offer {
            state.respawn = Some(RespawnTimer::new(state.tuning.run.respawn_seconds));
        }
        log::info!("Out of lives on stage {}", state.level_index + 1);
        state.emit(GameEvent::Died);
    }
}

/// Advance to the next stage, or finish the campaign on the last one
pub fn complete_level(state: &mut GameState) {
    if state.level_index >= state.campaign.last_index() {
        if state.set_phase(PhaseTrigger::CampaignComplete) {
            state.player.dragging = false;
            log::info!("Campaign complete, final score {}", state.player.score);
            state.emit(GameEvent::CampaignWon);
        }
        return;
    }

    let next = state.level_index + 1;
    state.level_index = next;
    state.max_level_reached = state.max_level_reached.max(next);
    state.reset_to_start();
    state.player.score += LEVEL_SCORE;
    log::info!("Stage {} cleared, score {}", next, state.player.score);
    state.emit(GameEvent::LevelCompleted { next });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{MovingRect, Pickup, Rect};
    use crate::sim::level::{Campaign, Level};
    use crate::sim::phase::GamePhase;
    use crate::sim::visibility::EntityId;
    use crate::tuning::{GeneratorConfig, Tuning};

    /// Stages with only border walls, key at the fallback point
    fn playing_state(stages: u32) -> GameState {
        let cfg = GeneratorConfig::default();
        let levels = (0..stages).map(|i| Level::bare(i, &cfg)).collect();
        let mut state = GameState::with_campaign(Campaign::from_levels(7, levels), Tuning::default());
        state.set_phase(PhaseTrigger::ProfileReady);
        assert!(state.start_run());
        state
    }

    fn step(state: &mut GameState) {
        tick(state, &TickInput::default(), SIM_DT);
    }

    fn drag_to(state: &mut GameState, to: Vec2) {
        let from = state.player.pos;
        let input = TickInput {
            events: vec![
                InputEvent::PointerDown(from),
                InputEvent::PointerMove(to),
                InputEvent::PointerUp,
            ],
        };
        tick(state, &input, SIM_DT);
    }

    #[test]
    fn exit_without_key_does_nothing() {
        let mut state = GameState::new(12345, Tuning::default());
        state.set_phase(PhaseTrigger::ProfileReady);
        state.start_run();
        // Clear the stage so walls cannot interfere with the exit check
        state.campaign.level_mut(0).walls.truncate(4);
        assert_eq!(state.player.pos, state.level().start);

        state.player.pos = state.level().end;
        step(&mut state);

        assert_eq!(state.level_index, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.player.has_key);
    }

    #[test]
    fn key_then_exit_advances_stage() {
        let mut state = playing_state(3);
        state.player.pos = state.level().key;
        step(&mut state);
        assert!(state.player.has_key);

        let score = state.player.score;
        state.pulses.push(Pulse::new(Vec2::new(300.0, 300.0)));
        step(&mut state);
        assert!(!state.visibility.is_empty());

        state.player.pos = state.level().end;
        step(&mut state);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.max_level_reached, 1);
        assert_eq!(state.player.score, score + LEVEL_SCORE);
        assert!(state.visibility.is_empty());
        assert!(!state.player.has_key);
        assert_eq!(state.player.pos, state.level().start);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::LevelCompleted { next: 1 })
        );
    }

    #[test]
    fn last_stage_wins_campaign() {
        let mut state = playing_state(2);
        state.level_index = 1;
        state.player.has_key = true;
        let score = state.player.score;
        state.player.pos = state.level().end;
        step(&mut state);
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.player.score, score);
        assert!(state.drain_events().contains(&GameEvent::CampaignWon));
    }

    #[test]
    fn ping_without_echoes_is_suppressed() {
        let mut state = playing_state(1);
        state.player.echoes = 0;
        let far = state.player.pos + Vec2::new(200.0, 200.0);
        let input = TickInput {
            events: vec![InputEvent::PointerDown(far)],
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.pulses.is_empty());
        assert_eq!(state.player.echoes, 0);
        assert!(!state.player.dragging);
    }

    #[test]
    fn ping_spends_one_echo() {
        let mut state = playing_state(1);
        let far = Vec2::new(400.0, 400.0);
        handle_input(&mut state, InputEvent::PointerDown(far));
        assert_eq!(state.pulses.len(), 1);
        assert_eq!(state.player.echoes, 29);
        assert_eq!(state.drain_events(), vec![GameEvent::Ping { origin: far }]);
    }

    #[test]
    fn pointer_near_player_starts_drag() {
        let mut state = playing_state(1);
        let near = state.player.pos + Vec2::new(30.0, 0.0);
        handle_input(&mut state, InputEvent::PointerDown(near));
        assert!(state.player.dragging);
        assert_eq!(state.player.echoes, 30);
        handle_input(&mut state, InputEvent::PointerMove(Vec2::new(900.0, 200.0)));
        assert_eq!(state.player.pos, Vec2::new(FIELD_SIZE, 200.0));
        handle_input(&mut state, InputEvent::PointerUp);
        handle_input(&mut state, InputEvent::PointerMove(Vec2::new(100.0, 100.0)));
        assert_eq!(state.player.pos, Vec2::new(FIELD_SIZE, 200.0));
    }

    #[test]
    fn collision_with_lives_left_resets_to_start() {
        let mut state = playing_state(1);
        state.player.lives = 3;
        state.visibility.reveal(EntityId::Wall(0));
        // Inside the left border
        state.player.pos = Vec2::new(10.0, 300.0);
        step(&mut state);
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.pos, state.level().start);
        assert!(state.visibility.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Collision { lives_left: 2 }]
        );
    }

    #[test]
    fn last_life_opens_respawn() {
        let mut state = playing_state(1);
        state.player.lives = 1;
        state.player.pos = Vec2::new(300.0, 5.0);
        step(&mut state);
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::Respawn);
        let timer = state.respawn.as_ref().unwrap();
        assert_eq!(timer.seconds_left(), RESPAWN_SECONDS);

        // Further ticks are no-ops and never underflow lives
        step(&mut state);
        resolve_collision(&mut state);
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::Respawn);
    }

    #[test]
    fn last_life_without_offer_is_game_over() {
        let mut state = playing_state(1);
        state.tuning.run.respawn_offer = false;
        state.player.lives = 1;
        state.player.pos = Vec2::new(595.0, 300.0);
        step(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.respawn.is_none());
        assert!(state.retry());
        assert_eq!(state.phase, GamePhase::Playing);
        // Lives are not refilled: the next hit ends the run again
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.player.pos, state.level().start);
        state.player.pos = Vec2::new(595.0, 300.0);
        step(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.lives, 0);
    }

    #[test]
    fn pickups_award_once() {
        let mut state = playing_state(1);
        let spot = Vec2::new(200.0, 200.0);
        {
            let level = state.campaign.level_mut(0);
            level.coins.push(Pickup::new(spot));
            level.health_packs.push(Pickup::new(spot));
            level.echo_packs.push(Pickup::new(spot));
        }
        state.player.lives = 10;
        state.player.pos = spot;
        step(&mut state);
        assert_eq!(state.player.coins, 1);
        assert_eq!(state.player.lives, 10);
        assert_eq!(state.player.echoes, 30 + ECHO_PACK_AMOUNT);
        assert_eq!(
            state.player.score,
            COIN_SCORE + HEALTH_SCORE + ECHO_PACK_SCORE
        );

        let snapshot = state.player.clone();
        for _ in 0..5 {
            step(&mut state);
        }
        assert_eq!(state.player, snapshot);
    }

    #[test]
    fn health_pack_adds_a_life_below_cap() {
        let mut state = playing_state(1);
        let spot = Vec2::new(200.0, 200.0);
        state
            .campaign
            .level_mut(0)
            .health_packs
            .push(Pickup::new(spot));
        state.player.lives = 4;
        state.player.pos = spot;
        step(&mut state);
        assert_eq!(state.player.lives, 5);
        assert_eq!(state.player.score, HEALTH_SCORE);
        assert!(state.drain_events().contains(&GameEvent::HealthCollected));

        for _ in 0..5 {
            step(&mut state);
        }
        assert_eq!(state.player.lives, 5);
        assert_eq!(state.player.score, HEALTH_SCORE);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn moving_obstacle_hits_player() {
        let mut state = playing_state(1);
        state.player.lives = 5;
        state.player.pos = Vec2::new(300.0, 300.0);
        state.campaign.level_mut(0).moving_walls.push(MovingRect {
            rect: Rect::new(305.0, 290.0, MOVER_SIZE, MOVER_SIZE),
            vel: Vec2::new(-60.0, 0.0),
        });
        step(&mut state);
        assert_eq!(state.player.lives, 4);
        assert_eq!(state.player.pos, state.level().start);
    }

    #[test]
    fn dragging_through_level_collects_key() {
        let mut state = playing_state(2);
        let key = state.level().key;
        drag_to(&mut state, key);
        assert!(state.player.has_key);
        assert!(!state.player.dragging);
    }

    #[test]
    fn pulse_reveals_then_fog_fades() {
        let mut state = playing_state(1);
        // Left border is 280 units from this ping
        handle_input(&mut state, InputEvent::PointerDown(Vec2::new(300.0, 300.0)));
        let mut seen = false;
        for _ in 0..30 {
            step(&mut state);
            seen |= state.visibility.opacity(EntityId::Wall(2)) > 0.0;
        }
        assert!(seen);
        let lit = state.visibility.opacity(EntityId::Wall(2));
        for _ in 0..30 {
            step(&mut state);
        }
        assert!(state.visibility.opacity(EntityId::Wall(2)) < lit);
    }

    #[test]
    fn determinism() {
        let mut a = GameState::new(99999, Tuning::default());
        let mut b = GameState::new(99999, Tuning::default());
        for s in [&mut a, &mut b] {
            s.set_phase(PhaseTrigger::ProfileReady);
            s.max_level_reached = 40;
            s.start_run();
        }
        let inputs = [
            TickInput {
                events: vec![InputEvent::PointerDown(Vec2::new(400.0, 300.0))],
            },
            TickInput::default(),
            TickInput {
                events: vec![InputEvent::PointerDown(Vec2::new(200.0, 500.0))],
            },
        ];
        for _ in 0..120 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.visibility, b.visibility);
        assert_eq!(a.level().moving_walls, b.level().moving_walls);
        assert_eq!(a.player, b.player);
    }
}
