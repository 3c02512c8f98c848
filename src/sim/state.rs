//! Run state and core simulation types
//!
//! Everything one run mutates lives in `GameState`. Pointer events and the
//! fixed-step tick are the only writers while the phase is `Playing`; menu
//! commands below are the only writers otherwise.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{Campaign, Level};
use super::phase::{GamePhase, PhaseTrigger};
use super::respawn::RespawnTimer;
use super::store::StoreOffer;
use super::visibility::{Pulse, VisibilityMap};
use crate::tuning::Tuning;

/// Player resources and marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Continuous position, moved directly by dragging
    pub pos: Vec2,
    pub dragging: bool,
    pub has_key: bool,
    pub lives: u32,
    pub echoes: u32,
    pub coins: u32,
    pub score: u64,
}

impl PlayerState {
    pub fn new(start: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos: start,
            dragging: false,
            has_key: false,
            lives: tuning.run.initial_lives,
            echoes: tuning.run.initial_echoes,
            coins: 0,
            score: 0,
        }
    }
}

/// Notable things that happened during a tick or command, for audio and
/// persistence collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Ping { origin: Vec2 },
    CoinCollected,
    HealthCollected,
    EchoPackCollected,
    KeyCollected,
    /// Hit an obstacle with lives to spare
    Collision { lives_left: u32 },
    /// Hit an obstacle on the last life
    Died,
    LevelCompleted { next: u32 },
    CampaignWon,
    RespawnOffered,
    Respawned,
    RunRestarted,
    Purchased { offer: StoreOffer },
}

impl GameEvent {
    /// Events after which progress is pushed to the store
    pub fn is_checkpoint(&self) -> bool {
        matches!(
            self,
            GameEvent::LevelCompleted { .. } | GameEvent::Died | GameEvent::CampaignWon
        )
    }
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    /// All stages, generated once
    pub campaign: Campaign,
    /// Current stage (0-based)
    pub level_index: u32,
    pub max_level_reached: u32,
    pub player: PlayerState,
    pub pulses: Vec<Pulse>,
    pub visibility: VisibilityMap,
    pub phase: GamePhase,
    /// Present while the phase is `Respawn`
    pub respawn: Option<RespawnTimer>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending events, drained by the session
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a run with a freshly generated campaign
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let campaign = Campaign::generate(seed, &tuning.generator);
        Self::with_campaign(campaign, tuning)
    }

    pub fn with_campaign(campaign: Campaign, tuning: Tuning) -> Self {
        let start = campaign.level(0).start;
        Self {
            player: PlayerState::new(start, &tuning),
            tuning,
            campaign,
            level_index: 0,
            max_level_reached: 0,
            pulses: Vec::new(),
            visibility: VisibilityMap::new(),
            phase: GamePhase::Loading,
            respawn: None,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.campaign.seed
    }

    pub fn level(&self) -> &Level {
        self.campaign.level(self.level_index)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a phase trigger. Illegal transitions are logged and ignored.
    pub fn set_phase(&mut self, trigger: PhaseTrigger) -> bool {
        match self.phase.transition(trigger) {
            Ok(next) => {
                log::debug!("Phase {:?} -> {:?}", self.phase, next);
                self.phase = next;
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    /// Player back to the stage start with the key dropped and the fog reset
    pub fn reset_to_start(&mut self) {
        self.player.pos = self.level().start;
        self.player.dragging = false;
        self.player.has_key = false;
        self.visibility.clear();
    }

    /// Menu -> Playing at the furthest stage reached with fresh resources
    pub fn start_run(&mut self) -> bool {
        if !self.set_phase(PhaseTrigger::StartRun) {
            return false;
        }
        self.level_index = self.max_level_reached.min(self.campaign.last_index());
        self.player.lives = self.tuning.run.initial_lives;
        self.player.echoes = self.tuning.run.initial_echoes;
        self.reset_to_start();
        log::info!("Run started at stage {}", self.level_index + 1);
        true
    }

    /// GameOver -> Playing on the same stage
    pub fn retry(&mut self) -> bool {
        if self.phase != GamePhase::GameOver || !self.set_phase(PhaseTrigger::Resume) {
            return false;
        }
        self.reset_to_start();
        true
    }

    /// Spend coins for one life and resume the same stage. Only once the
    /// countdown has finished; silently refused otherwise.
    pub fn buy_respawn(&mut self) -> bool {
        let offered = self.respawn.as_ref().is_some_and(|r| r.is_offered());
        let cost = self.tuning.run.respawn_cost;
        if self.phase != GamePhase::Respawn || !offered || self.player.coins < cost {
            return false;
        }
        if !self.set_phase(PhaseTrigger::Resume) {
            return false;
        }
        self.player.coins -= cost;
        self.player.lives = 1;
        self.respawn = None;
        self.reset_to_start();
        self.emit(GameEvent::Respawned);
        true
    }

    /// Discard progress and replay from stage 0 with initial resources
    pub fn restart_from_zero(&mut self) -> bool {
        let offered = self.respawn.as_ref().is_some_and(|r| r.is_offered());
        if self.phase != GamePhase::Respawn || !offered {
            return false;
        }
        if !self.set_phase(PhaseTrigger::Resume) {
            return false;
        }
        self.level_index = 0;
        self.player.lives = self.tuning.run.initial_lives;
        self.player.echoes = self.tuning.run.initial_echoes;
        self.respawn = None;
        self.reset_to_start();
        self.emit(GameEvent::RunRestarted);
        true
    }

    /// Count the respawn timer down by wall time
    pub fn advance_respawn(&mut self, elapsed: f32) {
        if self.phase != GamePhase::Respawn {
            return;
        }
        let opened = self.respawn.as_mut().is_some_and(|r| r.advance(elapsed));
        if opened {
            self.emit(GameEvent::RespawnOffered);
        }
    }

    pub fn exit_to_menu(&mut self) -> bool {
        let left = self.set_phase(PhaseTrigger::Back);
        if left {
            self.player.dragging = false;
        }
        left
    }

    pub fn open_store(&mut self) -> bool {
        self.set_phase(PhaseTrigger::OpenStore)
    }

    pub fn open_ranking(&mut self) -> bool {
        self.set_phase(PhaseTrigger::OpenRanking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;
    use crate::tuning::GeneratorConfig;

    fn bare_state(stages: u32) -> GameState {
        let cfg = GeneratorConfig::default();
        let levels = (0..stages).map(|i| Level::bare(i, &cfg)).collect();
        let mut state = GameState::with_campaign(Campaign::from_levels(1, levels), Tuning::default());
        state.set_phase(PhaseTrigger::ProfileReady);
        state
    }

    #[test]
    fn start_run_resumes_furthest_stage() {
        let mut state = bare_state(5);
        state.max_level_reached = 3;
        state.player.lives = 1;
        state.player.echoes = 0;
        assert!(state.start_run());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_index, 3);
        assert_eq!(state.player.lives, 10);
        assert_eq!(state.player.echoes, 30);
        assert_eq!(state.player.pos, state.level().start);
    }

    #[test]
    fn start_run_refused_outside_menu() {
        let mut state = bare_state(2);
        state.phase = GamePhase::Won;
        assert!(!state.start_run());
        assert_eq!(state.phase, GamePhase::Won);
    }

    #[test]
    fn respawn_requires_offer_and_coins() {
        let mut state = bare_state(2);
        state.phase = GamePhase::Respawn;
        state.respawn = Some(RespawnTimer::new(30));
        state.player.lives = 0;
        state.player.coins = 50;

        // Still counting down
        assert!(!state.buy_respawn());
        state.advance_respawn(30.0);
        assert!(state.respawn.as_ref().unwrap().is_offered());
        assert_eq!(state.drain_events(), vec![GameEvent::RespawnOffered]);

        state.player.coins = 19;
        assert!(!state.buy_respawn());
        assert_eq!(state.phase, GamePhase::Respawn);

        state.player.coins = 25;
        assert!(state.buy_respawn());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.coins, 5);
        assert_eq!(state.player.lives, 1);
        assert!(state.respawn.is_none());
    }

    #[test]
    fn restart_from_zero_resets_resources() {
        let mut state = bare_state(4);
        state.phase = GamePhase::Respawn;
        state.respawn = Some(RespawnTimer::new(0));
        state.level_index = 2;
        state.player.lives = 0;
        state.player.echoes = 3;
        state.player.has_key = true;
        assert!(state.restart_from_zero());
        assert_eq!(state.level_index, 0);
        assert_eq!(state.player.lives, 10);
        assert_eq!(state.player.echoes, 30);
        assert!(!state.player.has_key);
        assert!(state.visibility.is_empty());
    }

    #[test]
    fn retry_keeps_stage() {
        let mut state = bare_state(3);
        state.phase = GamePhase::GameOver;
        state.level_index = 1;
        state.player.pos = Vec2::new(400.0, 400.0);
        assert!(state.retry());
        assert_eq!(state.level_index, 1);
        assert_eq!(state.player.pos, state.level().start);
    }

    #[test]
    fn checkpoint_events() {
        assert!(GameEvent::Died.is_checkpoint());
        assert!(GameEvent::LevelCompleted { next: 2 }.is_checkpoint());
        assert!(!GameEvent::CoinCollected.is_checkpoint());
    }
}
