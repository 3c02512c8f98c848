//! One player's game session
//!
//! Owns the run state, the pending pointer input, the fixed-step clock and
//! the progress store. The presentation layer calls `update` once per
//! displayed frame and forwards menu commands; everything the simulation
//! reports comes back out of `drain_events`.
//!
//! Progress is pushed to the store at checkpoints (stage cleared, death,
//! campaign won) and when leaving a run. Store failures are logged and never
//! interrupt play.

use crate::consts::SIM_DT;
use crate::leaderboard::Leaderboard;
use crate::persistence::{PersistError, ProfileRecord, ProgressStore, StatsRecord, StatsUpdate};
use crate::platform::{FixedStep, InputQueue};
use crate::sim::{
    FrameSnapshot, GameEvent, GamePhase, GameState, InputEvent, PhaseTrigger, StoreOffer,
    TickInput, handle_input, tick,
};

pub struct Session<S: ProgressStore> {
    state: GameState,
    input: InputQueue,
    clock: FixedStep,
    store: S,
    user_id: String,
    profile: Option<ProfileRecord>,
    leaderboard: Leaderboard,
    /// Events not yet handed to the presentation layer
    outbox: Vec<GameEvent>,
}

impl<S: ProgressStore> Session<S> {
    pub fn new(state: GameState, store: S, user_id: impl Into<String>) -> Self {
        Self {
            state,
            input: InputQueue::new(),
            clock: FixedStep::new(),
            store,
            user_id: user_id.into(),
            profile: None,
            leaderboard: Leaderboard::new(),
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn profile(&self) -> Option<&ProfileRecord> {
        self.profile.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.state.snapshot()
    }

    /// Leave `Loading`: straight to the menu when a profile exists (restoring
    /// stored progress), otherwise to profile setup
    pub fn boot(&mut self) -> GamePhase {
        let profile = match self.store.load_profile(&self.user_id) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Failed to load profile: {}", e);
                None
            }
        };

        match profile {
            Some(profile) => {
                log::info!("Welcome back, {}", profile.name);
                self.profile = Some(profile);
                match self.store.load_stats(&self.user_id) {
                    Ok(Some(stats)) => self.apply_stats(&stats),
                    Ok(None) => {}
                    Err(e) => log::warn!("Failed to load stats: {}", e),
                }
                self.state.set_phase(PhaseTrigger::ProfileReady);
            }
            None => {
                self.state.set_phase(PhaseTrigger::ProfileMissing);
            }
        }
        self.state.phase
    }

    /// Restore stored progress. Zero lives or echoes count as "not stored".
    fn apply_stats(&mut self, stats: &StatsRecord) {
        let run = &self.state.tuning.run;
        let lives = if stats.lives == 0 { run.initial_lives } else { stats.lives };
        let echoes = if stats.echoes == 0 { run.initial_echoes } else { stats.echoes };

        self.state.max_level_reached = stats.max_level.min(self.state.campaign.last_index());
        self.state.player.coins = stats.coins;
        self.state.player.score = stats.score;
        self.state.player.lives = lives.min(run.max_lives);
        self.state.player.echoes = echoes;
        log::info!(
            "Restored progress: stage {}, {} coins, score {}",
            self.state.max_level_reached + 1,
            stats.coins,
            stats.score
        );
    }

    /// Create the profile during setup. An empty name is refused and the
    /// phase stays `Setup`.
    pub fn save_profile(&mut self, profile: ProfileRecord) -> Result<(), PersistError> {
        self.store.save_profile(
            &self.user_id,
            &profile,
            self.state.player.score,
            self.state.max_level_reached + 1,
        )?;
        log::info!("Profile saved for {}", profile.name);
        self.profile = Some(profile);
        self.state.set_phase(PhaseTrigger::ProfileReady);
        Ok(())
    }

    /// Push current progress now
    pub fn save(&mut self) -> Result<(), PersistError> {
        let update = StatsUpdate::from(&self.state);
        self.store.sync_progress(&self.user_id, &update)
    }

    /// Checkpoint write; failure is logged, play continues
    fn checkpoint(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("Progress sync failed: {}", e);
        }
    }

    pub fn refresh_leaderboard(&mut self) -> Result<&Leaderboard, PersistError> {
        let entries = self.store.leaderboard()?;
        self.leaderboard = Leaderboard::from_entries(entries);
        Ok(&self.leaderboard)
    }

    /// Queue a pointer event (field coordinates) for the next step
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Advance by one displayed frame of `frame_dt` seconds
    pub fn update(&mut self, frame_dt: f32) {
        let steps = self.clock.advance(frame_dt);

        if self.state.phase.is_running() {
            if steps > 0 {
                let mut input = TickInput {
                    events: self.input.drain(),
                };
                for _ in 0..steps {
                    tick(&mut self.state, &input, SIM_DT);
                    input.events.clear();
                }
            }
        } else {
            for event in self.input.drain() {
                handle_input(&mut self.state, event);
            }
            // The countdown runs on wall time, not simulation steps
            self.state.advance_respawn(frame_dt.max(0.0));
        }

        self.flush_events();
    }

    /// Take everything that happened since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn flush_events(&mut self) {
        let events = self.state.drain_events();
        if events.iter().any(GameEvent::is_checkpoint) {
            self.checkpoint();
        }
        self.outbox.extend(events);
    }

    /// Run a menu command, keeping the clock and event flow consistent
    fn command(&mut self, f: impl FnOnce(&mut GameState) -> bool) -> bool {
        let done = f(&mut self.state);
        if done && self.state.phase.is_running() {
            self.clock.reset();
        }
        self.flush_events();
        done
    }

    pub fn start_run(&mut self) -> bool {
        self.command(GameState::start_run)
    }

    pub fn retry(&mut self) -> bool {
        self.command(GameState::retry)
    }

    pub fn buy_respawn(&mut self) -> bool {
        self.command(GameState::buy_respawn)
    }

    pub fn restart_from_zero(&mut self) -> bool {
        self.command(GameState::restart_from_zero)
    }

    pub fn open_store(&mut self) -> bool {
        self.command(GameState::open_store)
    }

    /// Open the ranking screen with a fresh board
    pub fn open_ranking(&mut self) -> bool {
        if let Err(e) = self.refresh_leaderboard() {
            log::warn!("Failed to load leaderboard: {}", e);
        }
        self.command(GameState::open_ranking)
    }

    /// Back to the menu from a run, the store, the ranking or a finished
    /// campaign. Progress is saved when a run is left.
    pub fn exit_to_menu(&mut self) -> bool {
        let was_running = matches!(self.state.phase, GamePhase::Playing | GamePhase::GameOver);
        let left = self.command(GameState::exit_to_menu);
        if left && was_running {
            self.checkpoint();
        }
        left
    }

    /// Store offers on the store screen; the quick echo refill during a run
    pub fn buy(&mut self, offer: StoreOffer) -> bool {
        let allowed = match offer {
            StoreOffer::QuickEchoes15 => self.state.phase == GamePhase::Playing,
            _ => self.state.phase == GamePhase::Store,
        };
        if !allowed {
            log::debug!("{} not on sale in {:?}", offer.label(), self.state.phase);
            return false;
        }
        self.command(|state| state.buy(offer))
    }
}
