//! Sound effects
//!
//! Every effect is a single procedurally generated tone, so no asset files
//! are needed. The mapping from game events to tones is platform
//! independent; playback goes through Web Audio in the browser and is a
//! no-op natively.

use crate::settings::Settings;
use crate::sim::GameEvent;
use crate::sim::store::Grant;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Echo pulse emitted
    Ping,
    CoinCollect,
    HealthCollect,
    EchoPackCollect,
    KeyCollect,
    /// Stage cleared (also the campaign)
    LevelClear,
    /// Obstacle hit with lives to spare
    Hit,
    /// Last life lost
    Death,
    Respawn,
    Restart,
    BuyEchoes,
    BuyLives,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

/// One tone: starts at `volume`, ramps exponentially to silence over
/// `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub freq: f32,
    pub waveform: Waveform,
    pub duration: f64,
    pub volume: f32,
}

impl SoundCue {
    const fn new(freq: f32, waveform: Waveform, duration: f64, volume: f32) -> Self {
        Self {
            freq,
            waveform,
            duration,
            volume,
        }
    }
}

impl SoundEffect {
    /// Effect for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        let effect = match event {
            GameEvent::Ping { .. } => SoundEffect::Ping,
            GameEvent::CoinCollected => SoundEffect::CoinCollect,
            GameEvent::HealthCollected => SoundEffect::HealthCollect,
            GameEvent::EchoPackCollected => SoundEffect::EchoPackCollect,
            GameEvent::KeyCollected => SoundEffect::KeyCollect,
            GameEvent::Collision { .. } => SoundEffect::Hit,
            GameEvent::Died => SoundEffect::Death,
            GameEvent::LevelCompleted { .. } | GameEvent::CampaignWon => SoundEffect::LevelClear,
            GameEvent::Respawned => SoundEffect::Respawn,
            GameEvent::RunRestarted => SoundEffect::Restart,
            GameEvent::Purchased { offer } => match offer.grant() {
                Grant::Echoes(_) => SoundEffect::BuyEchoes,
                Grant::Lives(_) => SoundEffect::BuyLives,
            },
            GameEvent::RespawnOffered => return None,
        };
        Some(effect)
    }

    pub fn cue(self) -> SoundCue {
        use Waveform::*;
        match self {
            SoundEffect::Ping => SoundCue::new(440.0, Sine, 0.4, 0.05),
            SoundEffect::CoinCollect => SoundCue::new(1400.0, Sine, 0.1, 0.1),
            SoundEffect::HealthCollect => SoundCue::new(800.0, Sine, 0.3, 0.2),
            SoundEffect::EchoPackCollect => SoundCue::new(1200.0, Sine, 0.3, 0.2),
            SoundEffect::KeyCollect => SoundCue::new(880.0, Triangle, 0.4, 0.2),
            SoundEffect::LevelClear => SoundCue::new(1100.0, Sine, 0.8, 0.2),
            SoundEffect::Hit => SoundCue::new(150.0, Square, 0.2, 0.1),
            SoundEffect::Death => SoundCue::new(100.0, Square, 0.4, 0.2),
            SoundEffect::Respawn => SoundCue::new(700.0, Sine, 0.3, 0.2),
            SoundEffect::Restart => SoundCue::new(600.0, Sine, 0.3, 0.2),
            SoundEffect::BuyEchoes => SoundCue::new(700.0, Sine, 0.3, 0.2),
            SoundEffect::BuyLives => SoundCue::new(800.0, Sine, 0.3, 0.2),
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::AudioContext>,
    volume: f32,
    focused: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = web_sys::AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: Settings::default().effective_volume(),
            focused: true,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            volume: Settings::default().effective_volume(),
            focused: true,
        }
    }

    /// Pick up volume and mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.volume_when(self.focused);
    }

    /// Page focus changed; re-applies `settings` so blur muting takes effect
    pub fn set_focused(&mut self, focused: bool, settings: &Settings) {
        self.focused = focused;
        self.apply_settings(settings);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Play whatever effects a batch of events calls for
    pub fn play_events(&self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        self.play_cue(effect.cue());
    }

    #[cfg(target_arch = "wasm32")]
    fn play_cue(&self, cue: SoundCue) {
        use web_sys::{AudioContextState, OscillatorType};

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let (Ok(osc), Ok(gain)) = (ctx.create_oscillator(), ctx.create_gain()) else {
            return;
        };
        osc.set_type(match cue.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Triangle => OscillatorType::Triangle,
        });
        if osc.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }

        let t = ctx.current_time();
        osc.frequency().set_value_at_time(cue.freq, t).ok();
        gain.gain().set_value_at_time(cue.volume * self.volume, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + cue.duration)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + cue.duration).ok();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn play_cue(&self, cue: SoundCue) {
        log::trace!("sound {:.0} Hz {:?} for {:.2}s", cue.freq, cue.waveform, cue.duration);
    }
}
