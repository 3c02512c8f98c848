//! Whole-game phase machine
//!
//! Every phase change goes through `GamePhase::transition`. The match is
//! exhaustive over phases, so adding a phase does not compile until its
//! outgoing transitions are written down.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the stored profile lookup
    Loading,
    /// No profile yet; name/avatar entry
    Setup,
    /// Main menu
    Menu,
    /// Active gameplay
    Playing,
    /// Out of lives, respawn countdown/offer running
    Respawn,
    /// Out of lives without a respawn offer
    GameOver,
    /// Final stage cleared
    Won,
    Store,
    Ranking,
}

/// What happened to request a phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTrigger {
    ProfileMissing,
    ProfileReady,
    StartRun,
    OpenStore,
    OpenRanking,
    /// Back to the menu from an overlay or an ended run
    Back,
    /// Last life lost
    Died { respawn_offer: bool },
    CampaignComplete,
    /// Respawn bought, run restarted, or stage retried
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal phase transition: {from:?} on {trigger:?}")]
pub struct IllegalTransition {
    pub from: GamePhase,
    pub trigger: PhaseTrigger,
}

impl GamePhase {
    pub fn transition(self, trigger: PhaseTrigger) -> Result<GamePhase, IllegalTransition> {
        use GamePhase::*;
        use PhaseTrigger::*;

        let next = match self {
            Loading => match trigger {
                ProfileMissing => Some(Setup),
                ProfileReady => Some(Menu),
                _ => None,
            },
            Setup => match trigger {
                ProfileReady => Some(Menu),
                _ => None,
            },
            Menu => match trigger {
                StartRun => Some(Playing),
                OpenStore => Some(Store),
                OpenRanking => Some(Ranking),
                _ => None,
            },
            Playing => match trigger {
                Died { respawn_offer: true } => Some(Respawn),
                Died { respawn_offer: false } => Some(GameOver),
                CampaignComplete => Some(Won),
                Back => Some(Menu),
                _ => None,
            },
            Respawn => match trigger {
                Resume => Some(Playing),
                _ => None,
            },
            GameOver => match trigger {
                Resume => Some(Playing),
                Back => Some(Menu),
                _ => None,
            },
            Won | Store | Ranking => match trigger {
                Back => Some(Menu),
                _ => None,
            },
        };

        next.ok_or(IllegalTransition {
            from: self,
            trigger,
        })
    }

    /// Is the simulation loop running in this phase
    pub fn is_running(self) -> bool {
        self == GamePhase::Playing
    }
}
