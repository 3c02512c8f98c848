//! Coin shop
//!
//! Purchases are all-or-nothing: with too few coins nothing changes.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOffer {
    Echoes10,
    Life1,
    Echoes25,
    Lives3,
    /// In-run quick buy
    QuickEchoes15,
}

/// What an offer grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Echoes(u32),
    Lives(u32),
}

impl StoreOffer {
    /// Offers listed on the store screen
    pub const CATALOG: [StoreOffer; 4] = [
        StoreOffer::Echoes10,
        StoreOffer::Life1,
        StoreOffer::Echoes25,
        StoreOffer::Lives3,
    ];

    pub fn cost(self) -> u32 {
        match self {
            StoreOffer::Echoes10 => 5,
            StoreOffer::Life1 => 8,
            StoreOffer::Echoes25 => 10,
            StoreOffer::Lives3 => 20,
            StoreOffer::QuickEchoes15 => 10,
        }
    }

    pub fn grant(self) -> Grant {
        match self {
            StoreOffer::Echoes10 => Grant::Echoes(10),
            StoreOffer::Life1 => Grant::Lives(1),
            StoreOffer::Echoes25 => Grant::Echoes(25),
            StoreOffer::Lives3 => Grant::Lives(3),
            StoreOffer::QuickEchoes15 => Grant::Echoes(15),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StoreOffer::Echoes10 => "10 Echoes",
            StoreOffer::Life1 => "1 Life",
            StoreOffer::Echoes25 => "25 Echoes",
            StoreOffer::Lives3 => "3 Lives",
            StoreOffer::QuickEchoes15 => "+15 Echoes",
        }
    }
}

impl GameState {
    pub fn can_afford(&self, offer: StoreOffer) -> bool {
        self.player.coins >= offer.cost()
    }

    /// Spend coins on an offer. Lives are capped at the configured maximum.
    pub fn buy(&mut self, offer: StoreOffer) -> bool {
        if !self.can_afford(offer) {
            return false;
        }
        self.player.coins -= offer.cost();
        match offer.grant() {
            Grant::Echoes(n) => self.player.echoes += n,
            Grant::Lives(n) => {
                self.player.lives = (self.player.lives + n).min(self.tuning.run.max_lives);
            }
        }
        log::debug!("Bought {} for {} coins", offer.label(), offer.cost());
        self.emit(GameEvent::Purchased { offer });
        true
    }
}
