//! Respawn countdown
//!
//! Runs at one-second granularity on wall time, independent of the fixed
//! simulation step. Once the count hits zero the offer stays open until the
//! player picks an option.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespawnStage {
    Waiting,
    Offered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnTimer {
    seconds_left: u32,
    /// Sub-second time not yet counted
    carry: f32,
}

impl RespawnTimer {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds_left: seconds,
            carry: 0.0,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn stage(&self) -> RespawnStage {
        if self.seconds_left == 0 {
            RespawnStage::Offered
        } else {
            RespawnStage::Waiting
        }
    }

    pub fn is_offered(&self) -> bool {
        self.stage() == RespawnStage::Offered
    }

    /// Count down by elapsed wall time. Returns true on the call that opens
    /// the offer.
    pub fn advance(&mut self, elapsed: f32) -> bool {
        if self.is_offered() {
            return false;
        }
        self.carry += elapsed.max(0.0);
        while self.carry >= 1.0 && self.seconds_left > 0 {
            self.carry -= 1.0;
            self.seconds_left -= 1;
        }
        self.is_offered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whole_seconds() {
        let mut t = RespawnTimer::new(30);
        assert!(!t.advance(0.6));
        assert_eq!(t.seconds_left(), 30);
        assert!(!t.advance(0.6));
        assert_eq!(t.seconds_left(), 29);
        assert_eq!(t.stage(), RespawnStage::Waiting);
    }

    #[test]
    fn opens_offer_once() {
        let mut t = RespawnTimer::new(2);
        assert!(!t.advance(1.0));
        assert!(t.advance(5.0));
        assert!(t.is_offered());
        assert!(!t.advance(1.0));
        assert_eq!(t.seconds_left(), 0);
    }

    #[test]
    fn zero_duration_is_offered_immediately() {
        assert!(RespawnTimer::new(0).is_offered());
    }
}
