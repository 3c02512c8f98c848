//! Distance primitives and level shapes
//!
//! Every hit-test in the game is one of two distances compared against a
//! fixed per-entity threshold. No broad phase: levels hold at most a few
//! dozen entities and are scanned exhaustively each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Euclidean distance from a point to a circle center
#[inline]
pub fn dist_to_point(p: Vec2, center: Vec2) -> f32 {
    (p - center).length()
}

/// Distance from a point to an axis-aligned rectangle (zero inside)
#[inline]
pub fn dist_to_rect(p: Vec2, min: Vec2, size: Vec2) -> f32 {
    let closest = p.clamp(min, min + size);
    (p - closest).length()
}

/// Axis-aligned static obstacle or border wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn distance(&self, p: Vec2) -> f32 {
        dist_to_rect(p, self.pos, self.size)
    }
}

/// A rectangle that drifts and bounces off the inner boundary band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingRect {
    pub rect: Rect,
    /// Velocity in units per second
    pub vel: Vec2,
}

impl MovingRect {
    /// Advance by velocity, then flip each axis that left `[min, max]`
    pub fn advance(&mut self, dt: f32, min: f32, max: f32) {
        self.rect.pos += self.vel * dt;
        let p = self.rect.pos;
        if p.x < min || p.x > max {
            self.vel.x = -self.vel.x;
        }
        if p.y < min || p.y > max {
            self.vel.y = -self.vel.y;
        }
    }

    #[inline]
    pub fn distance(&self, p: Vec2) -> f32 {
        self.rect.distance(p)
    }
}

/// One-shot point pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub collected: bool,
}

impl Pickup {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            collected: false,
        }
    }

    /// Mark collected if `p` is within `radius`. Returns true only on the
    /// transition, so repeated checks never award twice.
    pub fn try_collect(&mut self, p: Vec2, radius: f32) -> bool {
        if self.collected || dist_to_point(p, self.pos) >= radius {
            return false;
        }
        self.collected = true;
        true
    }
}
