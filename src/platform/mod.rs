//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (fixed-step accumulator)
//! - Input events (screen to field mapping, queueing)
//! - Storage (LocalStorage on web, see `web`)

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::clamp_to_field;
use crate::consts::{FIELD_SIZE, MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::InputEvent;

/// Maps client (CSS pixel) coordinates onto the logical square field.
///
/// The canvas may be drawn at any size; the field is always
/// `FIELD_SIZE` x `FIELD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    /// Top-left of the canvas in client coordinates
    pub origin: Vec2,
    /// Displayed canvas size in client coordinates
    pub size: Vec2,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            size: Vec2::splat(FIELD_SIZE),
        }
    }
}

impl CanvasTransform {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(left, top),
            size: Vec2::new(width, height),
        }
    }

    /// Client point to field point, clamped into the field
    pub fn to_field(&self, client: Vec2) -> Vec2 {
        let size = self.size.max(Vec2::ONE);
        clamp_to_field((client - self.origin) * (FIELD_SIZE / size))
    }
}

/// Pointer events waiting for the next simulation step
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take all pending events in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Fixed timestep accumulator
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame delta, returning how many `SIM_DT` steps to run.
    /// Long frames are clamped and the step count is capped to prevent a
    /// spiral of death.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
