//! Ability cooldowns as explicit per-tick accumulators.

use crate::constants::DASH_COOLDOWN_STEP_SECONDS;

/// Dash cooldown counted in whole seconds.
///
/// Two independent paths bring it back to zero, whichever happens first:
/// - the per-second countdown elapses, or
/// - the character lands while the countdown is still pending (`can_refresh`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashCooldown {
    seconds_remaining: u32,
    accumulator: f32,
    can_refresh: bool,
}

impl DashCooldown {
    pub fn start(&mut self, seconds: u32) {
        self.seconds_remaining = seconds;
        self.accumulator = 0.0;
        self.can_refresh = seconds > 0;
    }

    /// Accumulate elapsed time and drop one second per full second elapsed.
    pub fn tick(&mut self, dt: f32) {
        if self.seconds_remaining == 0 {
            return;
        }

        self.accumulator += dt.max(0.0);
        while self.accumulator >= DASH_COOLDOWN_STEP_SECONDS && self.seconds_remaining > 0 {
            self.accumulator -= DASH_COOLDOWN_STEP_SECONDS;
            self.seconds_remaining -= 1;
        }

        if self.seconds_remaining == 0 {
            self.clear();
        }
    }

    /// Landing refresh: refills instantly if a countdown is pending.
    ///
    /// Returns true if the cooldown was refreshed by this call.
    pub fn refresh_on_landing(&mut self) -> bool {
        if !self.can_refresh {
            return false;
        }
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.seconds_remaining = 0;
        self.accumulator = 0.0;
        self.can_refresh = false;
    }

    pub fn is_ready(&self) -> bool {
        self.seconds_remaining == 0
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn can_refresh(&self) -> bool {
        self.can_refresh
    }
}

/// Wall-clock slide cooldown in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlideCooldown {
    remaining: f32,
}

impl SlideCooldown {
    pub fn start(&mut self, seconds: f32) {
        self.remaining = seconds.max(0.0);
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
