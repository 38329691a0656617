use super::traits::AbilityListener;
use crate::state::AbilityEvent;

/// No listener attached.
impl AbilityListener for () {}

/// Listener that records every event, for HUD polling and tests.
///
/// `events` grows until the host calls [`EventLog::drain`]; drain it once per frame.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<AbilityEvent>,
    pub grounded: bool,
    pub speed: f32,
}

impl EventLog {
    pub fn drain(&mut self) -> Vec<AbilityEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AbilityListener for EventLog {
    fn on_event(&mut self, event: AbilityEvent) {
        self.events.push(event);
    }

    fn notify_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}
