/// Bounded hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u16,
    max: u16,
}

impl Health {
    pub fn new(max: u16) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Subtracts from the current value, saturating at zero.
    pub fn sub(&mut self, amount: u16) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Adds to the current value, clamping to max.
    pub fn add(&mut self, amount: u16) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Opacity for a damage overlay: 0 at full health, 1 at zero.
    pub fn damage_alpha(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        1.0 - f32::from(self.current) / f32::from(self.max)
    }
}
