//! Increment/decrement rules for the numeric steppers.

/// A stepper with a lower bound and a step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub floor: u32,
    pub step: u32,
}

impl Counter {
    /// Plain integer input.
    pub const SINGLE: Counter = Counter { floor: 1, step: 1 };
    /// Search radius in miles.
    pub const RADIUS: Counter = Counter { floor: 5, step: 5 };

    /// Traveler group counter; `floor` comes from [`TravelerGroup::floor`].
    ///
    /// [`TravelerGroup::floor`]: super::model::TravelerGroup::floor
    pub const fn group(floor: u32) -> Counter {
        Counter { floor, step: 1 }
    }

    pub fn increment(&self, value: u32) -> u32 {
        value.saturating_add(self.step).max(self.floor)
    }

    pub fn decrement(&self, value: u32) -> u32 {
        value.saturating_sub(self.step).max(self.floor)
    }

    /// Apply `+1` (up) or `-1` (down) step.
    pub fn apply(&self, value: u32, direction: StepDirection) -> u32 {
        match direction {
            StepDirection::Up => self.increment(value),
            StepDirection::Down => self.decrement(value),
        }
    }
}

/// Which button of a stepper was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}
