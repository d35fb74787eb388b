//! Stepped duty ramp between two belt speeds.
//!
//! Yields the intermediate duty values for a smooth speed change.  The
//! caller writes each value to the motor and waits one step interval before
//! pulling the next.  The last value yielded is always `target`, and the
//! number of steps is `ceil(|target - start| / step)`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedRamp {
    current: u16,
    target: u16,
    step: u16,
}

impl SpeedRamp {
    pub fn new(start: u16, target: u16, step: u16) -> Self {
        Self {
            current: start,
            target,
            step: step.max(1),
        }
    }

    pub fn start(&self) -> u16 {
        self.current
    }

    pub fn target(&self) -> u16 {
        self.target
    }

    /// Number of duty writes this ramp still has to make.
    pub fn remaining_steps(&self) -> u32 {
        let delta = self.current.abs_diff(self.target) as u32;
        delta.div_ceil(self.step as u32)
    }
}

impl Iterator for SpeedRamp {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.current == self.target {
            return None;
        }
        self.current = if self.current < self.target {
            self.current.saturating_add(self.step).min(self.target)
        } else {
            self.current.saturating_sub(self.step).max(self.target)
        };
        Some(self.current)
    }
}
