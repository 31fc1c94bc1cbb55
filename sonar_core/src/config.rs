use fugit::{ExtU32, ExtU64, MicrosDurationU32};

use crate::error::ConfigError;
use crate::time::Duration;

const MIN_PULSE_US: u32 = 10;
const MAX_PULSE_US: u32 = 15;
// The datasheet's longest valid echo is ~38ms (no target)
const MIN_BUDGET_MS: u64 = 40;
const MAX_BUDGET_MS: u64 = 100;

/// Timing knobs for one sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub trigger_pulse: MicrosDurationU32,
    pub guard_budget: Duration,
    pub sample_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_pulse: 10_u32.micros(),
            guard_budget: 50_u64.millis(),
            sample_period: 1_u64.secs(),
        }
    }
}

impl Config {
    pub fn set_trigger_pulse(self, pulse: MicrosDurationU32) -> Self {
        Self {
            trigger_pulse: pulse,
            ..self
        }
    }

    pub fn set_guard_budget(self, budget: Duration) -> Self {
        Self {
            guard_budget: budget,
            ..self
        }
    }

    pub fn set_sample_period(self, period: Duration) -> Self {
        Self {
            sample_period: period,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pulse = self.trigger_pulse.to_micros();
        if !(MIN_PULSE_US..=MAX_PULSE_US).contains(&pulse) {
            return Err(ConfigError::TriggerPulseOutOfRange(pulse));
        }

        let budget = self.guard_budget.to_millis();
        if !(MIN_BUDGET_MS..=MAX_BUDGET_MS).contains(&budget) {
            return Err(ConfigError::GuardBudgetOutOfRange(budget));
        }

        // A cycle has to be able to resolve before the next tick
        if self.sample_period <= self.guard_budget {
            return Err(ConfigError::PeriodTooShort(self.sample_period.to_millis()));
        }

        Ok(())
    }
}
