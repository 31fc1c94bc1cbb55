use core::fmt;

/// Why a trigger request did not start a new cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Skip {
    /// A guard is still outstanding for the previous cycle
    CycleInFlight,
    /// The previous cycle resolved but nobody has reported it yet
    Unreported,
}

/// Edge or expiry notifications that are dropped without touching the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Discard {
    /// Edge while no cycle is active
    Spurious,
    /// Falling edge without a usable rising edge
    NoRise,
    /// Falling edge at or before the rising edge
    ZeroWidth,
    /// Second rising edge in the same cycle
    Redundant,
    /// Expiry for a cycle that already resolved or was never active
    StaleGuard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardError {
    AlreadyArmed,
    TimerUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerError<E> {
    Pin(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    InvalidDateTime,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    TriggerPulseOutOfRange(u32),
    GuardBudgetOutOfRange(u64),
    PeriodTooShort(u64),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::CycleInFlight => f.write_str("previous cycle still in flight"),
            Skip::Unreported => f.write_str("previous outcome not reported yet"),
        }
    }
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Discard::Spurious => "edge with no active cycle",
            Discard::NoRise => "falling edge without rising edge",
            Discard::ZeroWidth => "zero width echo",
            Discard::Redundant => "repeated rising edge",
            Discard::StaleGuard => "stale guard expiry",
        };
        f.write_str(s)
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::AlreadyArmed => f.write_str("guard already armed"),
            GuardError::TimerUnavailable => f.write_str("guard timer could not be started"),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for TriggerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerError::Pin(e) => write!(f, "trigger pin error: {:?}", e),
        }
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::InvalidDateTime => f.write_str("invalid date/time"),
            ClockError::Unavailable => f.write_str("clock unavailable"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TriggerPulseOutOfRange(us) => {
                write!(f, "trigger pulse of {}us outside 10..=15us", us)
            }
            ConfigError::GuardBudgetOutOfRange(ms) => {
                write!(f, "guard budget of {}ms outside 40..=100ms", ms)
            }
            ConfigError::PeriodTooShort(ms) => {
                write!(f, "sample period of {}ms shorter than the guard budget", ms)
            }
        }
    }
}
