//! Echo timing state machine.
//!
//! Every input (trigger, echo edge, guard expiry) is an [`Event`] fed into
//! [`CycleState::step`], which returns the next state plus the single side
//! effect the caller has to carry out. Nothing here touches hardware, so the
//! interleavings the interrupts can produce are replayable in tests.
//!
//! ```text
//! Idle --trigger--> Armed --rising--> Measuring --falling--> Idle (Success)
//!                     |                   |
//!                     +------expiry-------+-----------------> Idle (Failed)
//! ```

use crate::distance::Centimeters;
use crate::error::{Discard, Skip};
use crate::guard::GuardHandle;
use crate::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleId(u32);

impl CycleId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoEvent {
    pub edge: Edge,
    pub at: Instant,
}

impl EchoEvent {
    pub fn rising(at: Instant) -> Self {
        Self {
            edge: Edge::Rising,
            at,
        }
    }

    pub fn falling(at: Instant) -> Self {
        Self {
            edge: Edge::Falling,
            at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    #[default]
    Pending,
    Success(Centimeters),
    Failed,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// A terminal outcome waiting to be reported
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolved {
    pub cycle: CycleId,
    pub outcome: Outcome,
    /// Set on expiry of a cycle that saw its rising edge. A falling edge
    /// stamped at or before `expired_at` still wins over the expiry.
    late_rise: Option<(Instant, Instant)>,
}

impl Resolved {
    fn success(cycle: CycleId, distance: Centimeters) -> Self {
        Self {
            cycle,
            outcome: Outcome::Success(distance),
            late_rise: None,
        }
    }

    fn failed(cycle: CycleId, rise: Option<Instant>, expired_at: Instant) -> Self {
        Self {
            cycle,
            outcome: Outcome::Failed,
            late_rise: rise.map(|r| (r, expired_at)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Armed {
        guard: GuardHandle,
        triggered_at: Instant,
    },
    Measuring {
        guard: GuardHandle,
        triggered_at: Instant,
        rise: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Trigger { at: Instant },
    Edge(EchoEvent),
    GuardExpired { handle: GuardHandle, at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    Nothing,
    ArmGuard(GuardHandle),
    CancelGuard(GuardHandle),
    Resolved(CycleId, Outcome),
    Skipped(Skip),
    Discarded(Discard),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleState {
    next_id: CycleId,
    phase: Phase,
    pending: Option<Resolved>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleState {
    pub const fn new() -> Self {
        Self {
            next_id: CycleId(1),
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> Option<&Resolved> {
        self.pending.as_ref()
    }

    /// Outcome of the most recent cycle: `Pending` while one is in flight
    pub fn outcome(&self) -> Outcome {
        match (self.phase, self.pending) {
            (Phase::Idle, Some(r)) => r.outcome,
            _ => Outcome::Pending,
        }
    }

    pub fn active_guard(&self) -> Option<GuardHandle> {
        match self.phase {
            Phase::Idle => None,
            Phase::Armed { guard, .. } | Phase::Measuring { guard, .. } => Some(guard),
        }
    }

    /// Hand the pending outcome to the reporter. Yields each outcome once.
    pub fn drain(&mut self) -> Option<Resolved> {
        self.pending.take()
    }

    pub fn step(self, event: Event) -> (Self, Effect) {
        match event {
            Event::Trigger { at } => self.on_trigger(at),
            Event::Edge(EchoEvent {
                edge: Edge::Rising,
                at,
            }) => self.on_rise(at),
            Event::Edge(EchoEvent {
                edge: Edge::Falling,
                at,
            }) => self.on_fall(at),
            Event::GuardExpired { handle, at } => self.on_expiry(handle, at),
        }
    }

    fn on_trigger(self, at: Instant) -> (Self, Effect) {
        if self.phase != Phase::Idle {
            return (self, Effect::Skipped(Skip::CycleInFlight));
        }
        if self.pending.is_some() {
            return (self, Effect::Skipped(Skip::Unreported));
        }

        let guard = GuardHandle::new(self.next_id);
        let next = Self {
            next_id: self.next_id.next(),
            phase: Phase::Armed {
                guard,
                triggered_at: at,
            },
            pending: None,
        };
        (next, Effect::ArmGuard(guard))
    }

    fn on_rise(self, at: Instant) -> (Self, Effect) {
        match self.phase {
            Phase::Armed {
                guard,
                triggered_at,
            } => {
                let next = Self {
                    phase: Phase::Measuring {
                        guard,
                        triggered_at,
                        rise: at,
                    },
                    ..self
                };
                (next, Effect::Nothing)
            }
            Phase::Measuring { .. } => (self, Effect::Discarded(Discard::Redundant)),
            Phase::Idle => (self, Effect::Discarded(Discard::Spurious)),
        }
    }

    fn on_fall(self, at: Instant) -> (Self, Effect) {
        match self.phase {
            Phase::Measuring {
                guard,
                triggered_at,
                rise,
            } => match echo_width(rise, at) {
                Ok(distance) => {
                    let next = Self {
                        phase: Phase::Idle,
                        pending: Some(Resolved::success(guard.cycle(), distance)),
                        ..self
                    };
                    (next, Effect::CancelGuard(guard))
                }
                Err(reason) => {
                    // Back to waiting; the guard still owns the terminal outcome
                    let next = Self {
                        phase: Phase::Armed {
                            guard,
                            triggered_at,
                        },
                        ..self
                    };
                    (next, Effect::Discarded(reason))
                }
            },
            Phase::Armed { .. } => (self, Effect::Discarded(Discard::NoRise)),
            Phase::Idle => self.on_late_fall(at),
        }
    }

    /// The expiry interrupt got serviced first but the falling edge happened
    /// no later than the expiry, so the reading stands.
    fn on_late_fall(self, at: Instant) -> (Self, Effect) {
        let Some(resolved) = self.pending else {
            return (self, Effect::Discarded(Discard::Spurious));
        };
        let Some((rise, expired_at)) = resolved.late_rise else {
            return (self, Effect::Discarded(Discard::Spurious));
        };
        if at > expired_at {
            return (self, Effect::Discarded(Discard::Spurious));
        }

        match echo_width(rise, at) {
            Ok(distance) => {
                let upgraded = Resolved::success(resolved.cycle, distance);
                let next = Self {
                    pending: Some(upgraded),
                    ..self
                };
                (next, Effect::Resolved(upgraded.cycle, upgraded.outcome))
            }
            Err(reason) => (self, Effect::Discarded(reason)),
        }
    }

    fn on_expiry(self, handle: GuardHandle, at: Instant) -> (Self, Effect) {
        let rise = match self.phase {
            Phase::Armed { guard, .. } if guard == handle => None,
            Phase::Measuring { guard, rise, .. } if guard == handle => Some(rise),
            _ => return (self, Effect::Discarded(Discard::StaleGuard)),
        };

        let resolved = Resolved::failed(handle.cycle(), rise, at);
        let next = Self {
            phase: Phase::Idle,
            pending: Some(resolved),
            ..self
        };
        (next, Effect::Resolved(resolved.cycle, resolved.outcome))
    }
}

fn echo_width(rise: Instant, fall: Instant) -> Result<Centimeters, Discard> {
    // A zero start stamp means the rise was never captured properly
    if rise.ticks() == 0 {
        return Err(Discard::NoRise);
    }
    match fall.checked_duration_since(rise) {
        Some(width) if width.ticks() > 0 => Ok(Centimeters::from_echo(width)),
        _ => Err(Discard::ZeroWidth),
    }
}
