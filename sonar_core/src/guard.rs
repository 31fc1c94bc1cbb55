//! One-shot timeout guards bounding a measurement cycle.
//!
//! A guard is armed when a cycle starts and either gets cancelled by the
//! falling edge or fires once. [`GuardSlot`] keeps that lifecycle as a
//! tri-state so a cancel that loses the race against the timer interrupt is
//! harmless, and a fire that loses the race against a cancel is swallowed.

use crate::cycle::CycleId;
use crate::error::GuardError;
use crate::time::{Duration, Instant};

/// Token for one armed guard. Only the cycle that armed it can cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GuardHandle {
    cycle: CycleId,
}

impl GuardHandle {
    pub(crate) fn new(cycle: CycleId) -> Self {
        Self { cycle }
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardState {
    Armed,
    Cancelled,
    Fired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardSlot {
    current: Option<(GuardHandle, GuardState)>,
}

impl GuardSlot {
    pub const fn new() -> Self {
        Self { current: None }
    }

    pub fn arm(&mut self, handle: GuardHandle) -> Result<(), GuardError> {
        if self.is_armed() {
            return Err(GuardError::AlreadyArmed);
        }
        self.current = Some((handle, GuardState::Armed));
        Ok(())
    }

    /// Returns true if this call stopped a guard that had not fired yet.
    /// Cancelling twice, after firing, or with a foreign handle is a no-op.
    pub fn cancel(&mut self, handle: GuardHandle) -> bool {
        match self.current {
            Some((h, GuardState::Armed)) if h == handle => {
                self.current = Some((h, GuardState::Cancelled));
                true
            }
            _ => false,
        }
    }

    /// Consume the armed guard. Yields the handle at most once per arm.
    pub fn fire(&mut self) -> Option<GuardHandle> {
        match self.current {
            Some((h, GuardState::Armed)) => {
                self.current = Some((h, GuardState::Fired));
                Some(h)
            }
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.current, Some((_, GuardState::Armed)))
    }

    pub fn state(&self) -> Option<GuardState> {
        self.current.map(|(_, s)| s)
    }

    pub fn handle(&self) -> Option<GuardHandle> {
        self.current.map(|(h, _)| h)
    }
}

/// Deferred one-shot action scoped to a single cycle
pub trait TimeoutGuard {
    fn arm(
        &mut self,
        handle: GuardHandle,
        armed_at: Instant,
        budget: Duration,
    ) -> Result<(), GuardError>;

    fn cancel(&mut self, handle: GuardHandle);

    /// Report an expiry that has happened by `now`, once, stamped with the
    /// instant the budget ran out rather than the instant it was noticed
    fn poll_expired(&mut self, now: Instant) -> Option<(GuardHandle, Instant)>;
}

/// Software guard that expires when polled past its deadline
#[derive(Debug, Default)]
pub struct DeadlineGuard {
    slot: GuardSlot,
    deadline: Option<Instant>,
}

impl DeadlineGuard {
    pub const fn new() -> Self {
        Self {
            slot: GuardSlot::new(),
            deadline: None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn slot(&self) -> &GuardSlot {
        &self.slot
    }
}

impl TimeoutGuard for DeadlineGuard {
    fn arm(
        &mut self,
        handle: GuardHandle,
        armed_at: Instant,
        budget: Duration,
    ) -> Result<(), GuardError> {
        self.slot.arm(handle)?;
        self.deadline = Some(armed_at + budget);
        Ok(())
    }

    fn cancel(&mut self, handle: GuardHandle) {
        if self.slot.cancel(handle) {
            self.deadline = None;
        }
    }

    fn poll_expired(&mut self, now: Instant) -> Option<(GuardHandle, Instant)> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.slot.fire().map(|h| (h, deadline))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::micros;
    use fugit::ExtU64;

    fn handle(n: u32) -> GuardHandle {
        GuardHandle::new(CycleId::from_raw(n))
    }

    #[test]
    fn refuses_double_arm() {
        let mut slot = GuardSlot::new();
        assert_eq!(slot.arm(handle(1)), Ok(()));
        assert_eq!(slot.arm(handle(2)), Err(GuardError::AlreadyArmed));
        assert_eq!(slot.handle(), Some(handle(1)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut slot = GuardSlot::new();
        slot.arm(handle(1)).unwrap();
        assert!(slot.cancel(handle(1)));
        assert!(!slot.cancel(handle(1)));
        assert_eq!(slot.state(), Some(GuardState::Cancelled));
        assert_eq!(slot.fire(), None);
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let mut slot = GuardSlot::new();
        slot.arm(handle(3)).unwrap();
        assert_eq!(slot.fire(), Some(handle(3)));
        assert!(!slot.cancel(handle(3)));
        assert_eq!(slot.state(), Some(GuardState::Fired));
        assert_eq!(slot.fire(), None);
    }

    #[test]
    fn foreign_handle_cannot_cancel() {
        let mut slot = GuardSlot::new();
        slot.arm(handle(4)).unwrap();
        assert!(!slot.cancel(handle(3)));
        assert!(slot.is_armed());
    }

    #[test]
    fn rearm_after_resolution() {
        let mut slot = GuardSlot::new();
        slot.arm(handle(1)).unwrap();
        slot.fire();
        assert_eq!(slot.arm(handle(2)), Ok(()));
        assert_eq!(slot.state(), Some(GuardState::Armed));
    }

    #[test]
    fn deadline_guard_fires_once_at_deadline() {
        let mut guard = DeadlineGuard::new();
        guard.arm(handle(1), micros(0), 50_u64.millis()).unwrap();
        assert_eq!(guard.poll_expired(micros(49_999)), None);
        assert_eq!(
            guard.poll_expired(micros(50_000)),
            Some((handle(1), micros(50_000)))
        );
        assert_eq!(guard.poll_expired(micros(60_000)), None);
    }

    #[test]
    fn late_poll_is_stamped_at_the_deadline() {
        let mut guard = DeadlineGuard::new();
        guard.arm(handle(2), micros(100), 50_u64.millis()).unwrap();
        assert_eq!(
            guard.poll_expired(micros(900_000)),
            Some((handle(2), micros(50_100)))
        );
    }

    #[test]
    fn cancelled_deadline_guard_never_fires() {
        let mut guard = DeadlineGuard::new();
        guard.arm(handle(1), micros(0), 50_u64.millis()).unwrap();
        guard.cancel(handle(1));
        assert_eq!(guard.poll_expired(micros(100_000)), None);
        assert_eq!(guard.slot().state(), Some(GuardState::Cancelled));
    }
}
