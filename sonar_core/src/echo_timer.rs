use log::{debug, error, warn};

use crate::cycle::{CycleId, CycleState, EchoEvent, Effect, Event, Outcome, Phase, Resolved};
use crate::error::Skip;
use crate::guard::{GuardHandle, TimeoutGuard};
use crate::time::{Duration, Instant};

/// Drives [`CycleState`] and carries out its guard effects.
///
/// Owned by whatever serialises the interrupt sources (an RTIC shared
/// resource on target), so every method runs to completion before the next
/// event is applied.
pub struct EchoTimer<G: TimeoutGuard> {
    state: CycleState,
    guard: G,
    budget: Duration,
}

impl<G: TimeoutGuard> EchoTimer<G> {
    pub fn new(guard: G, budget: Duration) -> Self {
        Self {
            state: CycleState::new(),
            guard,
            budget,
        }
    }

    /// Admit a new cycle and arm its guard. Skips if anything is outstanding.
    pub fn begin_cycle(&mut self, now: Instant) -> Result<CycleId, Skip> {
        match self.apply(Event::Trigger { at: now }) {
            Effect::ArmGuard(handle) => Ok(handle.cycle()),
            Effect::Skipped(reason) => Err(reason),
            // Trigger only ever arms or skips
            _ => Err(Skip::CycleInFlight),
        }
    }

    /// Resolve an admitted cycle as failed without waiting on its guard,
    /// used when the trigger pulse could not be emitted.
    pub fn abandon(&mut self, cycle: CycleId, now: Instant) {
        if let Some(handle) = self.state.active_guard() {
            if handle.cycle() == cycle {
                self.guard.cancel(handle);
                self.apply(Event::GuardExpired { handle, at: now });
            }
        }
    }

    /// Any guard that ran out before the edge is applied first, so a
    /// missed poll can never let an overdue echo count as a reading.
    pub fn on_edge(&mut self, event: EchoEvent) -> Effect {
        self.service_guard(event.at);
        self.apply(Event::Edge(event))
    }

    pub fn on_guard_expired(&mut self, handle: GuardHandle, now: Instant) -> Effect {
        self.apply(Event::GuardExpired { handle, at: now })
    }

    /// Feed a pending guard expiry, if any, into the state machine
    pub fn service_guard(&mut self, now: Instant) -> Option<Effect> {
        let (handle, expired_at) = self.guard.poll_expired(now)?;
        Some(self.on_guard_expired(handle, expired_at))
    }

    pub fn take_outcome(&mut self) -> Option<Resolved> {
        self.state.drain()
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome()
    }

    pub fn is_idle(&self) -> bool {
        self.state.phase() == Phase::Idle
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut G {
        &mut self.guard
    }

    fn apply(&mut self, event: Event) -> Effect {
        let (next, effect) = self.state.step(event);
        self.state = next;

        match effect {
            Effect::ArmGuard(handle) => {
                let armed_at = match event {
                    Event::Trigger { at } => at,
                    _ => Instant::from_ticks(0),
                };
                match self.guard.arm(handle, armed_at, self.budget) {
                    Ok(()) => debug!("cycle {} armed", handle.cycle().raw()),
                    Err(e) => {
                        // Without a guard the cycle could hang forever, fail it now
                        error!("cycle {}: {}", handle.cycle().raw(), e);
                        let (next, _) = self.state.step(Event::GuardExpired {
                            handle,
                            at: armed_at,
                        });
                        self.state = next;
                    }
                }
            }
            // Edge and expiry run in interrupt context: keep them off the
            // default log level, the sampler reports outcomes
            Effect::CancelGuard(handle) => {
                self.guard.cancel(handle);
                debug!("cycle {} echo received", handle.cycle().raw());
            }
            Effect::Resolved(cycle, Outcome::Failed) => {
                debug!("cycle {} timed out", cycle.raw());
            }
            Effect::Resolved(cycle, _) => {
                debug!("cycle {} echo beat its expiry", cycle.raw());
            }
            Effect::Skipped(reason) => warn!("trigger skipped: {}", reason),
            Effect::Discarded(reason) => debug!("discarded: {}", reason),
            Effect::Nothing => {}
        }

        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use crate::guard::{DeadlineGuard, GuardState};
    use crate::time::micros;
    use fugit::ExtU64;

    fn timer() -> EchoTimer<DeadlineGuard> {
        EchoTimer::new(DeadlineGuard::new(), 50_u64.millis())
    }

    /// Guard that refuses to arm, to exercise the unguarded path
    struct BrokenGuard;

    impl TimeoutGuard for BrokenGuard {
        fn arm(&mut self, _: GuardHandle, _: Instant, _: Duration) -> Result<(), GuardError> {
            Err(GuardError::AlreadyArmed)
        }
        fn cancel(&mut self, _: GuardHandle) {}
        fn poll_expired(&mut self, _: Instant) -> Option<(GuardHandle, Instant)> {
            None
        }
    }

    #[test]
    fn success_cancels_guard() {
        let mut t = timer();
        t.begin_cycle(micros(100)).unwrap();
        assert_eq!(t.guard().deadline(), Some(micros(50_100)));

        t.on_edge(EchoEvent::rising(micros(1000)));
        t.on_edge(EchoEvent::falling(micros(1600)));
        assert_eq!(t.guard().slot().state(), Some(GuardState::Cancelled));
        assert_eq!(t.service_guard(micros(60_000)), None);
        assert!(matches!(t.take_outcome().unwrap().outcome, Outcome::Success(_)));
    }

    #[test]
    fn guard_expiry_fails_cycle() {
        let mut t = timer();
        let cycle = t.begin_cycle(micros(0)).unwrap();
        assert_eq!(t.service_guard(micros(49_000)), None);
        assert_eq!(
            t.service_guard(micros(50_000)),
            Some(Effect::Resolved(cycle, Outcome::Failed))
        );
        assert!(t.is_idle());
        assert_eq!(t.guard().slot().state(), Some(GuardState::Fired));
    }

    #[test]
    fn overdue_fall_fails_without_a_poll() {
        let mut t = timer();
        let cycle = t.begin_cycle(micros(0)).unwrap();
        t.on_edge(EchoEvent::rising(micros(1000)));

        assert_eq!(
            t.on_edge(EchoEvent::falling(micros(70_000))),
            Effect::Discarded(crate::error::Discard::Spurious)
        );
        let resolved = t.take_outcome().unwrap();
        assert_eq!(resolved.cycle, cycle);
        assert_eq!(resolved.outcome, Outcome::Failed);
        assert_eq!(t.guard().slot().state(), Some(GuardState::Fired));
    }

    #[test]
    fn second_begin_is_skipped() {
        let mut t = timer();
        t.begin_cycle(micros(0)).unwrap();
        assert_eq!(t.begin_cycle(micros(10)), Err(Skip::CycleInFlight));
        assert_eq!(t.guard().deadline(), Some(micros(50_000)));
    }

    #[test]
    fn abandon_resolves_failed_and_disarms() {
        let mut t = timer();
        let cycle = t.begin_cycle(micros(0)).unwrap();
        t.abandon(cycle, micros(20));
        assert_eq!(t.outcome(), Outcome::Failed);
        assert_eq!(t.guard().slot().state(), Some(GuardState::Cancelled));
        assert_eq!(t.service_guard(micros(100_000)), None);
    }

    #[test]
    fn unarmable_guard_fails_immediately() {
        let mut t = EchoTimer::new(BrokenGuard, 50_u64.millis());
        assert!(t.begin_cycle(micros(5)).is_ok());
        assert!(t.is_idle());
        assert_eq!(t.outcome(), Outcome::Failed);
    }
}
