use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::config::Config;
use crate::cycle::{EchoEvent, Effect, Outcome, Resolved};
use crate::echo_timer::EchoTimer;
use crate::error::TriggerError;
use crate::guard::{GuardHandle, TimeoutGuard};
use crate::pulse::{PulseGenerator, Triggered};
use crate::time::Instant;

/// One sensor: trigger line plus echo timing. This is the single piece of
/// state shared between the echo interrupt, the guard interrupt and the
/// sampling task.
pub struct Sonar<P, D, G: TimeoutGuard> {
    pulse: PulseGenerator<P, D>,
    timer: EchoTimer<G>,
}

impl<P, D, G> Sonar<P, D, G>
where
    P: OutputPin,
    D: DelayNs,
    G: TimeoutGuard,
{
    pub fn new(trigger_pin: P, delay: D, guard: G, config: &Config) -> Self {
        Self {
            pulse: PulseGenerator::new(trigger_pin, delay, config.trigger_pulse),
            timer: EchoTimer::new(guard, config.guard_budget),
        }
    }

    pub fn trigger(&mut self, now: Instant) -> Result<Triggered, TriggerError<P::Error>> {
        self.pulse.trigger(&mut self.timer, now)
    }

    pub fn on_edge(&mut self, event: EchoEvent) -> Effect {
        self.timer.on_edge(event)
    }

    /// Entry point for a guard implementation that learns about its own
    /// expiry from an interrupt
    pub fn on_guard_expired(&mut self, handle: GuardHandle, now: Instant) -> Effect {
        self.timer.on_guard_expired(handle, now)
    }

    pub fn service_guard(&mut self, now: Instant) -> Option<Effect> {
        self.timer.service_guard(now)
    }

    pub fn take_outcome(&mut self) -> Option<Resolved> {
        self.timer.take_outcome()
    }

    pub fn outcome(&self) -> Outcome {
        self.timer.outcome()
    }

    pub fn is_idle(&self) -> bool {
        self.timer.is_idle()
    }

    pub fn timer(&self) -> &EchoTimer<G> {
        &self.timer
    }

    pub fn guard_mut(&mut self) -> &mut G {
        self.timer.guard_mut()
    }
}
