use embedded_hal::{delay::DelayNs, digital::OutputPin};
use log::{error, info};

use crate::command::Command;
use crate::cycle::Resolved;
use crate::guard::TimeoutGuard;
use crate::pulse::Triggered;
use crate::sonar::Sonar;
use crate::time::Instant;

/// What one sampling period did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    /// Outcome drained this period, to be reported exactly once
    pub resolved: Option<Resolved>,
    /// `None` when sampling is off or the trigger line failed
    pub triggered: Option<Triggered>,
}

/// Fixed-cadence driver toggled by operator commands
#[derive(Debug, Default)]
pub struct Sampler {
    enabled: bool,
}

impl Sampler {
    pub const fn new() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the acknowledgment to print
    pub fn apply(&mut self, cmd: Command) -> &'static str {
        self.enabled = matches!(cmd, Command::Start);
        info!("sampling {}", if self.enabled { "on" } else { "off" });
        cmd.ack()
    }

    /// One period: collect a late expiry, drain the finished cycle, then
    /// start the next one if sampling is on. Draining first means a cycle is
    /// always reported before its successor's pulse goes out.
    pub fn tick<P, D, G>(&mut self, sonar: &mut Sonar<P, D, G>, now: Instant) -> Tick
    where
        P: OutputPin,
        D: DelayNs,
        G: TimeoutGuard,
    {
        sonar.service_guard(now);
        let resolved = sonar.take_outcome();

        let triggered = if self.enabled {
            match sonar.trigger(now) {
                Ok(t) => Some(t),
                Err(e) => {
                    error!("trigger failed: {:?}", e);
                    None
                }
            }
        } else {
            None
        };

        Tick {
            resolved,
            triggered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cycle::{EchoEvent, Outcome};
    use crate::guard::DeadlineGuard;
    use crate::time::micros;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct PinMock;
    impl ErrorType for PinMock {
        type Error = Infallible;
    }
    impl OutputPin for PinMock {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct DelayMock;
    impl DelayNs for DelayMock {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn sonar() -> Sonar<PinMock, DelayMock, DeadlineGuard> {
        Sonar::new(PinMock, DelayMock, DeadlineGuard::new(), &Config::default())
    }

    #[test]
    fn disabled_sampler_never_triggers() {
        let mut s = Sampler::new();
        let mut sonar = sonar();
        assert_eq!(s.tick(&mut sonar, micros(1)), Tick::default());
        assert!(sonar.is_idle());
    }

    #[test]
    fn repeated_start_stays_enabled() {
        let mut s = Sampler::new();
        assert_eq!(s.apply(Command::Start), "Iniciando...");
        assert_eq!(s.apply(Command::Start), "Iniciando...");
        assert!(s.is_enabled());
        assert_eq!(s.apply(Command::Stop), "Parando...");
        assert!(!s.is_enabled());
    }

    #[test]
    fn outcome_is_reported_on_next_tick() {
        let mut s = Sampler::new();
        let mut sonar = sonar();
        s.apply(Command::Start);

        let t = s.tick(&mut sonar, micros(10));
        assert!(matches!(t.triggered, Some(Triggered::Started(_))));
        assert_eq!(t.resolved, None);

        sonar.on_edge(EchoEvent::rising(micros(1000)));
        sonar.on_edge(EchoEvent::falling(micros(1600)));

        let t = s.tick(&mut sonar, micros(1_000_010));
        assert!(matches!(
            t.resolved.map(|r| r.outcome),
            Some(Outcome::Success(_))
        ));
        assert!(matches!(t.triggered, Some(Triggered::Started(_))));
    }
}
