use embedded_hal::{delay::DelayNs, digital::OutputPin};
use fugit::MicrosDurationU32;

use crate::cycle::CycleId;
use crate::echo_timer::EchoTimer;
use crate::error::{Skip, TriggerError};
use crate::guard::TimeoutGuard;
use crate::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Triggered {
    Started(CycleId),
    Skipped(Skip),
}

/// Drives the sensor's trigger line
pub struct PulseGenerator<P, D> {
    pin: P,
    delay: D,
    width: MicrosDurationU32,
}

impl<P: OutputPin, D: DelayNs> PulseGenerator<P, D> {
    pub fn new(mut pin: P, delay: D, width: MicrosDurationU32) -> Self {
        // A high trigger line at boot would start a measurement nobody waits for
        pin.set_low().ok();
        Self { pin, delay, width }
    }

    /// Start one measurement cycle. No-op while the previous one is
    /// unresolved or unreported.
    pub fn trigger<G: TimeoutGuard>(
        &mut self,
        timer: &mut EchoTimer<G>,
        now: Instant,
    ) -> Result<Triggered, TriggerError<P::Error>> {
        let cycle = match timer.begin_cycle(now) {
            Ok(cycle) => cycle,
            Err(reason) => return Ok(Triggered::Skipped(reason)),
        };

        if let Err(e) = self.pulse() {
            timer.abandon(cycle, now);
            return Err(TriggerError::Pin(e));
        }

        Ok(Triggered::Started(cycle))
    }

    fn pulse(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()?;
        self.delay.delay_us(self.width.to_micros());
        self.pin.set_low()
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::Outcome;
    use crate::guard::DeadlineGuard;
    use crate::time::micros;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use fugit::{ExtU32, ExtU64};

    #[derive(Default)]
    struct PinMock {
        levels: Vec<bool>,
        broken: bool,
    }

    impl ErrorType for PinMock {
        type Error = ErrorKind;
    }

    impl OutputPin for PinMock {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.levels.push(true);
            Ok(())
        }
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }
    }

    #[derive(Default)]
    struct DelayMock {
        waited_ns: u64,
    }

    impl DelayNs for DelayMock {
        fn delay_ns(&mut self, ns: u32) {
            self.waited_ns += ns as u64;
        }
    }

    fn timer() -> EchoTimer<DeadlineGuard> {
        EchoTimer::new(DeadlineGuard::new(), 50_u64.millis())
    }

    #[test]
    fn emits_one_pulse_of_configured_width() {
        let mut gen = PulseGenerator::new(PinMock::default(), DelayMock::default(), 12_u32.micros());
        let mut t = timer();

        assert!(matches!(gen.trigger(&mut t, micros(1)), Ok(Triggered::Started(_))));
        let (pin, delay) = gen.release();
        assert_eq!(pin.levels, vec![false, true, false]);
        assert_eq!(delay.waited_ns, 12_000);
    }

    #[test]
    fn no_pulse_while_cycle_in_flight() {
        let mut gen = PulseGenerator::new(PinMock::default(), DelayMock::default(), 10_u32.micros());
        let mut t = timer();

        gen.trigger(&mut t, micros(1)).unwrap();
        assert_eq!(
            gen.trigger(&mut t, micros(2)),
            Ok(Triggered::Skipped(Skip::CycleInFlight))
        );
        let (pin, _) = gen.release();
        assert_eq!(pin.levels, vec![false, true, false]);
    }

    #[test]
    fn pin_failure_resolves_cycle() {
        let pin = PinMock {
            broken: true,
            ..Default::default()
        };
        let mut gen = PulseGenerator::new(pin, DelayMock::default(), 10_u32.micros());
        let mut t = timer();

        assert_eq!(
            gen.trigger(&mut t, micros(1)),
            Err(TriggerError::Pin(ErrorKind::Other))
        );
        assert_eq!(t.outcome(), Outcome::Failed);
        assert!(t.is_idle());
    }
}
