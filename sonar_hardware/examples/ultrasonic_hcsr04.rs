#![no_main]
#![no_std]

//! Busy-polling HC-SR04 bring-up check: no interrupts, no RTIC.
//! Trigger on PB11, echo on PB10, output over semihosting.

use core::fmt::Write;

use panic_halt as _;

use cortex_m_rt::entry;
use cortex_m_semihosting::hio;
use fugit::ExtU32;
use stm32f4xx_hal::{pac, prelude::*};

use sonar_core::{
    report::Reading, Command, Config, DeadlineGuard, EchoEvent, Instant, Sampler, Sonar,
};

const CLOCK_RELOAD_US: u32 = 4_000_000_000;

/// 64 bit microseconds from a 32 bit counter that reloads every
/// `CLOCK_RELOAD_US`. Must be updated at least once per reload.
#[derive(Default)]
struct Uptime {
    last: u32,
    total: u64,
}

impl Uptime {
    fn update(&mut self, ticks: u32) -> Instant {
        let elapsed = if ticks >= self.last {
            ticks - self.last
        } else {
            CLOCK_RELOAD_US - self.last + ticks
        };
        self.last = ticks;
        self.total += elapsed as u64;
        Instant::from_ticks(self.total)
    }
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().expect("Failed to get device periph");
    let cp = cortex_m::peripheral::Peripherals::take().expect("Failed to get core periph");

    let mut stdout = hio::hstdout().map_err(|_| core::fmt::Error).unwrap();

    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(8.MHz()).sysclk(168.MHz()).freeze();
    let delay = cp.SYST.delay(&clocks);

    let gpiob = dp.GPIOB.split();
    let trigger = gpiob.pb11.into_push_pull_output();
    let echo = gpiob.pb10.into_pull_down_input();

    // Free running microsecond clock, widened so it survives the reload
    let mut clock = dp.TIM5.counter_us(&clocks);
    clock.start(CLOCK_RELOAD_US.micros()).unwrap();
    let mut uptime = Uptime::default();
    let mut now = |c: &stm32f4xx_hal::timer::CounterUs<pac::TIM5>| uptime.update(c.now().ticks());

    let config = Config::default();
    let mut sonar = Sonar::new(trigger, delay, DeadlineGuard::new(), &config);
    let mut sampler = Sampler::new();
    sampler.apply(Command::Start);

    let mut last_level = echo.is_high();
    let mut next_tick = now(&clock);

    loop {
        let t = now(&clock);

        let level = echo.is_high();
        if level != last_level {
            let event = if level {
                EchoEvent::rising(t)
            } else {
                EchoEvent::falling(t)
            };
            sonar.on_edge(event);
            last_level = level;
        }
        sonar.service_guard(t);

        if t >= next_tick {
            let tick = sampler.tick(&mut sonar, t);
            if let Some(reading) = tick.resolved.and_then(|r| Reading::from_outcome(r.outcome)) {
                writeln!(stdout, "{}", reading).unwrap();
            }
            next_tick = t + config.sample_period;
        }
    }
}
