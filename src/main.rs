#![no_std]
#![no_main]

mod logging;

#[cfg(feature = "defmt_logger")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(not(feature = "defmt_logger"))]
use panic_halt as _;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

const COMMAND_CAPACITY: usize = 8;

#[rtic::app(device = stm32f4xx_hal::pac, dispatchers = [SPI1])]
mod app {
    use super::*;

    use core::fmt::Write;

    use log::{debug, error, info, warn};
    use rtic_monotonics::{stm32::Tim2 as Mono, Monotonic};
    use rtic_sync::{
        channel::{Receiver, Sender},
        make_channel,
    };
    use stm32f4xx_hal::{nb, prelude::_embedded_hal_serial_nb_Read, timer::SysDelay};

    use sonar_core::{
        calendar::INITIAL_DATETIME,
        command::BANNER,
        cycle::Resolved,
        report::{Reading, Report},
        Command, Config, EchoEvent, Instant, Sampler, Sonar, WallClock,
    };
    use sonar_hardware::{
        guard_timer::GuardTimer,
        led::{GreenLed, Led, RedLed},
        rtc::RtcClock,
        serial::{ConsoleRx, ConsoleTx},
        ultrasonic::{EchoPin, TriggerPin},
        SonarHardware,
    };

    #[shared]
    struct Shared {
        sonar: Sonar<TriggerPin, SysDelay, GuardTimer>,
    }

    #[local]
    struct Local {
        echo: EchoPin,
        echo_led: RedLed,
        sampling_led: GreenLed,
        console_rx: ConsoleRx,
        console_tx: ConsoleTx,
        clock: RtcClock,
        sampler: Sampler,
        config: Config,
        cmd_tx: Sender<'static, u8, COMMAND_CAPACITY>,
        cmd_rx: Receiver<'static, u8, COMMAND_CAPACITY>,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let hw = SonarHardware::init(ctx.device, ctx.core);

        #[cfg(feature = "serial_logger")]
        logging::serial_logger::init(hw.dbg_serial);
        #[cfg(not(feature = "serial_logger"))]
        let _ = hw.dbg_serial;
        logging::init(logging::Level::Info);

        info!("{} v{}", NAME, VERSION);

        let token = rtic_monotonics::create_stm32_tim2_monotonic_token!();
        Mono::start(hw.mono_clock_hz, token);

        let mut clock = hw.clock;
        if let Err(e) = clock.set_current_time(INITIAL_DATETIME) {
            error!("failed to set the clock: {}", e);
        }

        let config = Config::default();
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                error!("bad config ({}), using defaults", e);
                Config::default()
            }
        };

        let sonar = Sonar::new(hw.trigger, hw.delay, hw.guard, &config);

        let mut console_tx = hw.console_tx;
        write!(console_tx, "{}\r\n", BANNER).ok();

        let (cmd_tx, cmd_rx) = make_channel!(u8, COMMAND_CAPACITY);

        sample::spawn().ok();

        (
            Shared { sonar },
            Local {
                echo: hw.echo,
                echo_led: hw.echo_led,
                sampling_led: hw.sampling_led,
                console_rx: hw.console_rx,
                console_tx,
                clock,
                sampler: Sampler::new(),
                config,
                cmd_tx,
                cmd_rx,
            },
        )
    }

    #[task(priority = 3, binds = EXTI15_10, shared = [sonar], local = [echo, echo_led])]
    fn echo_line(mut ctx: echo_line::Context) {
        // Timestamp before the lock, the sampler may be holding it
        let now = Mono::now();
        let edge = ctx.local.echo.take_edge();
        ctx.local.echo_led.toggle();

        let effect = ctx
            .shared
            .sonar
            .lock(|sonar| sonar.on_edge(EchoEvent { edge, at: now }));
        debug!("{:?} edge: {:?}", edge, effect);
    }

    #[task(priority = 3, binds = TIM5, shared = [sonar])]
    fn echo_timeout(mut ctx: echo_timeout::Context) {
        let now = Mono::now();
        ctx.shared.sonar.lock(|sonar| {
            sonar.guard_mut().on_interrupt();
            sonar.service_guard(now);
        });
    }

    #[task(priority = 2, binds = USART2, local = [console_rx, cmd_tx])]
    fn usart2(ctx: usart2::Context) {
        match ctx.local.console_rx.read() {
            Ok(b) => {
                if ctx.local.cmd_tx.try_send(b).is_err() {
                    warn!("command queue full, dropped {:02x}", b);
                }
            }
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => error!("uart fail: {:?}", e),
        }
    }

    #[task(
        priority = 1,
        shared = [sonar],
        local = [sampler, config, clock, console_tx, sampling_led, cmd_rx]
    )]
    async fn sample(mut ctx: sample::Context) {
        let period = ctx.local.config.sample_period;
        let mut next = Mono::now() + period;

        loop {
            // Answer commands as they come in until the next period boundary
            while let Ok(received) = Mono::timeout_at(next, ctx.local.cmd_rx.recv()).await {
                match received {
                    Ok(b) => {
                        let Some(cmd) = Command::from_byte(b) else {
                            continue;
                        };
                        let ack = ctx.local.sampler.apply(cmd);
                        write!(ctx.local.console_tx, "{}\r\n", ack).ok();
                        ctx.local.sampling_led.set(ctx.local.sampler.is_enabled());
                    }
                    Err(_) => {
                        error!("command channel closed");
                        Mono::delay_until(next).await;
                        break;
                    }
                }
            }

            let now: Instant = Mono::now();
            let sampler = &mut *ctx.local.sampler;
            let tick = ctx.shared.sonar.lock(|sonar| sampler.tick(sonar, now));

            if let Some(resolved) = tick.resolved {
                info!("cycle {}: {:?}", resolved.cycle.raw(), resolved.outcome);
                report(resolved, ctx.local.clock, ctx.local.console_tx);
            }

            next += period;
        }
    }

    fn report(resolved: Resolved, clock: &mut RtcClock, tx: &mut ConsoleTx) {
        let Some(reading) = Reading::from_outcome(resolved.outcome) else {
            return;
        };

        let when = match clock.current_time() {
            Ok(t) => t,
            Err(e) => {
                error!("clock read failed: {}", e);
                return;
            }
        };

        match Report::new(when, reading) {
            Ok(line) => {
                if write!(tx, "{}\r\n", line).is_err() {
                    warn!("report for cycle {} not sent", resolved.cycle.raw());
                }
            }
            Err(e) => error!("cycle {}: {}", resolved.cycle.raw(), e),
        }
    }
}
