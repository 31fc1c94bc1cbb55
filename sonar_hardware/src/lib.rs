#![no_std]

use stm32f4xx_hal::{
    pac::{CorePeripherals, Peripherals},
    prelude::*,
    rtc::Rtc,
    serial::Serial,
    timer::SysDelay,
};

pub mod guard_timer;
pub mod led;
pub mod rtc;
pub mod serial;
pub mod ultrasonic;

use guard_timer::GuardTimer;
use led::{GreenLed, RedLed};
use rtc::RtcClock;
use serial::{ConsoleRx, ConsoleTx, DebugSerialPort};
use ultrasonic::{EchoPin, TriggerPin};

pub const CONSOLE_BAUD: u32 = 38_400;
pub const DEBUG_BAUD: u32 = 115_200;

pub struct SonarHardware {
    /// Input clock of TIM2, needed to start the monotonic
    pub mono_clock_hz: u32,
    pub delay: SysDelay,
    pub sampling_led: GreenLed,
    pub echo_led: RedLed,

    pub console_tx: ConsoleTx,
    pub console_rx: ConsoleRx,
    pub dbg_serial: DebugSerialPort,

    pub trigger: TriggerPin,
    pub echo: EchoPin,
    pub guard: GuardTimer,
    pub clock: RtcClock,
}

impl SonarHardware {
    pub fn init(mut pac: Peripherals, core: CorePeripherals) -> Self {
        let mut syscfg = pac.SYSCFG.constrain();

        let rcc = pac.RCC.constrain();
        let clocks = rcc.cfgr.sysclk(168.MHz()).freeze();
        let delay = core.SYST.delay(&clocks);

        let gpioa = pac.GPIOA.split();
        let gpiob = pac.GPIOB.split();
        let gpiod = pac.GPIOD.split();

        // Status LED's
        let sampling_led = gpiod.pd12.into_push_pull_output();
        let echo_led = gpiod.pd14.into_push_pull_output();

        let tx_pin = gpioa.pa2.into_alternate();
        let rx_pin = gpioa.pa3.into_alternate();
        let mut console = Serial::new(
            pac.USART2,
            (tx_pin, rx_pin),
            CONSOLE_BAUD.bps(),
            &clocks,
        )
        .unwrap();
        console.listen(stm32f4xx_hal::serial::Event::RxNotEmpty);
        let (console_tx, console_rx) = console.split();

        let debug_tx_pin = gpioa.pa9.into_alternate();
        let dbg_serial = pac
            .USART1
            .tx(debug_tx_pin, DEBUG_BAUD.bps(), &clocks)
            .unwrap();

        let mut trigger = gpiob.pb11.into_push_pull_output();
        trigger.set_low();
        let echo_pin = gpiob.pb10.into_pull_down_input();
        let echo = EchoPin::new(echo_pin, &mut syscfg, &mut pac.EXTI);

        let guard = GuardTimer::new(pac.TIM5.counter_us(&clocks));

        let clock = RtcClock::new(Rtc::new_lsi(pac.RTC, &mut pac.PWR));

        Self {
            mono_clock_hz: clocks.timclk1().raw(),
            delay,
            sampling_led,
            echo_led,
            console_tx,
            console_rx,
            dbg_serial,
            trigger,
            echo,
            guard,
            clock,
        }
    }
}
