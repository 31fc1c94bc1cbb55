use stm32f4xx_hal::gpio::{Output, PushPull, PD12, PD14};

/// Lit while sampling is enabled
pub type GreenLed = PD12<Output<PushPull>>;
/// Toggles on every echo edge
pub type RedLed = PD14<Output<PushPull>>;

pub trait Led {
    fn turn_on(&mut self);
    fn turn_off(&mut self);

    fn set(&mut self, on: bool) {
        if on {
            self.turn_on();
        } else {
            self.turn_off();
        }
    }
}

impl<const P: char, const N: u8> Led for stm32f4xx_hal::gpio::Pin<P, N, Output<PushPull>> {
    fn turn_on(&mut self) {
        self.set_high();
    }

    fn turn_off(&mut self) {
        self.set_low();
    }
}
