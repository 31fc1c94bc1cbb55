use stm32f4xx_hal::{
    gpio::{Edge as ExtiEdge, ExtiPin, Input, Output, Pin, PushPull},
    pac::EXTI,
    syscfg::SysCfg,
};

use sonar_core::Edge;

pub type TriggerPin = Pin<'B', 11, Output<PushPull>>;
type RawEchoPin = Pin<'B', 10, Input>;

/// HC-SR04 echo line, interrupting on both edges
pub struct EchoPin {
    pin: RawEchoPin,
}

impl EchoPin {
    pub fn new(mut pin: RawEchoPin, syscfg: &mut SysCfg, exti: &mut EXTI) -> Self {
        pin.make_interrupt_source(syscfg);
        pin.trigger_on_edge(exti, ExtiEdge::RisingFalling);
        pin.enable_interrupt(exti);
        Self { pin }
    }

    /// Acknowledge the EXTI line and report which way it moved. The level is
    /// sampled right after the interrupt, so a high line means a rising edge.
    pub fn take_edge(&mut self) -> Edge {
        self.pin.clear_interrupt_pending_bit();
        if self.pin.is_high() {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }

    pub fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
