//! Echo timeout on TIM5.
//!
//! TIM5 is 32 bit, so a 1MHz counter covers the whole guard budget range
//! without prescaler games. The counter runs periodic by default, the
//! interrupt handler cancels it to get one-shot behaviour.

use fugit::MicrosDurationU32;
use stm32f4xx_hal::{
    pac::TIM5,
    ClearFlags, Listen,
    timer::{CounterUs, Event, Flag},
};

use sonar_core::{
    error::GuardError,
    guard::{GuardHandle, GuardSlot, TimeoutGuard},
    Duration, Instant,
};

pub struct GuardTimer {
    counter: CounterUs<TIM5>,
    slot: GuardSlot,
    deadline: Instant,
    expired: Option<GuardHandle>,
}

impl GuardTimer {
    pub fn new(mut counter: CounterUs<TIM5>) -> Self {
        counter.listen(Event::Update);
        Self {
            counter,
            slot: GuardSlot::new(),
            deadline: Instant::from_ticks(0),
            expired: None,
        }
    }

    /// Call from the TIM5 interrupt, then hand the expiry over through
    /// `poll_expired`. A guard cancelled while its interrupt was already
    /// pending yields nothing.
    pub fn on_interrupt(&mut self) {
        self.counter.clear_flags(Flag::Update);
        self.counter.cancel().ok();
        if let Some(handle) = self.slot.fire() {
            self.expired = Some(handle);
        }
    }
}

impl TimeoutGuard for GuardTimer {
    fn arm(
        &mut self,
        handle: GuardHandle,
        armed_at: Instant,
        budget: Duration,
    ) -> Result<(), GuardError> {
        self.slot.arm(handle)?;
        self.expired = None;
        self.deadline = armed_at + budget;
        let budget = MicrosDurationU32::from_ticks(budget.to_micros() as u32);
        if let Err(e) = self.counter.start(budget) {
            log::error!("guard timer start failed: {:?}", e);
            self.slot.cancel(handle);
            return Err(GuardError::TimerUnavailable);
        }
        Ok(())
    }

    fn cancel(&mut self, handle: GuardHandle) {
        if self.slot.cancel(handle) {
            self.counter.cancel().ok();
            self.counter.clear_flags(Flag::Update);
        }
    }

    /// An echo edge can be serviced ahead of a TIM5 interrupt that is
    /// already due, so an overdue deadline counts as fired even before the
    /// interrupt has run.
    fn poll_expired(&mut self, now: Instant) -> Option<(GuardHandle, Instant)> {
        if self.expired.is_none() && now >= self.deadline {
            if let Some(handle) = self.slot.fire() {
                self.counter.cancel().ok();
                self.counter.clear_flags(Flag::Update);
                self.expired = Some(handle);
            }
        }
        self.expired.take().map(|h| (h, self.deadline))
    }
}
