use fugit::{TimerDurationU64, TimerInstantU64};

/// Monotonic tick rate shared by edge timestamps and the guard, 1 tick = 1us
pub const TICK_HZ: u32 = 1_000_000;

pub type Instant = TimerInstantU64<TICK_HZ>;
pub type Duration = TimerDurationU64<TICK_HZ>;

pub fn micros(us: u64) -> Instant {
    Instant::from_ticks(us)
}
