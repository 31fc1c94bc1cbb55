#![cfg_attr(not(test), no_std)]

pub mod calendar;
pub mod command;
pub mod config;
pub mod cycle;
pub mod distance;
pub mod echo_timer;
pub mod error;
pub mod guard;
pub mod pulse;
pub mod report;
pub mod sampler;
pub mod sonar;
pub mod time;

pub use calendar::{DateTime, WallClock};
pub use command::Command;
pub use config::Config;
pub use cycle::{CycleId, EchoEvent, Edge, Outcome, Resolved};
pub use distance::Centimeters;
pub use echo_timer::EchoTimer;
pub use guard::{DeadlineGuard, GuardHandle, GuardSlot, GuardState, TimeoutGuard};
pub use pulse::PulseGenerator;
pub use sampler::{Sampler, Tick};
pub use sonar::Sonar;
pub use time::{Duration, Instant};
