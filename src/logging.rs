#[cfg(feature = "defmt_logger")]
pub mod defmt_logger;

#[cfg(feature = "serial_logger")]
pub mod serial_logger;

use core::sync::atomic::{AtomicUsize, Ordering};

pub use log::Level;
use log::{Metadata, Record};

struct LoggerType;

static LOGGER: LoggerType = LoggerType;
static LEVEL: AtomicUsize = AtomicUsize::new(Level::Info as usize);

/// Install the fan-out logger. Sinks are picked by cargo feature and must be
/// set up separately (`serial_logger::init`).
pub fn init(level: Level) {
    if log::set_logger(&LOGGER).is_err() {
        return;
    }
    log::set_max_level(level.to_level_filter());
    LEVEL.store(level as usize, Ordering::Relaxed);

    #[cfg(feature = "defmt_logger")]
    defmt_logger::set_level(level);

    #[cfg(feature = "serial_logger")]
    serial_logger::set_level(level);
}

impl log::Log for LoggerType {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() as usize <= LEVEL.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            #[cfg(feature = "defmt_logger")]
            {
                let logger = defmt_logger::get_logger();
                logger.log(record);
            }

            #[cfg(feature = "serial_logger")]
            {
                let logger = serial_logger::get_logger();
                logger.log(record);
            }
        }
    }

    fn flush(&self) {
        #[cfg(feature = "defmt_logger")]
        {
            let logger = defmt_logger::get_logger();
            logger.flush();
        }

        #[cfg(feature = "serial_logger")]
        {
            let logger = serial_logger::get_logger();
            logger.flush();
        }
    }
}
