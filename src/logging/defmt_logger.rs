use core::sync::atomic::{AtomicUsize, Ordering};

use defmt::{debug, error, info, trace, warn, Display2Format};
use log::{Level, Metadata, Record};

pub(crate) struct DefmtLogger;

static DEFMT_LOGGER: DefmtLogger = DefmtLogger;
static LEVEL: AtomicUsize = AtomicUsize::new(Level::Info as usize);

pub(super) fn set_level(level: Level) {
    LEVEL.store(level as usize, Ordering::Relaxed);
}

pub(super) fn get_logger() -> &'static impl log::Log {
    &DEFMT_LOGGER
}

impl log::Log for DefmtLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() as usize <= LEVEL.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let args = Display2Format(record.args());
            match record.metadata().level() {
                Level::Trace => trace!("{}", args),
                Level::Debug => debug!("{}", args),
                Level::Info => info!("{}", args),
                Level::Warn => warn!("{}", args),
                Level::Error => error!("{}", args),
            }
        }
    }

    fn flush(&self) {}
}
