use core::cell::RefCell;
use core::fmt::Write;
use core::sync::atomic::{AtomicUsize, Ordering};

use critical_section::Mutex;
use log::{Level, Metadata, Record};
use sonar_hardware::serial::DebugSerialPort;

pub type LoggerType = DebugSerialPort;

pub(crate) struct SerialLogger;

static SERIAL_LOGGER: SerialLogger = SerialLogger;
static PORT: Mutex<RefCell<Option<LoggerType>>> = Mutex::new(RefCell::new(None));
static LEVEL: AtomicUsize = AtomicUsize::new(Level::Info as usize);

pub fn init(port: LoggerType) {
    critical_section::with(|cs| {
        PORT.borrow_ref_mut(cs).replace(port);
    });
}

pub(super) fn set_level(level: Level) {
    LEVEL.store(level as usize, Ordering::Relaxed);
}

pub(super) fn get_logger() -> &'static impl log::Log {
    &SERIAL_LOGGER
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() as usize <= LEVEL.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = match record.metadata().level() {
                Level::Trace => "trace",
                Level::Debug => "debug",
                Level::Info => "info",
                Level::Warn => "warn",
                Level::Error => "error",
            };

            // Borrow the port for the write so interrupts stay enabled while
            // the bytes go out. A line logged while it is lent out is dropped.
            let Some(mut tx) = critical_section::with(|cs| PORT.borrow_ref_mut(cs).take()) else {
                return;
            };
            write!(tx, "{}: {}\r\n", level, record.args()).ok();
            critical_section::with(|cs| {
                PORT.borrow_ref_mut(cs).replace(tx);
            });
        }
    }

    fn flush(&self) {}
}
