// Diagnostics go through the `log` crate facade, but only when the
// `logging` feature is enabled. These wrappers keep call sites free of
// `cfg` clutter; without the feature they expand to an empty block and
// their arguments are never evaluated.
//
// Not every build exercises every level. Don't warn about it.
#![allow(unused_macros)]

macro_rules! error {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::error!($($args)*);
    }}
}

macro_rules! warn {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::warn!($($args)*);
    }}
}

macro_rules! info {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::info!($($args)*);
    }}
}

macro_rules! debug {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::debug!($($args)*);
    }}
}

macro_rules! trace {
    ($($args:tt)*) => {{
        #[cfg(feature = "logging")]
        log::trace!($($args)*);
    }}
}

/// A simple non-configurable logger that writes messages to stderr.
///
/// This is here so that programs (and tests) that want to see why a zone
/// lookup fell back to UTC don't need to pull in a logging implementation
/// of their own. Anything more elaborate should install a real `log`
/// backend instead.
#[cfg(all(feature = "std", feature = "logging"))]
#[derive(Debug)]
pub struct Logger(());

#[cfg(all(feature = "std", feature = "logging"))]
const LOGGER: &'static Logger = &Logger(());

#[cfg(all(feature = "std", feature = "logging"))]
impl Logger {
    /// Installs this logger as the global `log` handler.
    ///
    /// Returns an error if a logger has already been installed.
    pub fn init() -> Result<(), log::SetLoggerError> {
        log::set_logger(LOGGER)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }
}

#[cfg(all(feature = "std", feature = "logging"))]
impl log::Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        // Filtering is done by `log::set_max_level`.
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match (record.file(), record.line()) {
            (Some(file), Some(line)) => {
                std::eprintln!(
                    "{}|{}|{}:{}: {}",
                    record.level(),
                    record.target(),
                    file,
                    line,
                    record.args()
                );
            }
            (Some(file), None) => {
                std::eprintln!(
                    "{}|{}|{}: {}",
                    record.level(),
                    record.target(),
                    file,
                    record.args()
                );
            }
            _ => {
                std::eprintln!(
                    "{}|{}: {}",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {}
}
