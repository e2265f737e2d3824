use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, Metadata, Record};

/// Track whether the logger has been initialized to avoid double
/// initialization errors.
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        #[cfg(debug_assertions)]
        {
            metadata.level() <= Level::Debug
        }
        #[cfg(not(debug_assertions))]
        {
            metadata.level() <= Level::Info
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}][{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Initialize the global logger.
///
/// Idempotent - calling it multiple times is safe and simply returns
/// Ok(()) if the logger is already installed.
///
/// Log levels:
/// - Debug builds: DEBUG and above
/// - Release builds: INFO and above
pub fn init_logger() -> anyhow::Result<()> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Ok(());
    }

    #[cfg(debug_assertions)]
    let level = log::LevelFilter::Debug;
    #[cfg(not(debug_assertions))]
    let level = log::LevelFilter::Info;

    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .map_err(|e| {
            // Reset the flag if installation failed (another logger won).
            LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
            anyhow::anyhow!("Logger init failed: {}", e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_idempotent() {
        let first = init_logger();
        let second = init_logger();
        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
