#[cfg(feature = "log")]
mod inner {
    use std::collections::HashMap;
    use std::string::ToString;
    use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
    use colored::Colorize;

    lazy_static::lazy_static! {
        pub static ref LOGGER_COLORS: HashMap<Level, String> =  HashMap::from([
            (Level::Debug, "green".to_string()),
            (Level::Info, "blue".to_string()),
            (Level::Warn, "yellow".to_string()),
            (Level::Error, "red".to_string()),
        ]);
    }

    pub static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;
    pub struct ConsoleLogger;

    impl ConsoleLogger {
        /// Installs the console logger. `quiet` wins over any `debug` count but
        /// errors are still reported.
        pub fn install(quiet: bool, debug: u8) -> Result<(), SetLoggerError> {
            log::set_logger(&CONSOLE_LOGGER)?;
            log::set_max_level(level_filter(quiet, debug));
            Ok(())
        }
    }

    pub fn level_filter(quiet: bool, debug: u8) -> LevelFilter {
        if quiet {
            LevelFilter::Error
        } else {
            match debug {
                v if v >= 2 => LevelFilter::Debug,
                1 => LevelFilter::Info,
                _ => LevelFilter::Warn,
            }
        }
    }

    impl log::Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Debug && metadata.target().starts_with("wol_alias")
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                let level = format!("{:>7}", record.level());
                eprintln!(
                    "{}: {}",
                    match LOGGER_COLORS.get(&record.level()) {
                        Some(c) => level.color(&**c).to_string(),
                        None => level
                    },
                    record.args())
            }
        }

        fn flush(&self) {}
    }

}

#[cfg(feature = "log")]
pub use inner::{ConsoleLogger, CONSOLE_LOGGER, level_filter};

#[cfg(not(feature = "log"))]
mod dummy;
