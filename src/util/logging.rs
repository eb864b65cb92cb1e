use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

static LOGGER_CONFIG: once_cell::sync::Lazy<RwLock<LoggingConfig>> =
    once_cell::sync::Lazy::new(|| RwLock::new(LoggingConfig::default()));

#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub enum LogLevel {
    INFO,
    VERBOSE,
}

#[macro_export]
macro_rules! logln {
    ($fmt:literal) => {
        if $crate::util::logging::is_enabled(Self::CC) {
            println!("[{}][{}:{}] {}", $crate::util::logging::timestamp(), file!(), line!(), $fmt);
        }
    };
    ($fmt:literal, $($arg:tt)*) => {
        if $crate::util::logging::is_enabled(Self::CC) {
            print!("[{}][{}:{}] ", $crate::util::logging::timestamp(), file!(), line!());
            println!($fmt, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! logvbln {
    ($fmt:literal) => {
        if $crate::util::logging::is_enabled(Self::CC) && $crate::util::logging::is_at_level(Self::CC, $crate::util::logging::LogLevel::VERBOSE) {
            println!("[{}][{}:{}] {}", $crate::util::logging::timestamp(), file!(), line!(), $fmt);
        }
    };
    ($fmt:literal, $($arg:tt)*) => {
        if $crate::util::logging::is_enabled(Self::CC) && $crate::util::logging::is_at_level(Self::CC, $crate::util::logging::LogLevel::VERBOSE) {
            print!("[{}][{}:{}] ", $crate::util::logging::timestamp(), file!(), line!());
            println!($fmt, $($arg)*);
        }
    };
}

pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn is_enabled(cc: &'static str) -> bool {
    LOGGER_CONFIG
        .read()
        .map(|config| config.cc_enabled(cc))
        .unwrap_or(false)
}

pub fn is_at_level(cc: &'static str, level: LogLevel) -> bool {
    LOGGER_CONFIG
        .read()
        .map(|config| config.cc_at_level(cc, level))
        .unwrap_or(false)
}

fn with_config<F: FnOnce(&mut LoggingConfig)>(f: F) {
    if let Ok(mut config) = LOGGER_CONFIG.write() {
        f(&mut config);
    }
}

pub fn disable_cc(cc: &'static str) {
    with_config(|config| config.disable_cc(cc));
}

pub fn enable_cc(cc: &'static str, level: LogLevel) {
    with_config(|config| config.enable_cc(cc, level));
}

pub fn set_global_logging(enabled: bool) {
    with_config(|config| config.global_tracing_enabled = enabled);
}

pub fn set_global_level(level: LogLevel) {
    with_config(|config| config.global_level = level);
}

pub struct LoggingConfig {
    global_tracing_enabled: bool,
    global_level: LogLevel,
    flags: HashMap<&'static str, (bool, LogLevel)>, // <component, (enabled, level)>
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_tracing_enabled: true,
            global_level: LogLevel::INFO,
            flags: Default::default(),
        }
    }
}

impl LoggingConfig {
    pub fn cc_enabled(&self, cc: &str) -> bool {
        if !self.global_tracing_enabled {
            return false;
        }

        self.flags.get(cc).unwrap_or(&(true, LogLevel::INFO)).0
    }

    pub fn cc_at_level(&self, cc: &str, level: LogLevel) -> bool {
        if self.global_level >= level {
            return true;
        }

        self.flags.get(cc).unwrap_or(&(true, LogLevel::INFO)).1 >= level
    }

    pub fn enable_cc(&mut self, cc: &'static str, level: LogLevel) {
        self.flags.insert(cc, (true, level));
    }

    pub fn disable_cc(&mut self, cc: &'static str) {
        self.flags.insert(cc, (false, LogLevel::INFO));
    }
}
