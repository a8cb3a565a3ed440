//! Logger setup.
//!
//! The crate logs through the `log` facade. On wasm32 records go to the
//! browser console; elsewhere `env_logger` writes them to stderr.

use std::sync::Once;

/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "cube_lighting=debug"). On wasm32 only `level` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: log::LevelFilter,
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: log::LevelFilter::Info,
            env_filter: None,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        install(config);
        log::debug!("logging initialized");
    });
}

#[cfg(target_arch = "wasm32")]
fn install(config: LoggingConfig) {
    if log::set_logger(&console::CONSOLE_LOGGER).is_ok() {
        log::set_max_level(config.level);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn install(config: LoggingConfig) {
    let mut builder = env_logger::Builder::new();
    if let Some(filter) = config.env_filter {
        builder.parse_filters(&filter);
    } else if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(config.level);
    }
    // Another logger (e.g. a test harness) may already be installed.
    let _ = builder.try_init();
}

#[cfg(target_arch = "wasm32")]
mod console {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = log)]
        fn log_str(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        fn warn_str(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = error)]
        fn error_str(s: &str);
    }

    pub(super) struct ConsoleLogger;

    pub(super) static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

    impl log::Log for ConsoleLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &log::Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            match record.level() {
                log::Level::Error => error_str(&line),
                log::Level::Warn => warn_str(&line),
                _ => log_str(&line),
            }
        }

        fn flush(&self) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig {
            level: log::LevelFilter::Trace,
            env_filter: Some("warn".into()),
        });
        log::info!("still usable after repeated init");
    }
}
