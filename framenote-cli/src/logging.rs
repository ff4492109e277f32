// ============================================================================
// framenote-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger Setup and Helpers
//
// The core library logs through the `log` facade; this module installs an
// env_logger backend with a compact coloured format on stderr, keeping stdout
// free for session output and JSON.
//
// USAGE:
// - default: warnings and errors only
// - --verbose: debug output, including the exact ffmpeg/ffprobe commands
// - RUST_LOG=<filter>: honoured when --verbose is not given

use std::io::{IsTerminal, Write};

use log::LevelFilter;
use owo_colors::OwoColorize;

use crate::terminal::should_use_color;

/// Picks the log level from the verbosity flag.
pub fn level_for(verbose: bool) -> Option<LevelFilter> {
    verbose.then_some(LevelFilter::Debug)
}

/// Initializes the logger.
///
/// With `Some(level)` that level applies to every module. With `None` the
/// `RUST_LOG` filter is used, falling back to `warn`.
pub fn init_with_level(level: Option<LevelFilter>) {
    let mut builder = match level {
        Some(level) => {
            let mut builder = env_logger::Builder::new();
            builder.filter(None, level);
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")),
    };

    let color = should_use_color() && std::io::stderr().is_terminal();
    builder.format(move |buf, record| {
        let level_str = match record.level() {
            log::Level::Error => "ERROR",
            log::Level::Warn => "WARN ",
            log::Level::Info => "INFO ",
            log::Level::Debug => "DEBUG",
            log::Level::Trace => "TRACE",
        };
        let level_colored = if color {
            match record.level() {
                log::Level::Error => level_str.bright_red().to_string(),
                log::Level::Warn => level_str.yellow().to_string(),
                log::Level::Info => level_str.green().to_string(),
                log::Level::Debug => level_str.blue().to_string(),
                log::Level::Trace => level_str.magenta().to_string(),
            }
        } else {
            level_str.to_string()
        };

        writeln!(
            buf,
            "{} {} {}",
            buf.timestamp_seconds(),
            level_colored,
            record.args()
        )
    });

    // A second initialisation (e.g. from tests) keeps the first logger.
    if builder.try_init().is_ok() {
        log::debug!("Logger initialized with level: {:?}", level);
    }
}
