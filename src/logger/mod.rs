//! Logger Module
//!
//! Built on `tracing-subscriber` with:
//! - Console output with color control
//! - File output in Full, Compact or JSON format
//! - Size-based file rotation

pub mod config;
pub(crate) mod writer;

pub use config::*;

use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use writer::RotatingFileWriter;

/// Initialize the global subscriber with the given configuration
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let use_ansi = config.console.colored && std::io::stdout().is_terminal();

    let console_layer = config.console.enabled.then(|| {
        fmt::layer()
            .with_ansi(use_ansi)
            .with_target(true)
            .with_level(true)
    });

    let file_writer = if config.file.enabled {
        Some(RotatingFileWriter::new(&config.file)?)
    } else {
        None
    };

    // The file layer is registered before the console layer so that ANSI escapes
    // from span field formatting never reach the file.
    let (full, compact, json) = match (file_writer, config.file.format) {
        (Some(writer), LogFormat::Full) => (
            Some(fmt::layer().with_ansi(false).with_target(true).with_writer(writer)),
            None,
            None,
        ),
        (Some(writer), LogFormat::Compact) => (
            None,
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            ),
            None,
        ),
        (Some(writer), LogFormat::Json) => (
            None,
            None,
            Some(fmt::layer().with_ansi(false).json().with_writer(writer)),
        ),
        (None, _) => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(full)
        .with(compact)
        .with(json)
        .with(console_layer)
        .try_init()?;

    Ok(())
}
