//! Logger set-up shared by the binary and by anyone embedding the crate.
use crate::Microkinetics::errors::DeckError;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Parses `"info"`, `"debug"`, ... case-insensitively.
pub fn parse_level(level: &str) -> Result<LevelFilter, DeckError> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| DeckError::Config(format!("unknown log level '{}'", level)))
}

/// Terminal logger at `level`, plus a plain-text copy in `log_file` when given.
/// Calling it again once a logger is installed is a no-op.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), DeckError> {
    let term_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        term_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| DeckError::io(path, e))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    // a logger is already installed (tests, embedding application)
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn levels_parse() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("WARN").unwrap(), LevelFilter::Warn);
        assert!(matches!(parse_level("loud"), Err(DeckError::Config(_))));
    }

    #[test]
    fn repeated_init_is_tolerated() {
        let dir = tempdir().unwrap();
        let log_file = dir.path().join("mkm.log");
        init_logging(LevelFilter::Info, Some(&log_file)).unwrap();
        init_logging(LevelFilter::Debug, None).unwrap();
        assert!(log_file.exists());
    }

    #[test]
    fn unwritable_log_file_is_io_error() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("missing").join("mkm.log");
        assert!(matches!(
            init_logging(LevelFilter::Info, Some(&bad)),
            Err(DeckError::Io { .. })
        ));
    }
}
