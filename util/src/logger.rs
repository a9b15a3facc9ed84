//! Logger setup for the traversability executables
//!
//! Records go to stdout and to the session log file, prefixed with the session time and a
//! coloured level tag. Noisy targets, such as the per-cell diagnostics of the filters, can be
//! capped to a lower verbosity than the rest of the log through [`LogParams::target_levels`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging parameters, normally loaded from `log.toml`.
///
/// Level names are those understood by `log`: `off`, `error`, `warn`, `info`, `debug` and
/// `trace`, in any case.
#[derive(Debug, Clone, Deserialize)]
pub struct LogParams {
    /// Most verbose level logged by any target. Must be at least `info`.
    pub min_level: String,

    /// Per-target caps, keyed by module path. A cap also applies to every submodule of the
    /// target.
    #[serde(default)]
    pub target_levels: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Unknown log level `{level}` for `{target}`")]
    UnknownLevel { target: String, level: String },

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LogParams {
    /// Parse the minimum level, rejecting anything less verbose than `info`.
    pub fn min_level(&self) -> Result<LevelFilter, LoggerInitError> {
        let level = parse_level("min_level", &self.min_level)?;

        if level < Level::Info {
            return Err(LoggerInitError::InvalidMinLogLevel(level));
        }

        Ok(level)
    }

    /// Parse the per-target caps.
    pub fn target_levels(&self) -> Result<Vec<(String, LevelFilter)>, LoggerInitError> {
        self.target_levels
            .iter()
            .map(|(target, level)| Ok((target.clone(), parse_level(target, level)?)))
            .collect()
    }
}

impl Default for LogParams {
    fn default() -> Self {
        Self {
            min_level: "info".into(),
            target_levels: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(params: &LogParams, session: &Session) -> Result<(), LoggerInitError> {
    let min_level = params.min_level()?;
    let target_levels = params.target_levels()?;

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    dispatch(min_level, &target_levels)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (target, level) in &target_levels {
        info!("    Log level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Build the dispatch filtering and formatting records, without any output.
pub fn dispatch(min_level: LevelFilter, target_levels: &[(String, LevelFilter)]) -> fern::Dispatch {
    let mut dispatch = fern::Dispatch::new()
        .format(format_record)
        .level(min_level);

    for (target, level) in target_levels {
        dispatch = dispatch.level_for(target.clone(), *level);
    }

    dispatch
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_level(target: &str, level: &str) -> Result<LevelFilter, LoggerInitError> {
    LevelFilter::from_str(level).map_err(|_| LoggerInitError::UnknownLevel {
        target: target.into(),
        level: level.into(),
    })
}

/// Prefix a record with the session time and level, and the target if debug or trace.
fn format_record(out: fern::FormatCallback, message: &fmt::Arguments, record: &Record) {
    if record.level() > Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level_to_str(record.level()),
            record.target(),
            message
        ))
    } else {
        out.finish(format_args!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level_to_str(record.level()),
            message
        ))
    }
}

/// Get the string representation of a log level
fn level_to_str(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use log::Metadata;
    use std::sync::mpsc;

    fn enabled(logger: &dyn log::Log, level: Level, target: &str) -> bool {
        logger.enabled(&Metadata::builder().level(level).target(target).build())
    }

    #[test]
    fn test_target_cap() {
        let params: LogParams = crate::params::from_str(
            r#"
            min_level = "trace"

            [target_levels]
            "trav_lib::filters::step" = "debug"
            "#,
        )
        .unwrap();

        let min_level = params.min_level().unwrap();
        let target_levels = params.target_levels().unwrap();
        assert_eq!(min_level, LevelFilter::Trace);
        assert_eq!(
            target_levels,
            vec![("trav_lib::filters::step".to_string(), LevelFilter::Debug)]
        );

        let (tx, _rx) = mpsc::channel::<String>();
        let (max_level, logger) = dispatch(min_level, &target_levels).chain(tx).into_log();
        assert_eq!(max_level, LevelFilter::Trace);

        // The capped target, and its submodules, drop trace records only
        assert!(!enabled(&*logger, Level::Trace, "trav_lib::filters::step"));
        assert!(!enabled(&*logger, Level::Trace, "trav_lib::filters::step::test"));
        assert!(enabled(&*logger, Level::Debug, "trav_lib::filters::step"));

        // Other targets keep the minimum level
        assert!(enabled(&*logger, Level::Trace, "trav_lib::filters::chain"));
        assert!(enabled(&*logger, Level::Trace, "trav_exec"));
    }

    #[test]
    fn test_invalid_levels() {
        let params = LogParams {
            min_level: "warn".into(),
            ..Default::default()
        };
        assert!(matches!(
            params.min_level(),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));

        let mut params = LogParams::default();
        params
            .target_levels
            .insert("trav_lib::filters::step".into(), "loud".into());
        match params.target_levels() {
            Err(LoggerInitError::UnknownLevel { target, level }) => {
                assert_eq!(target, "trav_lib::filters::step");
                assert_eq!(level, "loud");
            }
            other => panic!("Expected an unknown level error, got {:?}", other),
        }
    }

    #[test]
    fn test_level_tags() {
        assert!(level_to_str(Level::Info).to_string().contains("INF"));
        assert!(level_to_str(Level::Error).to_string().contains("ERR"));
    }
}
