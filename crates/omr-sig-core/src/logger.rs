//! Stderr logger for the resolution pipeline.
//!
//! Lines read `[elapsed LEVEL module] message`, where `module` is the last
//! path segment of the record target (`instant`, `stitch`, ...). Levels are
//! given as directives such as `info,stitch=debug`: a default level and
//! per-module overrides. Install once with [`init_with_directives`];
//! libraries only use the `log` macros.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LogDirectiveError {
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),
    #[error("empty module name in log directive `{0}`")]
    EmptyModule(String),
}

/// Default level plus per-module overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogDirectives {
    pub default: LevelFilter,
    pub modules: Vec<(String, LevelFilter)>,
}

impl LogDirectives {
    pub fn new(default: LevelFilter) -> Self {
        Self {
            default,
            modules: Vec::new(),
        }
    }

    /// Level applying to a record target; the last matching override wins.
    pub fn level_for(&self, module: &str) -> LevelFilter {
        self.modules
            .iter()
            .rev()
            .find(|(name, _)| name == module)
            .map_or(self.default, |(_, level)| *level)
    }

    fn max_level(&self) -> LevelFilter {
        self.modules
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

impl FromStr for LogDirectives {
    type Err = LogDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = |name: &str| {
            name.trim()
                .parse::<LevelFilter>()
                .map_err(|_| LogDirectiveError::UnknownLevel(name.trim().to_owned()))
        };
        let mut directives = LogDirectives::new(LevelFilter::Info);
        for part in s.split(',').filter(|p| !p.trim().is_empty()) {
            match part.split_once('=') {
                Some((module, value)) => {
                    let module = module.trim();
                    if module.is_empty() {
                        return Err(LogDirectiveError::EmptyModule(part.to_owned()));
                    }
                    directives.modules.push((module.to_owned(), level(value)?));
                }
                None => directives.default = level(part)?,
            }
        }
        Ok(directives)
    }
}

struct PipelineLogger {
    directives: LogDirectives,
    started: Instant,
}

fn module_of(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

impl Log for PipelineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.directives.level_for(module_of(metadata.target()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            module_of(record.target()),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<PipelineLogger> = OnceLock::new();

/// Install the pipeline logger. Later calls keep the first directives.
pub fn init_with_directives(directives: LogDirectives) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let max = directives.max_level();
    let logger = LOGGER.get_or_init(|| PipelineLogger {
        directives,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(max);
    Ok(())
}

/// Install the pipeline logger with a single level for every module.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    init_with_directives(LogDirectives::new(level))
}

/// Install a `tracing` subscriber. `RUST_LOG` wins over `default_filter`.
#[cfg(feature = "tracing")]
pub fn init_tracing(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_and_overrides() {
        let d: LogDirectives = "warn, stitch=debug,instant=trace".parse().unwrap();
        assert_eq!(d.default, LevelFilter::Warn);
        assert_eq!(d.level_for("stitch"), LevelFilter::Debug);
        assert_eq!(d.level_for("late"), LevelFilter::Warn);
        assert_eq!(d.max_level(), LevelFilter::Trace);
    }

    #[test]
    fn module_only_directives_keep_info_default() {
        let d: LogDirectives = "build=off".parse().unwrap();
        assert_eq!(d.default, LevelFilter::Info);
        assert_eq!(d.level_for("build"), LevelFilter::Off);
    }

    #[test]
    fn rejects_bad_directives() {
        assert_eq!(
            "loud".parse::<LogDirectives>(),
            Err(LogDirectiveError::UnknownLevel("loud".into()))
        );
        assert!(matches!(
            "=debug".parse::<LogDirectives>(),
            Err(LogDirectiveError::EmptyModule(_))
        ));
    }

    #[test]
    fn module_is_last_target_segment() {
        assert_eq!(module_of("omr_sig_slurs::stitch"), "stitch");
        assert_eq!(module_of("main"), "main");
    }

    #[test]
    fn second_install_is_a_no_op() {
        assert!(init_with_level(LevelFilter::Warn).is_ok());
        assert!(init_with_level(LevelFilter::Trace).is_ok());
    }
}
