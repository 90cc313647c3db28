//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: a compact console layer, an optional
//! rolling file layer written through a non-blocking worker, and an [`EnvFilter`] built
//! from the configured level, an explicit directive string, and `RUST_LOG`.
//!
//! Defaults follow the [`AppEnvironment`]: development logs at `DEBUG`, staging at `INFO`,
//! production at `INFO` with JSON output. Explicit builder calls always win.
//!
//! ## Example
//!
//! ```rust
//! # use bootkit_logger::{Logger, LevelFilter};
//! use bootkit_domain::AppEnvironment;
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .environment(AppEnvironment::Development)
//!     .level(LevelFilter::TRACE)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use bootkit_domain::AppEnvironment;
use bootkit_domain::config::LoggingConfig;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Values collected by [`LoggerBuilder`]; unset options fall back to environment defaults.
#[derive(Debug)]
struct LoggerSettings {
    console: bool,
    path: Option<PathBuf>,
    level: Option<LevelFilter>,
    rotation: Rotation,
    max_files: usize,
    json: Option<bool>,
    env_filter: Option<String>,
    environment: Option<AppEnvironment>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: None,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: None,
            env_filter: None,
            environment: None,
        }
    }
}

impl LoggerSettings {
    fn effective_level(&self) -> LevelFilter {
        self.level.unwrap_or(match self.environment {
            Some(AppEnvironment::Development) => LevelFilter::DEBUG,
            Some(AppEnvironment::Staging | AppEnvironment::Production) | None => LevelFilter::INFO,
        })
    }

    fn effective_json(&self) -> bool {
        self.json.unwrap_or(matches!(self.environment, Some(AppEnvironment::Production)))
    }
}

/// Marker: the builder has no name yet.
#[derive(Debug)]
pub struct NoName;

/// Marker: the builder carries the logger name.
#[derive(Debug)]
pub struct WithName(String);

/// Builder for the global subscriber; a name is required before [`LoggerBuilder::init`].
#[derive(Debug)]
pub struct LoggerBuilder<N = NoName> {
    settings: LoggerSettings,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Names the logger; the name prefixes rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()) }
    }
}

impl LoggerBuilder<WithName> {
    /// Picks level and format defaults for `environment`.
    #[must_use = "a logger builder does nothing until `init` is called"]
    pub const fn environment(mut self, environment: AppEnvironment) -> Self {
        self.settings.environment = Some(environment);
        self
    }

    #[must_use = "a logger builder does nothing until `init` is called"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = Some(level);
        self
    }

    /// Adds directives such as `app=debug,sqlx=warn`; `RUST_LOG` still applies on top.
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "a logger builder does nothing until `init` is called"]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.settings.env_filter = Some(filter.into());
        self
    }

    #[must_use = "a logger builder does nothing until `init` is called"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Writes rolling log files into `path`.
    #[must_use = "a logger builder does nothing until `init` is called"]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.path = Some(path.into());
        self
    }

    #[must_use = "a logger builder does nothing until `init` is called"]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "a logger builder does nothing until `init` is called"]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Emits JSON lines instead of the compact text format.
    #[must_use = "a logger builder does nothing until `init` is called"]
    pub const fn json(mut self) -> Self {
        self.settings.json = Some(true);
        self
    }

    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] holds the file worker guard; keep it alive until shutdown
    /// so buffered lines are flushed.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`, bad
    ///   filter directives, or when neither console nor file output is enabled.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name) } = self;
        validate(&settings, &name)?;

        let env_filter = build_env_filter(&settings)?;
        let json = settings.effective_json();

        let mut layers = Vec::new();
        if settings.console {
            let console = layer().with_ansi(!json);
            layers.push(if json { console.json().boxed() } else { console.compact().boxed() });
        }

        let guard = match settings.path {
            Some(path) => {
                fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Failed to create path: {}", path.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(path)
                    .context("Failed to build rolling file appender")?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;
        tracing::debug!(logger = %name, json, "Logger initialized");

        Ok(Logger { guard })
    }
}

/// Handle to the installed logging system; dropping it flushes the file worker.
#[must_use = "dropping the logger stops the file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring the global subscriber.
    #[must_use = "a logger builder does nothing until `init` is called"]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: NoName }
    }

    /// Installs the subscriber described by a `[logging]` config section.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an unknown level name, plus every error of
    /// [`LoggerBuilder::init`].
    pub fn from_config(
        name: impl Into<String>,
        config: &LoggingConfig,
        environment: AppEnvironment,
    ) -> Result<Self, LoggerError> {
        let mut builder = Self::builder()
            .name(name)
            .environment(environment)
            .console(config.console)
            .max_files(config.max_files);

        if let Some(level) = config.level.as_deref() {
            builder = builder.level(parse_level(level)?);
        }
        if let Some(filter) = &config.env_filter {
            builder = builder.env_filter(filter.clone());
        }
        if let Some(path) = &config.path {
            builder = builder.path(path.clone());
        }
        if config.json {
            builder = builder.json();
        }

        builder.init()
    }

    /// The file worker guard, when file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Unknown level '{level}': {e}").into(),
        context: Some("logging.level".into()),
    })
}

fn validate(settings: &LoggerSettings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.effective_level().into());
    settings.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
