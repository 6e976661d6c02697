//! Logging utilities and configuration for flight-guard.
//!
//! The library only emits `tracing` events and spans; installing a
//! subscriber is the caller's job. [`setup::init_logging`] is a convenience
//! for binaries and tests that want the crate's default formatting.
//!
//! Every analyzer logs one `info` event with its finding count. The
//! [`LogConfig`] knobs add per-query and per-finding `debug` events on top.

/// Verbosity knobs for the analyzers.
///
/// The defaults keep analyzer SQL and individual findings out of the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log the SQL each analyzer executes.
    pub log_queries: bool,
    /// Log every finding instead of just the count.
    pub log_findings: bool,
    /// Longest logged field value; longer values are cut.
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_queries: false,
            log_findings: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs queries and findings in full.
    pub fn verbose() -> Self {
        Self {
            log_queries: true,
            log_findings: true,
            max_field_length: 4096,
        }
    }

    /// Logs findings but not queries. Useful when auditing a single run.
    pub fn findings_only() -> Self {
        Self {
            log_findings: true,
            ..Self::default()
        }
    }
}

/// Logs an analyzer query at debug level when query logging is enabled.
#[macro_export]
macro_rules! log_query {
    ($config:expr, $analyzer:expr, $sql:expr) => {
        if $config.log_queries {
            tracing::debug!(
                analyzer = $analyzer,
                sql = %$crate::logging::truncate_field($sql, $config.max_field_length),
                "Executing analyzer query"
            );
        }
    };
}

/// Logs an individual finding at debug level when finding logging is enabled.
#[macro_export]
macro_rules! log_finding {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_findings {
            tracing::debug!($($arg)*);
        }
    };
}

/// Cuts `value` to at most `max_length` bytes on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber installation.
pub mod setup {
    use tracing::Level;

    /// Output format of the installed subscriber.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum LogFormat {
        /// Multi-line, human oriented.
        Pretty,
        /// One line per event.
        #[default]
        Compact,
        /// Newline-delimited JSON, for log shippers.
        Json,
    }

    /// Subscriber settings.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for everything outside flight-guard.
        pub default_level: Level,
        /// Level for `flight_guard` targets.
        pub crate_level: Level,
        pub format: LogFormat,
        /// Include event targets (module paths) in the output.
        pub with_target: bool,
        /// Raw `EnvFilter` directives; replaces the two levels when set.
        pub directives: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                default_level: Level::WARN,
                crate_level: Level::INFO,
                format: LogFormat::Compact,
                with_target: false,
                directives: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output with `info` for the crate.
        pub fn production() -> Self {
            Self {
                format: LogFormat::Json,
                with_target: true,
                ..Self::default()
            }
        }

        /// Pretty output with `debug` for the crate.
        pub fn development() -> Self {
            Self {
                default_level: Level::INFO,
                crate_level: Level::DEBUG,
                format: LogFormat::Pretty,
                with_target: true,
                directives: None,
            }
        }

        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        pub fn with_format(mut self, format: LogFormat) -> Self {
            self.format = format;
            self
        }

        pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
            self.directives = Some(directives.into());
            self
        }

        /// Returns the `EnvFilter` directives this configuration installs.
        pub fn filter_directives(&self) -> String {
            match &self.directives {
                Some(directives) => directives.clone(),
                None => format!(
                    "{},flight_guard={}",
                    self.default_level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// `RUST_LOG` wins over the configured directives when set. Fails if a
    /// global subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use flight_guard::logging::setup::{init_logging, LogFormat, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_format(LogFormat::Json)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.filter_directives()))?;

        let layer = tracing_subscriber::fmt::layer().with_target(config.with_target);
        let layer = match config.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()?;
        Ok(())
    }
}
