//! Error types for the flight-guard anomaly engine.
//!
//! All fallible operations in the crate return [`GuardError`]. The two error
//! classes that callers usually branch on are [`GuardError::Input`] (the
//! dataset is absent or malformed) and [`GuardError::Configuration`] (the
//! analysis configuration is invalid). Both abort a run before any report is
//! produced.

use thiserror::Error;

/// The main error type for the flight-guard library.
#[derive(Error, Debug)]
pub enum GuardError {
    /// One of the input collections is absent or malformed.
    #[error("Input error in '{table}': {message}")]
    Input {
        /// Logical table the problem was found in (airports, airlines, routes)
        table: String,
        /// Detailed error message
        message: String,
    },

    /// Error related to the analysis configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An analyzer failed while the engine was running it.
    #[error("Analyzer '{analyzer}' failed: {source}")]
    AnalyzerFailed {
        /// Name of the analyzer that failed
        analyzer: String,
        /// The underlying failure
        #[source]
        source: Box<GuardError>,
    },

    /// The run was cancelled before all analyzers completed.
    #[error("Analysis run cancelled")]
    Cancelled,

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error reading or writing the run history.
    #[error("History error: {0}")]
    History(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, GuardError>`.
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates a new input error for the given logical table.
    pub fn input(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Input {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wraps an error raised while running the named analyzer.
    pub fn analyzer_failed(analyzer: impl Into<String>, source: GuardError) -> Self {
        Self::AnalyzerFailed {
            analyzer: analyzer.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for errors caused by the input dataset.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Input { .. } => true,
            Self::AnalyzerFailed { source, .. } => source.is_input_error(),
            _ => false,
        }
    }

    /// Returns `true` for errors caused by the analysis configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<GuardError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| wrap(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(&f(), e.into()))
    }
}

// Input and configuration errors keep their class so callers can still tell
// a bad dataset from a broken engine.
fn wrap(msg: &str, err: GuardError) -> GuardError {
    match err {
        GuardError::Input { table, message } => GuardError::Input {
            table,
            message: format!("{msg}: {message}"),
        },
        GuardError::Configuration(inner) => GuardError::Configuration(format!("{msg}: {inner}")),
        GuardError::Internal(inner) => GuardError::Internal(format!("{msg}: {inner}")),
        other => GuardError::Internal(format!("{msg}: {other}")),
    }
}
