//! # flight-guard - Anomaly Detection for Airline Route Data
//!
//! flight-guard inspects a relational airline dataset (airports, airlines
//! and the routes between them) and reports data-quality problems and
//! statistical anomalies. All analysis runs as DataFusion queries over an
//! immutable in-memory snapshot.
//!
//! ## Overview
//!
//! One analysis run produces an [`AnomalyReport`](report::AnomalyReport)
//! with three sections:
//!
//! - **Integrity findings**: routes that reference unknown airports or
//!   airlines, exact duplicates, and routes with empty references.
//! - **Outliers**: airports whose number of departing routes lies more than
//!   `k` population standard deviations from the mean.
//! - **Ranking**: airlines densely ranked by the number of routes they
//!   operate, with ties marked.
//!
//! The three analyzers are independent and run concurrently. A run either
//! produces the whole report or fails; partial reports are never returned.
//!
//! ## Quick Start
//!
//! ```rust
//! use flight_guard::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> flight_guard::error::Result<()> {
//! let dataset = Dataset::from_records(
//!     &[Airport::new("JFK", "John F Kennedy Intl"), Airport::new("LAX", "Los Angeles Intl")],
//!     &[Airline::new("AA", "American Airlines"), Airline::new("UA", "United Airlines")],
//!     &[
//!         Route::new("JFK", "LAX", "AA"),
//!         Route::new("JFK", "LAX", "AA"),
//!         Route::new("LAX", "SFO", "UA"),
//!     ],
//! )?;
//!
//! let engine = AnomalyEngine::new(AnalysisConfig::default())?;
//! let report = engine.run(&dataset).await?;
//!
//! let summary = report.summary();
//! assert_eq!(summary.count(IntegrityKind::DuplicateRoute), 1);
//! assert_eq!(summary.count(IntegrityKind::MissingDestinationAirport), 1);
//! assert_eq!(report.top_airlines(1)[0].airline_code, "AA");
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading Data From DataFusion
//!
//! Tables already registered in a `SessionContext` (CSV, Parquet, database
//! providers) can be snapshotted directly. [`SourceTables`](dataset::SourceTables)
//! names the tables and key columns:
//!
//! ```rust,no_run
//! use datafusion::prelude::*;
//! use flight_guard::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let ctx = SessionContext::new();
//! ctx.register_csv("airports", "data/airports.csv", CsvReadOptions::new()).await?;
//! ctx.register_csv("airlines", "data/airlines.csv", CsvReadOptions::new()).await?;
//! ctx.register_csv("routes", "data/routes.csv", CsvReadOptions::new()).await?;
//!
//! let dataset = Dataset::from_context(&ctx, &SourceTables::openflights()).await?;
//! let report = AnomalyEngine::new(AnalysisConfig::default())?.run(&dataset).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` spans and events. Install a subscriber with
//! [`logging::setup::init_logging`] or your own; per-query SQL and
//! per-finding events are controlled by [`LogConfig`](logging::LogConfig).

pub mod analyzers;
pub mod cancellation;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod history;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod stats;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
