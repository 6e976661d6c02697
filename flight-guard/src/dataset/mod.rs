//! Immutable dataset snapshots.
//!
//! Every analysis run reads from a [`Dataset`]: a private DataFusion session
//! holding three in-memory tables materialized when the snapshot is taken.
//! Later changes to the caller's store do not affect a snapshot, and the
//! analyzers never write to it.
//!
//! Snapshot tables (all reference values trimmed, blank and `\N` mapped to
//! `NULL`):
//!
//! | table      | columns                                                              |
//! |------------|----------------------------------------------------------------------|
//! | `airports` | `code`, `name`, `city`, `country`                                    |
//! | `airlines` | `code`, `name`, `active`                                             |
//! | `routes`   | `route_seq`, `source_airport`, `destination_airport`, `airline`, `stops`, `equipment` |

pub mod snapshot;
pub mod source;

use std::fmt;

use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub use source::SourceTables;

use crate::error::Result;
use crate::model::{Airline, Airport, Route};
use snapshot::{clean, AirlineRows, AirportRows, RouteRows, Snapshot};

/// Snapshot table holding airports.
pub const AIRPORTS_TABLE: &str = "airports";
/// Snapshot table holding airlines.
pub const AIRLINES_TABLE: &str = "airlines";
/// Snapshot table holding routes.
pub const ROUTES_TABLE: &str = "routes";

/// Row counts of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Number of airport records
    pub airports: usize,
    /// Number of airline records
    pub airlines: usize,
    /// Number of route records
    pub routes: usize,
}

/// A read-only snapshot of airports, airlines and routes.
///
/// Cloning is cheap; clones share the same underlying tables.
///
/// Keys and references are normalized when the snapshot is taken: values
/// are trimmed of surrounding whitespace, and blank values or the `\N`
/// marker become empty. Matching is otherwise exact and case-sensitive, so
/// a route referencing `" JFK"` resolves to airport `JFK` while `"jfk"` is
/// dangling. Routes keep their input order, which is the position reported
/// in findings.
///
/// # Examples
///
/// ```rust
/// use flight_guard::dataset::Dataset;
/// use flight_guard::model::{Airline, Airport, Route};
///
/// let dataset = Dataset::from_records(
///     &[Airport::new("JFK", "John F Kennedy Intl"), Airport::new("LAX", "Los Angeles Intl")],
///     &[Airline::new("AA", "American Airlines")],
///     &[Route::new("JFK", "LAX", "AA")],
/// )
/// .unwrap();
/// assert_eq!(dataset.stats().routes, 1);
/// ```
#[derive(Clone)]
pub struct Dataset {
    ctx: SessionContext,
    stats: DatasetStats,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Dataset {
    /// Builds a snapshot from typed records.
    ///
    /// Fails with an input error when an airport or airline has an empty
    /// code or when a code is repeated.
    pub fn from_records(airports: &[Airport], airlines: &[Airline], routes: &[Route]) -> Result<Self> {
        let snapshot = Snapshot {
            airports: AirportRows {
                codes: airports.iter().map(|a| clean(Some(&a.code))).collect(),
                names: airports.iter().map(|a| clean(Some(&a.name))).collect(),
                cities: airports.iter().map(|a| clean(a.city.as_deref())).collect(),
                countries: airports.iter().map(|a| clean(a.country.as_deref())).collect(),
            },
            airlines: AirlineRows {
                codes: airlines.iter().map(|a| clean(Some(&a.code))).collect(),
                names: airlines.iter().map(|a| clean(Some(&a.name))).collect(),
                active: airlines.iter().map(|a| Some(a.active)).collect(),
            },
            routes: RouteRows {
                sources: routes.iter().map(|r| clean(r.source_airport.as_deref())).collect(),
                destinations: routes
                    .iter()
                    .map(|r| clean(r.destination_airport.as_deref()))
                    .collect(),
                airlines: routes.iter().map(|r| clean(r.airline.as_deref())).collect(),
                stops: routes.iter().map(|r| r.stops.map(i64::from)).collect(),
                equipment: routes.iter().map(|r| clean(r.equipment.as_deref())).collect(),
            },
        };
        Self::register(snapshot)
    }

    /// Builds a snapshot from tables registered in the caller's session.
    ///
    /// Fails with an input error when a table is not registered, a required
    /// column is missing, or a key is empty or repeated.
    #[instrument(skip(ctx))]
    pub async fn from_context(ctx: &SessionContext, tables: &SourceTables) -> Result<Self> {
        let snapshot = source::read_source_tables(ctx, tables).await?;
        Self::register(snapshot)
    }

    fn register(snapshot: Snapshot) -> Result<Self> {
        let (ctx, stats) = snapshot.register()?;
        info!(
            airports = stats.airports,
            airlines = stats.airlines,
            routes = stats.routes,
            "Dataset snapshot ready"
        );
        Ok(Self { ctx, stats })
    }

    /// Returns the session holding the snapshot tables.
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Returns the row counts of the snapshot.
    pub fn stats(&self) -> DatasetStats {
        self.stats
    }
}
