//! Reading caller-registered tables into a snapshot.
//!
//! The orchestrator may load airports, airlines and routes any way it likes
//! (CSV, Parquet, a database provider) and register them in its own
//! `SessionContext`. [`SourceTables`] tells the engine which tables and
//! columns hold the keys and references.

use arrow::array::{Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::snapshot::{clean, parse_active, AirlineRows, AirportRows, RouteRows, Snapshot};
use super::{AIRLINES_TABLE, AIRPORTS_TABLE, ROUTES_TABLE};
use crate::error::{ErrorContext, GuardError, Result};

/// Names of the caller's tables and the columns the engine reads from them.
///
/// Column lookup is exact first, then case-insensitive. Besides the key and
/// reference columns, the optional attribute columns `name`, `city`,
/// `country`, `active`, `stops` and `equipment` are copied when present.
///
/// Key and reference values of any Arrow type are read as strings, trimmed,
/// and treated as empty when blank or `\N`; see [`Dataset`](super::Dataset)
/// for how they are matched. Rows are read partition by partition in
/// partition order, so a route's position is stable across snapshots of the
/// same table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTables {
    /// Table holding airport records
    pub airports_table: String,
    /// Airport key column
    pub airport_code_column: String,
    /// Table holding airline records
    pub airlines_table: String,
    /// Airline key column
    pub airline_code_column: String,
    /// Table holding route records
    pub routes_table: String,
    /// Route column referencing the source airport
    pub route_source_column: String,
    /// Route column referencing the destination airport
    pub route_destination_column: String,
    /// Route column referencing the operating airline
    pub route_airline_column: String,
}

impl Default for SourceTables {
    fn default() -> Self {
        Self {
            airports_table: AIRPORTS_TABLE.to_string(),
            airport_code_column: "code".to_string(),
            airlines_table: AIRLINES_TABLE.to_string(),
            airline_code_column: "code".to_string(),
            routes_table: ROUTES_TABLE.to_string(),
            route_source_column: "source_airport".to_string(),
            route_destination_column: "destination_airport".to_string(),
            route_airline_column: "airline".to_string(),
        }
    }
}

impl SourceTables {
    /// Column layout of the OpenFlights relational schema, which joins on
    /// numeric IDs rather than IATA codes.
    pub fn openflights() -> Self {
        Self {
            airport_code_column: "Airport_ID".to_string(),
            airline_code_column: "Airline_ID".to_string(),
            route_source_column: "Source_airport_ID".to_string(),
            route_destination_column: "Destination_airport_ID".to_string(),
            route_airline_column: "Airline_ID".to_string(),
            ..Self::default()
        }
    }

    /// Sets the airports table and its key column.
    pub fn with_airports(mut self, table: impl Into<String>, code: impl Into<String>) -> Self {
        self.airports_table = table.into();
        self.airport_code_column = code.into();
        self
    }

    /// Sets the airlines table and its key column.
    pub fn with_airlines(mut self, table: impl Into<String>, code: impl Into<String>) -> Self {
        self.airlines_table = table.into();
        self.airline_code_column = code.into();
        self
    }

    /// Sets the routes table and its three reference columns.
    pub fn with_routes(
        mut self,
        table: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        airline: impl Into<String>,
    ) -> Self {
        self.routes_table = table.into();
        self.route_source_column = source.into();
        self.route_destination_column = destination.into();
        self.route_airline_column = airline.into();
        self
    }
}

/// A fully collected source table.
struct CollectedTable {
    logical: &'static str,
    schema: Schema,
    batches: Vec<RecordBatch>,
}

impl CollectedTable {
    fn position(&self, column: &str) -> Option<usize> {
        self.schema.index_of(column).ok().or_else(|| {
            self.schema
                .fields()
                .iter()
                .position(|f| f.name().eq_ignore_ascii_case(column))
        })
    }

    /// Reads a required column as strings.
    fn required(&self, column: &str) -> Result<Vec<Option<String>>> {
        let index = self.position(column).ok_or_else(|| {
            GuardError::input(
                self.logical,
                format!("required column '{column}' not found"),
            )
        })?;
        self.strings_at(index)
    }

    /// Reads an optional column as strings, or all `None` if it is absent.
    fn optional(&self, column: &str) -> Result<Vec<Option<String>>> {
        match self.position(column) {
            Some(index) => self.strings_at(index),
            None => Ok(vec![None; self.num_rows()]),
        }
    }

    fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    fn strings_at(&self, index: usize) -> Result<Vec<Option<String>>> {
        let mut values = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let utf8 = cast(batch.column(index), &DataType::Utf8).with_context(|| {
                format!(
                    "casting column '{}' of '{}' to Utf8",
                    self.schema.field(index).name(),
                    self.logical
                )
            })?;
            let strings = utf8
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    GuardError::Internal(format!(
                        "column {index} of '{}' did not cast to Utf8",
                        self.logical
                    ))
                })?;
            for row in 0..strings.len() {
                let value = (!strings.is_null(row)).then(|| strings.value(row));
                values.push(clean(value));
            }
        }
        Ok(values)
    }
}

async fn collect_table(
    ctx: &SessionContext,
    logical: &'static str,
    table: &str,
) -> Result<CollectedTable> {
    let df = ctx.table(table).await.map_err(|e| {
        GuardError::input(logical, format!("table '{table}' is not available: {e}"))
    })?;
    let schema = df.schema().as_arrow().clone();
    // Route positions follow partition index order, not completion order.
    let partitions = df
        .collect_partitioned()
        .await
        .map_err(|e| GuardError::input(logical, format!("failed to read table '{table}': {e}")))?;
    debug!(
        table,
        partitions = partitions.len(),
        "Collected source table"
    );
    let batches: Vec<RecordBatch> = partitions.into_iter().flatten().collect();
    Ok(CollectedTable {
        logical,
        schema,
        batches,
    })
}

/// Copies the caller's tables into staged snapshot rows.
#[instrument(skip(ctx))]
pub(crate) async fn read_source_tables(
    ctx: &SessionContext,
    tables: &SourceTables,
) -> Result<Snapshot> {
    let airports = collect_table(ctx, AIRPORTS_TABLE, &tables.airports_table).await?;
    let airlines = collect_table(ctx, AIRLINES_TABLE, &tables.airlines_table).await?;
    let routes = collect_table(ctx, ROUTES_TABLE, &tables.routes_table).await?;

    let airports = AirportRows {
        codes: airports.required(&tables.airport_code_column)?,
        names: airports.optional("name")?,
        cities: airports.optional("city")?,
        countries: airports.optional("country")?,
    };

    let airlines = AirlineRows {
        codes: airlines.required(&tables.airline_code_column)?,
        names: airlines.optional("name")?,
        active: airlines
            .optional("active")?
            .iter()
            .map(|v| parse_active(v.as_deref()))
            .collect(),
    };

    let routes = RouteRows {
        sources: routes.required(&tables.route_source_column)?,
        destinations: routes.required(&tables.route_destination_column)?,
        airlines: routes.required(&tables.route_airline_column)?,
        stops: routes
            .optional("stops")?
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse::<i64>().ok()))
            .collect(),
        equipment: routes.optional("equipment")?,
    };

    Ok(Snapshot {
        airports,
        airlines,
        routes,
    })
}
