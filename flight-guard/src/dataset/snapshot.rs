//! Columnar staging area for building a dataset snapshot.
//!
//! Both input paths (typed records and caller-registered tables) fill the
//! same row buffers. Validation and Arrow materialization happen once, here.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use tracing::debug;

use super::{DatasetStats, AIRLINES_TABLE, AIRPORTS_TABLE, ROUTES_TABLE};
use crate::error::{GuardError, Result};
use crate::model::normalize_reference;

/// Schema of the snapshot `airports` table.
pub fn airports_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("city", DataType::Utf8, true),
        Field::new("country", DataType::Utf8, true),
    ]))
}

/// Schema of the snapshot `airlines` table.
pub fn airlines_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("active", DataType::Boolean, true),
    ]))
}

/// Schema of the snapshot `routes` table.
///
/// `route_seq` is the zero-based position of the route in its input
/// collection and gives duplicate detection a stable notion of "first".
pub fn routes_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("route_seq", DataType::Int64, false),
        Field::new("source_airport", DataType::Utf8, true),
        Field::new("destination_airport", DataType::Utf8, true),
        Field::new("airline", DataType::Utf8, true),
        Field::new("stops", DataType::Int64, true),
        Field::new("equipment", DataType::Utf8, true),
    ]))
}

#[derive(Debug, Default)]
pub(crate) struct AirportRows {
    pub codes: Vec<Option<String>>,
    pub names: Vec<Option<String>>,
    pub cities: Vec<Option<String>>,
    pub countries: Vec<Option<String>>,
}

#[derive(Debug, Default)]
pub(crate) struct AirlineRows {
    pub codes: Vec<Option<String>>,
    pub names: Vec<Option<String>>,
    pub active: Vec<Option<bool>>,
}

#[derive(Debug, Default)]
pub(crate) struct RouteRows {
    pub sources: Vec<Option<String>>,
    pub destinations: Vec<Option<String>>,
    pub airlines: Vec<Option<String>>,
    pub stops: Vec<Option<i64>>,
    pub equipment: Vec<Option<String>>,
}

/// Trims a value and maps blank or `\N` values to `None`.
pub(crate) fn clean(value: Option<&str>) -> Option<String> {
    normalize_reference(value).map(str::to_string)
}

/// Parses the airline active flag as written by OpenFlights (`Y`/`N`) or
/// common boolean spellings.
pub(crate) fn parse_active(value: Option<&str>) -> Option<bool> {
    match normalize_reference(value)?.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "t" | "1" => Some(true),
        "n" | "no" | "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Checks that every key is present and unique, returning the keys.
fn validate_keys(table: &str, codes: Vec<Option<String>>) -> Result<Vec<String>> {
    let mut seen = HashSet::with_capacity(codes.len());
    let mut keys = Vec::with_capacity(codes.len());
    for (row, code) in codes.into_iter().enumerate() {
        let code = code.ok_or_else(|| {
            GuardError::input(table, format!("record at row {row} is missing its code"))
        })?;
        if !seen.insert(code.clone()) {
            return Err(GuardError::input(
                table,
                format!("duplicate code '{code}' at row {row}"),
            ));
        }
        keys.push(code);
    }
    Ok(keys)
}

/// Staged rows for all three tables.
#[derive(Debug, Default)]
pub(crate) struct Snapshot {
    pub airports: AirportRows,
    pub airlines: AirlineRows,
    pub routes: RouteRows,
}

impl Snapshot {
    /// Validates the staged rows and registers them as in-memory tables in a
    /// fresh session.
    pub fn register(self) -> Result<(SessionContext, DatasetStats)> {
        let airports = self.airports;
        let airlines = self.airlines;
        let routes = self.routes;

        let airport_codes = validate_keys(AIRPORTS_TABLE, airports.codes)?;
        let airline_codes = validate_keys(AIRLINES_TABLE, airlines.codes)?;

        let stats = DatasetStats {
            airports: airport_codes.len(),
            airlines: airline_codes.len(),
            routes: routes.sources.len(),
        };

        let airports_batch = RecordBatch::try_new(
            airports_schema(),
            vec![
                Arc::new(StringArray::from(airport_codes)) as ArrayRef,
                Arc::new(StringArray::from(airports.names)),
                Arc::new(StringArray::from(airports.cities)),
                Arc::new(StringArray::from(airports.countries)),
            ],
        )?;

        let airlines_batch = RecordBatch::try_new(
            airlines_schema(),
            vec![
                Arc::new(StringArray::from(airline_codes)) as ArrayRef,
                Arc::new(StringArray::from(airlines.names)),
                Arc::new(BooleanArray::from(airlines.active)),
            ],
        )?;

        let route_seq: Vec<i64> = (0..stats.routes as i64).collect();
        let routes_batch = RecordBatch::try_new(
            routes_schema(),
            vec![
                Arc::new(Int64Array::from(route_seq)) as ArrayRef,
                Arc::new(StringArray::from(routes.sources)),
                Arc::new(StringArray::from(routes.destinations)),
                Arc::new(StringArray::from(routes.airlines)),
                Arc::new(Int64Array::from(routes.stops)),
                Arc::new(StringArray::from(routes.equipment)),
            ],
        )?;

        let ctx = SessionContext::new();
        for (name, batch) in [
            (AIRPORTS_TABLE, airports_batch),
            (AIRLINES_TABLE, airlines_batch),
            (ROUTES_TABLE, routes_batch),
        ] {
            let table = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
            ctx.register_table(name, Arc::new(table))?;
        }

        debug!(
            airports = stats.airports,
            airlines = stats.airlines,
            routes = stats.routes,
            "Registered dataset snapshot"
        );

        Ok((ctx, stats))
    }
}
