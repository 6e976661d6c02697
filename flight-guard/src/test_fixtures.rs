//! Common test fixtures for anomaly-detection scenarios.
//!
//! The [`anomalous_dataset`] fixture is a small network with exactly one
//! anomaly of every integrity kind (three incomplete routes) so tests can
//! assert exact findings. Its expected contents are documented on the
//! function.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::{Airline, Airport, Route};

/// The five airports of the sample network.
pub fn sample_airports() -> Vec<Airport> {
    vec![
        Airport::new("JFK", "John F Kennedy International Airport").with_location("New York", "United States"),
        Airport::new("LAX", "Los Angeles International Airport").with_location("Los Angeles", "United States"),
        Airport::new("ORD", "Chicago O'Hare International Airport").with_location("Chicago", "United States"),
        Airport::new("ATL", "Hartsfield Jackson Atlanta International Airport").with_location("Atlanta", "United States"),
        Airport::new("DFW", "Dallas Fort Worth International Airport").with_location("Dallas-Fort Worth", "United States"),
    ]
}

/// Three operating airlines and one inactive airline without routes.
pub fn sample_airlines() -> Vec<Airline> {
    vec![
        Airline::new("AA", "American Airlines"),
        Airline::new("UA", "United Airlines"),
        Airline::new("DL", "Delta Air Lines"),
        Airline::new("ZZ", "Defunct Air").with_active(false),
    ]
}

/// Routes of the sample network, anomalies included.
///
/// | position | route | anomaly |
/// |---|---|---|
/// | 6 | JFK→LAX AA | duplicate of position 0 |
/// | 7 | XXX→LAX AA | missing source airport |
/// | 8 | JFK→YYY UA | missing destination airport |
/// | 9 | DFW→ATL QQ | missing airline |
/// | 10 | ∅→LAX AA | incomplete |
/// | 11 | ORD→`\N` UA | incomplete |
/// | 12 | ATL→DFW "" | incomplete |
///
/// Source-side counts of known airports: JFK 5, ORD 2, ATL 2, LAX 1, DFW 1.
/// Airline counts: AA 5, UA 4, DL 2, ZZ 0.
pub fn sample_routes() -> Vec<Route> {
    vec![
        Route::new("JFK", "LAX", "AA").with_stops(0).with_equipment("321 762"),
        Route::new("JFK", "ORD", "AA"),
        Route::new("JFK", "ATL", "DL"),
        Route::new("LAX", "JFK", "UA"),
        Route::new("ORD", "JFK", "UA"),
        Route::new("ATL", "JFK", "DL"),
        Route::new("JFK", "LAX", "AA"),
        Route::new("XXX", "LAX", "AA"),
        Route::new("JFK", "YYY", "UA"),
        Route::new("DFW", "ATL", "QQ"),
        Route::from_parts(None, Some("LAX"), Some("AA")),
        Route::from_parts(Some("ORD"), Some("\\N"), Some("UA")),
        Route::from_parts(Some("ATL"), Some("DFW"), Some("")),
    ]
}

/// The sample network with all its anomalies.
pub fn anomalous_dataset() -> Result<Dataset> {
    Dataset::from_records(&sample_airports(), &sample_airlines(), &sample_routes())
}

/// The sample network restricted to its first six, anomaly-free routes.
pub fn clean_dataset() -> Result<Dataset> {
    let routes: Vec<Route> = sample_routes().into_iter().take(6).collect();
    Dataset::from_records(&sample_airports(), &sample_airlines(), &routes)
}

/// Builds a dataset where airport `A{i}` is the source of `counts[i]` routes.
///
/// Every route is `A{i}→SINK` on airline `XX`; `SINK` has no routes of its
/// own and stays out of the statistics. Repeated routes are duplicates, which
/// outlier tests ignore.
pub fn dataset_with_route_counts(counts: &[u64]) -> Result<Dataset> {
    let mut airports: Vec<Airport> = (0..counts.len())
        .map(|i| Airport::new(format!("A{i:03}"), format!("Airport {i}")))
        .collect();
    airports.push(Airport::new("SINK", "Sink"));

    let routes: Vec<Route> = counts
        .iter()
        .enumerate()
        .flat_map(|(i, &n)| (0..n).map(move |_| Route::new(format!("A{i:03}"), "SINK", "XX")))
        .collect();

    Dataset::from_records(&airports, &[Airline::new("XX", "Fixture Air")], &routes)
}

/// Builds a dataset where airline `L{i}` operates `counts[i]` routes.
pub fn dataset_with_airline_counts(counts: &[u64]) -> Result<Dataset> {
    let airlines: Vec<Airline> = (0..counts.len())
        .map(|i| Airline::new(format!("L{i:02}"), format!("Airline {i}")))
        .collect();
    let routes: Vec<Route> = counts
        .iter()
        .enumerate()
        .flat_map(|(i, &n)| (0..n).map(move |_| Route::new("JFK", "LAX", format!("L{i:02}"))))
        .collect();
    Dataset::from_records(
        &[Airport::new("JFK", "Kennedy"), Airport::new("LAX", "Los Angeles")],
        &airlines,
        &routes,
    )
}

fn string_array(values: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

fn int_array(values: Vec<Option<i64>>) -> ArrayRef {
    Arc::new(Int64Array::from(values))
}

/// Registers `airports`, `airlines` and `routes` tables in the OpenFlights
/// column layout, where routes reference airports and airlines by numeric
/// ID.
///
/// Contents: airports 1, 2, 3; airlines 10 (active), 20 (inactive); routes
/// `1→2 @10`, `1→3 @10`, `2→1 @20`, `1→99 @10` (dangling destination) and
/// `3→\N @20` (incomplete).
pub fn openflights_context() -> Result<SessionContext> {
    let ctx = SessionContext::new();

    let airports = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("Airport_ID", DataType::Int64, false),
            Field::new("Name", DataType::Utf8, true),
            Field::new("City", DataType::Utf8, true),
            Field::new("Country", DataType::Utf8, true),
            Field::new("IATA", DataType::Utf8, true),
        ])),
        vec![
            int_array(vec![Some(1), Some(2), Some(3)]),
            string_array(vec![Some("Goroka Airport"), Some("Madang Airport"), Some("Mount Hagen Kagamuga Airport")]),
            string_array(vec![Some("Goroka"), Some("Madang"), Some("Mount Hagen")]),
            string_array(vec![Some("Papua New Guinea"); 3]),
            string_array(vec![Some("GKA"), Some("MAG"), Some("HGU")]),
        ],
    )?;

    let airlines = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("Airline_ID", DataType::Int64, false),
            Field::new("Name", DataType::Utf8, true),
            Field::new("Active", DataType::Utf8, true),
        ])),
        vec![
            int_array(vec![Some(10), Some(20)]),
            string_array(vec![Some("Air Niugini"), Some("Airlines PNG")]),
            string_array(vec![Some("Y"), Some("N")]),
        ],
    )?;

    let routes = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("Airline", DataType::Utf8, true),
            Field::new("Airline_ID", DataType::Int64, true),
            Field::new("Source_airport_ID", DataType::Int64, true),
            Field::new("Destination_airport_ID", DataType::Utf8, true),
            Field::new("Stops", DataType::Int64, true),
            Field::new("Equipment", DataType::Utf8, true),
        ])),
        vec![
            string_array(vec![Some("PX"), Some("PX"), Some("CG"), Some("PX"), Some("CG")]),
            int_array(vec![Some(10), Some(10), Some(20), Some(10), Some(20)]),
            int_array(vec![Some(1), Some(1), Some(2), Some(1), Some(3)]),
            string_array(vec![Some("2"), Some("3"), Some("1"), Some("99"), Some("\\N")]),
            int_array(vec![Some(0), Some(0), Some(1), None, Some(0)]),
            string_array(vec![Some("DH8"), None, Some("DH8 F50"), None, None]),
        ],
    )?;

    for (name, batch) in [("airports", airports), ("airlines", airlines), ("routes", routes)] {
        let table = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
        ctx.register_table(name, Arc::new(table))?;
    }
    Ok(ctx)
}
