//! Record types for the three input collections.
//!
//! These are the typed inputs accepted by
//! [`Dataset::from_records`](crate::dataset::Dataset::from_records). Reference
//! fields on [`Route`] are optional because incomplete routes are one of the
//! anomalies the engine reports.

use serde::{Deserialize, Serialize};

/// Null marker used by the OpenFlights data files.
pub const NULL_MARKER: &str = "\\N";

/// An airport reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// Unique, non-empty airport code
    pub code: String,
    /// Display name
    pub name: String,
    /// City the airport serves
    #[serde(default)]
    pub city: Option<String>,
    /// Country the airport is in
    #[serde(default)]
    pub country: Option<String>,
}

impl Airport {
    /// Creates an airport with no location information.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            city: None,
            country: None,
        }
    }

    /// Sets the airport location.
    pub fn with_location(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.country = Some(country.into());
        self
    }
}

/// An airline reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    /// Unique, non-empty airline code
    pub code: String,
    /// Display name
    pub name: String,
    /// Whether the airline is currently operating
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Airline {
    /// Creates an active airline.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            active: true,
        }
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// A route record referencing two airports and an operating airline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    /// Source airport code
    #[serde(default)]
    pub source_airport: Option<String>,
    /// Destination airport code
    #[serde(default)]
    pub destination_airport: Option<String>,
    /// Operating airline code
    #[serde(default)]
    pub airline: Option<String>,
    /// Number of stops
    #[serde(default)]
    pub stops: Option<u32>,
    /// Equipment codes, as listed in the source data
    #[serde(default)]
    pub equipment: Option<String>,
}

impl Route {
    /// Creates a route with all three references present.
    pub fn new(
        source_airport: impl Into<String>,
        destination_airport: impl Into<String>,
        airline: impl Into<String>,
    ) -> Self {
        Self {
            source_airport: Some(source_airport.into()),
            destination_airport: Some(destination_airport.into()),
            airline: Some(airline.into()),
            stops: None,
            equipment: None,
        }
    }

    /// Creates a route from optional references.
    pub fn from_parts(
        source_airport: Option<&str>,
        destination_airport: Option<&str>,
        airline: Option<&str>,
    ) -> Self {
        Self {
            source_airport: source_airport.map(str::to_string),
            destination_airport: destination_airport.map(str::to_string),
            airline: airline.map(str::to_string),
            stops: None,
            equipment: None,
        }
    }

    /// Sets the stop count.
    pub fn with_stops(mut self, stops: u32) -> Self {
        self.stops = Some(stops);
        self
    }

    /// Sets the equipment list.
    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    /// Returns `true` when all three references are non-empty.
    pub fn is_complete(&self) -> bool {
        [&self.source_airport, &self.destination_airport, &self.airline]
            .into_iter()
            .all(|r| normalize_reference(r.as_deref()).is_some())
    }
}

/// Normalizes a reference value.
///
/// Returns `None` for absent, blank, or `\N` values and the trimmed value
/// otherwise.
pub fn normalize_reference(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed == NULL_MARKER {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference(Some(" JFK ")), Some("JFK"));
        assert_eq!(normalize_reference(Some("")), None);
        assert_eq!(normalize_reference(Some("   ")), None);
        assert_eq!(normalize_reference(Some("\\N")), None);
        assert_eq!(normalize_reference(None), None);
    }

    #[test]
    fn test_route_completeness() {
        assert!(Route::new("JFK", "LAX", "AA").is_complete());
        assert!(!Route::from_parts(Some("JFK"), None, Some("AA")).is_complete());
        assert!(!Route::from_parts(Some("JFK"), Some("LAX"), Some("\\N")).is_complete());
    }

    #[test]
    fn test_airline_active_defaults_to_true() {
        let airline: Airline = serde_json::from_str(r#"{"code":"AA","name":"American"}"#).unwrap();
        assert!(airline.active);
    }
}
