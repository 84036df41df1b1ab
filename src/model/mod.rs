// Data model
// The five entities stored in the cluster, as plain typed structs.
//
// Every column except the primary key may be NULL in Cassandra, so the
// non-key attributes are Option<T>. Nothing here checks references between
// entities: the engine doesn't enforce them and neither do we.

pub mod decimal;

pub use decimal::{Decimal, DecimalError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point in time as stored in a CQL TIMESTAMP column (millisecond precision, UTC)
pub type Timestamp = DateTime<Utc>;

/// Convert milliseconds since the Unix epoch into a Timestamp
/// Returns None when the value is outside chrono's representable range
pub fn timestamp_from_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub airport_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub passenger_id: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub country_of_origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: String,
    pub departure_airport_id: Option<String>,
    pub arrival_airport_id: Option<String>,
    pub departure_time: Option<Timestamp>,
    pub arrival_time: Option<Timestamp>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
}

impl Flight {
    /// The columns the passenger lookup actually needs
    pub fn departure(&self) -> FlightDeparture {
        FlightDeparture {
            flight_id: self.flight_id.clone(),
            departure_time: self.departure_time,
        }
    }
}

/// Projection of a flight used when searching departures from an airport
#[derive(Debug, Clone, PartialEq)]
pub struct FlightDeparture {
    pub flight_id: String,
    pub departure_time: Option<Timestamp>,
}

/// Join entity between passengers and flights
/// (passenger_id, flight_id) is the composite primary key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerFlight {
    pub passenger_id: String,
    pub flight_id: String,
    pub transit_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub advertisement_id: String,
    pub airport_id: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub budget: Option<Decimal>,
}

impl Advertisement {
    /// Whether the validity window [start_date, end_date] contains `at`
    ///
    /// Both bounds are inclusive. An advertisement with a missing bound is
    /// never active, which is also what the cluster does: a comparison
    /// against NULL never matches.
    pub fn is_active_at(&self, at: Timestamp) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= at && at <= end,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ad(start: Option<Timestamp>, end: Option<Timestamp>) -> Advertisement {
        Advertisement {
            advertisement_id: "ad-1".to_string(),
            airport_id: Some("MAD".to_string()),
            start_date: start,
            end_date: end,
            budget: None,
        }
    }

    #[test]
    fn test_advertisement_window_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let advertisement = ad(Some(start), Some(end));

        assert!(advertisement.is_active_at(start));
        assert!(advertisement.is_active_at(end));
        assert!(!advertisement.is_active_at(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()));
        assert!(!advertisement.is_active_at(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_advertisement_without_bounds_is_never_active() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert!(!ad(None, Some(at)).is_active_at(at));
        assert!(!ad(Some(at), None).is_active_at(at));
    }

    #[test]
    fn test_timestamp_from_millis() {
        let ts = timestamp_from_millis(1_709_251_200_000).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }
}
