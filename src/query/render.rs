// Result rendering
// Each result row is printed as a small block: a header line with the row's
// key, then one "- Label: value" line per attribute.

use super::PassengerRow;
use crate::model::{Advertisement, Timestamp};
use std::fmt::Display;
use std::io::{self, Write};

/// Shown in place of a NULL column
const MISSING: &str = "-";

fn or_missing<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn format_timestamp(ts: Option<Timestamp>) -> String {
    or_missing(ts.map(|ts| ts.format("%Y-%m-%d %H:%M:%S")))
}

pub fn write_passenger<W: Write>(out: &mut W, row: &PassengerRow) -> io::Result<()> {
    let passenger = &row.passenger;
    writeln!(out, "=== Passenger: {} ===", passenger.passenger_id)?;
    writeln!(out, "- Name: {}", or_missing(passenger.name.as_deref()))?;
    writeln!(out, "- Age: {}", or_missing(passenger.age))?;
    writeln!(out, "- Gender: {}", or_missing(passenger.gender.as_deref()))?;
    writeln!(
        out,
        "- Country of Origin: {}",
        or_missing(passenger.country_of_origin.as_deref())
    )?;
    writeln!(out, "- Flight ID: {}", row.flight_id)
}

pub fn write_advertisement<W: Write>(out: &mut W, ad: &Advertisement) -> io::Result<()> {
    writeln!(out, "=== Advertisement: {} ===", ad.advertisement_id)?;
    writeln!(out, "- Start Date: {}", format_timestamp(ad.start_date))?;
    writeln!(out, "- End Date: {}", format_timestamp(ad.end_date))?;
    writeln!(out, "- Budget: {}", or_missing(ad.budget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Decimal, Passenger};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_passenger_block() {
        let row = PassengerRow {
            passenger: Passenger {
                passenger_id: "p1".to_string(),
                name: Some("Ana Torres".to_string()),
                age: Some(34),
                gender: None,
                country_of_origin: Some("Spain".to_string()),
            },
            flight_id: "IB3170-0310".to_string(),
        };

        let mut out = Vec::new();
        write_passenger(&mut out, &row).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== Passenger: p1 ===\n\
             - Name: Ana Torres\n\
             - Age: 34\n\
             - Gender: -\n\
             - Country of Origin: Spain\n\
             - Flight ID: IB3170-0310\n"
        );
    }

    #[test]
    fn test_advertisement_block() {
        let ad = Advertisement {
            advertisement_id: "ad-7".to_string(),
            airport_id: Some("MAD".to_string()),
            start_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 3, 31, 18, 30, 0).unwrap()),
            budget: Some(Decimal::new(150000, 2)),
        };

        let mut out = Vec::new();
        write_advertisement(&mut out, &ad).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== Advertisement: ad-7 ===\n\
             - Start Date: 2024-03-01 00:00:00\n\
             - End Date: 2024-03-31 18:30:00\n\
             - Budget: 1500.00\n"
        );
    }
}
