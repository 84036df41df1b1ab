// Application context
// Everything an operation needs, built once at startup and passed around
// explicitly: the store, the schema settings, the reference year, and the
// span the application's log events are recorded under.

use crate::config::Config;
use crate::query::{render, QueryService};
use crate::schema;
use crate::store::Store;
use anyhow::Result;
use std::io::Write;
use tracing::{info_span, Span};

pub struct AppContext<S: Store> {
    store: S,
    keyspace: String,
    replication_factor: u32,
    reference_year: i32,
    span: Span,
}

impl<S: Store> AppContext<S> {
    pub fn new(store: S, keyspace: &str, replication_factor: u32, reference_year: i32) -> Self {
        let span = info_span!("airport_ads", keyspace, reference_year);
        Self {
            store,
            keyspace: keyspace.to_string(),
            replication_factor,
            reference_year,
            span,
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(
            store,
            &config.keyspace,
            config.replication_factor,
            config.reference_year(),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Make sure the keyspace and tables exist (safe to call every startup)
    pub fn ensure_schema(&mut self) -> Result<()> {
        let _enter = self.span.enter();
        schema::ensure_keyspace(&mut self.store, &self.keyspace, self.replication_factor)
    }

    pub fn queries(&self) -> QueryService<'_, S> {
        QueryService::new(&self.store, self.reference_year)
    }

    /// Run the passenger lookup and print every row to `out`
    /// Returns the number of rows printed
    pub fn print_passengers<W: Write>(&self, out: &mut W, airport_id: &str, month: i32) -> Result<usize> {
        let _enter = self.span.enter();
        let mut printed = 0;
        for row in self.queries().passengers_by_airport_month(airport_id, month)? {
            render::write_passenger(out, &row?)?;
            printed += 1;
        }
        Ok(printed)
    }

    /// Run the advertisement lookup and print every row to `out`
    /// Returns the number of rows printed
    pub fn print_advertisements<W: Write>(
        &self,
        out: &mut W,
        airport_id: &str,
        month: i32,
    ) -> Result<usize> {
        let _enter = self.span.enter();
        let mut printed = 0;
        for ad in self.queries().advertisements_by_airport_month(airport_id, month)? {
            render::write_advertisement(out, &ad)?;
            printed += 1;
        }
        Ok(printed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const FIXTURE: &str = r#"{
        "passengers": [
            {"passenger_id": "p1", "name": "Ana", "age": 34, "gender": "F", "country_of_origin": "Spain"}
        ],
        "flights": [
            {"flight_id": "f1", "departure_airport_id": "MAD", "departure_time": "2024-03-10T08:30:00Z"}
        ],
        "passenger_flights": [
            {"passenger_id": "p1", "flight_id": "f1", "transit_mode": "connecting"}
        ],
        "advertisements": [
            {
                "advertisement_id": "ad1",
                "airport_id": "MAD",
                "start_date": "2024-03-01T00:00:00Z",
                "end_date": "2024-03-31T00:00:00Z",
                "budget": "2500.50"
            }
        ]
    }"#;

    fn app() -> AppContext<MemoryStore> {
        let mut app = AppContext::new(MemoryStore::new(), "airport_ads", 1, 2024);
        app.ensure_schema().unwrap();
        app.store.load_fixture(FIXTURE).unwrap();
        app
    }

    #[test]
    fn test_print_passengers() {
        let app = app();
        let mut out = Vec::new();

        assert_eq!(app.print_passengers(&mut out, "MAD", 3).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("=== Passenger: p1 ===\n"));
        assert!(text.contains("- Flight ID: f1\n"));
    }

    #[test]
    fn test_print_advertisements() {
        let app = app();
        let mut out = Vec::new();

        assert_eq!(app.print_advertisements(&mut out, "MAD", 3).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().contains("- Budget: 2500.50\n"));
    }

    #[test]
    fn test_nothing_printed_without_matches() {
        let app = app();
        let mut out = Vec::new();

        assert_eq!(app.print_passengers(&mut out, "MAD", 4).unwrap(), 0);
        assert_eq!(app.print_advertisements(&mut out, "MAD", 4).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_ensure_schema_twice() {
        let mut app = app();
        app.ensure_schema().unwrap();
        assert_eq!(app.store().table_names(app.keyspace()).len(), 5);
    }
}
