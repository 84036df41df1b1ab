// Cassandra store
// Store implementation backed by a Cassandra/ScyllaDB cluster through the
// scylla driver. The driver is async; the application is a blocking shell,
// so the store owns a single-threaded runtime and blocks on every call.
// One session, one outstanding query at a time.

use super::Store;
use crate::config::Config;
use crate::model::{
    timestamp_from_millis, Advertisement, Decimal, FlightDeparture, Passenger, PassengerFlight,
    Timestamp,
};
use crate::schema::{create_keyspace_statement, TableSchema};
use anyhow::{anyhow, Context, Result};
use scylla::frame::value::{CqlDecimal, CqlTimestamp};
use scylla::{Session, SessionBuilder};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

// CQL has no joins. The passenger lookup is assembled by the query service
// from the first three statements.
const SELECT_FLIGHTS_BY_DEPARTURE_AIRPORT: &str = "SELECT flight_id, departure_time FROM flights \
     WHERE departure_airport_id = ? ALLOW FILTERING";

const SELECT_PASSENGER_FLIGHTS_BY_FLIGHT: &str = "SELECT passenger_id, flight_id, transit_mode \
     FROM passenger_flights WHERE flight_id = ? ALLOW FILTERING";

const SELECT_PASSENGER: &str = "SELECT passenger_id, name, age, gender, country_of_origin \
     FROM passengers WHERE passenger_id = ?";

const SELECT_ACTIVE_ADVERTISEMENTS: &str = "SELECT advertisement_id, airport_id, start_date, end_date, budget \
     FROM advertisements WHERE airport_id = ? AND start_date <= ? AND end_date >= ? ALLOW FILTERING";

type PassengerRow = (String, Option<String>, Option<i32>, Option<String>, Option<String>);
type AdvertisementRow = (
    String,
    Option<String>,
    Option<CqlTimestamp>,
    Option<CqlTimestamp>,
    Option<CqlDecimal>,
);

/// A connection to the cluster
///
/// The session is closed when the store is dropped.
pub struct CassandraStore {
    /// Only None while being dropped
    session: Option<Session>,
    runtime: Runtime,
}

impl CassandraStore {
    /// Connect to the cluster described by `config`
    pub fn connect(config: &Config) -> Result<Self> {
        let contact_points = config.contact_points();
        if contact_points.is_empty() {
            return Err(anyhow!("No cluster contact points configured"));
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start the driver runtime")?;

        info!(contact_points = ?contact_points, "Connecting to cluster");
        let mut builder = SessionBuilder::new().known_nodes(&contact_points);
        if let Some((user, password)) = config.credentials() {
            builder = builder.user(user, password);
        }

        let session = runtime
            .block_on(builder.build())
            .with_context(|| format!("Failed to connect to {}", contact_points.join(", ")))?;

        Ok(Self {
            session: Some(session),
            runtime,
        })
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow!("Connection is closed"))
    }

    /// Run a statement that returns no rows
    fn execute_ddl(&self, statement: &str) -> Result<()> {
        debug!(statement, "Executing DDL");
        let session = self.session()?;
        self.runtime.block_on(session.query_unpaged(statement, ()))?;
        Ok(())
    }
}

impl Store for CassandraStore {
    fn create_keyspace(&mut self, name: &str, replication_factor: u32) -> Result<()> {
        self.execute_ddl(&create_keyspace_statement(name, replication_factor))
    }

    fn use_keyspace(&mut self, name: &str) -> Result<()> {
        let session = self.session()?;
        self.runtime.block_on(session.use_keyspace(name, false))?;
        Ok(())
    }

    fn create_table(&mut self, table: &TableSchema) -> Result<()> {
        self.execute_ddl(&table.create_statement())
    }

    fn flights_departing(&self, airport_id: &str) -> Result<Vec<FlightDeparture>> {
        let session = self.session()?;
        let result = self.runtime.block_on(
            session.query_unpaged(SELECT_FLIGHTS_BY_DEPARTURE_AIRPORT, (airport_id.to_string(),)),
        )?;

        let mut flights = Vec::new();
        for row in result.rows_typed::<(String, Option<CqlTimestamp>)>()? {
            let (flight_id, departure_time) = row?;
            flights.push(FlightDeparture {
                flight_id,
                departure_time: to_timestamp(departure_time)?,
            });
        }
        Ok(flights)
    }

    fn passenger_flights(&self, flight_id: &str) -> Result<Vec<PassengerFlight>> {
        let session = self.session()?;
        let result = self.runtime.block_on(
            session.query_unpaged(SELECT_PASSENGER_FLIGHTS_BY_FLIGHT, (flight_id.to_string(),)),
        )?;

        let mut links = Vec::new();
        for row in result.rows_typed::<(String, String, Option<String>)>()? {
            let (passenger_id, flight_id, transit_mode) = row?;
            links.push(PassengerFlight {
                passenger_id,
                flight_id,
                transit_mode,
            });
        }
        Ok(links)
    }

    fn passenger(&self, passenger_id: &str) -> Result<Option<Passenger>> {
        let session = self.session()?;
        let result = self
            .runtime
            .block_on(session.query_unpaged(SELECT_PASSENGER, (passenger_id.to_string(),)))?;

        match result.rows_typed::<PassengerRow>()?.next() {
            Some(row) => {
                let (passenger_id, name, age, gender, country_of_origin) = row?;
                Ok(Some(Passenger {
                    passenger_id,
                    name,
                    age,
                    gender,
                    country_of_origin,
                }))
            }
            None => Ok(None),
        }
    }

    fn advertisements_active_at(&self, airport_id: &str, at: Timestamp) -> Result<Vec<Advertisement>> {
        let session = self.session()?;
        let at = CqlTimestamp(at.timestamp_millis());
        let result = self.runtime.block_on(
            session.query_unpaged(SELECT_ACTIVE_ADVERTISEMENTS, (airport_id.to_string(), at, at)),
        )?;

        let mut advertisements = Vec::new();
        for row in result.rows_typed::<AdvertisementRow>()? {
            let (advertisement_id, airport_id, start_date, end_date, budget) = row?;
            advertisements.push(Advertisement {
                advertisement_id,
                airport_id,
                start_date: to_timestamp(start_date)?,
                end_date: to_timestamp(end_date)?,
                budget: to_decimal(budget)?,
            });
        }
        Ok(advertisements)
    }
}

impl Drop for CassandraStore {
    fn drop(&mut self) {
        // The driver's background tasks live on our runtime, so the session
        // has to go while the runtime is still entered
        if let Some(session) = self.session.take() {
            info!("Closing connection");
            let _guard = self.runtime.enter();
            drop(session);
        }
    }
}

fn to_timestamp(value: Option<CqlTimestamp>) -> Result<Option<Timestamp>> {
    value
        .map(|CqlTimestamp(millis)| {
            timestamp_from_millis(millis).ok_or_else(|| anyhow!("Timestamp {} is out of range", millis))
        })
        .transpose()
}

fn to_decimal(value: Option<CqlDecimal>) -> Result<Option<Decimal>> {
    value
        .map(|decimal| -> Result<Decimal> {
            let (bytes, scale) = decimal.as_signed_be_bytes_slice_and_exponent();
            Ok(Decimal::from_signed_be_bytes(bytes, scale)?)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_keyspace;
    use chrono::{TimeZone, Utc};
    use clap::Parser;

    #[test]
    fn test_to_timestamp() {
        let ts = to_timestamp(Some(CqlTimestamp(1_709_251_200_000))).unwrap();
        assert_eq!(ts, Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        assert_eq!(to_timestamp(None).unwrap(), None);
        assert!(to_timestamp(Some(CqlTimestamp(i64::MAX))).is_err());
    }

    #[test]
    fn test_to_decimal() {
        let cql = CqlDecimal::from_signed_be_bytes_slice_and_exponent(&[0x02, 0x49, 0xf0], 2);
        let budget = to_decimal(Some(cql)).unwrap().unwrap();
        assert_eq!(budget.to_string(), "1500.00");
        assert_eq!(to_decimal(None).unwrap(), None);
    }

    // Needs a running cluster: CASSANDRA_CLUSTER_IPS=127.0.0.1 cargo test -- --ignored
    #[test]
    #[ignore]
    fn test_live_cluster_schema_and_empty_queries() {
        let config = Config::try_parse_from(["airport-ads", "--keyspace", "airport_ads_test"]).unwrap();
        let mut store = CassandraStore::connect(&config).unwrap();

        ensure_keyspace(&mut store, &config.keyspace, 1).unwrap();
        ensure_keyspace(&mut store, &config.keyspace, 1).unwrap();

        assert!(store.flights_departing("no-such-airport").unwrap().is_empty());
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(store
            .advertisements_active_at("no-such-airport", at)
            .unwrap()
            .is_empty());
    }
}
