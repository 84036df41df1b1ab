// Store
// The narrow interface between the application and the database engine.
// Everything the schema manager and the query service need from the cluster
// goes through this trait, so the same logic runs against a real cluster
// (CassandraStore) or an in-process one (MemoryStore).

pub mod cassandra;
pub mod memory;

pub use cassandra::CassandraStore;
pub use memory::MemoryStore;

use crate::model::{Advertisement, FlightDeparture, Passenger, PassengerFlight, Timestamp};
use crate::schema::TableSchema;
use anyhow::Result;

/// Blocking access to the database
///
/// Every method is one round trip (or its in-memory equivalent); errors are
/// whatever the engine reports and are not retried.
pub trait Store {
    /// Create the keyspace if it doesn't exist yet
    fn create_keyspace(&mut self, name: &str, replication_factor: u32) -> Result<()>;

    /// Make `name` the keyspace unqualified table names refer to
    fn use_keyspace(&mut self, name: &str) -> Result<()>;

    /// Create the table in the current keyspace if it doesn't exist yet
    fn create_table(&mut self, table: &TableSchema) -> Result<()>;

    /// All flights whose departure airport is `airport_id`
    fn flights_departing(&self, airport_id: &str) -> Result<Vec<FlightDeparture>>;

    /// The passenger links of one flight
    fn passenger_flights(&self, flight_id: &str) -> Result<Vec<PassengerFlight>>;

    /// Look up a passenger by primary key
    fn passenger(&self, passenger_id: &str) -> Result<Option<Passenger>>;

    /// Advertisements at `airport_id` whose validity window contains `at`
    fn advertisements_active_at(&self, airport_id: &str, at: Timestamp) -> Result<Vec<Advertisement>>;
}
