// In-memory store
// A small stand-in for the cluster that behaves the way the application
// observes Cassandra: keyspaces hold tables, tables must be created before
// they are read or written, writes are upserts by primary key, and nothing
// checks references between tables.

use super::Store;
use crate::model::{
    Advertisement, Airport, Flight, FlightDeparture, Passenger, PassengerFlight, Timestamp,
};
use crate::schema::{self, TableSchema};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::cell::Cell;
use std::collections::BTreeMap;

/// Rows of every table, keyed by primary key
/// BTreeMap keeps iteration order deterministic, which keeps tests stable
#[derive(Debug, Default)]
struct Tables {
    airports: BTreeMap<String, Airport>,
    passengers: BTreeMap<String, Passenger>,
    flights: BTreeMap<String, Flight>,
    passenger_flights: BTreeMap<(String, String), PassengerFlight>,
    advertisements: BTreeMap<String, Advertisement>,
}

#[derive(Debug)]
struct Keyspace {
    replication_factor: u32,
    /// Tables created so far, by name
    created: BTreeMap<&'static str, TableSchema>,
    data: Tables,
}

/// Rows to preload, as found in a JSON fixture file
/// Every list is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub airports: Vec<Airport>,
    pub passengers: Vec<Passenger>,
    pub flights: Vec<Flight>,
    pub passenger_flights: Vec<PassengerFlight>,
    pub advertisements: Vec<Advertisement>,
}

/// An in-process database with the same observable behavior as the cluster
#[derive(Debug, Default)]
pub struct MemoryStore {
    keyspaces: BTreeMap<String, Keyspace>,
    current: Option<String>,
    /// Number of read queries served, so callers can check nothing was queried
    queries: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the tables created in `keyspace`, in name order
    pub fn table_names(&self, keyspace: &str) -> Vec<&'static str> {
        self.keyspaces
            .get(keyspace)
            .map(|ks| ks.created.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn keyspace_names(&self) -> Vec<&str> {
        self.keyspaces.keys().map(String::as_str).collect()
    }

    pub fn replication_factor(&self, keyspace: &str) -> Option<u32> {
        self.keyspaces.get(keyspace).map(|ks| ks.replication_factor)
    }

    pub fn current_keyspace(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// How many read queries have been executed
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    pub fn insert_airport(&mut self, airport: Airport) -> Result<()> {
        let data = self.writable(&schema::AIRPORTS)?;
        data.airports.insert(airport.airport_id.clone(), airport);
        Ok(())
    }

    pub fn insert_passenger(&mut self, passenger: Passenger) -> Result<()> {
        let data = self.writable(&schema::PASSENGERS)?;
        data.passengers.insert(passenger.passenger_id.clone(), passenger);
        Ok(())
    }

    pub fn insert_flight(&mut self, flight: Flight) -> Result<()> {
        let data = self.writable(&schema::FLIGHTS)?;
        data.flights.insert(flight.flight_id.clone(), flight);
        Ok(())
    }

    pub fn insert_passenger_flight(&mut self, link: PassengerFlight) -> Result<()> {
        let data = self.writable(&schema::PASSENGER_FLIGHTS)?;
        let key = (link.passenger_id.clone(), link.flight_id.clone());
        data.passenger_flights.insert(key, link);
        Ok(())
    }

    pub fn insert_advertisement(&mut self, advertisement: Advertisement) -> Result<()> {
        let data = self.writable(&schema::ADVERTISEMENTS)?;
        data.advertisements
            .insert(advertisement.advertisement_id.clone(), advertisement);
        Ok(())
    }

    /// Insert every row of a JSON fixture into the current keyspace
    pub fn load_fixture(&mut self, json: &str) -> Result<()> {
        let fixture: Fixture =
            serde_json::from_str(json).map_err(|e| anyhow!("Invalid fixture: {}", e))?;

        for airport in fixture.airports {
            self.insert_airport(airport)?;
        }
        for passenger in fixture.passengers {
            self.insert_passenger(passenger)?;
        }
        for flight in fixture.flights {
            self.insert_flight(flight)?;
        }
        for link in fixture.passenger_flights {
            self.insert_passenger_flight(link)?;
        }
        for advertisement in fixture.advertisements {
            self.insert_advertisement(advertisement)?;
        }

        Ok(())
    }

    fn keyspace(&self) -> Result<&Keyspace> {
        let name = self
            .current
            .as_ref()
            .ok_or_else(|| anyhow!("No keyspace has been specified"))?;
        self.keyspaces
            .get(name)
            .ok_or_else(|| anyhow!("Keyspace '{}' does not exist", name))
    }

    /// The data of the current keyspace, if `table` exists in it
    fn readable(&self, table: &TableSchema) -> Result<&Tables> {
        let keyspace = self.keyspace()?;
        if !keyspace.created.contains_key(table.name) {
            return Err(anyhow!("unconfigured table {}", table.name));
        }
        self.queries.set(self.queries.get() + 1);
        Ok(&keyspace.data)
    }

    fn writable(&mut self, table: &TableSchema) -> Result<&mut Tables> {
        let name = self
            .current
            .clone()
            .ok_or_else(|| anyhow!("No keyspace has been specified"))?;
        let keyspace = self
            .keyspaces
            .get_mut(&name)
            .ok_or_else(|| anyhow!("Keyspace '{}' does not exist", name))?;
        if !keyspace.created.contains_key(table.name) {
            return Err(anyhow!("unconfigured table {}", table.name));
        }
        Ok(&mut keyspace.data)
    }
}

impl Store for MemoryStore {
    fn create_keyspace(&mut self, name: &str, replication_factor: u32) -> Result<()> {
        schema::validate_keyspace_name(name)?;
        // IF NOT EXISTS: an existing keyspace keeps its replication settings
        self.keyspaces.entry(name.to_string()).or_insert_with(|| Keyspace {
            replication_factor,
            created: BTreeMap::new(),
            data: Tables::default(),
        });
        Ok(())
    }

    fn use_keyspace(&mut self, name: &str) -> Result<()> {
        if !self.keyspaces.contains_key(name) {
            return Err(anyhow!("Keyspace '{}' does not exist", name));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    fn create_table(&mut self, table: &TableSchema) -> Result<()> {
        let name = self
            .current
            .clone()
            .ok_or_else(|| anyhow!("No keyspace has been specified"))?;
        let keyspace = self
            .keyspaces
            .get_mut(&name)
            .ok_or_else(|| anyhow!("Keyspace '{}' does not exist", name))?;
        keyspace.created.entry(table.name).or_insert(*table);
        Ok(())
    }

    fn flights_departing(&self, airport_id: &str) -> Result<Vec<FlightDeparture>> {
        let data = self.readable(&schema::FLIGHTS)?;
        Ok(data
            .flights
            .values()
            .filter(|f| f.departure_airport_id.as_deref() == Some(airport_id))
            .map(Flight::departure)
            .collect())
    }

    fn passenger_flights(&self, flight_id: &str) -> Result<Vec<PassengerFlight>> {
        let data = self.readable(&schema::PASSENGER_FLIGHTS)?;
        Ok(data
            .passenger_flights
            .values()
            .filter(|link| link.flight_id == flight_id)
            .cloned()
            .collect())
    }

    fn passenger(&self, passenger_id: &str) -> Result<Option<Passenger>> {
        let data = self.readable(&schema::PASSENGERS)?;
        Ok(data.passengers.get(passenger_id).cloned())
    }

    fn advertisements_active_at(&self, airport_id: &str, at: Timestamp) -> Result<Vec<Advertisement>> {
        let data = self.readable(&schema::ADVERTISEMENTS)?;
        Ok(data
            .advertisements
            .values()
            .filter(|ad| ad.airport_id.as_deref() == Some(airport_id) && ad.is_active_at(at))
            .cloned()
            .collect())
    }
}
