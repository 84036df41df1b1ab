// Query service
// The two lookups offered by the menu: passengers departing an airport in a
// month, and advertisements running at an airport in a month.

pub mod month;
pub mod render;

use crate::model::{Advertisement, Passenger, PassengerFlight};
use crate::store::Store;
use anyhow::Result;
use std::collections::VecDeque;
use tracing::{info, warn};

/// One result of the passenger lookup: who flew, and on which flight
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerRow {
    pub passenger: Passenger,
    pub flight_id: String,
}

/// Results of the advertisement lookup
pub type AdvertisementRows = std::vec::IntoIter<Advertisement>;

/// Runs lookups against a store
pub struct QueryService<'a, S: Store> {
    store: &'a S,
    /// Year the advertisement lookup places the requested month in
    reference_year: i32,
}

impl<'a, S: Store> QueryService<'a, S> {
    pub fn new(store: &'a S, reference_year: i32) -> Self {
        Self {
            store,
            reference_year,
        }
    }

    /// Passengers on flights leaving `airport_id` in `month` (of any year)
    ///
    /// The flights are fetched up front; the passenger links and passenger
    /// rows are fetched lazily as the returned iterator is consumed. Months
    /// outside 1-12 match nothing and don't touch the store.
    pub fn passengers_by_airport_month(
        &self,
        airport_id: &str,
        month: i32,
    ) -> Result<PassengerRows<'a, S>> {
        info!(airport_id, month, "Retrieving passengers");

        if !month::is_valid_month(month) {
            return Ok(PassengerRows::new(self.store, VecDeque::new()));
        }

        let flights = self
            .store
            .flights_departing(airport_id)?
            .into_iter()
            .filter(|f| f.departure_time.is_some_and(|ts| month::in_month(&ts, month)))
            .map(|f| f.flight_id)
            .collect();

        Ok(PassengerRows::new(self.store, flights))
    }

    /// Advertisements at `airport_id` running on the first day of `month`
    /// in the reference year
    pub fn advertisements_by_airport_month(
        &self,
        airport_id: &str,
        month: i32,
    ) -> Result<AdvertisementRows> {
        let Some(at) = month::reference_date(self.reference_year, month) else {
            info!(airport_id, month, "Retrieving advertisements (month out of range)");
            return Ok(Vec::new().into_iter());
        };

        info!(airport_id, month, reference_date = %at, "Retrieving advertisements");
        Ok(self.store.advertisements_active_at(airport_id, at)?.into_iter())
    }
}

/// Lazy, single-pass sequence of passenger lookup results
///
/// After an error the sequence ends.
pub struct PassengerRows<'a, S: Store> {
    store: &'a S,
    /// Matching flights whose links haven't been fetched yet
    flights: VecDeque<String>,
    /// Links of the current flight not yet resolved to a passenger
    links: VecDeque<PassengerFlight>,
}

impl<'a, S: Store> PassengerRows<'a, S> {
    fn new(store: &'a S, flights: VecDeque<String>) -> Self {
        Self {
            store,
            flights,
            links: VecDeque::new(),
        }
    }

    fn fail(&mut self, err: anyhow::Error) -> Option<Result<PassengerRow>> {
        self.flights.clear();
        self.links.clear();
        Some(Err(err))
    }
}

impl<S: Store> Iterator for PassengerRows<'_, S> {
    type Item = Result<PassengerRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(link) = self.links.pop_front() {
                match self.store.passenger(&link.passenger_id) {
                    Ok(Some(passenger)) => {
                        return Some(Ok(PassengerRow {
                            passenger,
                            flight_id: link.flight_id,
                        }))
                    }
                    // References aren't enforced, so a link can outlive its passenger
                    Ok(None) => {
                        warn!(
                            passenger_id = %link.passenger_id,
                            flight_id = %link.flight_id,
                            "Skipping link to missing passenger"
                        );
                        continue;
                    }
                    Err(err) => return self.fail(err),
                }
            }

            let flight_id = self.flights.pop_front()?;
            match self.store.passenger_flights(&flight_id) {
                Ok(links) => self.links = links.into(),
                Err(err) => return self.fail(err),
            }
        }
    }
}
