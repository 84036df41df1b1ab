// airport-ads - passengers and advertisements by airport and month
// This is the library root that exposes the public API

pub mod app;
pub mod config;
pub mod menu;
pub mod model;
pub mod query;
pub mod schema;
pub mod store;

// Re-export commonly used types for convenience
pub use app::AppContext;
pub use config::Config;
pub use model::{Advertisement, Airport, Decimal, Flight, Passenger, PassengerFlight, Timestamp};
pub use query::{PassengerRow, QueryService};
pub use store::{CassandraStore, MemoryStore, Store};
