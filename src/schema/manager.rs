// Schema manager
// Creates the keyspace and tables on startup. Every statement is
// "IF NOT EXISTS", so running this against an existing cluster is a no-op.

use super::{validate_keyspace_name, SchemaError, TABLES};
use crate::store::Store;
use anyhow::{Context, Result};
use tracing::info;

/// Create the keyspace (if absent), switch to it, and create the tables
///
/// Failures are returned as-is; nothing is retried.
pub fn ensure_keyspace<S: Store>(store: &mut S, name: &str, replication_factor: u32) -> Result<()> {
    validate_keyspace_name(name)?;
    if replication_factor == 0 {
        return Err(SchemaError::InvalidReplicationFactor.into());
    }

    info!(keyspace = name, replication_factor, "Creating keyspace");
    store
        .create_keyspace(name, replication_factor)
        .with_context(|| format!("Failed to create keyspace '{}'", name))?;
    store
        .use_keyspace(name)
        .with_context(|| format!("Failed to switch to keyspace '{}'", name))?;

    ensure_schema(store)
}

/// Create the five tables in the current keyspace (if absent)
pub fn ensure_schema<S: Store>(store: &mut S) -> Result<()> {
    info!("Creating model schema");
    for table in &TABLES {
        store
            .create_table(table)
            .with_context(|| format!("Failed to create table '{}'", table.name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_ensure_keyspace_creates_all_tables() {
        let mut store = MemoryStore::new();
        ensure_keyspace(&mut store, "airport_ads", 1).unwrap();

        assert_eq!(store.current_keyspace(), Some("airport_ads"));
        assert_eq!(store.replication_factor("airport_ads"), Some(1));
        assert_eq!(
            store.table_names("airport_ads"),
            vec!["advertisements", "airports", "flights", "passenger_flights", "passengers"]
        );
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut store = MemoryStore::new();
        ensure_keyspace(&mut store, "airport_ads", 1).unwrap();
        ensure_schema(&mut store).unwrap();
        ensure_schema(&mut store).unwrap();

        assert_eq!(store.table_names("airport_ads").len(), 5);
    }

    #[test]
    fn test_ensure_keyspace_twice_keeps_first_settings() {
        let mut store = MemoryStore::new();
        ensure_keyspace(&mut store, "airport_ads", 1).unwrap();
        ensure_keyspace(&mut store, "airport_ads", 3).unwrap();

        assert_eq!(store.keyspace_names(), vec!["airport_ads"]);
        assert_eq!(store.replication_factor("airport_ads"), Some(1));
        assert_eq!(store.table_names("airport_ads").len(), 5);
    }

    #[test]
    fn test_ensure_schema_without_keyspace_fails() {
        let mut store = MemoryStore::new();
        assert!(ensure_schema(&mut store).is_err());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut store = MemoryStore::new();
        assert!(ensure_keyspace(&mut store, "bad-name", 1).is_err());
        assert!(ensure_keyspace(&mut store, "airport_ads", 0).is_err());
        assert!(store.keyspace_names().is_empty());
    }
}
