// Schema definitions
// The keyspace and the five tables this application reads, described as data.
// CQL DDL is rendered from these definitions, and the in-memory store uses
// the same definitions, so both backends agree on what "the schema" is.

pub mod manager;

pub use manager::{ensure_keyspace, ensure_schema};

use thiserror::Error;

/// Longest keyspace name Cassandra accepts
pub const MAX_KEYSPACE_NAME_LEN: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid keyspace name '{name}': {reason}")]
    InvalidKeyspaceName { name: String, reason: &'static str },
    #[error("replication factor must be at least 1")]
    InvalidReplicationFactor,
}

/// The CQL column types used by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Text,
    Int,
    Timestamp,
    Decimal,
}

impl DataType {
    pub fn cql_name(&self) -> &'static str {
        match self {
            DataType::Text => "TEXT",
            DataType::Int => "INT",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Decimal => "DECIMAL",
        }
    }
}

/// A single column definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub data_type: DataType,
}

/// A declared association from one column to another table's key
///
/// Cassandra has no foreign keys. These are kept so the relationships are
/// documented in the cluster (as the table comment), but nothing checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub column: &'static str,
    pub table: &'static str,
    pub target_column: &'static str,
}

/// The structure of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// First entry is the partition key, the rest are clustering columns
    pub primary_key: &'static [&'static str],
    pub references: &'static [Reference],
}

const fn column(name: &'static str, data_type: DataType) -> Column {
    Column { name, data_type }
}

const fn reference(column: &'static str, table: &'static str, target_column: &'static str) -> Reference {
    Reference {
        column,
        table,
        target_column,
    }
}

pub const AIRPORTS: TableSchema = TableSchema {
    name: "airports",
    columns: &[
        column("airport_id", DataType::Text),
        column("name", DataType::Text),
        column("city", DataType::Text),
        column("country", DataType::Text),
        column("iata_code", DataType::Text),
    ],
    primary_key: &["airport_id"],
    references: &[],
};

pub const PASSENGERS: TableSchema = TableSchema {
    name: "passengers",
    columns: &[
        column("passenger_id", DataType::Text),
        column("name", DataType::Text),
        column("age", DataType::Int),
        column("gender", DataType::Text),
        column("country_of_origin", DataType::Text),
    ],
    primary_key: &["passenger_id"],
    references: &[],
};

pub const FLIGHTS: TableSchema = TableSchema {
    name: "flights",
    columns: &[
        column("flight_id", DataType::Text),
        column("departure_airport_id", DataType::Text),
        column("arrival_airport_id", DataType::Text),
        column("departure_time", DataType::Timestamp),
        column("arrival_time", DataType::Timestamp),
        column("airline", DataType::Text),
        column("flight_number", DataType::Text),
    ],
    primary_key: &["flight_id"],
    references: &[
        reference("departure_airport_id", "airports", "airport_id"),
        reference("arrival_airport_id", "airports", "airport_id"),
    ],
};

pub const PASSENGER_FLIGHTS: TableSchema = TableSchema {
    name: "passenger_flights",
    columns: &[
        column("passenger_id", DataType::Text),
        column("flight_id", DataType::Text),
        column("transit_mode", DataType::Text),
    ],
    primary_key: &["passenger_id", "flight_id"],
    references: &[
        reference("passenger_id", "passengers", "passenger_id"),
        reference("flight_id", "flights", "flight_id"),
    ],
};

pub const ADVERTISEMENTS: TableSchema = TableSchema {
    name: "advertisements",
    columns: &[
        column("advertisement_id", DataType::Text),
        column("airport_id", DataType::Text),
        column("start_date", DataType::Timestamp),
        column("end_date", DataType::Timestamp),
        column("budget", DataType::Decimal),
    ],
    primary_key: &["advertisement_id"],
    references: &[reference("airport_id", "airports", "airport_id")],
};

/// All tables, in the order they are created (referenced tables first)
pub const TABLES: [TableSchema; 5] = [AIRPORTS, PASSENGERS, FLIGHTS, PASSENGER_FLIGHTS, ADVERTISEMENTS];

impl TableSchema {
    /// The table comment listing the declared references, if there are any
    pub fn comment(&self) -> Option<String> {
        if self.references.is_empty() {
            return None;
        }

        let refs: Vec<String> = self
            .references
            .iter()
            .map(|r| format!("{} -> {}.{}", r.column, r.table, r.target_column))
            .collect();
        Some(format!("references (not enforced): {}", refs.join(", ")))
    }

    /// Render the idempotent CREATE TABLE statement for this table
    pub fn create_statement(&self) -> String {
        let mut ddl = format!("CREATE TABLE IF NOT EXISTS {} (\n", self.name);
        for col in self.columns {
            ddl.push_str(&format!("    {} {},\n", col.name, col.data_type.cql_name()));
        }
        ddl.push_str(&format!("    PRIMARY KEY ({})\n)", self.primary_key.join(", ")));

        if let Some(comment) = self.comment() {
            // Single quotes are escaped by doubling them in CQL string literals
            ddl.push_str(&format!(" WITH comment = '{}'", comment.replace('\'', "''")));
        }

        ddl
    }
}

/// Check a keyspace name before it gets interpolated into DDL
///
/// Unquoted CQL identifiers: a letter followed by letters, digits or
/// underscores, at most 48 characters.
pub fn validate_keyspace_name(name: &str) -> Result<(), SchemaError> {
    let invalid = |reason| SchemaError::InvalidKeyspaceName {
        name: name.to_string(),
        reason,
    };

    let first = name.chars().next().ok_or_else(|| invalid("name is empty"))?;
    if name.len() > MAX_KEYSPACE_NAME_LEN {
        return Err(invalid("name is longer than 48 characters"));
    }
    if !first.is_ascii_alphabetic() {
        return Err(invalid("name must start with a letter"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("only letters, digits and underscores are allowed"));
    }

    Ok(())
}

/// Render the CREATE KEYSPACE statement (single-datacenter replication)
pub fn create_keyspace_statement(name: &str, replication_factor: u32) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {name} \
         WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {replication_factor}}}"
    )
}
