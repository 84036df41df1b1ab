// Configuration
// Startup options come from the environment (the way the application is
// deployed next to a cluster); every option can also be given as a long
// flag, which is handy when running by hand.

use crate::schema::{validate_keyspace_name, SchemaError};
use chrono::{Datelike, Utc};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Port of the CQL native protocol
pub const DEFAULT_CQL_PORT: u16 = 9042;

/// airport-ads - passengers and advertisements by airport and month
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Comma-separated cluster contact points (host or host:port)
    #[arg(long, env = "CASSANDRA_CLUSTER_IPS", default_value = "localhost")]
    pub cluster_ips: String,

    /// Keyspace holding the application's tables
    #[arg(long, env = "CASSANDRA_KEYSPACE", default_value = "airport_ads", value_parser = parse_keyspace)]
    pub keyspace: String,

    /// Replication factor used when the keyspace has to be created
    #[arg(
        long,
        env = "CASSANDRA_REPLICATION_FACTOR",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub replication_factor: u32,

    /// User name for password authentication
    #[arg(long, env = "CASSANDRA_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Password for password authentication
    #[arg(long, env = "CASSANDRA_PASSWORD", requires = "username", hide_env_values = true)]
    pub password: Option<String>,

    /// Year used to turn a month into a date for advertisement lookups
    /// (default: the current year)
    #[arg(
        long,
        env = "AIRPORT_ADS_REFERENCE_YEAR",
        value_parser = clap::value_parser!(i32).range(1..=9999)
    )]
    pub reference_year: Option<i32>,

    /// File the log is written to
    #[arg(long, env = "AIRPORT_ADS_LOG_FILE", default_value = "airport_ads.log")]
    pub log_file: PathBuf,
}

fn parse_keyspace(name: &str) -> Result<String, SchemaError> {
    validate_keyspace_name(name)?;
    Ok(name.to_string())
}

impl Config {
    /// The contact points to hand to the driver
    ///
    /// Entries are trimmed, empty entries are dropped, and entries without a
    /// port get the default CQL port.
    pub fn contact_points(&self) -> Vec<String> {
        self.cluster_ips
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(with_default_port)
            .collect()
    }

    /// User name and password, when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// The configured reference year, or the current UTC year
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Utc::now().year())
    }
}

fn with_default_port(host: &str) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        return host.to_string();
    }
    // Bare IP addresses (IPv6 ones need brackets once a port is added)
    if let Ok(ip) = host.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_CQL_PORT).to_string();
    }
    if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:{}", host, DEFAULT_CQL_PORT)
    }
}
