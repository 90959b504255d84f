//! Configuration module for the notification relay
//!
//! Configuration can be loaded from TOML files, environment variables, or the
//! key/value settings handed over by the monitoring daemon.

mod connection;
mod defaults;
mod loading;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use connection::ConnectionTarget;

use defaults::*;

/// Broker configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Use the replica set address list instead of a standalone address
    #[serde(default = "default_high_availability")]
    pub high_availability: bool,

    /// Standalone `host:port`, required when `high_availability` is false
    #[serde(default)]
    pub stand_alone: String,

    /// Comma-separated replica set members, required when `high_availability` is true
    #[serde(default)]
    pub replica_set: String,

    /// Database holding the notifications, hosts and services collections
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Raw connection string options, appended after `?`
    #[serde(default)]
    pub url_options: String,

    /// Delay between attempts while the database is reconnecting
    #[serde(default = "default_retry_per_log_seconds")]
    pub retry_per_log_seconds: u64,

    /// Maximum number of events buffered between intake and the writer
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// How long `stop()` lets the writer drain queued events
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("high_availability", &self.high_availability)
            .field("stand_alone", &self.stand_alone)
            .field("replica_set", &self.replica_set)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .field("url_options", &self.url_options)
            .field("retry_per_log_seconds", &self.retry_per_log_seconds)
            .field("queue_size", &self.queue_size)
            .field("drain_timeout_secs", &self.drain_timeout_secs)
            .finish()
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            high_availability: default_high_availability(),
            stand_alone: String::new(),
            replica_set: String::new(),
            database: default_database(),
            username: default_username(),
            password: default_password(),
            url_options: String::new(),
            retry_per_log_seconds: default_retry_per_log_seconds(),
            queue_size: default_queue_size(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

impl BrokerConfig {
    /// Replica set members, split on commas and trimmed; empty members are dropped
    pub fn replica_set_members(&self) -> Vec<String> {
        self.replica_set
            .split(',')
            .map(str::trim)
            .filter(|member| !member.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_per_log_seconds)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.high_availability {
            if self.replica_set_members().is_empty() {
                return Err(Error::config(
                    "high_availability is enabled but replica_set is not configured".to_string(),
                ));
            }
        } else if self.stand_alone.trim().is_empty() {
            return Err(Error::config(
                "high_availability is disabled but stand_alone is not configured".to_string(),
            ));
        }

        if self.database.is_empty() {
            return Err(Error::config("database cannot be empty".to_string()));
        }

        if self.queue_size == 0 {
            return Err(Error::config(
                "queue_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate and build the address the document store is reached at
    pub fn connection_target(&self) -> Result<ConnectionTarget> {
        self.validate()?;

        let addresses = if self.high_availability {
            self.replica_set_members()
        } else {
            vec![self.stand_alone.trim().to_string()]
        };

        Ok(ConnectionTarget {
            addresses,
            replica_set: self.high_availability,
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            url_options: self.url_options.clone(),
        })
    }
}
