//! Core types for the notification relay
//!
//! This crate provides the foundational pieces shared by the storage and
//! broker crates:
//!
//! - **Events**: the monitoring daemon's event records
//! - **Notifications**: notification, entity identity and entity records
//! - **Parser**: notification log line parsing
//! - **Configuration**: broker configuration loading and validation
//! - **Error handling**: unified error types
//!
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod event;
pub mod notification;
pub mod parser;

// Re-export main types for convenience
pub use config::{BrokerConfig, ConnectionTarget};
pub use error::{Error, Result, ResultExt};
pub use event::Event;
pub use notification::{
    EntityIdentity, EntityKind, EntityRecord, NotificationId, NotificationRecord,
};
pub use parser::{parse_notification, ParsedNotification};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
