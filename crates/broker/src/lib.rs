//! Notification relay broker
//!
//! Takes events from the monitoring daemon, queues notification log lines in
//! a bounded intake, and has a single writer task parse and link each one
//! into the document store.
//!
//! ```text
//! handle_event -> IntakeQueue -> writer task -> parse -> UpsertEngine -> RetryingExecutor -> store
//! ```
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod intake;
pub mod lifecycle;
pub mod upsert;
pub mod writer;

pub use intake::{intake_channel, Admission, IntakeQueue};
pub use lifecycle::NotificationBroker;
pub use upsert::{SaveOutcome, UpsertEngine};
pub use writer::spawn_writer;
