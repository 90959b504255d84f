#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
pub mod mock;
mod mongo;
pub mod retry;

pub use error::{OperationOutcome, StoreError, StoreResult};
pub use mock::{InjectedFailure, MockConnector, MockNotificationStore, MockOperation};
pub use mongo::{MongoConnector, MongoNotificationStore};
pub use retry::RetryingExecutor;

use async_trait::async_trait;
use notirelay_core::{
    ConnectionTarget, EntityKind, EntityRecord, NotificationId, NotificationRecord, Result,
};
use std::sync::Arc;

/// Collection holding one document per notification
pub const NOTIFICATIONS_COLLECTION: &str = "notifications";

// ==== Traits ====

/// Collection-level operations against the notification document store
///
/// Every method is a single round trip. Callers decide how to retry; see
/// [`RetryingExecutor`].
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a notification, returning the id the store assigned
    async fn insert_notification(
        &self,
        notification: &NotificationRecord,
    ) -> StoreResult<NotificationId>;

    /// Find entity documents of `kind` by primary key
    async fn find_entities(
        &self,
        kind: EntityKind,
        primary_key: &str,
    ) -> StoreResult<Vec<EntityRecord>>;

    /// Insert a new entity document
    async fn insert_entity(&self, entity: &EntityRecord) -> StoreResult<()>;

    /// Append one id to the notification history of an existing entity document
    ///
    /// Only the new id is written; ids already in the history are left as stored.
    async fn append_notification_id(
        &self,
        kind: EntityKind,
        primary_key: &str,
        notification_id: &NotificationId,
    ) -> StoreResult<()>;

    /// Release the underlying connection. Safe to call more than once.
    async fn close(&self);
}

/// Opens connections to a document store
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a connection and verify the target is reachable
    async fn connect(&self, target: &ConnectionTarget) -> Result<Arc<dyn NotificationStore>>;
}
