//! In-memory document store for testing
//!
//! Behaves like the real store for the four operations the broker uses,
//! rejects duplicate entity primary keys, and lets tests inject transient or
//! permanent failures per operation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use async_trait::async_trait;
use notirelay_core::{
    ConnectionTarget, EntityKind, EntityRecord, NotificationId, NotificationRecord, Result,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::{NotificationStore, StoreConnector};

/// Store operations that failures can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    InsertNotification,
    FindEntities,
    InsertEntity,
    AppendNotificationId,
}

/// Failure class to inject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Transient,
    Permanent,
}

impl InjectedFailure {
    fn into_error(self, op: MockOperation) -> StoreError {
        match self {
            InjectedFailure::Transient => {
                StoreError::Reconnecting(format!("injected transient failure in {op:?}"))
            }
            InjectedFailure::Permanent => {
                StoreError::BackendError(format!("injected permanent failure in {op:?}"))
            }
        }
    }
}

#[derive(Debug, Default)]
struct MockData {
    notifications: Vec<NotificationRecord>,
    // Insertion order is kept so tests can assert on it.
    entities: HashMap<EntityKind, Vec<EntityRecord>>,
    failures: HashMap<MockOperation, VecDeque<InjectedFailure>>,
    attempts: HashMap<MockOperation, usize>,
}

/// Mock notification store for testing
pub struct MockNotificationStore {
    data: Arc<Mutex<MockData>>,
    closes: AtomicUsize,
}

impl MockNotificationStore {
    /// Create a new, empty mock store
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(MockData::default())),
            closes: AtomicUsize::new(0),
        }
    }

    /// Make the next `times` calls of `op` fail with `failure`
    pub fn inject_failure(&self, op: MockOperation, failure: InjectedFailure, times: usize) {
        let mut data = self.data.lock().unwrap();
        let queue = data.failures.entry(op).or_default();
        queue.extend(std::iter::repeat(failure).take(times));
    }

    /// Number of times `op` was called, failed attempts included
    pub fn attempts(&self, op: MockOperation) -> usize {
        self.data
            .lock()
            .unwrap()
            .attempts
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    /// All stored notifications in insertion order
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.data.lock().unwrap().notifications.clone()
    }

    pub fn notification_count(&self) -> usize {
        self.data.lock().unwrap().notifications.len()
    }

    /// All stored entities of `kind` in insertion order
    pub fn entities(&self, kind: EntityKind) -> Vec<EntityRecord> {
        self.data
            .lock()
            .unwrap()
            .entities
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Look up a single stored entity by primary key
    pub fn entity(&self, kind: EntityKind, primary_key: &str) -> Option<EntityRecord> {
        self.entities(kind)
            .into_iter()
            .find(|entity| entity.id == primary_key)
    }

    /// Number of times `close` was called
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Record an attempt of `op` and pop the next injected failure, if any
    fn begin(&self, data: &mut MockData, op: MockOperation) -> StoreResult<()> {
        *data.attempts.entry(op).or_default() += 1;
        match data.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(failure) => Err(failure.into_error(op)),
            None => Ok(()),
        }
    }
}

impl Default for MockNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationStore for MockNotificationStore {
    async fn insert_notification(
        &self,
        notification: &NotificationRecord,
    ) -> StoreResult<NotificationId> {
        let mut data = self.data.lock().unwrap();
        self.begin(&mut data, MockOperation::InsertNotification)?;

        let id = NotificationId(Uuid::new_v4().simple().to_string());
        data.notifications
            .push(notification.clone().with_id(Some(id.clone())));
        Ok(id)
    }

    async fn find_entities(
        &self,
        kind: EntityKind,
        primary_key: &str,
    ) -> StoreResult<Vec<EntityRecord>> {
        let mut data = self.data.lock().unwrap();
        self.begin(&mut data, MockOperation::FindEntities)?;

        Ok(data
            .entities
            .get(&kind)
            .map(|entities| {
                entities
                    .iter()
                    .filter(|entity| entity.id == primary_key)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_entity(&self, entity: &EntityRecord) -> StoreResult<()> {
        let mut data = self.data.lock().unwrap();
        self.begin(&mut data, MockOperation::InsertEntity)?;

        let entities = data.entities.entry(entity.kind()).or_default();
        if entities.iter().any(|existing| existing.id == entity.id) {
            return Err(StoreError::DuplicateKey(entity.id.clone()));
        }
        entities.push(entity.clone());
        Ok(())
    }

    async fn append_notification_id(
        &self,
        kind: EntityKind,
        primary_key: &str,
        notification_id: &NotificationId,
    ) -> StoreResult<()> {
        let mut data = self.data.lock().unwrap();
        self.begin(&mut data, MockOperation::AppendNotificationId)?;

        // Like an update with no match: succeeds without touching anything.
        if let Some(entity) = data
            .entities
            .get_mut(&kind)
            .and_then(|entities| entities.iter_mut().find(|entity| entity.id == primary_key))
        {
            entity.notification_ids.push(notification_id.clone());
        }
        Ok(())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock connector handing out one shared [`MockNotificationStore`]
///
/// Counts how many connections were opened so lifecycle tests can compare
/// opens against the store's close count.
pub struct MockConnector {
    store: Arc<MockNotificationStore>,
    opens: AtomicUsize,
    refuse_connections: bool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MockNotificationStore::new()))
    }

    pub fn with_store(store: Arc<MockNotificationStore>) -> Self {
        Self {
            store,
            opens: AtomicUsize::new(0),
            refuse_connections: false,
        }
    }

    /// A connector whose target is always unreachable
    pub fn unreachable() -> Self {
        Self {
            refuse_connections: true,
            ..Self::new()
        }
    }

    pub fn store(&self) -> Arc<MockNotificationStore> {
        Arc::clone(&self.store)
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Connections opened and not yet closed
    pub fn open_connections(&self) -> usize {
        self.open_count()
            .saturating_sub(self.store.close_count())
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    async fn connect(&self, target: &ConnectionTarget) -> Result<Arc<dyn NotificationStore>> {
        if self.refuse_connections {
            return Err(notirelay_core::Error::connection(format!(
                "Can not connect to {}",
                target.redacted_uri()
            )));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.store) as Arc<dyn NotificationStore>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notirelay_core::EntityIdentity;

    fn notification(output: &str) -> NotificationRecord {
        NotificationRecord {
            output: Some(output.to_string()),
            ..NotificationRecord::default()
        }
    }

    #[tokio::test]
    async fn test_insert_notification_assigns_distinct_ids() {
        let store = MockNotificationStore::new();
        let first = store.insert_notification(&notification("a")).await.unwrap();
        let second = store.insert_notification(&notification("b")).await.unwrap();

        assert_ne!(first, second);
        let stored = store.notifications();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id.as_ref(), Some(&first));
    }

    #[tokio::test]
    async fn test_duplicate_entity_is_rejected() {
        let store = MockNotificationStore::new();
        let entity = EntityRecord::new(EntityIdentity::host("web01"), Vec::new());

        store.insert_entity(&entity).await.unwrap();
        let err = store.insert_entity(&entity).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey("web01".to_string()));
        assert_eq!(store.entities(EntityKind::Host).len(), 1);
    }

    #[tokio::test]
    async fn test_find_is_scoped_by_kind() {
        let store = MockNotificationStore::new();
        store
            .insert_entity(&EntityRecord::new(EntityIdentity::host("web01"), Vec::new()))
            .await
            .unwrap();

        assert_eq!(store.find_entities(EntityKind::Host, "web01").await.unwrap().len(), 1);
        assert!(store
            .find_entities(EntityKind::Service, "web01")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let store = MockNotificationStore::new();
        store.inject_failure(MockOperation::FindEntities, InjectedFailure::Transient, 1);
        store.inject_failure(MockOperation::FindEntities, InjectedFailure::Permanent, 1);

        let first = store.find_entities(EntityKind::Host, "x").await.unwrap_err();
        let second = store.find_entities(EntityKind::Host, "x").await.unwrap_err();
        let third = store.find_entities(EntityKind::Host, "x").await;

        assert!(first.is_transient());
        assert!(!second.is_transient());
        assert!(third.is_ok());
        assert_eq!(store.attempts(MockOperation::FindEntities), 3);
    }

    #[tokio::test]
    async fn test_connector_counts_opens_and_closes() {
        let connector = MockConnector::new();
        let target = notirelay_core::BrokerConfig {
            stand_alone: "localhost:27017".to_string(),
            ..Default::default()
        }
        .connection_target()
        .unwrap();

        let store = connector.connect(&target).await.unwrap();
        assert_eq!(connector.open_connections(), 1);
        store.close().await;
        assert_eq!(connector.open_connections(), 0);

        assert!(MockConnector::unreachable().connect(&target).await.is_err());
    }
}
