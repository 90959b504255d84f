//! MongoDB-backed notification store

mod convert;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database};
use notirelay_core::{
    ConnectionTarget, EntityKind, EntityRecord, Error, NotificationId, NotificationRecord, Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::{NotificationStore, StoreConnector, NOTIFICATIONS_COLLECTION};
use convert::{
    append_id_update, classify_error, entity_document, entity_from_document,
    notification_document,
};

/// Opens [`MongoNotificationStore`] connections
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self, target: &ConnectionTarget) -> Result<Arc<dyn NotificationStore>> {
        let store = MongoNotificationStore::connect(target).await?;
        Ok(Arc::new(store) as Arc<dyn NotificationStore>)
    }
}

pub struct MongoNotificationStore {
    client: Client,
    notifications: Collection<Document>,
    hosts: Collection<Document>,
    services: Collection<Document>,
    closed: AtomicBool,
}

impl MongoNotificationStore {
    /// Connect to `target` and check the database answers a ping
    pub async fn connect(target: &ConnectionTarget) -> Result<Self> {
        let redacted = target.redacted_uri();
        info!("Connecting to MongoDB at {}", redacted);

        let client = Client::with_uri_str(target.uri())
            .await
            .map_err(|e| Error::connection(format!("Can not connect to {redacted}: {e}")))?;

        let database = client.database(&target.database);
        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| Error::connection(format!("Can not connect to {redacted}: {e}")))?;

        info!(database = %target.database, "Connected to MongoDB");
        Ok(Self::from_database(client, &database))
    }

    fn from_database(client: Client, database: &Database) -> Self {
        Self {
            notifications: database.collection(NOTIFICATIONS_COLLECTION),
            hosts: database.collection(EntityKind::Host.collection_name()),
            services: database.collection(EntityKind::Service.collection_name()),
            client,
            closed: AtomicBool::new(false),
        }
    }

    fn entities(&self, kind: EntityKind) -> &Collection<Document> {
        match kind {
            EntityKind::Host => &self.hosts,
            EntityKind::Service => &self.services,
        }
    }
}

#[async_trait]
impl NotificationStore for MongoNotificationStore {
    async fn insert_notification(
        &self,
        notification: &NotificationRecord,
    ) -> StoreResult<NotificationId> {
        let result = self
            .notifications
            .insert_one(notification_document(notification), None)
            .await
            .map_err(|e| classify_error(&e, "insert notification"))?;

        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(NotificationId(oid.to_hex())),
            Bson::String(id) => Ok(NotificationId(id)),
            other => Err(StoreError::InvalidDocument(format!(
                "unexpected notification id type: {other}"
            ))),
        }
    }

    async fn find_entities(
        &self,
        kind: EntityKind,
        primary_key: &str,
    ) -> StoreResult<Vec<EntityRecord>> {
        let context = format!("find {}", kind.collection_name());
        let cursor = self
            .entities(kind)
            .find(doc! { "_id": primary_key }, None)
            .await
            .map_err(|e| classify_error(&e, &context))?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| classify_error(&e, &context))?;

        debug!(%kind, primary_key, found = documents.len(), "Looked up entity");
        documents
            .iter()
            .map(|document| entity_from_document(kind, document))
            .collect()
    }

    async fn insert_entity(&self, entity: &EntityRecord) -> StoreResult<()> {
        let kind = entity.kind();
        self.entities(kind)
            .insert_one(entity_document(entity), None)
            .await
            .map_err(|e| classify_error(&e, &format!("insert {}", kind.collection_name())))?;
        Ok(())
    }

    async fn append_notification_id(
        &self,
        kind: EntityKind,
        primary_key: &str,
        notification_id: &NotificationId,
    ) -> StoreResult<()> {
        self.entities(kind)
            .update_one(doc! { "_id": primary_key }, append_id_update(notification_id), None)
            .await
            .map_err(|e| classify_error(&e, &format!("update {}", kind.collection_name())))?;
        Ok(())
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.client.clone().shutdown().await;
        info!("Closed MongoDB connection");
    }
}
