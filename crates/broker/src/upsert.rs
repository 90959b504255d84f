//! Links each stored notification into its host or service history
//!
//! A save is three independently retried round trips: insert the
//! notification, look up the entity, then create the entity or append to its
//! id list. Nothing spans the three; a partial save is logged, not repaired.

use notirelay_core::{EntityIdentity, EntityRecord, NotificationRecord};
use notirelay_storage::{NotificationStore, RetryingExecutor, NOTIFICATIONS_COLLECTION};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a single [`UpsertEngine::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First notification for the entity; entity document created
    Created,
    /// Notification id appended to an existing entity
    Appended,
    /// Entity exists but the notification insert failed, so there was no id to append
    LinkSkipped,
    /// The entity lookup failed; nothing was linked
    LookupFailed,
    /// The entity insert or update failed
    WriteFailed,
}

pub struct UpsertEngine {
    store: Arc<dyn NotificationStore>,
    executor: RetryingExecutor,
}

impl UpsertEngine {
    pub fn new(store: Arc<dyn NotificationStore>, executor: RetryingExecutor) -> Self {
        Self { store, executor }
    }

    pub async fn save(
        &self,
        identity: &EntityIdentity,
        notification: NotificationRecord,
    ) -> SaveOutcome {
        let store = self.store.as_ref();
        let kind = identity.kind();
        let collection = kind.collection_name();

        let record = &notification;
        let notification_id = self
            .executor
            .execute(&format!("insert {NOTIFICATIONS_COLLECTION} {record:?}"), move || {
                store.insert_notification(record)
            })
            .await;

        let primary_key = identity.primary_key();
        let key = primary_key.as_str();

        let Some(existing) = self
            .executor
            .execute(&format!("find {collection} _id={key}"), move || {
                store.find_entities(kind, key)
            })
            .await
        else {
            warn!(
                entity_id = key,
                %kind,
                "Notification stored but link with host or service failed"
            );
            return SaveOutcome::LookupFailed;
        };

        match existing.into_iter().next() {
            None => {
                let entity = EntityRecord::new(identity.clone(), notification_id.into_iter().collect());
                let entity_ref = &entity;
                let inserted = self
                    .executor
                    .execute(&format!("insert {collection} _id={key}"), move || {
                        store.insert_entity(entity_ref)
                    })
                    .await;

                match inserted {
                    Some(()) => {
                        debug!(entity_id = key, %kind, "Created entity");
                        SaveOutcome::Created
                    }
                    None => SaveOutcome::WriteFailed,
                }
            }
            Some(entity) => {
                let Some(id) = notification_id else {
                    warn!(
                        entity_id = key,
                        %kind,
                        "Notification was not stored, leaving entity history unchanged"
                    );
                    return SaveOutcome::LinkSkipped;
                };

                let history_len = entity.notification_ids.len() + 1;
                let id = &id;

                let updated = self
                    .executor
                    .execute(
                        &format!("update {collection} _id={key} push notification_ids={id}"),
                        move || store.append_notification_id(kind, key, id),
                    )
                    .await;

                match updated {
                    Some(()) => {
                        debug!(
                            entity_id = key,
                            %kind,
                            history_len,
                            "Appended notification to entity"
                        );
                        SaveOutcome::Appended
                    }
                    None => SaveOutcome::WriteFailed,
                }
            }
        }
    }
}
