//! BSON document mapping and driver error classification

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use notirelay_core::{EntityIdentity, EntityKind, EntityRecord, NotificationId, NotificationRecord};

use crate::error::StoreError;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Server codes returned while a replica set elects a new primary or a node
/// is shutting down
const RECONNECT_CODES: &[i32] = &[
    91,    // ShutdownInProgress
    189,   // PrimarySteppedDown
    10107, // NotWritablePrimary
    11600, // InterruptedAtShutdown
    11602, // InterruptedDueToReplStateChange
    13435, // NotPrimaryNoSecondaryOk
    13436, // NotPrimaryOrSecondary
];

const RECONNECT_LABELS: &[&str] = &["RetryableWriteError", "TransientTransactionError"];

pub(crate) fn is_reconnect_code(code: i32) -> bool {
    RECONNECT_CODES.contains(&code)
}

/// Map a driver error onto the store error taxonomy
pub(crate) fn classify_error(err: &MongoError, operation: &str) -> StoreError {
    let reconnect_labelled = RECONNECT_LABELS.iter().any(|label| err.contains_label(label));
    classify_kind(&err.kind, reconnect_labelled, format!("{operation}: {err}"))
}

fn classify_kind(kind: &ErrorKind, reconnect_labelled: bool, message: String) -> StoreError {
    if reconnect_labelled {
        return StoreError::Reconnecting(message);
    }

    match kind {
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. } => {
            StoreError::Reconnecting(message)
        }
        ErrorKind::Command(command) if is_reconnect_code(command.code) => {
            StoreError::Reconnecting(message)
        }
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            StoreError::DuplicateKey(message)
        }
        ErrorKind::Write(WriteFailure::WriteConcernError(concern))
            if is_reconnect_code(concern.code) =>
        {
            StoreError::Reconnecting(message)
        }
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            StoreError::InvalidDocument(message)
        }
        _ => StoreError::BackendError(message),
    }
}

/// Store-assigned ids are ObjectIds; anything else is kept as a plain string
pub(crate) fn notification_id_to_bson(id: &NotificationId) -> Bson {
    match ObjectId::parse_str(id.as_str()) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id.0.clone()),
    }
}

pub(crate) fn notification_id_from_bson(value: &Bson) -> Option<NotificationId> {
    match value {
        Bson::ObjectId(oid) => Some(NotificationId(oid.to_hex())),
        Bson::String(s) => Some(NotificationId(s.clone())),
        _ => None,
    }
}

pub(crate) fn notification_ids_to_bson(ids: &[NotificationId]) -> Bson {
    Bson::Array(ids.iter().map(notification_id_to_bson).collect())
}

/// Update pushing one id onto an entity's history, leaving stored ids untouched
pub(crate) fn append_id_update(id: &NotificationId) -> Document {
    doc! { "$push": { "notification_ids": notification_id_to_bson(id) } }
}

pub(crate) fn notification_document(notification: &NotificationRecord) -> Document {
    let mut document = doc! {
        "contact": notification.contact.clone(),
        "command": notification.command.clone(),
        "output": notification.output.clone(),
    };
    if let Some(timestamp) = &notification.timestamp {
        document.insert("timestamp", timestamp.clone());
    }
    document
}

pub(crate) fn entity_document(entity: &EntityRecord) -> Document {
    let mut document = doc! {
        "_id": entity.id.clone(),
        "host": entity.identity.host_name(),
    };
    if entity.kind() == EntityKind::Service {
        document.insert("service_description", entity.identity.service_description());
    }
    document.insert(
        "notification_ids",
        notification_ids_to_bson(&entity.notification_ids),
    );
    document
}

pub(crate) fn entity_from_document(
    kind: EntityKind,
    document: &Document,
) -> Result<EntityRecord, StoreError> {
    let id = document
        .get_str("_id")
        .map_err(|e| StoreError::InvalidDocument(format!("{} document without _id: {e}", kind)))?
        .to_string();

    let host = document.get_str("host").ok().map(str::to_string);
    let identity = match kind {
        EntityKind::Host => EntityIdentity::Host { host },
        EntityKind::Service => EntityIdentity::Service {
            host,
            service_description: document
                .get_str("service_description")
                .ok()
                .map(str::to_string),
        },
    };

    let notification_ids = document
        .get_array("notification_ids")
        .map(|ids| ids.iter().filter_map(notification_id_from_bson).collect())
        .unwrap_or_default();

    Ok(EntityRecord {
        id,
        identity,
        notification_ids,
    })
}
