use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Separator between host and service description in a service primary key
pub const SERVICE_KEY_SEPARATOR: char = ',';

/// Kind of monitored entity a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Host,
    Service,
}

impl EntityKind {
    /// Name of the collection holding entity records of this kind
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Host => "hosts",
            EntityKind::Service => "services",
        }
    }
}

/// Key distinguishing a monitored entity
///
/// Fields are optional because malformed log lines degrade to absent values
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityIdentity {
    Host {
        host: Option<String>,
    },
    Service {
        host: Option<String>,
        service_description: Option<String>,
    },
}

impl EntityIdentity {
    pub fn host(host: impl Into<String>) -> Self {
        Self::Host {
            host: Some(host.into()),
        }
    }

    pub fn service(host: impl Into<String>, service_description: impl Into<String>) -> Self {
        Self::Service {
            host: Some(host.into()),
            service_description: Some(service_description.into()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityIdentity::Host { .. } => EntityKind::Host,
            EntityIdentity::Service { .. } => EntityKind::Service,
        }
    }

    pub fn host_name(&self) -> Option<&str> {
        match self {
            EntityIdentity::Host { host } | EntityIdentity::Service { host, .. } => host.as_deref(),
        }
    }

    pub fn service_description(&self) -> Option<&str> {
        match self {
            EntityIdentity::Host { .. } => None,
            EntityIdentity::Service {
                service_description,
                ..
            } => service_description.as_deref(),
        }
    }

    /// Render the identity as the entity document's primary key
    ///
    /// `host` for hosts, `host,service_description` for services. Absent
    /// fields render as empty strings.
    pub fn primary_key(&self) -> String {
        match self {
            EntityIdentity::Host { host } => host.clone().unwrap_or_default(),
            EntityIdentity::Service {
                host,
                service_description,
            } => format!(
                "{}{SERVICE_KEY_SEPARATOR}{}",
                host.as_deref().unwrap_or_default(),
                service_description.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Identifier assigned by the document store when a notification is inserted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single contact-notified state change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Assigned on insert; absent when the insert failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NotificationId>,
    pub contact: Option<String>,
    pub command: Option<String>,
    pub output: Option<String>,
    /// Seconds since the epoch, as found in the log header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl NotificationRecord {
    /// Copy of this record carrying the id assigned by the store
    pub fn with_id(self, id: Option<NotificationId>) -> Self {
        Self { id, ..self }
    }
}

/// Per-host or per-service document linking to its notification history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Primary key, see [`EntityIdentity::primary_key`]
    pub id: String,
    pub identity: EntityIdentity,
    /// Append-only, in arrival order
    pub notification_ids: Vec<NotificationId>,
}

impl EntityRecord {
    pub fn new(identity: EntityIdentity, notification_ids: Vec<NotificationId>) -> Self {
        Self {
            id: identity.primary_key(),
            identity,
            notification_ids,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.identity.kind()
    }
}
