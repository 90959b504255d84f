//! Notification log line parsing
//!
//! Notification log lines look like
//!
//! ```text
//! [1430000000] SERVICE NOTIFICATION: admin;web01;HTTP;CRITICAL;notify-by-email;Connection refused
//! [1430000000] HOST NOTIFICATION: admin;web01;DOWN;notify-by-email;PING CRITICAL
//! ```
//!
//! The header (everything before the first colon) selects host or service
//! handling and may carry a bracketed timestamp. The body is a positional,
//! semicolon-separated field list.

use regex::Regex;
use std::sync::LazyLock;

use crate::notification::{EntityIdentity, EntityKind, NotificationRecord};

/// Number of body fields in a service notification:
/// contact, host, service description, state, command, output
pub const SERVICE_FIELD_COUNT: usize = 6;

/// Number of body fields in a host notification:
/// contact, host, state, command, output
pub const HOST_FIELD_COUNT: usize = 5;

// Greedy prefix so the last bracketed integer in the header wins.
static TIMESTAMP_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^.*\[(?P<timestamp>\d+)\]").ok());

/// Positional body fields of a notification log line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFields {
    pub contact: Option<String>,
    pub host: Option<String>,
    pub service_description: Option<String>,
    pub state: Option<String>,
    pub command: Option<String>,
    pub output: Option<String>,
}

impl NotificationFields {
    /// Build the field set for `kind` from a log line body
    ///
    /// The body is split into at most as many parts as the kind has fields,
    /// so the final `output` field keeps any further semicolons. Missing
    /// trailing parts stay `None`.
    pub fn from_body(kind: EntityKind, body: &str) -> Self {
        let field_count = match kind {
            EntityKind::Service => SERVICE_FIELD_COUNT,
            EntityKind::Host => HOST_FIELD_COUNT,
        };
        let mut parts = body.splitn(field_count, ';').map(str::to_string);

        let contact = parts.next();
        let host = parts.next();
        let service_description = match kind {
            EntityKind::Service => parts.next(),
            EntityKind::Host => None,
        };

        Self {
            contact,
            host,
            service_description,
            state: parts.next(),
            command: parts.next(),
            output: parts.next(),
        }
    }
}

/// Structured result of parsing one notification log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNotification {
    pub identity: EntityIdentity,
    pub notification: NotificationRecord,
    /// Reported state (e.g. `CRITICAL`, `DOWN`); not persisted
    pub state: Option<String>,
}

impl ParsedNotification {
    pub fn kind(&self) -> EntityKind {
        self.identity.kind()
    }
}

/// Classify a header as host or service notification
///
/// `SERVICE` is checked first since it is the more specific marker.
pub fn classify_header(header: &str) -> Option<EntityKind> {
    if header.contains("SERVICE") {
        Some(EntityKind::Service)
    } else if header.contains("HOST") {
        Some(EntityKind::Host)
    } else {
        None
    }
}

/// Extract the bracketed integer timestamp from a log header, if any
pub fn extract_timestamp(header: &str) -> Option<String> {
    TIMESTAMP_PATTERN
        .as_ref()?
        .captures(header)
        .and_then(|caps| caps.name("timestamp"))
        .map(|m| m.as_str().to_string())
}

/// Parse a raw notification log line
///
/// Returns `None` when the line has no header/body separator or when the
/// header names neither a host nor a service. Malformed bodies never fail:
/// absent fields are carried as `None`.
pub fn parse_notification(log_line: &str) -> Option<ParsedNotification> {
    let (header, body) = log_line.split_once(':')?;
    let kind = classify_header(header)?;
    let fields = NotificationFields::from_body(kind, body.trim_start());

    let identity = match kind {
        EntityKind::Service => EntityIdentity::Service {
            host: fields.host,
            service_description: fields.service_description,
        },
        EntityKind::Host => EntityIdentity::Host { host: fields.host },
    };

    Some(ParsedNotification {
        identity,
        notification: NotificationRecord {
            id: None,
            contact: fields.contact,
            command: fields.command,
            output: fields.output,
            timestamp: extract_timestamp(header),
        },
        state: fields.state,
    })
}
