//! Events delivered by the monitoring daemon
//!
//! The daemon hands over many kinds of events ("broks"); the relay only
//! looks at the kind tag and, for log events, at the raw log line.

use serde::{Deserialize, Serialize};

/// Kind tag carried by log-line events
pub const LOG_EVENT_KIND: &str = "log";

/// Substring a log line must contain to be treated as a notification
pub const NOTIFICATION_MARKER: &str = "NOTIFICATION";

/// A unit of monitoring telemetry delivered by the monitoring daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event kind tag, e.g. `log`, `host_check_result`
    pub kind: String,

    /// Raw log line; empty for non-log events
    #[serde(default)]
    pub log_line: String,
}

impl Event {
    pub fn new(kind: impl Into<String>, log_line: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            log_line: log_line.into(),
        }
    }

    /// Convenience constructor for a log-line event
    pub fn log(log_line: impl Into<String>) -> Self {
        Self::new(LOG_EVENT_KIND, log_line)
    }

    /// Whether this event is a log line describing a host or service notification
    pub fn is_notification(&self) -> bool {
        self.kind == LOG_EVENT_KIND && self.log_line.contains(NOTIFICATION_MARKER)
    }
}
