//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_DATABASE: &str = "notification_relay";
pub(crate) const DEFAULT_USERNAME: &str = "notification_relay";
pub(crate) const DEFAULT_PASSWORD: &str = "notification_relay";

pub(crate) fn default_high_availability() -> bool {
    false
}

pub(crate) fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

pub(crate) fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

pub(crate) fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

pub(crate) fn default_retry_per_log_seconds() -> u64 {
    5
}

pub(crate) fn default_queue_size() -> usize {
    10_000
}

pub(crate) fn default_drain_timeout_secs() -> u64 {
    5
}
