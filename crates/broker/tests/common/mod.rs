//! Test utilities for broker integration tests

use notirelay_core::{BrokerConfig, Event};
use notirelay_storage::{MockConnector, MockNotificationStore};
use std::sync::Arc;

/// Standalone configuration pointing at a store that only the mock connector reaches
#[allow(dead_code)]
pub fn test_config() -> BrokerConfig {
    BrokerConfig {
        stand_alone: "localhost:27017".to_string(),
        retry_per_log_seconds: 5,
        queue_size: 100,
        drain_timeout_secs: 30,
        ..Default::default()
    }
}

/// A mock connector plus a handle on the store it hands out
#[allow(dead_code)]
pub fn mock_connector() -> (Arc<MockConnector>, Arc<MockNotificationStore>) {
    let connector = Arc::new(MockConnector::new());
    let store = connector.store();
    (connector, store)
}

#[allow(dead_code)]
pub fn service_notification(host: &str, service: &str, output: &str) -> Event {
    Event::log(format!(
        "[1700000000] SERVICE NOTIFICATION: admin;{host};{service};CRITICAL;notify-service-by-email;{output}"
    ))
}

#[allow(dead_code)]
pub fn host_notification(host: &str, output: &str) -> Event {
    Event::log(format!(
        "[1700000000] HOST NOTIFICATION: admin;{host};DOWN;notify-host-by-email;{output}"
    ))
}

/// Route test logs through the test harness output
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
