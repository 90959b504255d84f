use notirelay_core::{BrokerConfig, Event, Result};
use notirelay_storage::{NotificationStore, RetryingExecutor, StoreConnector};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::intake::{intake_channel, Admission, IntakeQueue};
use crate::upsert::UpsertEngine;
use crate::writer::spawn_writer;

/// State that only exists between `init()` and `stop()`
struct Running {
    store: Arc<dyn NotificationStore>,
    intake: IntakeQueue,
    writer: JoinHandle<()>,
}

/// Entry point the monitoring daemon drives: lifecycle hooks plus event delivery
pub struct NotificationBroker {
    config: BrokerConfig,
    connector: Arc<dyn StoreConnector>,
    running: Option<Running>,
}

impl NotificationBroker {
    pub fn new(config: BrokerConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            connector,
            running: None,
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Connect to the store and start the writer
    ///
    /// Any previous connection is stopped first, so calling this twice never
    /// leaves two connections open. Configuration and connection errors are
    /// returned to the caller and leave the broker stopped.
    pub async fn init(&mut self) -> Result<()> {
        self.stop().await;

        let target = self.config.connection_target()?;
        debug!(uri = %target.redacted_uri(), "Connecting to notification store");
        let store = self.connector.connect(&target).await?;

        let engine = UpsertEngine::new(
            Arc::clone(&store),
            RetryingExecutor::new(self.config.retry_delay()),
        );
        let (intake, receiver) = intake_channel(self.config.queue_size);
        let writer = spawn_writer(receiver, engine);

        info!(
            version = notirelay_core::VERSION,
            database = %self.config.database,
            queue_size = self.config.queue_size,
            retry_per_log_seconds = self.config.retry_per_log_seconds,
            "Notification broker initialized"
        );

        self.running = Some(Running {
            store,
            intake,
            writer,
        });
        Ok(())
    }

    /// Stop the writer and close the store connection
    ///
    /// Queued events get `drain_timeout_secs` to be written; a writer still
    /// busy after that, e.g. retrying against an unreachable database, is
    /// aborted. Does nothing when already stopped.
    pub async fn stop(&mut self) {
        let Some(Running {
            store,
            intake,
            mut writer,
        }) = self.running.take()
        else {
            return;
        };

        let pending = intake.len();
        // Dropping the only sender lets the writer finish once the queue is empty.
        drop(intake);

        match timeout(self.config.drain_timeout(), &mut writer).await {
            Ok(Ok(())) => debug!(pending, "Notification writer drained"),
            Ok(Err(e)) => error!("Notification writer terminated unexpectedly: {e}"),
            Err(_) => {
                error!(
                    pending,
                    drain_timeout_secs = self.config.drain_timeout_secs,
                    "Notification writer did not drain in time, aborting it"
                );
                writer.abort();
                let _ = writer.await;
            }
        }

        store.close().await;
        info!("Notification broker stopped");
    }

    /// Offer one event from the monitoring daemon; never blocks
    pub fn handle_event(&self, event: Event) -> Admission {
        if !event.is_notification() {
            return Admission::Filtered;
        }

        match &self.running {
            Some(running) => running.intake.offer(event),
            None => {
                debug!("Notification broker is not running, ignoring event");
                Admission::Closed
            }
        }
    }

    /// Feed events from an externally filled source until it closes
    ///
    /// Returns the number of events admitted to the intake queue.
    pub async fn run_from_source(&self, mut source: mpsc::Receiver<Vec<Event>>) -> usize {
        let mut queued = 0;
        while let Some(batch) = source.recv().await {
            for event in batch {
                if self.handle_event(event) == Admission::Queued {
                    queued += 1;
                }
            }
        }
        debug!(queued, "Event source closed");
        queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notirelay_storage::MockConnector;

    fn config() -> BrokerConfig {
        BrokerConfig {
            stand_alone: "localhost:27017".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_events_before_init_are_refused() {
        let broker = NotificationBroker::new(config(), Arc::new(MockConnector::new()));
        assert!(!broker.is_running());
        assert_eq!(
            broker.handle_event(Event::log("HOST NOTIFICATION: admin;web01;DOWN;mail;down")),
            Admission::Closed
        );
    }

    #[tokio::test]
    async fn test_non_notifications_are_filtered_before_init() {
        let broker = NotificationBroker::new(config(), Arc::new(MockConnector::new()));
        assert_eq!(
            broker.handle_event(Event::log("[1700000000] EXTERNAL COMMAND: ignored")),
            Admission::Filtered
        );
        assert_eq!(
            broker.handle_event(Event::new("host_check_result", "HOST NOTIFICATION: x")),
            Admission::Filtered
        );
    }

    #[tokio::test]
    async fn test_stop_without_init_is_a_no_op() {
        let connector = Arc::new(MockConnector::new());
        let mut broker = NotificationBroker::new(config(), connector.clone());
        broker.stop().await;
        broker.stop().await;
        assert_eq!(connector.store().close_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_init() {
        let connector = Arc::new(MockConnector::new());
        let mut broker = NotificationBroker::new(BrokerConfig::default(), connector.clone());

        let err = broker.init().await.unwrap_err();
        assert!(matches!(err, notirelay_core::Error::Config(_)));
        assert!(!broker.is_running());
        assert_eq!(connector.open_count(), 0);
    }
}
