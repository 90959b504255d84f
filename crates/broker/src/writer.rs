use notirelay_core::{parse_notification, Event};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::upsert::{SaveOutcome, UpsertEngine};

/// Start the single writer task
///
/// The task owns the only receiver of the intake queue, so saves happen one
/// at a time in arrival order. It finishes once every sender is dropped and
/// the queue is empty.
pub fn spawn_writer(mut receiver: mpsc::Receiver<Event>, engine: UpsertEngine) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification writer started");

        let mut processed = 0usize;
        while let Some(event) = receiver.recv().await {
            if process_event(&engine, &event).await.is_some() {
                processed += 1;
            }
        }

        info!(processed, "Notification writer stopped");
    })
}

/// Parse one event and save it; `None` when the line is not a host or service notification
pub(crate) async fn process_event(engine: &UpsertEngine, event: &Event) -> Option<SaveOutcome> {
    let Some(parsed) = parse_notification(&event.log_line) else {
        debug!("Ignoring log line without a host or service notification: {}", event.log_line);
        return None;
    };

    let entity_id = parsed.identity.primary_key();
    debug!(
        kind = %parsed.kind(),
        entity_id = %entity_id,
        state = parsed.state.as_deref().unwrap_or_default(),
        "Saving notification"
    );

    let outcome = engine.save(&parsed.identity, parsed.notification).await;
    debug!(entity_id = %entity_id, ?outcome, "Notification processed");
    Some(outcome)
}
