//! Bounded intake between the event producer and the writer
//!
//! Offering an event never blocks: non-notification events are filtered out
//! silently and a full queue drops the incoming event with a warning.

use notirelay_core::Event;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// What happened to an offered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    /// Not a notification log line
    Filtered,
    /// Queue was full
    Dropped,
    /// The writer is gone
    Closed,
}

/// Producer side of the intake queue
#[derive(Debug, Clone)]
pub struct IntakeQueue {
    sender: mpsc::Sender<Event>,
}

/// Create an intake queue holding at most `capacity` events
///
/// The receiver must be handed to exactly one writer.
pub fn intake_channel(capacity: usize) -> (IntakeQueue, mpsc::Receiver<Event>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (IntakeQueue { sender }, receiver)
}

impl IntakeQueue {
    pub fn offer(&self, event: Event) -> Admission {
        if !event.is_notification() {
            return Admission::Filtered;
        }

        match self.sender.try_send(event) {
            Ok(()) => Admission::Queued,
            Err(TrySendError::Full(event)) => {
                warn!(
                    capacity = self.capacity(),
                    "Intake queue is full, dropping notification: {}", event.log_line
                );
                Admission::Dropped
            }
            Err(TrySendError::Closed(event)) => {
                debug!("Intake queue is closed, ignoring: {}", event.log_line);
                Admission::Closed
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Events waiting for the writer
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
