//! Cancellable snapshot streams.
//!
//! A stream is the receiving half of a channel plus a shared open flag.
//! Closing the stream flips the flag so the publishing side stops sending
//! and can forget the subscriber on its next publish.

use super::document::Document;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Full current content of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

/// One push notification.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    Snapshot(Snapshot),
    /// The subscription failed; carries a diagnostic message.
    Error(String),
}

/// Publishing half held by a collection store.
#[derive(Debug, Clone)]
pub struct SnapshotSender {
    collection: String,
    tx: Sender<SnapshotEvent>,
    open: Arc<AtomicBool>,
}

impl SnapshotSender {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Queues `event`. Returns `false` once the stream is closed or dropped.
    pub fn send(&self, event: SnapshotEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.tx.send(event).is_err() {
            self.open.store(false, Ordering::Release);
            return false;
        }
        true
    }

    pub fn send_snapshot(&self, documents: Vec<Document>) -> bool {
        self.send(SnapshotEvent::Snapshot(Snapshot {
            collection: self.collection.clone(),
            documents,
        }))
    }
}

/// Receiving half owned by a subscriber.
///
/// Dropping the stream closes it.
#[derive(Debug)]
pub struct SnapshotStream {
    collection: String,
    rx: Receiver<SnapshotEvent>,
    open: Arc<AtomicBool>,
}

impl SnapshotStream {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Returns the next queued event without blocking.
    ///
    /// Always `None` after `close()`, even if events were queued.
    pub fn try_next(&mut self) -> Option<SnapshotEvent> {
        if !self.is_open() {
            return None;
        }
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.open.store(false, Ordering::Release);
                None
            }
        }
    }

    /// Drains every event queued so far.
    pub fn drain(&mut self) -> Vec<SnapshotEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Detaches the stream and discards anything still queued.
    pub fn close(&mut self) {
        self.open.store(false, Ordering::Release);
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for SnapshotStream {
    fn drop(&mut self) {
        self.open.store(false, Ordering::Release);
    }
}

/// Creates a connected sender/stream pair for `collection`.
pub fn snapshot_channel(collection: &str) -> (SnapshotSender, SnapshotStream) {
    let (tx, rx) = mpsc::channel();
    let open = Arc::new(AtomicBool::new(true));
    (
        SnapshotSender {
            collection: collection.to_string(),
            tx,
            open: Arc::clone(&open),
        },
        SnapshotStream {
            collection: collection.to_string(),
            rx,
            open,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{snapshot_channel, SnapshotEvent};

    #[test]
    fn events_arrive_in_send_order() {
        let (sender, mut stream) = snapshot_channel("todos");
        assert!(sender.send_snapshot(Vec::new()));
        assert!(sender.send(SnapshotEvent::Error("boom".to_string())));

        let events = stream.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SnapshotEvent::Snapshot(_)));
        assert_eq!(events[1], SnapshotEvent::Error("boom".to_string()));
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn closing_discards_queued_events_and_rejects_new_ones() {
        let (sender, mut stream) = snapshot_channel("todos");
        sender.send_snapshot(Vec::new());
        stream.close();

        assert!(!sender.is_open());
        assert!(!sender.send_snapshot(Vec::new()));
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn dropping_the_stream_closes_the_sender() {
        let (sender, stream) = snapshot_channel("depenses");
        drop(stream);
        assert!(!sender.send_snapshot(Vec::new()));
    }
}
