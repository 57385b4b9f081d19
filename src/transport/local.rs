//! In-memory transports and sinks.
//!
//! [`LoopbackTransport`] feeds sent PDUs into a tokio channel so an async
//! harness (or an embedding without a radio) can play the network side.
//! [`RecordingTransport`] and [`CollectingCallbacks`] are synchronous
//! doubles: they record everything and let tests assert on it.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::trace;

use crate::protocol::message::MessageKind;
use crate::protocol::status::Status;
use crate::transport::{FailureReason, PduTransport, StatusCallbacks};

/// Transport that forwards every sent PDU into an unbounded channel.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<(u16, Bytes)>,
}

impl LoopbackTransport {
    /// Create the transport and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<(u16, Bytes)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PduTransport for LoopbackTransport {
    fn send_pdu(&self, destination: u16, pdu: &[u8]) {
        trace!(destination, bytes = pdu.len(), "loopback send");
        // A dropped receiver just means nobody is playing the network side.
        let _ = self.tx.send((destination, Bytes::copy_from_slice(pdu)));
    }
}

/// Transport double that records every sent PDU.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<(u16, Vec<u8>)>>>,
}

impl RecordingTransport {
    /// All PDUs sent so far, in order, as (destination, bytes) pairs.
    pub fn sent(&self) -> Vec<(u16, Vec<u8>)> {
        self.sent.lock().expect("transport log poisoned").clone()
    }

    /// The most recently sent PDU.
    pub fn last(&self) -> Option<(u16, Vec<u8>)> {
        self.sent().last().cloned()
    }
}

impl PduTransport for RecordingTransport {
    fn send_pdu(&self, destination: u16, pdu: &[u8]) {
        self.sent
            .lock()
            .expect("transport log poisoned")
            .push((destination, pdu.to_vec()));
    }
}

/// One recorded terminal notification.
#[derive(Debug)]
pub enum CallbackEvent {
    Sent(MessageKind),
    Received(MessageKind, Status),
    Failed(MessageKind, FailureReason),
}

/// Callback sink that collects every notification.
#[derive(Debug, Clone, Default)]
pub struct CollectingCallbacks {
    events: Arc<Mutex<Vec<CallbackEvent>>>,
}

impl CollectingCallbacks {
    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<CallbackEvent> {
        std::mem::take(&mut *self.events.lock().expect("callback log poisoned"))
    }

    /// Number of notifications recorded so far.
    pub fn len(&self) -> usize {
        self.events.lock().expect("callback log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatusCallbacks for CollectingCallbacks {
    fn on_message_sent(&self, kind: MessageKind) {
        self.events
            .lock()
            .expect("callback log poisoned")
            .push(CallbackEvent::Sent(kind));
    }

    fn on_status_received(&self, kind: MessageKind, status: Status) {
        self.events
            .lock()
            .expect("callback log poisoned")
            .push(CallbackEvent::Received(kind, status));
    }

    fn on_transaction_failed(&self, kind: MessageKind, reason: FailureReason) {
        self.events
            .lock()
            .expect("callback log poisoned")
            .push(CallbackEvent::Failed(kind, reason));
    }
}
