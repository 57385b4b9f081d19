//! # Transport Collaborators
//!
//! The seams between the access layer and everything below and above it.
//!
//! The dispatcher consumes a [`PduTransport`] (fire-and-forget PDU delivery
//! toward the network layer) and exposes a [`StatusCallbacks`] sink through
//! which every started exchange reports exactly one terminal outcome. The
//! bearer below is expected to call back `on_write_complete` or arrange for
//! `on_incomplete_timer_expired`; it also owns cancellation of that timer on
//! success, AID/source validation of incoming frames, and the on-air
//! encryption itself.
//!
//! ## Implementations
//! - **Local**: in-memory transports for tests, examples, and embedding
//!   without a radio

pub mod local;

use crate::error::ProtocolError;
use crate::protocol::message::MessageKind;
use crate::protocol::status::Status;

pub use local::{CallbackEvent, CollectingCallbacks, LoopbackTransport, RecordingTransport};

/// Why an exchange terminated without a parsed status.
#[derive(Debug)]
pub enum FailureReason {
    /// The incomplete timer expired before a reply arrived.
    Timeout,
    /// A reply arrived but could not be decoded.
    Decode(ProtocolError),
}

/// Outbound seam: hands one finished PDU to the network layer.
///
/// Fire-and-forget; the transport reports progress back through the
/// dispatcher's event methods, one callback at a time.
pub trait PduTransport {
    fn send_pdu(&self, destination: u16, pdu: &[u8]);
}

/// Inbound seam: one terminal notification per started exchange.
///
/// `on_message_sent` fires for unacknowledged kinds when their write
/// completes; acknowledged kinds report through `on_status_received` or
/// `on_transaction_failed`. Exchanges superseded by a newer submit report
/// nothing.
pub trait StatusCallbacks {
    fn on_message_sent(&self, kind: MessageKind);
    fn on_status_received(&self, kind: MessageKind, status: Status);
    fn on_transaction_failed(&self, kind: MessageKind, reason: FailureReason);
}
