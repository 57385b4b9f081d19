//! Exchange dispatcher.
//!
//! Routes the four externally-driven events (submit, write completion,
//! notification, incomplete-timer expiry) to the single outstanding
//! exchange. The transport collaborator is expected to deliver these
//! callbacks sequentially; nothing here blocks or locks.
//!
//! Submitting while an exchange is outstanding replaces it without notice:
//! last submit wins, the superseded exchange's bookkeeping is discarded, and
//! its caller receives no cancellation signal. This mirrors the behavior of
//! the handler this design is drawn from and is deliberate.

use tracing::{debug, trace};

use crate::core::pdu::AccessPdu;
use crate::error::Result;
use crate::protocol::message::Request;
use crate::protocol::state::{Exchange, Phase};
use crate::protocol::status::Status;
use crate::transport::{FailureReason, PduTransport, StatusCallbacks};

/// Single-exchange message dispatcher.
///
/// Owns the current [`Exchange`] slot as the one piece of mutable state;
/// every mutation happens in one of the four event handlers.
pub struct Dispatcher<T: PduTransport, S: StatusCallbacks> {
    transport: T,
    callbacks: S,
    exchange: Option<Exchange>,
}

impl<T: PduTransport, S: StatusCallbacks> Dispatcher<T, S> {
    pub fn new(transport: T, callbacks: S) -> Self {
        Self {
            transport,
            callbacks,
            exchange: None,
        }
    }

    /// Start a new exchange: assemble the request, hand the PDU to the
    /// transport, and make this the current exchange.
    ///
    /// # Errors
    /// Assembly/validation errors surface here synchronously and leave the
    /// current exchange untouched; nothing is sent.
    pub fn submit(&mut self, destination: u16, request: Request) -> Result<()> {
        let pdu = request.to_pdu()?.to_bytes()?;
        if let Some(previous) = &self.exchange {
            debug!(
                superseded = ?previous.kind(),
                phase = ?previous.phase(),
                "replacing outstanding exchange, last submit wins"
            );
        }
        let exchange = Exchange::new(destination, request);
        debug!(kind = ?exchange.kind(), destination, "starting exchange");
        self.exchange = Some(exchange);
        self.transport.send_pdu(destination, &pdu);
        Ok(())
    }

    /// Transport write-completion callback for the PDU most recently sent.
    ///
    /// Acknowledged kinds switch to the no-operation state and keep waiting
    /// for their status reply; unacknowledged kinds are complete and fire
    /// their single terminal notification here.
    pub fn on_write_complete(&mut self, _pdu: &[u8]) {
        let Some(exchange) = self.exchange.as_mut() else {
            trace!("write completion with no exchange outstanding, ignoring");
            return;
        };
        if exchange.phase != Phase::Sending {
            trace!(phase = ?exchange.phase, "duplicate write completion, ignoring");
            return;
        }
        if exchange.kind.is_acknowledged() {
            debug!(kind = ?exchange.kind, "write complete, switching to no-operation state");
            exchange.phase = Phase::AwaitingReply;
        } else {
            debug!(kind = ?exchange.kind, "unacknowledged send complete");
            exchange.phase = Phase::Settled;
            self.callbacks.on_message_sent(exchange.kind);
        }
    }

    /// A mesh PDU addressed to this handler arrived.
    ///
    /// Only the no-operation state examines incoming PDUs; stray, late,
    /// mismatched, or unrecognized notifications are dropped silently.
    pub fn on_notification(&mut self, source: u16, data: &[u8]) {
        let Some(exchange) = self.exchange.as_ref() else {
            trace!(source, "notification with no exchange outstanding, dropping");
            return;
        };
        if exchange.phase == Phase::Sending {
            trace!(source, "notification before write completion, dropping");
            return;
        }
        if source != exchange.destination {
            debug!(
                source,
                expected = exchange.destination,
                "notification from unrelated source, dropping"
            );
            return;
        }
        let pdu = match AccessPdu::from_bytes(data) {
            Ok(pdu) => pdu,
            Err(error) => {
                if exchange.phase == Phase::AwaitingReply {
                    debug!(%error, "unreadable reply, failing exchange");
                    let kind = exchange.kind;
                    self.exchange = None;
                    self.callbacks
                        .on_transaction_failed(kind, FailureReason::Decode(error));
                }
                return;
            }
        };
        if Some(pdu.opcode) != exchange.expected_status {
            debug!(
                opcode = pdu.opcode,
                "opcode does not match the awaited status, dropping"
            );
            return;
        }
        if exchange.phase == Phase::Settled {
            debug!(kind = ?exchange.kind, "late reply for settled exchange, dropping");
            return;
        }
        let kind = exchange.kind;
        match Status::parse(pdu.opcode, &pdu.parameters) {
            Ok(Some(status)) => {
                debug!(?kind, "exchange complete");
                self.exchange = None;
                self.callbacks.on_status_received(kind, status);
            }
            Ok(None) => {
                // Unreachable while expected_status is a known opcode, but
                // parse stays total: treat like any unrecognized PDU.
                trace!(?kind, "awaited opcode parsed to no known status, dropping");
            }
            Err(error) => {
                debug!(?kind, %error, "status parse failed");
                self.exchange = None;
                self.callbacks
                    .on_transaction_failed(kind, FailureReason::Decode(error));
            }
        }
    }

    /// The external incomplete timer fired: no further segments or replies
    /// arrived in time. Unconditionally frees the handler for a new exchange.
    pub fn on_incomplete_timer_expired(&mut self) {
        let Some(exchange) = self.exchange.as_mut() else {
            trace!("incomplete timer expired while idle");
            return;
        };
        if exchange.phase == Phase::Settled {
            trace!(kind = ?exchange.kind, "incomplete timer expired after settlement");
            return;
        }
        debug!(kind = ?exchange.kind, "incomplete timer expired, switching to no-operation state");
        exchange.phase = Phase::Settled;
        let kind = exchange.kind;
        self.callbacks
            .on_transaction_failed(kind, FailureReason::Timeout);
    }

    /// The current exchange, if one is outstanding.
    pub fn current(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    /// Whether the handler is free to start a new exchange without
    /// superseding anything still in flight.
    pub fn is_idle(&self) -> bool {
        self.exchange
            .as_ref()
            .map_or(true, |exchange| exchange.phase == Phase::Settled)
    }
}
