//! Exchange state machine scenarios.
//!
//! Covers the externally observable contract of the dispatcher: last submit
//! wins, every started exchange terminates in at most one notification, and
//! a timeout always frees the handler.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use mesh_protocol::protocol::{Dispatcher, MessageKind, Phase, Request};
use mesh_protocol::transport::{
    CallbackEvent, CollectingCallbacks, FailureReason, LoopbackTransport, RecordingTransport,
};
use mesh_protocol::utils::crypto::ApplicationKey;

const NODE_A: u16 = 0x0001;
const NODE_B: u16 = 0x0002;

fn app_key() -> ApplicationKey {
    ApplicationKey::from_hex(0x0456, "63964771734fbd76e3b40519d1d94a48").unwrap()
}

fn harness() -> (
    RecordingTransport,
    CollectingCallbacks,
    Dispatcher<RecordingTransport, CollectingCallbacks>,
) {
    let transport = RecordingTransport::default();
    let callbacks = CollectingCallbacks::default();
    let dispatcher = Dispatcher::new(transport.clone(), callbacks.clone());
    (transport, callbacks, dispatcher)
}

#[test]
fn second_submit_supersedes_the_first() {
    let (transport, callbacks, mut dispatcher) = harness();

    // Exchange A toward node A.
    dispatcher
        .submit(NODE_A, Request::GenericOnOffGet { app_key: app_key() })
        .unwrap();
    // Exchange B toward node B before A got anywhere.
    dispatcher
        .submit(NODE_B, Request::GenericLevelGet { app_key: app_key() })
        .unwrap();

    let exchange = dispatcher.current().expect("B outstanding");
    assert_eq!(exchange.kind(), MessageKind::GenericLevelGet);
    assert_eq!(exchange.destination(), NODE_B);
    assert_eq!(transport.sent().len(), 2);

    // A's late reply arrives after B's write completed; it must be dropped:
    // wrong source and wrong opcode for the exchange now outstanding.
    dispatcher.on_write_complete(&transport.sent()[1].1);
    dispatcher.on_notification(NODE_A, &[0x82, 0x04, 0x01]);
    assert!(callbacks.is_empty());

    // B's own reply still completes normally.
    dispatcher.on_notification(NODE_B, &[0x82, 0x08, 0x10, 0x20]);
    let events = callbacks.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        CallbackEvent::Received(MessageKind::GenericLevelGet, _)
    ));
}

#[test]
fn at_most_one_notification_per_submit() {
    let (transport, callbacks, mut dispatcher) = harness();
    dispatcher
        .submit(NODE_A, Request::GenericOnOffGet { app_key: app_key() })
        .unwrap();
    dispatcher.on_write_complete(&transport.last().unwrap().1);

    dispatcher.on_notification(NODE_A, &[0x82, 0x04, 0x01]);
    // Duplicate and stray replies after completion change nothing.
    dispatcher.on_notification(NODE_A, &[0x82, 0x04, 0x00]);
    dispatcher.on_incomplete_timer_expired();

    assert_eq!(callbacks.take().len(), 1);
}

#[test]
fn timeout_from_any_phase_reaches_idle_and_notifies_once() {
    for complete_write in [false, true] {
        let (transport, callbacks, mut dispatcher) = harness();
        dispatcher
            .submit(NODE_A, Request::CompositionDataGet { page: 0 })
            .unwrap();
        if complete_write {
            dispatcher.on_write_complete(&transport.last().unwrap().1);
        }

        dispatcher.on_incomplete_timer_expired();
        assert!(dispatcher.is_idle());
        assert_eq!(dispatcher.current().unwrap().phase(), Phase::Settled);

        // A second expiry must not produce a second notification.
        dispatcher.on_incomplete_timer_expired();

        let events = callbacks.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            CallbackEvent::Failed(MessageKind::CompositionDataGet, FailureReason::Timeout)
        ));
    }
}

#[test]
fn late_reply_after_timeout_is_recognized_and_dropped() {
    let (transport, callbacks, mut dispatcher) = harness();
    dispatcher
        .submit(NODE_A, Request::GenericOnOffGet { app_key: app_key() })
        .unwrap();
    dispatcher.on_write_complete(&transport.last().unwrap().1);
    dispatcher.on_incomplete_timer_expired();
    assert_eq!(callbacks.take().len(), 1);

    // The awaited status finally arrives, too late.
    dispatcher.on_notification(NODE_A, &[0x82, 0x04, 0x01]);
    assert!(callbacks.is_empty());
}

#[test]
fn unrecognized_opcode_while_idle_changes_nothing() {
    let (transport, callbacks, mut dispatcher) = harness();
    dispatcher
        .submit(NODE_A, Request::GenericOnOffGet { app_key: app_key() })
        .unwrap();
    dispatcher.on_write_complete(&transport.last().unwrap().1);

    // 0x8FFF is assigned to nothing this layer knows.
    dispatcher.on_notification(NODE_A, &[0x8F, 0xFF, 0x00]);

    let exchange = dispatcher.current().expect("still outstanding");
    assert_eq!(exchange.phase(), Phase::AwaitingReply);
    assert!(callbacks.is_empty());
}

#[test]
fn submitting_after_timeout_starts_fresh() {
    let (transport, callbacks, mut dispatcher) = harness();
    dispatcher
        .submit(NODE_A, Request::NetworkTransmitGet)
        .unwrap();
    dispatcher.on_incomplete_timer_expired();
    callbacks.take();

    dispatcher.submit(NODE_A, Request::RelayGet).unwrap();
    dispatcher.on_write_complete(&transport.last().unwrap().1);
    // Relay status: relay enabled, count 2, interval steps 5
    dispatcher.on_notification(NODE_A, &[0x80, 0x28, 0x01, 0x2A]);

    let events = callbacks.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        CallbackEvent::Received(MessageKind::RelayGet, _)
    ));
}

/// Drive a full exchange over the channel-backed loopback transport, with a
/// task playing the node on the other end.
#[tokio::test]
async fn loopback_round_trip() {
    let (transport, mut rx) = LoopbackTransport::channel();
    let callbacks = CollectingCallbacks::default();
    let mut dispatcher = Dispatcher::new(transport, callbacks.clone());

    dispatcher
        .submit(NODE_A, Request::GenericOnOffGet { app_key: app_key() })
        .unwrap();

    // The "network" sees the request PDU...
    let (destination, pdu) = rx.recv().await.expect("request on the wire");
    assert_eq!(destination, NODE_A);
    assert_eq!(&pdu[..], &[0x82, 0x01]);

    // ...confirms the write, then delivers the node's status reply.
    dispatcher.on_write_complete(&pdu);
    dispatcher.on_notification(NODE_A, &[0x82, 0x04, 0x01]);

    let events = callbacks.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        CallbackEvent::Received(MessageKind::GenericOnOffGet, _)
    ));
    assert!(dispatcher.current().is_none());
}
