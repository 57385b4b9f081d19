//! High-level mesh client.
//!
//! Mirrors the one-shot operations a provisioner application actually
//! performs: look up the bound key, build the request, hand it to the
//! dispatcher. Every operation fails fast, before any PDU is assembled or
//! sent, when its key precondition does not hold.

use rand::Rng;
use tracing::debug;

use crate::core::values::{TimeState, TransitionTime};
use crate::error::{ProtocolError, Result};
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::message::{PublicationParameters, Request, Transition};
use crate::protocol::state::Exchange;
use crate::transport::{PduTransport, StatusCallbacks};
use crate::utils::crypto::{ApplicationKey, KeyStore};

/// Client façade composing a key store with the exchange dispatcher.
///
/// Set messages that carry a transaction identifier draw it from a rolling
/// counter seeded randomly per client, so retries from the same client are
/// distinguishable from new transactions.
pub struct MeshClient<T: PduTransport, S: StatusCallbacks, K: KeyStore> {
    dispatcher: Dispatcher<T, S>,
    keys: K,
    tid: u8,
}

impl<T: PduTransport, S: StatusCallbacks, K: KeyStore> MeshClient<T, S, K> {
    pub fn new(transport: T, callbacks: S, keys: K) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport, callbacks),
            keys,
            tid: rand::thread_rng().gen(),
        }
    }

    /// Submit an already-built request unchanged.
    pub fn send(&mut self, destination: u16, request: Request) -> Result<()> {
        self.dispatcher.submit(destination, request)
    }

    // Event entry points, forwarded verbatim to the dispatcher.

    pub fn on_write_complete(&mut self, pdu: &[u8]) {
        self.dispatcher.on_write_complete(pdu);
    }

    pub fn on_notification(&mut self, source: u16, pdu: &[u8]) {
        self.dispatcher.on_notification(source, pdu);
    }

    pub fn on_incomplete_timer_expired(&mut self) {
        self.dispatcher.on_incomplete_timer_expired();
    }

    pub fn current_exchange(&self) -> Option<&Exchange> {
        self.dispatcher.current()
    }

    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut K {
        &mut self.keys
    }

    // Configuration operations.

    pub fn get_composition_data(&mut self, destination: u16, page: u8) -> Result<()> {
        self.send(destination, Request::CompositionDataGet { page })
    }

    /// Distribute the application key at `app_key_index` to a node.
    pub fn add_app_key(
        &mut self,
        destination: u16,
        net_key_index: u16,
        app_key_index: u16,
    ) -> Result<()> {
        if self.keys.net_key(net_key_index).is_none() {
            return Err(ProtocolError::ConfigError(format!(
                "no network key bound at index 0x{net_key_index:03X}"
            )));
        }
        let app_key = self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::AppKeyAdd {
                net_key_index,
                app_key,
            },
        )
    }

    pub fn bind_app_key(
        &mut self,
        destination: u16,
        element_address: u16,
        model_id: u32,
        app_key_index: u16,
    ) -> Result<()> {
        self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::ModelAppBind {
                element_address,
                app_key_index,
                model_id,
            },
        )
    }

    pub fn unbind_app_key(
        &mut self,
        destination: u16,
        element_address: u16,
        model_id: u32,
        app_key_index: u16,
    ) -> Result<()> {
        self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::ModelAppUnbind {
                element_address,
                app_key_index,
                model_id,
            },
        )
    }

    pub fn set_publication(
        &mut self,
        destination: u16,
        parameters: PublicationParameters,
    ) -> Result<()> {
        self.require_app_key(parameters.app_key_index)?;
        self.send(destination, Request::ModelPublicationSet(parameters))
    }

    pub fn add_subscription(
        &mut self,
        destination: u16,
        element_address: u16,
        address: u16,
        model_id: u32,
    ) -> Result<()> {
        self.send(
            destination,
            Request::ModelSubscriptionAdd {
                element_address,
                address,
                model_id,
            },
        )
    }

    pub fn delete_subscription(
        &mut self,
        destination: u16,
        element_address: u16,
        address: u16,
        model_id: u32,
    ) -> Result<()> {
        self.send(
            destination,
            Request::ModelSubscriptionDelete {
                element_address,
                address,
                model_id,
            },
        )
    }

    pub fn reset_node(&mut self, destination: u16) -> Result<()> {
        self.send(destination, Request::NodeReset)
    }

    pub fn get_network_transmit(&mut self, destination: u16) -> Result<()> {
        self.send(destination, Request::NetworkTransmitGet)
    }

    pub fn set_network_transmit(
        &mut self,
        destination: u16,
        count: u8,
        interval_steps: u8,
    ) -> Result<()> {
        self.send(
            destination,
            Request::NetworkTransmitSet {
                count,
                interval_steps,
            },
        )
    }

    pub fn get_relay(&mut self, destination: u16) -> Result<()> {
        self.send(destination, Request::RelayGet)
    }

    pub fn set_relay(
        &mut self,
        destination: u16,
        relay: u8,
        retransmit_count: u8,
        retransmit_interval_steps: u8,
    ) -> Result<()> {
        self.send(
            destination,
            Request::RelaySet {
                relay,
                retransmit_count,
                retransmit_interval_steps,
            },
        )
    }

    // Generic model operations.

    pub fn get_on_off(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::GenericOnOffGet { app_key })
    }

    pub fn set_on_off(
        &mut self,
        destination: u16,
        app_key_index: u16,
        on: bool,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::GenericOnOffSet {
                app_key,
                on,
                tid,
                transition,
            },
        )
    }

    pub fn set_on_off_unacknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        on: bool,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::GenericOnOffSetUnacknowledged {
                app_key,
                on,
                tid,
                transition,
            },
        )
    }

    pub fn get_level(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::GenericLevelGet { app_key })
    }

    pub fn set_level(
        &mut self,
        destination: u16,
        app_key_index: u16,
        level: i16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::GenericLevelSet {
                app_key,
                level,
                tid,
                transition,
            },
        )
    }

    pub fn set_level_unacknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        level: i16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::GenericLevelSetUnacknowledged {
                app_key,
                level,
                tid,
                transition,
            },
        )
    }

    pub fn get_default_transition_time(
        &mut self,
        destination: u16,
        app_key_index: u16,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::GenericDefaultTransitionTimeGet { app_key })
    }

    pub fn set_default_transition_time(
        &mut self,
        destination: u16,
        app_key_index: u16,
        transition_time: TransitionTime,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::GenericDefaultTransitionTimeSet {
                app_key,
                transition_time,
            },
        )
    }

    // Lighting model operations.

    pub fn get_lightness(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::LightLightnessGet { app_key })
    }

    pub fn set_lightness(
        &mut self,
        destination: u16,
        app_key_index: u16,
        lightness: u16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::LightLightnessSet {
                app_key,
                lightness,
                tid,
                transition,
            },
        )
    }

    pub fn set_lightness_unacknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        lightness: u16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::LightLightnessSetUnacknowledged {
                app_key,
                lightness,
                tid,
                transition,
            },
        )
    }

    pub fn get_ctl(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::LightCtlGet { app_key })
    }

    pub fn set_ctl(
        &mut self,
        destination: u16,
        app_key_index: u16,
        lightness: u16,
        temperature: u16,
        delta_uv: i16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::LightCtlSet {
                app_key,
                lightness,
                temperature,
                delta_uv,
                tid,
                transition,
            },
        )
    }

    pub fn set_ctl_unacknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        lightness: u16,
        temperature: u16,
        delta_uv: i16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::LightCtlSetUnacknowledged {
                app_key,
                lightness,
                temperature,
                delta_uv,
                tid,
                transition,
            },
        )
    }

    pub fn get_hsl(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::LightHslGet { app_key })
    }

    pub fn set_hsl(
        &mut self,
        destination: u16,
        app_key_index: u16,
        lightness: u16,
        hue: u16,
        saturation: u16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::LightHslSet {
                app_key,
                lightness,
                hue,
                saturation,
                tid,
                transition,
            },
        )
    }

    pub fn set_hsl_unacknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        lightness: u16,
        hue: u16,
        saturation: u16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::LightHslSetUnacknowledged {
                app_key,
                lightness,
                hue,
                saturation,
                tid,
                transition,
            },
        )
    }

    // Vendor model operations.

    pub fn send_vendor_acknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        opcode: u32,
        parameters: Vec<u8>,
        status_opcode: u32,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::VendorModelMessageAcked {
                app_key,
                opcode,
                parameters,
                status_opcode,
            },
        )
    }

    pub fn send_vendor_unacknowledged(
        &mut self,
        destination: u16,
        app_key_index: u16,
        opcode: u32,
        parameters: Vec<u8>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::VendorModelMessageUnacked {
                app_key,
                opcode,
                parameters,
            },
        )
    }

    // Scene, time, and scheduler operations.

    pub fn get_scene(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::SceneGet { app_key })
    }

    pub fn get_scene_register(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::SceneRegisterGet { app_key })
    }

    pub fn store_scene(
        &mut self,
        destination: u16,
        app_key_index: u16,
        scene_number: u16,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::SceneStore {
                app_key,
                scene_number,
            },
        )
    }

    pub fn recall_scene(
        &mut self,
        destination: u16,
        app_key_index: u16,
        scene_number: u16,
        transition: Option<Transition>,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        let tid = self.next_tid();
        self.send(
            destination,
            Request::SceneRecall {
                app_key,
                scene_number,
                tid,
                transition,
            },
        )
    }

    pub fn delete_scene(
        &mut self,
        destination: u16,
        app_key_index: u16,
        scene_number: u16,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(
            destination,
            Request::SceneDelete {
                app_key,
                scene_number,
            },
        )
    }

    pub fn get_time(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::TimeGet { app_key })
    }

    pub fn set_time(
        &mut self,
        destination: u16,
        app_key_index: u16,
        time: TimeState,
    ) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::TimeSet { app_key, time })
    }

    pub fn get_scheduler(&mut self, destination: u16, app_key_index: u16) -> Result<()> {
        let app_key = self.require_app_key(app_key_index)?;
        self.send(destination, Request::SchedulerGet { app_key })
    }

    fn require_app_key(&self, index: u16) -> Result<ApplicationKey> {
        self.keys.app_key(index).cloned().ok_or_else(|| {
            debug!(index, "application key precondition failed");
            ProtocolError::NoBoundApplicationKey(index)
        })
    }

    fn next_tid(&mut self) -> u8 {
        self.tid = self.tid.wrapping_add(1);
        self.tid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{CollectingCallbacks, RecordingTransport};
    use crate::utils::crypto::{InMemoryKeyStore, NetworkKey};

    fn client() -> (
        RecordingTransport,
        MeshClient<RecordingTransport, CollectingCallbacks, InMemoryKeyStore>,
    ) {
        let transport = RecordingTransport::default();
        let client = MeshClient::new(
            transport.clone(),
            CollectingCallbacks::default(),
            InMemoryKeyStore::new(),
        );
        (transport, client)
    }

    #[test]
    fn missing_app_key_fails_before_any_send() {
        let (transport, mut client) = client();
        let err = client.set_on_off(0x0001, 0x456, true, None).unwrap_err();
        assert!(matches!(err, ProtocolError::NoBoundApplicationKey(0x456)));
        assert!(transport.sent().is_empty());
        assert!(client.current_exchange().is_none());
    }

    #[test]
    fn tid_advances_between_sets() {
        let (transport, mut client) = client();
        client
            .keys_mut()
            .add_app_key(ApplicationKey::from_hex(0x456, "63964771734fbd76e3b40519d1d94a48").unwrap());

        client.set_on_off(0x0001, 0x456, true, None).unwrap();
        client.set_on_off(0x0001, 0x456, true, None).unwrap();
        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        // Parameters are [state, tid]; the TID byte must differ.
        let tid_a = sent[0].1[3];
        let tid_b = sent[1].1[3];
        assert_eq!(tid_b, tid_a.wrapping_add(1));
    }

    #[test]
    fn lighting_and_scheduler_operations_use_their_opcodes() {
        let (transport, mut client) = client();
        client
            .keys_mut()
            .add_app_key(ApplicationKey::from_hex(0x456, "63964771734fbd76e3b40519d1d94a48").unwrap());

        client.set_ctl(0x0001, 0x456, 0x1000, 0x0320, -5, None).unwrap();
        client.get_scheduler(0x0001, 0x456).unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        // CTL set: opcode, then lightness/temperature/delta LE, then TID.
        assert_eq!(&sent[0].1[..8], &[0x82, 0x5E, 0x00, 0x10, 0x20, 0x03, 0xFB, 0xFF]);
        assert_eq!(sent[1].1, vec![0x82, 0x49]);
    }

    #[test]
    fn add_app_key_requires_network_key() {
        let (_transport, mut client) = client();
        client
            .keys_mut()
            .add_app_key(ApplicationKey::from_hex(0x456, "63964771734fbd76e3b40519d1d94a48").unwrap());
        assert!(client.add_app_key(0x0001, 0x000, 0x456).is_err());

        client
            .keys_mut()
            .add_net_key(NetworkKey::from_hex(0x000, "7dd7364cd842ad18c17c2b820c84c3d6").unwrap());
        assert!(client.add_app_key(0x0001, 0x000, 0x456).is_ok());
    }
}
