//! Typed outgoing messages and their bit-exact parameter assembly.
//!
//! Every request variant knows its opcode, its message kind tag, and how to
//! pack its semantic fields into wire parameters. Parameters are packed
//! big-endian by bit through [`BitWriter`] and byte-reversed as a whole where
//! the wire format is little-endian; single-byte layouts are unaffected by
//! the reversal. Application messages additionally carry their bound
//! [`ApplicationKey`], whose derived AID travels with the message down to the
//! transport collaborator.
//!
//! The per-variant branch ladders of a classic handler collapse here into one
//! sum type: the dispatcher matches on [`MessageKind`] alone and never needs
//! a per-variant code path.

use crate::core::bits::{reversed, BitWriter};
use crate::core::pdu::{opcode_len, AccessPdu};
use crate::core::values::{TimeState, TransitionTime};
use crate::error::{ProtocolError, Result};
use crate::protocol::opcode;
use crate::utils::crypto::ApplicationKey;

/// Optional transition tail of the acknowledged/unacknowledged set messages:
/// a transition time byte followed by a message execution delay in 5 ms
/// steps. Either both are present on the wire or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub time: TransitionTime,
    pub delay: u8,
}

/// Field set of a model publication set request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationParameters {
    pub element_address: u16,
    pub publish_address: u16,
    pub app_key_index: u16,
    pub credential_flag: bool,
    pub publish_ttl: u8,
    pub period_steps: u8,
    pub period_resolution: u8,
    pub retransmit_count: u8,
    pub retransmit_interval_steps: u8,
    pub model_id: u32,
}

/// Tag identifying a message kind, one per request variant.
///
/// The dispatcher keys its exchange bookkeeping on this tag; callbacks carry
/// it so sinks can correlate notifications with what they submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    CompositionDataGet,
    AppKeyAdd,
    ModelAppBind,
    ModelAppUnbind,
    ModelPublicationSet,
    ModelSubscriptionAdd,
    ModelSubscriptionDelete,
    NodeReset,
    NetworkTransmitGet,
    NetworkTransmitSet,
    RelayGet,
    RelaySet,
    GenericOnOffGet,
    GenericOnOffSet,
    GenericOnOffSetUnacknowledged,
    GenericLevelGet,
    GenericLevelSet,
    GenericLevelSetUnacknowledged,
    GenericDefaultTransitionTimeGet,
    GenericDefaultTransitionTimeSet,
    LightLightnessGet,
    LightLightnessSet,
    LightLightnessSetUnacknowledged,
    LightCtlGet,
    LightCtlSet,
    LightCtlSetUnacknowledged,
    LightHslGet,
    LightHslSet,
    LightHslSetUnacknowledged,
    VendorModelMessageAcked,
    VendorModelMessageUnacked,
    SceneGet,
    SceneRegisterGet,
    SceneStore,
    SceneStoreUnacknowledged,
    SceneRecall,
    SceneRecallUnacknowledged,
    SceneDelete,
    SceneDeleteUnacknowledged,
    TimeGet,
    TimeSet,
    SchedulerGet,
}

/// One outgoing request message.
///
/// Immutable once constructed; `assemble_parameters` is a pure function of
/// the fields and is invoked once when the PDU is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    // Configuration messages, secured with the device key downstream.
    CompositionDataGet { page: u8 },
    AppKeyAdd { net_key_index: u16, app_key: ApplicationKey },
    ModelAppBind { element_address: u16, app_key_index: u16, model_id: u32 },
    ModelAppUnbind { element_address: u16, app_key_index: u16, model_id: u32 },
    ModelPublicationSet(PublicationParameters),
    ModelSubscriptionAdd { element_address: u16, address: u16, model_id: u32 },
    ModelSubscriptionDelete { element_address: u16, address: u16, model_id: u32 },
    NodeReset,
    NetworkTransmitGet,
    NetworkTransmitSet { count: u8, interval_steps: u8 },
    RelayGet,
    RelaySet { relay: u8, retransmit_count: u8, retransmit_interval_steps: u8 },

    // Generic model messages.
    GenericOnOffGet { app_key: ApplicationKey },
    GenericOnOffSet {
        app_key: ApplicationKey,
        on: bool,
        tid: u8,
        transition: Option<Transition>,
    },
    GenericOnOffSetUnacknowledged {
        app_key: ApplicationKey,
        on: bool,
        tid: u8,
        transition: Option<Transition>,
    },
    GenericLevelGet { app_key: ApplicationKey },
    GenericLevelSet {
        app_key: ApplicationKey,
        level: i16,
        tid: u8,
        transition: Option<Transition>,
    },
    GenericLevelSetUnacknowledged {
        app_key: ApplicationKey,
        level: i16,
        tid: u8,
        transition: Option<Transition>,
    },
    GenericDefaultTransitionTimeGet { app_key: ApplicationKey },
    GenericDefaultTransitionTimeSet {
        app_key: ApplicationKey,
        transition_time: TransitionTime,
    },

    // Lighting model messages.
    LightLightnessGet { app_key: ApplicationKey },
    LightLightnessSet {
        app_key: ApplicationKey,
        lightness: u16,
        tid: u8,
        transition: Option<Transition>,
    },
    LightLightnessSetUnacknowledged {
        app_key: ApplicationKey,
        lightness: u16,
        tid: u8,
        transition: Option<Transition>,
    },
    LightCtlGet { app_key: ApplicationKey },
    LightCtlSet {
        app_key: ApplicationKey,
        lightness: u16,
        temperature: u16,
        delta_uv: i16,
        tid: u8,
        transition: Option<Transition>,
    },
    LightCtlSetUnacknowledged {
        app_key: ApplicationKey,
        lightness: u16,
        temperature: u16,
        delta_uv: i16,
        tid: u8,
        transition: Option<Transition>,
    },
    LightHslGet { app_key: ApplicationKey },
    LightHslSet {
        app_key: ApplicationKey,
        lightness: u16,
        hue: u16,
        saturation: u16,
        tid: u8,
        transition: Option<Transition>,
    },
    LightHslSetUnacknowledged {
        app_key: ApplicationKey,
        lightness: u16,
        hue: u16,
        saturation: u16,
        tid: u8,
        transition: Option<Transition>,
    },

    // Vendor model messages; parameters are opaque to the access layer.
    VendorModelMessageAcked {
        app_key: ApplicationKey,
        opcode: u32,
        parameters: Vec<u8>,
        status_opcode: u32,
    },
    VendorModelMessageUnacked {
        app_key: ApplicationKey,
        opcode: u32,
        parameters: Vec<u8>,
    },

    // Scene messages.
    SceneGet { app_key: ApplicationKey },
    SceneRegisterGet { app_key: ApplicationKey },
    SceneStore { app_key: ApplicationKey, scene_number: u16 },
    SceneStoreUnacknowledged { app_key: ApplicationKey, scene_number: u16 },
    SceneRecall {
        app_key: ApplicationKey,
        scene_number: u16,
        tid: u8,
        transition: Option<Transition>,
    },
    SceneRecallUnacknowledged {
        app_key: ApplicationKey,
        scene_number: u16,
        tid: u8,
        transition: Option<Transition>,
    },
    SceneDelete { app_key: ApplicationKey, scene_number: u16 },
    SceneDeleteUnacknowledged { app_key: ApplicationKey, scene_number: u16 },

    // Time and scheduler messages.
    TimeGet { app_key: ApplicationKey },
    TimeSet { app_key: ApplicationKey, time: TimeState },
    SchedulerGet { app_key: ApplicationKey },
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Request::CompositionDataGet { .. } => MessageKind::CompositionDataGet,
            Request::AppKeyAdd { .. } => MessageKind::AppKeyAdd,
            Request::ModelAppBind { .. } => MessageKind::ModelAppBind,
            Request::ModelAppUnbind { .. } => MessageKind::ModelAppUnbind,
            Request::ModelPublicationSet(_) => MessageKind::ModelPublicationSet,
            Request::ModelSubscriptionAdd { .. } => MessageKind::ModelSubscriptionAdd,
            Request::ModelSubscriptionDelete { .. } => MessageKind::ModelSubscriptionDelete,
            Request::NodeReset => MessageKind::NodeReset,
            Request::NetworkTransmitGet => MessageKind::NetworkTransmitGet,
            Request::NetworkTransmitSet { .. } => MessageKind::NetworkTransmitSet,
            Request::RelayGet => MessageKind::RelayGet,
            Request::RelaySet { .. } => MessageKind::RelaySet,
            Request::GenericOnOffGet { .. } => MessageKind::GenericOnOffGet,
            Request::GenericOnOffSet { .. } => MessageKind::GenericOnOffSet,
            Request::GenericOnOffSetUnacknowledged { .. } => {
                MessageKind::GenericOnOffSetUnacknowledged
            }
            Request::GenericLevelGet { .. } => MessageKind::GenericLevelGet,
            Request::GenericLevelSet { .. } => MessageKind::GenericLevelSet,
            Request::GenericLevelSetUnacknowledged { .. } => {
                MessageKind::GenericLevelSetUnacknowledged
            }
            Request::GenericDefaultTransitionTimeGet { .. } => {
                MessageKind::GenericDefaultTransitionTimeGet
            }
            Request::GenericDefaultTransitionTimeSet { .. } => {
                MessageKind::GenericDefaultTransitionTimeSet
            }
            Request::LightLightnessGet { .. } => MessageKind::LightLightnessGet,
            Request::LightLightnessSet { .. } => MessageKind::LightLightnessSet,
            Request::LightLightnessSetUnacknowledged { .. } => {
                MessageKind::LightLightnessSetUnacknowledged
            }
            Request::LightCtlGet { .. } => MessageKind::LightCtlGet,
            Request::LightCtlSet { .. } => MessageKind::LightCtlSet,
            Request::LightCtlSetUnacknowledged { .. } => {
                MessageKind::LightCtlSetUnacknowledged
            }
            Request::LightHslGet { .. } => MessageKind::LightHslGet,
            Request::LightHslSet { .. } => MessageKind::LightHslSet,
            Request::LightHslSetUnacknowledged { .. } => {
                MessageKind::LightHslSetUnacknowledged
            }
            Request::VendorModelMessageAcked { .. } => MessageKind::VendorModelMessageAcked,
            Request::VendorModelMessageUnacked { .. } => MessageKind::VendorModelMessageUnacked,
            Request::SceneGet { .. } => MessageKind::SceneGet,
            Request::SceneRegisterGet { .. } => MessageKind::SceneRegisterGet,
            Request::SceneStore { .. } => MessageKind::SceneStore,
            Request::SceneStoreUnacknowledged { .. } => {
                MessageKind::SceneStoreUnacknowledged
            }
            Request::SceneRecall { .. } => MessageKind::SceneRecall,
            Request::SceneRecallUnacknowledged { .. } => {
                MessageKind::SceneRecallUnacknowledged
            }
            Request::SceneDelete { .. } => MessageKind::SceneDelete,
            Request::SceneDeleteUnacknowledged { .. } => {
                MessageKind::SceneDeleteUnacknowledged
            }
            Request::TimeGet { .. } => MessageKind::TimeGet,
            Request::TimeSet { .. } => MessageKind::TimeSet,
            Request::SchedulerGet { .. } => MessageKind::SchedulerGet,
        }
    }

    pub fn opcode(&self) -> u32 {
        match self {
            Request::CompositionDataGet { .. } => opcode::CONFIG_COMPOSITION_DATA_GET,
            Request::AppKeyAdd { .. } => opcode::CONFIG_APP_KEY_ADD,
            Request::ModelAppBind { .. } => opcode::CONFIG_MODEL_APP_BIND,
            Request::ModelAppUnbind { .. } => opcode::CONFIG_MODEL_APP_UNBIND,
            Request::ModelPublicationSet(_) => opcode::CONFIG_MODEL_PUBLICATION_SET,
            Request::ModelSubscriptionAdd { .. } => opcode::CONFIG_MODEL_SUBSCRIPTION_ADD,
            Request::ModelSubscriptionDelete { .. } => {
                opcode::CONFIG_MODEL_SUBSCRIPTION_DELETE
            }
            Request::NodeReset => opcode::CONFIG_NODE_RESET,
            Request::NetworkTransmitGet => opcode::CONFIG_NETWORK_TRANSMIT_GET,
            Request::NetworkTransmitSet { .. } => opcode::CONFIG_NETWORK_TRANSMIT_SET,
            Request::RelayGet => opcode::CONFIG_RELAY_GET,
            Request::RelaySet { .. } => opcode::CONFIG_RELAY_SET,
            Request::GenericOnOffGet { .. } => opcode::GENERIC_ON_OFF_GET,
            Request::GenericOnOffSet { .. } => opcode::GENERIC_ON_OFF_SET,
            Request::GenericOnOffSetUnacknowledged { .. } => {
                opcode::GENERIC_ON_OFF_SET_UNACKNOWLEDGED
            }
            Request::GenericLevelGet { .. } => opcode::GENERIC_LEVEL_GET,
            Request::GenericLevelSet { .. } => opcode::GENERIC_LEVEL_SET,
            Request::GenericLevelSetUnacknowledged { .. } => {
                opcode::GENERIC_LEVEL_SET_UNACKNOWLEDGED
            }
            Request::GenericDefaultTransitionTimeGet { .. } => {
                opcode::GENERIC_DEFAULT_TRANSITION_TIME_GET
            }
            Request::GenericDefaultTransitionTimeSet { .. } => {
                opcode::GENERIC_DEFAULT_TRANSITION_TIME_SET
            }
            Request::LightLightnessGet { .. } => opcode::LIGHT_LIGHTNESS_GET,
            Request::LightLightnessSet { .. } => opcode::LIGHT_LIGHTNESS_SET,
            Request::LightLightnessSetUnacknowledged { .. } => {
                opcode::LIGHT_LIGHTNESS_SET_UNACKNOWLEDGED
            }
            Request::LightCtlGet { .. } => opcode::LIGHT_CTL_GET,
            Request::LightCtlSet { .. } => opcode::LIGHT_CTL_SET,
            Request::LightCtlSetUnacknowledged { .. } => {
                opcode::LIGHT_CTL_SET_UNACKNOWLEDGED
            }
            Request::LightHslGet { .. } => opcode::LIGHT_HSL_GET,
            Request::LightHslSet { .. } => opcode::LIGHT_HSL_SET,
            Request::LightHslSetUnacknowledged { .. } => {
                opcode::LIGHT_HSL_SET_UNACKNOWLEDGED
            }
            Request::VendorModelMessageAcked { opcode, .. }
            | Request::VendorModelMessageUnacked { opcode, .. } => *opcode,
            Request::SceneGet { .. } => opcode::SCENE_GET,
            Request::SceneRegisterGet { .. } => opcode::SCENE_REGISTER_GET,
            Request::SceneStore { .. } => opcode::SCENE_STORE,
            Request::SceneStoreUnacknowledged { .. } => {
                opcode::SCENE_STORE_UNACKNOWLEDGED
            }
            Request::SceneRecall { .. } => opcode::SCENE_RECALL,
            Request::SceneRecallUnacknowledged { .. } => {
                opcode::SCENE_RECALL_UNACKNOWLEDGED
            }
            Request::SceneDelete { .. } => opcode::SCENE_DELETE,
            Request::SceneDeleteUnacknowledged { .. } => {
                opcode::SCENE_DELETE_UNACKNOWLEDGED
            }
            Request::TimeGet { .. } => opcode::TIME_GET,
            Request::TimeSet { .. } => opcode::TIME_SET,
            Request::SchedulerGet { .. } => opcode::SCHEDULER_GET,
        }
    }

    /// The application key securing this message, if it is an application
    /// (rather than configuration) message.
    pub fn app_key(&self) -> Option<&ApplicationKey> {
        match self {
            Request::GenericOnOffGet { app_key }
            | Request::GenericOnOffSet { app_key, .. }
            | Request::GenericOnOffSetUnacknowledged { app_key, .. }
            | Request::GenericLevelGet { app_key }
            | Request::GenericLevelSet { app_key, .. }
            | Request::GenericLevelSetUnacknowledged { app_key, .. }
            | Request::GenericDefaultTransitionTimeGet { app_key }
            | Request::GenericDefaultTransitionTimeSet { app_key, .. }
            | Request::LightLightnessGet { app_key }
            | Request::LightLightnessSet { app_key, .. }
            | Request::LightLightnessSetUnacknowledged { app_key, .. }
            | Request::LightCtlGet { app_key }
            | Request::LightCtlSet { app_key, .. }
            | Request::LightCtlSetUnacknowledged { app_key, .. }
            | Request::LightHslGet { app_key }
            | Request::LightHslSet { app_key, .. }
            | Request::LightHslSetUnacknowledged { app_key, .. }
            | Request::VendorModelMessageAcked { app_key, .. }
            | Request::VendorModelMessageUnacked { app_key, .. }
            | Request::SceneGet { app_key }
            | Request::SceneRegisterGet { app_key }
            | Request::SceneStore { app_key, .. }
            | Request::SceneStoreUnacknowledged { app_key, .. }
            | Request::SceneRecall { app_key, .. }
            | Request::SceneRecallUnacknowledged { app_key, .. }
            | Request::SceneDelete { app_key, .. }
            | Request::SceneDeleteUnacknowledged { app_key, .. }
            | Request::TimeGet { app_key }
            | Request::TimeSet { app_key, .. }
            | Request::SchedulerGet { app_key } => Some(app_key),
            _ => None,
        }
    }

    /// Derived AID for application messages, `None` for configuration
    /// messages (those are secured with the device key downstream).
    pub fn aid(&self) -> Option<u8> {
        self.app_key().map(ApplicationKey::aid)
    }

    /// Opcode of the status reply this request waits for, `None` for
    /// unacknowledged kinds.
    pub fn expected_status_opcode(&self) -> Option<u32> {
        match self {
            Request::CompositionDataGet { .. } => {
                Some(opcode::CONFIG_COMPOSITION_DATA_STATUS)
            }
            Request::AppKeyAdd { .. } => Some(opcode::CONFIG_APP_KEY_STATUS),
            Request::ModelAppBind { .. } | Request::ModelAppUnbind { .. } => {
                Some(opcode::CONFIG_MODEL_APP_STATUS)
            }
            Request::ModelPublicationSet(_) => Some(opcode::CONFIG_MODEL_PUBLICATION_STATUS),
            Request::ModelSubscriptionAdd { .. } | Request::ModelSubscriptionDelete { .. } => {
                Some(opcode::CONFIG_MODEL_SUBSCRIPTION_STATUS)
            }
            Request::NodeReset => Some(opcode::CONFIG_NODE_RESET_STATUS),
            Request::NetworkTransmitGet | Request::NetworkTransmitSet { .. } => {
                Some(opcode::CONFIG_NETWORK_TRANSMIT_STATUS)
            }
            Request::RelayGet | Request::RelaySet { .. } => Some(opcode::CONFIG_RELAY_STATUS),
            Request::GenericOnOffGet { .. } | Request::GenericOnOffSet { .. } => {
                Some(opcode::GENERIC_ON_OFF_STATUS)
            }
            Request::GenericLevelGet { .. } | Request::GenericLevelSet { .. } => {
                Some(opcode::GENERIC_LEVEL_STATUS)
            }
            Request::GenericDefaultTransitionTimeGet { .. }
            | Request::GenericDefaultTransitionTimeSet { .. } => {
                Some(opcode::GENERIC_DEFAULT_TRANSITION_TIME_STATUS)
            }
            Request::LightLightnessGet { .. } | Request::LightLightnessSet { .. } => {
                Some(opcode::LIGHT_LIGHTNESS_STATUS)
            }
            Request::LightCtlGet { .. } | Request::LightCtlSet { .. } => {
                Some(opcode::LIGHT_CTL_STATUS)
            }
            Request::LightHslGet { .. } | Request::LightHslSet { .. } => {
                Some(opcode::LIGHT_HSL_STATUS)
            }
            Request::VendorModelMessageAcked { status_opcode, .. } => Some(*status_opcode),
            Request::SceneGet { .. } | Request::SceneRecall { .. } => {
                Some(opcode::SCENE_STATUS)
            }
            Request::SceneRegisterGet { .. }
            | Request::SceneStore { .. }
            | Request::SceneDelete { .. } => Some(opcode::SCENE_REGISTER_STATUS),
            Request::TimeGet { .. } | Request::TimeSet { .. } => Some(opcode::TIME_STATUS),
            Request::SchedulerGet { .. } => Some(opcode::SCHEDULER_STATUS),
            Request::GenericOnOffSetUnacknowledged { .. }
            | Request::GenericLevelSetUnacknowledged { .. }
            | Request::LightLightnessSetUnacknowledged { .. }
            | Request::LightCtlSetUnacknowledged { .. }
            | Request::LightHslSetUnacknowledged { .. }
            | Request::VendorModelMessageUnacked { .. }
            | Request::SceneStoreUnacknowledged { .. }
            | Request::SceneRecallUnacknowledged { .. }
            | Request::SceneDeleteUnacknowledged { .. } => None,
        }
    }

    /// Whether this request waits for a status reply.
    pub fn is_acknowledged(&self) -> bool {
        self.expected_status_opcode().is_some()
    }

    /// Pack the semantic fields into wire parameters.
    ///
    /// # Errors
    /// Field values outside their wire ranges are rejected here, before any
    /// PDU leaves the handler.
    pub fn assemble_parameters(&self) -> Result<Vec<u8>> {
        match self {
            Request::CompositionDataGet { page } => Ok(vec![*page]),
            Request::AppKeyAdd {
                net_key_index,
                app_key,
            } => {
                check_range("network key index", *net_key_index, 0x0FFF)?;
                let mut writer = BitWriter::new();
                for byte in app_key.bytes().iter().rev() {
                    writer.write(u64::from(*byte), 8);
                }
                writer.write(u64::from(app_key.index()), 12);
                writer.write(u64::from(*net_key_index), 12);
                Ok(reversed(&writer.finish()))
            }
            Request::ModelAppBind {
                element_address,
                app_key_index,
                model_id,
            }
            | Request::ModelAppUnbind {
                element_address,
                app_key_index,
                model_id,
            } => {
                check_range("application key index", *app_key_index, 0x0FFF)?;
                let mut writer = BitWriter::new();
                write_model_id(&mut writer, *model_id);
                writer.write(u64::from(*app_key_index), 16);
                writer.write(u64::from(*element_address), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::ModelPublicationSet(params) => params.assemble(),
            Request::ModelSubscriptionAdd {
                element_address,
                address,
                model_id,
            }
            | Request::ModelSubscriptionDelete {
                element_address,
                address,
                model_id,
            } => {
                let mut writer = BitWriter::new();
                write_model_id(&mut writer, *model_id);
                writer.write(u64::from(*address), 16);
                writer.write(u64::from(*element_address), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::NodeReset | Request::NetworkTransmitGet | Request::RelayGet => {
                Ok(Vec::new())
            }
            Request::NetworkTransmitSet {
                count,
                interval_steps,
            } => {
                check_range("network transmit count", *count, 0x07)?;
                check_range("network transmit interval steps", *interval_steps, 0x1F)?;
                let mut writer = BitWriter::new();
                writer.write(u64::from(*interval_steps), 5);
                writer.write(u64::from(*count), 3);
                Ok(writer.finish())
            }
            Request::RelaySet {
                relay,
                retransmit_count,
                retransmit_interval_steps,
            } => {
                check_range("relay state", *relay, 0x02)?;
                check_range("relay retransmit count", *retransmit_count, 0x07)?;
                check_range(
                    "relay retransmit interval steps",
                    *retransmit_interval_steps,
                    0x1F,
                )?;
                let mut writer = BitWriter::new();
                writer.write(u64::from(*retransmit_interval_steps), 5);
                writer.write(u64::from(*retransmit_count), 3);
                writer.write(u64::from(*relay), 8);
                Ok(reversed(&writer.finish()))
            }
            Request::GenericOnOffGet { .. }
            | Request::GenericLevelGet { .. }
            | Request::GenericDefaultTransitionTimeGet { .. }
            | Request::LightLightnessGet { .. }
            | Request::LightCtlGet { .. }
            | Request::LightHslGet { .. }
            | Request::SceneGet { .. }
            | Request::SceneRegisterGet { .. }
            | Request::TimeGet { .. }
            | Request::SchedulerGet { .. } => Ok(Vec::new()),
            Request::GenericOnOffSet {
                on,
                tid,
                transition,
                ..
            }
            | Request::GenericOnOffSetUnacknowledged {
                on,
                tid,
                transition,
                ..
            } => {
                let mut writer = BitWriter::new();
                write_transition_tail(&mut writer, *tid, *transition);
                writer.write(u64::from(*on), 8);
                Ok(reversed(&writer.finish()))
            }
            Request::GenericLevelSet {
                level,
                tid,
                transition,
                ..
            }
            | Request::GenericLevelSetUnacknowledged {
                level,
                tid,
                transition,
                ..
            } => {
                let mut writer = BitWriter::new();
                write_transition_tail(&mut writer, *tid, *transition);
                writer.write(u64::from(*level as u16), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::GenericDefaultTransitionTimeSet {
                transition_time, ..
            } => {
                let mut writer = BitWriter::new();
                writer.write(u64::from(transition_time.to_byte()), 8);
                Ok(reversed(&writer.finish()))
            }
            Request::LightLightnessSet {
                lightness,
                tid,
                transition,
                ..
            }
            | Request::LightLightnessSetUnacknowledged {
                lightness,
                tid,
                transition,
                ..
            } => {
                let mut writer = BitWriter::new();
                write_transition_tail(&mut writer, *tid, *transition);
                writer.write(u64::from(*lightness), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::LightCtlSet {
                lightness,
                temperature,
                delta_uv,
                tid,
                transition,
                ..
            }
            | Request::LightCtlSetUnacknowledged {
                lightness,
                temperature,
                delta_uv,
                tid,
                transition,
                ..
            } => {
                let mut writer = BitWriter::new();
                write_transition_tail(&mut writer, *tid, *transition);
                writer.write(u64::from(*delta_uv as u16), 16);
                writer.write(u64::from(*temperature), 16);
                writer.write(u64::from(*lightness), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::LightHslSet {
                lightness,
                hue,
                saturation,
                tid,
                transition,
                ..
            }
            | Request::LightHslSetUnacknowledged {
                lightness,
                hue,
                saturation,
                tid,
                transition,
                ..
            } => {
                let mut writer = BitWriter::new();
                write_transition_tail(&mut writer, *tid, *transition);
                writer.write(u64::from(*saturation), 16);
                writer.write(u64::from(*hue), 16);
                writer.write(u64::from(*lightness), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::VendorModelMessageAcked {
                opcode,
                parameters,
                status_opcode,
                ..
            } => {
                check_vendor_opcode(*opcode)?;
                opcode_len(*status_opcode)?;
                Ok(parameters.clone())
            }
            Request::VendorModelMessageUnacked {
                opcode, parameters, ..
            } => {
                check_vendor_opcode(*opcode)?;
                Ok(parameters.clone())
            }
            Request::SceneStore { scene_number, .. }
            | Request::SceneStoreUnacknowledged { scene_number, .. }
            | Request::SceneDelete { scene_number, .. }
            | Request::SceneDeleteUnacknowledged { scene_number, .. } => {
                check_scene_number(*scene_number)?;
                let mut writer = BitWriter::new();
                writer.write(u64::from(*scene_number), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::SceneRecall {
                scene_number,
                tid,
                transition,
                ..
            }
            | Request::SceneRecallUnacknowledged {
                scene_number,
                tid,
                transition,
                ..
            } => {
                check_scene_number(*scene_number)?;
                let mut writer = BitWriter::new();
                write_transition_tail(&mut writer, *tid, *transition);
                writer.write(u64::from(*scene_number), 16);
                Ok(reversed(&writer.finish()))
            }
            Request::TimeSet { time, .. } => Ok(time.to_parameters()),
        }
    }

    /// Build the complete access PDU for this request.
    pub fn to_pdu(&self) -> Result<AccessPdu> {
        opcode_len(self.opcode())?;
        Ok(AccessPdu::new(self.opcode(), self.assemble_parameters()?))
    }
}

impl PublicationParameters {
    fn assemble(&self) -> Result<Vec<u8>> {
        check_range("application key index", self.app_key_index, 0x0FFF)?;
        check_range("publish period steps", self.period_steps, 0x3F)?;
        check_range("publish period resolution", self.period_resolution, 0x03)?;
        check_range("publish retransmit count", self.retransmit_count, 0x07)?;
        check_range(
            "publish retransmit interval steps",
            self.retransmit_interval_steps,
            0x1F,
        )?;
        let mut writer = BitWriter::new();
        write_model_id(&mut writer, self.model_id);
        writer.write(u64::from(self.retransmit_interval_steps), 5);
        writer.write(u64::from(self.retransmit_count), 3);
        writer.write(u64::from(self.period_resolution), 2);
        writer.write(u64::from(self.period_steps), 6);
        writer.write(u64::from(self.publish_ttl), 8);
        writer.write(0, 3);
        writer.write(u64::from(self.credential_flag), 1);
        writer.write(u64::from(self.app_key_index), 12);
        writer.write(u64::from(self.publish_address), 16);
        writer.write(u64::from(self.element_address), 16);
        Ok(reversed(&writer.finish()))
    }
}

impl MessageKind {
    /// Whether exchanges of this kind wait for a status reply.
    pub fn is_acknowledged(self) -> bool {
        !matches!(
            self,
            MessageKind::GenericOnOffSetUnacknowledged
                | MessageKind::GenericLevelSetUnacknowledged
                | MessageKind::LightLightnessSetUnacknowledged
                | MessageKind::LightCtlSetUnacknowledged
                | MessageKind::LightHslSetUnacknowledged
                | MessageKind::VendorModelMessageUnacked
                | MessageKind::SceneStoreUnacknowledged
                | MessageKind::SceneRecallUnacknowledged
                | MessageKind::SceneDeleteUnacknowledged
        )
    }
}

/// SIG model identifiers occupy 16 bits on the wire, vendor identifiers 32.
fn write_model_id(writer: &mut BitWriter, model_id: u32) {
    if model_id > 0xFFFF {
        writer.write(u64::from(model_id), 32);
    } else {
        writer.write(u64::from(model_id), 16);
    }
}

/// Delay, transition time, and TID, written in reverse wire order so the
/// final byte reversal puts them after the state fields.
fn write_transition_tail(writer: &mut BitWriter, tid: u8, transition: Option<Transition>) {
    if let Some(transition) = transition {
        writer.write(u64::from(transition.delay), 8);
        writer.write(u64::from(transition.time.to_byte()), 8);
    }
    writer.write(u64::from(tid), 8);
}

fn check_range(field: &'static str, value: impl Into<i64>, max: i64) -> Result<()> {
    let value = value.into();
    if value > max {
        return Err(ProtocolError::ValueOutOfRange { field, value });
    }
    Ok(())
}

fn check_scene_number(scene_number: u16) -> Result<()> {
    if scene_number == 0 {
        return Err(ProtocolError::ValueOutOfRange {
            field: "scene number",
            value: 0,
        });
    }
    Ok(())
}

fn check_vendor_opcode(value: u32) -> Result<()> {
    if !(0xC0_0000..=0xFF_FFFF).contains(&value) {
        return Err(ProtocolError::InvalidOpcode(value));
    }
    Ok(())
}
