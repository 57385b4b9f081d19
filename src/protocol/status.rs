//! Typed incoming status messages.
//!
//! Each variant parses its raw parameter buffer through the bit codec in the
//! exact inverse of the order its counterpart request (or the reporting
//! element) assembles it, so every layout round-trips. Reserved sentinel
//! values are preserved as-is.
//!
//! Unknown opcodes parse to `None` rather than an error: dropping
//! unrecognized notifications silently is part of the dispatcher contract.

use crate::core::bits::{reversed, BitReader};
use crate::core::pdu::AccessPdu;
use crate::core::values::{ScheduleRegister, TimeState, TransitionTime};
use crate::error::{ProtocolError, Result};
use crate::protocol::message::PublicationParameters;
use crate::protocol::opcode;

/// One parsed status notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    CompositionData {
        page: u8,
        company_id: u16,
        product_id: u16,
        version_id: u16,
        crpl: u16,
        features: u16,
        /// Raw element records; element table modeling belongs to storage.
        elements: Vec<u8>,
    },
    AppKey {
        status: u8,
        net_key_index: u16,
        app_key_index: u16,
    },
    ModelApp {
        status: u8,
        element_address: u16,
        app_key_index: u16,
        model_id: u32,
    },
    ModelPublication {
        status: u8,
        parameters: PublicationParameters,
    },
    ModelSubscription {
        status: u8,
        element_address: u16,
        address: u16,
        model_id: u32,
    },
    NodeReset,
    NetworkTransmit {
        count: u8,
        interval_steps: u8,
    },
    Relay {
        relay: u8,
        retransmit_count: u8,
        retransmit_interval_steps: u8,
    },
    GenericOnOff {
        present_on: bool,
        target_on: Option<bool>,
        remaining_time: Option<TransitionTime>,
    },
    GenericLevel {
        present_level: i16,
        target_level: Option<i16>,
        remaining_time: Option<TransitionTime>,
    },
    GenericDefaultTransitionTime {
        transition_time: TransitionTime,
    },
    LightLightness {
        present_lightness: u16,
        target_lightness: Option<u16>,
        remaining_time: Option<TransitionTime>,
    },
    LightCtl {
        present_lightness: u16,
        present_temperature: u16,
        target_lightness: Option<u16>,
        target_temperature: Option<u16>,
        remaining_time: Option<TransitionTime>,
    },
    LightHsl {
        lightness: u16,
        hue: u16,
        saturation: u16,
        remaining_time: Option<TransitionTime>,
    },
    Scene {
        status_code: u8,
        current_scene: u16,
        target_scene: Option<u16>,
        remaining_time: Option<TransitionTime>,
    },
    SceneRegister {
        status_code: u8,
        current_scene: u16,
        scenes: Vec<u16>,
    },
    Time(TimeState),
    Scheduler(ScheduleRegister),
    /// Vendor replies stay opaque to the access layer.
    Vendor {
        opcode: u32,
        parameters: Vec<u8>,
    },
}

impl Status {
    /// Parse a status from its opcode and raw parameters.
    ///
    /// Returns `Ok(None)` for opcodes this layer does not recognize; those
    /// are silently ignored by the dispatcher rather than failed.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedPdu`] when the buffer cannot satisfy the
    /// opcode's fixed layout.
    pub fn parse(op: u32, parameters: &[u8]) -> Result<Option<Self>> {
        let status = match op {
            opcode::CONFIG_COMPOSITION_DATA_STATUS => parse_composition_data(parameters)?,
            opcode::CONFIG_APP_KEY_STATUS => parse_app_key(parameters)?,
            opcode::CONFIG_MODEL_APP_STATUS => parse_model_app(parameters)?,
            opcode::CONFIG_MODEL_PUBLICATION_STATUS => parse_publication(parameters)?,
            opcode::CONFIG_MODEL_SUBSCRIPTION_STATUS => parse_subscription(parameters)?,
            opcode::CONFIG_NODE_RESET_STATUS => {
                expect_len(parameters, &[0])?;
                Status::NodeReset
            }
            opcode::CONFIG_NETWORK_TRANSMIT_STATUS => parse_network_transmit(parameters)?,
            opcode::CONFIG_RELAY_STATUS => parse_relay(parameters)?,
            opcode::GENERIC_ON_OFF_STATUS => parse_on_off(parameters)?,
            opcode::GENERIC_LEVEL_STATUS => parse_level(parameters)?,
            opcode::GENERIC_DEFAULT_TRANSITION_TIME_STATUS => {
                expect_len(parameters, &[1])?;
                Status::GenericDefaultTransitionTime {
                    transition_time: TransitionTime::from_byte(parameters[0]),
                }
            }
            opcode::LIGHT_LIGHTNESS_STATUS => parse_lightness(parameters)?,
            opcode::LIGHT_CTL_STATUS => parse_ctl(parameters)?,
            opcode::LIGHT_HSL_STATUS => parse_hsl(parameters)?,
            opcode::SCENE_STATUS => parse_scene(parameters)?,
            opcode::SCENE_REGISTER_STATUS => parse_scene_register(parameters)?,
            opcode::TIME_STATUS => {
                expect_len(parameters, &[10])?;
                Status::Time(TimeState::from_parameters(parameters)?)
            }
            opcode::SCHEDULER_STATUS => {
                expect_len(parameters, &[2])?;
                Status::Scheduler(ScheduleRegister::from_parameters(parameters)?)
            }
            vendor @ 0xC0_0000..=0xFF_FFFF => Status::Vendor {
                opcode: vendor,
                parameters: parameters.to_vec(),
            },
            _ => return Ok(None),
        };
        Ok(Some(status))
    }

    /// Parse a framed access PDU.
    pub fn from_pdu(pdu: &AccessPdu) -> Result<Option<Self>> {
        Self::parse(pdu.opcode, &pdu.parameters)
    }
}

fn expect_len(parameters: &[u8], allowed: &[usize]) -> Result<()> {
    if allowed.contains(&parameters.len()) {
        return Ok(());
    }
    Err(ProtocolError::MalformedPdu {
        requested: allowed.iter().copied().max().unwrap_or(0) * 8,
        remaining: parameters.len() * 8,
    })
}

fn parse_composition_data(parameters: &[u8]) -> Result<Status> {
    if parameters.len() < 11 {
        return Err(ProtocolError::MalformedPdu {
            requested: 11 * 8,
            remaining: parameters.len() * 8,
        });
    }
    let le16 = |offset: usize| u16::from_le_bytes([parameters[offset], parameters[offset + 1]]);
    Ok(Status::CompositionData {
        page: parameters[0],
        company_id: le16(1),
        product_id: le16(3),
        version_id: le16(5),
        crpl: le16(7),
        features: le16(9),
        elements: parameters[11..].to_vec(),
    })
}

fn parse_app_key(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[4])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    let app_key_index = reader.read(12)? as u16;
    let net_key_index = reader.read(12)? as u16;
    let status = reader.read(8)? as u8;
    Ok(Status::AppKey {
        status,
        net_key_index,
        app_key_index,
    })
}

fn parse_model_app(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[7, 9])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    let model_id = read_model_id(&mut reader, parameters.len() == 9)?;
    let app_key_index = reader.read(16)? as u16;
    let element_address = reader.read(16)? as u16;
    let status = reader.read(8)? as u8;
    Ok(Status::ModelApp {
        status,
        element_address,
        app_key_index,
        model_id,
    })
}

fn parse_publication(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[12, 14])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    let model_id = read_model_id(&mut reader, parameters.len() == 14)?;
    let retransmit_interval_steps = reader.read(5)? as u8;
    let retransmit_count = reader.read(3)? as u8;
    let period_resolution = reader.read(2)? as u8;
    let period_steps = reader.read(6)? as u8;
    let publish_ttl = reader.read(8)? as u8;
    let _rfu = reader.read(3)?;
    let credential_flag = reader.read(1)? == 1;
    let app_key_index = reader.read(12)? as u16;
    let publish_address = reader.read(16)? as u16;
    let element_address = reader.read(16)? as u16;
    let status = reader.read(8)? as u8;
    Ok(Status::ModelPublication {
        status,
        parameters: PublicationParameters {
            element_address,
            publish_address,
            app_key_index,
            credential_flag,
            publish_ttl,
            period_steps,
            period_resolution,
            retransmit_count,
            retransmit_interval_steps,
            model_id,
        },
    })
}

fn parse_subscription(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[7, 9])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    let model_id = read_model_id(&mut reader, parameters.len() == 9)?;
    let address = reader.read(16)? as u16;
    let element_address = reader.read(16)? as u16;
    let status = reader.read(8)? as u8;
    Ok(Status::ModelSubscription {
        status,
        element_address,
        address,
        model_id,
    })
}

fn parse_network_transmit(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[1])?;
    let mut reader = BitReader::new(parameters);
    let interval_steps = reader.read(5)? as u8;
    let count = reader.read(3)? as u8;
    Ok(Status::NetworkTransmit {
        count,
        interval_steps,
    })
}

fn parse_relay(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[2])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    let retransmit_interval_steps = reader.read(5)? as u8;
    let retransmit_count = reader.read(3)? as u8;
    let relay = reader.read(8)? as u8;
    Ok(Status::Relay {
        relay,
        retransmit_count,
        retransmit_interval_steps,
    })
}

fn parse_on_off(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[1, 3])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    if parameters.len() == 3 {
        let remaining_time = TransitionTime::from_byte(reader.read(8)? as u8);
        let target_on = reader.read(8)? != 0;
        let present_on = reader.read(8)? != 0;
        Ok(Status::GenericOnOff {
            present_on,
            target_on: Some(target_on),
            remaining_time: Some(remaining_time),
        })
    } else {
        Ok(Status::GenericOnOff {
            present_on: reader.read(8)? != 0,
            target_on: None,
            remaining_time: None,
        })
    }
}

fn parse_level(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[2, 5])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    if parameters.len() == 5 {
        let remaining_time = TransitionTime::from_byte(reader.read(8)? as u8);
        let target_level = reader.read(16)? as u16 as i16;
        let present_level = reader.read(16)? as u16 as i16;
        Ok(Status::GenericLevel {
            present_level,
            target_level: Some(target_level),
            remaining_time: Some(remaining_time),
        })
    } else {
        Ok(Status::GenericLevel {
            present_level: reader.read(16)? as u16 as i16,
            target_level: None,
            remaining_time: None,
        })
    }
}

fn parse_lightness(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[2, 5])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    if parameters.len() == 5 {
        let remaining_time = TransitionTime::from_byte(reader.read(8)? as u8);
        let target_lightness = reader.read(16)? as u16;
        let present_lightness = reader.read(16)? as u16;
        Ok(Status::LightLightness {
            present_lightness,
            target_lightness: Some(target_lightness),
            remaining_time: Some(remaining_time),
        })
    } else {
        Ok(Status::LightLightness {
            present_lightness: reader.read(16)? as u16,
            target_lightness: None,
            remaining_time: None,
        })
    }
}

fn parse_ctl(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[4, 9])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    if parameters.len() == 9 {
        let remaining_time = TransitionTime::from_byte(reader.read(8)? as u8);
        let target_temperature = reader.read(16)? as u16;
        let target_lightness = reader.read(16)? as u16;
        let present_temperature = reader.read(16)? as u16;
        let present_lightness = reader.read(16)? as u16;
        Ok(Status::LightCtl {
            present_lightness,
            present_temperature,
            target_lightness: Some(target_lightness),
            target_temperature: Some(target_temperature),
            remaining_time: Some(remaining_time),
        })
    } else {
        let present_temperature = reader.read(16)? as u16;
        let present_lightness = reader.read(16)? as u16;
        Ok(Status::LightCtl {
            present_lightness,
            present_temperature,
            target_lightness: None,
            target_temperature: None,
            remaining_time: None,
        })
    }
}

fn parse_hsl(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[6, 7])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    let remaining_time = if parameters.len() == 7 {
        Some(TransitionTime::from_byte(reader.read(8)? as u8))
    } else {
        None
    };
    let saturation = reader.read(16)? as u16;
    let hue = reader.read(16)? as u16;
    let lightness = reader.read(16)? as u16;
    Ok(Status::LightHsl {
        lightness,
        hue,
        saturation,
        remaining_time,
    })
}

fn parse_scene(parameters: &[u8]) -> Result<Status> {
    expect_len(parameters, &[3, 6])?;
    let bytes = reversed(parameters);
    let mut reader = BitReader::new(&bytes);
    if parameters.len() == 6 {
        let remaining_time = TransitionTime::from_byte(reader.read(8)? as u8);
        let target_scene = reader.read(16)? as u16;
        let current_scene = reader.read(16)? as u16;
        let status_code = reader.read(8)? as u8;
        Ok(Status::Scene {
            status_code,
            current_scene,
            target_scene: Some(target_scene),
            remaining_time: Some(remaining_time),
        })
    } else {
        let current_scene = reader.read(16)? as u16;
        let status_code = reader.read(8)? as u8;
        Ok(Status::Scene {
            status_code,
            current_scene,
            target_scene: None,
            remaining_time: None,
        })
    }
}

fn parse_scene_register(parameters: &[u8]) -> Result<Status> {
    if parameters.len() < 3 || (parameters.len() - 3) % 2 != 0 {
        return Err(ProtocolError::MalformedPdu {
            requested: 3 * 8,
            remaining: parameters.len() * 8,
        });
    }
    let status_code = parameters[0];
    let current_scene = u16::from_le_bytes([parameters[1], parameters[2]]);
    let scenes = parameters[3..]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(Status::SceneRegister {
        status_code,
        current_scene,
        scenes,
    })
}

fn read_model_id(reader: &mut BitReader<'_>, vendor: bool) -> Result<u32> {
    if vendor {
        Ok(reader.read(32)? as u32)
    } else {
        Ok(reader.read(16)? as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::values::TransitionStep;

    #[test]
    fn on_off_status_with_transition() {
        // present on, target off, 51 one-second steps remaining
        let status = Status::parse(opcode::GENERIC_ON_OFF_STATUS, &[0x01, 0x00, 0x73])
            .unwrap()
            .unwrap();
        match status {
            Status::GenericOnOff {
                present_on,
                target_on,
                remaining_time,
            } => {
                assert!(present_on);
                assert_eq!(target_on, Some(false));
                let remaining = remaining_time.unwrap();
                assert_eq!(remaining.step, TransitionStep::Specific(0x33));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn level_status_decodes_negative_levels() {
        // -1 present, short form
        let status = Status::parse(opcode::GENERIC_LEVEL_STATUS, &[0xFF, 0xFF])
            .unwrap()
            .unwrap();
        assert_eq!(
            status,
            Status::GenericLevel {
                present_level: -1,
                target_level: None,
                remaining_time: None,
            }
        );
    }

    #[test]
    fn app_key_status_unpacks_both_indexes() {
        // status 0, net 0x123, app 0x456: 24-bit group is net | app << 12
        let status = Status::parse(opcode::CONFIG_APP_KEY_STATUS, &[0x00, 0x23, 0x61, 0x45])
            .unwrap()
            .unwrap();
        assert_eq!(
            status,
            Status::AppKey {
                status: 0,
                net_key_index: 0x123,
                app_key_index: 0x456,
            }
        );
    }

    #[test]
    fn scene_register_status_lists_scenes_in_order() {
        let status = Status::parse(
            opcode::SCENE_REGISTER_STATUS,
            &[0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00],
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            status,
            Status::SceneRegister {
                status_code: 0,
                current_scene: 1,
                scenes: vec![2, 3],
            }
        );
    }

    #[test]
    fn unknown_opcode_parses_to_none() {
        assert_eq!(Status::parse(0x8FFF, &[0x00]).unwrap(), None);
    }

    #[test]
    fn vendor_opcode_passes_through() {
        let status = Status::parse(0xC1_5900, &[0xDE, 0xAD]).unwrap().unwrap();
        assert_eq!(
            status,
            Status::Vendor {
                opcode: 0xC1_5900,
                parameters: vec![0xDE, 0xAD],
            }
        );
    }

    #[test]
    fn malformed_length_is_an_error() {
        assert!(Status::parse(opcode::GENERIC_ON_OFF_STATUS, &[0x01, 0x00]).is_err());
        assert!(Status::parse(opcode::TIME_STATUS, &[0x00; 9]).is_err());
        assert!(Status::parse(opcode::SCENE_REGISTER_STATUS, &[0x00, 0x01]).is_err());
    }
}
