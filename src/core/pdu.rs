//! Access-layer PDU framing.
//!
//! An access PDU is an opcode followed by the message parameters. Opcodes use
//! one of three wire encodings, selected by the top bits of the first octet:
//!
//! ```text
//! 0xxxxxxx                     single octet   (0x7F reserved)
//! 10xxxxxx xxxxxxxx            two octets
//! 11xxxxxx <company id (2)>    three octets, vendor-specific
//! ```
//!
//! Length validation happens before any field is touched: a buffer too short
//! for its advertised opcode class is a malformed PDU.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ProtocolError, Result};

/// Number of octets `opcode` occupies on the wire.
///
/// # Errors
/// Returns [`ProtocolError::InvalidOpcode`] for values outside the three
/// encodable ranges, including the reserved single-octet value 0x7F.
pub fn opcode_len(opcode: u32) -> Result<usize> {
    match opcode {
        0x00..=0x7E => Ok(1),
        0x8000..=0xBFFF => Ok(2),
        0xC0_0000..=0xFF_FFFF => Ok(3),
        other => Err(ProtocolError::InvalidOpcode(other)),
    }
}

/// One framed access-layer PDU: opcode plus raw parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPdu {
    pub opcode: u32,
    pub parameters: Bytes,
}

impl AccessPdu {
    pub fn new(opcode: u32, parameters: Vec<u8>) -> Self {
        Self {
            opcode,
            parameters: Bytes::from(parameters),
        }
    }

    /// Serialize opcode and parameters into one buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let len = opcode_len(self.opcode)?;
        let mut out = BytesMut::with_capacity(len + self.parameters.len());
        match len {
            1 => out.put_u8(self.opcode as u8),
            2 => out.put_u16(self.opcode as u16),
            _ => {
                out.put_u8((self.opcode >> 16) as u8);
                out.put_u8((self.opcode >> 8) as u8);
                out.put_u8(self.opcode as u8);
            }
        }
        out.extend_from_slice(&self.parameters);
        Ok(out.freeze())
    }

    /// Parse a received access payload into opcode and parameters.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedPdu`] when the buffer is shorter than its
    /// opcode class requires; [`ProtocolError::InvalidOpcode`] for the
    /// reserved first octet 0x7F.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let first = *data.first().ok_or(ProtocolError::MalformedPdu {
            requested: 8,
            remaining: 0,
        })?;
        let len = match first {
            0x7F => return Err(ProtocolError::InvalidOpcode(0x7F)),
            b if b & 0x80 == 0 => 1,
            b if b & 0xC0 == 0x80 => 2,
            _ => 3,
        };
        if data.len() < len {
            return Err(ProtocolError::MalformedPdu {
                requested: len * 8,
                remaining: data.len() * 8,
            });
        }
        let opcode = data[..len]
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
        Ok(Self {
            opcode,
            parameters: Bytes::copy_from_slice(&data[len..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_octet_round_trip() {
        let pdu = AccessPdu::new(0x5D, vec![0xAA, 0xBB]);
        let bytes = pdu.to_bytes().unwrap();
        assert_eq!(&bytes[..], &[0x5D, 0xAA, 0xBB]);
        assert_eq!(AccessPdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn two_octet_round_trip() {
        let pdu = AccessPdu::new(0x8204, vec![0x01]);
        let bytes = pdu.to_bytes().unwrap();
        assert_eq!(&bytes[..], &[0x82, 0x04, 0x01]);
        assert_eq!(AccessPdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn vendor_octet_round_trip() {
        let pdu = AccessPdu::new(0xC1_5900, vec![]);
        let bytes = pdu.to_bytes().unwrap();
        assert_eq!(&bytes[..], &[0xC1, 0x59, 0x00]);
        assert_eq!(AccessPdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn reserved_opcode_rejected_both_ways() {
        assert!(matches!(
            opcode_len(0x7F),
            Err(ProtocolError::InvalidOpcode(0x7F))
        ));
        assert!(AccessPdu::from_bytes(&[0x7F]).is_err());
    }

    #[test]
    fn out_of_class_opcode_rejected() {
        assert!(opcode_len(0x0100).is_err());
        assert!(opcode_len(0x0100_0000).is_err());
    }

    #[test]
    fn truncated_buffers_are_malformed() {
        assert!(matches!(
            AccessPdu::from_bytes(&[]),
            Err(ProtocolError::MalformedPdu { .. })
        ));
        assert!(AccessPdu::from_bytes(&[0x82]).is_err());
        assert!(AccessPdu::from_bytes(&[0xC1, 0x59]).is_err());
    }
}
