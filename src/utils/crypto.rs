//! Application-layer key material and AID derivation.
//!
//! Every outgoing application message carries a 1-byte application-key
//! identifier (AID) so a receiver can pick the matching key before attempting
//! decryption. The identifier is derived once per key: a keyed hash over a
//! fixed domain label, truncated to 6 bits, with the application-key-flag
//! marker in the top bits. Validating the AID advertised on incoming
//! transport frames is the transport collaborator's job, not this crate's.

use std::collections::HashMap;
use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ProtocolError, Result};

/// Domain-separation label for the AID derivation.
const AID_LABEL: &[u8] = b"smk4";

/// Marker placed in the top bits of a derived AID to flag application-key
/// (rather than device-key) security material.
pub const APPLICATION_KEY_MARKER: u8 = 0b0100_0000;

/// Highest encodable 12-bit key index.
pub const KEY_INDEX_MAX: u16 = 0x0FFF;

/// Derive the 1-byte AID for a 16-byte application key.
///
/// Deterministic and pure: the same key bytes always yield the same AID.
pub fn derive_aid(key: &[u8; 16]) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(AID_LABEL);
    hasher.update(key);
    let digest = hasher.finalize();
    (digest[0] & 0x3F) | APPLICATION_KEY_MARKER
}

/// A bound application key: 12-bit index, 16 bytes of key material, and the
/// AID derived from them at construction.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ApplicationKey {
    index: u16,
    key: [u8; 16],
    aid: u8,
}

impl ApplicationKey {
    /// # Errors
    /// The index must fit 12 bits.
    pub fn new(index: u16, key: [u8; 16]) -> Result<Self> {
        if index > KEY_INDEX_MAX {
            return Err(ProtocolError::ValueOutOfRange {
                field: "application key index",
                value: i64::from(index),
            });
        }
        let aid = derive_aid(&key);
        Ok(Self { index, key, aid })
    }

    /// Parse the key bytes from a 32-character hex string.
    pub fn from_hex(index: u16, hex_key: &str) -> Result<Self> {
        Self::new(index, decode_key_hex(hex_key)?)
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn bytes(&self) -> &[u8; 16] {
        &self.key
    }

    pub fn aid(&self) -> u8 {
        self.aid
    }
}

// Key bytes stay out of log output.
impl fmt::Debug for ApplicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationKey")
            .field("index", &self.index)
            .field("aid", &self.aid)
            .finish_non_exhaustive()
    }
}

/// A bound network key: 12-bit index and 16 bytes of key material.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct NetworkKey {
    index: u16,
    key: [u8; 16],
}

impl NetworkKey {
    /// # Errors
    /// The index must fit 12 bits.
    pub fn new(index: u16, key: [u8; 16]) -> Result<Self> {
        if index > KEY_INDEX_MAX {
            return Err(ProtocolError::ValueOutOfRange {
                field: "network key index",
                value: i64::from(index),
            });
        }
        Ok(Self { index, key })
    }

    /// Parse the key bytes from a 32-character hex string.
    pub fn from_hex(index: u16, hex_key: &str) -> Result<Self> {
        Self::new(index, decode_key_hex(hex_key)?)
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn bytes(&self) -> &[u8; 16] {
        &self.key
    }
}

impl fmt::Debug for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkKey")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

fn decode_key_hex(hex_key: &str) -> Result<[u8; 16]> {
    let bytes = hex::decode(hex_key)
        .map_err(|e| ProtocolError::InvalidKey(format!("bad hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| ProtocolError::InvalidKey("key must be 16 bytes".into()))
}

/// Key-lookup capability consumed by the service façade.
pub trait KeyStore {
    fn app_key(&self, index: u16) -> Option<&ApplicationKey>;
    fn net_key(&self, index: u16) -> Option<&NetworkKey>;
}

/// Simple in-process key store.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    app_keys: HashMap<u16, ApplicationKey>,
    net_keys: HashMap<u16, NetworkKey>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_app_key(&mut self, key: ApplicationKey) {
        self.app_keys.insert(key.index(), key);
    }

    pub fn add_net_key(&mut self, key: NetworkKey) {
        self.net_keys.insert(key.index(), key);
    }
}

impl KeyStore for InMemoryKeyStore {
    fn app_key(&self, index: u16) -> Option<&ApplicationKey> {
        self.app_keys.get(&index)
    }

    fn net_key(&self, index: u16) -> Option<&NetworkKey> {
        self.net_keys.get(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 16] {
        let mut key = [0u8; 16];
        hex::decode_to_slice("63964771734fbd76e3b40519d1d94a48", &mut key).unwrap();
        key
    }

    #[test]
    fn aid_is_deterministic() {
        assert_eq!(derive_aid(&test_key()), derive_aid(&test_key()));
    }

    #[test]
    fn aid_carries_the_application_marker() {
        let aid = derive_aid(&test_key());
        assert_eq!(aid & 0xC0, APPLICATION_KEY_MARKER);
    }

    #[test]
    fn key_index_must_fit_12_bits() {
        assert!(ApplicationKey::new(0x1000, test_key()).is_err());
        assert!(NetworkKey::new(0x1000, test_key()).is_err());
    }

    #[test]
    fn hex_parsing_validates_length() {
        assert!(ApplicationKey::from_hex(0, "abcd").is_err());
        assert!(ApplicationKey::from_hex(0x456, "63964771734fbd76e3b40519d1d94a48").is_ok());
    }

    #[test]
    fn store_returns_bound_keys() {
        let mut store = InMemoryKeyStore::new();
        store.add_app_key(ApplicationKey::new(0x456, test_key()).unwrap());
        assert!(store.app_key(0x456).is_some());
        assert!(store.app_key(0x457).is_none());
    }

    #[test]
    fn debug_output_redacts_key_bytes() {
        let key = ApplicationKey::new(0x456, test_key()).unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("6396"));
    }
}
