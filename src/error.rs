//! # Error Types
//!
//! Error handling for the mesh access layer.
//!
//! This module defines all error variants that can occur while assembling,
//! parsing, or dispatching mesh messages.
//!
//! ## Error Categories
//! - **Codec Errors**: malformed PDUs, short reads, invalid opcodes
//! - **Validation Errors**: field values outside their wire range
//! - **Precondition Errors**: operations attempted without required key material
//! - **Configuration Errors**: invalid policy files or values
//!
//! Two failure classes deliberately have *no* variant here: unrecognized
//! opcodes and stale or mismatched replies are dropped silently by the
//! dispatcher rather than surfaced as errors.
//!
//! All errors implement `std::error::Error` for interoperability.

use thiserror::Error;

/// Primary error type for all access-layer operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A fixed bit layout could not be satisfied by the received parameter
    /// buffer. Fatal to that single parse attempt only.
    #[error("malformed PDU: needed {requested} more bits, {remaining} remain")]
    MalformedPdu { requested: usize, remaining: usize },

    /// The opcode value fits none of the three wire encodings (or is the
    /// reserved single-octet value 0x7F).
    #[error("invalid opcode 0x{0:06X}")]
    InvalidOpcode(u32),

    /// A semantic field value is outside its wire range.
    #[error("{field} out of range: {value}")]
    ValueOutOfRange { field: &'static str, value: i64 },

    /// No application key is bound under the given index; checked before any
    /// PDU is assembled.
    #[error("no application key bound at index 0x{0:03X}")]
    NoBoundApplicationKey(u16),

    /// Key material that cannot be used (wrong length, bad hex).
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// Configuration file or value error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
