//! # Utility Modules
//!
//! Supporting utilities for key material and logging.
//!
//! ## Components
//! - **Crypto**: application/network key types, AID derivation, key store
//! - **Logging**: structured logging configuration
//!
//! ## Security
//! - Key bytes are zeroed on drop (zeroize crate)
//! - AID derivation is a pure one-way function over key material

pub mod crypto;
pub mod logging;

pub use crypto::{derive_aid, ApplicationKey, InMemoryKeyStore, KeyStore, NetworkKey};
