//! # Mesh Protocol
//!
//! Client-side message transport core for low-power mesh networks.
//!
//! This crate implements the access-layer half of a mesh client: it assembles
//! typed configuration and application messages into bit-exact protocol data
//! units, derives the per-message security material, and tracks every
//! outstanding request through a single-exchange state machine until an
//! acknowledgement, status reply, or timeout arrives.
//!
//! ## Architecture
//! - [`core`]: exact-width bit packing, wire value types, and access PDU framing
//! - [`protocol`]: the message model ([`Request`]/[`Status`]) and the
//!   [`Dispatcher`] exchange state machine
//! - [`transport`]: the collaborator seams (PDU transport, status sink) plus an
//!   in-memory loopback transport
//! - [`service`]: a high-level client façade composing the key store and the
//!   dispatcher
//! - [`utils`]: key material, AID derivation, and logging setup
//!
//! The network layer below the access layer (on-air encryption, segmentation,
//! relay) is an external collaborator: this crate hands it finished PDUs and
//! receives decrypted access payloads back.
//!
//! ## Example
//! ```
//! use mesh_protocol::protocol::{Dispatcher, Request};
//! use mesh_protocol::transport::{CollectingCallbacks, RecordingTransport};
//!
//! let transport = RecordingTransport::default();
//! let callbacks = CollectingCallbacks::default();
//! let mut dispatcher = Dispatcher::new(transport.clone(), callbacks.clone());
//!
//! // Ask a node for page 0 of its composition data.
//! dispatcher
//!     .submit(0x0001, Request::CompositionDataGet { page: 0 })
//!     .unwrap();
//! assert_eq!(transport.sent().len(), 1);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use config::ProtocolConfig;
pub use error::{ProtocolError, Result};
pub use protocol::{Dispatcher, MessageKind, Request, Status};
pub use service::MeshClient;
