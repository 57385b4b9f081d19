//! # Service Layer
//!
//! High-level client façade over the dispatcher.
//!
//! Where the protocol layer deals in fully-formed [`Request`] values, the
//! service layer composes them from a key store and per-call arguments,
//! enforcing the preconditions (most importantly that an application key is
//! actually bound before a model get/set goes out) and managing transaction
//! identifiers for the set messages that need them.
//!
//! [`Request`]: crate::protocol::Request

pub mod client;

pub use client::MeshClient;
