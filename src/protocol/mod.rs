//! # Protocol Layer
//!
//! The typed message model and the exchange state machine.
//!
//! ## Components
//! - **Opcode**: assigned operation codes for every supported message
//! - **Message**: the [`Request`] sum type and its bit-exact parameter assembly
//! - **Status**: the [`Status`] sum type parsed from incoming notifications
//! - **State**: the per-exchange record and its phase transitions
//! - **Dispatcher**: routes submits, write confirmations, notifications, and
//!   timer expirations to the single outstanding exchange
//!
//! ## Exchange Model
//! At most one exchange is outstanding per dispatcher. Submitting a new
//! request replaces the previous exchange without notice (last submit wins);
//! every *started* exchange that is not superseded terminates in exactly one
//! status-callback notification: success, decode failure, or timeout.

pub mod dispatcher;
pub mod message;
pub mod opcode;
pub mod state;
pub mod status;


pub use dispatcher::Dispatcher;
pub use message::{MessageKind, PublicationParameters, Request, Transition};
pub use state::{Exchange, Phase};
pub use status::Status;
