//! # engine_message
//!
//! Messages that flow into and out of the simulation state.
//!
//! This crate provides:
//!
//! - [`action`]: external commands submitted by players or tools.
//! - [`event`]: internal signals one system emits for later systems in the
//!   same tick.
//! - [`codec`]: MessagePack serialisation/deserialisation helpers.
//! - [`error`]: codec error types.
//!
//! Actions and events are both tagged variants. The state store treats them as
//! opaque; only the systems that recognise a variant act on it.

pub mod action;
pub mod codec;
pub mod error;
pub mod event;

pub use action::{Action, ActionKind};
pub use codec::{decode, encode};
pub use error::CodecError;
pub use event::Event;
