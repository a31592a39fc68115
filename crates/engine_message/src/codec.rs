//! MessagePack codec helpers.
//!
//! Thin wrappers around `rmp-serde`. Field names are kept (`to_vec_named`) so
//! encoded state snapshots stay readable by other tools.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Encode a value to MessagePack bytes.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    rmp_serde::to_vec_named(value).map_err(CodecError::Encode)
}

/// Decode a value from MessagePack bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if deserialisation fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, CodecError> {
    rmp_serde::from_slice(bytes).map_err(CodecError::Decode)
}
