//! Value Codec Module
//!
//! Type-erased value storage. The cache never holds caller values directly:
//! `set` encodes the value into an opaque [`Encoded`] representation and
//! `get` decodes a fresh, independent copy into whatever type the caller asks
//! for.
//!
//! # Round-trip contract
//!
//! For every type `T` implementing both `Serialize` and `DeserializeOwned`,
//! `decode::<T>(encode(&v))` is observably equal to `v`.
//!
//! # Numeric normalization
//!
//! When a value is decoded into the generic [`DynamicValue`] (or any container
//! of it, such as `HashMap<String, DynamicValue>`), numbers normalize to one
//! canonical width per kind:
//! - any stored integer (`i8`..`i64`, `u8`..`u32`, and `u64` up to `i64::MAX`)
//!   comes back as a number for which `as_i64()` is `Some`
//! - `u64` values above `i64::MAX` come back as `as_u64()` only
//! - `f32`/`f64` come back as `f64`, including whole floats such as `1.0`
//!
//! Decoding into a concrete numeric type applies no widening beyond what
//! serde performs; an out-of-range value fails with [`CacheError::Decode`].
//!
//! # Non-finite floats
//!
//! JSON has no NaN or infinity. `NaN`, `inf` and `-inf` encode as `null`, so
//! they are the one primitive that does not round-trip: reading one back as
//! `f64` fails with [`CacheError::Decode`], while `Option<f64>` reads `None`
//! and [`DynamicValue`] reads `Null`. Callers that need them should store a
//! sentinel or a string form.

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Generic destination for values whose concrete type is unknown to the reader.
pub type DynamicValue = serde_json::Value;

// == Encoded ==
/// Opaque encoded value. Cloning is cheap and shares the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Encoded(Arc<[u8]>);

impl Encoded {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size of the representation in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoded({} bytes)", self.0.len())
    }
}

// == Value Codec ==
/// Encode/decode pair used by the cache for every stored value.
pub trait ValueCodec: Send + Sync + 'static {
    /// Encodes a value. Fails only when the value graph holds something
    /// with no serialized form.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Encoded>;

    /// Decodes a stored representation into a new owned value.
    fn decode<T: DeserializeOwned>(&self, encoded: &Encoded) -> Result<T>;

    /// Decodes into a caller-supplied destination, replacing its contents.
    /// On failure the destination is left untouched.
    fn decode_into<T: DeserializeOwned>(&self, encoded: &Encoded, destination: &mut T) -> Result<()> {
        *destination = self.decode(encoded)?;
        Ok(())
    }
}

/// JSON-based codec backed by serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Encoded> {
        serde_json::to_vec(value)
            .map(Encoded::from_bytes)
            .map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, encoded: &Encoded) -> Result<T> {
        serde_json::from_slice(encoded.as_bytes()).map_err(|e| CacheError::Decode(e.to_string()))
    }
}
