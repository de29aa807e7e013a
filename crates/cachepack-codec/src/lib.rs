//! # cachepack-codec — Typed JSON Codec for Caching
//!
//! Turns [`Value`] trees into JSON that survives a cache round trip with
//! every type intact, and back again:
//!
//! - [`Codec::pack`] / [`Codec::unpack`]: marker-envelope conversion between
//!   values and JSON-safe structures.
//! - [`Codec::dumps`] / [`Codec::loads`]: the same, to and from bytes, with
//!   the optional [`namespace`] envelope applied.
//! - [`ModelRegistry`]: the allow-list of record types that may be rebuilt
//!   from a payload.
//! - [`key::cache_key`]: deterministic cache keys from call arguments.
//!
//! ## Example
//!
//! ```ignore
//! use cachepack_codec::{register, Codec};
//!
//! register::<User>(Some("user.v1"))?;
//! let codec = Codec::new();
//! let bytes = codec.dumps(&Value::record(user))?;
//! let back = codec.loads(Some(&bytes))?;
//! ```
//!
//! ## Crate Policy
//!
//! - Logging goes through `tracing`; no subscriber is installed here.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod codec;
pub mod config;
pub mod key;
pub mod namespace;
pub mod registry;

pub use codec::Codec;
pub use config::{CodecConfig, ConfigError, DEFAULT_MAX_DEPTH};
pub use key::{cache_key, hash_args};
pub use registry::{ModelEntry, ModelRegistry};

pub use cachepack_core::{
    CodecError, Decimal, Fields, FromValue, Marker, ObjectId, Record, RecordDescriptor,
    RecordValue, RegistrationError, ResponseHandle, Shape, Timestamp, Value, ValueSet,
};

use std::sync::Arc;

/// Register `T` in the global registry. See [`ModelRegistry::register`].
pub fn register<T: Record>(alias: Option<&str>) -> Result<String, CodecError> {
    ModelRegistry::global().register::<T>(alias)
}

/// Look up `alias` in the global registry.
pub fn lookup(alias: &str) -> Option<Arc<ModelEntry>> {
    ModelRegistry::global().lookup(alias)
}

/// Alias `T` holds in the global registry.
pub fn reverse_lookup<T: Record>() -> Option<String> {
    ModelRegistry::global().reverse_lookup::<T>()
}

pub fn is_registered<T: Record>() -> bool {
    ModelRegistry::global().is_registered::<T>()
}
