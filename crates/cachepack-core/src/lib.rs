//! # cachepack-core — Foundational Types for the Cache Codec
//!
//! This crate defines the value space the codec operates on and the
//! vocabulary shared by every other crate in the workspace. It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed value model.** [`Value`] is a single tagged union covering every
//!    kind the codec knows about. Packing is an exhaustive `match`; adding a
//!    variant forces every consumer to handle it at compile time.
//!
//! 2. **Closed marker set.** [`Marker`] enumerates the reserved envelope keys.
//!    Marker keys are fixed UUID strings and can never collide with a record
//!    field (descriptors that try are rejected at registration).
//!
//! 3. **Explicit shapes instead of reflection.** Expected types travel as
//!    [`Shape`] values, and records describe their own fields through
//!    [`RecordDescriptor`].
//!
//! 4. **Exact decimals.** [`Decimal`] keeps its decimal text verbatim; no value
//!    ever passes through floating point on the way to the wire.
//!
//! 5. **`CanonicalBytes` for key derivation.** Cache keys are digests over
//!    RFC 8785 bytes only, so argument maps hash identically regardless of
//!    insertion order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cachepack-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod decimal;
pub mod digest;
pub mod error;
pub mod identity;
pub mod marker;
pub mod record;
pub mod shape;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use decimal::Decimal;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CodecError, ParseError, RegistrationError};
pub use identity::ObjectId;
pub use marker::{Marker, MARKER_COUNT};
pub use record::{FieldDescriptor, Fields, FromValue, Record, RecordDescriptor, RecordValue};
pub use shape::Shape;
pub use temporal::Timestamp;
pub use value::{ResponseHandle, Value, ValueSet};
