//! # Markers — Reserved Envelope Keys
//!
//! Defines the `Marker` enum, the closed set of tokens that identify a
//! non-native value on the wire. A marked value is a JSON object whose
//! reserved key carries the serialized payload, e.g.
//! `{"38213ce3-…": "2024-12-23"}` for a date.
//!
//! ## Security Invariant
//!
//! Marker keys are fixed UUID strings. They are not configurable and cannot
//! equal a record field name: the registry rejects descriptors that declare
//! a reserved key, and `pack` rejects mappings that use one.
//!
//! The key strings are part of the wire format. Entries written by other
//! services sharing the cache decode unchanged.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value as Json};

/// All non-native type classes that travel inside an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Marker {
    /// Registered structured record: `{MODEL: alias, field: value, ...}`.
    Model,
    /// Unordered collection: `{SET: [...]}`.
    Set,
    /// Calendar date: `{DATE: "YYYY-MM-DD"}`.
    Date,
    /// Naive or offset-aware datetime: `{DATETIME: "ISO-8601"}`.
    DateTime,
    /// Exact decimal number: `{DECIMAL: "digits"}`.
    Decimal,
    /// External object identifier: `{EXTERNAL_ID: "hex"}`.
    ExternalId,
    /// Fixed-arity sequence: `{TUPLE: [...]}`.
    Tuple,
}

/// Total number of markers.
pub const MARKER_COUNT: usize = 7;

impl Marker {
    /// Returns all markers in declaration order.
    pub fn all() -> &'static [Marker] {
        &[
            Self::Model,
            Self::Set,
            Self::Date,
            Self::DateTime,
            Self::Decimal,
            Self::ExternalId,
            Self::Tuple,
        ]
    }

    /// Returns markers in the order `unpack` probes a mapping.
    ///
    /// Scalar envelopes come first, then containers, and MODEL last so that
    /// a record can never shadow a scalar envelope.
    pub fn probe_order() -> &'static [Marker] {
        &[
            Self::Date,
            Self::DateTime,
            Self::Decimal,
            Self::ExternalId,
            Self::Set,
            Self::Tuple,
            Self::Model,
        ]
    }

    /// The reserved object key for this marker.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Model => "6c7372a7-e783-4f04-80d1-c0704d0e90e9",
            Self::Set => "f3090927-571d-4687-991f-3c8cb061a355",
            Self::Date => "38213ce3-d72f-47a7-a499-7db04c9b6f20",
            Self::DateTime => "a7a58df1-0263-44a6-9799-563b7b3b6c2d",
            Self::Decimal => "b0648f86-d983-424a-8743-9828c2ff9f6b",
            Self::ExternalId => "c5c64f69-2a90-4c7b-914a-1a0e8d0e5f2a",
            Self::Tuple => "d7e4f5a6-3b7c-4d8e-9f0a-1b2c3d4e5f6a",
        }
    }

    /// Upper-case display name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Model => "MODEL",
            Self::Set => "SET",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Decimal => "DECIMAL",
            Self::ExternalId => "EXTERNAL_ID",
            Self::Tuple => "TUPLE",
        }
    }

    /// Look up the marker owning a reserved key.
    pub fn from_key(key: &str) -> Option<Marker> {
        Self::all().iter().copied().find(|m| m.key() == key)
    }

    /// Returns true if `key` is a reserved marker key.
    pub fn is_reserved(key: &str) -> bool {
        Self::from_key(key).is_some()
    }

    /// The first marker present in `map`, in probe order.
    pub fn detect(map: &Map<String, Json>) -> Option<Marker> {
        Self::probe_order()
            .iter()
            .copied()
            .find(|m| map.contains_key(m.key()))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Marker {
    type Err = String;

    /// Parse a marker from its display name (`"SET"`, `"EXTERNAL_ID"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown marker: {s:?}"))
    }
}
