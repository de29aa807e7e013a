//! # Namespace Envelope
//!
//! An optional outer wrapper that partitions one cache between tenants or
//! services. It is applied once, at the top level, around an already packed
//! structure:
//!
//! ```text
//! {"$ns": "<namespace>", "$data": <packed>}
//! ```
//!
//! An empty namespace means no wrapper, except when the packed structure is
//! itself a mapping holding both envelope keys. Such a structure is wrapped
//! under the empty namespace so `decode` hands it back intact.

use serde_json::{Map, Value as Json};

/// Key holding the namespace string.
pub const NS_KEY: &str = "$ns";
/// Key holding the wrapped structure.
pub const DATA_KEY: &str = "$data";

/// Wrap `packed` under `namespace`. Identity when `namespace` is empty and
/// `packed` does not already look like an envelope.
pub fn encode(namespace: &str, packed: Json) -> Json {
    let collides = matches!(&packed, Json::Object(map) if is_envelope(map));
    if namespace.is_empty() && !collides {
        return packed;
    }
    let mut envelope = Map::with_capacity(2);
    envelope.insert(NS_KEY.to_string(), Json::String(namespace.to_string()));
    envelope.insert(DATA_KEY.to_string(), packed);
    Json::Object(envelope)
}

/// Unwrap a namespace envelope. Anything else is returned unchanged.
pub fn decode(raw: Json) -> Json {
    match raw {
        Json::Object(mut map) if is_envelope(&map) => map.remove(DATA_KEY).unwrap_or(Json::Null),
        other => other,
    }
}

/// The namespace carried by `raw`, if it is an envelope with a string namespace.
pub fn envelope_namespace(raw: &Json) -> Option<&str> {
    match raw {
        Json::Object(map) if is_envelope(map) => map.get(NS_KEY).and_then(Json::as_str),
        _ => None,
    }
}

fn is_envelope(map: &Map<String, Json>) -> bool {
    map.contains_key(NS_KEY) && map.contains_key(DATA_KEY)
}
