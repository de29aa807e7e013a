//! # Cache Key Builder
//!
//! Derives deterministic cache keys from a function identity and its call
//! arguments. Arguments are packed by the marker codec first, so a date, a
//! decimal or a registered record contributes its envelope to the key. The
//! packed pair `[args, kwargs]` is then canonicalized (RFC 8785) and hashed
//! with SHA-256.
//!
//! Positional order is significant. Keyword order is not: keyword arguments
//! become a mapping and canonical JSON sorts mapping keys. SET envelopes are
//! sorted by their canonical element bytes before hashing, because set
//! iteration order is not part of a set's identity.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use cachepack_core::{sha256_hex, CanonicalBytes, CodecError, Marker, Value};

use crate::codec::Codec;

/// SHA-256 hex digest of the packed argument pair.
///
/// A keyword given twice keeps its last value.
///
/// # Errors
///
/// Any packing error for an argument, or a canonicalization failure.
pub fn hash_args(
    codec: &Codec,
    args: &[Value],
    kwargs: &[(&str, Value)],
) -> Result<String, CodecError> {
    let positional = codec.pack(&Value::List(args.to_vec()))?;
    let keywords: BTreeMap<String, Value> = kwargs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect();
    let keyword = codec.pack(&Value::Map(keywords))?;

    let pair = normalize_sets(Json::Array(vec![positional, keyword]))?;
    let canonical = CanonicalBytes::new(&pair)?;
    Ok(sha256_hex(&canonical))
}

/// `"<function>:<hash_args>"`.
///
/// `function` should be a stable identity such as
/// `concat!(module_path!(), "::get_user")`.
pub fn cache_key(
    codec: &Codec,
    function: &str,
    args: &[Value],
    kwargs: &[(&str, Value)],
) -> Result<String, CodecError> {
    Ok(format!("{function}:{}", hash_args(codec, args, kwargs)?))
}

impl Codec {
    /// See [`hash_args`].
    pub fn hash_args(&self, args: &[Value], kwargs: &[(&str, Value)]) -> Result<String, CodecError> {
        hash_args(self, args, kwargs)
    }

    /// See [`cache_key`].
    pub fn cache_key(
        &self,
        function: &str,
        args: &[Value],
        kwargs: &[(&str, Value)],
    ) -> Result<String, CodecError> {
        cache_key(self, function, args, kwargs)
    }
}

fn normalize_sets(packed: Json) -> Result<Json, CodecError> {
    match packed {
        Json::Array(items) => items
            .into_iter()
            .map(normalize_sets)
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        Json::Object(map) => {
            let is_set = map.len() == 1 && map.contains_key(Marker::Set.key());
            let mut normalized = Map::with_capacity(map.len());
            for (key, value) in map {
                let value = normalize_sets(value)?;
                let value = match value {
                    Json::Array(items) if is_set => Json::Array(sort_canonically(items)?),
                    other => other,
                };
                normalized.insert(key, value);
            }
            Ok(Json::Object(normalized))
        }
        scalar => Ok(scalar),
    }
}

fn sort_canonically(items: Vec<Json>) -> Result<Vec<Json>, CodecError> {
    let mut keyed = items
        .into_iter()
        .map(|item| Ok((CanonicalBytes::new(&item)?, item)))
        .collect::<Result<Vec<_>, CodecError>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}
