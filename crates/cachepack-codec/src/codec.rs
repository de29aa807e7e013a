//! # Marker Codec
//!
//! Converts [`Value`] trees to JSON-safe structures and back. JSON has no
//! dates, decimals, sets, tuples or records, so each of those travels as a
//! single-key envelope whose key is a reserved [`Marker`]:
//!
//! ```text
//! {"<DATE key>": "2024-12-23"}
//! {"<SET key>": [1, 2, 3]}
//! {"<MODEL key>": "user.v1", "id": "u-1", "joined": {"<DATE key>": "2024-12-23"}}
//! ```
//!
//! ## Pack precedence
//!
//! Scalars pass through; live responses are refused before anything else;
//! scalar extension types, sets and records become envelopes; lists and maps
//! recurse; tuples become TUPLE envelopes. Raw bytes have no JSON form.
//!
//! ## Unpack
//!
//! Envelopes are recognized by probing markers in a fixed order (see
//! [`Marker::probe_order`]). Scalar envelopes are self-describing. MODEL
//! envelopes resolve their alias through the [`ModelRegistry`]; an unknown
//! alias is a registration error. Plain strings are returned unchanged unless
//! an expected [`Shape`] asks for a decimal, date, datetime or object id, in
//! which case conversion is attempted and abandoned silently on failure.
//!
//! Both directions stop at [`CodecConfig::max_depth`] levels of nesting.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{Map, Value as Json};

use cachepack_core::temporal::{format_date, parse_date};
use cachepack_core::{
    CodecError, Decimal, Fields, Marker, ObjectId, ParseError, RecordDescriptor, RecordValue,
    RegistrationError, Shape, Timestamp, Value, ValueSet,
};

use crate::config::{CodecConfig, ConfigError};
use crate::namespace;
use crate::registry::ModelRegistry;

static UNTYPED: Shape = Shape::Any;

/// Packs and unpacks values against one registry and configuration.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<ModelRegistry>,
    config: CodecConfig,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Codec over the global registry with default configuration.
    pub fn new() -> Self {
        Self::with_registry(ModelRegistry::global())
    }

    pub fn with_registry(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
        }
    }

    /// Codec over `registry` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Whatever [`CodecConfig::validate`] rejects, such as a zero depth limit.
    pub fn with_config(
        registry: Arc<ModelRegistry>,
        config: CodecConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    // -- pack ------------------------------------------------------------------

    /// Convert `value` into a JSON-safe structure.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for response handles, `Unsupported` for raw bytes.
    /// - `RegistrationError::UnregisteredType` for records whose type is not
    ///   registered.
    /// - `ReservedKey` for mappings or records using a marker key.
    /// - `InvalidRecord` when a record's field values disagree with its
    ///   declared fields.
    /// - `DepthExceeded` past the configured nesting limit.
    pub fn pack(&self, value: &Value) -> Result<Json, CodecError> {
        self.pack_at(value, 0)
    }

    fn pack_at(&self, value: &Value, depth: usize) -> Result<Json, CodecError> {
        self.check_depth(depth)?;
        let packed = match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => Json::Number(n.clone()),
            Value::String(s) => Json::String(s.clone()),
            Value::Response(_) => return Err(CodecError::Forbidden { kind: "response" }),
            Value::Date(d) => envelope(Marker::Date, Json::String(format_date(d))),
            Value::DateTime(ts) => envelope(Marker::DateTime, Json::String(ts.to_iso8601())),
            Value::Decimal(d) => envelope(Marker::Decimal, Json::String(d.as_str().to_string())),
            Value::ObjectId(id) => envelope(Marker::ExternalId, Json::String(id.to_hex())),
            Value::Set(items) => envelope(Marker::Set, self.pack_items(items.iter(), depth)?),
            Value::Record(record) => self.pack_record(record, depth)?,
            Value::List(items) => self.pack_items(items.iter(), depth)?,
            Value::Tuple(items) => envelope(Marker::Tuple, self.pack_items(items.iter(), depth)?),
            Value::Map(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    if Marker::is_reserved(key) {
                        return Err(CodecError::ReservedKey { key: key.clone() });
                    }
                    object.insert(key.clone(), self.pack_at(item, depth + 1)?);
                }
                Json::Object(object)
            }
            Value::Bytes(_) => return Err(CodecError::Unsupported { kind: "bytes" }),
        };
        Ok(packed)
    }

    fn pack_items<'a>(
        &self,
        items: impl Iterator<Item = &'a Value>,
        depth: usize,
    ) -> Result<Json, CodecError> {
        items
            .map(|item| self.pack_at(item, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn pack_record(&self, record: &RecordValue, depth: usize) -> Result<Json, CodecError> {
        let alias = self.registry.alias_of(record.record_type()).ok_or_else(|| {
            RegistrationError::UnregisteredType {
                type_name: record.type_name().to_string(),
            }
        })?;

        let fields = record.field_values();
        if let Some(entry) = self.registry.lookup(&alias) {
            check_declared_fields(entry.descriptor(), &fields)?;
        }
        let mut object = Map::with_capacity(fields.len() + 1);
        object.insert(Marker::Model.key().to_string(), Json::String(alias));
        for (name, item) in &fields {
            if Marker::is_reserved(name) {
                return Err(CodecError::ReservedKey {
                    key: (*name).to_string(),
                });
            }
            object.insert((*name).to_string(), self.pack_at(item, depth + 1)?);
        }
        Ok(Json::Object(object))
    }

    // -- unpack ----------------------------------------------------------------

    /// Rebuild a value from a packed structure, untyped.
    pub fn unpack(&self, data: Json) -> Result<Value, CodecError> {
        self.unpack_as(data, &Shape::Any)
    }

    /// Rebuild a value from a packed structure, guided by `shape`.
    ///
    /// # Errors
    ///
    /// - `MalformedEnvelope` for marker payloads of the wrong kind or that
    ///   do not parse.
    /// - `RegistrationError::UnknownAlias` for MODEL envelopes naming an
    ///   alias the registry does not hold.
    /// - `AliasMismatch` when `shape` declares a different record.
    /// - `Construction` when the record type rejects the decoded fields.
    /// - `DepthExceeded` past the configured nesting limit.
    pub fn unpack_as(&self, data: Json, shape: &Shape) -> Result<Value, CodecError> {
        self.unpack_at(data, shape, 0)
    }

    fn unpack_at(&self, data: Json, shape: &Shape, depth: usize) -> Result<Value, CodecError> {
        self.check_depth(depth)?;
        match data {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::Number(n) => Ok(Value::Number(n)),
            Json::String(s) => Ok(convert_string(s, shape)),
            Json::Array(items) => self.unpack_array(items, shape, depth),
            Json::Object(map) => match Marker::detect(&map) {
                Some(marker) => self.unpack_envelope(marker, map, shape, depth),
                None => self.unpack_map(map, shape, depth),
            },
        }
    }

    fn unpack_envelope(
        &self,
        marker: Marker,
        mut map: Map<String, Json>,
        shape: &Shape,
        depth: usize,
    ) -> Result<Value, CodecError> {
        match marker {
            Marker::Model => self.unpack_model(map, shape, depth),
            Marker::Date => {
                let text = string_payload(marker, &mut map)?;
                parse_date(&text)
                    .map(Value::Date)
                    .map_err(|source| malformed(marker, source))
            }
            Marker::DateTime => {
                let text = string_payload(marker, &mut map)?;
                Timestamp::parse(&text)
                    .map(Value::DateTime)
                    .map_err(|source| malformed(marker, source))
            }
            Marker::Decimal => {
                let text = string_payload(marker, &mut map)?;
                Decimal::parse(&text)
                    .map(Value::Decimal)
                    .map_err(|source| malformed(marker, source))
            }
            Marker::ExternalId => {
                let text = string_payload(marker, &mut map)?;
                ObjectId::parse_str(&text)
                    .map(Value::ObjectId)
                    .map_err(|source| malformed(marker, source))
            }
            Marker::Set => {
                let element = shape.set_element().unwrap_or(&UNTYPED);
                array_payload(marker, &mut map)?
                    .into_iter()
                    .map(|item| self.unpack_at(item, element, depth + 1))
                    .collect::<Result<ValueSet, _>>()
                    .map(Value::Set)
            }
            Marker::Tuple => {
                let positions = shape.tuple_positions().unwrap_or_default();
                self.unpack_positional(array_payload(marker, &mut map)?, positions, depth)
            }
        }
    }

    fn unpack_model(
        &self,
        mut map: Map<String, Json>,
        shape: &Shape,
        depth: usize,
    ) -> Result<Value, CodecError> {
        let alias = string_payload(Marker::Model, &mut map)?;

        // The allow-list is consulted before the declared shape, so an
        // unknown alias is always reported as a registration error.
        let Some(entry) = self.registry.lookup(&alias) else {
            tracing::warn!(alias = %alias, "refusing to unpack model with unregistered alias");
            return Err(RegistrationError::UnknownAlias { alias }.into());
        };

        if let Shape::Record(expected) = shape.resolve() {
            if *expected != alias {
                return Err(CodecError::AliasMismatch {
                    expected: expected.clone(),
                    found: alias,
                });
            }
        }

        let descriptor = entry.descriptor();
        let mut values = BTreeMap::new();
        for (name, raw) in map {
            let field_shape = descriptor.field_shape(&name).unwrap_or(&UNTYPED);
            let value = self.unpack_at(raw, field_shape, depth + 1)?;
            values.insert(name, value);
        }
        entry.construct(Fields::new(values)).map(Value::Record)
    }

    fn unpack_map(
        &self,
        map: Map<String, Json>,
        shape: &Shape,
        depth: usize,
    ) -> Result<Value, CodecError> {
        let value_shape = shape.map_value().unwrap_or(&UNTYPED);
        map.into_iter()
            .map(|(key, raw)| Ok((key, self.unpack_at(raw, value_shape, depth + 1)?)))
            .collect::<Result<BTreeMap<_, _>, CodecError>>()
            .map(Value::Map)
    }

    fn unpack_array(
        &self,
        items: Vec<Json>,
        shape: &Shape,
        depth: usize,
    ) -> Result<Value, CodecError> {
        if let Some(positions) = shape.tuple_positions() {
            return self.unpack_positional(items, positions, depth);
        }
        let element = shape.list_element().unwrap_or(&UNTYPED);
        items
            .into_iter()
            .map(|item| self.unpack_at(item, element, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    fn unpack_positional(
        &self,
        items: Vec<Json>,
        positions: &[Shape],
        depth: usize,
    ) -> Result<Value, CodecError> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let position = positions.get(i).unwrap_or(&UNTYPED);
                self.unpack_at(item, position, depth + 1)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Tuple)
    }

    // -- bytes -----------------------------------------------------------------

    /// Pack, wrap in the configured namespace, and encode as JSON bytes.
    pub fn dumps(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let packed = self.pack(value)?;
        let wrapped = namespace::encode(&self.config.namespace, packed);
        Ok(serde_json::to_vec(&wrapped)?)
    }

    /// Decode JSON bytes, strip any namespace envelope, and unpack untyped.
    ///
    /// `None` (a cache miss) yields `Value::Null`.
    pub fn loads(&self, bytes: Option<&[u8]>) -> Result<Value, CodecError> {
        self.loads_as(bytes, &Shape::Any)
    }

    /// [`loads`](Self::loads) with a top-level expected shape.
    pub fn loads_as(&self, bytes: Option<&[u8]>, shape: &Shape) -> Result<Value, CodecError> {
        let Some(bytes) = bytes else {
            return Ok(Value::Null);
        };
        let raw: Json = serde_json::from_slice(bytes)?;
        if let Some(found) = namespace::envelope_namespace(&raw) {
            if found != self.config.namespace {
                tracing::debug!(
                    found = %found,
                    configured = %self.config.namespace,
                    "unwrapping payload from a different namespace"
                );
            }
        }
        self.unpack_as(namespace::decode(raw), shape)
    }

    fn check_depth(&self, depth: usize) -> Result<(), CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }
}

/// `field_values` must name every declared field once and nothing else.
fn check_declared_fields(
    descriptor: &RecordDescriptor,
    fields: &[(&'static str, Value)],
) -> Result<(), CodecError> {
    let invalid = |reason: String| CodecError::InvalidRecord {
        type_name: descriptor.qualified_name(),
        reason,
    };
    let mut seen = BTreeSet::new();
    for (name, _) in fields {
        if descriptor.field_shape(name).is_none() {
            return Err(invalid(format!("field `{name}` is not declared")));
        }
        if !seen.insert(*name) {
            return Err(invalid(format!("field `{name}` is listed twice")));
        }
    }
    match descriptor.fields.iter().find(|f| !seen.contains(f.name)) {
        Some(missing) => Err(invalid(format!("declared field `{}` is not listed", missing.name))),
        None => Ok(()),
    }
}

fn envelope(marker: Marker, payload: Json) -> Json {
    let mut object = Map::with_capacity(1);
    object.insert(marker.key().to_string(), payload);
    Json::Object(object)
}

fn malformed(marker: Marker, source: ParseError) -> CodecError {
    CodecError::MalformedEnvelope { marker, source }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn wrong_payload(marker: Marker, expected: &'static str, found: &Json) -> CodecError {
    malformed(
        marker,
        ParseError::WrongPayload {
            expected,
            found: json_kind(found),
        },
    )
}

fn string_payload(marker: Marker, map: &mut Map<String, Json>) -> Result<String, CodecError> {
    match map.remove(marker.key()).unwrap_or(Json::Null) {
        Json::String(s) => Ok(s),
        other => Err(wrong_payload(marker, "string", &other)),
    }
}

fn array_payload(marker: Marker, map: &mut Map<String, Json>) -> Result<Vec<Json>, CodecError> {
    match map.remove(marker.key()).unwrap_or(Json::Null) {
        Json::Array(items) => Ok(items),
        other => Err(wrong_payload(marker, "array", &other)),
    }
}

/// Opportunistic conversion of a plain string toward the expected shape.
fn convert_string(text: String, shape: &Shape) -> Value {
    let target = shape.resolve();
    let converted = match target {
        Shape::Decimal => Decimal::parse(&text).map(Value::Decimal),
        Shape::Date => parse_date(&text).map(Value::Date),
        Shape::DateTime => Timestamp::parse(&text).map(Value::DateTime),
        Shape::ObjectId => ObjectId::parse_str(&text).map(Value::ObjectId),
        _ => return Value::String(text),
    };
    converted.unwrap_or_else(|err| {
        tracing::trace!(shape = %target, error = %err, "keeping string unconverted");
        Value::String(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachepack_core::{Record, RecordDescriptor, ResponseHandle};
    use chrono::NaiveDate;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        name: String,
    }

    impl Record for Tag {
        fn descriptor() -> RecordDescriptor {
            RecordDescriptor::new(module_path!(), "Tag").field("name", Shape::Str)
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            vec![("name", self.name.clone().into())]
        }

        fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
            Ok(Self {
                name: fields.take("name")?,
            })
        }
    }

    fn codec() -> Codec {
        Codec::with_registry(Arc::new(ModelRegistry::new()))
    }

    const MODEL: &str = Marker::Model.key();
    const DATE: &str = Marker::Date.key();
    const DECIMAL: &str = Marker::Decimal.key();
    const SET: &str = Marker::Set.key();
    const TUPLE: &str = Marker::Tuple.key();

    #[test]
    fn scalars_pass_through() {
        let c = codec();
        assert_eq!(c.pack(&Value::Null).unwrap(), Json::Null);
        assert_eq!(c.pack(&Value::from(true)).unwrap(), json!(true));
        assert_eq!(c.pack(&Value::from(42)).unwrap(), json!(42));
        assert_eq!(c.pack(&Value::from("hi")).unwrap(), json!("hi"));
        assert_eq!(c.unpack(json!(1.5)).unwrap(), Value::float(1.5).unwrap());
    }

    #[test]
    fn date_envelope_shape() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
        let packed = codec().pack(&Value::from(d)).unwrap();
        assert_eq!(packed, json!({ DATE: "2024-12-23" }));
    }

    #[test]
    fn decimal_is_packed_verbatim() {
        let d = Decimal::parse("10.50").unwrap();
        let packed = codec().pack(&Value::from(d)).unwrap();
        assert_eq!(packed, json!({ DECIMAL: "10.50" }));
    }

    #[test]
    fn tuple_and_set_use_envelopes() {
        let c = codec();
        let tuple = c.pack(&Value::tuple([Value::from(1), Value::from("a")])).unwrap();
        assert_eq!(tuple, json!({ TUPLE: [1, "a"] }));

        let set = c.pack(&Value::set([Value::from(7)])).unwrap();
        assert_eq!(set, json!({ SET: [7] }));
    }

    #[test]
    fn response_is_forbidden() {
        let resp = ResponseHandle {
            status: 200,
            url: "https://api.example.com/users".to_string(),
        };
        let nested = Value::list([Value::from(resp)]);
        let err = codec().pack(&nested).unwrap_err();
        assert!(matches!(err, CodecError::Forbidden { kind: "response" }));
        assert!(err.is_type_error());
    }

    #[test]
    fn bytes_unsupported() {
        let err = codec().pack(&Value::Bytes(vec![0xde, 0xad])).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported { kind: "bytes" }));
    }

    #[test]
    fn reserved_map_key_rejected() {
        let value = Value::map([(Marker::Decimal.key(), Value::from("1"))]);
        let err = codec().pack(&value).unwrap_err();
        assert!(matches!(err, CodecError::ReservedKey { .. }));
    }

    #[test]
    fn unregistered_record_cannot_pack() {
        let err = codec()
            .pack(&Value::record(Tag {
                name: "x".to_string(),
            }))
            .unwrap_err();
        assert!(err.is_registration_error());
    }

    #[test]
    fn record_round_trip() {
        let c = codec();
        c.registry().register::<Tag>(Some("tag")).unwrap();
        let tag = Value::record(Tag {
            name: "red".to_string(),
        });
        let packed = c.pack(&tag).unwrap();
        assert_eq!(packed, json!({ MODEL: "tag", "name": "red" }));
        assert_eq!(c.unpack(packed).unwrap(), tag);
    }

    #[test]
    fn unknown_alias_is_registration_error() {
        let payload = json!({ MODEL: "ghost", "name": "x" });
        let err = codec().unpack(payload).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Registration(RegistrationError::UnknownAlias { ref alias }) if alias == "ghost"
        ));
    }

    #[test]
    fn alias_mismatch_against_declared_shape() {
        let c = codec();
        c.registry().register::<Tag>(Some("tag")).unwrap();
        let payload = json!({ MODEL: "tag", "name": "x" });
        let err = c.unpack_as(payload.clone(), &Shape::record("label")).unwrap_err();
        assert!(matches!(err, CodecError::AliasMismatch { .. }));
        assert!(c.unpack_as(payload, &Shape::optional(Shape::record("tag"))).is_ok());
    }

    #[test]
    fn unknown_alias_wins_over_declared_shape() {
        let c = codec();
        c.registry().register::<Tag>(Some("tag")).unwrap();
        let err = c
            .unpack_as(json!({ MODEL: "ghost", "name": "x" }), &Shape::record("tag"))
            .unwrap_err();
        assert!(err.is_registration_error());
        assert!(!err.is_type_error());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Sloppy {
        listed: Vec<&'static str>,
    }

    impl Record for Sloppy {
        fn descriptor() -> RecordDescriptor {
            RecordDescriptor::new(module_path!(), "Sloppy")
                .field("a", Shape::Int)
                .field("b", Shape::Int)
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            self.listed.iter().map(|name| (*name, Value::from(1))).collect()
        }

        fn from_fields(_: &mut Fields) -> Result<Self, CodecError> {
            Ok(Self { listed: Vec::new() })
        }
    }

    #[test]
    fn record_fields_must_match_descriptor() {
        let c = codec();
        c.registry().register::<Sloppy>(Some("sloppy")).unwrap();
        let pack = |listed: Vec<&'static str>| c.pack(&Value::record(Sloppy { listed }));

        assert!(pack(vec!["a", "b"]).is_ok());
        for listed in [vec!["a"], vec!["a", "b", "c"], vec!["a", "a", "b"]] {
            let err = pack(listed).unwrap_err();
            assert!(matches!(err, CodecError::InvalidRecord { .. }), "{err}");
        }
    }

    #[test]
    fn construction_failure_is_wrapped() {
        let c = codec();
        c.registry().register::<Tag>(Some("tag")).unwrap();
        let err = c.unpack(json!({ MODEL: "tag", "name": 5 })).unwrap_err();
        assert!(matches!(err, CodecError::Construction { ref alias, .. } if alias == "tag"));
        assert!(err.is_type_error());
    }

    #[test]
    fn malformed_payloads() {
        let c = codec();
        let wrong_kind = c.unpack(json!({ DATE: 20241223 })).unwrap_err();
        assert!(matches!(
            wrong_kind,
            CodecError::MalformedEnvelope {
                marker: Marker::Date,
                source: ParseError::WrongPayload { .. }
            }
        ));

        let unparseable = c.unpack(json!({ DECIMAL: "ten" })).unwrap_err();
        assert!(matches!(
            unparseable,
            CodecError::MalformedEnvelope {
                marker: Marker::Decimal,
                ..
            }
        ));

        let set_not_array = c.unpack(json!({ SET: "abc" })).unwrap_err();
        assert!(set_not_array.is_type_error());
    }

    #[test]
    fn probe_order_prefers_date_over_model() {
        let payload = json!({
            MODEL: "ghost",
            DATE: "2024-01-02",
        });
        let value = codec().unpack(payload).unwrap();
        assert_eq!(value, Value::from(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }

    #[test]
    fn strings_convert_only_with_a_shape() {
        let c = codec();
        let text = json!("2024-12-23T10:30:00");
        assert_eq!(c.unpack(text.clone()).unwrap(), Value::from("2024-12-23T10:30:00"));

        let converted = c.unpack_as(text, &Shape::DateTime).unwrap();
        assert!(matches!(converted, Value::DateTime(Timestamp::Naive(_))));

        let kept = c.unpack_as(json!("not a date"), &Shape::Date).unwrap();
        assert_eq!(kept, Value::from("not a date"));

        let dec = c
            .unpack_as(json!("3.14"), &Shape::optional(Shape::Decimal))
            .unwrap();
        assert_eq!(dec, Value::from(Decimal::parse("3.14").unwrap()));
    }

    #[test]
    fn array_reinterpreted_as_tuple() {
        let shape = Shape::tuple([Shape::Int, Shape::Date]);
        let value = codec().unpack_as(json!([1, "2024-01-01", "extra"]), &shape).unwrap();
        assert_eq!(
            value,
            Value::tuple([
                Value::from(1),
                Value::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                Value::from("extra"),
            ])
        );
    }

    #[test]
    fn map_values_take_the_value_shape() {
        let value = codec()
            .unpack_as(json!({"a": "1.5", "b": "2"}), &Shape::map(Shape::Decimal))
            .unwrap();
        assert_eq!(
            value,
            Value::map([
                ("a", Value::from(Decimal::parse("1.5").unwrap())),
                ("b", Value::from(Decimal::parse("2").unwrap())),
            ])
        );
    }

    #[test]
    fn depth_limit_applies_both_ways() {
        let c = Codec::with_config(
            Arc::new(ModelRegistry::new()),
            CodecConfig::default().with_max_depth(3),
        )
        .unwrap();
        let mut shallow = Value::from(1);
        for _ in 0..3 {
            shallow = Value::list([shallow]);
        }
        assert!(c.pack(&shallow).is_ok());

        let deep = Value::list([shallow]);
        assert!(matches!(c.pack(&deep), Err(CodecError::DepthExceeded { limit: 3 })));

        let deep_json = json!([[[[1]]]]);
        assert!(matches!(c.unpack(deep_json), Err(CodecError::DepthExceeded { limit: 3 })));
    }

    #[test]
    fn dumps_and_loads_with_namespace() {
        let c = Codec::with_config(
            Arc::new(ModelRegistry::new()),
            CodecConfig::default().with_namespace("svc"),
        )
        .unwrap();
        let value = Value::map([("n", Value::from(1))]);
        let bytes = c.dumps(&value).unwrap();
        let raw: Json = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(raw, json!({"$ns": "svc", "$data": {"n": 1}}));
        assert_eq!(c.loads(Some(&bytes)).unwrap(), value);
    }

    #[test]
    fn zero_depth_config_is_refused() {
        let err = Codec::with_config(
            Arc::new(ModelRegistry::new()),
            CodecConfig::default().with_max_depth(0),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxDepth(_)));
    }

    #[test]
    fn map_shaped_like_namespace_envelope_survives_bytes() {
        let c = codec();
        let value = Value::map([
            (namespace::NS_KEY, Value::from("a")),
            (namespace::DATA_KEY, Value::from(1)),
        ]);
        let bytes = c.dumps(&value).unwrap();
        assert_eq!(c.loads(Some(&bytes)).unwrap(), value);
    }

    #[test]
    fn loads_none_is_null() {
        assert_eq!(codec().loads(None).unwrap(), Value::Null);
    }

    #[test]
    fn loads_rejects_invalid_json() {
        let err = codec().loads(Some(b"{not json")).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
