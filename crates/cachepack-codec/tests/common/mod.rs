//! Record types and codec setup shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;

use cachepack_codec::{
    Codec, CodecError, Decimal, Fields, ModelRegistry, ObjectId, Record, RecordDescriptor, Shape,
    Timestamp, Value, ValueSet,
};

pub const ADDRESS_ALIAS: &str = "address.v1";
pub const CUSTOMER_ALIAS: &str = "customer.v1";

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub city: String,
    pub postcode: Option<String>,
}

impl Record for Address {
    fn descriptor() -> RecordDescriptor {
        RecordDescriptor::new(module_path!(), "Address")
            .field("city", Shape::Str)
            .field("postcode", Shape::optional(Shape::Str))
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("city", self.city.clone().into()),
            ("postcode", self.postcode.clone().into()),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
        Ok(Self {
            city: fields.take("city")?,
            postcode: fields.take_optional("postcode")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: ObjectId,
    pub name: String,
    pub joined: NaiveDate,
    pub last_seen: Timestamp,
    pub balance: Decimal,
    pub tags: ValueSet,
    pub address: Address,
    pub window: (i64, i64),
}

impl Record for Customer {
    fn descriptor() -> RecordDescriptor {
        RecordDescriptor::new(module_path!(), "Customer")
            .field("id", Shape::ObjectId)
            .field("name", Shape::Str)
            .field("joined", Shape::Date)
            .field("last_seen", Shape::DateTime)
            .field("balance", Shape::Decimal)
            .field("tags", Shape::set(Shape::Str))
            .field("address", Shape::record(ADDRESS_ALIAS))
            .field("window", Shape::tuple([Shape::Int, Shape::Int]))
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("joined", self.joined.into()),
            ("last_seen", self.last_seen.into()),
            ("balance", self.balance.clone().into()),
            ("tags", self.tags.clone().into()),
            ("address", Value::record(self.address.clone())),
            ("window", self.window.into()),
        ]
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
        Ok(Self {
            id: fields.take("id")?,
            name: fields.take("name")?,
            joined: fields.take("joined")?,
            last_seen: fields.take("last_seen")?,
            balance: fields.take("balance")?,
            tags: fields.take("tags")?,
            address: fields.take_record("address")?,
            window: fields.take("window")?,
        })
    }
}

/// A codec over a private registry holding `Address` and `Customer`.
pub fn fresh_codec() -> Codec {
    let registry = Arc::new(ModelRegistry::new());
    registry
        .register::<Address>(Some(ADDRESS_ALIAS))
        .expect("address registers");
    registry
        .register::<Customer>(Some(CUSTOMER_ALIAS))
        .expect("customer registers");
    Codec::with_registry(registry)
}

/// A codec over an empty private registry.
pub fn bare_codec() -> Codec {
    Codec::with_registry(Arc::new(ModelRegistry::new()))
}

pub fn sample_customer() -> Customer {
    let last_seen = NaiveDate::from_ymd_opt(2024, 12, 23)
        .and_then(|d| d.and_hms_micro_opt(10, 30, 0, 123_456))
        .expect("valid datetime");
    Customer {
        id: ObjectId::parse_str("507f1f77bcf86cd799439011").expect("valid object id"),
        name: "Ada".to_string(),
        joined: NaiveDate::from_ymd_opt(2021, 3, 14).expect("valid date"),
        last_seen: Timestamp::from(last_seen),
        balance: Decimal::parse("1024.50").expect("valid decimal"),
        tags: [Value::from("vip"), Value::from("beta")].into_iter().collect(),
        address: Address {
            city: "Lisbon".to_string(),
            postcode: None,
        },
        window: (9, 17),
    }
}
