//! # Model Registry — The Deserialization Allow-List
//!
//! Only record types registered here may be reconstructed from a MODEL
//! envelope. An alias found in a payload that the registry does not know is
//! a registration error, never a best-effort guess. This is the trust boundary
//! between cached bytes and live types.
//!
//! The alias↔type mapping is a bijection: an alias names exactly one type and
//! a type holds exactly one alias. Both directions are kept in one map pair
//! behind a single `parking_lot::RwLock` so they can never drift apart.
//!
//! Registration happens during start-up; afterwards the registry is read
//! concurrently by every codec that shares it.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use cachepack_core::{
    CodecError, Fields, Marker, Record, RecordDescriptor, RecordValue, RegistrationError,
};

type Constructor = fn(&mut Fields) -> Result<RecordValue, CodecError>;

fn construct<T: Record>(fields: &mut Fields) -> Result<RecordValue, CodecError> {
    T::from_fields(fields).map(RecordValue::new)
}

/// A registered record type.
pub struct ModelEntry {
    alias: String,
    type_id: TypeId,
    descriptor: RecordDescriptor,
    constructor: Constructor,
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("alias", &self.alias)
            .field("type_name", &self.descriptor.qualified_name())
            .finish()
    }
}

impl ModelEntry {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    /// Returns true if this entry was registered for `T`.
    pub fn is<T: Record>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Build an instance from decoded fields.
    ///
    /// Every field must be consumed by the type's constructor.
    ///
    /// # Errors
    ///
    /// `CodecError::Construction` wrapping the constructor's failure or the
    /// first leftover field.
    pub fn construct(&self, mut fields: Fields) -> Result<RecordValue, CodecError> {
        (self.constructor)(&mut fields)
            .and_then(|record| fields.finish().map(|()| record))
            .map_err(|source| CodecError::Construction {
                alias: self.alias.clone(),
                source: Box::new(source),
            })
    }
}

#[derive(Default)]
struct Tables {
    by_alias: HashMap<String, Arc<ModelEntry>>,
    by_type: HashMap<TypeId, String>,
}

/// Thread-safe alias↔type registry.
#[derive(Default)]
pub struct ModelRegistry {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("aliases", &self.aliases())
            .finish()
    }
}

static GLOBAL: OnceLock<Arc<ModelRegistry>> = OnceLock::new();

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> Arc<ModelRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ModelRegistry::new())))
    }

    /// Register `T` under `alias`, or under `module::path::TypeName` when no
    /// alias is given. Returns the alias actually used.
    ///
    /// Fallback aliases follow the declaring module path, so moving the type
    /// orphans payloads written before the move. Prefer explicit aliases for
    /// anything that outlives a deploy.
    ///
    /// # Errors
    ///
    /// - `InvalidRecord` if the alias is empty or the descriptor declares no
    ///   fields, a duplicate field, or a field named like a marker key.
    /// - `AlreadyRegistered` if `T` already holds an alias.
    /// - `DuplicateAlias` if the alias belongs to another type.
    pub fn register<T: Record>(&self, alias: Option<&str>) -> Result<String, CodecError> {
        let descriptor = T::descriptor();
        let type_name = descriptor.qualified_name();
        let alias = match alias {
            Some(alias) => alias.to_string(),
            None => {
                tracing::warn!(
                    alias = %type_name,
                    "registering model under derived fallback alias; pass an explicit alias for long-lived payloads"
                );
                type_name.clone()
            }
        };

        if let Err(err) = validate(&descriptor, &alias) {
            tracing::warn!(alias = %alias, type_name = %type_name, error = %err, "rejected model registration");
            return Err(err);
        }

        let type_id = TypeId::of::<T>();
        let mut tables = self.tables.write();

        if let Some(existing) = tables.by_type.get(&type_id) {
            let err = RegistrationError::AlreadyRegistered {
                type_name,
                alias: existing.clone(),
            };
            tracing::warn!(alias = %alias, error = %err, "rejected model registration");
            return Err(err.into());
        }
        if let Some(entry) = tables.by_alias.get(&alias) {
            let err = RegistrationError::DuplicateAlias {
                alias: alias.clone(),
                existing: entry.descriptor.qualified_name(),
                attempted: type_name,
            };
            tracing::warn!(alias = %alias, error = %err, "rejected model registration");
            return Err(err.into());
        }

        let entry = ModelEntry {
            alias: alias.clone(),
            type_id,
            descriptor,
            constructor: construct::<T>,
        };
        tables.by_type.insert(type_id, alias.clone());
        tables.by_alias.insert(alias.clone(), Arc::new(entry));
        tracing::debug!(alias = %alias, type_name = %type_name, "registered model");
        Ok(alias)
    }

    /// Entry registered under `alias`.
    pub fn lookup(&self, alias: &str) -> Option<Arc<ModelEntry>> {
        self.tables.read().by_alias.get(alias).cloned()
    }

    /// Alias held by `T`.
    pub fn reverse_lookup<T: Record>(&self) -> Option<String> {
        self.alias_of(TypeId::of::<T>())
    }

    /// Alias held by the type with the given id.
    pub fn alias_of(&self, type_id: TypeId) -> Option<String> {
        self.tables.read().by_type.get(&type_id).cloned()
    }

    pub fn is_registered<T: Record>(&self) -> bool {
        self.tables.read().by_type.contains_key(&TypeId::of::<T>())
    }

    /// Drop every registration.
    pub fn clear(&self) {
        let mut tables = self.tables.write();
        let dropped = tables.by_alias.len();
        tables.by_alias.clear();
        tables.by_type.clear();
        tracing::debug!(dropped, "cleared model registry");
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().by_alias.is_empty()
    }

    /// Registered aliases in sorted order.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.tables.read().by_alias.keys().cloned().collect();
        aliases.sort();
        aliases
    }
}

fn validate(descriptor: &RecordDescriptor, alias: &str) -> Result<(), CodecError> {
    let invalid = |reason: String| CodecError::InvalidRecord {
        type_name: descriptor.qualified_name(),
        reason,
    };

    if alias.is_empty() {
        return Err(invalid("alias must not be empty".to_string()));
    }
    if descriptor.fields.is_empty() {
        return Err(invalid("record declares no fields".to_string()));
    }

    let mut seen = BTreeSet::new();
    for field in &descriptor.fields {
        if field.name.is_empty() {
            return Err(invalid("field name must not be empty".to_string()));
        }
        if Marker::is_reserved(field.name) {
            return Err(invalid(format!(
                "field `{}` collides with a reserved marker key",
                field.name
            )));
        }
        if !seen.insert(field.name) {
            return Err(invalid(format!("field `{}` declared twice", field.name)));
        }
    }
    Ok(())
}
