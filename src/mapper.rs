// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # The Mapper Façade
//!
//! [`Mapper`] is the public entry point of this crate: it owns the naming
//! convention, the special-type converter registry, and the type descriptor
//! cache, and exposes [`Mapper::to_document`] and [`Mapper::to_object`].
//!
//! The expected deployment is one long-lived `Mapper` per application,
//! configured up front and then shared by reference:
//!
//! ```rust
//! use docmap::Mapper;
//!
//! let mut mapper = Mapper::new();
//! mapper.use_lower_case_delimiter('_');
//! // from here on, share &mapper freely between threads
//! ```
//!
//! Configuration methods take `&mut self` and mapping methods take `&self`,
//! so the borrow checker enforces the configure-before-use ordering for you.
//! The one sharp edge it cannot catch: a descriptor is built with the
//! convention in force at the *first* use of its type, and reconfiguring the
//! mapper afterwards has no effect on types already cached.
use crate::{
    FromValue, ToValue,
    error::MapperError,
    value::{Document, Value},
};
use std::{
    any::{self, Any, TypeId},
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

pub mod convention;
pub mod descriptor;

use convention::NamingConvention;
use descriptor::{Entity, TypeDescriptor};

type AnyConvert =
    Box<dyn Fn(&dyn Any, &Mapper) -> Result<Value, MapperError> + Send + Sync>;
type AnyRevert =
    Box<dyn Fn(Value, &Mapper) -> Result<Box<dyn Any>, MapperError> + Send + Sync>;

/// A registered special-type converter: one function per direction.
struct Converter {
    serialize: AnyConvert,
    deserialize: AnyRevert,
}

/// Converts native objects to [`Document`] trees and back.
///
/// See the [module docs](self) for the configuration lifecycle and the
/// crate docs for a full example.
#[derive(Default)]
pub struct Mapper {
    convention: NamingConvention,
    converters: HashMap<TypeId, Converter, ahash::RandomState>,
    descriptors: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>, ahash::RandomState>>,
}

impl Mapper {
    /// Creates a mapper with the identity naming convention and an empty
    /// converter registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves document keys by lowercasing and delimiting at word
    /// boundaries, e.g. `MyGuid` → `my_guid` with delimiter `'_'`.
    ///
    /// Only affects types whose descriptors have not been built yet.
    pub fn use_lower_case_delimiter(&mut self, delimiter: char) -> &mut Self {
        self.convention = NamingConvention::lower_case_delimiter(delimiter);
        self
    }

    /// Resolves document keys by lowercasing the leading character, e.g.
    /// `MyGuid` → `myGuid`.
    ///
    /// Only affects types whose descriptors have not been built yet.
    pub fn use_camel_case(&mut self) -> &mut Self {
        self.convention = NamingConvention::camel_case();
        self
    }

    /// Installs a custom naming convention.
    ///
    /// Only affects types whose descriptors have not been built yet.
    pub fn use_convention(&mut self, convention: NamingConvention) -> &mut Self {
        self.convention = convention;
        self
    }

    /// The naming convention currently in force for new descriptors.
    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    /// Registers (or overrides) a special-type converter for `T`.
    ///
    /// The converter takes precedence over `T`'s [`ToValue`]/[`FromValue`]
    /// impls everywhere a `T` is converted, including inside options,
    /// collections, and maps.
    pub fn register<T, S, D>(&mut self, serialize: S, deserialize: D) -> &mut Self
    where
        T: 'static,
        S: Fn(&T, &Mapper) -> Result<Value, MapperError> + Send + Sync + 'static,
        D: Fn(Value, &Mapper) -> Result<T, MapperError> + Send + Sync + 'static,
    {
        self.converters.insert(
            TypeId::of::<T>(),
            Converter {
                serialize: Box::new(move |raw, mapper| {
                    let native = raw.downcast_ref::<T>().ok_or(MapperError::UnsupportedType {
                        type_name: any::type_name::<T>(),
                    })?;
                    serialize(native, mapper)
                }),
                deserialize: Box::new(move |value, mapper| {
                    Ok(Box::new(deserialize(value, mapper)?))
                }),
            },
        );
        self
    }

    /// Converts a single native value into a [`Value`].
    ///
    /// Checks the converter registry first and falls back to the
    /// [`ToValue`] impl. All built-in conversions route their nested steps
    /// through this method, which is what makes registry overrides reach
    /// arbitrarily deep positions.
    pub fn serialize<F>(&self, native: &F) -> Result<Value, MapperError>
    where
        F: ToValue + 'static,
    {
        match self.converters.get(&TypeId::of::<F>()) {
            Some(converter) => (converter.serialize)(native, self),
            None => native.to_value(self),
        }
    }

    /// Converts a [`Value`] into a single native value.
    ///
    /// The registry-first lookup mirrors [`Mapper::serialize`].
    pub fn deserialize<F>(&self, value: Value) -> Result<F, MapperError>
    where
        F: FromValue + 'static,
    {
        match self.converters.get(&TypeId::of::<F>()) {
            Some(converter) => {
                let boxed = (converter.deserialize)(value, self)?;
                boxed
                    .downcast::<F>()
                    .map(|native| *native)
                    .map_err(|_| MapperError::UnsupportedType {
                        type_name: any::type_name::<F>(),
                    })
            }
            None => F::from_value(value, self),
        }
    }

    /// Returns the cached descriptor for `T`, building it on first use.
    ///
    /// Concurrent first uses may build redundantly; every build observes the
    /// same convention and declarations, so the results are substitutable
    /// and the first one inserted wins. The lock is never held while user
    /// code (accessors, converters) runs.
    pub fn descriptor<T: Entity>(&self) -> Arc<TypeDescriptor<T>> {
        let type_id = TypeId::of::<T>();
        {
            let cache = self
                .descriptors
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(&type_id) {
                return Arc::clone(cached)
                    .downcast()
                    .expect("descriptors are cached under their own TypeId");
            }
        }

        let built: Arc<TypeDescriptor<T>> = Arc::new(TypeDescriptor::build(&self.convention));
        let mut cache = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = cache.entry(type_id).or_insert(built);
        Arc::clone(entry)
            .downcast()
            .expect("descriptors are cached under their own TypeId")
    }

    /// Converts an entity into a [`Document`].
    ///
    /// Every non-ignored readable field is converted and inserted under its
    /// resolved key. On failure no document is returned; a document is never
    /// partially converted on success.
    pub fn to_document<T: Entity>(&self, entity: &T) -> Result<Document, MapperError> {
        let descriptor = self.descriptor::<T>();
        let mut doc = Document::with_capacity(descriptor.fields().len());
        for field in descriptor.fields() {
            if field.is_ignored() {
                continue;
            }
            if let Some(value) = field.read(entity, self) {
                doc.insert(field.key(), value?);
            }
        }
        Ok(doc)
    }

    /// Reconstructs an entity from a [`Document`].
    ///
    /// Starts from `T::default()` and writes every non-ignored writable
    /// field whose key is present in the document. Missing keys are not an
    /// error: the field keeps its default, which is what lets documents
    /// written under an older or newer schema still load. On failure no
    /// object is returned; an object is never partially populated on
    /// success.
    pub fn to_object<T: Entity + Default>(&self, doc: &Document) -> Result<T, MapperError> {
        let descriptor = self.descriptor::<T>();
        let mut entity = T::default();
        for field in descriptor.fields() {
            if field.is_ignored() || !field.is_writable() {
                continue;
            }
            let Some(value) = doc.get(field.key()) else {
                continue;
            };
            field.write(&mut entity, value.clone(), self)?;
        }
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;
    use std::sync::Barrier;

    #[derive(Default)]
    struct Player {
        id: i32,
        name: String,
    }

    impl Entity for Player {
        fn describe(fields: &mut descriptor::TypeBuilder<Self>) {
            fields.field("PlayerId", |p| &p.id, |p, v| p.id = v);
            fields.field("Name", |p| &p.name, |p, v| p.name = v);
        }
    }

    #[test]
    fn descriptors_are_cached_per_type() {
        let mapper = Mapper::new();
        let first = mapper.descriptor::<Player>();
        let second = mapper.descriptor::<Player>();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn concurrent_first_use_yields_one_descriptor() {
        let mapper = Mapper::new();
        let barrier = Barrier::new(4);
        let descriptors: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        mapper.descriptor::<Player>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for pair in descriptors.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }

    #[test]
    fn reconfiguration_after_first_use_does_not_rebuild() {
        let mut mapper = Mapper::new();
        let before = mapper.to_document(&Player::default()).unwrap();
        assert!(before.contains_key("Name"));

        mapper.use_lower_case_delimiter('_');
        let after = mapper.to_document(&Player::default()).unwrap();
        // documented sharp edge: the cached descriptor stays as built
        assert!(after.contains_key("Name"));
        assert!(!after.contains_key("name"));
    }

    #[test]
    fn registered_converters_override_trait_impls_everywhere() {
        let mut mapper = Mapper::new();
        // store booleans as the strings the legacy system used
        mapper.register::<bool, _, _>(
            |b, _| Ok(Value::String(if *b { "yes" } else { "no" }.into())),
            |value, _| match value {
                Value::String(s) if s == "yes" => Ok(true),
                Value::String(s) if s == "no" => Ok(false),
                other => Err(MapperError::UnexpectedKind {
                    expected: "String",
                    found: other.kind(),
                }),
            },
        );

        assert_eq!(mapper.serialize(&true).unwrap(), Value::String("yes".into()));
        // the override reaches nested positions
        let nested = mapper.serialize(&vec![Some(false)]).unwrap();
        assert_eq!(
            nested,
            Value::Array(vec![Value::String("no".into())])
        );
        let back: Vec<Option<bool>> = mapper.deserialize(nested).unwrap();
        assert_eq!(back, vec![Some(false)]);
    }

    #[test]
    fn sentinels_do_not_deserialize_into_native_types() {
        let mapper = Mapper::new();
        let err = mapper.deserialize::<i32>(Value::MaxValue).unwrap_err();
        assert_eq!(
            err,
            MapperError::UnexpectedKind {
                expected: "Int32 or Int64",
                found: ValueKind::MaxValue,
            }
        );
    }
}
