// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Type descriptors: per-type metadata describing how a native type maps to
//! document fields.
//!
//! In place of runtime reflection, a type opts into mapping by implementing
//! [`Entity`] and declaring its fields to a [`TypeBuilder`]. Because the impl
//! lives in the type's own module, it can wire private fields into accessors
//! — that is the *only* way non-public state becomes restorable, an explicit
//! capability rather than a visibility bypass.
//!
//! Descriptors are built once per type, on first use, and cached inside the
//! [`Mapper`](crate::Mapper) for its lifetime. A built [`TypeDescriptor`] is
//! immutable and safe to read from any number of threads without
//! synchronization.
use crate::{Mapper, error::MapperError, mapper::convention::NamingConvention, value::Value};

/// The document key every identity field maps to.
pub const ID_KEY: &str = "_id";

/// A type that can be mapped to and from a [`Document`](crate::Document).
///
/// Implementations declare each participating field to the builder. A field
/// that is not declared does not exist to the mapper: it is never read,
/// never written, and never appears in a document.
///
/// # Examples
///
/// ```rust
/// use docmap::{Entity, Mapper, TypeBuilder};
///
/// #[derive(Default)]
/// struct Customer {
///     id: i32,
///     name: String,
/// }
///
/// impl Entity for Customer {
///     fn describe(fields: &mut TypeBuilder<Self>) {
///         fields.field("Id", |c| &c.id, |c, v| c.id = v);
///         fields.field("Name", |c| &c.name, |c, v| c.name = v);
///     }
/// }
///
/// let mapper = Mapper::new();
/// let doc = mapper.to_document(&Customer { id: 5, name: "Ada".into() })?;
/// assert_eq!(doc["_id"], 5);
/// assert_eq!(doc["Name"], "Ada");
/// # Ok::<(), docmap::MapperError>(())
/// ```
pub trait Entity: Sized + 'static {
    /// Declares this type's fields.
    ///
    /// Called once per [`Mapper`](crate::Mapper), at the first
    /// `to_document`/`to_object` involving `Self`.
    fn describe(fields: &mut TypeBuilder<Self>);
}

type Getter<T> = Box<dyn Fn(&T, &Mapper) -> Result<Value, MapperError> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value, &Mapper) -> Result<(), MapperError> + Send + Sync>;

/// Per-field metadata within a [`TypeDescriptor`].
pub struct FieldDescriptor<T> {
    name: &'static str,
    key: String,
    rename: Option<&'static str>,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
    ignored: bool,
    id_marked: bool,
    is_id: bool,
    auto_id: bool,
    index_requested: bool,
    unique_index: bool,
}

impl<T> FieldDescriptor<T> {
    fn new(name: &'static str, getter: Option<Getter<T>>, setter: Option<Setter<T>>) -> Self {
        Self {
            name,
            key: String::new(),
            rename: None,
            getter,
            setter,
            ignored: false,
            id_marked: false,
            is_id: false,
            auto_id: true,
            index_requested: false,
            unique_index: false,
        }
    }

    // -- builder options, chainable while describing a type --

    /// Overrides the document key, bypassing the naming convention.
    pub fn rename(&mut self, key: &'static str) -> &mut Self {
        self.rename = Some(key);
        self
    }

    /// Marks this field as the identity field, regardless of its name.
    ///
    /// `auto` controls whether storage may auto-generate a value for it;
    /// the mapper records the flag without acting on it.
    pub fn id(&mut self, auto: bool) -> &mut Self {
        self.id_marked = true;
        self.auto_id = auto;
        self
    }

    /// Excludes this field from both directions. It never appears in a
    /// produced document, and a document key matching its would-be key is
    /// left unread.
    pub fn ignore(&mut self) -> &mut Self {
        self.ignored = true;
        self
    }

    /// Requests an index on this field. The hint is recorded for storage
    /// and not acted upon by the mapper.
    pub fn index(&mut self, unique: bool) -> &mut Self {
        self.index_requested = true;
        self.unique_index = unique;
        self
    }

    // -- read-only metadata, for the mapper and for storage layers --

    /// The native field name as declared.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The resolved document key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn is_id(&self) -> bool {
        self.is_id
    }

    /// Whether storage may auto-generate the identity value.
    pub fn auto_id(&self) -> bool {
        self.auto_id
    }

    pub fn index_requested(&self) -> bool {
        self.index_requested
    }

    pub fn unique_index(&self) -> bool {
        self.unique_index
    }

    pub(crate) fn read(&self, entity: &T, mapper: &Mapper) -> Option<Result<Value, MapperError>> {
        self.getter.as_ref().map(|get| get(entity, mapper))
    }

    pub(crate) fn write(
        &self,
        entity: &mut T,
        value: Value,
        mapper: &Mapper,
    ) -> Result<(), MapperError> {
        match &self.setter {
            Some(set) => set(entity, value, mapper),
            None => Ok(()),
        }
    }
}

/// Collects field declarations while [`Entity::describe`] runs.
pub struct TypeBuilder<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: Entity> TypeBuilder<T> {
    fn new() -> Self {
        Self {
            type_name: short_type_name::<T>(),
            fields: Vec::new(),
        }
    }

    /// Declares a readable and writable field.
    pub fn field<F>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> &mut FieldDescriptor<T>
    where
        F: crate::ToValue + crate::FromValue + 'static,
    {
        self.push(FieldDescriptor::new(
            name,
            Some(Box::new(move |entity, mapper| mapper.serialize(get(entity)))),
            Some(Box::new(move |entity, value, mapper| {
                set(entity, mapper.deserialize(value)?);
                Ok(())
            })),
        ))
    }

    /// Declares a field that is serialized but never restored.
    pub fn read_only<F>(&mut self, name: &'static str, get: fn(&T) -> &F) -> &mut FieldDescriptor<T>
    where
        F: crate::ToValue + 'static,
    {
        self.push(FieldDescriptor::new(
            name,
            Some(Box::new(move |entity, mapper| mapper.serialize(get(entity)))),
            None,
        ))
    }

    /// Declares a field that is restored but never emitted.
    pub fn write_only<F>(
        &mut self,
        name: &'static str,
        set: fn(&mut T, F),
    ) -> &mut FieldDescriptor<T>
    where
        F: crate::FromValue + 'static,
    {
        self.push(FieldDescriptor::new(
            name,
            None,
            Some(Box::new(move |entity, value, mapper| {
                set(entity, mapper.deserialize(value)?);
                Ok(())
            })),
        ))
    }

    fn push(&mut self, field: FieldDescriptor<T>) -> &mut FieldDescriptor<T> {
        self.fields.push(field);
        self.fields.last_mut().expect("just pushed")
    }

    fn finish(mut self, convention: &NamingConvention) -> TypeDescriptor<T> {
        // explicit mark wins over the name convention; first mark by
        // declaration order wins over later ones
        let id = self
            .fields
            .iter()
            .position(|f| f.id_marked && !f.ignored)
            .or_else(|| {
                let type_id_name = format!("{}Id", self.type_name);
                self.fields
                    .iter()
                    .position(|f| !f.ignored && (f.name == "Id" || f.name == type_id_name))
            });
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.is_id = Some(i) == id;
            field.key = if field.is_id {
                ID_KEY.to_owned()
            } else if let Some(rename) = field.rename {
                rename.to_owned()
            } else {
                convention.resolve(field.name)
            };
        }
        TypeDescriptor {
            type_name: self.type_name,
            fields: self.fields,
            id,
        }
    }
}

/// Cached mapping metadata for one native type.
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    id: Option<usize>,
}

impl<T: Entity> TypeDescriptor<T> {
    pub(crate) fn build(convention: &NamingConvention) -> Self {
        let mut builder = TypeBuilder::new();
        T::describe(&mut builder);
        builder.finish(convention)
    }

    /// The short name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// The identity field, if the type has one.
    pub fn id_field(&self) -> Option<&FieldDescriptor<T>> {
        self.id.map(|i| &self.fields[i])
    }
}

/// The unqualified name of `T`, without module path or generic arguments.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
