// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # docmap: Object-to-Document Mapping for Embedded Document Stores
//!
//! This crate converts native in-memory objects into a schema-less,
//! strongly-typed document value tree — and back — so that application
//! objects can be persisted and queried without hand-written serialization
//! code. It is the mapping layer of an embedded document store: everything
//! downstream (storage, indexing, query execution, the transaction log)
//! operates purely on the [`Value`] trees this layer produces and never on
//! native objects directly.
//!
//! ## Core Concepts
//!
//! - [`Value`] is a closed tagged union over every storable kind: null,
//!   booleans, both integer widths, doubles, decimals, strings, binary,
//!   datetimes, unique identifiers, ordered arrays, nested documents, and
//!   two sentinel bounds for index comparisons. [`Document`] is the
//!   string-keyed mapping at the root of every persisted object.
//!
//! - [`Entity`] is how a type opts into mapping: its impl declares each
//!   participating field to a [`TypeBuilder`], together with per-field
//!   options (rename, identity, ignore, index hints). The declarations are
//!   compiled once per type into a cached [`TypeDescriptor`] — built
//!   metadata is reused for the lifetime of the mapper.
//!
//! - [`Mapper`] is the façade. It holds the naming convention, the
//!   special-type converter registry, and the descriptor cache, and exposes
//!   [`Mapper::to_document`] and [`Mapper::to_object`].
//!
//! ## Getting Started
//!
//! ```rust
//! use docmap::{Entity, Mapper, TypeBuilder};
//! use uuid::Uuid;
//!
//! #[derive(Default)]
//! struct Customer {
//!     id: i32,
//!     name: String,
//!     my_guid: Uuid,
//!     visits: Option<i32>,
//!     tags: Vec<String>,
//! }
//!
//! impl Entity for Customer {
//!     fn describe(fields: &mut TypeBuilder<Self>) {
//!         fields.field("Id", |c| &c.id, |c, v| c.id = v);
//!         fields
//!             .field("Name", |c| &c.name, |c, v| c.name = v)
//!             .rename("MY-STRING");
//!         fields.field("MyGuid", |c| &c.my_guid, |c, v| c.my_guid = v);
//!         fields.field("Visits", |c| &c.visits, |c, v| c.visits = v);
//!         fields.field("Tags", |c| &c.tags, |c, v| c.tags = v);
//!     }
//! }
//!
//! let mut mapper = Mapper::new();
//! mapper.use_lower_case_delimiter('_');
//!
//! let customer = Customer {
//!     id: 123,
//!     name: "John".into(),
//!     my_guid: Uuid::new_v4(),
//!     visits: None,
//!     tags: vec!["vip".into()],
//! };
//!
//! let doc = mapper.to_document(&customer)?;
//! assert_eq!(doc["_id"], 123); // identity fields always map to `_id`
//! assert_eq!(doc["MY-STRING"], "John"); // renames bypass the convention
//! assert_eq!(doc["my_guid"], customer.my_guid); // the convention shapes the rest
//!
//! let restored: Customer = mapper.to_object(&doc)?;
//! assert_eq!(restored.id, 123);
//! assert_eq!(restored.tags, customer.tags);
//! # Ok::<(), docmap::MapperError>(())
//! ```
//!
//! ## Identity Detection
//!
//! A field explicitly marked with [`FieldDescriptor::id`] is the identity
//! field regardless of its name. Without a mark, a field named exactly `Id`
//! or `<TypeName>Id` is picked by convention. Either way its document key is
//! `_id`, and storage layers read it (plus any index hints) from the
//! [`TypeDescriptor`] — the mapper records that metadata but never acts on
//! it.
//!
//! ## Conversion Rules
//!
//! Primitives, `Option`, enumerations (via [`enumeration!`]), `char`,
//! decimals, datetimes, uuids, `Vec`, and string- or integer-keyed maps all
//! convert bidirectionally; see [`convert`] for the widening and narrowing
//! rules. Two special types ship with the crate: [`url::Url`] round-trips
//! through its canonical string form, and [`NameValueMap`] — an ordered
//! multi-value string map — stores single-valued keys as bare strings and
//! multi-valued keys as string arrays.
//!
//! Anything else can be taught to the mapper at runtime through
//! [`Mapper::register`], which installs (or overrides) a converter pair for
//! one native type, taking precedence over the built-in rules anywhere that
//! type occurs in an object graph.
//!
//! ## What Is Deliberately Not Supported
//!
//! - **Cyclic object graphs.** There is no cycle detection; a
//!   self-referential graph recurses until the stack runs out.
//! - **Polymorphic deserialization.** A heterogeneous list (`Vec<Value>`)
//!   round-trips each element as the nearest native equivalent of its
//!   document kind, not as whatever concrete type produced it.
//! - **Schema migration.** Missing keys deserialize to defaults (which is
//!   what makes adding fields safe), but nothing rewrites
//!   differently-shaped documents.
//!
//! ## Concurrency
//!
//! A `Mapper` performs no I/O and holds no locks while converting. The
//! descriptor cache tolerates concurrent first-use races: redundant builds
//! are identical and substitutable, the first insert wins, and cached
//! descriptors are immutable thereafter. Configure the mapper first (the
//! `&mut self` methods), then share `&Mapper` freely.
//!
//! ## Features
//!
//! - `json`: Renders `Value` trees as `serde_json::Value`. Enabled by
//!   default.
//! - `chrono`: `chrono::DateTime<Utc>` interop for [`Timestamp`]. Enabled by
//!   default.
//! - `serde`: Serialize/Deserialize derives on the value model.
//! - `arbitrary`: `quickcheck::Arbitrary` for [`Value`], useful for
//!   property-based testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod convert;
mod error;
pub mod mapper;
pub mod value;

#[cfg(feature = "json")]
mod json;
/// Macros usable for tests and initialization
pub mod macros;

pub use convert::{Binary, Enumeration, FromValue, MapKey, ToValue};
pub use error::MapperError;
pub use mapper::{
    Mapper,
    convention::{Case, NamingConvention},
    descriptor::{Entity, FieldDescriptor, ID_KEY, TypeBuilder, TypeDescriptor},
};
pub use value::{
    Document, NameValueMap, Timestamp, Value, ValueKind, timestamp::TimestampError,
};

// re-export for descriptor declarations of uuid/url/decimal fields
pub use rust_decimal;
pub use url;
pub use uuid;
