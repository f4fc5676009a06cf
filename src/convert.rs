// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Bidirectional Value Conversion
//!
//! This module defines the two conversion traits, [`ToValue`] and
//! [`FromValue`], and implements them for every natively supported type:
//! primitives, nullable wrappers, collections, dictionaries, and the
//! string-representable special types.
//!
//! ## Routing through the mapper
//!
//! Every recursive step goes through [`Mapper::serialize`] and
//! [`Mapper::deserialize`] rather than calling the traits directly. That is
//! what makes the mapper's converter registry able to override the conversion
//! of any type *anywhere* in a value tree, including elements of collections
//! and values of maps.
//!
//! ## Widening and narrowing
//!
//! Integers are stored in the smallest document kind that holds the full
//! native range without loss (`u8`/`i8`/`i16`/`u16`/`i32` as `Int32`,
//! `u32`/`i64` as `Int64`). Deserialization accepts either integer kind and
//! narrows with an explicit range check, so a value written by a wider field
//! can be read back by a narrower one as long as it fits; overflow is a
//! [`MapperError::OutOfRange`]. Decimals are never routed through floating
//! point in either direction.
use crate::{
    Mapper,
    error::MapperError,
    value::{Document, NameValueMap, Timestamp, Value},
};
use rust_decimal::Decimal;
use std::{
    any,
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
};
use url::Url;
use uuid::Uuid;

/// Conversion from a native value into a [`Value`].
///
/// Implementations receive the [`Mapper`] so that nested conversions can be
/// routed through its converter registry and descriptor cache.
pub trait ToValue {
    fn to_value(&self, mapper: &Mapper) -> Result<Value, MapperError>;
}

/// Conversion from a [`Value`] back into a native value.
pub trait FromValue: Sized {
    fn from_value(value: Value, mapper: &Mapper) -> Result<Self, MapperError>;
}

/// An enumeration stored as its ordinal.
///
/// Implemented by the [`enumeration!`](crate::enumeration) macro, which also
/// derives the [`ToValue`]/[`FromValue`] impls mapping members to
/// [`Value::Int32`] ordinals. Deserializing an ordinal no member carries is a
/// [`MapperError::UnknownOrdinal`].
pub trait Enumeration: Sized {
    /// The ordinal this member is stored as.
    fn ordinal(&self) -> i32;
    /// Returns the member carrying `ordinal`, if any.
    fn from_ordinal(ordinal: i32) -> Option<Self>;
}

/// A type usable as a dictionary key.
///
/// Key types with a canonical textual form (`TEXTUAL = true`: strings and
/// integers) serialize their map as a [`Value::Document`] keyed by that form.
/// All other key types serialize as a [`Value::Array`] of `{key, value}`
/// sub-documents, which preserves every entry without any collision risk.
///
/// For textual keys, two distinct keys whose textual forms collide leave the
/// resulting document with a single, arbitrary survivor — a documented
/// limitation of the textual branch, not an error.
///
/// Implementing the trait with all defaults (`impl MapKey for MyKey {}`)
/// selects the `{key, value}` branch; the key type then only needs
/// [`ToValue`] and [`FromValue`].
pub trait MapKey: Sized {
    /// Whether this key type has a canonical textual form.
    const TEXTUAL: bool = false;

    /// The textual form used as a document key. Returns `Some` for every
    /// value of a `TEXTUAL` key type.
    fn write_key(&self) -> Option<String> {
        None
    }

    /// Re-parses a document key. Returns `None` on malformed input, which
    /// deserialization surfaces as [`MapperError::Malformed`].
    fn read_key(_key: &str) -> Option<Self> {
        None
    }
}

impl MapKey for String {
    const TEXTUAL: bool = true;

    fn write_key(&self) -> Option<String> {
        Some(self.clone())
    }

    fn read_key(key: &str) -> Option<Self> {
        Some(key.to_owned())
    }
}

macro_rules! impl_map_key_int {
    ($($t:ty),+ $(,)?) => {
        $(
            impl MapKey for $t {
                const TEXTUAL: bool = true;

                fn write_key(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn read_key(key: &str) -> Option<Self> {
                    key.parse().ok()
                }
            }
        )+
    };
}
impl_map_key_int!(u8, i8, i16, u16, i32, u32, i64, u64);

// Guids make fine map keys but have no textual-key convention here; they go
// through the `{key, value}` branch.
impl MapKey for Uuid {}

fn unexpected(expected: &'static str, found: &Value) -> MapperError {
    MapperError::UnexpectedKind {
        expected,
        found: found.kind(),
    }
}

/// Extracts either integer kind as an `i64`.
fn integer_of(value: Value) -> Result<i64, MapperError> {
    match value {
        Value::Int32(v) => Ok(v.into()),
        Value::Int64(v) => Ok(v),
        other => Err(unexpected("Int32 or Int64", &other)),
    }
}

macro_rules! impl_convert_int {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ToValue for $t {
                fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
                    Ok(Value::$variant((*self).into()))
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
                    let raw = integer_of(value)?;
                    <$t>::try_from(raw).map_err(|_| MapperError::OutOfRange {
                        target: stringify!($t),
                        value: raw.into(),
                    })
                }
            }
        )+
    };
}
impl_convert_int!(
    u8  => Int32,
    i8  => Int32,
    i16 => Int32,
    u16 => Int32,
    i32 => Int32,
    u32 => Int64,
    i64 => Int64,
);

impl ToValue for u64 {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        i64::try_from(*self)
            .map(Value::Int64)
            .map_err(|_| MapperError::OutOfRange {
                target: "u64",
                value: i128::from(*self),
            })
    }
}

impl FromValue for u64 {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        let raw = integer_of(value)?;
        u64::try_from(raw).map_err(|_| MapperError::OutOfRange {
            target: "u64",
            value: raw.into(),
        })
    }
}

impl ToValue for bool {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Boolean(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Boolean(v) => Ok(v),
            other => Err(unexpected("Boolean", &other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Double(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Double(v) => Ok(v),
            Value::Int32(v) => Ok(f64::from(v)),
            Value::Int64(v) => Ok(v as f64),
            other => Err(unexpected("Double, Int32 or Int64", &other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Double(f64::from(*self)))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value, mapper: &Mapper) -> Result<Self, MapperError> {
        f64::from_value(value, mapper).map(|v| v as f32)
    }
}

impl ToValue for String {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::String(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(unexpected("String", &other)),
        }
    }
}

impl ToValue for char {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::String(self.to_string()))
    }
}

impl FromValue for char {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::String(s) => {
                let (first, second) = {
                    let mut chars = s.chars();
                    (chars.next(), chars.next())
                };
                match (first, second) {
                    (Some(c), None) => Ok(c),
                    _ => Err(MapperError::Malformed {
                        target: "char",
                        input: s,
                    }),
                }
            }
            other => Err(unexpected("String", &other)),
        }
    }
}

impl ToValue for Decimal {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Decimal(*self))
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Int32(v) => Ok(Decimal::from(v)),
            Value::Int64(v) => Ok(Decimal::from(v)),
            // Doubles are deliberately rejected: decimals never round-trip
            // through floating point.
            other => Err(unexpected("Decimal, Int32 or Int64", &other)),
        }
    }
}

impl ToValue for Timestamp {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::DateTime(*self))
    }
}

impl FromValue for Timestamp {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::DateTime(v) => Ok(v),
            other => Err(unexpected("DateTime", &other)),
        }
    }
}

#[cfg(feature = "chrono")]
impl ToValue for chrono::DateTime<chrono::Utc> {
    /// Truncates to millisecond precision; years outside 0-9999 fail.
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::DateTime(Timestamp::new(*self)?))
    }
}

#[cfg(feature = "chrono")]
impl FromValue for chrono::DateTime<chrono::Utc> {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::DateTime(v) => Ok(v.to_datetime()),
            other => Err(unexpected("DateTime", &other)),
        }
    }
}

impl ToValue for Uuid {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Guid(*self))
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Guid(v) => Ok(v),
            other => Err(unexpected("Guid", &other)),
        }
    }
}

/// Wrapper that maps a byte buffer to [`Value::Binary`].
///
/// A bare `Vec<u8>` serializes element-wise as an array of `Int32`s through
/// the generic collection impl; wrap the buffer in `Binary` to use the
/// dedicated binary kind instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Binary(#[cfg_attr(feature = "serde", serde(with = "serde_bytes"))] pub Vec<u8>);

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ToValue for Binary {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Binary(self.0.clone()))
    }
}

impl FromValue for Binary {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Binary(v) => Ok(Self(v)),
            other => Err(unexpected("Binary", &other)),
        }
    }
}

impl ToValue for Url {
    /// Serialized as the canonical string form.
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::String(self.as_str().to_owned()))
    }
}

impl FromValue for Url {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::String(s) => Url::parse(&s).map_err(|_| MapperError::Malformed {
                target: "Url",
                input: s,
            }),
            other => Err(unexpected("String", &other)),
        }
    }
}

impl ToValue for NameValueMap {
    /// A key with exactly one value becomes a bare string; a key with several
    /// values becomes an array of strings.
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        let mut doc = Document::with_capacity(self.len());
        for (key, values) in self.iter() {
            let value = match values {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            doc.insert(key, value);
        }
        Ok(Value::Document(doc))
    }
}

impl FromValue for NameValueMap {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        let Value::Document(doc) = value else {
            return Err(MapperError::UnexpectedKind {
                expected: "Document",
                found: value.kind(),
            });
        };
        let mut map = NameValueMap::new();
        for (key, value) in doc {
            match value {
                Value::String(s) => map.append(key, s),
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(s) => map.append(key.clone(), s),
                            other => return Err(unexpected("String", &other)),
                        }
                    }
                }
                other => return Err(unexpected("String or Array", &other)),
            }
        }
        Ok(map)
    }
}

impl<T> ToValue for Option<T>
where
    T: ToValue + 'static,
{
    fn to_value(&self, mapper: &Mapper) -> Result<Value, MapperError> {
        match self {
            None => Ok(Value::Null),
            Some(v) => mapper.serialize(v),
        }
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue + 'static,
{
    fn from_value(value: Value, mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Null => Ok(None),
            other => mapper.deserialize(other).map(Some),
        }
    }
}

impl<T> ToValue for Vec<T>
where
    T: ToValue + 'static,
{
    fn to_value(&self, mapper: &Mapper) -> Result<Value, MapperError> {
        self.iter()
            .map(|item| mapper.serialize(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

impl<T> FromValue for Vec<T>
where
    T: FromValue + 'static,
{
    fn from_value(value: Value, mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| mapper.deserialize(item))
                .collect(),
            other => Err(unexpected("Array", &other)),
        }
    }
}

// the document value types convert to themselves, which is what makes
// `Vec<Value>` the heterogeneous "any value" list

impl ToValue for Value {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        Ok(value)
    }
}

impl ToValue for Document {
    fn to_value(&self, _mapper: &Mapper) -> Result<Value, MapperError> {
        Ok(Value::Document(self.clone()))
    }
}

impl FromValue for Document {
    fn from_value(value: Value, _mapper: &Mapper) -> Result<Self, MapperError> {
        match value {
            Value::Document(doc) => Ok(doc),
            other => Err(unexpected("Document", &other)),
        }
    }
}

fn entries_to_value<'a, K, V>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    mapper: &Mapper,
) -> Result<Value, MapperError>
where
    K: MapKey + ToValue + 'static,
    V: ToValue + 'static,
{
    if K::TEXTUAL {
        let mut doc = Document::new();
        for (k, v) in entries {
            let key = k
                .write_key()
                .expect("TEXTUAL key types always produce a textual form");
            doc.insert(key, mapper.serialize(v)?);
        }
        Ok(Value::Document(doc))
    } else {
        let mut items = Vec::new();
        for (k, v) in entries {
            let mut entry = Document::with_capacity(2);
            entry.insert("key", mapper.serialize(k)?);
            entry.insert("value", mapper.serialize(v)?);
            items.push(Value::Document(entry));
        }
        Ok(Value::Array(items))
    }
}

fn entries_from_value<K, V>(value: Value, mapper: &Mapper) -> Result<Vec<(K, V)>, MapperError>
where
    K: MapKey + FromValue + 'static,
    V: FromValue + 'static,
{
    if K::TEXTUAL {
        let Value::Document(doc) = value else {
            return Err(MapperError::UnexpectedKind {
                expected: "Document",
                found: value.kind(),
            });
        };
        let mut out = Vec::with_capacity(doc.len());
        for (key, value) in doc {
            let Some(k) = K::read_key(&key) else {
                return Err(MapperError::Malformed {
                    target: any::type_name::<K>(),
                    input: key,
                });
            };
            out.push((k, mapper.deserialize(value)?));
        }
        Ok(out)
    } else {
        let Value::Array(items) = value else {
            return Err(MapperError::UnexpectedKind {
                expected: "Array",
                found: value.kind(),
            });
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Document(mut entry) => {
                    let key = entry.remove("key").ok_or(MapperError::Malformed {
                        target: "map entry",
                        input: "missing `key` field".to_owned(),
                    })?;
                    let value = entry.remove("value").ok_or(MapperError::Malformed {
                        target: "map entry",
                        input: "missing `value` field".to_owned(),
                    })?;
                    out.push((mapper.deserialize(key)?, mapper.deserialize(value)?));
                }
                other => return Err(unexpected("Document", &other)),
            }
        }
        Ok(out)
    }
}

impl<K, V, S> ToValue for HashMap<K, V, S>
where
    K: MapKey + ToValue + Eq + Hash + 'static,
    V: ToValue + 'static,
    S: BuildHasher,
{
    fn to_value(&self, mapper: &Mapper) -> Result<Value, MapperError> {
        entries_to_value(self.iter(), mapper)
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: MapKey + FromValue + Eq + Hash + 'static,
    V: FromValue + 'static,
    S: BuildHasher + Default,
{
    fn from_value(value: Value, mapper: &Mapper) -> Result<Self, MapperError> {
        entries_from_value(value, mapper).map(|entries| entries.into_iter().collect())
    }
}

impl<K, V> ToValue for BTreeMap<K, V>
where
    K: MapKey + ToValue + Ord + 'static,
    V: ToValue + 'static,
{
    fn to_value(&self, mapper: &Mapper) -> Result<Value, MapperError> {
        entries_to_value(self.iter(), mapper)
    }
}

impl<K, V> FromValue for BTreeMap<K, V>
where
    K: MapKey + FromValue + Ord + 'static,
    V: FromValue + 'static,
{
    fn from_value(value: Value, mapper: &Mapper) -> Result<Self, MapperError> {
        entries_from_value(value, mapper).map(|entries| entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn roundtrip<T>(native: T) -> T
    where
        T: ToValue + FromValue + 'static,
    {
        let mapper = Mapper::new();
        let value = mapper.serialize(&native).unwrap();
        mapper.deserialize(value).unwrap()
    }

    #[quickcheck]
    fn integers_roundtrip(a: i32, b: i64, c: u8, d: u16, e: u32) -> bool {
        roundtrip(a) == a && roundtrip(b) == b && roundtrip(c) == c && roundtrip(d) == d
            && roundtrip(e) == e
    }

    #[quickcheck]
    fn strings_and_bools_roundtrip(s: String, b: bool) -> bool {
        roundtrip(s.clone()) == s && roundtrip(b) == b
    }

    #[quickcheck]
    fn doubles_roundtrip_totally(x: f64) -> bool {
        roundtrip(x).total_cmp(&x).is_eq()
    }

    #[quickcheck]
    fn heterogeneous_values_roundtrip(v: Value) -> bool {
        roundtrip(v.clone()) == v
    }

    #[test]
    fn bytes_widen_to_int32_and_narrow_with_range_checks() {
        let mapper = Mapper::new();
        assert_eq!(mapper.serialize(&255u8).unwrap(), Value::Int32(255));
        // a wider write still reads back into a narrower field if it fits
        assert_eq!(mapper.deserialize::<u8>(Value::Int64(40)).unwrap(), 40);
        assert_eq!(
            mapper.deserialize::<u8>(Value::Int32(300)),
            Err(MapperError::OutOfRange {
                target: "u8",
                value: 300,
            })
        );
    }

    #[test]
    fn u64_beyond_i64_fails_at_serialize_time() {
        let mapper = Mapper::new();
        assert!(matches!(
            mapper.serialize(&u64::MAX),
            Err(MapperError::OutOfRange { target: "u64", .. })
        ));
        assert_eq!(
            mapper.serialize(&(i64::MAX as u64)).unwrap(),
            Value::Int64(i64::MAX)
        );
    }

    #[test]
    fn chars_are_one_character_strings() {
        let mapper = Mapper::new();
        assert_eq!(mapper.serialize(&'Y').unwrap(), Value::String("Y".into()));
        assert_eq!(roundtrip('Y'), 'Y');
        assert_eq!(
            mapper.deserialize::<char>(Value::String("YZ".into())),
            Err(MapperError::Malformed {
                target: "char",
                input: "YZ".into(),
            })
        );
    }

    #[test]
    fn decimals_never_go_through_floating_point() {
        let mapper = Mapper::new();
        let d = Decimal::new(199, 1); // 19.9
        assert_eq!(mapper.serialize(&d).unwrap(), Value::Decimal(d));
        assert_eq!(roundtrip(d), d);
        // exact integer kinds are accepted...
        assert_eq!(
            mapper.deserialize::<Decimal>(Value::Int32(20)).unwrap(),
            Decimal::from(20)
        );
        // ...doubles are not
        assert_eq!(
            mapper.deserialize::<Decimal>(Value::Double(19.9)),
            Err(MapperError::UnexpectedKind {
                expected: "Decimal, Int32 or Int64",
                found: ValueKind::Double,
            })
        );
    }

    #[test]
    fn options_map_null_both_ways() {
        let mapper = Mapper::new();
        assert_eq!(mapper.serialize(&None::<i32>).unwrap(), Value::Null);
        assert_eq!(mapper.serialize(&Some(999)).unwrap(), Value::Int32(999));
        assert_eq!(roundtrip(Some(999)), Some(999));
        assert_eq!(roundtrip(None::<Timestamp>), None);
    }

    #[test]
    fn vectors_preserve_order() {
        let list = vec!["String-1".to_string(), "String-2".to_string()];
        assert_eq!(roundtrip(list.clone()), list);

        let mapper = Mapper::new();
        let value = mapper.serialize(&vec![1, 2, 3]).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)])
        );
    }

    #[test]
    fn integer_keyed_maps_become_documents() {
        let mapper = Mapper::new();
        let mut dict = HashMap::new();
        dict.insert(1, "Row 1".to_string());
        dict.insert(2, "Row 2".to_string());

        let value = mapper.serialize(&dict).unwrap();
        let doc = value.as_document().unwrap();
        assert_eq!(doc["1"], "Row 1");
        assert_eq!(doc["2"], "Row 2");

        let back: HashMap<i32, String> = mapper.deserialize(value).unwrap();
        assert_eq!(back, dict);
    }

    #[test]
    fn unparsable_textual_keys_fail() {
        let mapper = Mapper::new();
        let mut doc = Document::new();
        doc.insert("not-a-number", "x");
        assert_eq!(
            mapper.deserialize::<HashMap<i32, String>>(Value::Document(doc)),
            Err(MapperError::Malformed {
                target: "i32",
                input: "not-a-number".into(),
            })
        );
    }

    #[test]
    fn composite_keyed_maps_become_entry_arrays() {
        let mapper = Mapper::new();
        let key = Uuid::new_v4();
        let mut dict = HashMap::new();
        dict.insert(key, 7i64);

        let value = mapper.serialize(&dict).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = entries[0].as_document().unwrap();
        assert_eq!(entry["key"], key);
        assert_eq!(entry["value"], 7i64);

        let back: HashMap<Uuid, i64> = mapper.deserialize(value).unwrap();
        assert_eq!(back, dict);
    }

    #[test]
    fn btree_maps_take_the_same_branches() {
        let mut dict = BTreeMap::new();
        dict.insert(1, "John".to_string());
        dict.insert(2, "Doe".to_string());
        assert_eq!(roundtrip(dict.clone()), dict);
    }

    #[test]
    fn urls_roundtrip_through_their_canonical_form() {
        let mapper = Mapper::new();
        let url = Url::parse("http://www.numeria.com.br/").unwrap();
        assert_eq!(
            mapper.serialize(&url).unwrap(),
            Value::String("http://www.numeria.com.br/".into())
        );
        assert_eq!(roundtrip(url.clone()), url);
        assert!(matches!(
            mapper.deserialize::<Url>(Value::String("::not a url::".into())),
            Err(MapperError::Malformed { target: "Url", .. })
        ));
    }

    #[test]
    fn multimaps_encode_multiplicity_in_the_value_shape() {
        let mapper = Mapper::new();
        let mut map = NameValueMap::new();
        map.append("key-1", "value-1");
        map.append("KeyNumber2", "value-2");
        map.append("KeyNumber2", "value-3");

        let value = mapper.serialize(&map).unwrap();
        let doc = value.as_document().unwrap();
        assert_eq!(doc["key-1"], "value-1");
        assert_eq!(
            doc["KeyNumber2"],
            Value::Array(vec!["value-2".into(), "value-3".into()])
        );

        let back: NameValueMap = mapper.deserialize(value).unwrap();
        assert_eq!(back.get("key-1"), Some("value-1"));
        assert_eq!(back.get_all("KeyNumber2").unwrap().len(), 2);
    }

    #[test]
    fn binary_uses_the_dedicated_kind() {
        let mapper = Mapper::new();
        let blob = Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(
            mapper.serialize(&blob).unwrap(),
            Value::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF])
        );
        assert_eq!(roundtrip(blob.clone()), blob);
    }

    #[test]
    fn timestamps_roundtrip() {
        let ts = Timestamp::from_millis(1_700_000_000_123).unwrap();
        assert_eq!(roundtrip(ts), ts);
        assert_eq!(roundtrip(Some(ts)), Some(ts));
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn chrono_datetimes_roundtrip_at_millisecond_precision() {
        use chrono::{DateTime, Utc};
        let now = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(roundtrip(now), now);
    }
}
