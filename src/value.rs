// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # The Document Value Model
//!
//! This module provides [`Value`], the closed tagged union every storable
//! value is represented as, and [`Document`], the string-keyed mapping at the
//! root of every persisted object.
//!
//! A `Value` tree is plain data: it is acyclic, owned exclusively by whoever
//! built it, and shared with nothing. Storage, indexing, and query layers
//! operate on these trees alone and never see the native objects they were
//! mapped from.
//!
//! ## Kinds
//!
//! Besides the obvious primitives, the model carries a few kinds that exist
//! to keep round-trips lossless:
//!
//! - [`Value::Decimal`] holds a [`rust_decimal::Decimal`] and is never routed
//!   through floating point.
//! - [`Value::DateTime`] holds a [`Timestamp`] (UTC milliseconds, years
//!   0000-9999).
//! - [`Value::Guid`] holds a [`uuid::Uuid`].
//! - [`Value::MinValue`] and [`Value::MaxValue`] are sentinel bounds that
//!   compare below and above every other value. They exist for index range
//!   scans downstream and have no native counterpart.
//!
//! ## Ordering
//!
//! [`Value::compare`] defines a total order over all kinds, used by index
//! maintenance downstream: `MinValue < Null < numbers < String < Document <
//! Array < Binary < Guid < Boolean < DateTime < MaxValue`. Numeric kinds
//! compare by magnitude across widths, and `Double` uses a total order so
//! `NaN` sorts deterministically.
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{cmp::Ordering, collections::HashMap, fmt};
use uuid::Uuid;

pub mod multimap;
pub mod timestamp;

pub use multimap::NameValueMap;
pub use timestamp::Timestamp;

#[cfg(any(test, feature = "arbitrary"))]
mod test_util;

/// A single value in a document tree.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum Value {
    /// The absent value.
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    /// Fixed-point decimal, never converted through floating point.
    Decimal(Decimal),
    String(String),
    // NOTE: the #[serde] here is needed to get efficient encoding of byte-arrays
    // for protocols that support it (like msgpack):
    // <https://docs.rs/rmp-serde/1/rmp_serde/index.html#efficient-storage-of-u8-types>
    Binary(#[cfg_attr(feature = "serde", serde(with = "serde_bytes"))] Vec<u8>),
    DateTime(Timestamp),
    Guid(Uuid),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// A nested document.
    Document(Document),
    /// Sentinel that compares below every other value.
    MinValue,
    /// Sentinel that compares above every other value.
    MaxValue,
}

/// The kind tag of a [`Value`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum ValueKind {
    Null,
    Boolean,
    Int32,
    Int64,
    Double,
    Decimal,
    String,
    Binary,
    DateTime,
    Guid,
    Array,
    Document,
    MinValue,
    MaxValue,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Value {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Double(_) => ValueKind::Double,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Guid(_) => ValueKind::Guid,
            Value::Array(_) => ValueKind::Array,
            Value::Document(_) => ValueKind::Document,
            Value::MinValue => ValueKind::MinValue,
            Value::MaxValue => ValueKind::MaxValue,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `i64`, widening `Int32`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any numeric kind as an `f64`, possibly losing precision.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(f64::from(*v)),
            Value::Int64(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<Timestamp> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    /// When ordering values of different kinds, kinds are ranked in this
    /// order. Numeric kinds share a rank and compare by magnitude.
    const fn comparison_order(&self) -> usize {
        match self {
            Value::MinValue => 0,
            Value::Null => 1,
            Value::Int32(_) | Value::Int64(_) | Value::Double(_) | Value::Decimal(_) => 2,
            Value::String(_) => 3,
            Value::Document(_) => 4,
            Value::Array(_) => 5,
            Value::Binary(_) => 6,
            Value::Guid(_) => 7,
            Value::Boolean(_) => 8,
            Value::DateTime(_) => 9,
            Value::MaxValue => 10,
        }
    }

    /// Totally orders two values of any kind.
    ///
    /// Values of different kinds order by kind rank (see the module docs),
    /// except that the numeric kinds compare against each other by magnitude.
    /// `Double` comparisons use [`f64::total_cmp`], so `NaN` has a defined
    /// position.
    pub fn compare(&self, other: &Value) -> Ordering {
        let rank = self.comparison_order().cmp(&other.comparison_order());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Value::Null, Value::Null)
            | (Value::MinValue, Value::MinValue)
            | (Value::MaxValue, Value::MaxValue) => Ordering::Equal,
            (Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
            (Value::String(l), Value::String(r)) => l.cmp(r),
            (Value::Binary(l), Value::Binary(r)) => l.cmp(r),
            (Value::DateTime(l), Value::DateTime(r)) => l.cmp(r),
            (Value::Guid(l), Value::Guid(r)) => l.cmp(r),
            (Value::Array(l), Value::Array(r)) => {
                for (lv, rv) in l.iter().zip(r) {
                    let ord = lv.compare(rv);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                l.len().cmp(&r.len())
            }
            (Value::Document(l), Value::Document(r)) => l.compare(r),
            // only the four numeric kinds share a rank at this point
            (l, r) => compare_numbers(l, r),
        }
    }
}

/// Compares two values of numeric kinds by magnitude.
///
/// If either side is a `Double` the comparison happens in `f64` (total
/// order); otherwise `Decimal` comparisons stay exact, and pure integer
/// comparisons happen in `i64`.
fn compare_numbers(l: &Value, r: &Value) -> Ordering {
    match (l, r) {
        (Value::Double(_), _) | (_, Value::Double(_)) => {
            let lf = l.as_f64().unwrap_or(f64::NAN);
            let rf = r.as_f64().unwrap_or(f64::NAN);
            lf.total_cmp(&rf)
        }
        (Value::Decimal(d), other) => d.cmp(&decimal_of(other)),
        (other, Value::Decimal(d)) => decimal_of(other).cmp(d),
        _ => {
            let li = l.as_i64().unwrap_or_default();
            let ri = r.as_i64().unwrap_or_default();
            li.cmp(&ri)
        }
    }
}

fn decimal_of(v: &Value) -> Decimal {
    match v {
        Value::Decimal(d) => *d,
        Value::Int32(i) => Decimal::from(*i),
        Value::Int64(i) => Decimal::from(*i),
        _ => Decimal::ZERO,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) | (MinValue, MinValue) | (MaxValue, MaxValue) => true,
            (Boolean(l), Boolean(r)) => l.eq(r),
            (Int32(l), Int32(r)) => l.eq(r),
            (Int64(l), Int64(r)) => l.eq(r),
            // total_cmp so that NaN round-trips compare equal
            (Double(l), Double(r)) => l.total_cmp(r).is_eq(),
            (Decimal(l), Decimal(r)) => l.eq(r),
            (String(l), String(r)) => l.eq(r),
            (Binary(l), Binary(r)) => l.eq(r),
            (DateTime(l), DateTime(r)) => l.eq(r),
            (Guid(l), Guid(r)) => l.eq(r),
            (Array(l), Array(r)) => l.eq(r),
            (Document(l), Document(r)) => l.eq(r),
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => v.fmt(f),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}i64"),
            // {:?} always prints at least one decimal, disambiguating from ints
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Decimal(v) => write!(f, "{v}m"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Binary(v) => write!(f, "{v:02X?}"),
            Value::DateTime(v) => write!(f, "{v:?}"),
            Value::Guid(v) => write!(f, "{v}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                f.write_str("]")
            }
            Value::Document(doc) => doc.fmt(f),
            Value::MinValue => f.write_str("$minValue"),
            Value::MaxValue => f.write_str("$maxValue"),
        }
    }
}

macro_rules! impl_from {
    (
        $(
            $source:ty => $target:ident $(with $conv:ident)?
        ),* $(,)?
    ) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Self::$target(impl_from!(value$(, $conv)?))
                }
            }
        )*
    };

    ($value:ident, $conv:ident) => {
        $value.$conv()
    };

    ($value:ident) => {
        $value
    };
}

impl_from!(
    bool       => Boolean,
    u8         => Int32 with into,
    i8         => Int32 with into,
    i16        => Int32 with into,
    u16        => Int32 with into,
    i32        => Int32,
    u32        => Int64 with into,
    i64        => Int64,
    f32        => Double with into,
    f64        => Double,
    Decimal    => Decimal,
    String     => String,
    &str       => String with to_string,
    Vec<u8>    => Binary,
    &[u8]      => Binary with to_vec,
    Timestamp  => DateTime,
    Uuid       => Guid,
    Vec<Value> => Array,
    Document   => Document,
);

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

macro_rules! impl_partial_eq {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl PartialEq<$t> for Value {
                fn eq(&self, other: &$t) -> bool {
                    matches!(self, Value::$variant(v) if v == other)
                }
            }
        )+
    };
}
impl_partial_eq!(
    bool => Boolean,
    f64 => Double,
    Decimal => Decimal,
    Uuid => Guid,
    Timestamp => DateTime,
    String => String,
);

// integers compare across the two integer kinds
impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        match self {
            Value::Int32(v) => v == other,
            Value::Int64(v) => *v == i64::from(*other),
            _ => false,
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        match self {
            Value::Int32(v) => i64::from(*v) == *other,
            Value::Int64(v) => v == other,
            _ => false,
        }
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::String(v) if v == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Value::String(v) if v == other)
    }
}

/// A string-keyed mapping of [`Value`]s.
///
/// Key insertion order is irrelevant; iteration order is unspecified.
/// Indexing with a missing key yields [`Value::Null`] rather than panicking,
/// mirroring how absent fields behave during deserialization.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    entries: HashMap<String, Value, ahash::RandomState>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, ahash::RandomState::new()),
        }
    }

    /// Inserts a value under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Orders two documents by their sorted key/value entries.
    pub fn compare(&self, other: &Document) -> Ordering {
        let mut left: Vec<_> = self.entries.iter().collect();
        let mut right: Vec<_> = other.entries.iter().collect();
        left.sort_by_key(|(k, _)| k.as_str());
        right.sort_by_key(|(k, _)| k.as_str());
        for ((lk, lv), (rk, rv)) in left.iter().zip(&right) {
            let keys = lk.as_str().cmp(rk.as_str());
            if keys != Ordering::Equal {
                return keys;
            }
            let values = lv.compare(rv);
            if values != Ordering::Equal {
                return values;
            }
        }
        left.len().cmp(&right.len())
    }
}

impl std::ops::Index<&str> for Document {
    type Output = Value;

    /// Returns the value under `key`, or [`Value::Null`] if absent.
    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.entries.get(key).unwrap_or(&NULL)
    }
}

impl fmt::Debug for Document {
    // Keys are printed sorted so output is deterministic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|(k, _)| k.as_str());
        f.write_str("{")?;
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}: {v:?}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for Document {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    #[test]
    fn kinds_match_payloads() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(1).kind(), ValueKind::Int32);
        assert_eq!(Value::from(1i64).kind(), ValueKind::Int64);
        assert_eq!(Value::from(255u8).kind(), ValueKind::Int32);
        assert_eq!(Value::from(1u32).kind(), ValueKind::Int64);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::from(vec![0u8, 1]).kind(), ValueKind::Binary);
        assert_eq!(Value::MaxValue.kind(), ValueKind::MaxValue);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::Int32(7));
    }

    #[test]
    fn missing_keys_index_as_null() {
        let mut doc = Document::new();
        doc.insert("name", "John");
        assert_eq!(doc["name"], "John");
        assert!(doc["no-such-key"].is_null());
    }

    #[test]
    fn primitive_equality_is_cross_width_for_integers() {
        assert_eq!(Value::Int64(123), 123);
        assert_eq!(Value::Int32(123), 123i64);
        assert_ne!(Value::Int32(123), 124);
        assert_ne!(Value::String("123".into()), 123);
    }

    #[test]
    fn sentinels_bound_every_kind() {
        let samples = [
            Value::Null,
            Value::Boolean(true),
            Value::Int32(i32::MAX),
            Value::Double(f64::INFINITY),
            Value::String("zzz".into()),
            Value::Binary(vec![0xFF; 4]),
            Value::Guid(Uuid::from_u128(u128::MAX)),
        ];
        for v in &samples {
            assert_eq!(Value::MinValue.compare(v), Ordering::Less);
            assert_eq!(Value::MaxValue.compare(v), Ordering::Greater);
        }
    }

    #[test]
    fn kind_ranks_follow_document_order() {
        let ascending = [
            Value::MinValue,
            Value::Null,
            Value::Int32(9),
            Value::String("a".into()),
            Value::Document(Document::new()),
            Value::Array(vec![]),
            Value::Binary(vec![]),
            Value::Guid(Uuid::nil()),
            Value::Boolean(false),
            Value::DateTime(Timestamp::from_millis(0).unwrap()),
            Value::MaxValue,
        ];
        for pair in ascending.windows(2) {
            assert_eq!(pair[0].compare(&pair[1]), Ordering::Less);
        }
    }

    #[test]
    fn numbers_compare_across_kinds() {
        assert_eq!(Value::Int32(2).compare(&Value::Int64(3)), Ordering::Less);
        assert_eq!(Value::Int64(3).compare(&Value::Double(2.5)), Ordering::Greater);
        assert_eq!(
            Value::Decimal(Decimal::new(199, 1)).compare(&Value::Int32(20)),
            Ordering::Less
        );
        assert_eq!(Value::Int32(5).compare(&Value::Double(5.0)), Ordering::Equal);
    }

    #[test]
    fn double_nan_is_self_equal() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }

    #[test]
    fn array_ordering_is_elementwise_then_length() {
        let short = Value::Array(vec![Value::Int32(1)]);
        let long = Value::Array(vec![Value::Int32(1), Value::Int32(2)]);
        assert_eq!(short.compare(&long), Ordering::Less);
        let bigger = Value::Array(vec![Value::Int32(2)]);
        assert_eq!(bigger.compare(&long), Ordering::Greater);
    }

    #[test]
    fn debug_output_is_compact_and_sorted() {
        let mut doc = Document::new();
        doc.insert("_id", 123);
        doc.insert("name", "John");
        doc.insert("score", 19.5);
        doc.insert("tags", Value::Array(vec!["a".into(), "b".into()]));
        assert_debug_snapshot!(doc, @r#"{"_id": 123, "name": "John", "score": 19.5, "tags": ["a", "b"]}"#);
    }

    #[quickcheck]
    fn compare_is_consistent_with_eq(a: i32, b: i32) -> bool {
        let l = Value::Int32(a);
        let r = Value::Int32(b);
        (l == r) == (l.compare(&r) == Ordering::Equal)
    }
}
